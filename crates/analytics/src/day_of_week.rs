//! Weekday vs weekend performance.

use crate::kpis::Aggregate;
use campaign_core::stats::{pct_change, round_to};
use campaign_core::{Platform, ProcessedRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub avg_ctr: f64,
    pub avg_cpm: f64,
    pub avg_engagement_rate: f64,
    pub impressions: u64,
    pub clicks: u64,
}

impl PeriodMetrics {
    fn from_aggregate(agg: &Aggregate) -> Self {
        Self {
            avg_ctr: round_to(agg.avg_ctr(), 4),
            avg_cpm: round_to(agg.avg_cpm(), 2),
            avg_engagement_rate: round_to(agg.avg_engagement_rate(), 4),
            impressions: agg.impressions,
            clicks: agg.clicks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayWeekend {
    pub weekday: PeriodMetrics,
    pub weekend: PeriodMetrics,
    /// Weekend CTR relative to weekday CTR, in percent (0 with no weekday CTR).
    pub weekend_ctr_lift: f64,
}

impl WeekdayWeekend {
    fn from_records<'a>(records: impl IntoIterator<Item = &'a ProcessedRecord>) -> Self {
        let mut weekday = Aggregate::default();
        let mut weekend = Aggregate::default();
        for r in records {
            if r.calendar.is_weekend {
                weekend.add(r);
            } else {
                weekday.add(r);
            }
        }
        let weekday = PeriodMetrics::from_aggregate(&weekday);
        let weekend = PeriodMetrics::from_aggregate(&weekend);
        let weekend_ctr_lift = round_to(pct_change(weekend.avg_ctr, weekday.avg_ctr), 2);
        Self {
            weekday,
            weekend,
            weekend_ctr_lift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOfWeekAnalysis {
    pub weekday_vs_weekend: WeekdayWeekend,
    pub by_platform: BTreeMap<Platform, WeekdayWeekend>,
}

pub fn day_of_week_patterns(records: &[ProcessedRecord]) -> DayOfWeekAnalysis {
    let mut grouped: BTreeMap<Platform, Vec<&ProcessedRecord>> = BTreeMap::new();
    for r in records {
        grouped.entry(r.record.platform).or_default().push(r);
    }

    DayOfWeekAnalysis {
        weekday_vs_weekend: WeekdayWeekend::from_records(records),
        by_platform: grouped
            .into_iter()
            .map(|(platform, rows)| (platform, WeekdayWeekend::from_records(rows)))
            .collect(),
    }
}
