//! Week-over-week trends.

use crate::kpis::Aggregate;
use campaign_core::stats::{pct_change, round_to};
use campaign_core::{Platform, ProcessedRecord};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Map key for a campaign week, serialized as `week_<n>` and ordered by `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey(pub u32);

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week_{}", self.0)
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.strip_prefix("week_")
            .and_then(|n| n.parse().ok())
            .map(WeekKey)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid week key: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMetrics {
    pub week_number: u32,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub avg_cpm: f64,
    pub avg_ctr: f64,
    pub avg_engagement_rate: f64,
    pub days_with_data: usize,
    /// Mean record CTR per platform within the week.
    pub platform_avg_ctr: BTreeMap<Platform, f64>,
    /// Percent change in `avg_ctr` against the previous week present.
    /// Absent for the first week.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr_change_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpm_change_pct: Option<f64>,
}

pub fn weekly_breakdown(records: &[ProcessedRecord]) -> BTreeMap<WeekKey, WeeklyMetrics> {
    let mut weeks: BTreeMap<u32, (Aggregate, BTreeMap<Platform, Aggregate>)> = BTreeMap::new();
    for r in records {
        let (week, by_platform) = weeks.entry(r.calendar.week_number).or_default();
        week.add(r);
        by_platform.entry(r.record.platform).or_default().add(r);
    }

    let mut result: BTreeMap<WeekKey, WeeklyMetrics> = BTreeMap::new();
    let mut previous: Option<(f64, f64)> = None;
    for (week_number, (agg, by_platform)) in weeks {
        let avg_ctr = round_to(agg.avg_ctr(), 4);
        let avg_cpm = round_to(agg.avg_cpm(), 2);
        let (ctr_change_pct, cpm_change_pct) = match previous {
            Some((prev_ctr, prev_cpm)) => (
                Some(round_to(pct_change(avg_ctr, prev_ctr), 2)),
                Some(round_to(pct_change(avg_cpm, prev_cpm), 2)),
            ),
            None => (None, None),
        };
        previous = Some((avg_ctr, avg_cpm));

        result.insert(
            WeekKey(week_number),
            WeeklyMetrics {
                week_number,
                impressions: agg.impressions,
                clicks: agg.clicks,
                spend: round_to(agg.spend, 2),
                avg_cpm,
                avg_ctr,
                avg_engagement_rate: round_to(agg.avg_engagement_rate(), 4),
                days_with_data: agg.days_with_data(),
                platform_avg_ctr: by_platform
                    .iter()
                    .map(|(p, a)| (*p, round_to(a.avg_ctr(), 4)))
                    .collect(),
                ctr_change_pct,
                cpm_change_pct,
            },
        );
    }
    result
}
