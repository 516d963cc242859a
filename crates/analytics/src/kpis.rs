//! Campaign-level and per-platform KPIs.
//!
//! Rate averages (CPM, CTR, engagement rate) are means of the per-record
//! values, not ratios of summed volumes.

use campaign_core::stats::{round_to, safe_div};
use campaign_core::{Platform, ProcessedRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallKpis {
    pub total_impressions: u64,
    pub total_reach: u64,
    pub total_clicks: u64,
    pub total_spend: f64,
    pub total_engagements: u64,
    pub total_video_views: u64,
    pub average_cpm: f64,
    pub average_ctr: f64,
    pub average_engagement_rate: f64,
    /// `impressions / reach`.
    pub frequency: f64,
    /// `spend / clicks` (0.0 when there are no clicks).
    pub cost_per_click: f64,
    pub campaign_days: u32,
    pub platforms_count: usize,
    pub creative_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformMetrics {
    pub impressions: u64,
    pub reach: u64,
    pub clicks: u64,
    pub spend: f64,
    pub engagements: u64,
    pub video_views: u64,
    pub avg_cpm: f64,
    pub avg_ctr: f64,
    pub avg_engagement_rate: f64,
    pub frequency: f64,
    pub cost_per_click: f64,
    /// Share of total campaign spend, in percent.
    pub spend_percentage: f64,
    /// Share of total campaign impressions, in percent.
    pub impression_share: f64,
}

/// Running sums over a group of records. Averages are unrounded.
#[derive(Debug, Clone, Default)]
pub(crate) struct Aggregate {
    pub rows: usize,
    pub impressions: u64,
    pub reach: u64,
    pub clicks: u64,
    pub spend: f64,
    pub engagements: u64,
    pub video_views: u64,
    cpm_sum: f64,
    ctr_sum: f64,
    engagement_rate_sum: f64,
    dates: BTreeSet<NaiveDate>,
}

impl Aggregate {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ProcessedRecord>) -> Self {
        let mut agg = Self::default();
        for r in records {
            agg.add(r);
        }
        agg
    }

    pub fn add(&mut self, r: &ProcessedRecord) {
        let rec = &r.record;
        self.rows += 1;
        self.impressions += rec.impressions;
        self.reach += rec.reach;
        self.clicks += rec.clicks;
        self.spend += rec.spend;
        self.engagements += rec.engagements;
        self.video_views += rec.video_views;
        self.cpm_sum += rec.cpm;
        self.ctr_sum += rec.ctr;
        self.engagement_rate_sum += rec.engagement_rate;
        self.dates.insert(rec.date);
    }

    pub fn avg_cpm(&self) -> f64 {
        safe_div(self.cpm_sum, self.rows as f64)
    }

    pub fn avg_ctr(&self) -> f64 {
        safe_div(self.ctr_sum, self.rows as f64)
    }

    pub fn avg_engagement_rate(&self) -> f64 {
        safe_div(self.engagement_rate_sum, self.rows as f64)
    }

    pub fn frequency(&self) -> f64 {
        safe_div(self.impressions as f64, self.reach as f64)
    }

    pub fn cost_per_click(&self) -> f64 {
        safe_div(self.spend, self.clicks as f64)
    }

    /// Distinct dates with at least one record.
    pub fn days_with_data(&self) -> usize {
        self.dates.len()
    }
}

pub fn overall_kpis(records: &[ProcessedRecord]) -> OverallKpis {
    let agg = Aggregate::from_records(records);
    let platforms: BTreeSet<Platform> = records.iter().map(|r| r.record.platform).collect();
    let creatives: BTreeSet<&str> = records.iter().map(|r| r.record.creative_id.as_str()).collect();
    let campaign_days = records
        .iter()
        .map(|r| r.calendar.days_since_start + 1)
        .max()
        .unwrap_or(0);

    OverallKpis {
        total_impressions: agg.impressions,
        total_reach: agg.reach,
        total_clicks: agg.clicks,
        total_spend: round_to(agg.spend, 2),
        total_engagements: agg.engagements,
        total_video_views: agg.video_views,
        average_cpm: round_to(agg.avg_cpm(), 2),
        average_ctr: round_to(agg.avg_ctr(), 4),
        average_engagement_rate: round_to(agg.avg_engagement_rate(), 4),
        frequency: round_to(agg.frequency(), 2),
        cost_per_click: round_to(agg.cost_per_click(), 2),
        campaign_days,
        platforms_count: platforms.len(),
        creative_count: creatives.len(),
    }
}

pub fn platform_breakdown(records: &[ProcessedRecord]) -> BTreeMap<Platform, PlatformMetrics> {
    let total = Aggregate::from_records(records);
    let mut groups: BTreeMap<Platform, Aggregate> = BTreeMap::new();
    for r in records {
        groups.entry(r.record.platform).or_default().add(r);
    }

    groups
        .into_iter()
        .map(|(platform, agg)| {
            let metrics = PlatformMetrics {
                impressions: agg.impressions,
                reach: agg.reach,
                clicks: agg.clicks,
                spend: round_to(agg.spend, 2),
                engagements: agg.engagements,
                video_views: agg.video_views,
                avg_cpm: round_to(agg.avg_cpm(), 2),
                avg_ctr: round_to(agg.avg_ctr(), 4),
                avg_engagement_rate: round_to(agg.avg_engagement_rate(), 4),
                frequency: round_to(agg.frequency(), 2),
                cost_per_click: round_to(agg.cost_per_click(), 2),
                spend_percentage: round_to(safe_div(agg.spend, total.spend) * 100.0, 2),
                impression_share: round_to(
                    safe_div(agg.impressions as f64, total.impressions as f64) * 100.0,
                    2,
                ),
            };
            (platform, metrics)
        })
        .collect()
}
