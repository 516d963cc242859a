//! Normalization into typed, consistently rounded records.

use crate::features::DerivedRow;
use campaign_core::stats::round_to;
use campaign_core::{PerformanceRecord, ProcessedRecord};

/// Coerce a reported count to an integer. Missing, negative and non-finite
/// values become 0; fractions are truncated.
pub fn coerce_count(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

fn rounded(value: Option<f64>, decimals: i32) -> f64 {
    value.filter(|v| v.is_finite()).map_or(0.0, |v| round_to(v, decimals))
}

/// Attach display names, round money and rates, and coerce counts.
pub fn normalize(rows: &[DerivedRow]) -> Vec<ProcessedRecord> {
    rows.iter()
        .map(|row| {
            let raw = &row.raw;
            ProcessedRecord {
                record: PerformanceRecord {
                    campaign_id: raw.campaign_id.clone().unwrap_or_default(),
                    campaign_name: raw.campaign_name.clone().unwrap_or_default(),
                    brand_name: raw.brand_name.clone().unwrap_or_default(),
                    date: row.date,
                    platform: row.platform,
                    creative_id: row.creative_id.clone(),
                    impressions: coerce_count(raw.impressions),
                    reach: coerce_count(raw.reach),
                    clicks: coerce_count(raw.clicks),
                    spend: rounded(raw.spend, 2).max(0.0),
                    engagements: coerce_count(raw.engagements),
                    video_views: coerce_count(raw.video_views),
                    cpm: rounded(raw.cpm, 2),
                    ctr: rounded(raw.ctr, 4),
                    engagement_rate: rounded(raw.engagement_rate, 4),
                },
                calendar: row.calendar.clone(),
                platform_display: row.platform.display_name().to_string(),
            }
        })
        .collect()
}
