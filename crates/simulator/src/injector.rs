//! Data-quality injector. Corrupts a clean dataset the way real platform
//! exports go wrong: late-reported days vanish and one day goes viral.

use crate::rng::RandomStream;
use campaign_core::stats::{round_to, safe_div};
use campaign_core::{PerformanceRecord, Platform};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Platforms with this many records or fewer keep all of them.
pub const MIN_RECORDS_FOR_DROPS: usize = 5;

/// The record that was inflated into an outlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectedOutlier {
    pub date: NaiveDate,
    pub creative_id: String,
    pub factor: f64,
}

/// Corrupted dataset plus a log of what was done to it.
#[derive(Debug, Clone)]
pub struct CorruptionOutcome {
    pub records: Vec<PerformanceRecord>,
    /// Rows removed per platform.
    pub dropped: BTreeMap<Platform, usize>,
    pub outlier: Option<InjectedOutlier>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataQualityInjector;

impl DataQualityInjector {
    pub fn new() -> Self {
        Self
    }

    /// Drop one or two records per platform, then inflate one surviving
    /// record's volume by 2-3x while leaving its spend untouched.
    pub fn corrupt<R: RandomStream + ?Sized>(
        &self,
        records: Vec<PerformanceRecord>,
        stream: &mut R,
    ) -> CorruptionOutcome {
        let mut records = records;
        let dropped = self.drop_reporting_gaps(&mut records, stream);
        let outlier = self.inject_outlier(&mut records, stream);

        let total_dropped: usize = dropped.values().sum();
        metrics::counter!("injector.rows_dropped").increment(total_dropped as u64);
        info!(
            dropped = total_dropped,
            remaining = records.len(),
            outlier = outlier.as_ref().map(|o| o.creative_id.as_str()).unwrap_or("none"),
            "Data quality issues injected"
        );

        CorruptionOutcome {
            records,
            dropped,
            outlier,
        }
    }

    fn drop_reporting_gaps<R: RandomStream + ?Sized>(
        &self,
        records: &mut Vec<PerformanceRecord>,
        stream: &mut R,
    ) -> BTreeMap<Platform, usize> {
        let mut dropped = BTreeMap::new();
        for platform in Platform::ALL {
            let positions: Vec<usize> = records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.platform == platform)
                .map(|(i, _)| i)
                .collect();
            if positions.len() <= MIN_RECORDS_FOR_DROPS {
                continue;
            }

            let count = 1 + stream.index(2);
            let mut doomed: Vec<usize> = stream
                .sample_indices(positions.len(), count)
                .into_iter()
                .map(|i| positions[i])
                .collect();
            doomed.sort_unstable();
            for &pos in doomed.iter().rev() {
                let removed = records.remove(pos);
                debug!(platform = %platform, date = %removed.date, creative = %removed.creative_id, "Record dropped");
            }
            dropped.insert(platform, doomed.len());
        }
        dropped
    }

    fn inject_outlier<R: RandomStream + ?Sized>(
        &self,
        records: &mut [PerformanceRecord],
        stream: &mut R,
    ) -> Option<InjectedOutlier> {
        if records.is_empty() {
            return None;
        }
        let idx = stream.index(records.len());
        let factor = stream.uniform(2.0, 3.0);
        let record = &mut records[idx];

        let scale = |v: u64| (v as f64 * factor).floor() as u64;
        record.impressions = scale(record.impressions);
        record.reach = scale(record.reach);
        record.clicks = scale(record.clicks);
        record.engagements = scale(record.engagements);
        record.video_views = scale(record.video_views);

        let impressions = record.impressions as f64;
        record.cpm = round_to(safe_div(record.spend, impressions) * 1000.0, 2);
        record.ctr = round_to(safe_div(record.clicks as f64, impressions), 4);

        Some(InjectedOutlier {
            date: record.date,
            creative_id: record.creative_id.clone(),
            factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{FixedStream, SeededStream};
    use crate::CampaignSimulator;
    use campaign_core::AppConfig;

    fn clean() -> Vec<PerformanceRecord> {
        CampaignSimulator::new(AppConfig::default()).unwrap().generate(42)
    }

    #[test]
    fn test_drops_one_or_two_per_platform() {
        let records = clean();
        let before = records.len();
        let outcome = DataQualityInjector::new().corrupt(records, &mut SeededStream::new(42));

        assert_eq!(outcome.dropped.len(), 3);
        for count in outcome.dropped.values() {
            assert!((1..=2).contains(count));
        }
        let total: usize = outcome.dropped.values().sum();
        assert_eq!(outcome.records.len(), before - total);
    }

    #[test]
    fn test_small_platforms_keep_all_rows() {
        let mut config = AppConfig::default();
        config.campaign.duration_days = 2;
        let records = CampaignSimulator::new(config).unwrap().generate(1);
        // google_display: 6 rows, meta/tiktok: 4 rows each
        let outcome = DataQualityInjector::new().corrupt(records, &mut SeededStream::new(1));
        assert!(outcome.dropped.contains_key(&Platform::GoogleDisplay));
        assert!(!outcome.dropped.contains_key(&Platform::Meta));
        assert!(!outcome.dropped.contains_key(&Platform::Tiktok));
    }

    #[test]
    fn test_outlier_scales_volume_not_spend() {
        let records = clean();
        // FixedStream: drop k=1 at position 0 per platform, outlier at index 0.
        let mut stream = FixedStream { fraction: 0.5 };
        let outcome = DataQualityInjector::new().corrupt(records.clone(), &mut stream);
        let outlier = outcome.outlier.clone().unwrap();
        assert!((outlier.factor - 2.5).abs() < 1e-12);

        let after = outcome
            .records
            .iter()
            .find(|r| r.date == outlier.date && r.creative_id == outlier.creative_id)
            .unwrap();
        let before = records
            .iter()
            .find(|r| r.date == outlier.date && r.creative_id == outlier.creative_id)
            .unwrap();

        assert_eq!(after.spend, before.spend);
        assert_eq!(after.impressions, (before.impressions as f64 * 2.5).floor() as u64);
        assert!(after.cpm < before.cpm);
        assert!(after.reach <= after.impressions);
        assert!(after.clicks <= after.impressions);
        let expected_cpm = round_to(after.spend / after.impressions as f64 * 1000.0, 2);
        assert_eq!(after.cpm, expected_cpm);
    }

    #[test]
    fn test_corruption_is_deterministic() {
        let a = DataQualityInjector::new().corrupt(clean(), &mut SeededStream::new(9));
        let b = DataQualityInjector::new().corrupt(clean(), &mut SeededStream::new(9));
        assert_eq!(a.records, b.records);
        assert_eq!(a.outlier, b.outlier);
    }

    #[test]
    fn test_empty_dataset() {
        let outcome = DataQualityInjector::new().corrupt(Vec::new(), &mut SeededStream::new(1));
        assert!(outcome.records.is_empty());
        assert!(outcome.outlier.is_none());
        assert!(outcome.dropped.is_empty());
    }
}
