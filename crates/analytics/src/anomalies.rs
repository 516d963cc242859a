//! Daily z-score anomaly detection.

use campaign_core::stats::{mean, round_to, safe_div, sample_std_dev};
use campaign_core::ProcessedRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Standard deviations above the mean a day must exceed to be flagged.
pub const Z_THRESHOLD: f64 = 2.0;

/// All platforms and creatives summed for one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    /// Mean record CTR on the date.
    pub avg_ctr: f64,
    pub spend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMetric {
    Impressions,
    Clicks,
}

impl AnomalyMetric {
    pub const ALL: [AnomalyMetric; 2] = [AnomalyMetric::Impressions, AnomalyMetric::Clicks];

    fn value(self, day: &DailyAggregate) -> u64 {
        match self {
            AnomalyMetric::Impressions => day.impressions,
            AnomalyMetric::Clicks => day.clicks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub metric: AnomalyMetric,
    pub value: u64,
    /// `value / mean` across all dates.
    pub times_above_average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total_high_performance_days: usize,
    pub total_low_performance_days: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub high_performance_days: Vec<Anomaly>,
    /// Reserved for a symmetric low-side check; currently never populated.
    pub low_performance_days: Vec<Anomaly>,
    pub summary: AnomalySummary,
}

/// Daily totals in date order.
pub fn daily_aggregates(records: &[ProcessedRecord]) -> Vec<DailyAggregate> {
    // date -> (impressions, clicks, ctr sum, rows, spend)
    let mut days: BTreeMap<NaiveDate, (u64, u64, f64, usize, f64)> = BTreeMap::new();
    for r in records {
        let day = days.entry(r.record.date).or_default();
        day.0 += r.record.impressions;
        day.1 += r.record.clicks;
        day.2 += r.record.ctr;
        day.3 += 1;
        day.4 += r.record.spend;
    }
    days.into_iter()
        .map(|(date, (impressions, clicks, ctr_sum, rows, spend))| DailyAggregate {
            date,
            impressions,
            clicks,
            avg_ctr: safe_div(ctr_sum, rows as f64),
            spend,
        })
        .collect()
}

/// Flag days whose impressions or clicks exceed `mean + 2·std` of the daily
/// series. Fewer than two dates never produce a flag.
pub fn detect_anomalies(records: &[ProcessedRecord]) -> AnomalyReport {
    let daily = daily_aggregates(records);
    let mut high = Vec::new();

    for metric in AnomalyMetric::ALL {
        let values: Vec<f64> = daily.iter().map(|d| metric.value(d) as f64).collect();
        let Some(std_dev) = sample_std_dev(&values) else {
            continue;
        };
        let avg = mean(&values);
        let threshold = avg + Z_THRESHOLD * std_dev;
        debug!(?metric, mean = avg, std_dev, threshold, "Anomaly threshold");

        for day in &daily {
            let value = metric.value(day);
            if value as f64 > threshold {
                high.push(Anomaly {
                    date: day.date,
                    metric,
                    value,
                    times_above_average: round_to(safe_div(value as f64, avg), 2),
                });
            }
        }
    }

    metrics::counter!("analysis.anomalies_flagged").increment(high.len() as u64);
    AnomalyReport {
        summary: AnomalySummary {
            total_high_performance_days: high.len(),
            total_low_performance_days: 0,
        },
        high_performance_days: high,
        low_performance_days: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;
    use campaign_core::Platform;

    fn series_with_spike() -> Vec<ProcessedRecord> {
        (0..10)
            .map(|d| {
                if d == 6 {
                    record(d, Platform::Meta, 1, 5_000, 50, 10.0, 2.0, 0.01)
                } else {
                    record(d, Platform::Meta, 1, 1_000, 10, 10.0, 10.0, 0.01)
                }
            })
            .collect()
    }

    #[test]
    fn test_daily_aggregates_sum_across_platforms() {
        let records = vec![
            record(0, Platform::Meta, 1, 1_000, 10, 10.0, 10.0, 0.01),
            record(0, Platform::Tiktok, 1, 2_000, 60, 5.0, 2.5, 0.03),
            record(1, Platform::Meta, 1, 1_000, 10, 10.0, 10.0, 0.01),
        ];
        let daily = daily_aggregates(&records);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].impressions, 3_000);
        assert_eq!(daily[0].clicks, 70);
        assert_eq!(daily[0].spend, 15.0);
        assert!((daily[0].avg_ctr - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_spike_flagged_for_both_metrics() {
        let report = detect_anomalies(&series_with_spike());
        assert_eq!(report.high_performance_days.len(), 2);

        let first = &report.high_performance_days[0];
        assert_eq!(first.metric, AnomalyMetric::Impressions);
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(first.value, 5_000);
        // 5000 / mean(1400)
        assert_eq!(first.times_above_average, 3.57);
        assert_eq!(report.high_performance_days[1].metric, AnomalyMetric::Clicks);

        assert_eq!(report.summary.total_high_performance_days, 2);
        assert!(report.low_performance_days.is_empty());
        assert_eq!(report.summary.total_low_performance_days, 0);
    }

    #[test]
    fn test_single_date_yields_no_anomalies() {
        let records = vec![record(0, Platform::Meta, 1, 9_000, 90, 10.0, 10.0, 0.01)];
        let report = detect_anomalies(&records);
        assert!(report.high_performance_days.is_empty());
        assert_eq!(report.summary, AnomalySummary::default());
    }

    #[test]
    fn test_flat_series_yields_no_anomalies() {
        let records: Vec<_> = (0..5)
            .map(|d| record(d, Platform::Tiktok, 1, 1_000, 10, 10.0, 10.0, 0.01))
            .collect();
        assert!(detect_anomalies(&records).high_performance_days.is_empty());
    }

    #[test]
    fn test_metric_serializes_snake_case() {
        let json = serde_json::to_string(&AnomalyMetric::Impressions).unwrap();
        assert_eq!(json, "\"impressions\"");
    }
}
