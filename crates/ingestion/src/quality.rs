//! Data-quality diagnostics over raw records and summary statistics over
//! processed ones.

use crate::source::RawRecord;
use campaign_core::stats::{mean, round_to, safe_div, IqrBounds};
use campaign_core::{CampaignError, CampaignResult, Platform, ProcessedRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Metrics screened for IQR outliers.
pub const OUTLIER_METRICS: [&str; 3] = ["impressions", "clicks", "spend"];

/// Example dates kept per outlier metric.
const OUTLIER_EXAMPLE_DATES: usize = 3;

// ─── Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub total_rows: usize,
    pub date_range: DateRange,
    /// Platforms in order of first appearance.
    pub platforms: Vec<Platform>,
    /// Fields with at least one missing value.
    pub missing_values: BTreeMap<String, usize>,
    pub data_completeness: BTreeMap<Platform, Completeness>,
    /// Metrics with at least one flagged row.
    pub outliers: BTreeMap<String, OutlierSummary>,
    pub budget_summary: BudgetSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days_covered: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completeness {
    pub expected_rows: usize,
    pub actual_rows: usize,
    /// Negative when a platform reports duplicate rows.
    pub missing_rows: i64,
    pub completeness_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub count: usize,
    /// Share of all rows, in percent.
    pub percentage: f64,
    pub max_value: f64,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_spend: f64,
    pub by_platform: BTreeMap<Platform, PlatformSpend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpend {
    pub spend: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub overall: OverallSummary,
    pub by_platform: BTreeMap<Platform, PlatformSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_spend: f64,
    pub avg_cpm: f64,
    pub avg_ctr: f64,
    pub total_engagements: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSummary {
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub avg_cpm: f64,
    pub avg_ctr: f64,
    pub engagements: u64,
}

// ─── Validation ─────────────────────────────────────────────────────────

/// Build the data-quality report for a raw dataset.
///
/// Fails with a load error when no record carries a date, since neither the
/// date range nor completeness can be established.
pub fn validate(records: &[RawRecord]) -> CampaignResult<DataQualityReport> {
    let dates: Vec<NaiveDate> = records.iter().filter_map(|r| r.date).collect();
    let (start, end) = match (dates.iter().min(), dates.iter().max()) {
        (Some(s), Some(e)) => (*s, *e),
        _ => return Err(CampaignError::Load("no record has a date".into())),
    };
    let days_covered = u32::try_from((end - start).num_days() + 1).unwrap_or(0);

    let mut platforms = Vec::new();
    for platform in records.iter().filter_map(|r| r.platform) {
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }

    let mut missing_values = BTreeMap::new();
    for record in records {
        for field in record.missing_fields() {
            *missing_values.entry(field.to_string()).or_insert(0) += 1;
        }
    }

    let data_completeness = platforms
        .iter()
        .map(|&p| (p, completeness(records, p, days_covered)))
        .collect();

    let outliers = OUTLIER_METRICS
        .iter()
        .filter_map(|&metric| outlier_summary(records, metric).map(|s| (metric.to_string(), s)))
        .collect();

    Ok(DataQualityReport {
        total_rows: records.len(),
        date_range: DateRange {
            start,
            end,
            days_covered,
        },
        budget_summary: budget_summary(records, &platforms),
        platforms,
        missing_values,
        data_completeness,
        outliers,
    })
}

fn completeness(records: &[RawRecord], platform: Platform, days_covered: u32) -> Completeness {
    let rows: Vec<&RawRecord> = records.iter().filter(|r| r.platform == Some(platform)).collect();
    let creatives: BTreeSet<&str> = rows.iter().filter_map(|r| r.creative_id.as_deref()).collect();

    let expected_rows = days_covered as usize * creatives.len();
    let actual_rows = rows.len();
    Completeness {
        expected_rows,
        actual_rows,
        missing_rows: expected_rows as i64 - actual_rows as i64,
        completeness_percentage: round_to(safe_div(actual_rows as f64, expected_rows as f64) * 100.0, 0),
    }
}

fn metric_value(record: &RawRecord, metric: &str) -> Option<f64> {
    match metric {
        "impressions" => record.impressions,
        "clicks" => record.clicks,
        "spend" => record.spend,
        _ => None,
    }
}

fn outlier_summary(records: &[RawRecord], metric: &str) -> Option<OutlierSummary> {
    let values: Vec<f64> = records.iter().filter_map(|r| metric_value(r, metric)).collect();
    if values.is_empty() {
        return None;
    }
    let bounds = IqrBounds::from_values(&values);

    let flagged: Vec<(&RawRecord, f64)> = records
        .iter()
        .filter_map(|r| metric_value(r, metric).map(|v| (r, v)))
        .filter(|(_, v)| bounds.is_outlier(*v))
        .collect();
    if flagged.is_empty() {
        return None;
    }

    metrics::counter!("ingestion.outliers_flagged").increment(flagged.len() as u64);
    Some(OutlierSummary {
        count: flagged.len(),
        percentage: round_to(flagged.len() as f64 / records.len() as f64 * 100.0, 2),
        max_value: flagged.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max),
        dates: flagged
            .iter()
            .filter_map(|(r, _)| r.date)
            .take(OUTLIER_EXAMPLE_DATES)
            .collect(),
    })
}

fn budget_summary(records: &[RawRecord], platforms: &[Platform]) -> BudgetSummary {
    let total: f64 = records.iter().filter_map(|r| r.spend).sum();
    let by_platform = platforms
        .iter()
        .map(|&p| {
            let spend: f64 = records
                .iter()
                .filter(|r| r.platform == Some(p))
                .filter_map(|r| r.spend)
                .sum();
            (
                p,
                PlatformSpend {
                    spend: round_to(spend, 2),
                    percentage: round_to(safe_div(spend, total) * 100.0, 2),
                },
            )
        })
        .collect();

    BudgetSummary {
        total_spend: round_to(total, 2),
        by_platform,
    }
}

// ─── Summary statistics ─────────────────────────────────────────────────

/// Headline totals over processed records, overall and per platform.
pub fn summary_statistics(records: &[ProcessedRecord]) -> SummaryStatistics {
    let cpms: Vec<f64> = records.iter().map(|r| r.record.cpm).collect();
    let ctrs: Vec<f64> = records.iter().map(|r| r.record.ctr).collect();
    let overall = OverallSummary {
        total_impressions: records.iter().map(|r| r.record.impressions).sum(),
        total_clicks: records.iter().map(|r| r.record.clicks).sum(),
        total_spend: round_to(records.iter().map(|r| r.record.spend).sum(), 2),
        avg_cpm: round_to(mean(&cpms), 2),
        avg_ctr: round_to(mean(&ctrs), 4),
        total_engagements: records.iter().map(|r| r.record.engagements).sum(),
    };

    let mut grouped: BTreeMap<Platform, Vec<&ProcessedRecord>> = BTreeMap::new();
    for r in records {
        grouped.entry(r.record.platform).or_default().push(r);
    }
    let by_platform = grouped
        .into_iter()
        .map(|(platform, rows)| {
            let cpms: Vec<f64> = rows.iter().map(|r| r.record.cpm).collect();
            let ctrs: Vec<f64> = rows.iter().map(|r| r.record.ctr).collect();
            let summary = PlatformSummary {
                impressions: rows.iter().map(|r| r.record.impressions).sum(),
                clicks: rows.iter().map(|r| r.record.clicks).sum(),
                spend: round_to(rows.iter().map(|r| r.record.spend).sum(), 2),
                avg_cpm: round_to(mean(&cpms), 2),
                avg_ctr: round_to(mean(&ctrs), 4),
                engagements: rows.iter().map(|r| r.record.engagements).sum(),
            };
            (platform, summary)
        })
        .collect();

    SummaryStatistics { overall, by_platform }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(day: u32, platform: Platform, creative: u32, impressions: f64, spend: f64) -> RawRecord {
        RawRecord {
            campaign_id: Some("CAMP_001".into()),
            campaign_name: Some("Spring Glow".into()),
            brand_name: Some("Lumen".into()),
            date: NaiveDate::from_ymd_opt(2024, 3, day),
            platform: Some(platform),
            creative_id: Some(format!("{}_creative_{}", platform, creative)),
            impressions: Some(impressions),
            reach: Some(impressions * 0.8),
            clicks: Some(impressions * 0.01),
            spend: Some(spend),
            engagements: Some(0.0),
            video_views: Some(impressions * 0.9),
            cpm: Some(5.0),
            ctr: Some(0.01),
            engagement_rate: Some(0.0),
        }
    }

    #[test]
    fn test_completeness_arithmetic() {
        // 4 days, meta has 2 creatives -> expected 8 rows; only 7 present.
        let mut records = Vec::new();
        for day in 1..=4 {
            for creative in 1..=2 {
                records.push(raw(day, Platform::Meta, creative, 1000.0, 10.0));
            }
        }
        records.remove(3);

        let report = validate(&records).unwrap();
        let meta = &report.data_completeness[&Platform::Meta];
        assert_eq!(meta.expected_rows, 8);
        assert_eq!(meta.actual_rows, 7);
        assert_eq!(meta.missing_rows, 1);
        assert_eq!(meta.completeness_percentage, 88.0);
        assert_eq!(report.date_range.days_covered, 4);
    }

    #[test]
    fn test_iqr_outlier_reported_once() {
        let impressions = [10.0, 11.0, 9.0, 10.0, 12.0, 1000.0];
        let records: Vec<RawRecord> = impressions
            .iter()
            .enumerate()
            .map(|(i, v)| raw(i as u32 + 1, Platform::Tiktok, 1, *v, 10.0))
            .collect();

        let report = validate(&records).unwrap();
        let summary = &report.outliers["impressions"];
        assert_eq!(summary.count, 1);
        assert_eq!(summary.max_value, 1000.0);
        assert_eq!(summary.percentage, 16.67);
        assert_eq!(summary.dates, vec![NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()]);
        // Spend is constant, so no fences are crossed.
        assert!(!report.outliers.contains_key("spend"));
    }

    #[test]
    fn test_missing_values_counted_per_field() {
        let mut records = vec![
            raw(1, Platform::Meta, 1, 100.0, 1.0),
            raw(2, Platform::Meta, 1, 100.0, 1.0),
        ];
        records[0].clicks = None;
        records[1].clicks = None;
        records[1].spend = None;

        let report = validate(&records).unwrap();
        assert_eq!(report.missing_values["clicks"], 2);
        assert_eq!(report.missing_values["spend"], 1);
        assert!(!report.missing_values.contains_key("impressions"));
    }

    #[test]
    fn test_budget_summary_percentages() {
        let records = vec![
            raw(1, Platform::Meta, 1, 100.0, 30.0),
            raw(1, Platform::Tiktok, 1, 100.0, 10.0),
        ];
        let report = validate(&records).unwrap();
        assert_eq!(report.budget_summary.total_spend, 40.0);
        assert_eq!(report.budget_summary.by_platform[&Platform::Meta].percentage, 75.0);
        assert_eq!(report.budget_summary.by_platform[&Platform::Tiktok].spend, 10.0);
        assert_eq!(report.platforms, vec![Platform::Meta, Platform::Tiktok]);
    }

    #[test]
    fn test_undated_dataset_rejected() {
        let mut record = raw(1, Platform::Meta, 1, 100.0, 1.0);
        record.date = None;
        assert!(matches!(validate(&[record]), Err(CampaignError::Load(_))));
    }
}
