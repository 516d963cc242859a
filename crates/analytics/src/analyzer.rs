//! Runs every analysis over one processed dataset.

use crate::anomalies::{detect_anomalies, AnomalyReport};
use crate::creative::{creative_breakdown, CreativeMetrics};
use crate::day_of_week::{day_of_week_patterns, DayOfWeekAnalysis};
use crate::kpis::{overall_kpis, platform_breakdown, OverallKpis, PlatformMetrics};
use crate::weekly::{weekly_breakdown, WeekKey, WeeklyMetrics};
use campaign_core::{Platform, ProcessedRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Complete analysis output, consumed downstream as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_kpis: OverallKpis,
    pub platform_analysis: BTreeMap<Platform, PlatformMetrics>,
    pub weekly_analysis: BTreeMap<WeekKey, WeeklyMetrics>,
    pub creative_analysis: BTreeMap<String, CreativeMetrics>,
    pub day_of_week_analysis: DayOfWeekAnalysis,
    pub anomalies: AnomalyReport,
    pub analysis_timestamp: DateTime<Utc>,
}

/// Read-only analyzer over processed records.
pub struct PerformanceAnalyzer<'a> {
    records: &'a [ProcessedRecord],
}

impl<'a> PerformanceAnalyzer<'a> {
    pub fn new(records: &'a [ProcessedRecord]) -> Self {
        Self { records }
    }

    pub fn overall_kpis(&self) -> OverallKpis {
        overall_kpis(self.records)
    }

    pub fn platform_analysis(&self) -> BTreeMap<Platform, PlatformMetrics> {
        platform_breakdown(self.records)
    }

    pub fn weekly_analysis(&self) -> BTreeMap<WeekKey, WeeklyMetrics> {
        weekly_breakdown(self.records)
    }

    pub fn creative_analysis(&self) -> BTreeMap<String, CreativeMetrics> {
        creative_breakdown(self.records)
    }

    pub fn day_of_week_analysis(&self) -> DayOfWeekAnalysis {
        day_of_week_patterns(self.records)
    }

    pub fn anomalies(&self) -> AnomalyReport {
        detect_anomalies(self.records)
    }

    pub fn run(&self) -> AnalysisResult {
        info!(rows = self.records.len(), "Starting performance analysis");

        let overall_kpis = self.overall_kpis();
        info!(
            impressions = overall_kpis.total_impressions,
            clicks = overall_kpis.total_clicks,
            spend = overall_kpis.total_spend,
            ctr = overall_kpis.average_ctr,
            "Overall KPIs calculated"
        );
        let platform_analysis = self.platform_analysis();
        let weekly_analysis = self.weekly_analysis();
        let creative_analysis = self.creative_analysis();
        let day_of_week_analysis = self.day_of_week_analysis();
        let anomalies = self.anomalies();

        info!(
            platforms = platform_analysis.len(),
            weeks = weekly_analysis.len(),
            creatives = creative_analysis.len(),
            high_performance_days = anomalies.summary.total_high_performance_days,
            "Performance analysis complete"
        );
        AnalysisResult {
            overall_kpis,
            platform_analysis,
            weekly_analysis,
            creative_analysis,
            day_of_week_analysis,
            anomalies,
            analysis_timestamp: Utc::now(),
        }
    }
}
