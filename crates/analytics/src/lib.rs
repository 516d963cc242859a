//! Campaign performance analysis — KPIs, platform/weekly/creative
//! breakdowns, weekday-vs-weekend patterns, and daily anomalies.

pub mod analyzer;
pub mod anomalies;
pub mod creative;
pub mod day_of_week;
pub mod kpis;
pub mod weekly;

pub use analyzer::{AnalysisResult, PerformanceAnalyzer};
pub use anomalies::{Anomaly, AnomalyMetric, AnomalyReport};
pub use creative::CreativeMetrics;
pub use day_of_week::{DayOfWeekAnalysis, PeriodMetrics, WeekdayWeekend};
pub use kpis::{OverallKpis, PlatformMetrics};
pub use weekly::{WeekKey, WeeklyMetrics};

#[cfg(test)]
pub(crate) mod test_support;
