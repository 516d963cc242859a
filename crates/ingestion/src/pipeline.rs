//! Staged ingestion: load → validate → derive → normalize.
//!
//! Each stage reads the output of the one before it; calling a stage early is
//! a sequence error rather than a silent no-op.

use crate::features::{derive_features, DerivedRow};
use crate::normalize::normalize;
use crate::quality::{self, DataQualityReport, SummaryStatistics};
use crate::source::{DataSource, RawRecord};
use campaign_core::{CampaignError, CampaignResult, ProcessedRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Everything ingestion learned about a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub data_quality: DataQualityReport,
    pub summary_statistics: SummaryStatistics,
}

pub struct DataIngestion {
    source: DataSource,
    raw: Option<Vec<RawRecord>>,
    quality: Option<DataQualityReport>,
    derived: Option<Vec<DerivedRow>>,
    processed: Option<Vec<ProcessedRecord>>,
}

impl DataIngestion {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            raw: None,
            quality: None,
            derived: None,
            processed: None,
        }
    }

    /// Read the source. Resets any later stage output.
    pub fn load(&mut self) -> CampaignResult<&[RawRecord]> {
        let records = self.source.load()?;
        self.quality = None;
        self.derived = None;
        self.processed = None;
        Ok(self.raw.insert(records).as_slice())
    }

    pub fn validate(&mut self) -> CampaignResult<&DataQualityReport> {
        let raw = self
            .raw
            .as_deref()
            .ok_or_else(|| sequence("no data loaded; call load() before validate()"))?;
        let report = quality::validate(raw)?;
        info!(
            rows = report.total_rows,
            start = %report.date_range.start,
            end = %report.date_range.end,
            missing_values = report.missing_values.values().sum::<usize>(),
            outlier_rows = report.outliers.values().map(|o| o.count).sum::<usize>(),
            "Data validation complete"
        );
        Ok(&*self.quality.insert(report))
    }

    pub fn derive_features(&mut self) -> CampaignResult<&[DerivedRow]> {
        if self.quality.is_none() {
            return Err(sequence("data not validated; call validate() before derive_features()"));
        }
        let raw = self
            .raw
            .as_deref()
            .ok_or_else(|| sequence("no data loaded; call load() before derive_features()"))?;
        let rows = derive_features(raw);
        Ok(self.derived.insert(rows).as_slice())
    }

    pub fn normalize(&mut self) -> CampaignResult<&[ProcessedRecord]> {
        let derived = self
            .derived
            .as_deref()
            .ok_or_else(|| sequence("no derived features; call derive_features() before normalize()"))?;
        let processed = normalize(derived);
        info!(rows = processed.len(), "Platform data normalized");
        Ok(self.processed.insert(processed).as_slice())
    }

    /// Processed records, available once `normalize` has run.
    pub fn processed(&self) -> CampaignResult<&[ProcessedRecord]> {
        self.processed
            .as_deref()
            .ok_or_else(|| sequence("no processed data; run the pipeline first"))
    }

    pub fn summary_statistics(&self) -> CampaignResult<SummaryStatistics> {
        Ok(quality::summary_statistics(self.processed()?))
    }

    /// Run every stage in order and return the processed records with the
    /// combined quality report.
    pub fn run(&mut self) -> CampaignResult<(Vec<ProcessedRecord>, QualityReport)> {
        self.load()?;
        let data_quality = self.validate()?.clone();
        self.derive_features()?;
        let processed = self.normalize()?.to_vec();
        let summary_statistics = self.summary_statistics()?;

        info!(
            impressions = summary_statistics.overall.total_impressions,
            clicks = summary_statistics.overall.total_clicks,
            spend = summary_statistics.overall.total_spend,
            avg_ctr = summary_statistics.overall.avg_ctr,
            "Data ingestion complete"
        );
        Ok((
            processed,
            QualityReport {
                data_quality,
                summary_statistics,
            },
        ))
    }
}

fn sequence(msg: &str) -> CampaignError {
    CampaignError::Sequence(msg.to_string())
}
