//! Raw record shape at the ingestion boundary and the sources it is read from.

use campaign_core::{CampaignError, CampaignResult, PerformanceRecord, Platform};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::info;

/// A record as reported by a platform export. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub brand_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub platform: Option<Platform>,
    pub creative_id: Option<String>,
    pub impressions: Option<f64>,
    pub reach: Option<f64>,
    pub clicks: Option<f64>,
    pub spend: Option<f64>,
    pub engagements: Option<f64>,
    pub video_views: Option<f64>,
    pub cpm: Option<f64>,
    pub ctr: Option<f64>,
    pub engagement_rate: Option<f64>,
}

impl RawRecord {
    /// Names of the fields that carry no value, in column order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            ("campaign_id", self.campaign_id.is_some()),
            ("campaign_name", self.campaign_name.is_some()),
            ("brand_name", self.brand_name.is_some()),
            ("date", self.date.is_some()),
            ("platform", self.platform.is_some()),
            ("creative_id", self.creative_id.is_some()),
            ("impressions", self.impressions.is_some()),
            ("reach", self.reach.is_some()),
            ("clicks", self.clicks.is_some()),
            ("spend", self.spend.is_some()),
            ("engagements", self.engagements.is_some()),
            ("video_views", self.video_views.is_some()),
            ("cpm", self.cpm.is_some()),
            ("ctr", self.ctr.is_some()),
            ("engagement_rate", self.engagement_rate.is_some()),
        ];
        present
            .into_iter()
            .filter(|(_, is_present)| !is_present)
            .map(|(name, _)| name)
            .collect()
    }
}

impl From<PerformanceRecord> for RawRecord {
    fn from(r: PerformanceRecord) -> Self {
        Self {
            campaign_id: Some(r.campaign_id),
            campaign_name: Some(r.campaign_name),
            brand_name: Some(r.brand_name),
            date: Some(r.date),
            platform: Some(r.platform),
            creative_id: Some(r.creative_id),
            impressions: Some(r.impressions as f64),
            reach: Some(r.reach as f64),
            clicks: Some(r.clicks as f64),
            spend: Some(r.spend),
            engagements: Some(r.engagements as f64),
            video_views: Some(r.video_views as f64),
            cpm: Some(r.cpm),
            ctr: Some(r.ctr),
            engagement_rate: Some(r.engagement_rate),
        }
    }
}

/// Where the ingestion pipeline reads its records from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A JSON array of records on disk.
    JsonFile(PathBuf),
    /// Records already in memory, e.g. straight from the simulator.
    Records(Vec<RawRecord>),
}

impl DataSource {
    pub fn from_records(records: impl IntoIterator<Item = PerformanceRecord>) -> Self {
        Self::Records(records.into_iter().map(RawRecord::from).collect())
    }

    /// Read every record from the source. An empty dataset is a load error.
    pub fn load(&self) -> CampaignResult<Vec<RawRecord>> {
        let records = match self {
            DataSource::JsonFile(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
                    ErrorKind::NotFound => {
                        CampaignError::Load(format!("data file not found: {}", path.display()))
                    }
                    _ => CampaignError::Load(format!("cannot read {}: {e}", path.display())),
                })?;
                serde_json::from_str::<Vec<RawRecord>>(&text).map_err(|e| {
                    CampaignError::Load(format!("malformed data in {}: {e}", path.display()))
                })?
            }
            DataSource::Records(records) => records.clone(),
        };

        if records.is_empty() {
            return Err(CampaignError::Load("data source contains no records".into()));
        }
        metrics::counter!("ingestion.rows_loaded").increment(records.len() as u64);
        info!(rows = records.len(), "Campaign data loaded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_load_error() {
        let source = DataSource::JsonFile(PathBuf::from("/nonexistent/campaign_data.json"));
        let err = source.load().unwrap_err();
        assert!(matches!(err, CampaignError::Load(msg) if msg.contains("not found")));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let path = std::env::temp_dir().join(format!("campaign-iq-malformed-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = DataSource::JsonFile(path.clone()).load().unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, CampaignError::Load(_)));
    }

    #[test]
    fn test_empty_source_is_load_error() {
        let err = DataSource::Records(Vec::new()).load().unwrap_err();
        assert!(matches!(err, CampaignError::Load(_)));
    }

    #[test]
    fn test_nulls_and_absent_keys_parse_as_missing() {
        let json = r#"[{"date": "2024-03-04", "platform": "meta", "creative_id": "meta_creative_1",
                        "impressions": 1000, "clicks": null, "spend": 12.5}]"#;
        let records: Vec<RawRecord> = serde_json::from_str(json).unwrap();
        let missing = records[0].missing_fields();
        assert!(missing.contains(&"clicks"));
        assert!(missing.contains(&"reach"));
        assert!(!missing.contains(&"impressions"));
        assert_eq!(records[0].platform, Some(Platform::Meta));
    }
}
