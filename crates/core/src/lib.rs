pub mod config;
pub mod error;
pub mod stats;
pub mod types;

pub use config::{AppConfig, CampaignSettings, PlatformConfig, SimulationSettings};
pub use error::{CampaignError, CampaignResult};
pub use types::{CalendarFeatures, PerformanceRecord, Platform, ProcessedRecord};
