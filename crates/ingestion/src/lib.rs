//! Ingestion and validation — loads raw campaign exports, reports on their
//! quality, and turns them into calendar-enriched, normalized records.

pub mod features;
pub mod normalize;
pub mod pipeline;
pub mod quality;
pub mod source;

pub use pipeline::{DataIngestion, QualityReport};
pub use quality::{DataQualityReport, SummaryStatistics};
pub use source::{DataSource, RawRecord};
