//! Synthetic campaign performance data — deterministic multi-platform
//! simulation and data-quality corruption.

pub mod effects;
pub mod generator;
pub mod injector;
pub mod rng;

pub use generator::CampaignSimulator;
pub use injector::{CorruptionOutcome, DataQualityInjector};
pub use rng::{RandomStream, SeededStream};
