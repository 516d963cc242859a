use crate::error::{CampaignError, CampaignResult};
use crate::types::Platform;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Tolerance on the sum of platform budget shares.
const BUDGET_SHARE_TOLERANCE: f64 = 0.01;

/// Root configuration for one simulation run. Loaded from a config file
/// and environment variables with the prefix `CAMPAIGN_IQ__`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub campaign: CampaignSettings,
    pub platforms: BTreeMap<Platform, PlatformConfig>,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSettings {
    pub brand_name: String,
    pub campaign_name: String,
    pub duration_days: u32,
    pub total_budget: f64,
    pub start_date: NaiveDate,
}

/// Baseline delivery characteristics for one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub avg_cpm: f64,
    pub avg_ctr: f64,
    #[serde(default = "default_engagement_rate")]
    pub avg_engagement_rate: f64,
    /// Fraction of the total budget, in `[0, 1]`.
    pub budget_percentage: f64,
    pub num_creatives: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_campaign_id")]
    pub campaign_id: String,
}

// Default functions
fn default_engagement_rate() -> f64 {
    0.03
}
fn default_seed() -> u64 {
    42
}
fn default_campaign_id() -> String {
    "CAMP_001".to_string()
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            campaign_id: default_campaign_id(),
        }
    }
}

impl Default for AppConfig {
    /// A four-week, three-platform campaign used by the CLI when no config
    /// file is given.
    fn default() -> Self {
        let mut platforms = BTreeMap::new();
        platforms.insert(
            Platform::GoogleDisplay,
            PlatformConfig {
                avg_cpm: 4.5,
                avg_ctr: 0.004,
                avg_engagement_rate: 0.0,
                budget_percentage: 0.3,
                num_creatives: 3,
            },
        );
        platforms.insert(
            Platform::Meta,
            PlatformConfig {
                avg_cpm: 9.0,
                avg_ctr: 0.012,
                avg_engagement_rate: 0.035,
                budget_percentage: 0.4,
                num_creatives: 2,
            },
        );
        platforms.insert(
            Platform::Tiktok,
            PlatformConfig {
                avg_cpm: 6.0,
                avg_ctr: 0.018,
                avg_engagement_rate: 0.06,
                budget_percentage: 0.3,
                num_creatives: 2,
            },
        );
        Self {
            campaign: CampaignSettings {
                brand_name: "Lumen".into(),
                campaign_name: "Spring Glow".into(),
                duration_days: 28,
                total_budget: 50_000.0,
                start_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap_or_default(),
            },
            platforms,
            simulation: SimulationSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (format picked by extension), with
    /// environment overrides such as `CAMPAIGN_IQ__SIMULATION__SEED=7`.
    pub fn load(path: impl AsRef<Path>) -> CampaignResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CampaignError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let builder = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("CAMPAIGN_IQ")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            platforms = config.platforms.len(),
            "Campaign configuration loaded"
        );
        Ok(config)
    }

    /// Reject configurations the simulator cannot run.
    pub fn validate(&self) -> CampaignResult<()> {
        let campaign = &self.campaign;
        if campaign.duration_days == 0 {
            return Err(invalid("campaign.duration_days must be at least 1"));
        }
        if !campaign.total_budget.is_finite() || campaign.total_budget < 0.0 {
            return Err(invalid("campaign.total_budget must be a non-negative number"));
        }
        if self.platforms.is_empty() {
            return Err(invalid("at least one platform must be configured"));
        }

        for (platform, pc) in &self.platforms {
            if !(pc.avg_cpm.is_finite() && pc.avg_cpm > 0.0) {
                return Err(invalid(format!("platforms.{platform}.avg_cpm must be positive")));
            }
            if !(pc.avg_ctr > 0.0 && pc.avg_ctr <= 1.0) {
                return Err(invalid(format!("platforms.{platform}.avg_ctr must be in (0, 1]")));
            }
            if !(0.0..=1.0).contains(&pc.avg_engagement_rate) {
                return Err(invalid(format!(
                    "platforms.{platform}.avg_engagement_rate must be in [0, 1]"
                )));
            }
            if !(0.0..=1.0).contains(&pc.budget_percentage) {
                return Err(invalid(format!(
                    "platforms.{platform}.budget_percentage must be in [0, 1]"
                )));
            }
            if pc.num_creatives == 0 {
                return Err(invalid(format!(
                    "platforms.{platform}.num_creatives must be at least 1"
                )));
            }
        }

        let share_sum: f64 = self.platforms.values().map(|p| p.budget_percentage).sum();
        if (share_sum - 1.0).abs() > BUDGET_SHARE_TOLERANCE {
            return Err(invalid(format!(
                "platform budget_percentage values sum to {share_sum:.4}, expected 1.0"
            )));
        }
        Ok(())
    }

    /// Total number of creatives across all configured platforms.
    pub fn total_creatives(&self) -> u32 {
        self.platforms.values().map(|p| p.num_creatives).sum()
    }
}

fn invalid(msg: impl Into<String>) -> CampaignError {
    CampaignError::Config(msg.into())
}
