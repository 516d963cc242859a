//! Campaign simulator: one synthetic performance record per
//! (platform, creative, day), composed from the effect models.

use crate::effects;
use crate::rng::{RandomStream, SeededStream};
use campaign_core::stats::round_to;
use campaign_core::types::{creative_id, is_weekend, week_number};
use campaign_core::{AppConfig, CampaignResult, PerformanceRecord, Platform, PlatformConfig};
use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

/// Generates a deterministic synthetic dataset from a validated configuration.
pub struct CampaignSimulator {
    config: AppConfig,
}

impl CampaignSimulator {
    /// Validate `config` and build a simulator for it.
    pub fn new(config: AppConfig) -> CampaignResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Generate the dataset from a fresh stream seeded with `seed`.
    pub fn generate(&self, seed: u64) -> Vec<PerformanceRecord> {
        let mut stream = SeededStream::new(seed);
        self.generate_with(&mut stream)
    }

    /// Generate the dataset, drawing from `stream` in platform → creative →
    /// day order. The result is sorted by (date, platform, creative_id).
    pub fn generate_with<R: RandomStream + ?Sized>(&self, stream: &mut R) -> Vec<PerformanceRecord> {
        let campaign = &self.config.campaign;
        let capacity = campaign.duration_days as usize * self.config.total_creatives() as usize;
        let mut records = Vec::with_capacity(capacity);

        for (&platform, platform_config) in &self.config.platforms {
            for ordinal in 1..=platform_config.num_creatives {
                for day in 0..campaign.duration_days {
                    let date = campaign.start_date + Duration::days(i64::from(day));
                    records.push(self.daily_record(date, day, platform, ordinal, platform_config, stream));
                }
            }
            debug!(
                platform = %platform,
                creatives = platform_config.num_creatives,
                "Platform simulated"
            );
        }

        records.sort_by(|a, b| {
            (a.date, a.platform, a.creative_id.as_str()).cmp(&(b.date, b.platform, b.creative_id.as_str()))
        });

        metrics::counter!("simulator.records_generated").increment(records.len() as u64);
        info!(
            records = records.len(),
            platforms = self.config.platforms.len(),
            days = campaign.duration_days,
            "Campaign data generated"
        );
        records
    }

    /// Planned spend for one creative on one day.
    pub fn planned_daily_budget(&self, platform_config: &PlatformConfig) -> f64 {
        let campaign = &self.config.campaign;
        campaign.total_budget * platform_config.budget_percentage
            / f64::from(campaign.duration_days)
            / f64::from(platform_config.num_creatives)
    }

    fn daily_record<R: RandomStream + ?Sized>(
        &self,
        date: NaiveDate,
        days_since_start: u32,
        platform: Platform,
        ordinal: u32,
        platform_config: &PlatformConfig,
        stream: &mut R,
    ) -> PerformanceRecord {
        let weekend = is_weekend(date.weekday());
        let week = week_number(days_since_start);

        let learning = effects::learning_phase(days_since_start);
        let fatigue = effects::ad_fatigue(week, stream);
        let dow = effects::day_of_week(platform, weekend);
        let creative = effects::creative(ordinal);

        let mut cpm = platform_config.avg_cpm * learning.cpm;
        let mut ctr = platform_config.avg_ctr * learning.ctr * fatigue.ctr * dow * creative;
        let mut engagement_rate = platform_config.avg_engagement_rate * fatigue.engagement * dow * creative;

        cpm *= stream.uniform(0.90, 1.10);
        ctr *= stream.uniform(0.90, 1.10);
        engagement_rate *= stream.uniform(0.90, 1.10);

        // Rates are proportions of impressions.
        let ctr = ctr.min(1.0);
        let engagement_rate = engagement_rate.min(1.0);

        let spend = self.planned_daily_budget(platform_config) * stream.uniform(0.95, 1.05);
        let impressions = (spend / cpm * 1000.0).floor() as u64;
        let reach = (impressions as f64 * stream.uniform(0.70, 0.90)).floor() as u64;
        let clicks = (impressions as f64 * ctr).floor() as u64;
        let (engagements, engagement_rate) = if platform.supports_engagement() {
            ((impressions as f64 * engagement_rate).floor() as u64, round_to(engagement_rate, 4))
        } else {
            (0, 0.0)
        };
        let video_views = (impressions as f64 * stream.uniform(0.80, 0.95)).floor() as u64;

        let campaign = &self.config.campaign;
        PerformanceRecord {
            campaign_id: self.config.simulation.campaign_id.clone(),
            campaign_name: campaign.campaign_name.clone(),
            brand_name: campaign.brand_name.clone(),
            date,
            platform,
            creative_id: creative_id(platform, ordinal),
            impressions,
            reach,
            clicks,
            spend: round_to(spend, 2),
            engagements,
            video_views,
            cpm: round_to(cpm, 2),
            ctr: round_to(ctr, 4),
            engagement_rate,
        }
    }
}
