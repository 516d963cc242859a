use campaign_core::types::creative_id;
use campaign_core::{CalendarFeatures, PerformanceRecord, Platform, ProcessedRecord};
use chrono::{Duration, NaiveDate};

/// Monday 2024-03-04.
pub(crate) fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

/// Processed record `day` days into the campaign. Reach is 80% of
/// impressions; spend, cpm and ctr are taken as given.
#[allow(clippy::too_many_arguments)]
pub(crate) fn record(
    day: i64,
    platform: Platform,
    creative: u32,
    impressions: u64,
    clicks: u64,
    spend: f64,
    cpm: f64,
    ctr: f64,
) -> ProcessedRecord {
    let date = start() + Duration::days(day);
    ProcessedRecord {
        record: PerformanceRecord {
            campaign_id: "CAMP_001".into(),
            campaign_name: "Spring Glow".into(),
            brand_name: "Lumen".into(),
            date,
            platform,
            creative_id: creative_id(platform, creative),
            impressions,
            reach: impressions * 4 / 5,
            clicks,
            spend,
            engagements: 0,
            video_views: impressions * 9 / 10,
            cpm,
            ctr,
            engagement_rate: 0.0,
        },
        calendar: CalendarFeatures::derive(date, start()),
        platform_display: platform.display_name().into(),
    }
}
