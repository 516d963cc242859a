use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Advertising platforms the simulator and analysis understand.
///
/// Variant order matches the lexical order of the wire identifiers, so
/// sorting by `Platform` and sorting by the serialized name agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    GoogleDisplay,
    Meta,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::GoogleDisplay, Platform::Meta, Platform::Tiktok];

    /// Wire identifier, e.g. `google_display`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::GoogleDisplay => "google_display",
            Platform::Meta => "meta",
            Platform::Tiktok => "tiktok",
        }
    }

    /// Human-readable name used in reports and dashboards.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::GoogleDisplay => "Google Display",
            Platform::Meta => "Meta",
            Platform::Tiktok => "TikTok",
        }
    }

    /// Weekend performance factor applied to CTR and engagement rate.
    pub fn weekend_factor(&self) -> f64 {
        match self {
            Platform::GoogleDisplay => 0.95,
            Platform::Meta => 1.10,
            Platform::Tiktok => 1.20,
        }
    }

    /// Whether the platform reports engagements (likes, shares, comments).
    pub fn supports_engagement(&self) -> bool {
        matches!(self, Platform::Meta | Platform::Tiktok)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of delivery for one creative on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub campaign_id: String,
    pub campaign_name: String,
    pub brand_name: String,
    pub date: NaiveDate,
    pub platform: Platform,
    /// `<platform>_creative_<n>`.
    pub creative_id: String,
    pub impressions: u64,
    pub reach: u64,
    pub clicks: u64,
    pub spend: f64,
    pub engagements: u64,
    pub video_views: u64,
    pub cpm: f64,
    pub ctr: f64,
    pub engagement_rate: f64,
}

/// Calendar fields derived from a record's date relative to the campaign start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    pub days_since_start: u32,
    /// 1-indexed; days 0..=6 are week 1.
    pub week_number: u32,
    /// 0 = Monday, 6 = Sunday.
    pub day_of_week: u32,
    pub day_name: String,
    pub is_weekend: bool,
    pub month: u32,
    pub year: i32,
}

impl CalendarFeatures {
    /// Derive calendar fields for `date` in a campaign that began on `start`.
    /// Dates before `start` are treated as day 0.
    pub fn derive(date: NaiveDate, start: NaiveDate) -> Self {
        let days_since_start = u32::try_from((date - start).num_days()).unwrap_or(0);
        let weekday = date.weekday();
        Self {
            days_since_start,
            week_number: week_number(days_since_start),
            day_of_week: weekday.num_days_from_monday(),
            day_name: day_name(weekday).to_string(),
            is_weekend: is_weekend(weekday),
            month: date.month(),
            year: date.year(),
        }
    }
}

/// A record after ingestion: the reported fields plus calendar enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    #[serde(flatten)]
    pub record: PerformanceRecord,
    #[serde(flatten)]
    pub calendar: CalendarFeatures,
    pub platform_display: String,
}

pub fn week_number(days_since_start: u32) -> u32 {
    days_since_start / 7 + 1
}

pub fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Creative identifier for the `ordinal`-th creative on `platform`.
pub fn creative_id(platform: Platform, ordinal: u32) -> String {
    format!("{}_creative_{}", platform.as_str(), ordinal)
}

/// Ordinal parsed from a `<platform>_creative_<n>` identifier.
pub fn creative_ordinal(creative_id: &str) -> Option<u32> {
    creative_id
        .rsplit_once("_creative_")
        .and_then(|(_, n)| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_features() {
        // 2024-03-04 is a Monday.
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let f = CalendarFeatures::derive(sunday, start);
        assert_eq!(f.days_since_start, 6);
        assert_eq!(f.week_number, 1);
        assert_eq!(f.day_of_week, 6);
        assert_eq!(f.day_name, "Sunday");
        assert!(f.is_weekend);

        let next_monday = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let f = CalendarFeatures::derive(next_monday, start);
        assert_eq!(f.week_number, 2);
        assert!(!f.is_weekend);
        assert_eq!(f.month, 3);
        assert_eq!(f.year, 2024);
    }

    #[test]
    fn test_platform_wire_names() {
        let json = serde_json::to_string(&Platform::GoogleDisplay).unwrap();
        assert_eq!(json, "\"google_display\"");
        let parsed: Platform = serde_json::from_str("\"tiktok\"").unwrap();
        assert_eq!(parsed, Platform::Tiktok);
        assert_eq!(creative_id(Platform::Meta, 2), "meta_creative_2");
        assert_eq!(creative_ordinal("google_display_creative_10"), Some(10));
        assert_eq!(creative_ordinal("meta_hero_video"), None);
    }

    #[test]
    fn test_platform_order_matches_names() {
        let mut names: Vec<&str> = Platform::ALL.iter().map(|p| p.as_str()).collect();
        names.sort();
        let ordered: Vec<&str> = Platform::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, ordered);
    }

    #[test]
    fn test_processed_record_flattens() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let record = PerformanceRecord {
            campaign_id: "CAMP_001".into(),
            campaign_name: "Spring Glow".into(),
            brand_name: "Lumen".into(),
            date: start,
            platform: Platform::Meta,
            creative_id: creative_id(Platform::Meta, 1),
            impressions: 10_000,
            reach: 8_000,
            clicks: 250,
            spend: 80.0,
            engagements: 300,
            video_views: 9_000,
            cpm: 8.0,
            ctr: 0.025,
            engagement_rate: 0.03,
        };
        let processed = ProcessedRecord {
            record,
            calendar: CalendarFeatures::derive(start, start),
            platform_display: Platform::Meta.display_name().into(),
        };
        let value = serde_json::to_value(&processed).unwrap();
        assert_eq!(value["date"], "2024-03-04");
        assert_eq!(value["week_number"], 1);
        assert_eq!(value["platform_display"], "Meta");

        let back: ProcessedRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, processed);
    }
}
