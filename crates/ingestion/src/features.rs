//! Calendar feature derivation.

use crate::source::RawRecord;
use campaign_core::{CalendarFeatures, Platform};
use chrono::NaiveDate;
use tracing::{info, warn};

/// A raw record whose identity fields are known, with its calendar position.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub date: NaiveDate,
    pub platform: Platform,
    pub creative_id: String,
    pub calendar: CalendarFeatures,
    pub raw: RawRecord,
}

/// Sort records chronologically and attach calendar features measured from
/// the earliest date present.
///
/// Rows without a date, platform or creative cannot be placed and are
/// discarded. The sort is stable, so same-day rows keep their input order.
pub fn derive_features(records: &[RawRecord]) -> Vec<DerivedRow> {
    let mut placed: Vec<(NaiveDate, Platform, String, &RawRecord)> = records
        .iter()
        .filter_map(|r| match (r.date, r.platform, r.creative_id.as_ref()) {
            (Some(date), Some(platform), Some(creative)) => Some((date, platform, creative.clone(), r)),
            _ => None,
        })
        .collect();

    let discarded = records.len() - placed.len();
    if discarded > 0 {
        metrics::counter!("ingestion.rows_discarded").increment(discarded as u64);
        warn!(discarded, "Rows missing date, platform or creative were discarded");
    }

    placed.sort_by_key(|(date, ..)| *date);
    let Some(start) = placed.first().map(|(date, ..)| *date) else {
        return Vec::new();
    };

    let rows: Vec<DerivedRow> = placed
        .into_iter()
        .map(|(date, platform, creative_id, raw)| DerivedRow {
            date,
            platform,
            creative_id,
            calendar: CalendarFeatures::derive(date, start),
            raw: raw.clone(),
        })
        .collect();

    info!(rows = rows.len(), start = %start, "Derived calendar features");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: Option<NaiveDate>, creative: &str) -> RawRecord {
        RawRecord {
            date,
            platform: Some(Platform::Meta),
            creative_id: Some(creative.to_string()),
            ..Default::default()
        }
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 3, d)
    }

    #[test]
    fn test_sorted_and_measured_from_first_date() {
        let records = vec![
            raw(day(12), "meta_creative_1"),
            raw(day(4), "meta_creative_2"),
            raw(day(4), "meta_creative_1"),
            raw(day(9), "meta_creative_1"),
        ];
        let rows = derive_features(&records);
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(4).unwrap(), day(4).unwrap(), day(9).unwrap(), day(12).unwrap()]);
        // Stable: same-day rows keep input order.
        assert_eq!(rows[0].creative_id, "meta_creative_2");

        assert_eq!(rows[0].calendar.days_since_start, 0);
        assert_eq!(rows[2].calendar.days_since_start, 5);
        assert_eq!(rows[3].calendar.days_since_start, 8);
        assert_eq!(rows[3].calendar.week_number, 2);
        // 2024-03-09 is a Saturday.
        assert!(rows[2].calendar.is_weekend);
        assert_eq!(rows[2].calendar.day_name, "Saturday");
        assert_eq!(rows[2].calendar.day_of_week, 5);
    }

    #[test]
    fn test_rows_without_identity_are_discarded() {
        let mut orphan = raw(day(5), "meta_creative_1");
        orphan.platform = None;
        let records = vec![raw(None, "meta_creative_1"), orphan, raw(day(6), "meta_creative_1")];
        let rows = derive_features(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].calendar.days_since_start, 0);
    }
}
