//! Creative performance and per-platform CTR ranking.

use crate::kpis::Aggregate;
use campaign_core::stats::round_to;
use campaign_core::types::creative_ordinal;
use campaign_core::{Platform, ProcessedRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeMetrics {
    pub platform: Platform,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub avg_ctr: f64,
    pub avg_cpm: f64,
    pub avg_engagement_rate: f64,
    pub days_active: usize,
    /// 1 = highest average CTR on the platform.
    pub rank_by_ctr: u32,
}

/// Per-creative metrics keyed by creative id.
///
/// Ranks are assigned within each platform by descending average CTR. Ties
/// go to the lower creative ordinal (`_creative_<n>`), so gaps in reporting
/// never reorder equal creatives.
pub fn creative_breakdown(records: &[ProcessedRecord]) -> BTreeMap<String, CreativeMetrics> {
    // (creative_id, platform of first record, aggregate), in first-seen order
    let mut groups: Vec<(&str, Platform, Aggregate)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for r in records {
        let id = r.record.creative_id.as_str();
        let slot = *index.entry(id).or_insert_with(|| {
            groups.push((id, r.record.platform, Aggregate::default()));
            groups.len() - 1
        });
        groups[slot].2.add(r);
    }

    let mut ranks: HashMap<&str, u32> = HashMap::new();
    let mut by_platform: BTreeMap<Platform, Vec<(&str, f64, u32)>> = BTreeMap::new();
    for (id, platform, agg) in &groups {
        let ordinal = creative_ordinal(id).unwrap_or(u32::MAX);
        by_platform
            .entry(*platform)
            .or_default()
            .push((*id, round_to(agg.avg_ctr(), 4), ordinal));
    }
    for creatives in by_platform.values_mut() {
        // Unparseable ids sort last; the stable sort keeps them in first-seen order.
        creatives.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.2.cmp(&b.2)));
        for (rank, (id, ..)) in creatives.iter().enumerate() {
            ranks.insert(*id, rank as u32 + 1);
        }
    }

    groups
        .into_iter()
        .map(|(id, platform, agg)| {
            let metrics = CreativeMetrics {
                platform,
                impressions: agg.impressions,
                clicks: agg.clicks,
                spend: round_to(agg.spend, 2),
                avg_ctr: round_to(agg.avg_ctr(), 4),
                avg_cpm: round_to(agg.avg_cpm(), 2),
                avg_engagement_rate: round_to(agg.avg_engagement_rate(), 4),
                days_active: agg.days_with_data(),
                rank_by_ctr: ranks.get(id).copied().unwrap_or_default(),
            };
            (id.to_string(), metrics)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    #[test]
    fn test_ranks_by_descending_ctr_per_platform() {
        let records = vec![
            record(0, Platform::Meta, 1, 1_000, 10, 5.0, 5.0, 0.010),
            record(0, Platform::Meta, 2, 1_000, 30, 5.0, 5.0, 0.030),
            record(0, Platform::Meta, 3, 1_000, 20, 5.0, 5.0, 0.020),
            record(0, Platform::Tiktok, 1, 1_000, 5, 5.0, 5.0, 0.005),
        ];
        let creatives = creative_breakdown(&records);
        assert_eq!(creatives["meta_creative_2"].rank_by_ctr, 1);
        assert_eq!(creatives["meta_creative_3"].rank_by_ctr, 2);
        assert_eq!(creatives["meta_creative_1"].rank_by_ctr, 3);
        assert_eq!(creatives["tiktok_creative_1"].rank_by_ctr, 1);
    }

    #[test]
    fn test_ties_break_by_creative_ordinal() {
        let records = vec![
            record(0, Platform::Tiktok, 2, 1_000, 10, 5.0, 5.0, 0.01),
            record(0, Platform::Tiktok, 3, 1_000, 10, 5.0, 5.0, 0.01),
            record(1, Platform::Tiktok, 1, 1_000, 10, 5.0, 5.0, 0.01),
            record(1, Platform::Tiktok, 2, 1_000, 10, 5.0, 5.0, 0.01),
        ];
        // creative_1 lost its day-0 row but still wins the tie.
        let creatives = creative_breakdown(&records);
        assert_eq!(creatives["tiktok_creative_1"].rank_by_ctr, 1);
        assert_eq!(creatives["tiktok_creative_2"].rank_by_ctr, 2);
        assert_eq!(creatives["tiktok_creative_3"].rank_by_ctr, 3);
    }

    #[test]
    fn test_ordinals_compare_numerically() {
        let records = vec![
            record(0, Platform::Meta, 10, 1_000, 10, 5.0, 5.0, 0.01),
            record(0, Platform::Meta, 2, 1_000, 10, 5.0, 5.0, 0.01),
        ];
        let creatives = creative_breakdown(&records);
        assert_eq!(creatives["meta_creative_2"].rank_by_ctr, 1);
        assert_eq!(creatives["meta_creative_10"].rank_by_ctr, 2);
    }

    #[test]
    fn test_ranks_are_gapless_permutation() {
        let records: Vec<_> = (1..=5)
            .flat_map(|c| (0..3).map(move |d| record(d, Platform::GoogleDisplay, c, 1_000, c as u64, 5.0, 5.0, c as f64 / 1000.0)))
            .collect();
        let creatives = creative_breakdown(&records);
        let mut ranks: Vec<u32> = creatives.values().map(|c| c.rank_by_ctr).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert_eq!(creatives["google_display_creative_5"].rank_by_ctr, 1);
        assert_eq!(creatives["google_display_creative_1"].days_active, 3);
    }
}
