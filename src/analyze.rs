//! Aggregation of scan items into a report.
//!
//! Pure and deterministic: no filesystem access, ordered maps only, and a
//! total order on items, so the same input always yields the same report.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::RiskTier;
use crate::scan::ScanItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub bytes: u64,
    pub items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskReport {
    /// Largest first, ties broken by path then category id.
    pub items: Vec<ScanItem>,
    pub by_category: BTreeMap<String, CategoryTotal>,
    /// Always holds all three tiers, zero when empty.
    pub by_tier: BTreeMap<RiskTier, u64>,
    pub total_bytes: u64,
}

pub fn analyze(items: &[ScanItem]) -> DiskReport {
    let mut items = items.to_vec();
    items.sort_by(|a, b| {
        b.size_bytes
            .cmp(&a.size_bytes)
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });

    let mut by_category: BTreeMap<String, CategoryTotal> = BTreeMap::new();
    let mut by_tier: BTreeMap<RiskTier, u64> = RiskTier::ALL.iter().map(|&t| (t, 0)).collect();
    let mut total_bytes = 0u64;

    for item in &items {
        let category = by_category.entry(item.category_id.clone()).or_default();
        category.bytes = category.bytes.saturating_add(item.size_bytes);
        category.items += 1;

        let tier = by_tier.entry(item.risk).or_default();
        *tier = tier.saturating_add(item.size_bytes);

        total_bytes = total_bytes.saturating_add(item.size_bytes);
    }

    DiskReport {
        items,
        by_category,
        by_tier,
        total_bytes,
    }
}

impl DiskReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn largest(&self, n: usize) -> &[ScanItem] {
        &self.items[..n.min(self.items.len())]
    }

    pub fn category_total(&self, id: &str) -> CategoryTotal {
        self.by_category.get(id).copied().unwrap_or_default()
    }

    pub fn tier_total(&self, tier: RiskTier) -> u64 {
        self.by_tier.get(&tier).copied().unwrap_or(0)
    }

    /// Bytes held by items at or below `tier`.
    pub fn reclaimable_up_to(&self, tier: RiskTier) -> u64 {
        self.by_tier
            .iter()
            .filter(|(t, _)| t.within(tier))
            .fold(0u64, |acc, (_, bytes)| acc.saturating_add(*bytes))
    }

    pub fn items_in_category<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a ScanItem> {
        self.items.iter().filter(move |i| i.category_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(path: &str, category: &str, risk: RiskTier, size: u64) -> ScanItem {
        ScanItem {
            path: PathBuf::from(path),
            category_id: category.to_string(),
            root: PathBuf::from("/root"),
            size_bytes: size,
            last_modified: None,
            risk,
        }
    }

    fn sample() -> Vec<ScanItem> {
        vec![
            item("/c/npm", "npm_cache", RiskTier::Safe, 500),
            item("/c/docker", "docker_data", RiskTier::Review, 2_000),
            item("/c/mail", "mail_downloads", RiskTier::Risky, 40),
            item("/c/b", "pip_cache", RiskTier::Safe, 500),
            item("/c/npm-logs", "npm_cache", RiskTier::Safe, 7),
        ]
    }

    #[test]
    fn aggregates_sum_to_grand_total() {
        let report = analyze(&sample());

        let by_category: u64 = report.by_category.values().map(|c| c.bytes).sum();
        let by_tier: u64 = report.by_tier.values().sum();
        let by_items: u64 = report.items.iter().map(|i| i.size_bytes).sum();

        assert_eq!(report.total_bytes, 3_047);
        assert_eq!(by_category, report.total_bytes);
        assert_eq!(by_tier, report.total_bytes);
        assert_eq!(by_items, report.total_bytes);

        assert_eq!(report.category_total("npm_cache"), CategoryTotal { bytes: 507, items: 2 });
        assert_eq!(report.tier_total(RiskTier::Safe), 1_007);
        assert_eq!(report.tier_total(RiskTier::Risky), 40);
    }

    #[test]
    fn sorts_by_size_then_path() {
        let report = analyze(&sample());
        let order: Vec<_> = report.items.iter().map(|i| i.path.to_str().unwrap()).collect();
        assert_eq!(order, ["/c/docker", "/c/b", "/c/npm", "/c/mail", "/c/npm-logs"]);
        assert_eq!(report.largest(2).len(), 2);
        assert_eq!(report.largest(50).len(), 5);
    }

    #[test]
    fn analyze_is_idempotent() {
        let items = sample();
        let first = serde_json::to_string(&analyze(&items)).unwrap();
        let second = serde_json::to_string(&analyze(&items)).unwrap();
        assert_eq!(first, second);

        let mut reversed = items.clone();
        reversed.reverse();
        assert_eq!(analyze(&items), analyze(&reversed));
    }

    #[test]
    fn empty_input_keeps_every_tier() {
        let report = analyze(&[]);
        assert!(report.is_empty());
        assert_eq!(report.total_bytes, 0);
        assert_eq!(report.by_tier.len(), 3);
        assert_eq!(report.reclaimable_up_to(RiskTier::Risky), 0);
    }

    #[test]
    fn reclaimable_follows_tier_ranking() {
        let report = analyze(&sample());
        assert_eq!(report.reclaimable_up_to(RiskTier::Safe), 1_007);
        assert_eq!(report.reclaimable_up_to(RiskTier::Review), 3_007);
        assert_eq!(report.reclaimable_up_to(RiskTier::Risky), 3_047);
    }
}
