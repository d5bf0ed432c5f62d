use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::Selector;
use crate::analyze::DiskReport;
use crate::catalog::RiskTier;
use crate::error::{Error, Result};
use crate::scan::ScanItem;
use crate::util::format_bytes;

/// Selections that would delete more than this are refused (100 GiB).
pub const MAX_CLEANUP_BYTES: u64 = 100 * 1024 * 1024 * 1024;

/// Resolves `selector` against `report` under the default size limit.
pub fn plan(report: &DiskReport, selector: &Selector) -> Result<Vec<ScanItem>> {
    plan_with_limit(report, selector, MAX_CLEANUP_BYTES)
}

/// Resolves `selector` against `report`.
///
/// Tier and category selections keep report order; path selections follow
/// the order the paths were given in. A category without items or a path not
/// in the report is a selection error, never silently dropped.
///
/// A path reported by more than one category is selected once, and carries
/// the strictest tier any of them gave it. Fails when the deletable bytes
/// (risky items excluded) exceed `limit`.
pub fn plan_with_limit(
    report: &DiskReport,
    selector: &Selector,
    limit: u64,
) -> Result<Vec<ScanItem>> {
    let selected = select(report, selector)?;

    let deletable = selected
        .iter()
        .filter(|item| item.risk != RiskTier::Risky)
        .fold(0u64, |total, item| total.saturating_add(item.size_bytes));

    if deletable > limit {
        return Err(Error::Selection(format!(
            "cleanup of {} exceeds the safety limit of {}",
            format_bytes(deletable),
            format_bytes(limit)
        )));
    }
    Ok(selected)
}

fn select(report: &DiskReport, selector: &Selector) -> Result<Vec<ScanItem>> {
    let strictest = strictest_tiers(report);
    let mut seen: HashSet<&Path> = HashSet::new();

    match selector {
        Selector::ByTier(tier) => Ok(report
            .items
            .iter()
            .filter(|item| seen.insert(&item.path))
            .map(|item| lifted(item, &strictest))
            .filter(|item| item.risk.within(*tier))
            .collect()),

        Selector::ByCategory(id) => {
            let items: Vec<ScanItem> = report
                .items_in_category(id)
                .filter(|item| seen.insert(&item.path))
                .map(|item| lifted(item, &strictest))
                .collect();
            if items.is_empty() {
                return Err(Error::Selection(format!(
                    "category '{id}' has no items in this report"
                )));
            }
            Ok(items)
        }

        Selector::ByPaths(paths) => {
            let mut selected = Vec::new();
            let mut missing = Vec::new();

            for path in paths {
                if !seen.insert(path) {
                    continue;
                }

                match report.items.iter().find(|i| &i.path == path) {
                    Some(item) => selected.push(lifted(item, &strictest)),
                    None => missing.push(path.display().to_string()),
                }
            }

            if !missing.is_empty() {
                return Err(Error::Selection(format!(
                    "not in this report: {}",
                    missing.join(", ")
                )));
            }
            Ok(selected)
        }
    }
}

fn strictest_tiers(report: &DiskReport) -> HashMap<&Path, RiskTier> {
    let mut tiers: HashMap<&Path, RiskTier> = HashMap::new();
    for item in &report.items {
        let tier = tiers.entry(&item.path).or_insert(item.risk);
        *tier = (*tier).max(item.risk);
    }
    tiers
}

fn lifted(item: &ScanItem, strictest: &HashMap<&Path, RiskTier>) -> ScanItem {
    let mut item = item.clone();
    if let Some(&tier) = strictest.get(item.path.as_path()) {
        item.risk = tier;
    }
    item
}
