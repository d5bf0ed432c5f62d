//! Filesystem scanner.
//!
//! Resolves catalog categories to concrete, measured [`ScanItem`]s. A scan
//! never fails because of the filesystem: missing roots are skipped, and
//! unreadable or escaping paths become diagnostics.

pub mod matcher;
pub mod size;

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{Catalog, Category, RiskTier};
use crate::error::Result;

/// One measured match, owned by exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanItem {
    pub path: PathBuf,
    pub category_id: String,
    /// Root of the detection rule that produced this item.
    pub root: PathBuf,
    pub size_bytes: u64,
    pub last_modified: Option<i64>,
    /// Copied from the category at scan time.
    pub risk: RiskTier,
}

#[derive(Debug, Default, Serialize)]
pub struct ScanResult {
    pub items: Vec<ScanItem>,
    pub diagnostics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_memory_bytes: Option<usize>,
}

impl ScanResult {
    fn merge(&mut self, scan: CategoryScan) {
        self.items.extend(scan.items);
        self.diagnostics.extend(scan.diagnostics);
    }
}

struct CategoryScan {
    items: Vec<ScanItem>,
    diagnostics: Vec<String>,
}

pub struct Scanner<'a> {
    catalog: &'a Catalog,
    threads: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Scanner {
            catalog,
            threads: default_threads(),
        }
    }

    /// Upper bound on concurrently scanned categories. Zero means one.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Scans the given categories, or every category when `ids` is `None`.
    ///
    /// Fails only on unknown category ids. Items come back in catalog
    /// selection order regardless of how the work was scheduled.
    pub fn scan(&self, ids: Option<&[String]>) -> Result<ScanResult> {
        let start = Instant::now();
        let selected = self.select(ids)?;
        let now = SystemTime::now();

        let scans: Vec<CategoryScan> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
        {
            Ok(pool) => pool.install(|| {
                selected
                    .par_iter()
                    .map(|category| scan_category(category, now))
                    .collect()
            }),
            Err(e) => {
                warn!("could not start scan workers, scanning sequentially: {e}");
                selected
                    .iter()
                    .map(|category| scan_category(category, now))
                    .collect()
            }
        };

        let mut result = ScanResult::default();
        for scan in scans {
            result.merge(scan);
        }

        result.duration_ms = Some(start.elapsed().as_millis() as u64);
        result.peak_memory_bytes = memory_stats::memory_stats().map(|m| m.physical_mem);
        Ok(result)
    }

    fn select(&self, ids: Option<&[String]>) -> Result<Vec<&'a Category>> {
        let Some(ids) = ids else {
            return Ok(self.catalog.all_categories().iter().collect());
        };

        let mut seen = HashSet::new();
        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            let category = self.catalog.get(id)?;
            if seen.insert(category.id.as_str()) {
                selected.push(category);
            }
        }
        Ok(selected)
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8))
        .unwrap_or(4)
}

fn scan_category(category: &Category, now: SystemTime) -> CategoryScan {
    let mut items = Vec::new();
    let mut diagnostics = Vec::new();
    // real path is the dedup key within a category
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for rule in &category.rules {
        let root_real = match fs::canonicalize(rule.root()) {
            Ok(real) => real,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    category = %category.id,
                    root = %rule.root().display(),
                    "root not present, skipping"
                );
                continue;
            }
            Err(e) => {
                diagnostics.push(format!(
                    "{}: cannot resolve {}: {e}",
                    category.id,
                    rule.root().display()
                ));
                continue;
            }
        };

        let (candidates, warnings) = matcher::candidates(rule);
        diagnostics.extend(warnings.into_iter().map(|w| format!("{}: {w}", category.id)));

        for path in candidates {
            let real = match fs::canonicalize(&path) {
                Ok(real) => real,
                Err(e) => {
                    diagnostics.push(format!(
                        "{}: cannot resolve {}: {e}",
                        category.id,
                        path.display()
                    ));
                    continue;
                }
            };

            if !real.starts_with(&root_real) {
                debug!(
                    category = %category.id,
                    path = %path.display(),
                    target = %real.display(),
                    "match escapes its root"
                );
                diagnostics.push(format!(
                    "{}: {} resolves outside {}, ignored",
                    category.id,
                    path.display(),
                    rule.root().display()
                ));
                continue;
            }

            // deleting a link frees nothing, and an in-root target is
            // matched on its own path
            if is_symlink(&path) {
                debug!(category = %category.id, path = %path.display(), "symlinked match skipped");
                if path == rule.root() {
                    diagnostics.push(format!(
                        "{}: {} is a symlink, not followed",
                        category.id,
                        path.display()
                    ));
                }
                continue;
            }

            if !seen.insert(real) {
                continue;
            }

            let measured = match size::measure(&path) {
                Ok(measured) => measured,
                Err(e) => {
                    warn!(category = %category.id, path = %path.display(), "cannot measure: {e}");
                    diagnostics.push(format!(
                        "{}: cannot read {}: {e}",
                        category.id,
                        path.display()
                    ));
                    continue;
                }
            };

            for warning in measured.warnings {
                diagnostics.push(format!(
                    "{}: {warning} (size may be underestimated)",
                    category.id
                ));
            }

            if measured.size_bytes == 0 || measured.size_bytes < category.min_size_bytes {
                continue;
            }

            if !old_enough(category, measured.last_modified, now) {
                continue;
            }

            items.push(ScanItem {
                path,
                category_id: category.id.clone(),
                root: rule.root().to_path_buf(),
                size_bytes: measured.size_bytes,
                last_modified: measured.last_modified,
                risk: category.risk,
            });
        }
    }

    debug!(category = %category.id, items = items.len(), "category scanned");
    CategoryScan { items, diagnostics }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

// an item with an unknown mtime never counts as old
fn old_enough(category: &Category, last_modified: Option<i64>, now: SystemTime) -> bool {
    let Some(min_age) = category.min_age else {
        return true;
    };
    let Some(modified) = last_modified else {
        return false;
    };
    let Ok(now) = now.duration_since(UNIX_EPOCH) else {
        return false;
    };

    let age_secs = (now.as_secs() as i64).saturating_sub(modified);
    age_secs >= min_age.as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DetectionRule;
    use crate::error::Error;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(path: PathBuf, len: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; len]).unwrap();
    }

    #[test]
    fn missing_roots_contribute_nothing() {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::new(vec![
            Category::new("ghost", "Ghost", RiskTier::Safe, "absent")
                .with_rule(DetectionRule::path(dir.path().join("nope")).unwrap())
                .with_rule(DetectionRule::glob(dir.path().join("also-nope"), "*", 2).unwrap()),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).scan(None).unwrap();
        assert!(result.items.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn unknown_category_selection_fails() {
        let catalog = Catalog::new(Vec::new()).unwrap();
        let ids = vec!["does_not_exist".to_string()];

        let result = Scanner::new(&catalog).scan(Some(&ids));
        assert!(matches!(result, Err(Error::UnknownCategory(_))));
    }

    #[test]
    fn overlapping_rules_report_a_path_once() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("cache/blob"), 64);

        let catalog = Catalog::new(vec![
            Category::new("dup", "Dup", RiskTier::Safe, "twice")
                .with_rule(DetectionRule::path(dir.path().join("cache")).unwrap())
                .with_rule(DetectionRule::glob(dir.path(), "cache", 1).unwrap()),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).scan(None).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].size_bytes, 64);
    }

    #[test]
    fn cross_category_duplicates_stay_visible() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("shared/blob"), 10);

        let rule = || DetectionRule::path(dir.path().join("shared")).unwrap();
        let catalog = Catalog::new(vec![
            Category::new("one", "One", RiskTier::Safe, "").with_rule(rule()),
            Category::new("two", "Two", RiskTier::Review, "").with_rule(rule()),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).scan(None).unwrap();
        let owners: Vec<_> = result.items.iter().map(|i| i.category_id.as_str()).collect();
        assert_eq!(owners, ["one", "two"]);
    }

    #[test]
    fn items_copy_risk_and_root() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("proj/node_modules/x/index.js"), 300);

        let catalog = Catalog::new(vec![
            Category::new("node_modules", "Node", RiskTier::Review, "")
                .with_rule(DetectionRule::glob(dir.path(), "node_modules", 4).unwrap()),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).with_threads(1).scan(None).unwrap();
        assert_eq!(result.items.len(), 1);

        let item = &result.items[0];
        assert_eq!(item.path, dir.path().join("proj/node_modules"));
        assert_eq!(item.root, dir.path());
        assert_eq!(item.risk, RiskTier::Review);
        assert_eq!(item.size_bytes, 300);
        assert!(result.duration_ms.is_some());
    }

    #[test]
    fn small_and_empty_items_are_dropped() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("big/blob"), 2_000);
        write(dir.path().join("small/blob"), 20);
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let catalog = Catalog::new(vec![
            Category::new("sized", "Sized", RiskTier::Safe, "")
                .with_rule(DetectionRule::glob(dir.path(), "*", 1).unwrap())
                .with_min_size(1_000),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).scan(None).unwrap();
        let paths: Vec<_> = result.items.iter().map(|i| i.path.clone()).collect();
        assert_eq!(paths, vec![dir.path().join("big")]);
    }

    #[test]
    fn min_age_filters_fresh_items() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("fresh.dmg"), 50);

        let catalog = Catalog::new(vec![
            Category::new("downloads_old", "Old", RiskTier::Review, "")
                .with_rule(DetectionRule::glob(dir.path(), "*", 1).unwrap())
                .with_min_age(Duration::from_secs(30 * 24 * 60 * 60)),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).scan(None).unwrap();
        assert!(result.items.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escapes_are_rejected() {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        write(outside.path().join("precious/data"), 500);
        fs::create_dir_all(dir.path().join("proj")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("precious"),
            dir.path().join("proj/node_modules"),
        )
        .unwrap();

        let catalog = Catalog::new(vec![
            Category::new("node_modules", "Node", RiskTier::Safe, "")
                .with_rule(DetectionRule::glob(dir.path(), "node_modules", 4).unwrap()),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).scan(None).unwrap();
        assert!(result.items.is_empty());
        assert!(result.diagnostics.iter().any(|d| d.contains("resolves outside")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_sibling_does_not_shadow_its_target() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("b/blob"), 5_000);
        std::os::unix::fs::symlink(dir.path().join("b"), dir.path().join("a")).unwrap();

        let catalog = Catalog::new(vec![
            Category::new("caches", "Caches", RiskTier::Safe, "")
                .with_rule(DetectionRule::glob(dir.path(), "*", 1).unwrap()),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).scan(None).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].path, dir.path().join("b"));
        assert_eq!(result.items[0].size_bytes, 5_000);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_is_reported_not_measured() {
        let dir = TempDir::new().unwrap();
        write(dir.path().join("real-cache/blob"), 800);
        let real_cache = dir.path().join("real-cache");
        std::os::unix::fs::symlink(real_cache, dir.path().join("cache")).unwrap();

        let catalog = Catalog::new(vec![
            Category::new("cache", "Cache", RiskTier::Safe, "")
                .with_rule(DetectionRule::path(dir.path().join("cache")).unwrap()),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).scan(None).unwrap();
        assert!(result.items.is_empty());
        assert!(result.diagnostics.iter().any(|d| d.contains("is a symlink")));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_match_yields_no_item_but_scan_completes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        write(dir.path().join("locked/blob"), 10);
        write(dir.path().join("open/blob"), 10);
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permission bits, nothing to assert there
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let catalog = Catalog::new(vec![
            Category::new("caches", "Caches", RiskTier::Safe, "")
                .with_rule(DetectionRule::glob(dir.path(), "*", 1).unwrap()),
        ])
        .unwrap();

        let result = Scanner::new(&catalog).scan(None).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let paths: Vec<_> = result.items.iter().map(|i| i.path.clone()).collect();
        assert_eq!(paths, vec![dir.path().join("open")]);
        assert!(!result.diagnostics.is_empty());
    }
}
