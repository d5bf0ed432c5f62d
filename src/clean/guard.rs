//! Execution-time path checks.

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::scan::ScanItem;

// locations that must never be removed as a whole, whatever matched them
const BLOCKED_SYSTEM: [&str; 9] = [
    "/",
    "/System",
    "/Library",
    "/Applications",
    "/usr",
    "/bin",
    "/sbin",
    "/var",
    "/private",
];
const BLOCKED_HOME: [&str; 9] = [
    "",
    "Documents",
    "Desktop",
    "Pictures",
    "Music",
    "Movies",
    "Code",
    "Projects",
    "Work",
];

/// Paths and categories the executor refuses to touch.
///
/// `blocked` entries protect only the exact path; `paths` protect the path
/// and everything below it.
#[derive(Debug, Clone, Default)]
pub struct Protection {
    pub blocked: Vec<PathBuf>,
    pub paths: Vec<PathBuf>,
    pub categories: Vec<String>,
}

impl Protection {
    /// Blocks the system roots and the top-level folders of `home`.
    pub fn standard(home: &Path) -> Self {
        let mut blocked: Vec<PathBuf> = BLOCKED_SYSTEM.iter().map(PathBuf::from).collect();
        blocked.extend(BLOCKED_HOME.iter().map(|rel| {
            if rel.is_empty() {
                home.to_path_buf()
            } else {
                home.join(rel)
            }
        }));
        if let Some(users) = home.parent() {
            blocked.push(users.to_path_buf());
        }

        Protection {
            blocked,
            ..Protection::default()
        }
    }

    pub fn with_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.paths.extend(paths);
        self
    }

    pub fn with_categories(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.categories.extend(ids);
        self
    }

    pub fn protects_category(&self, id: &str) -> bool {
        self.categories.iter().any(|c| c == id)
    }

    pub fn protects_path(&self, path: &Path) -> bool {
        self.blocked.iter().any(|b| b == path) || self.paths.iter().any(|p| path.starts_with(p))
    }
}

/// True while `item` still sits under a root its category owns.
///
/// Checked lexically and on real paths, so a directory swapped for a symlink
/// since the scan does not pass.
pub fn within_root(item: &ScanItem, catalog: &Catalog) -> bool {
    let Ok(category) = catalog.get(&item.category_id) else {
        return false;
    };
    if !category.has_root(&item.root) || !item.path.starts_with(&item.root) {
        return false;
    }

    match (fs::canonicalize(&item.root), fs::canonicalize(&item.path)) {
        (Ok(root), Ok(path)) => path.starts_with(root),
        _ => false,
    }
}
