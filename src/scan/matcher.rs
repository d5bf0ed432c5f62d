//! Resolves one detection rule to candidate paths.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::catalog::DetectionRule;

// never descend into these while looking for matches.
// a match inside node_modules or a venv belongs to that dependency tree, not
// to the project, and VCS metadata is never cruft.
const PRUNED: [&str; 10] = [
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    "Library",
    "Applications",
    ".Trash",
];

/// Candidate paths for `rule`, lexically below (or equal to) its root.
///
/// Matched directories are not descended into. Entries that can't be read are
/// skipped and described in the returned warnings.
pub fn candidates(rule: &DetectionRule) -> (Vec<PathBuf>, Vec<String>) {
    if rule.pattern().is_none() {
        return (vec![rule.root().to_path_buf()], Vec::new());
    }

    let mut found = Vec::new();
    let mut warnings = Vec::new();

    let mut walker = WalkDir::new(rule.root())
        .min_depth(1)
        .max_depth(rule.max_depth())
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let location = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| rule.root().display().to_string());
                warnings.push(format!("cannot read {location}: {e}"));
                continue;
            }
        };

        let is_dir = entry.file_type().is_dir();
        let (matched, prune) = {
            let name = entry.file_name().to_string_lossy();
            (rule.matches_name(&name), should_prune(&name))
        };
        let path = entry.path();

        if matched {
            if is_dir {
                walker.skip_current_dir();
            }
            if !rule.is_excluded(path) {
                found.push(entry.into_path());
            }
        } else if is_dir && (prune || owned_elsewhere(rule, path)) {
            walker.skip_current_dir();
        }
    }

    (found, warnings)
}

fn owned_elsewhere(rule: &DetectionRule, path: &Path) -> bool {
    rule.excludes().iter().any(|owned| path.starts_with(owned))
}

fn should_prune(name: &str) -> bool {
    name.starts_with('.') || PRUNED.contains(&name)
}
