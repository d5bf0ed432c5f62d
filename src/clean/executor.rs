use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use super::guard::{self, Protection};
use super::{
    CleanupResult, ItemOutcome, Outcome, REASON_ESCAPED, REASON_PROTECTED_CATEGORY,
    REASON_PROTECTED_PATH, REASON_RISKY, REASON_VANISHED,
};
use crate::catalog::{Catalog, RiskTier};
use crate::scan::ScanItem;

/// The deletion primitive. Only ever called on a real run.
pub trait Remover {
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Removes files, symlinks (not their targets) and directory trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }
}

pub struct Executor<'a, R = FsRemover> {
    catalog: &'a Catalog,
    protection: Protection,
    remover: R,
}

impl<'a> Executor<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Executor {
            catalog,
            protection: Protection::default(),
            remover: FsRemover,
        }
    }
}

impl<'a, R: Remover> Executor<'a, R> {
    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }

    pub fn with_remover<S: Remover>(self, remover: S) -> Executor<'a, S> {
        Executor {
            catalog: self.catalog,
            protection: self.protection,
            remover,
        }
    }

    /// Processes every selected item in order and reports one outcome each.
    ///
    /// Never stops early: vanished paths and failed deletions are recorded and
    /// the run moves on. With `dry_run` the remover is never called.
    pub fn execute(&self, selected: &[ScanItem], dry_run: bool) -> CleanupResult {
        let outcomes = selected
            .iter()
            .map(|item| self.process(item, dry_run))
            .collect();

        CleanupResult::new(outcomes, dry_run)
    }

    fn process(&self, item: &ScanItem, dry_run: bool) -> ItemOutcome {
        if let Err(reason) = self.verify(item) {
            debug!(path = %item.path.display(), reason, "skipped");
            return record(item, Outcome::Skipped, Some(reason.to_string()), 0);
        }

        if dry_run {
            return record(item, Outcome::WouldDelete, None, item.size_bytes);
        }

        match self.remover.remove(&item.path) {
            Ok(()) => {
                info!(path = %item.path.display(), bytes = item.size_bytes, "deleted");
                record(item, Outcome::Deleted, None, item.size_bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                record(item, Outcome::Skipped, Some(REASON_VANISHED.to_string()), 0)
            }
            Err(e) => {
                warn!(path = %item.path.display(), "delete failed: {e}");
                record(item, Outcome::Failed, Some(e.to_string()), 0)
            }
        }
    }

    fn verify(&self, item: &ScanItem) -> Result<(), &'static str> {
        // not overridable
        if item.risk == RiskTier::Risky {
            return Err(REASON_RISKY);
        }

        if self.protection.protects_category(&item.category_id) {
            return Err(REASON_PROTECTED_CATEGORY);
        }

        if fs::symlink_metadata(&item.path).is_err() {
            return Err(REASON_VANISHED);
        }

        if !guard::within_root(item, self.catalog) {
            return Err(REASON_ESCAPED);
        }

        if self.protection.protects_path(&item.path) {
            return Err(REASON_PROTECTED_PATH);
        }

        Ok(())
    }
}

fn record(
    item: &ScanItem,
    outcome: Outcome,
    reason: Option<String>,
    bytes_freed: u64,
) -> ItemOutcome {
    ItemOutcome {
        path: item.path.clone(),
        category_id: item.category_id.clone(),
        outcome,
        reason,
        bytes_freed,
    }
}
