//! Cleanup engine.
//!
//! Turns a report plus a selection into guarded deletions:
//! - [`plan`] resolves a [`Selector`] against a report
//! - [`Executor::execute`] re-checks every item and deletes it, or in a dry
//!   run records what would have been deleted
//!
//! Risky items are never deleted here, whatever the selection says.

mod executor;
pub mod guard;
mod plan;

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use executor::{Executor, FsRemover, Remover};
pub use guard::Protection;
pub use plan::{plan, plan_with_limit, MAX_CLEANUP_BYTES};

use crate::catalog::RiskTier;

pub const REASON_RISKY: &str = "risky item requires explicit confirmation outside this path";
pub const REASON_VANISHED: &str = "no longer present";
pub const REASON_ESCAPED: &str = "path escaped expected root";
pub const REASON_PROTECTED_CATEGORY: &str = "category is protected";
pub const REASON_PROTECTED_PATH: &str = "path is protected";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Every item at or below the tier.
    ByTier(RiskTier),
    ByCategory(String),
    /// Explicit paths, each of which must be in the report.
    ByPaths(Vec<PathBuf>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Deleted,
    /// Dry-run stand-in for `Deleted`: every check passed, nothing was removed.
    WouldDelete,
    Skipped,
    Failed,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Deleted | Outcome::WouldDelete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Deleted => "deleted",
            Outcome::WouldDelete => "would_delete",
            Outcome::Skipped => "skipped",
            Outcome::Failed => "failed",
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deleted" => Ok(Outcome::Deleted),
            "would_delete" => Ok(Outcome::WouldDelete),
            "skipped" => Ok(Outcome::Skipped),
            "failed" => Ok(Outcome::Failed),
            other => Err(format!("unknown outcome '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub path: PathBuf,
    pub category_id: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Zero unless the outcome is a success.
    pub bytes_freed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupResult {
    /// Same order as the selection that produced it.
    pub outcomes: Vec<ItemOutcome>,
    pub dry_run: bool,
    pub total_bytes_freed: u64,
}

impl CleanupResult {
    pub fn new(outcomes: Vec<ItemOutcome>, dry_run: bool) -> Self {
        let total_bytes_freed = outcomes
            .iter()
            .filter(|o| o.outcome.is_success())
            .fold(0u64, |acc, o| acc.saturating_add(o.bytes_freed));

        CleanupResult {
            outcomes,
            dry_run,
            total_bytes_freed,
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(Outcome::Failed) > 0
    }
}
