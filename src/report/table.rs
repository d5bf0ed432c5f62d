//! Terminal tables for reports and cleanup results.
//!
//! - Groups report items by category, largest category first
//! - Shows per-category and per-tier totals and a grand total
//! - Lists cleanup outcomes in execution order

use std::fmt::Write as _;

use crate::analyze::DiskReport;
use crate::catalog::{Catalog, RiskTier};
use crate::clean::{CleanupResult, Outcome};
use crate::disk::DiskUsage;
use crate::history::Session;
use crate::util::{format_bytes, format_timestamp, truncate};

pub fn render_report(report: &DiskReport, catalog: &Catalog, top: Option<usize>) -> String {
    if report.is_empty() {
        return String::from("Nothing reclaimable found.\n");
    }

    let mut output = String::new();

    // categories by total size (largest first), name as tiebreak
    let mut categories: Vec<_> = report.by_category.iter().collect();
    categories.sort_by(|(a_id, a), (b_id, b)| b.bytes.cmp(&a.bytes).then_with(|| a_id.cmp(b_id)));

    for (id, total) in categories {
        let (name, risk) = catalog
            .get(id)
            .map(|c| (c.name.as_str(), c.risk.as_str()))
            .unwrap_or((id.as_str(), "?"));

        let _ = writeln!(output, "\n{name} [{risk}]");
        output.push_str(&"-".repeat(60));
        output.push('\n');

        let items: Vec<_> = report.items_in_category(id).collect();
        let shown = top.unwrap_or(items.len()).min(items.len());
        for item in &items[..shown] {
            let _ = writeln!(
                output,
                "  {:46} {:>10}",
                truncate(&item.path.display().to_string(), 46),
                format_bytes(item.size_bytes)
            );
        }
        if shown < items.len() {
            let _ = writeln!(output, "  ... {} more", items.len() - shown);
        }

        let _ = writeln!(output, "  {:46} {:>10}", "subtotal", format_bytes(total.bytes));
    }

    output.push('\n');
    for tier in RiskTier::ALL {
        let _ = writeln!(
            output,
            "{:>50} {:>10}",
            format!("{tier}:"),
            format_bytes(report.tier_total(tier))
        );
    }
    let _ = writeln!(output, "{:>50} {:>10}", "TOTAL:", format_bytes(report.total_bytes));

    output
}

pub fn render_cleanup(result: &CleanupResult) -> String {
    if result.outcomes.is_empty() {
        return String::from("Nothing selected.\n");
    }

    let mut output = String::new();

    for outcome in &result.outcomes {
        let label = match outcome.outcome {
            Outcome::Deleted => "deleted",
            Outcome::WouldDelete => "would delete",
            Outcome::Skipped => "skipped",
            Outcome::Failed => "FAILED",
        };
        let _ = write!(output, "[{label}] {}", outcome.path.display());
        if outcome.outcome.is_success() {
            let _ = write!(output, " ({})", format_bytes(outcome.bytes_freed));
        }
        if let Some(reason) = &outcome.reason {
            let _ = write!(output, ": {reason}");
        }
        output.push('\n');
    }

    let verb = if result.dry_run { "would free" } else { "freed" };
    let _ = writeln!(
        output,
        "\n{verb}: {} ({} ok, {} skipped, {} failed)",
        format_bytes(result.total_bytes_freed),
        result.count(Outcome::Deleted) + result.count(Outcome::WouldDelete),
        result.count(Outcome::Skipped),
        result.count(Outcome::Failed),
    );

    output
}

pub fn render_categories(catalog: &Catalog) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{:<22} {:<7} {}", "ID", "RISK", "NAME");
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for category in catalog.all_categories() {
        let _ = writeln!(output, "{:<22} {:<7} {}", category.id, category.risk, category.name);
    }

    output
}

pub fn render_status(usage: &DiskUsage) -> String {
    let mut output = String::new();
    let level = usage.level().to_uppercase();
    let _ = writeln!(output, "Disk: {} ({level})", usage.mount_point.display());
    let _ = writeln!(output, "  Total: {:>10}", format_bytes(usage.total_bytes));
    let _ = writeln!(
        output,
        "  Used:  {:>10} ({:.0}%)",
        format_bytes(usage.used_bytes),
        usage.usage_percent()
    );
    let _ = writeln!(output, "  Free:  {:>10}", format_bytes(usage.free_bytes));
    output
}

pub fn render_sessions(sessions: &[Session]) -> String {
    if sessions.is_empty() {
        return String::from("No cleanups recorded yet.\n");
    }

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<6} {:<20} {:>10} {:>8} {:>8} {:>7}",
        "ID", "Date", "Freed", "Deleted", "Skipped", "Failed"
    );
    output.push_str(&"-".repeat(64));
    output.push('\n');

    for session in sessions {
        let _ = writeln!(
            output,
            "{:<6} {:<20} {:>10} {:>8} {:>8} {:>7}",
            session.id,
            format_timestamp(session.timestamp),
            format_bytes(session.total_bytes_freed),
            session.deleted,
            session.skipped,
            session.failed
        );
    }

    output
}
