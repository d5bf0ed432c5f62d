use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::RiskTier;
use crate::clean::Selector;

#[derive(Parser)]
#[command(name = "uncruft")]
#[command(about = "Finds reclaimable caches and build artifacts and removes them safely")]
#[command(version)]
pub struct Cli {
    /// Show debug logging and diagnostics
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every known category with its risk tier
    Categories,

    /// Scan for reclaimable items and print a report
    Scan(ScanArgs),

    /// Describe what a category is and what deleting it means
    Explain(ExplainArgs),

    /// Remove selected items (dry run unless --yes)
    Clean(CleanArgs),

    /// Show past cleanup runs
    History(HistoryArgs),

    /// Show capacity and free space of the disk holding your home directory
    Status(StatusArgs),
}

#[derive(Parser)]
pub struct ScanArgs {
    /// Only scan these categories
    #[arg(long, value_delimiter = ',')]
    pub category: Option<Vec<String>>,

    /// Output as JSON instead of table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Items listed per category
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Add a plain-language note for each category found
    #[arg(long, default_value_t = false)]
    pub explain: bool,
}

#[derive(Parser)]
pub struct ExplainArgs {
    /// Category id, as listed by `uncruft categories`
    pub id: String,
}

#[derive(Parser)]
#[command(group(
    ArgGroup::new("selector")
        .required(true)
        .args(["tier", "category", "path"])
))]
pub struct CleanArgs {
    /// Clean everything at or below this tier (safe, review)
    #[arg(long)]
    pub tier: Option<RiskTier>,

    /// Clean one category
    #[arg(long)]
    pub category: Option<String>,

    /// Clean these exact paths (must appear in a fresh scan)
    #[arg(long, value_delimiter = ',')]
    pub path: Option<Vec<PathBuf>>,

    /// Execute deletion instead of showing what would be removed
    #[arg(long, default_value_t = false)]
    pub yes: bool,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl CleanArgs {
    /// returns true if this is a dry run (show what would be deleted)
    pub fn is_dry_run(&self) -> bool {
        !self.yes
    }

    pub fn selector(&self) -> Option<Selector> {
        if let Some(tier) = self.tier {
            Some(Selector::ByTier(tier))
        } else if let Some(id) = &self.category {
            Some(Selector::ByCategory(id.clone()))
        } else {
            self.path.clone().map(Selector::ByPaths)
        }
    }
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Show the items of one session
    #[arg(long)]
    pub id: Option<i64>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct StatusArgs {
    /// Any path on the volume to report (defaults to the home directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_defaults_to_dry_run() {
        let cli = Cli::try_parse_from(["uncruft", "clean", "--tier", "safe"]).unwrap();
        let Command::Clean(args) = cli.command else { panic!("expected clean") };

        assert!(args.is_dry_run());
        assert_eq!(args.selector(), Some(Selector::ByTier(RiskTier::Safe)));
    }

    #[test]
    fn clean_requires_exactly_one_selector() {
        assert!(Cli::try_parse_from(["uncruft", "clean"]).is_err());
        let both = ["uncruft", "clean", "--tier", "safe", "--category", "npm_cache"];
        assert!(Cli::try_parse_from(both).is_err());
    }

    #[test]
    fn paths_are_comma_separated() {
        let cli = Cli::try_parse_from(["uncruft", "clean", "--path", "/a,/b", "--yes"]).unwrap();
        let Command::Clean(args) = cli.command else { panic!("expected clean") };

        assert!(!args.is_dry_run());
        assert_eq!(
            args.selector(),
            Some(Selector::ByPaths(vec![PathBuf::from("/a"), PathBuf::from("/b")]))
        );
    }

    #[test]
    fn status_takes_an_optional_path() {
        let cli = Cli::try_parse_from(["uncruft", "status", "--json"]).unwrap();
        let Command::Status(args) = cli.command else { panic!("expected status") };
        assert!(args.json);
        assert_eq!(args.path, None);

        let cli = Cli::try_parse_from(["uncruft", "status", "--path", "/Volumes/Data"]).unwrap();
        let Command::Status(args) = cli.command else { panic!("expected status") };
        assert_eq!(args.path, Some(PathBuf::from("/Volumes/Data")));
    }
}
