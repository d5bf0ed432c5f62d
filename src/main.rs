use clap::Parser;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use uncruft::analyze::analyze;
use uncruft::catalog::Catalog;
use uncruft::clean::{self, Executor, Selector};
use uncruft::cli::{CleanArgs, Cli, Command, ExplainArgs, HistoryArgs, ScanArgs, StatusArgs};
use uncruft::config::Config;
use uncruft::disk;
use uncruft::explain::{self, CatalogExplainer, ExplainRequest, Explainer};
use uncruft::history::Store;
use uncruft::report::{json, print_scan, table};
use uncruft::scan::{ScanResult, Scanner};
use uncruft::Result;

fn init_logging(verbose: bool) {
    let default = if verbose { "uncruft=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stderr keeps --json output on stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn scan_with(catalog: &Catalog, config: &Config, ids: Option<&[String]>) -> Result<ScanResult> {
    let mut scanner = Scanner::new(catalog);
    if let Some(threads) = config.scan_threads {
        scanner = scanner.with_threads(threads);
    }
    scanner.scan(ids)
}

fn run_scan(args: &ScanArgs, catalog: &Catalog, config: &Config) -> Result<()> {
    let result = scan_with(catalog, config, args.category.as_deref())?;
    let report = analyze(&result.items);

    let explanations = if args.explain {
        explain::annotate(&report, catalog, &CatalogExplainer)
    } else {
        Vec::new()
    };

    print_scan(&result, &report, catalog, &explanations, config, Some(args.top));
    Ok(())
}

fn run_explain(args: &ExplainArgs, catalog: &Catalog, config: &Config) -> Result<()> {
    let category = catalog.get(&args.id)?;
    let result = scan_with(catalog, config, Some(std::slice::from_ref(&args.id)))?;
    let report = analyze(&result.items);

    if let Some(text) = CatalogExplainer.explain(&ExplainRequest::new(category, &report)) {
        println!("{text}");
    }
    Ok(())
}

fn run_clean(args: &CleanArgs, catalog: &Catalog, config: &Config) -> Result<bool> {
    let Some(selector) = args.selector() else {
        return Err(uncruft::Error::Selection("nothing selected".to_string()));
    };

    // a category selection only needs that category scanned
    let result = match &selector {
        Selector::ByCategory(id) => {
            catalog.get(id)?;
            scan_with(catalog, config, Some(std::slice::from_ref(id)))?
        }
        _ => scan_with(catalog, config, None)?,
    };
    let report = analyze(&result.items);

    let selected = clean::plan_with_limit(&report, &selector, config.max_cleanup_bytes)?;
    let outcome = Executor::new(catalog)
        .with_protection(config.protection())
        .execute(&selected, args.is_dry_run());

    if args.json {
        println!("{}", json::render(&outcome));
    } else {
        print!("{}", table::render_cleanup(&outcome));
    }

    if !outcome.dry_run && config.record_history {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let recorded =
            Store::open_default().and_then(|mut store| store.record(&outcome, timestamp));
        if let Err(e) = recorded {
            warn!("failed to record cleanup history: {e}");
        }
    }

    Ok(!outcome.has_failures())
}

fn run_history(args: &HistoryArgs) -> Result<()> {
    let store = Store::open_default()?;

    match args.id {
        Some(id) => {
            let outcomes = store.outcomes(id)?;
            if args.json {
                println!("{}", json::render(&outcomes));
            } else if outcomes.is_empty() {
                println!("No items recorded for session {id}.");
            } else {
                for outcome in &outcomes {
                    let reason = outcome
                        .reason
                        .as_deref()
                        .map(|r| format!(": {r}"))
                        .unwrap_or_default();
                    println!("[{}] {}{reason}", outcome.outcome.as_str(), outcome.path.display());
                }
            }
        }
        None => {
            let sessions = store.sessions()?;
            if args.json {
                println!("{}", json::render(&sessions));
            } else {
                print!("{}", table::render_sessions(&sessions));
            }
        }
    }
    Ok(())
}

fn run_status(args: &StatusArgs, config: &Config) -> Result<()> {
    let path = args.path.as_deref().unwrap_or(&config.home);
    let usage = disk::disk_usage(path)?;

    if args.json {
        println!("{}", json::render(&usage));
    } else {
        print!("{}", table::render_status(&usage));
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    config.verbose = cli.verbose;

    let catalog = match Catalog::builtin_for(&config.home, config.platform) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("error: failed to build category catalog: {e}");
            std::process::exit(1);
        }
    };

    for id in &config.protected_categories {
        if !catalog.contains(id) {
            warn!("protected category '{id}' is not in the catalog");
        }
    }

    let outcome = match &cli.command {
        Command::Categories => {
            print!("{}", table::render_categories(&catalog));
            Ok(true)
        }
        Command::Scan(args) => {
            config.json_output = args.json;
            run_scan(args, &catalog, &config).map(|()| true)
        }
        Command::Explain(args) => run_explain(args, &catalog, &config).map(|()| true),
        Command::Clean(args) => {
            config.json_output = args.json;
            run_clean(args, &catalog, &config)
        }
        Command::History(args) => run_history(args).map(|()| true),
        Command::Status(args) => run_status(args, &config).map(|()| true),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
