pub mod json;
pub mod table;

use crate::analyze::DiskReport;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::explain::Annotation;
use crate::scan::ScanResult;
use crate::util::format_bytes;

pub fn print_scan(
    scan: &ScanResult,
    report: &DiskReport,
    catalog: &Catalog,
    explanations: &[Annotation],
    config: &Config,
    top: Option<usize>,
) {
    if config.json_output {
        let diagnostics: &[String] = if config.verbose { &scan.diagnostics } else { &[] };
        println!("{}", json::render_scan(report, explanations, diagnostics));
        return;
    }

    print!("{}", table::render_report(report, catalog, top));
    print_explanations(explanations);
    print_scan_info(scan, config.verbose);
    print_diagnostics(scan, config.verbose);
}

fn print_explanations(explanations: &[Annotation]) {
    if explanations.is_empty() {
        return;
    }

    println!();
    for note in explanations {
        println!("{}: {}", note.category_id, note.text);
    }
}

fn print_scan_info(scan: &ScanResult, verbose: bool) {
    if let Some(duration_ms) = scan.duration_ms {
        let elapsed = humantime::format_duration(std::time::Duration::from_millis(duration_ms));
        println!("\nscan completed in {elapsed}");
    }

    if verbose {
        if let Some(peak_bytes) = scan.peak_memory_bytes {
            println!("memory: {}", format_bytes(peak_bytes as u64));
        }
    }
}

fn print_diagnostics(scan: &ScanResult, verbose: bool) {
    if scan.diagnostics.is_empty() {
        return;
    }

    println!();
    if verbose {
        println!("Diagnostics:");
        println!("{}", "-".repeat(40));
        for diagnostic in &scan.diagnostics {
            println!("  {diagnostic}");
        }
    } else {
        println!(
            "[diagnostic] {} paths could not be fully read (use -v for details)",
            scan.diagnostics.len()
        );
    }
}
