//! JSON output for scripting and piping.

use serde::Serialize;

use crate::analyze::DiskReport;
use crate::explain::Annotation;

#[derive(Serialize)]
struct ScanOutput<'a> {
    report: &'a DiskReport,
    #[serde(skip_serializing_if = "is_empty")]
    explanations: &'a [Annotation],
    #[serde(skip_serializing_if = "is_empty")]
    diagnostics: &'a [String],
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

pub fn render<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

pub fn render_scan(
    report: &DiskReport,
    explanations: &[Annotation],
    diagnostics: &[String],
) -> String {
    render(&ScanOutput {
        report,
        explanations,
        diagnostics,
    })
}
