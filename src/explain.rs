//! Optional natural-language annotations.
//!
//! An [`Explainer`] turns a category summary into free text for display.
//! The core never reads the text back; [`NoExplainer`] is always a valid
//! substitute.

use serde::Serialize;

use crate::analyze::DiskReport;
use crate::catalog::{Catalog, Category, RiskTier};
use crate::util::format_bytes;

#[derive(Debug, Clone, Copy)]
pub struct ExplainRequest<'a> {
    pub category: &'a Category,
    pub risk: RiskTier,
    pub total_bytes: u64,
    pub item_count: usize,
}

impl<'a> ExplainRequest<'a> {
    pub fn new(category: &'a Category, report: &DiskReport) -> Self {
        let total = report.category_total(&category.id);
        ExplainRequest {
            category,
            risk: category.risk,
            total_bytes: total.bytes,
            item_count: total.items,
        }
    }
}

pub trait Explainer {
    fn explain(&self, request: &ExplainRequest<'_>) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoExplainer;

impl Explainer for NoExplainer {
    fn explain(&self, _request: &ExplainRequest<'_>) -> Option<String> {
        None
    }
}

/// Offline explanations built from what the catalog knows about a category.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogExplainer;

impl Explainer for CatalogExplainer {
    fn explain(&self, request: &ExplainRequest<'_>) -> Option<String> {
        let category = request.category;
        let mut text = format!("{}: {}.", category.name, category.description);

        if request.item_count > 0 {
            text.push_str(&format!(
                " Found {} in {} location{}.",
                format_bytes(request.total_bytes),
                request.item_count,
                if request.item_count == 1 { "" } else { "s" }
            ));
        }

        text.push_str(match request.risk {
            RiskTier::Safe => " Safe to delete, it regenerates on its own.",
            RiskTier::Review => " Review before deleting.",
            RiskTier::Risky => " Risky: uncruft reports it but never deletes it.",
        });

        if !category.consequences.is_empty() {
            text.push_str(&format!(" If deleted: {}.", category.consequences));
        }
        if !category.recovery.is_empty() {
            text.push_str(&format!(" Recovery: {}.", category.recovery));
        }
        if let Some(hint) = &category.cleanup_hint {
            text.push_str(&format!(" Native cleanup: `{hint}`."));
        }

        Some(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub category_id: String,
    pub text: String,
}

/// One annotation per category present in the report, in catalog order.
pub fn annotate(
    report: &DiskReport,
    catalog: &Catalog,
    explainer: &dyn Explainer,
) -> Vec<Annotation> {
    catalog
        .all_categories()
        .iter()
        .filter(|c| report.by_category.contains_key(&c.id))
        .filter_map(|category| {
            explainer
                .explain(&ExplainRequest::new(category, report))
                .map(|text| Annotation {
                    category_id: category.id.clone(),
                    text,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::analyze;
    use crate::catalog::DetectionRule;
    use crate::scan::ScanItem;
    use std::path::PathBuf;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Category::new("npm_cache", "npm Cache", RiskTier::Safe, "Cached npm packages")
                .with_rule(DetectionRule::path("/u/.npm/_cacache").unwrap())
                .with_notes("Packages re-download", "npm install")
                .with_cleanup_hint("npm cache clean --force"),
            Category::new("trash", "Trash", RiskTier::Review, "Files in the Trash")
                .with_rule(DetectionRule::path("/u/.Trash").unwrap()),
        ])
        .unwrap()
    }

    fn report() -> DiskReport {
        analyze(&[ScanItem {
            path: PathBuf::from("/u/.npm/_cacache"),
            category_id: "npm_cache".to_string(),
            root: PathBuf::from("/u/.npm/_cacache"),
            size_bytes: 500_000_000,
            last_modified: None,
            risk: RiskTier::Safe,
        }])
    }

    #[test]
    fn catalog_explainer_mentions_size_and_recovery() {
        let catalog = catalog();
        let notes = annotate(&report(), &catalog, &CatalogExplainer);

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].category_id, "npm_cache");
        assert!(notes[0].text.contains("500.0 MB"));
        assert!(notes[0].text.contains("npm cache clean --force"));
    }

    #[test]
    fn no_explainer_produces_nothing() {
        let catalog = catalog();
        assert!(annotate(&report(), &catalog, &NoExplainer).is_empty());
    }
}
