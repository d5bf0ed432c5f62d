//! Category catalog.
//!
//! A closed, named set of cruft categories. Each category carries a fixed risk
//! tier and one or more detection rules that tell the scanner where to look.
//! The catalog is built once and passed around by reference; nothing mutates
//! it after construction.

mod builtin;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::platform::{self, Platform};

/// How much harm deleting an item can do.
///
/// Inclusion is decided by [`RiskTier::rank`]: selecting a tier includes
/// every tier of lower or equal rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Regenerates on its own.
    Safe,
    /// Recoverable with manual effort, needs a look first.
    Review,
    /// Possible data loss. Never deleted by the executor.
    Risky,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Safe, RiskTier::Review, RiskTier::Risky];

    pub fn rank(self) -> u8 {
        match self {
            RiskTier::Safe => 0,
            RiskTier::Review => 1,
            RiskTier::Risky => 2,
        }
    }

    /// True when an item of tier `self` is included by a selection of `limit`.
    pub fn within(self, limit: RiskTier) -> bool {
        self.rank() <= limit.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Safe => "safe",
            RiskTier::Review => "review",
            RiskTier::Risky => "risky",
        }
    }
}

impl PartialOrd for RiskTier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskTier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "safe" => Ok(RiskTier::Safe),
            "review" => Ok(RiskTier::Review),
            "risky" => Ok(RiskTier::Risky),
            other => Err(format!("unknown risk tier '{other}' (expected safe, review or risky)")),
        }
    }
}

/// Where and how to look for one category's items.
///
/// A rule without a pattern matches its root. A rule with a pattern matches
/// entries below the root, down to `max_depth` levels, whose file name
/// matches the pattern. Paths owned by another category are excluded; the
/// catalog fills those in when it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRule {
    root: PathBuf,
    pattern: Option<Pattern>,
    max_depth: usize,
    excludes: Vec<PathBuf>,
}

impl DetectionRule {
    pub fn path(root: impl Into<PathBuf>) -> Result<Self> {
        let root = absolute(root.into())?;
        Ok(DetectionRule {
            root,
            pattern: None,
            max_depth: 0,
            excludes: Vec::new(),
        })
    }

    pub fn glob(root: impl Into<PathBuf>, pattern: &str, max_depth: usize) -> Result<Self> {
        let root = absolute(root.into())?;
        let pattern = Pattern::new(pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(DetectionRule {
            root,
            pattern: Some(pattern),
            max_depth: max_depth.max(1),
            excludes: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::as_str)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Roots of other categories that sit below this rule's root.
    pub fn excludes(&self) -> &[PathBuf] {
        &self.excludes
    }

    /// True if `path` is, contains, or lies inside a root owned elsewhere.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.excludes
            .iter()
            .any(|owned| owned.starts_with(path) || path.starts_with(owned))
    }

    /// Whether a directory entry name is a match. Always false for root-only rules.
    pub fn matches_name(&self, name: &str) -> bool {
        const OPTIONS: MatchOptions = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };

        self.pattern
            .as_ref()
            .map(|p| p.matches_with(name, OPTIONS))
            .unwrap_or(false)
    }
}

// a pattern rule never reports a path another category names explicitly,
// so one physical directory can't show up under two tiers
fn claim_owned_roots(categories: &mut [Category]) {
    let roots: Vec<(usize, PathBuf)> = categories
        .iter()
        .enumerate()
        .flat_map(|(i, c)| c.rules.iter().map(move |r| (i, r.root.clone())))
        .collect();

    for (i, category) in categories.iter_mut().enumerate() {
        for rule in category.rules.iter_mut().filter(|r| r.pattern.is_some()) {
            let mut owned: Vec<PathBuf> = roots
                .iter()
                .filter(|(owner, root)| {
                    *owner != i && root != &rule.root && root.starts_with(&rule.root)
                })
                .map(|(_, root)| root.clone())
                .collect();
            owned.sort();
            owned.dedup();
            rule.excludes = owned;
        }
    }
}

fn absolute(root: PathBuf) -> Result<PathBuf> {
    if root.is_absolute() {
        Ok(root)
    } else {
        Err(Error::RelativeRoot(root))
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub risk: RiskTier,
    pub rules: Vec<DetectionRule>,
    pub description: String,
    pub consequences: String,
    pub recovery: String,
    pub cleanup_hint: Option<String>,
    /// Matches smaller than this are not reported.
    pub min_size_bytes: u64,
    /// Matches modified more recently than this are not reported.
    pub min_age: Option<Duration>,
}

impl Category {
    pub fn new(id: &str, name: &str, risk: RiskTier, description: &str) -> Self {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            risk,
            rules: Vec::new(),
            description: description.to_string(),
            consequences: String::new(),
            recovery: String::new(),
            cleanup_hint: None,
            min_size_bytes: 0,
            min_age: None,
        }
    }

    pub fn with_rule(mut self, rule: DetectionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = DetectionRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn with_notes(mut self, consequences: &str, recovery: &str) -> Self {
        self.consequences = consequences.to_string();
        self.recovery = recovery.to_string();
        self
    }

    pub fn with_cleanup_hint(mut self, hint: &str) -> Self {
        self.cleanup_hint = Some(hint.to_string());
        self
    }

    pub fn with_min_size(mut self, bytes: u64) -> Self {
        self.min_size_bytes = bytes;
        self
    }

    pub fn with_min_age(mut self, age: Duration) -> Self {
        self.min_age = Some(age);
        self
    }

    /// True if one of this category's rules is rooted at `root`.
    pub fn has_root(&self, root: &Path) -> bool {
        self.rules.iter().any(|r| r.root() == root)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(mut categories: Vec<Category>) -> Result<Self> {
        let mut index = HashMap::with_capacity(categories.len());
        for (i, category) in categories.iter().enumerate() {
            if index.insert(category.id.clone(), i).is_some() {
                return Err(Error::DuplicateCategory(category.id.clone()));
            }
        }

        claim_owned_roots(&mut categories);

        Ok(Catalog { categories, index })
    }

    /// The standard catalog for this machine, rooted at `home`.
    pub fn builtin(home: &Path) -> Result<Self> {
        Catalog::new(builtin::categories(home, platform::detect())?)
    }

    pub fn builtin_for(home: &Path, platform: Platform) -> Result<Self> {
        Catalog::new(builtin::categories(home, platform)?)
    }

    pub fn all_categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Result<&Category> {
        self.index
            .get(id)
            .map(|&i| &self.categories[i])
            .ok_or_else(|| Error::UnknownCategory(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn by_tier(&self, tier: RiskTier) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(move |c| c.risk == tier)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, risk: RiskTier) -> Category {
        Category::new(id, id, risk, "test category")
            .with_rule(DetectionRule::path(format!("/tmp/{id}")).unwrap())
    }

    #[test]
    fn unknown_id_is_an_error() {
        let catalog = Catalog::new(vec![category("npm_cache", RiskTier::Safe)]).unwrap();

        assert!(catalog.get("npm_cache").is_ok());
        match catalog.get("does_not_exist") {
            Err(Error::UnknownCategory(id)) => assert_eq!(id, "does_not_exist"),
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::new(vec![
            category("npm_cache", RiskTier::Safe),
            category("npm_cache", RiskTier::Review),
        ]);

        assert!(matches!(result, Err(Error::DuplicateCategory(id)) if id == "npm_cache"));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let catalog = Catalog::new(vec![
            category("zeta", RiskTier::Safe),
            category("alpha", RiskTier::Review),
            category("mid", RiskTier::Risky),
        ])
        .unwrap();

        let ids: Vec<_> = catalog.all_categories().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);
        assert_eq!(catalog.by_tier(RiskTier::Review).count(), 1);
    }

    #[test]
    fn tier_ranking_is_explicit() {
        assert!(RiskTier::Safe.within(RiskTier::Safe));
        assert!(RiskTier::Safe.within(RiskTier::Review));
        assert!(RiskTier::Review.within(RiskTier::Review));
        assert!(!RiskTier::Review.within(RiskTier::Safe));
        assert!(!RiskTier::Risky.within(RiskTier::Review));
        assert!(RiskTier::Safe < RiskTier::Risky);
        assert_eq!("Review".parse::<RiskTier>(), Ok(RiskTier::Review));
        assert!("danger".parse::<RiskTier>().is_err());
    }

    #[test]
    fn rules_require_absolute_roots_and_valid_patterns() {
        assert!(matches!(DetectionRule::path("relative/dir"), Err(Error::RelativeRoot(_))));
        assert!(matches!(
            DetectionRule::glob("/tmp", "[unclosed", 2),
            Err(Error::InvalidPattern { .. })
        ));

        let rule = DetectionRule::glob("/tmp", "node_modules", 0).unwrap();
        assert_eq!(rule.max_depth(), 1);
        assert!(rule.matches_name("node_modules"));
        assert!(!rule.matches_name("node_modules_old"));
    }

    #[test]
    fn wildcard_does_not_match_hidden_names() {
        let rule = DetectionRule::glob("/tmp", "*", 1).unwrap();
        assert!(rule.matches_name("com.apple.Safari"));
        assert!(!rule.matches_name(".DS_Store"));

        let venv = DetectionRule::glob("/tmp", ".venv", 3).unwrap();
        assert!(venv.matches_name(".venv"));
    }

    #[test]
    fn pattern_rules_exclude_roots_owned_by_other_categories() {
        let catalog = Catalog::new(vec![
            Category::new("caches", "Caches", RiskTier::Safe, "")
                .with_rule(DetectionRule::glob("/home/dev/.cache", "*", 1).unwrap()),
            Category::new("models", "Models", RiskTier::Review, "")
                .with_rule(DetectionRule::path("/home/dev/.cache/huggingface").unwrap()),
            Category::new("yarn", "Yarn", RiskTier::Safe, "")
                .with_rule(DetectionRule::path("/home/dev/.cache/yarn/v6").unwrap()),
            Category::new("elsewhere", "Elsewhere", RiskTier::Safe, "")
                .with_rule(DetectionRule::path("/home/dev/.npm").unwrap()),
        ])
        .unwrap();

        let rule = &catalog.get("caches").unwrap().rules[0];
        assert_eq!(
            rule.excludes(),
            [
                PathBuf::from("/home/dev/.cache/huggingface"),
                PathBuf::from("/home/dev/.cache/yarn/v6"),
            ]
        );
        assert!(rule.is_excluded(Path::new("/home/dev/.cache/huggingface")));
        assert!(rule.is_excluded(Path::new("/home/dev/.cache/yarn")));
        assert!(!rule.is_excluded(Path::new("/home/dev/.cache/thumbnails")));

        // path rules are never narrowed
        assert!(catalog.get("models").unwrap().rules[0].excludes().is_empty());
    }

    #[test]
    fn linux_cache_wildcard_skips_category_roots() {
        let home = Path::new("/home/dev");
        let catalog = Catalog::builtin_for(home, Platform::Linux).unwrap();

        let rule = &catalog.get("application_caches").unwrap().rules[0];
        assert!(rule.is_excluded(&home.join(".cache/huggingface")));
        assert!(rule.is_excluded(&home.join(".cache/pip")));
        assert!(!rule.is_excluded(&home.join(".cache/fontconfig")));
    }

    #[test]
    fn builtin_catalog_has_unique_absolute_rules() {
        let home = Path::new("/Users/dev");
        let catalog = Catalog::builtin_for(home, Platform::MacOS).unwrap();

        assert!(!catalog.is_empty());
        for category in catalog.all_categories() {
            assert!(!category.rules.is_empty(), "{} has no rules", category.id);
            for rule in &category.rules {
                assert!(rule.root().is_absolute());
            }
        }
        assert_eq!(catalog.get("npm_cache").unwrap().risk, RiskTier::Safe);
        assert_eq!(catalog.get("docker_data").unwrap().risk, RiskTier::Review);
        assert!(catalog.by_tier(RiskTier::Risky).count() > 0);
    }
}
