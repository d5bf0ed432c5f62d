//! Runtime configuration.
//!
//! Read from `config.toml` in the platform config directory, e.g.
//!
//! ```toml
//! [scan]
//! threads = 4
//!
//! [clean]
//! protected_paths = ["~/Code/keep-this"]
//! protected_categories = ["trash"]
//! record_history = true
//! max_cleanup_gb = 50
//! ```
//!
//! A missing file means defaults. `~` expands to the home directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::clean::{Protection, MAX_CLEANUP_BYTES};
use crate::error::{Error, Result};
use crate::platform::{self, Platform};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    scan: ScanSection,
    clean: CleanSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScanSection {
    threads: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CleanSection {
    protected_paths: Vec<PathBuf>,
    protected_categories: Vec<String>,
    record_history: bool,
    max_cleanup_gb: Option<u64>,
}

impl Default for CleanSection {
    fn default() -> Self {
        CleanSection {
            protected_paths: Vec::new(),
            protected_categories: Vec::new(),
            record_history: true,
            max_cleanup_gb: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub home: PathBuf,
    pub platform: Platform,
    pub scan_threads: Option<usize>,
    pub protected_paths: Vec<PathBuf>,
    pub protected_categories: Vec<String>,
    pub record_history: bool,
    /// Upper bound on the bytes a single cleanup may delete.
    pub max_cleanup_bytes: u64,
    pub verbose: bool,
    pub json_output: bool,
}

impl Config {
    pub fn defaults(home: PathBuf) -> Self {
        Config {
            home,
            platform: platform::detect(),
            scan_threads: None,
            protected_paths: Vec::new(),
            protected_categories: Vec::new(),
            record_history: true,
            max_cleanup_bytes: MAX_CLEANUP_BYTES,
            verbose: false,
            json_output: false,
        }
    }

    /// Loads the user's config file, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let home = platform::home_dir().ok_or_else(|| Error::Config {
            path: PathBuf::from("~"),
            message: "could not determine home directory".to_string(),
        })?;

        match default_path() {
            Some(path) => Config::load_from(&path, home),
            None => Ok(Config::defaults(home)),
        }
    }

    pub fn load_from(path: &Path, home: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::defaults(home));
        }

        let contents = fs::read_to_string(path)?;
        Config::parse(&contents, path, home)
    }

    fn parse(contents: &str, path: &Path, home: PathBuf) -> Result<Self> {
        let file: FileConfig = toml::from_str(contents).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let protected_paths = file
            .clean
            .protected_paths
            .iter()
            .map(|p| platform::expand_tilde(p, &home))
            .collect();

        let max_cleanup_bytes = file
            .clean
            .max_cleanup_gb
            .map_or(MAX_CLEANUP_BYTES, |gb| gb.saturating_mul(1024 * 1024 * 1024));

        Ok(Config {
            scan_threads: file.scan.threads,
            protected_paths,
            protected_categories: file.clean.protected_categories,
            record_history: file.clean.record_history,
            max_cleanup_bytes,
            ..Config::defaults(home)
        })
    }

    /// Standard blocked locations plus everything configured by the user.
    pub fn protection(&self) -> Protection {
        Protection::standard(&self.home)
            .with_paths(self.protected_paths.iter().cloned())
            .with_categories(self.protected_categories.iter().cloned())
    }
}

pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "uncruft")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
