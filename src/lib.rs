pub mod analyze;
pub mod catalog;
pub mod clean;
pub mod cli;
pub mod config;
pub mod disk;
pub mod error;
pub mod explain;
pub mod history;
pub mod platform;
pub mod report;
pub mod scan;
pub mod util;

pub use error::{Error, Result};
