//! calibrator - reconcile a calibre library with its own consistency checker
//!
//! This library runs `calibredb check_library`, parses the CSV report into
//! typed categories, and re-imports extra titles and extra formats by staging
//! them outside the library and handing them back to `calibredb`.

pub mod calibredb;
pub mod cli;
pub mod config;
pub mod error;
pub mod naming;
pub mod output;
pub mod process;
pub mod processors;
pub mod report;
pub mod staging;

pub use calibredb::{Calibredb, LibraryManager};
pub use cli::{Calibrator, CliArgs, RunReport, run_cli};
pub use config::{CalibratorConfig, ConfigError, RunOptions};
pub use error::{CalibratorError, Result};
pub use report::{Category, CheckReport, DirectoryRecord, FormatRecord};
pub use staging::{StagedItem, Stager};
