//! The external library manager, reached only through its command line.

use crate::config::CalibratorConfig;
use crate::error::Result;
use crate::process::{self, ExternalCommand};
use std::ffi::OsString;
use std::path::Path;

/// The three library-manager operations a run needs.
///
/// Each returns the tool's captured output on success.
pub trait LibraryManager {
    /// Runs the consistency checker and returns its CSV report.
    fn check_library(&self, library_path: &Path) -> Result<String>;

    /// Imports a staged book directory as a new entry, tolerating duplicates.
    fn add_book(&self, library_path: &Path, staged: &Path, title: &str, author: &str)
    -> Result<String>;

    /// Attaches a staged file to an existing book without replacing formats.
    fn add_format(&self, library_path: &Path, book_id: &str, staged: &Path) -> Result<String>;
}

/// [`LibraryManager`] backed by the `calibredb` program.
#[derive(Debug, Clone)]
pub struct Calibredb {
    program: String,
    ignore_names: Vec<String>,
}

impl Calibredb {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ignore_names: vec![".git".to_string()],
        }
    }

    pub fn from_config(config: &CalibratorConfig) -> Self {
        Self {
            program: config.calibredb.clone(),
            ignore_names: config.ignore_names.clone(),
        }
    }

    fn subcommand(&self, name: &str, library_path: &Path) -> ExternalCommand {
        ExternalCommand::new(&self.program)
            .arg(name)
            .arg(library_path_arg(library_path))
    }

    pub fn check_library_command(&self, library_path: &Path) -> ExternalCommand {
        let command = self.subcommand("check_library", library_path).arg("--csv");
        if self.ignore_names.is_empty() {
            command
        } else {
            command.arg(format!("--ignore_names={}", self.ignore_names.join(",")))
        }
    }

    pub fn add_book_command(
        &self,
        library_path: &Path,
        staged: &Path,
        title: &str,
        author: &str,
    ) -> ExternalCommand {
        self.subcommand("add", library_path)
            .arg("--duplicates")
            .arg(format!("--title={}", title))
            .arg(format!("--authors={}", author))
            .arg("--recurse")
            .arg("--one-book-per-directory")
            .arg(staged)
    }

    pub fn add_format_command(
        &self,
        library_path: &Path,
        book_id: &str,
        staged: &Path,
    ) -> ExternalCommand {
        self.subcommand("add_format", library_path)
            .arg("--dont-replace")
            .arg(book_id)
            .arg(staged)
    }
}

/// `--library-path=<path>`, keeping the path's raw bytes.
fn library_path_arg(library_path: &Path) -> OsString {
    let mut arg = OsString::from("--library-path=");
    arg.push(library_path);
    arg
}

impl LibraryManager for Calibredb {
    fn check_library(&self, library_path: &Path) -> Result<String> {
        process::run(&self.check_library_command(library_path))
    }

    fn add_book(
        &self,
        library_path: &Path,
        staged: &Path,
        title: &str,
        author: &str,
    ) -> Result<String> {
        process::run(&self.add_book_command(library_path, staged, title, author))
    }

    fn add_format(&self, library_path: &Path, book_id: &str, staged: &Path) -> Result<String> {
        process::run(&self.add_format_command(library_path, book_id, staged))
    }
}
