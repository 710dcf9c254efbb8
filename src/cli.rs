//! Command-line orchestration for calibrator.
//!
//! A run checks the library, parses the report and then handles extra titles,
//! extra authors and extra formats, in that order. Any error aborts the run;
//! work done by earlier steps is not undone.

use crate::calibredb::{Calibredb, LibraryManager};
use crate::config::{CalibratorConfig, RunOptions};
use crate::error::Result;
use crate::output::OutputFormatter;
use crate::processors::{
    ImportOutcome, process_extra_authors, process_extra_formats, process_extra_titles,
};
use crate::report::{self, Category, CheckReport};
use crate::staging::Stager;
use std::path::{Path, PathBuf};

/// What a completed run did.
#[derive(Debug)]
pub struct RunReport {
    pub check: CheckReport,
    pub imported_titles: Vec<ImportOutcome>,
    pub imported_formats: Vec<ImportOutcome>,
    /// Extra-author records left for manual handling.
    pub unhandled_authors: usize,
}

impl RunReport {
    /// Every staging directory created during the run.
    pub fn staging_dirs(&self) -> Vec<&Path> {
        self.imported_titles
            .iter()
            .chain(&self.imported_formats)
            .map(|outcome| outcome.staged.staging_dir.as_path())
            .collect()
    }
}

/// Runs the checker and feeds its report through every category handler.
pub struct Calibrator<'a> {
    manager: &'a dyn LibraryManager,
    stager: Stager,
    options: RunOptions,
}

impl<'a> Calibrator<'a> {
    pub fn new(manager: &'a dyn LibraryManager, options: RunOptions) -> Self {
        Self {
            manager,
            stager: Stager::new(&options.staging_prefix),
            options,
        }
    }

    /// Uses a custom stager, e.g. one rooted in a test directory.
    pub fn with_stager(mut self, stager: Stager) -> Self {
        self.stager = stager;
        self
    }

    /// Runs `check_library` and parses what it reports.
    pub fn check(&self) -> Result<CheckReport> {
        let spinner = OutputFormatter::spinner(&format!(
            "Checking library at {}...",
            self.options.library_path.display()
        ));
        let output = self.manager.check_library(&self.options.library_path);
        spinner.finish_and_clear();

        report::parse_check_output(&output?)
    }

    /// Performs a complete run.
    pub fn run(&self) -> Result<RunReport> {
        let check = self.check()?;
        print_skipped(&check);

        OutputFormatter::header("Extra titles");
        let imported_titles =
            process_extra_titles(self.manager, &self.stager, &self.options, &check.extra_titles)?;

        OutputFormatter::header("Extra authors");
        let unhandled_authors = process_extra_authors(&check.extra_authors)?;

        OutputFormatter::header("Extra book formats");
        let imported_formats = process_extra_formats(
            self.manager,
            &self.stager,
            &self.options,
            &check.extra_formats,
        )?;

        Ok(RunReport {
            check,
            imported_titles,
            imported_formats,
            unhandled_authors,
        })
    }
}

/// Lists rows of categories that are reported but not acted on.
fn print_skipped(check: &CheckReport) {
    for category in Category::ALL.into_iter().filter(Category::is_skipped) {
        let rows = check.skipped_rows(category);
        if rows.is_empty() {
            continue;
        }
        OutputFormatter::header(&format!("{} (not handled)", category.label()));
        for row in rows {
            OutputFormatter::plain(&format!(" - {}", row[1..].join(", ")));
        }
    }
}

/// Parsed command-line input, before configuration is applied.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub library_path: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
}

/// Loads configuration and performs a run against the real `calibredb`.
///
/// # Examples
///
/// ```no_run
/// use calibrator::cli::{CliArgs, run_cli};
/// use std::path::PathBuf;
///
/// let args = CliArgs {
///     library_path: Some(PathBuf::from("/path/to/library")),
///     ..Default::default()
/// };
/// if let Err(e) = run_cli(&args) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(args: &CliArgs) -> Result<RunReport> {
    let config = CalibratorConfig::load(args.config.as_deref())?;
    let library_path = config.resolve_library_path(args.library_path.as_deref())?;
    let options = RunOptions::new(library_path, &config).with_dry_run(args.dry_run);
    let calibredb = Calibredb::from_config(&config);

    if options.dry_run {
        OutputFormatter::dry_run_notice("No files will be moved and nothing will be imported.");
    }
    OutputFormatter::info(&format!(
        "Reconciling library: {}",
        options.library_path.display()
    ));

    let report = Calibrator::new(&calibredb, options.clone()).run()?;
    print_run_summary(&report, &options);
    Ok(report)
}

fn print_run_summary(report: &RunReport, options: &RunOptions) {
    OutputFormatter::summary_table(&report.check);

    if options.dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
        return;
    }

    OutputFormatter::success(&format!(
        "Imported {} title(s) and {} format(s)",
        report.imported_titles.len(),
        report.imported_formats.len()
    ));
    if report.unhandled_authors > 0 {
        OutputFormatter::warning(&format!(
            "{} extra author record(s) need manual handling",
            report.unhandled_authors
        ));
    }
    let staging_dirs = report.staging_dirs();
    if !staging_dirs.is_empty() {
        OutputFormatter::header("Staging directories left for review");
        for dir in staging_dirs {
            OutputFormatter::plain(&format!(" - {}", dir.display()));
        }
    }
}
