//! Handlers for the actionable report categories.
//!
//! Records are processed one at a time in report order. The first error stops
//! the handler and propagates; nothing already staged or imported is rolled back.

use crate::calibredb::LibraryManager;
use crate::config::RunOptions;
use crate::error::{CalibratorError, Result};
use crate::naming;
use crate::output::OutputFormatter;
use crate::report::{DirectoryRecord, FormatRecord};
use crate::staging::{StagedItem, Stager};

/// One item that was staged and handed to the library manager.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// What was imported, for reporting.
    pub description: String,
    pub staged: StagedItem,
    /// Captured output of the import command.
    pub output: String,
}

/// Re-imports book directories the library has on disk but not in its database.
///
/// Each directory is moved into a fresh staging directory, renamed to its
/// title, and added with the title and author derived from the library layout.
pub fn process_extra_titles(
    manager: &dyn LibraryManager,
    stager: &Stager,
    options: &RunOptions,
    records: &[DirectoryRecord],
) -> Result<Vec<ImportOutcome>> {
    let mut outcomes = Vec::new();

    for record in records {
        let dirpath = options.library_path.join(&record.dirpath);
        let title = naming::title_from_raw(&record.raw_title);
        // The title becomes the staged directory name; it cannot be empty.
        if title.is_empty() {
            return Err(CalibratorError::MalformedRawTitle(record.raw_title.clone()));
        }
        let author = naming::author_from_dirpath(&dirpath)?;

        if options.dry_run {
            OutputFormatter::dry_run_notice(&format!(
                "Would add: {} by {} found here: {}",
                title,
                author,
                dirpath.display()
            ));
            continue;
        }

        OutputFormatter::info(&format!(
            "Attempting to add: {} by {} found here: {}",
            title,
            author,
            dirpath.display()
        ));

        let staged = stager.stage_directory(&dirpath, &title)?;
        let output = manager.add_book(&options.library_path, &staged.staged_path, &title, &author)?;
        report_result(&output, &staged);

        outcomes.push(ImportOutcome {
            description: format!("{} by {}", title, author),
            staged,
            output,
        });
    }

    Ok(outcomes)
}

/// Attaches stray format files to the book whose directory they sit in.
///
/// The book id comes from the `(<id>)` suffix of the containing directory.
pub fn process_extra_formats(
    manager: &dyn LibraryManager,
    stager: &Stager,
    options: &RunOptions,
    records: &[FormatRecord],
) -> Result<Vec<ImportOutcome>> {
    let mut outcomes = Vec::new();

    for record in records {
        let filepath = options.library_path.join(&record.filepath);
        let book_id = naming::book_id_from_filepath(&filepath)?;

        if options.dry_run {
            OutputFormatter::dry_run_notice(&format!(
                "Would add_format: to {}, adding: {}",
                book_id,
                filepath.display()
            ));
            continue;
        }

        OutputFormatter::info(&format!(
            "Attempting to add_format: to {}, adding: {}",
            book_id,
            filepath.display()
        ));

        let staged = stager.stage_file(&filepath)?;
        let output = manager.add_format(&options.library_path, &book_id, &staged.staged_path)?;
        report_result(&output, &staged);

        outcomes.push(ImportOutcome {
            description: format!("{} for book {}", filepath.display(), book_id),
            staged,
            output,
        });
    }

    Ok(outcomes)
}

/// Extra authors are not reconciled automatically. Any records are printed for
/// manual handling and their count returned.
pub fn process_extra_authors(records: &[DirectoryRecord]) -> Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    OutputFormatter::warning("Extra authors is unimplemented - please add & file a PR :)");
    OutputFormatter::plain(&serde_json::to_string_pretty(records)?);
    Ok(records.len())
}

fn report_result(output: &str, staged: &StagedItem) {
    OutputFormatter::plain(&format!("Result: {}", output));
    // TODO: delete staging_dir automatically once calibredb signals import
    // failures through its exit code.
    OutputFormatter::warning(&format!(
        "If you are happy with the above output, you should delete this temporary directory: {}",
        staged.staging_dir.display()
    ));
}
