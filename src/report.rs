//! Parsing of `calibredb check_library --csv` output.
//!
//! Every row starts with a category label. Action categories are turned into
//! typed records; the skip categories are kept as raw rows so they can be shown
//! to the operator without being acted on.

use crate::error::{CalibratorError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A category label the checker may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    ExtraTitles,
    ExtraAuthors,
    ExtraBookFormats,
    InvalidTitles,
    InvalidAuthors,
    MissingBookFormats,
}

impl Category {
    /// All recognized categories, action categories first.
    pub const ALL: [Category; 6] = [
        Category::ExtraTitles,
        Category::ExtraAuthors,
        Category::ExtraBookFormats,
        Category::InvalidTitles,
        Category::InvalidAuthors,
        Category::MissingBookFormats,
    ];

    /// Returns the label exactly as `check_library` prints it.
    pub fn label(&self) -> &'static str {
        match self {
            Category::ExtraTitles => "Extra titles",
            Category::ExtraAuthors => "Extra authors",
            Category::ExtraBookFormats => "Extra book formats",
            Category::InvalidTitles => "Invalid titles",
            Category::InvalidAuthors => "Invalid authors",
            Category::MissingBookFormats => "Missing book formats",
        }
    }

    /// Looks up a category by its report label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }

    /// True for categories that are reported but never acted on.
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Category::InvalidTitles | Category::InvalidAuthors | Category::MissingBookFormats
        )
    }
}

/// A book (or author) directory the library tracks on disk but not in its
/// database. Used for both extra titles and extra authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryRecord {
    pub raw_title: String,
    /// Directory path relative to the library root.
    pub dirpath: PathBuf,
}

/// A format file that is not attached to its book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatRecord {
    pub raw_title: String,
    /// File path relative to the library root.
    pub filepath: PathBuf,
}

/// A parsed checker report. Records keep the order the checker printed them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub extra_titles: Vec<DirectoryRecord>,
    pub extra_authors: Vec<DirectoryRecord>,
    pub extra_formats: Vec<FormatRecord>,
    /// Raw rows of the skip categories, unparsed.
    pub skipped: BTreeMap<Category, Vec<Vec<String>>>,
}

impl CheckReport {
    /// Number of rows recorded under a category.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::ExtraTitles => self.extra_titles.len(),
            Category::ExtraAuthors => self.extra_authors.len(),
            Category::ExtraBookFormats => self.extra_formats.len(),
            skipped => self.skipped.get(&skipped).map_or(0, Vec::len),
        }
    }

    /// Raw rows recorded under a skip category.
    pub fn skipped_rows(&self, category: Category) -> &[Vec<String>] {
        self.skipped
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True if nothing at all was reported.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|category| self.count(*category) == 0)
    }
}

/// Decodes raw checker output into CSV rows.
///
/// Rows may have differing lengths. Blank lines are dropped by the reader.
pub fn read_rows(output: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(output.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Sorts report rows into category buckets.
///
/// Rows whose fields are all empty are ignored.
///
/// # Errors
///
/// * `UnknownCategory` as soon as a row carries an unrecognized label; later
///   rows are not examined.
/// * `MalformedRow` if an action row has fewer than three fields.
pub fn parse_check_report<I, R>(rows: I) -> Result<CheckReport>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut report = CheckReport::default();

    for row in rows {
        let row = row.as_ref();
        if row.iter().all(|field| field.is_empty()) {
            continue;
        }

        let label = &row[0];
        let category = Category::from_label(label)
            .ok_or_else(|| CalibratorError::UnknownCategory(label.clone()))?;

        match category {
            Category::ExtraBookFormats => {
                let [raw_title, filepath] = action_fields(category, row)?;
                report.extra_formats.push(FormatRecord {
                    raw_title,
                    filepath: PathBuf::from(filepath),
                });
            }
            Category::ExtraAuthors => {
                let [raw_title, dirpath] = action_fields(category, row)?;
                report.extra_authors.push(DirectoryRecord {
                    raw_title,
                    dirpath: PathBuf::from(dirpath),
                });
            }
            Category::ExtraTitles => {
                let [raw_title, dirpath] = action_fields(category, row)?;
                report.extra_titles.push(DirectoryRecord {
                    raw_title,
                    dirpath: PathBuf::from(dirpath),
                });
            }
            skipped => report.skipped.entry(skipped).or_default().push(row.to_vec()),
        }
    }

    Ok(report)
}

/// Reads then parses checker output in one step.
pub fn parse_check_output(output: &str) -> Result<CheckReport> {
    parse_check_report(read_rows(output)?)
}

fn action_fields(category: Category, row: &[String]) -> Result<[String; 2]> {
    match row {
        [_, raw_title, path, ..] => Ok([raw_title.clone(), path.clone()]),
        _ => Err(CalibratorError::MalformedRow {
            category: category.label().to_string(),
            expected: 3,
            found: row.len(),
        }),
    }
}
