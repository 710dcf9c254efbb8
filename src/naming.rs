//! Derives titles, authors and book ids from calibre's on-disk naming.
//!
//! Calibre lays a library out as `<Author>/<Title> (<book id>)/<files>`, so
//! everything the importer needs can be read back from paths and the raw
//! title strings the checker reports.
//!
//! # Examples
//!
//! ```
//! use calibrator::naming::{book_id_from_raw, title_from_raw};
//!
//! assert_eq!(title_from_raw("Foo (1234) (3234)"), "Foo (1234)");
//! assert_eq!(book_id_from_raw("Foo (1234) (3234)").unwrap(), "3234");
//! ```

use crate::error::{CalibratorError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Matches the trailing `(<digits>)` group, with any surrounding whitespace.
static TRAILING_BOOK_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\((\d+)\)\s*$").expect("Invalid trailing book id pattern")
});

/// Strips the last parenthesized numeric group from a raw title.
///
/// Earlier numeric groups are part of the title and survive. A title without
/// any trailing group is returned trimmed.
pub fn title_from_raw(raw_title: &str) -> String {
    TRAILING_BOOK_ID.replace(raw_title, "").trim().to_string()
}

/// Extracts the digits of the trailing `(<digits>)` group.
///
/// # Errors
///
/// Returns `CalibratorError::MalformedRawTitle` if the string does not end in
/// such a group.
pub fn book_id_from_raw(raw_title: &str) -> Result<String> {
    TRAILING_BOOK_ID
        .captures(raw_title)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| CalibratorError::MalformedRawTitle(raw_title.to_string()))
}

/// Returns the author for a book directory: the name of its parent directory.
///
/// `/lib/Author/Title` and `/lib/Author/Title/` both yield `Author`.
pub fn author_from_dirpath(dirpath: &Path) -> Result<String> {
    dirpath
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CalibratorError::MalformedPath {
            path: dirpath.to_path_buf(),
            expected: "an author directory",
        })
}

/// Reads the book id off the directory that contains a format file.
pub fn book_id_from_filepath(filepath: &Path) -> Result<String> {
    let raw_title = filepath
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CalibratorError::MalformedPath {
            path: filepath.to_path_buf(),
            expected: "a book directory",
        })?;
    book_id_from_raw(&raw_title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_raw_strips_book_id() {
        assert_eq!(title_from_raw("Foo (1234)"), "Foo");
    }

    #[test]
    fn test_title_from_raw_strips_only_last_group() {
        assert_eq!(title_from_raw("Foo (1234) (3234)"), "Foo (1234)");
    }

    #[test]
    fn test_title_from_raw_without_group() {
        assert_eq!(title_from_raw("  Foo  "), "Foo");
        assert_eq!(title_from_raw("Foo (bar)"), "Foo (bar)");
    }

    #[test]
    fn test_title_from_raw_trailing_whitespace() {
        assert_eq!(title_from_raw("Foo (12) "), "Foo");
    }

    #[test]
    fn test_book_id_from_raw() {
        assert_eq!(book_id_from_raw("Foo (1234)").unwrap(), "1234");
        assert_eq!(book_id_from_raw("Foo (1234) (3234)").unwrap(), "3234");
    }

    #[test]
    fn test_book_id_from_raw_missing_group() {
        let err = book_id_from_raw("Foo").unwrap_err();
        assert!(matches!(err, CalibratorError::MalformedRawTitle(ref raw) if raw == "Foo"));
    }

    #[test]
    fn test_book_id_from_raw_group_not_at_end() {
        assert!(book_id_from_raw("Foo (12) bar").is_err());
        assert!(book_id_from_raw("Foo ()").is_err());
    }

    #[test]
    fn test_author_from_dirpath() {
        assert_eq!(
            author_from_dirpath(Path::new("/lib/AuthorName/BookTitle")).unwrap(),
            "AuthorName"
        );
        assert_eq!(
            author_from_dirpath(Path::new("/lib/AuthorName/BookTitle/")).unwrap(),
            "AuthorName"
        );
    }

    #[test]
    fn test_author_from_dirpath_without_parent() {
        assert!(author_from_dirpath(Path::new("BookTitle")).is_err());
    }

    #[test]
    fn test_book_id_from_filepath() {
        let path = Path::new("/lib/Author/Foo (1234) (77)/Foo.epub");
        assert_eq!(book_id_from_filepath(path).unwrap(), "77");
    }

    #[test]
    fn test_book_id_from_filepath_untracked_dir() {
        let path = Path::new("/lib/Author/Foo/Foo.epub");
        assert!(matches!(
            book_id_from_filepath(path),
            Err(CalibratorError::MalformedRawTitle(_))
        ));
    }
}
