//! Moving library items out into temporary staging directories.
//!
//! calibre keeps tracking a directory it finds inside the library, so an item
//! has to leave the library before it can be re-imported. Each item gets its
//! own fresh directory under the system temp dir. Staging directories are never
//! removed here; the operator deletes them once the import looks right.

use crate::error::{CalibratorError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where an item ended up after staging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedItem {
    /// The original location inside the library.
    pub original_path: PathBuf,
    /// The fresh directory created for this item.
    pub staging_dir: PathBuf,
    /// The item's new location inside `staging_dir`.
    pub staged_path: PathBuf,
}

/// Creates staging directories and moves items into them.
#[derive(Debug, Clone)]
pub struct Stager {
    prefix: String,
    root: Option<PathBuf>,
}

impl Stager {
    /// A stager that creates directories in the system temp dir, named
    /// `<prefix>-<timestamp>-<random>`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            root: None,
        }
    }

    /// Creates staging directories under `root` instead of the system temp dir.
    pub fn in_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    fn create_staging_dir(&self) -> Result<PathBuf> {
        let prefix = format!(
            "{}-{}-",
            self.prefix,
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match &self.root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir.keep())
    }

    /// Moves a directory into a new staging directory, renaming it to `new_name`.
    pub fn stage_directory(&self, dirpath: &Path, new_name: &str) -> Result<StagedItem> {
        let staging_dir = self.create_staging_dir()?;
        let staged_path = staging_dir.join(new_name);
        move_path(dirpath, &staged_path)?;

        Ok(StagedItem {
            original_path: dirpath.to_path_buf(),
            staging_dir,
            staged_path,
        })
    }

    /// Moves a file into a new staging directory, keeping its file name.
    pub fn stage_file(&self, filepath: &Path) -> Result<StagedItem> {
        let file_name = filepath
            .file_name()
            .ok_or_else(|| CalibratorError::MalformedPath {
                path: filepath.to_path_buf(),
                expected: "a file name",
            })?;

        let staging_dir = self.create_staging_dir()?;
        let staged_path = staging_dir.join(file_name);
        move_path(filepath, &staged_path)?;

        Ok(StagedItem {
            original_path: filepath.to_path_buf(),
            staging_dir,
            staged_path,
        })
    }
}

/// Renames `from` to `to`, copying and deleting when they live on different
/// filesystems.
fn move_path(from: &Path, to: &Path) -> Result<()> {
    let staging_error = |source: io::Error| CalibratorError::Staging {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            move_across_devices(from, to).map_err(staging_error)
        }
        Err(e) => Err(staging_error(e)),
    }
}

fn move_across_devices(from: &Path, to: &Path) -> io::Result<()> {
    let to_fs_extra_error = |e: fs_extra::error::Error| io::Error::other(e.to_string());

    if from.is_dir() {
        let parent = to
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no staging directory"))?;
        let options = fs_extra::dir::CopyOptions::new();
        fs_extra::dir::move_dir(from, parent, &options).map_err(to_fs_extra_error)?;

        // move_dir keeps the source name; rename within the staging directory.
        let moved = match from.file_name() {
            Some(name) => parent.join(name),
            None => return Err(io::Error::new(io::ErrorKind::InvalidInput, "no directory name")),
        };
        if moved != to {
            fs::rename(&moved, to)?;
        }
    } else {
        let options = fs_extra::file::CopyOptions::new();
        fs_extra::file::move_file(from, to, &options).map_err(to_fs_extra_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stage_directory_renames_to_title() {
        let library = TempDir::new().expect("Failed to create temp directory");
        let staging_root = TempDir::new().expect("Failed to create temp directory");

        let book_dir = library.path().join("Author").join("Foo (9)");
        fs::create_dir_all(&book_dir).expect("Failed to create book directory");
        fs::write(book_dir.join("Foo.epub"), "epub").expect("Failed to write book file");

        let stager = Stager::new("calibrator-tmp").in_dir(staging_root.path());
        let item = stager
            .stage_directory(&book_dir, "Foo")
            .expect("Failed to stage directory");

        assert!(!book_dir.exists());
        assert_eq!(item.staged_path, item.staging_dir.join("Foo"));
        assert!(item.staged_path.join("Foo.epub").is_file());
        assert!(item.staging_dir.starts_with(staging_root.path()));
        assert!(
            item.staging_dir
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("calibrator-tmp-")
        );
    }

    #[test]
    fn test_stage_file_keeps_name() {
        let library = TempDir::new().expect("Failed to create temp directory");
        let staging_root = TempDir::new().expect("Failed to create temp directory");

        let file_path = library.path().join("Foo (3)").join("Foo.mobi");
        fs::create_dir_all(file_path.parent().unwrap()).expect("Failed to create directory");
        fs::write(&file_path, "mobi").expect("Failed to write file");

        let stager = Stager::new("calibrator-tmp").in_dir(staging_root.path());
        let item = stager.stage_file(&file_path).expect("Failed to stage file");

        assert!(!file_path.exists());
        assert_eq!(item.staged_path, item.staging_dir.join("Foo.mobi"));
        assert_eq!(fs::read_to_string(&item.staged_path).unwrap(), "mobi");
        assert_eq!(item.original_path, file_path);
    }

    #[test]
    fn test_each_item_gets_its_own_directory() {
        let library = TempDir::new().expect("Failed to create temp directory");
        let staging_root = TempDir::new().expect("Failed to create temp directory");
        let first = library.path().join("a.epub");
        let second = library.path().join("b.epub");
        fs::write(&first, "a").expect("Failed to write file");
        fs::write(&second, "b").expect("Failed to write file");

        let stager = Stager::new("calibrator-tmp").in_dir(staging_root.path());
        let a = stager.stage_file(&first).unwrap();
        let b = stager.stage_file(&second).unwrap();

        assert_ne!(a.staging_dir, b.staging_dir);
    }

    #[test]
    fn test_stage_missing_source_fails() {
        let library = TempDir::new().expect("Failed to create temp directory");
        let staging_root = TempDir::new().expect("Failed to create temp directory");

        let stager = Stager::new("calibrator-tmp").in_dir(staging_root.path());
        let result = stager.stage_directory(&library.path().join("Nope"), "Nope");

        assert!(matches!(result, Err(CalibratorError::Staging { .. })));
    }

    #[test]
    fn test_copy_and_delete_move_renames_directory() {
        let library = TempDir::new().expect("Failed to create temp directory");
        let staging_root = TempDir::new().expect("Failed to create temp directory");

        let book_dir = library.path().join("Author").join("Foo (9)");
        fs::create_dir_all(book_dir.join("extra")).expect("Failed to create book directory");
        fs::write(book_dir.join("Foo.epub"), "epub").expect("Failed to write book file");
        fs::write(book_dir.join("extra").join("cover.jpg"), "jpg").expect("Failed to write cover");

        let target = staging_root.path().join("Foo");
        move_across_devices(&book_dir, &target).expect("Failed to move directory");

        assert!(!book_dir.exists());
        assert!(target.is_dir());
        assert_eq!(fs::read_to_string(target.join("Foo.epub")).unwrap(), "epub");
        assert!(target.join("extra").join("cover.jpg").is_file());
        assert!(!staging_root.path().join("Foo (9)").exists());
    }

    #[test]
    fn test_copy_and_delete_move_keeps_matching_directory_name() {
        let library = TempDir::new().expect("Failed to create temp directory");
        let staging_root = TempDir::new().expect("Failed to create temp directory");

        let book_dir = library.path().join("Foo");
        fs::create_dir_all(&book_dir).expect("Failed to create book directory");
        fs::write(book_dir.join("Foo.epub"), "epub").expect("Failed to write book file");

        let target = staging_root.path().join("Foo");
        move_across_devices(&book_dir, &target).expect("Failed to move directory");

        assert!(!book_dir.exists());
        assert!(target.join("Foo.epub").is_file());
    }

    #[test]
    fn test_copy_and_delete_move_file() {
        let library = TempDir::new().expect("Failed to create temp directory");
        let staging_root = TempDir::new().expect("Failed to create temp directory");

        let file_path = library.path().join("Foo.mobi");
        fs::write(&file_path, "mobi").expect("Failed to write file");

        let target = staging_root.path().join("Foo.mobi");
        move_across_devices(&file_path, &target).expect("Failed to move file");

        assert!(!file_path.exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "mobi");
    }
}
