//! Run configuration.
//!
//! Settings are read from a TOML file. Every key is optional:
//!
//! ```toml
//! calibredb = "/opt/calibre/calibredb"
//! library_path = "/home/me/books"
//! ignore_names = [".git", ".stfolder"]
//! staging_prefix = "calibrator-tmp"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".calibratorrc.toml";

/// Library root used when neither the command line nor the config names one,
/// relative to the home directory.
pub const DEFAULT_LIBRARY_DIR: &str = "checkouts/ebooks/";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration in {}: {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    /// IO error while reading configuration.
    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No library path was given and the home directory is unknown.
    #[error("Home directory not found; pass a library path explicitly")]
    HomeNotFound,
}

/// Settings loaded from a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibratorConfig {
    /// Program invoked for every calibredb subcommand.
    pub calibredb: String,
    /// Library root used when none is given on the command line.
    pub library_path: Option<PathBuf>,
    /// Names `check_library` should ignore.
    pub ignore_names: Vec<String>,
    /// Prefix of every staging directory.
    pub staging_prefix: String,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            calibredb: "calibredb".to_string(),
            library_path: None,
            ignore_names: vec![".git".to_string()],
            staging_prefix: "calibrator-tmp".to_string(),
        }
    }
}

impl CalibratorConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.calibratorrc.toml` in the current directory
    /// 3. Look for `~/.config/calibrator/config.toml`
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file is missing, or if any
    /// file that is found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::home_dir().map(|home| home.join(".config")) {
            candidates.push(config_dir.join("calibrator").join("config.toml"));
        }
        Self::load_with_candidates(config_path, &candidates)
    }

    /// Like [`CalibratorConfig::load`], searching the given candidates in order
    /// when no explicit path is provided.
    pub fn load_with_candidates(
        config_path: Option<&Path>,
        candidates: &[PathBuf],
    ) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        match candidates.iter().find(|candidate| candidate.is_file()) {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Picks the library root: the command-line argument, then the configured
    /// path, then `~/checkouts/ebooks/`.
    pub fn resolve_library_path(&self, cli_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = cli_path {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.library_path {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_LIBRARY_DIR))
            .ok_or(ConfigError::HomeNotFound)
    }
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub library_path: PathBuf,
    /// Report what would happen without moving files or importing anything.
    pub dry_run: bool,
    pub staging_prefix: String,
}

impl RunOptions {
    pub fn new(library_path: PathBuf, config: &CalibratorConfig) -> Self {
        Self {
            library_path,
            dry_run: false,
            staging_prefix: config.staging_prefix.clone(),
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
