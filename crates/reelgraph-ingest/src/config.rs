//! Import configuration
//!
//! Built from the command line, with environment overrides for the optional
//! movie dataset and progress display.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

pub use crate::loader::movies::MOVIES_FILE_NAME as DEFAULT_MOVIES_FILE;

/// Environment variable naming the movie dataset inside the data directory
pub const MOVIES_FILE_ENV: &str = "REELGRAPH_MOVIES_FILE";

/// Environment variable toggling progress spinners (`true`/`false`)
pub const PROGRESS_ENV: &str = "REELGRAPH_PROGRESS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Directory holding the source files
    pub data_dir: PathBuf,

    /// SQLite database to write
    pub db_path: PathBuf,

    /// Movie dataset file name, relative to `data_dir`; `None` skips it
    #[serde(default)]
    pub movies_file: Option<String>,

    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

fn default_show_progress() -> bool {
    true
}

impl ImportConfig {
    pub fn new(data_dir: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            db_path: db_path.into(),
            movies_file: None,
            show_progress: default_show_progress(),
        }
    }

    /// Defaults plus overrides from `REELGRAPH_MOVIES_FILE` and `REELGRAPH_PROGRESS`
    pub fn from_env(data_dir: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(data_dir, db_path).merge_env(|name| std::env::var(name).ok())
    }

    fn merge_env(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(file) = var(MOVIES_FILE_ENV).filter(|file| !file.is_empty()) {
            self.movies_file = Some(file);
        }

        if let Some(raw) = var(PROGRESS_ENV) {
            self.show_progress = raw.trim().parse().map_err(|_| {
                IngestError::config(format!("{PROGRESS_ENV} must be true or false, got {raw:?}"))
            })?;
        }

        Ok(self)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Full path of the movie dataset, when enabled
    pub fn movies_path(&self) -> Option<PathBuf> {
        self.movies_file.as_ref().map(|file| self.data_dir.join(file))
    }

    pub fn set_movies_file(&mut self, file: impl Into<String>) {
        self.movies_file = Some(file.into());
    }

    pub fn set_show_progress(&mut self, show: bool) {
        self.show_progress = show;
    }

    /// Fail early when the inputs cannot be read
    pub fn validate(&self) -> Result<()> {
        if !self.data_dir.is_dir() {
            return Err(IngestError::config(format!(
                "data directory {} does not exist",
                self.data_dir.display()
            )));
        }
        Ok(())
    }
}
