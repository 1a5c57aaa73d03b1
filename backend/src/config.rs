//! Run configuration for ingestion and validation.
//!
//! Values come from CLI flags, which fall back to `QCTC_*` environment
//! variables (a `.env` file is loaded at startup), which fall back to the
//! defaults below.

use std::path::{Path, PathBuf};

use crate::transform::columns::ColumnMapping;

/// Directory holding raw spreadsheets.
pub const DEFAULT_INPUT_DIR: &str = "preprocessed-tc";

/// Directory holding snapshots and the combined dataset.
pub const DEFAULT_ARCHIVE_DIR: &str = "project-tc-archive";

/// File name of the combined dataset inside the archive directory.
pub const DEFAULT_COMBINED_FILE: &str = "combined_project_test_cases.csv";

/// Configuration of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Raw CSV, resolved against `input_dir` unless absolute
    pub input: PathBuf,

    /// Name every group of this run is tagged with
    pub project_name: String,

    /// Directory holding raw spreadsheets
    pub input_dir: PathBuf,

    /// Directory for snapshots and the combined dataset
    pub archive_dir: PathBuf,

    /// Combined dataset file name inside `archive_dir`
    pub combined_file: String,

    /// Raw → canonical column mapping
    pub columns: ColumnMapping,
}

impl IngestConfig {
    /// Config with default directories and column mapping.
    pub fn new(input: impl Into<PathBuf>, project_name: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            project_name: project_name.into(),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            archive_dir: PathBuf::from(DEFAULT_ARCHIVE_DIR),
            combined_file: DEFAULT_COMBINED_FILE.to_string(),
            columns: ColumnMapping::default(),
        }
    }

    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    pub fn with_combined_file(mut self, name: impl Into<String>) -> Self {
        self.combined_file = name.into();
        self
    }

    /// Full path of the raw input.
    pub fn input_path(&self) -> PathBuf {
        self.input_dir.join(&self.input)
    }

    /// Full path of the combined dataset.
    pub fn combined_path(&self) -> PathBuf {
        combined_path(&self.archive_dir, &self.combined_file)
    }
}

/// Combined dataset location for an archive directory.
pub fn combined_path(archive_dir: &Path, file_name: &str) -> PathBuf {
    archive_dir.join(file_name)
}
