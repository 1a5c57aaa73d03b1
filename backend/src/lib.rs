//! # qctc - QC test-case archive
//!
//! Ingests raw QC test-case spreadsheets into a combined, device-scoped
//! dataset and validates that dataset.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Raw CSV   │────▶│   Parser    │────▶│  Transform  │────▶│   Archive   │
//! │ (localized) │     │ (auto-enc)  │     │ (rules+grp) │     │ (snap+merge)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                                         ┌─────────────┐            │
//!                                         │  Validator  │◀───────────┘
//!                                         │ (6 checks)  │  combined CSV
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use qctc::{ingest, validate_file, IngestConfig};
//!
//! let config = IngestConfig::new("basic_web.csv", "Basic Verification");
//! let summary = ingest(&config)?;
//! let report = validate_file(&summary.combined_path)?;
//! println!("{} groups added, {} issue(s)", summary.groups_added, report.issues);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Devices, rows and test-case groups
//! - [`config`] - Run configuration
//! - [`parser`] - CSV loading with encoding detection
//! - [`transform`] - Column mapping, derivation rules, grouping, pipeline
//! - [`archive`] - Snapshots and the combined dataset
//! - [`validation`] - Combined dataset checks
//! - [`logs`] - Console logging

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Storage
pub mod archive;

// Validation
pub mod validation;

// =============================================================================
// Re-exports - Errors and config
// =============================================================================

pub use config::IngestConfig;
pub use error::{CsvError, IngestError, ValidateError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Device, DeviceSet, RawRow, TestCaseGroup};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{read_table, Table};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    generate_scope_of_dev,
    group_rows,
    ingest,
    ingest_on,
    preview,
    set_device_relevancy,
    transform_table,
    ColumnMapping,
    IngestSummary,
    PreviewResult,
};

// =============================================================================
// Re-exports - Archive and validation
// =============================================================================

pub use archive::{merge, Archive};
pub use validation::{log_report, validate_file, validate_table, ValidationReport};
