//! Transformation module.
//!
//! This module turns raw spreadsheets into canonical test-case groups:
//! - Columns: Column selection and renaming
//! - Rules: Scope and device derivation
//! - Grouper: Canonical rows to test-case groups
//! - Pipeline: Ingestion run (snapshot + merge)

pub mod columns;
pub mod grouper;
pub mod pipeline;
pub mod rules;

pub use columns::{ColumnMapping, ColumnRule, Presence, RawField};
pub use grouper::group_rows;
pub use pipeline::*;
pub use rules::{generate_scope_of_dev, set_device_relevancy, DeviceRule, DEVICE_RULES};
