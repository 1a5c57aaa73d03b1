//! High-level ingestion API: raw spreadsheet → snapshot + combined dataset.
//!
//! # Example
//!
//! ```rust,ignore
//! use qctc::{ingest, IngestConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IngestConfig::new("basic_web.csv", "Basic Verification");
//!     let summary = ingest(&config)?;
//!     println!("Added {} test case groups", summary.groups_added);
//!     Ok(())
//! }
//! ```

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use super::columns::ColumnMapping;
use super::grouper::group_rows;
use super::rules::{generate_scope_of_dev, set_device_relevancy};
use crate::archive::{list_csv_files, merge, Archive};
use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{CanonicalRow, RawRow, TestCaseGroup};
use crate::parser::{read_table, Table};

/// Result of an ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    /// Project the groups were tagged with
    pub project_name: String,

    /// Raw rows read from the input
    pub rows_read: usize,

    /// Groups written to the snapshot and merged
    pub groups_added: usize,

    /// Snapshot file written by this run
    pub snapshot_path: PathBuf,

    /// Combined dataset file
    pub combined_path: PathBuf,

    /// Rows in the combined dataset after the merge
    pub combined_rows: usize,

    /// Whether the combined dataset was created by this run
    pub created_combined: bool,
}

/// Result of a dry run
#[derive(Debug, Clone, Serialize)]
pub struct PreviewResult {
    pub rows_read: usize,
    pub groups: Vec<TestCaseGroup>,
}

/// Tag, normalize and derive scope and devices for renamed rows.
///
/// Purpose, sub category, component and scenario are consumed here and do
/// not survive into the canonical row.
pub fn canonicalize(rows: Vec<RawRow>, project_name: &str) -> Vec<CanonicalRow> {
    rows.into_iter()
        .map(|row| CanonicalRow {
            project_name: project_name.to_string(),
            scope_of_dev: generate_scope_of_dev(&row.main_category, &row.sub_category, &row.component),
            devices: set_device_relevancy(&row.purpose),
            main_category: row.main_category,
            test_case: row.test_case,
        })
        .collect()
}

/// Turn a raw table into canonical groups.
pub fn transform_table(
    table: &Table,
    columns: &ColumnMapping,
    project_name: &str,
) -> IngestResult<Vec<TestCaseGroup>> {
    let raw = columns.apply(table)?;
    Ok(group_rows(canonicalize(raw, project_name)))
}

/// Read and transform the input without writing anything.
pub fn preview(config: &IngestConfig) -> IngestResult<PreviewResult> {
    let table = read_input(config)?;
    let groups = transform_table(&table, &config.columns, &config.project_name)?;
    Ok(PreviewResult {
        rows_read: table.len(),
        groups,
    })
}

/// Run a full ingestion dated today.
pub fn ingest(config: &IngestConfig) -> IngestResult<IngestSummary> {
    ingest_on(config, Local::now().date_naive())
}

/// Run a full ingestion with an explicit snapshot date.
///
/// Everything that can fail on bad input (missing file, missing columns,
/// malformed input or combined file) fails before the first write. The
/// snapshot is written before the combined dataset; a failure between the
/// two leaves the snapshot without its merge.
pub fn ingest_on(config: &IngestConfig, date: NaiveDate) -> IngestResult<IngestSummary> {
    let archive = Archive::new(&config.archive_dir, &config.combined_file);

    fs::create_dir_all(&config.input_dir)?;
    archive.ensure_dir()?;

    log_info(format!("📁 Input file: {}", config.input.display()));
    log_info(format!("📦 Project name: {}", config.project_name));

    let table = read_input(config)?;
    log_success(format!("Read {} rows from input file", table.len()));
    log_info_indent(format!("Encoding: {}", table.encoding), 1);

    log_info("Processing data...");
    let groups = transform_table(&table, &config.columns, &config.project_name)?;
    log_success(format!("{} test case groups", groups.len()));

    let existing = archive.load_combined()?;
    match &existing {
        Some(groups) => log_success(format!(
            "Read existing combined file ({} rows)",
            groups.len()
        )),
        None => log_warning("No existing combined file found. Creating new one..."),
    }

    let snapshot_path = archive.write_snapshot(date, &config.project_name, &groups)?;
    log_success(format!("Saved per-project file: {}", snapshot_path.display()));

    let created_combined = existing.is_none();
    let groups_added = groups.len();
    let merged = merge(existing.unwrap_or_default(), groups);
    let combined_path = archive.write_combined(&merged)?;
    log_success(format!("Updated combined file: {}", combined_path.display()));

    Ok(IngestSummary {
        project_name: config.project_name.clone(),
        rows_read: table.len(),
        groups_added,
        snapshot_path,
        combined_path,
        combined_rows: merged.len(),
        created_combined,
    })
}

fn read_input(config: &IngestConfig) -> IngestResult<Table> {
    let path = config.input_path();
    if !path.is_file() {
        let available = list_csv_files(&config.input_dir);
        return Err(IngestError::InputNotFound { path, available });
    }

    read_table(&path).map_err(IngestError::Read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Device, DeviceSet};
    use crate::parser::parse_str;
    use crate::validation::validate_table;

    const HEADER: &str = "Purpose,대분류,중분류,소분류,테스트 항목";

    fn config_in(dir: &std::path::Path, project: &str) -> IngestConfig {
        IngestConfig::new("raw.csv", project)
            .with_input_dir(dir.join("preprocessed-tc"))
            .with_archive_dir(dir.join("project-tc-archive"))
    }

    fn write_input(config: &IngestConfig, body: &str) {
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_path(), format!("{}\n{}", HEADER, body)).unwrap();
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_web_and_mobile_scenario() {
        let table = parse_str(&format!("{}\nWeb and Mobile,A,,,T1\n", HEADER)).unwrap();
        let groups = transform_table(&table, &ColumnMapping::default(), "P").unwrap();

        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.project_name, "P");
        assert_eq!(g.main_category, "A");
        assert_eq!(g.scope_of_dev, "General Rules");
        assert_eq!(
            g.devices,
            DeviceSet::of(&[Device::Web, Device::AndroidMobile, Device::AppleMobile])
        );
    }

    #[test]
    fn test_rows_grouped_after_trim() {
        let table = parse_str(&format!(
            "{}\nWeb, Login ,Form,,T1\nConnected TV,Login,Form ,Button,T2\n",
            HEADER
        ))
        .unwrap();
        let groups = transform_table(&table, &ColumnMapping::default(), "P").unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].scope_of_dev, "Form");
        assert_eq!(groups[0].test_case, "T1\nT2");
        assert_eq!(groups[0].devices.len(), 5);
    }

    #[test]
    fn test_first_ingest_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "Basic Verification");
        write_input(&config, "Web,Login,Form,,T1\nMobile,Login,Form,,T2\nSmartTV,Player,,,T3\n");

        let summary = ingest_on(&config, date()).unwrap();

        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.groups_added, 2);
        assert!(summary.created_combined);
        assert_eq!(summary.combined_rows, 2);
        assert_eq!(
            summary.snapshot_path,
            config.archive_dir.join("20250301_Basic Verification.csv")
        );

        let snapshot = fs::read_to_string(&summary.snapshot_path).unwrap();
        let combined = fs::read_to_string(&summary.combined_path).unwrap();
        assert_eq!(snapshot, combined);
    }

    #[test]
    fn test_second_project_merged_descending() {
        let dir = tempfile::tempdir().unwrap();
        let alpha = config_in(dir.path(), "Alpha");
        write_input(&alpha, "Web,A,,,T1\n");
        ingest_on(&alpha, date()).unwrap();

        let zulu = config_in(dir.path(), "Zulu");
        write_input(&zulu, "Web,A,,,T9\n");
        let summary = ingest_on(&zulu, date()).unwrap();
        assert!(!summary.created_combined);

        let archive = Archive::new(&zulu.archive_dir, &zulu.combined_file);
        let combined = archive.load_combined().unwrap().unwrap();
        let projects: Vec<&str> = combined.iter().map(|g| g.project_name.as_str()).collect();
        assert_eq!(projects, vec!["Zulu", "Alpha"]);
        assert_eq!(archive.list_csv_files().len(), 3);
    }

    #[test]
    fn test_reingest_creates_duplicates_flagged_by_validator() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "P");
        write_input(&config, "Web,A,,,T1\nWeb,B,,,T2\n");

        ingest_on(&config, date()).unwrap();
        write_input(&config, "Web,A,,,T1\nWeb,B,,,T2\nWeb,C,,,T3\n");
        let summary = ingest_on(&config, date()).unwrap();
        assert_eq!(summary.combined_rows, 5);

        // same-day rerun replaces the snapshot
        assert_eq!(
            list_csv_files(&config.archive_dir),
            vec!["20250301_P.csv".to_string(), config.combined_file.clone()]
        );
        let snapshot = read_table(&summary.snapshot_path).unwrap();
        let groups = crate::archive::groups_from_table(&snapshot).unwrap();
        let mains: Vec<&str> = groups.iter().map(|g| g.main_category.as_str()).collect();
        assert_eq!(mains, vec!["A", "B", "C"]);

        let table = read_table(&summary.combined_path).unwrap();
        let report = validate_table(&table);
        assert_eq!(report.duplicates.count, 4);
        assert!(!report.passed());
    }

    #[test]
    fn test_missing_input_lists_available_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "P");
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("other.csv"), HEADER).unwrap();

        match ingest_on(&config, date()).unwrap_err() {
            IngestError::InputNotFound { available, .. } => {
                assert_eq!(available, vec!["other.csv".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!config.combined_path().exists());
    }

    #[test]
    fn test_schema_error_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "P");
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_path(), "Purpose,대분류\nWeb,A\n").unwrap();

        let err = ingest_on(&config, date()).unwrap_err();
        assert!(matches!(err, IngestError::Schema { .. }));
        assert!(err.is_recoverable());
        assert!(list_csv_files(&config.archive_dir).is_empty());
    }

    #[test]
    fn test_malformed_combined_aborts_before_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "P");
        write_input(&config, "Web,A,,,T1\n");
        fs::create_dir_all(&config.archive_dir).unwrap();
        fs::write(config.combined_path(), "project_name\nP\n").unwrap();

        let err = ingest_on(&config, date()).unwrap_err();
        assert!(matches!(err, IngestError::Combined(_)));
        assert_eq!(list_csv_files(&config.archive_dir).len(), 1);
    }

    #[test]
    fn test_schema_error_reported_before_bad_combined() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "P");
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_path(), "Purpose,대분류\nWeb,A\n").unwrap();
        fs::create_dir_all(&config.archive_dir).unwrap();
        fs::write(config.combined_path(), "project_name\nP\n").unwrap();

        let err = ingest_on(&config, date()).unwrap_err();
        assert!(matches!(err, IngestError::Schema { .. }));
    }

    #[test]
    fn test_combined_with_unknown_column_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "New");
        write_input(&config, "Web,A,,,T1\n");
        fs::create_dir_all(&config.archive_dir).unwrap();
        let existing = "project_name,main_category,scope_of_dev,test_case,Fire TV,Roku,Android TV,Apple TV,Web,Apple Mobile,Android Mobile,Smart TV,Vizio TV,Owner\n\
                        Old,A,General Rules,T0,False,False,False,False,True,False,False,False,False,alice\n";
        fs::write(config.combined_path(), existing).unwrap();

        let err = ingest_on(&config, date()).unwrap_err();
        assert!(matches!(err, IngestError::Combined(_)));
        assert!(err.is_recoverable());
        assert_eq!(fs::read_to_string(config.combined_path()).unwrap(), existing);
        assert_eq!(list_csv_files(&config.archive_dir).len(), 1);
    }

    #[test]
    fn test_preview_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "P");
        write_input(&config, "Web,A,,,T1\nWeb,A,,,T2\n");

        let result = preview(&config).unwrap();
        assert_eq!(result.rows_read, 2);
        assert_eq!(result.groups.len(), 1);
        assert!(!config.archive_dir.exists());
    }
}
