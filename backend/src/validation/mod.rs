//! Data-quality checks for the combined dataset.
//!
//! Six independent checks run over the raw cells of the combined file:
//!
//! 1. Schema completeness - all thirteen canonical columns present
//! 2. Empty required fields - per text column
//! 3. Device column values - booleans only, absent columns reported
//! 4. Orphaned rows - no device flag set
//! 5. Per-project summary - informational
//! 6. Duplicate keys - (project_name, main_category, scope_of_dev)
//!
//! Findings are data, not errors: [`validate_table`] never fails, and the
//! CLI exits zero whatever the report says.
//!
//! # Example
//!
//! ```rust,ignore
//! use qctc::validation::{log_report, validate_file};
//!
//! let report = validate_file("project-tc-archive/combined_project_test_cases.csv")?;
//! log_report(&report);
//! println!("{} issue(s)", report.issues);
//! ```

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{ValidateError, ValidateResult};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning, log_warning_indent};
use crate::models::{canonical_columns, parse_flag, Device, MAIN_CATEGORY, PROJECT_NAME, SCOPE_OF_DEV, TEXT_COLUMNS};
use crate::parser::{read_table, Table};

/// Check 1: canonical columns absent from the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaCheck {
    pub missing: Vec<String>,
}

impl SchemaCheck {
    pub fn issues(&self) -> usize {
        usize::from(!self.missing.is_empty())
    }
}

/// Rows with an empty value in one required column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCount {
    pub column: String,
    pub count: usize,
}

/// Check 2: empty required fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmptyFieldsCheck {
    /// One entry per required column present in the file
    pub fields: Vec<FieldCount>,
}

impl EmptyFieldsCheck {
    /// One issue per column with at least one empty value.
    pub fn issues(&self) -> usize {
        self.fields.iter().filter(|f| f.count > 0).count()
    }

    pub fn count_for(&self, column: &str) -> Option<usize> {
        self.fields.iter().find(|f| f.column == column).map(|f| f.count)
    }
}

/// State of one device column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeviceColumnStatus {
    Valid,
    Invalid { count: usize },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceColumnCheck {
    pub device: Device,
    #[serde(flatten)]
    pub status: DeviceColumnStatus,
}

/// Check 3: device column values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceTypeCheck {
    /// One entry per device, in column order
    pub columns: Vec<DeviceColumnCheck>,
}

impl DeviceTypeCheck {
    /// Device columns that are missing or hold non-boolean values.
    pub fn problems(&self) -> impl Iterator<Item = &DeviceColumnCheck> {
        self.columns
            .iter()
            .filter(|c| c.status != DeviceColumnStatus::Valid)
    }

    pub fn issues(&self) -> usize {
        usize::from(self.problems().next().is_some())
    }

    pub fn status_of(&self, device: Device) -> Option<&DeviceColumnStatus> {
        self.columns.iter().find(|c| c.device == device).map(|c| &c.status)
    }
}

/// Check 4: rows no device view will ever show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanCheck {
    pub count: usize,
    /// No device column present, nothing to check
    pub skipped: bool,
}

impl OrphanCheck {
    pub fn issues(&self) -> usize {
        usize::from(self.count > 0)
    }
}

/// Check 5 entry: rows per project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub groups: usize,
}

/// Check 6: rows sharing a natural key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateCheck {
    /// Every member of every duplicate set
    pub count: usize,
}

impl DuplicateCheck {
    pub fn issues(&self) -> usize {
        usize::from(self.count > 0)
    }
}

/// Outcome of all checks on one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Data rows in the file
    pub rows: usize,
    pub schema: SchemaCheck,
    pub empty_fields: EmptyFieldsCheck,
    pub device_types: DeviceTypeCheck,
    pub orphans: OrphanCheck,
    /// Projects ascending by name
    pub projects: Vec<ProjectSummary>,
    pub duplicates: DuplicateCheck,
    /// Total issues across every check except the project summary
    pub issues: usize,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.issues == 0
    }
}

/// Read the combined dataset and run every check.
pub fn validate_file<P: AsRef<Path>>(path: P) -> ValidateResult<ValidationReport> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ValidateError::NotFound(path.to_path_buf()));
    }
    let table = read_table(path)?;
    Ok(validate_table(&table))
}

/// Run every check on a loaded table.
pub fn validate_table(table: &Table) -> ValidationReport {
    let schema = check_schema(table);
    let empty_fields = check_empty_fields(table);
    let device_types = check_device_types(table);
    let orphans = check_orphans(table);
    let projects = summarize_projects(table);
    let duplicates = check_duplicates(table);

    let issues = schema.issues()
        + empty_fields.issues()
        + device_types.issues()
        + orphans.issues()
        + duplicates.issues();

    ValidationReport {
        rows: table.len(),
        schema,
        empty_fields,
        device_types,
        orphans,
        projects,
        duplicates,
        issues,
    }
}

pub fn check_schema(table: &Table) -> SchemaCheck {
    SchemaCheck {
        missing: canonical_columns()
            .into_iter()
            .filter(|c| !table.has_column(c))
            .map(String::from)
            .collect(),
    }
}

pub fn check_empty_fields(table: &Table) -> EmptyFieldsCheck {
    let fields = TEXT_COLUMNS
        .iter()
        .filter_map(|column| {
            let count = table.column(column)?.filter(|v| v.is_empty()).count();
            Some(FieldCount {
                column: column.to_string(),
                count,
            })
        })
        .collect();
    EmptyFieldsCheck { fields }
}

pub fn check_device_types(table: &Table) -> DeviceTypeCheck {
    let columns = Device::ALL
        .iter()
        .map(|device| {
            let status = match table.column(device.column()) {
                None => DeviceColumnStatus::Missing,
                Some(values) => match values.filter(|v| parse_flag(v).is_none()).count() {
                    0 => DeviceColumnStatus::Valid,
                    count => DeviceColumnStatus::Invalid { count },
                },
            };
            DeviceColumnCheck {
                device: *device,
                status,
            }
        })
        .collect();
    DeviceTypeCheck { columns }
}

/// A row is orphaned when every present device cell reads as false.
/// Non-boolean cells do not count as false.
pub fn check_orphans(table: &Table) -> OrphanCheck {
    let device_idx: Vec<usize> = Device::ALL
        .iter()
        .filter_map(|d| table.column_index(d.column()))
        .collect();

    if device_idx.is_empty() {
        return OrphanCheck {
            count: 0,
            skipped: true,
        };
    }

    let count = table
        .rows
        .iter()
        .filter(|row| device_idx.iter().all(|i| parse_flag(&row[*i]) == Some(false)))
        .count();

    OrphanCheck {
        count,
        skipped: false,
    }
}

pub fn summarize_projects(table: &Table) -> Vec<ProjectSummary> {
    let Some(names) = table.column(PROJECT_NAME) else {
        return Vec::new();
    };

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(name, groups)| ProjectSummary {
            name: name.to_string(),
            groups,
        })
        .collect()
}

/// Absent key columns count as empty values.
pub fn check_duplicates(table: &Table) -> DuplicateCheck {
    let key_idx: Vec<Option<usize>> = [PROJECT_NAME, MAIN_CATEGORY, SCOPE_OF_DEV]
        .iter()
        .map(|c| table.column_index(c))
        .collect();

    let key_of = |row: &[String]| -> Vec<String> {
        key_idx
            .iter()
            .map(|idx| idx.map(|i| row[i].clone()).unwrap_or_default())
            .collect()
    };

    let mut occurrences: HashMap<Vec<String>, usize> = HashMap::new();
    for row in &table.rows {
        *occurrences.entry(key_of(row)).or_default() += 1;
    }

    DuplicateCheck {
        count: occurrences.values().filter(|n| **n > 1).sum(),
    }
}

/// Print a report the way an operator reads it.
pub fn log_report(report: &ValidationReport) {
    log_info("1️⃣  Checking required columns...");
    if report.schema.missing.is_empty() {
        log_success("All required columns present");
    } else {
        log_error(format!("Missing columns: {}", report.schema.missing.join(", ")));
    }

    log_info("2️⃣  Checking for empty values...");
    for field in report.empty_fields.fields.iter().filter(|f| f.count > 0) {
        log_warning(format!("{} rows with empty {}", field.count, field.column));
    }
    if report.empty_fields.issues() == 0 {
        log_success("No empty values found");
    }

    log_info("3️⃣  Checking device columns...");
    for column in report.device_types.problems() {
        match column.status {
            DeviceColumnStatus::Missing => log_error(format!("{}: Column missing", column.device)),
            DeviceColumnStatus::Invalid { count } => {
                log_warning(format!("{}: {} non-boolean values", column.device, count))
            }
            DeviceColumnStatus::Valid => {}
        }
    }
    if report.device_types.issues() == 0 {
        log_success("All device columns have valid boolean values");
    }

    log_info("4️⃣  Checking for rows with no devices selected...");
    if report.orphans.skipped {
        log_warning("No device columns to check");
    } else if report.orphans.count > 0 {
        log_warning(format!("{} rows have no devices selected", report.orphans.count));
        log_warning_indent("These rows won't appear in any device dropdown!", 1);
    } else {
        log_success("All rows have at least one device selected");
    }

    log_info("5️⃣  Project summary...");
    log_info(format!("📊 Total projects: {}", report.projects.len()));
    for project in &report.projects {
        log_info_indent(format!("- {}: {} test case groups", project.name, project.groups), 1);
    }

    log_info("6️⃣  Checking for potential duplicates...");
    if report.duplicates.count > 0 {
        log_warning(format!("{} potential duplicate rows found", report.duplicates.count));
        log_warning_indent("(Same project_name + main_category + scope_of_dev)", 1);
    } else {
        log_success("No duplicate rows found");
    }

    if report.passed() {
        log_success("✅ All checks passed! Data looks good.");
    } else {
        log_warning(format!("Found {} issue(s) that need attention.", report.issues));
    }
}
