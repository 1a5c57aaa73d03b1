//! Project archive - per-project snapshots and the combined dataset.
//!
//! Layout of the archive directory:
//!
//! ```text
//! project-tc-archive/
//! ├── 20250114_Basic Verification.csv     (snapshot, one per project per day)
//! ├── 20250120_Player Revamp.csv
//! └── combined_project_test_cases.csv     (every project, project_name desc)
//! ```
//!
//! Both file kinds share the thirteen-column canonical schema. Writes are full
//! overwrites; there is no locking between concurrent runs.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CsvError, CsvResult, IngestError, IngestResult};
use crate::models::{canonical_columns, parse_flag, Device, DeviceSet, TestCaseGroup, TEXT_COLUMNS};
use crate::parser::{read_table, Table};

/// Characters that cannot appear in a snapshot file name.
static UNSAFE_FILE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[/\\:*?"<>|]"#).expect("Invalid file name pattern")
});

/// Date format used as the snapshot file prefix.
pub const SNAPSHOT_DATE_FORMAT: &str = "%Y%m%d";

/// Snapshot and combined dataset storage
pub struct Archive {
    /// Directory holding every archive file
    dir: PathBuf,
    /// Combined dataset file name
    combined_file: String,
}

impl Archive {
    pub fn new(dir: impl Into<PathBuf>, combined_file: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            combined_file: combined_file.into(),
        }
    }

    /// Create the archive directory if absent.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    pub fn combined_path(&self) -> PathBuf {
        self.dir.join(&self.combined_file)
    }

    /// `<dir>/<YYYYMMDD>_<project>.csv`
    pub fn snapshot_path(&self, date: NaiveDate, project_name: &str) -> PathBuf {
        let safe_name = UNSAFE_FILE_CHARS.replace_all(project_name, "_");
        self.dir.join(format!(
            "{}_{}.csv",
            date.format(SNAPSHOT_DATE_FORMAT),
            safe_name
        ))
    }

    /// Write one run's groups as a dated snapshot, replacing a same-day one.
    pub fn write_snapshot(
        &self,
        date: NaiveDate,
        project_name: &str,
        groups: &[TestCaseGroup],
    ) -> IngestResult<PathBuf> {
        let path = self.snapshot_path(date, project_name);
        write_groups_file(&path, groups)?;
        Ok(path)
    }

    /// Load the combined dataset.
    ///
    /// Returns `None` when the file does not exist yet. A zero-byte file is
    /// an empty dataset.
    pub fn load_combined(&self) -> IngestResult<Option<Vec<TestCaseGroup>>> {
        let path = self.combined_path();
        if !path.exists() {
            return Ok(None);
        }

        match read_table(&path) {
            Ok(table) => groups_from_table(&table).map(Some).map_err(IngestError::Combined),
            Err(CsvError::EmptyFile) => Ok(Some(Vec::new())),
            Err(e) => Err(IngestError::Combined(e)),
        }
    }

    /// Overwrite the combined dataset.
    pub fn write_combined(&self, groups: &[TestCaseGroup]) -> IngestResult<PathBuf> {
        let path = self.combined_path();
        write_groups_file(&path, groups)?;
        Ok(path)
    }

    /// CSV files currently in the archive directory, sorted by name.
    pub fn list_csv_files(&self) -> Vec<String> {
        list_csv_files(&self.dir)
    }
}

/// Merge a run's groups into the existing combined dataset.
///
/// An empty dataset is replaced by `new` as-is. Otherwise existing rows come
/// first, then the whole table is stable-sorted by project name descending.
pub fn merge(existing: Vec<TestCaseGroup>, new: Vec<TestCaseGroup>) -> Vec<TestCaseGroup> {
    if existing.is_empty() {
        return new;
    }

    let mut merged = existing;
    merged.extend(new);
    merged.sort_by(|a, b| b.project_name.cmp(&a.project_name));
    merged
}

/// Serialize groups with the canonical header.
pub fn write_groups<W: Write>(writer: W, groups: &[TestCaseGroup]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(canonical_columns())?;
    for group in groups {
        wtr.write_record(group.to_record())?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_groups_file(path: &Path, groups: &[TestCaseGroup]) -> IngestResult<()> {
    let file = fs::File::create(path)?;
    write_groups(std::io::BufWriter::new(file), groups)?;
    Ok(())
}

/// Parse a canonical table back into groups.
///
/// The header must be exactly the canonical columns (any order); device
/// cells must be booleans. Unknown columns are rejected since rewriting the
/// file would drop them.
pub fn groups_from_table(table: &Table) -> CsvResult<Vec<TestCaseGroup>> {
    let canonical = canonical_columns();
    let missing: Vec<&str> = canonical
        .iter()
        .copied()
        .filter(|c| !table.has_column(c))
        .collect();
    if !missing.is_empty() {
        return Err(CsvError::ParseError {
            line: 1,
            message: format!("missing column(s): {}", missing.join(", ")),
        });
    }

    let unexpected: Vec<&str> = table
        .headers
        .iter()
        .map(String::as_str)
        .filter(|h| !canonical.iter().any(|c| c == h))
        .collect();
    if !unexpected.is_empty() {
        return Err(CsvError::ParseError {
            line: 1,
            message: format!("unexpected column(s): {}", unexpected.join(", ")),
        });
    }

    let text_idx: Vec<usize> = TEXT_COLUMNS
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();
    let device_idx: Vec<(Device, usize)> = Device::ALL
        .iter()
        .filter_map(|d| table.column_index(d.column()).map(|i| (*d, i)))
        .collect();

    table
        .rows
        .iter()
        .zip(&table.lines)
        .map(|(row, line)| {
            let mut devices = DeviceSet::empty();
            for (device, idx) in &device_idx {
                let cell = &row[*idx];
                match parse_flag(cell) {
                    Some(true) => devices.insert(*device),
                    Some(false) => {}
                    None => {
                        return Err(CsvError::InvalidValue {
                            line: *line,
                            column: device.column().to_string(),
                            value: cell.clone(),
                            message: "expected a boolean".to_string(),
                        })
                    }
                }
            }

            Ok(TestCaseGroup {
                project_name: row[text_idx[0]].clone(),
                main_category: row[text_idx[1]].clone(),
                scope_of_dev: row[text_idx[2]].clone(),
                test_case: row[text_idx[3]].clone(),
                devices,
            })
        })
        .collect()
}

/// CSV files in a directory, sorted by name. Unreadable directories yield
/// nothing.
pub fn list_csv_files(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "csv"))
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(String::from))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn group(project: &str, scope: &str, devices: &[Device]) -> TestCaseGroup {
        TestCaseGroup {
            project_name: project.into(),
            main_category: "Main".into(),
            scope_of_dev: scope.into(),
            test_case: format!("{project}-{scope}"),
            devices: DeviceSet::of(devices),
        }
    }

    #[test]
    fn test_snapshot_path_format() {
        let archive = Archive::new("arch", "combined.csv");
        let date = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();

        assert_eq!(
            archive.snapshot_path(date, "Basic Verification"),
            PathBuf::from("arch/20250114_Basic Verification.csv")
        );
        assert_eq!(
            archive.snapshot_path(date, "Web/TV: v2"),
            PathBuf::from("arch/20250114_Web_TV_ v2.csv")
        );
    }

    #[test]
    fn test_merge_into_empty_is_verbatim() {
        let new = vec![group("A", "s2", &[]), group("B", "s1", &[])];
        assert_eq!(merge(Vec::new(), new.clone()), new);
    }

    #[test]
    fn test_merge_sorts_descending_and_stable() {
        let existing = vec![group("Beta", "1", &[]), group("Alpha", "1", &[])];
        let new = vec![group("Beta", "2", &[]), group("Gamma", "1", &[])];
        let merged = merge(existing, new);

        let order: Vec<String> = merged
            .iter()
            .map(|g| format!("{}/{}", g.project_name, g.scope_of_dev))
            .collect();
        assert_eq!(order, vec!["Gamma/1", "Beta/1", "Beta/2", "Alpha/1"]);
    }

    #[test]
    fn test_write_then_load_combined() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path(), "combined.csv");
        let mut multi_line = group("P", "S", &[Device::Web, Device::VizioTv]);
        multi_line.test_case = "T1\nT2, with comma".into();

        assert!(archive.load_combined().unwrap().is_none());
        archive.write_combined(&[multi_line.clone()]).unwrap();

        let loaded = archive.load_combined().unwrap().unwrap();
        assert_eq!(loaded, vec![multi_line]);

        let raw = fs::read_to_string(archive.combined_path()).unwrap();
        assert!(raw.starts_with(
            "project_name,main_category,scope_of_dev,test_case,Fire TV,Roku,Android TV,Apple TV,Web,Apple Mobile,Android Mobile,Smart TV,Vizio TV\n"
        ));
        assert!(raw.contains(",False,False,False,False,True,False,False,False,True\n"));
    }

    #[test]
    fn test_load_empty_combined_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path(), "combined.csv");
        fs::write(archive.combined_path(), "").unwrap();

        assert_eq!(archive.load_combined().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_numeric_flags_accepted() {
        let csv = "project_name,main_category,scope_of_dev,test_case,Fire TV,Roku,Android TV,Apple TV,Web,Apple Mobile,Android Mobile,Smart TV,Vizio TV\n\
                   P,A,S,T,1,0,0,0,0,0,0,0,true\n";
        let groups = groups_from_table(&parse_str(csv).unwrap()).unwrap();
        assert_eq!(groups[0].devices, DeviceSet::of(&[Device::FireTv, Device::VizioTv]));
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let csv = "project_name,main_category,scope_of_dev,test_case,Fire TV,Roku,Android TV,Apple TV,Web,Apple Mobile,Android Mobile,Smart TV,Vizio TV\n\
                   P,A,S,T,yes,0,0,0,0,0,0,0,0\n";
        let err = groups_from_table(&parse_str(csv).unwrap()).unwrap_err();
        match err {
            CsvError::InvalidValue { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "Fire TV");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_canonical_column_rejected() {
        let table = parse_str("project_name,main_category\nP,A\n").unwrap();
        assert!(matches!(groups_from_table(&table), Err(CsvError::ParseError { line: 1, .. })));
    }

    #[test]
    fn test_unexpected_column_rejected() {
        let csv = "project_name,main_category,scope_of_dev,test_case,Fire TV,Roku,Android TV,Apple TV,Web,Apple Mobile,Android Mobile,Smart TV,Vizio TV,Owner\n\
                   Old,A,S,T,0,0,0,0,1,0,0,0,0,alice\n";
        match groups_from_table(&parse_str(csv).unwrap()).unwrap_err() {
            CsvError::ParseError { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("Owner"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_list_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.csv"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        assert_eq!(list_csv_files(dir.path()), vec!["a.csv", "b.csv"]);
        assert!(list_csv_files(&dir.path().join("missing")).is_empty());
    }
}
