//! Domain models for the QC test-case pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Device`] - One of the nine supported platforms (a device column)
//! - [`DeviceSet`] - Set of devices a test-case group applies to
//! - [`RawRow`] - One renamed, normalized row from a raw spreadsheet
//! - [`TestCaseGroup`] - Canonical record of the combined dataset

use serde::Serialize;
use std::fmt;

// =============================================================================
// Canonical columns
// =============================================================================

/// Project name column.
pub const PROJECT_NAME: &str = "project_name";
/// Top-level category column.
pub const MAIN_CATEGORY: &str = "main_category";
/// Derived scope column.
pub const SCOPE_OF_DEV: &str = "scope_of_dev";
/// Newline-joined test cases column.
pub const TEST_CASE: &str = "test_case";

/// The four text columns of the canonical schema, in output order.
pub const TEXT_COLUMNS: [&str; 4] = [PROJECT_NAME, MAIN_CATEGORY, SCOPE_OF_DEV, TEST_CASE];

/// Label used when a row has neither sub category nor component.
pub const GENERAL_RULES: &str = "General Rules";

/// All thirteen canonical columns in output order.
pub fn canonical_columns() -> Vec<&'static str> {
    TEXT_COLUMNS
        .iter()
        .copied()
        .chain(Device::ALL.iter().map(|d| d.column()))
        .collect()
}

// =============================================================================
// Devices
// =============================================================================

/// A supported device or platform.
///
/// Declaration order is the column order of the combined dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Device {
    #[serde(rename = "Fire TV")]
    FireTv,
    #[serde(rename = "Roku")]
    Roku,
    #[serde(rename = "Android TV")]
    AndroidTv,
    #[serde(rename = "Apple TV")]
    AppleTv,
    #[serde(rename = "Web")]
    Web,
    #[serde(rename = "Apple Mobile")]
    AppleMobile,
    #[serde(rename = "Android Mobile")]
    AndroidMobile,
    #[serde(rename = "Smart TV")]
    SmartTv,
    #[serde(rename = "Vizio TV")]
    VizioTv,
}

impl Device {
    /// Every device, in column order.
    pub const ALL: [Device; 9] = [
        Device::FireTv,
        Device::Roku,
        Device::AndroidTv,
        Device::AppleTv,
        Device::Web,
        Device::AppleMobile,
        Device::AndroidMobile,
        Device::SmartTv,
        Device::VizioTv,
    ];

    /// Column header used in CSV files.
    pub fn column(&self) -> &'static str {
        match self {
            Self::FireTv => "Fire TV",
            Self::Roku => "Roku",
            Self::AndroidTv => "Android TV",
            Self::AppleTv => "Apple TV",
            Self::Web => "Web",
            Self::AppleMobile => "Apple Mobile",
            Self::AndroidMobile => "Android Mobile",
            Self::SmartTv => "Smart TV",
            Self::VizioTv => "Vizio TV",
        }
    }

    fn bit(&self) -> u16 {
        1 << (*self as u16)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Set of devices a row or group applies to.
///
/// Flags only ever get added; [`DeviceSet::union`] is the group aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DeviceSet(u16);

impl DeviceSet {
    /// Empty set (all flags false).
    pub fn empty() -> Self {
        Self(0)
    }

    /// Build a set from a list of devices.
    pub fn of(devices: &[Device]) -> Self {
        devices.iter().fold(Self::empty(), |set, d| set.with(*d))
    }

    /// Return a copy with `device` set.
    pub fn with(self, device: Device) -> Self {
        Self(self.0 | device.bit())
    }

    pub fn insert(&mut self, device: Device) {
        self.0 |= device.bit();
    }

    pub fn contains(&self, device: Device) -> bool {
        self.0 & device.bit() != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Devices in the set, in column order.
    pub fn iter(&self) -> impl Iterator<Item = Device> + '_ {
        Device::ALL.iter().copied().filter(|d| self.contains(*d))
    }

    /// One flag per device, in column order.
    pub fn flags(&self) -> [bool; 9] {
        Device::ALL.map(|d| self.contains(d))
    }
}

// =============================================================================
// Boolean cells
// =============================================================================

/// Serialize a device flag the way the form-generation app reads it.
pub fn format_flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Parse a device flag cell.
///
/// Accepts `true`/`false` in any case plus the numeric spellings `1`, `0`,
/// `1.0` and `0.0`. Anything else, including the empty string, is `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return Some(false);
    }
    match value {
        "1" | "1.0" => Some(true),
        "0" | "0.0" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Rows and groups
// =============================================================================

/// One raw spreadsheet row after column selection, renaming and trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub purpose: String,
    pub main_category: String,
    pub sub_category: String,
    pub component: String,
    pub scenario: String,
    pub test_case: String,
}

/// A row tagged with its project, scope and devices, ready for grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRow {
    pub project_name: String,
    pub main_category: String,
    pub scope_of_dev: String,
    pub test_case: String,
    pub devices: DeviceSet,
}

impl CanonicalRow {
    /// Natural key: (project, main category, scope).
    pub fn key(&self) -> GroupKey {
        GroupKey {
            project_name: self.project_name.clone(),
            main_category: self.main_category.clone(),
            scope_of_dev: self.scope_of_dev.clone(),
        }
    }
}

/// Natural key of a test-case group.
///
/// Field order gives the ascending sort used when grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub project_name: String,
    pub main_category: String,
    pub scope_of_dev: String,
}

/// Canonical record of the combined dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseGroup {
    pub project_name: String,
    pub main_category: String,
    pub scope_of_dev: String,
    pub test_case: String,
    #[serde(serialize_with = "serialize_devices")]
    pub devices: DeviceSet,
}

fn serialize_devices<S: serde::Serializer>(set: &DeviceSet, s: S) -> Result<S::Ok, S::Error> {
    let names: Vec<&str> = set.iter().map(|d| d.column()).collect();
    names.serialize(s)
}

impl TestCaseGroup {
    /// Cells in canonical column order.
    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![
            self.project_name.clone(),
            self.main_category.clone(),
            self.scope_of_dev.clone(),
            self.test_case.clone(),
        ];
        record.extend(self.devices.flags().iter().map(|f| format_flag(*f).to_string()));
        record
    }
}
