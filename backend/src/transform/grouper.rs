//! Group canonical rows into test-case groups.
//!
//! ```text
//! Canonical rows                          →  Groups
//! ┌──────────────────────────────────┐      ┌──────────────────────────────┐
//! │ P, Login, Form, "T1", {Web}      │      │ P, Login, Form, "T1\nT2",    │
//! │ P, Login, Form, "T2", {Roku}     │  →   │   {Web, Roku}                │
//! │ P, Player, General Rules, "T3"   │      ├──────────────────────────────┤
//! └──────────────────────────────────┘      │ P, Player, General Rules,... │
//!                                           └──────────────────────────────┘
//! ```
//!
//! Groups come out in ascending key order. Inside a group the test cases keep
//! their input order.

use std::collections::BTreeMap;

use crate::models::{CanonicalRow, DeviceSet, GroupKey, TestCaseGroup};

/// Separator between test cases of one group.
pub const TEST_CASE_SEPARATOR: &str = "\n";

/// Group rows by (project, main category, scope).
pub fn group_rows(rows: Vec<CanonicalRow>) -> Vec<TestCaseGroup> {
    let mut groups: BTreeMap<GroupKey, GroupBuilder> = BTreeMap::new();

    for row in rows {
        groups
            .entry(row.key())
            .or_insert_with(GroupBuilder::default)
            .add(row);
    }

    groups
        .into_iter()
        .map(|(key, builder)| builder.build(key))
        .collect()
}

/// Accumulates test cases and device flags of one group.
#[derive(Default)]
struct GroupBuilder {
    test_cases: Vec<String>,
    devices: DeviceSet,
}

impl GroupBuilder {
    fn add(&mut self, row: CanonicalRow) {
        self.test_cases.push(row.test_case);
        self.devices = self.devices.union(row.devices);
    }

    fn build(self, key: GroupKey) -> TestCaseGroup {
        TestCaseGroup {
            project_name: key.project_name,
            main_category: key.main_category,
            scope_of_dev: key.scope_of_dev,
            test_case: self.test_cases.join(TEST_CASE_SEPARATOR),
            devices: self.devices,
        }
    }
}
