//! Column selection and renaming for raw spreadsheets.
//!
//! The mapping is an explicit list of [`ColumnRule`]s: each names a source
//! header, the canonical field it feeds, and whether the column must exist.

use crate::error::IngestError;
use crate::models::RawRow;
use crate::parser::Table;

/// Canonical raw field a source column is renamed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawField {
    Purpose,
    MainCategory,
    SubCategory,
    Component,
    Scenario,
    TestCase,
}

/// What to do when a source column is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Abort with a schema error
    Required,
    /// Treat every cell as empty
    Optional,
}

/// One source column → canonical field rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRule {
    /// Header in the raw spreadsheet
    pub source: String,
    /// Canonical field
    pub target: RawField,
    pub presence: Presence,
}

impl ColumnRule {
    pub fn required(source: impl Into<String>, target: RawField) -> Self {
        Self { source: source.into(), target, presence: Presence::Required }
    }

    pub fn optional(source: impl Into<String>, target: RawField) -> Self {
        Self { source: source.into(), target, presence: Presence::Optional }
    }
}

/// The complete raw → canonical column mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub rules: Vec<ColumnRule>,
}

impl Default for ColumnMapping {
    /// Localized headers of the QC spreadsheets.
    fn default() -> Self {
        Self {
            rules: vec![
                ColumnRule::required("Purpose", RawField::Purpose),
                ColumnRule::required("대분류", RawField::MainCategory),
                ColumnRule::required("중분류", RawField::SubCategory),
                ColumnRule::required("소분류", RawField::Component),
                ColumnRule::optional("Section", RawField::Scenario),
                ColumnRule::required("테스트 항목", RawField::TestCase),
            ],
        }
    }
}

impl ColumnMapping {
    /// Source headers that must be present.
    pub fn required_sources(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| r.presence == Presence::Required)
            .map(|r| r.source.as_str())
            .collect()
    }

    /// Required source headers absent from `headers`.
    pub fn missing_in(&self, headers: &[String]) -> Vec<String> {
        self.required_sources()
            .into_iter()
            .filter(|s| !headers.iter().any(|h| h == s))
            .map(String::from)
            .collect()
    }

    /// Select, rename and normalize every row of a raw table.
    ///
    /// Category fields are trimmed; every other field is kept verbatim.
    /// Columns not named by a rule are ignored.
    pub fn apply(&self, table: &Table) -> Result<Vec<RawRow>, IngestError> {
        let missing = self.missing_in(&table.headers);
        if !missing.is_empty() {
            return Err(IngestError::Schema { missing });
        }

        let resolved: Vec<(RawField, Option<usize>)> = self
            .rules
            .iter()
            .map(|r| (r.target, table.column_index(&r.source)))
            .collect();

        let rows = table
            .rows
            .iter()
            .map(|cells| {
                let mut row = RawRow::default();
                for (field, idx) in &resolved {
                    let value = idx.map(|i| cells[i].as_str()).unwrap_or("");
                    match field {
                        RawField::Purpose => row.purpose = value.to_string(),
                        RawField::MainCategory => row.main_category = value.trim().to_string(),
                        RawField::SubCategory => row.sub_category = value.trim().to_string(),
                        RawField::Component => row.component = value.trim().to_string(),
                        RawField::Scenario => row.scenario = value.to_string(),
                        RawField::TestCase => row.test_case = value.to_string(),
                    }
                }
                row
            })
            .collect();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    const HEADER: &str = "Purpose,대분류,중분류,소분류,테스트 항목";

    #[test]
    fn test_rename_and_trim() {
        let csv = format!("{}\nWeb,  Login ,  Form , , check  title \n", HEADER);
        let table = parse_str(&csv).unwrap();
        let rows = ColumnMapping::default().apply(&table).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].purpose, "Web");
        assert_eq!(rows[0].main_category, "Login");
        assert_eq!(rows[0].sub_category, "Form");
        assert_eq!(rows[0].component, "");
        // test case text is not trimmed
        assert_eq!(rows[0].test_case, " check  title ");
    }

    #[test]
    fn test_extra_columns_ignored_and_section_optional() {
        let csv = format!("ID,{},Section,Note\n7,Web,A,B,C,T,Intro,n\n", HEADER);
        let table = parse_str(&csv).unwrap();
        let rows = ColumnMapping::default().apply(&table).unwrap();

        assert_eq!(rows[0].scenario, "Intro");
        assert_eq!(rows[0].test_case, "T");

        let table = parse_str(&format!("{}\nWeb,A,B,C,T\n", HEADER)).unwrap();
        let rows = ColumnMapping::default().apply(&table).unwrap();
        assert_eq!(rows[0].scenario, "");
    }

    #[test]
    fn test_missing_columns_reported() {
        let table = parse_str("Purpose,대분류,테스트 항목\nWeb,A,T\n").unwrap();
        let err = ColumnMapping::default().apply(&table).unwrap_err();

        match err {
            IngestError::Schema { missing } => {
                assert_eq!(missing, vec!["중분류".to_string(), "소분류".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_cells_become_empty_strings() {
        let table = parse_str(&format!("{}\n,,,,\n", HEADER)).unwrap();
        let rows = ColumnMapping::default().apply(&table).unwrap();
        assert_eq!(rows[0], RawRow::default());
    }
}
