//! CSV reading with encoding detection.
//!
//! Loads a whole file into a [`Table`] of string cells. No QC-specific logic
//! here: column selection lives in [`crate::transform::columns`].

use std::path::Path;

use crate::error::{CsvError, CsvResult};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A fully loaded CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column headers, in file order
    pub headers: Vec<String>,
    /// Data rows; every row has exactly `headers.len()` cells
    pub rows: Vec<Vec<String>>,
    /// Line each data row starts on (header is line 1)
    pub lines: Vec<u64>,
    /// Encoding the content was decoded from
    pub encoding: String,
}

impl Table {
    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// Number of data rows.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 (with or without BOM) short-circuits; otherwise chardet
/// decides.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "euc-kr" | "cp949" | "uhc" => "euc-kr".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| CsvError::EncodingError(e.to_string())),
        label => {
            let codec = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| CsvError::EncodingError(format!("Unsupported encoding: {}", label)))?;
            let (decoded, _, had_errors) = codec.decode(bytes);
            if had_errors {
                return Err(CsvError::EncodingError(format!(
                    "Content is not valid {}",
                    codec.name()
                )));
            }
            Ok(decoded.into_owned())
        }
    }
}

/// Parse comma-delimited CSV text into a [`Table`].
///
/// Cells are kept verbatim (no trimming). Short rows are padded with empty
/// cells; rows longer than the header are a parse error.
pub fn parse_str(content: &str) -> CsvResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(CsvError::EmptyFile);
    }

    let mut rows = Vec::new();
    let mut lines = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() == 1 && record[0].is_empty() && headers.len() > 1 {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() > headers.len() {
            return Err(CsvError::ParseError {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    record.len()
                ),
            });
        }

        let mut row: Vec<String> = record.iter().map(String::from).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
        lines.push(line);
    }

    Ok(Table {
        headers,
        rows,
        lines,
        encoding: "utf-8".to_string(),
    })
}

/// Parse CSV bytes with encoding auto-detection.
pub fn parse_bytes(bytes: &[u8]) -> CsvResult<Table> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let mut table = parse_str(&content)?;
    table.encoding = encoding;
    Ok(table)
}

/// Read and parse a CSV file.
///
/// # Example
/// ```ignore
/// let table = read_table("preprocessed-tc/basic_web.csv")?;
/// println!("{} rows, columns: {}", table.len(), table.headers.join(", "));
/// ```
pub fn read_table<P: AsRef<Path>>(path: P) -> CsvResult<Table> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_str("name,age\nAlice,30\nBob,25").unwrap();

        assert_eq!(table.headers, vec!["name", "age"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec!["Alice", "30"]);
        assert_eq!(table.column("age").unwrap().collect::<Vec<_>>(), vec!["30", "25"]);
    }

    #[test]
    fn test_quoted_multiline_cell() {
        let csv = "a,b\n\"line1\nline2\", x \n";
        let table = parse_str(csv).unwrap();

        assert_eq!(table.rows[0][0], "line1\nline2");
        assert_eq!(table.lines, vec![2]);
        // cells are not trimmed
        assert_eq!(table.rows[0][1], " x ");
    }

    #[test]
    fn test_short_rows_padded() {
        let table = parse_str("a,b,c\n1,2").unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_long_row_is_error() {
        let err = parse_str("a,b\n1,2,3").unwrap_err();
        assert!(matches!(err, CsvError::ParseError { .. }));
    }

    #[test]
    fn test_empty_input_error() {
        assert!(matches!(parse_bytes(b""), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes(b"\n\n"), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Purpose,대분류\nWeb,A\n".as_bytes());
        let table = parse_bytes(&bytes).unwrap();

        assert_eq!(table.encoding, "utf-8");
        assert_eq!(table.headers, vec!["Purpose", "대분류"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_missing_column_lookup() {
        let table = parse_str("a\n1").unwrap();
        assert!(table.column("b").is_none());
        assert!(table.has_column("a"));
    }
}
