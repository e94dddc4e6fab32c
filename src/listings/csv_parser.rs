//! Listing CSV reader and writer
//!
//! Header row required:
//! ```csv
//! Name,UrlPattern,FilterField,FilterValue,FilterOperator,Language,Country,Currency
//! Summer Sale,https://a.com/s,ec_category,Summer,,en,,
//! ```
//! `UrlPattern` and `FilterValue` accept several `;`-separated values.

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// Column order used for reading and writing
pub const CSV_HEADERS: [&str; 8] = [
    "Name",
    "UrlPattern",
    "FilterField",
    "FilterValue",
    "FilterOperator",
    "Language",
    "Country",
    "Currency",
];

/// One spreadsheet row; every column is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsvRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url_pattern: Option<String>,
    #[serde(default)]
    pub filter_field: Option<String>,
    #[serde(default)]
    pub filter_value: Option<String>,
    #[serde(default)]
    pub filter_operator: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A single row that could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the file (header is line 1)
    pub line: u64,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

/// The CSV could not be parsed; carries every offending row
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("CSV parsing error ({} row(s) rejected){}", .errors.len(), first_error(.errors))]
pub struct CsvParseError {
    pub errors: Vec<RowError>,
}

fn first_error(errors: &[RowError]) -> String {
    errors
        .first()
        .map(|e| format!(": {}", e))
        .unwrap_or_default()
}

/// Parse CSV text into rows
///
/// Blank lines are skipped and cells are trimmed. A row with a different
/// column count than the header, or a missing `Name` column, rejects the
/// whole file.
pub fn parse_csv_rows(content: &str) -> Result<Vec<CsvRow>, CsvParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let has_name_column = match reader.headers() {
        Ok(headers) => headers.iter().any(|h| h == "Name"),
        Err(e) => {
            return Err(CsvParseError {
                errors: vec![RowError {
                    line: 1,
                    message: e.to_string(),
                }],
            });
        }
    };
    if !has_name_column {
        return Err(CsvParseError {
            errors: vec![RowError {
                line: 1,
                message: "missing required column 'Name'".to_string(),
            }],
        });
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(index as u64 + 2);
                log::warn!("Rejected CSV line {}: {}", line, e);
                errors.push(RowError {
                    line,
                    message: e.to_string(),
                });
            }
        }
    }

    if !errors.is_empty() {
        return Err(CsvParseError { errors });
    }

    log::debug!("Parsed {} CSV rows", rows.len());
    Ok(rows)
}

/// Write rows with the standard header, even when there are no rows
pub fn write_csv_rows<W: io::Write>(writer: W, rows: &[CsvRow]) -> csv::Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(CSV_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render rows as CSV text
pub fn rows_to_csv_string(rows: &[CsvRow]) -> csv::Result<String> {
    let mut buffer = Vec::new();
    write_csv_rows(&mut buffer, rows)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_rows() {
        let csv = "Name,UrlPattern,FilterField,FilterValue,FilterOperator,Language,Country,Currency
Summer Sale,https://a.com/s,ec_category,Summer,,en,,
  Shoes  ,https://a.com/shoes;https://b.com/shoes,EC_BRAND,Nike;Adidas,contains,,,
";
        let rows = parse_csv_rows(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name.as_deref(), Some("Summer Sale"));
        assert_eq!(rows[0].language.as_deref(), Some("en"));
        assert_eq!(rows[0].filter_operator, None);
        assert_eq!(rows[1].name.as_deref(), Some("Shoes"));
        assert_eq!(rows[1].filter_value.as_deref(), Some("Nike;Adidas"));
    }

    #[test]
    fn test_missing_optional_columns() {
        let csv = "Name,UrlPattern,FilterField,FilterValue
Shoes,https://a.com/shoes,ec_category,Shoes
";
        let rows = parse_csv_rows(csv).unwrap();
        assert_eq!(rows[0].currency, None);
        assert_eq!(rows[0].filter_field.as_deref(), Some("ec_category"));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let csv = "Name,UrlPattern\n\nShoes,https://a.com\n\n";
        assert_eq!(parse_csv_rows(csv).unwrap().len(), 1);
    }

    #[test]
    fn test_inconsistent_column_count_is_reported_per_row() {
        let csv = "Name,UrlPattern,FilterField,FilterValue
Shoes,https://a.com,ec_category,Shoes
Hats,https://a.com/hats
Bags,https://a.com/bags,ec_category,Bags,extra
";
        let err = parse_csv_rows(csv).unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].line, 3);
        assert_eq!(err.errors[1].line, 4);
        assert!(err.to_string().starts_with("CSV parsing error (2 row(s) rejected): Line 3"));
    }

    #[test]
    fn test_missing_name_column() {
        let err = parse_csv_rows("Title,UrlPattern\nShoes,https://a.com\n").unwrap_err();
        assert_eq!(err.errors[0].line, 1);
        assert!(err.errors[0].message.contains("Name"));
    }

    #[test]
    fn test_header_written_for_empty_export() {
        let text = rows_to_csv_string(&[]).unwrap();
        assert_eq!(
            text,
            "Name,UrlPattern,FilterField,FilterValue,FilterOperator,Language,Country,Currency\n"
        );
    }

    #[test]
    fn test_written_rows_parse_back() {
        let rows = vec![CsvRow {
            name: Some("Shoes, Boots".into()),
            url_pattern: Some("https://a.com".into()),
            filter_field: Some("ec_category".into()),
            filter_value: Some("Shoes".into()),
            filter_operator: Some("isExactly".into()),
            ..CsvRow::default()
        }];
        let text = rows_to_csv_string(&rows).unwrap();
        assert_eq!(parse_csv_rows(&text).unwrap(), rows);
    }
}
