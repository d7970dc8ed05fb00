//! `data.csv` / `metadata.csv`, the two files the website publishes.

use std::collections::HashMap;

use csv::StringRecord;
use thiserror::Error;

use crate::model::{VectorMetadata, VectorStore};

pub const DATA_HEADER: [&str; 3] = ["vector", "ref_date", "value"];
pub const METADATA_HEADER: [&str; 4] = ["vector", "title", "uom", "scalar_factor"];

#[derive(Debug, Error)]
pub enum CsvLoadError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// A row that was read but could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    /// 1-based line number, header included.
    pub line: usize,
    pub message: String,
}

/// Counts from one `data.csv` pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_used: usize,
    /// Rows whose value did not parse; kept as missing.
    pub missing_values: usize,
    pub issues: Vec<RowIssue>,
}

fn header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
            (name, idx)
        })
        .collect()
}

fn column(map: &HashMap<String, usize>, name: &'static str) -> Result<usize, CsvLoadError> {
    map.get(name).copied().ok_or(CsvLoadError::MissingColumn(name))
}

fn reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data)
}

/// Parse a year out of a `ref_date` cell: `2021`, `2021-01-01` or `2021-01`.
pub fn parse_year(ref_date: &str) -> Option<i32> {
    let head = ref_date.trim().split('-').next()?;
    if head.len() != 4 {
        return None;
    }
    head.parse().ok()
}

/// Parse a value cell. Empty, `..`, `x` and other non-numeric markers are
/// treated as missing.
pub fn parse_value(cell: &str) -> Option<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse `data.csv` into `store`.
///
/// Malformed values are recorded as missing, never as errors. Rows with an
/// unreadable year or an empty vector name are skipped and reported.
pub fn parse_data_csv(data: &[u8], store: &mut VectorStore) -> Result<LoadReport, CsvLoadError> {
    let mut rdr = reader(data);
    let map = header_map(rdr.headers()?);
    let vector_col = column(&map, "vector")?;
    let date_col = column(&map, "ref_date")?;
    let value_col = column(&map, "value")?;

    let mut report = LoadReport::default();
    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        report.rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                report.issues.push(RowIssue {
                    line,
                    message: format!("unreadable row: {e}"),
                });
                continue;
            }
        };

        let vector = record.get(vector_col).unwrap_or_default();
        if vector.is_empty() {
            report.issues.push(RowIssue {
                line,
                message: "empty vector name".into(),
            });
            continue;
        }
        let date = record.get(date_col).unwrap_or_default();
        let Some(year) = parse_year(date) else {
            tracing::warn!(line, vector, ref_date = date, "unreadable ref_date, row skipped");
            report.issues.push(RowIssue {
                line,
                message: format!("unreadable ref_date `{date}`"),
            });
            continue;
        };

        let raw = record.get(value_col).unwrap_or_default();
        match parse_value(raw) {
            Some(value) => {
                if store.insert(vector, year, value) {
                    report.rows_used += 1;
                } else {
                    tracing::warn!(line, vector, year, "duplicate point, first value kept");
                }
            }
            None => {
                tracing::warn!(line, vector, year, value = raw, "non-numeric value treated as missing");
                store.touch(vector);
                report.missing_values += 1;
            }
        }
    }

    tracing::debug!(
        rows_read = report.rows_read,
        rows_used = report.rows_used,
        issues = report.issues.len(),
        "parsed data.csv"
    );
    Ok(report)
}

/// Parse `metadata.csv` into `store`. Returns the number of rows taken.
pub fn parse_metadata_csv(data: &[u8], store: &mut VectorStore) -> Result<usize, CsvLoadError> {
    let mut rdr = reader(data);
    let map = header_map(rdr.headers()?);
    let cols = [
        column(&map, "vector")?,
        column(&map, "title")?,
        column(&map, "uom")?,
        column(&map, "scalar_factor")?,
    ];

    let mut taken = 0;
    for result in rdr.records() {
        let record = result?;
        let cell = |i: usize| record.get(cols[i]).unwrap_or_default().to_string();
        let meta = VectorMetadata {
            vector: cell(0),
            title: cell(1),
            uom: cell(2),
            scalar_factor: cell(3),
        };
        if meta.vector.is_empty() {
            continue;
        }
        if store.insert_metadata(meta) {
            taken += 1;
        }
    }
    Ok(taken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_rows() {
        let input = b"vector,ref_date,value\ncapex_oil_gas,2020,10.5\ncapex_oil_gas,2021-01-01,11\n";
        let mut store = VectorStore::new();
        let report = parse_data_csv(input, &mut store).unwrap();
        assert_eq!(report.rows_used, 2);
        assert_eq!(store.value("capex_oil_gas", 2021), Some(11.0));
    }

    #[test]
    fn malformed_values_are_missing_not_errors() {
        let input = b"vector,ref_date,value\ncapex_total,2020,..\ncapex_total,2021,x\ncapex_total,2022,5\n";
        let mut store = VectorStore::new();
        let report = parse_data_csv(input, &mut store).unwrap();
        assert_eq!(report.missing_values, 2);
        assert_eq!(report.rows_used, 1);
        assert_eq!(store.value("capex_total", 2020), None);
    }

    #[test]
    fn bad_years_are_reported() {
        let input = b"vector,ref_date,value\ncapex_total,soon,1\n";
        let mut store = VectorStore::new();
        let report = parse_data_csv(input, &mut store).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].line, 2);
    }

    #[test]
    fn requires_columns() {
        let mut store = VectorStore::new();
        let err = parse_data_csv(b"vector,value\na,1\n", &mut store).unwrap_err();
        assert!(matches!(err, CsvLoadError::MissingColumn("ref_date")));
    }

    #[test]
    fn accepts_bom_and_quoted_titles() {
        let input = "\u{feff}vector,title,uom,scalar_factor\ncapex_total,\"Capital expenditures, total\",Millions of dollars,millions\n";
        let mut store = VectorStore::new();
        assert_eq!(parse_metadata_csv(input.as_bytes(), &mut store).unwrap(), 1);
        let meta = store.metadata("capex_total").unwrap();
        assert_eq!(meta.title, "Capital expenditures, total");
    }

    #[test]
    fn year_parsing() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("2019-07"), Some(2019));
        assert_eq!(parse_year("19"), None);
        assert_eq!(parse_value("1,234.5"), Some(1234.5));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
    }
}
