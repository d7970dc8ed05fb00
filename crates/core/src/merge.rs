//! Updating published `data.csv` / `metadata.csv` with a fresh export.
//!
//! A filtered merge (by source, page or pattern) replaces only the matching
//! vectors and keeps everything else. An unfiltered merge replaces the whole
//! file. Output is sorted by `(vector, ref_date)`.

use std::collections::BTreeMap;

use csv::{ReaderBuilder, Terminator, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::catalog::VectorFilter;
use crate::loaders::vectors::{DATA_HEADER, METADATA_HEADER};

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One `data.csv` line. Values are kept as published text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRow {
    pub vector: String,
    pub ref_date: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRow {
    pub vector: String,
    pub title: String,
    pub uom: String,
    pub scalar_factor: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Fresh rows that passed the filter.
    pub updated: usize,
    /// Rows in the merged output.
    pub total: usize,
}

fn records(data: &[u8], min_fields: usize) -> Result<Vec<csv::StringRecord>, MergeError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);
    let mut out = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() < min_fields {
            tracing::warn!(line = i + 2, fields = record.len(), "short row skipped");
            continue;
        }
        out.push(record);
    }
    Ok(out)
}

/// Read `data.csv` rows by position. Short rows are skipped.
pub fn read_data_rows(data: &[u8]) -> Result<Vec<DataRow>, MergeError> {
    Ok(records(data, 3)?
        .into_iter()
        .map(|r| DataRow {
            vector: r[0].to_string(),
            ref_date: r[1].to_string(),
            value: r[2].to_string(),
        })
        .collect())
}

pub fn read_metadata_rows(data: &[u8]) -> Result<Vec<MetadataRow>, MergeError> {
    Ok(records(data, 4)?
        .into_iter()
        .map(|r| MetadataRow {
            vector: r[0].to_string(),
            title: r[1].to_string(),
            uom: r[2].to_string(),
            scalar_factor: r[3].to_string(),
        })
        .collect())
}

pub fn merge_data(existing: Vec<DataRow>, fresh: Vec<DataRow>, filter: &VectorFilter) -> (Vec<DataRow>, MergeSummary) {
    let mut merged: BTreeMap<(String, String), String> = BTreeMap::new();
    if filter.is_filtered() {
        merged.extend(existing.into_iter().map(|r| ((r.vector, r.ref_date), r.value)));
    }
    let mut updated = 0;
    for row in fresh.into_iter().filter(|r| filter.matches(&r.vector)) {
        merged.insert((row.vector, row.ref_date), row.value);
        updated += 1;
    }
    let rows: Vec<DataRow> = merged
        .into_iter()
        .map(|((vector, ref_date), value)| DataRow {
            vector,
            ref_date,
            value,
        })
        .collect();
    tracing::info!(updated, total = rows.len(), "data rows merged");
    let total = rows.len();
    (rows, MergeSummary { updated, total })
}

pub fn merge_metadata(
    existing: Vec<MetadataRow>,
    fresh: Vec<MetadataRow>,
    filter: &VectorFilter,
) -> (Vec<MetadataRow>, MergeSummary) {
    let mut merged: BTreeMap<String, MetadataRow> = BTreeMap::new();
    if filter.is_filtered() {
        merged.extend(existing.into_iter().map(|r| (r.vector.clone(), r)));
    }
    let mut updated = 0;
    for row in fresh.into_iter().filter(|r| filter.matches(&r.vector)) {
        merged.insert(row.vector.clone(), row);
        updated += 1;
    }
    let rows: Vec<MetadataRow> = merged.into_values().collect();
    tracing::info!(updated, total = rows.len(), "metadata rows merged");
    let total = rows.len();
    (rows, MergeSummary { updated, total })
}

fn write_rows<T: Serialize>(header: &[&str], rows: &[T]) -> Result<String, MergeError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| MergeError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn write_data_rows(rows: &[DataRow]) -> Result<String, MergeError> {
    write_rows(&DATA_HEADER, rows)
}

pub fn write_metadata_rows(rows: &[MetadataRow]) -> Result<String, MergeError> {
    write_rows(&METADATA_HEADER, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXISTING: &str = "vector,ref_date,value\n\
        capex_oil_gas,2021,10\n\
        capex_total,2021,20\n\
        infra_pipelines,2021,5\n\
        broken\n";

    const FRESH: &str = "vector,ref_date,value\n\
        capex_oil_gas,2021,11\n\
        capex_oil_gas,2022,12\n\
        infra_pipelines,2021,6\n";

    #[test]
    fn filtered_merge_keeps_other_vectors() {
        let existing = read_data_rows(EXISTING.as_bytes()).unwrap();
        assert_eq!(existing.len(), 3);
        let fresh = read_data_rows(FRESH.as_bytes()).unwrap();
        let filter = VectorFilter::all().page("page24").unwrap();
        let (rows, summary) = merge_data(existing, fresh, &filter);
        assert_eq!(summary, MergeSummary { updated: 2, total: 4 });
        let text = write_data_rows(&rows).unwrap();
        assert_eq!(
            text,
            "vector,ref_date,value\n\
             capex_oil_gas,2021,11\n\
             capex_oil_gas,2022,12\n\
             capex_total,2021,20\n\
             infra_pipelines,2021,5\n"
        );
    }

    #[test]
    fn unfiltered_merge_replaces_everything() {
        let existing = read_data_rows(EXISTING.as_bytes()).unwrap();
        let fresh = read_data_rows(FRESH.as_bytes()).unwrap();
        let (rows, summary) = merge_data(existing, fresh, &VectorFilter::all());
        assert_eq!(summary.total, 3);
        assert!(rows.iter().all(|r| r.vector != "capex_total"));
    }

    #[test]
    fn pattern_filter() {
        let existing = read_data_rows(EXISTING.as_bytes()).unwrap();
        let fresh = read_data_rows(FRESH.as_bytes()).unwrap();
        let (rows, summary) = merge_data(existing, fresh, &VectorFilter::all().pattern("infra_*"));
        assert_eq!(summary.updated, 1);
        assert!(rows.iter().any(|r| r.vector == "capex_oil_gas" && r.value == "10"));
        assert!(rows.iter().any(|r| r.vector == "infra_pipelines" && r.value == "6"));
    }

    #[test]
    fn metadata_merge_quotes_titles() {
        let existing = read_metadata_rows(
            b"vector,title,uom,scalar_factor\ncapex_total,\"Capital expenditures, total\",Dollars,millions\n",
        )
        .unwrap();
        let fresh = read_metadata_rows(
            b"vector,title,uom,scalar_factor\ncapex_oil_gas,Oil and gas,Dollars,millions\n",
        )
        .unwrap();
        let filter = VectorFilter::all().source("capital_expenditures").unwrap();
        let (rows, _) = merge_metadata(existing, fresh, &filter);
        let text = write_metadata_rows(&rows).unwrap();
        assert_eq!(
            text,
            "vector,title,uom,scalar_factor\n\
             capex_oil_gas,Oil and gas,Dollars,millions\n\
             capex_total,\"Capital expenditures, total\",Dollars,millions\n"
        );
    }
}
