pub mod json;
pub mod vectors;

use thiserror::Error;

use crate::model::{Dataset, VectorStore};

pub use vectors::LoadReport;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv: {0}")]
    Csv(#[from] vectors::CsvLoadError),
    #[error("json: {0}")]
    Json(#[from] json::JsonLoadError),
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("unable to detect format")]
    UnknownFormat,
    #[error("no data published for `{prefix}`")]
    NoData { prefix: String },
    #[error("{0}")]
    Fetch(String),
}

/// The kinds of input a page can be fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// `vector,ref_date,value`
    DataCsv,
    /// `vector,title,uom,scalar_factor`
    MetadataCsv,
    /// Array of year records, or `{"records": [...]}`.
    JsonDataset,
}

/// Sniff the format from the first bytes.
pub fn detect_format(data: &[u8]) -> Result<DataFormat, LoadError> {
    let text = std::str::from_utf8(data)?;
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.starts_with('{') || text.starts_with('[') {
        return Ok(DataFormat::JsonDataset);
    }
    let header = text.lines().next().unwrap_or_default().to_ascii_lowercase();
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let has = |name: &str| columns.contains(&name);
    if has("vector") && has("scalar_factor") {
        Ok(DataFormat::MetadataCsv)
    } else if has("vector") && has("ref_date") && has("value") {
        Ok(DataFormat::DataCsv)
    } else {
        Err(LoadError::UnknownFormat)
    }
}

/// Build a store from the published `data.csv` and, optionally, `metadata.csv`.
pub fn load_store(data: &[u8], metadata: Option<&[u8]>) -> Result<(VectorStore, LoadReport), LoadError> {
    let mut store = VectorStore::new();
    let report = vectors::parse_data_csv(data, &mut store)?;
    if let Some(meta) = metadata {
        vectors::parse_metadata_csv(meta, &mut store)?;
    }
    Ok((store, report))
}

/// Auto-detect the format and produce the dataset for `prefix`.
///
/// A `data.csv` payload is pivoted by prefix; a JSON dataset is taken as is.
pub fn parse_dataset_auto(data: &[u8], prefix: &str) -> Result<Dataset, LoadError> {
    match detect_format(data)? {
        DataFormat::JsonDataset => Ok(json::parse_dataset_json(data)?),
        DataFormat::DataCsv => {
            let (store, _) = load_store(data, None)?;
            dataset_for_prefix(&store, prefix)
        }
        DataFormat::MetadataCsv => Err(LoadError::UnknownFormat),
    }
}

/// The dataset for `prefix`, or [`LoadError::NoData`] when nothing matches.
pub fn dataset_for_prefix(store: &VectorStore, prefix: &str) -> Result<Dataset, LoadError> {
    let dataset = store.dataset(prefix);
    if dataset.is_empty() {
        return Err(LoadError::NoData {
            prefix: prefix.to_string(),
        });
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_formats() {
        assert_eq!(
            detect_format(b"vector,ref_date,value\n").unwrap(),
            DataFormat::DataCsv
        );
        assert_eq!(
            detect_format(b"vector,title,uom,scalar_factor\n").unwrap(),
            DataFormat::MetadataCsv
        );
        assert_eq!(detect_format(b"  [ ]").unwrap(), DataFormat::JsonDataset);
        assert!(matches!(detect_format(b"a;b;c 3"), Err(LoadError::UnknownFormat)));
    }

    #[test]
    fn auto_pivots_csv() {
        let csv = b"vector,ref_date,value\ncapex_total,2021,7\ninfra_total,2021,9\n";
        let ds = parse_dataset_auto(csv, "infra_").unwrap();
        assert_eq!(ds.latest().unwrap().get("total"), Some(9.0));
    }

    #[test]
    fn empty_prefix_is_an_error() {
        let csv = b"vector,ref_date,value\ncapex_total,2021,7\n";
        let err = parse_dataset_auto(csv, "cea_").unwrap_err();
        assert_eq!(err.to_string(), "no data published for `cea_`");
    }
}
