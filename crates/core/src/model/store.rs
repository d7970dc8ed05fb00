use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dataset::{Dataset, YearRecord};
use super::unit::Unit;

/// One row of `metadata.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub vector: String,
    pub title: String,
    pub uom: String,
    pub scalar_factor: String,
}

impl VectorMetadata {
    pub fn unit(&self) -> Unit {
        Unit::from_metadata(&self.uom, &self.scalar_factor)
    }
}

/// All published series, keyed by vector name (`capex_oil_gas`), each a
/// year-indexed map of values.
///
/// Pages read a slice of the store by vector prefix: every vector starting
/// with `capex_` becomes a field of the capital expenditures dataset, named
/// after the rest of the vector (`oil_gas`).
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    series: BTreeMap<String, BTreeMap<i32, f64>>,
    metadata: BTreeMap<String, VectorMetadata>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value. Returns `false` if the `(vector, year)` pair was
    /// already present, in which case the earlier value is kept.
    pub fn insert(&mut self, vector: &str, year: i32, value: f64) -> bool {
        let points = self.series.entry(vector.to_string()).or_default();
        if points.contains_key(&year) {
            return false;
        }
        points.insert(year, value);
        true
    }

    /// Register a vector with no usable values so it still shows up in
    /// listings.
    pub fn touch(&mut self, vector: &str) {
        self.series.entry(vector.to_string()).or_default();
    }

    pub fn insert_metadata(&mut self, meta: VectorMetadata) -> bool {
        if self.metadata.contains_key(&meta.vector) {
            return false;
        }
        self.metadata.insert(meta.vector.clone(), meta);
        true
    }

    pub fn vectors(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn value(&self, vector: &str, year: i32) -> Option<f64> {
        self.series.get(vector)?.get(&year).copied()
    }

    pub fn metadata(&self, vector: &str) -> Option<&VectorMetadata> {
        self.metadata.get(vector)
    }

    pub fn point_count(&self) -> usize {
        self.series.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Whether any vector starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.vectors().any(|v| v.starts_with(prefix))
    }

    /// Pivot every vector under `prefix` into a year-indexed dataset.
    pub fn dataset(&self, prefix: &str) -> Dataset {
        let mut by_year: BTreeMap<i32, YearRecord> = BTreeMap::new();
        for (vector, points) in self.series.range(prefix.to_string()..) {
            let Some(field) = vector.strip_prefix(prefix) else {
                break;
            };
            for (&year, &value) in points {
                by_year
                    .entry(year)
                    .or_insert_with(|| YearRecord::new(year))
                    .set(field, value);
            }
        }
        tracing::debug!(prefix, years = by_year.len(), "pivoted dataset");
        Dataset::from_records(by_year.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VectorStore {
        let mut s = VectorStore::new();
        s.insert("capex_oil_gas", 2020, 10.0);
        s.insert("capex_electricity", 2020, 5.0);
        s.insert("capex_oil_gas", 2021, 12.0);
        s.insert("capex_total", 2021, 20.0);
        s.insert("infra_total", 2021, 99.0);
        s.insert("cap_unrelated", 2021, 1.0);
        s
    }

    #[test]
    fn pivots_by_prefix() {
        let ds = store().dataset("capex_");
        assert_eq!(ds.len(), 2);
        let latest = ds.latest().unwrap();
        assert_eq!(latest.year, 2021);
        assert_eq!(latest.get("oil_gas"), Some(12.0));
        assert_eq!(latest.get("total"), Some(20.0));
        assert_eq!(latest.get("electricity"), None);
        assert!(latest.get("infra_total").is_none());
    }

    #[test]
    fn first_value_wins() {
        let mut s = store();
        assert!(!s.insert("capex_oil_gas", 2020, 999.0));
        assert_eq!(s.value("capex_oil_gas", 2020), Some(10.0));
        assert_eq!(s.point_count(), 6);
    }

    #[test]
    fn unknown_prefix_is_empty() {
        let s = store();
        assert!(!s.has_prefix("cea_"));
        assert!(s.dataset("cea_").is_empty());
    }
}
