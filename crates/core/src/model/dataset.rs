use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One year's values for a dataset, keyed by field name (`oil_gas`, `total`, ...).
///
/// A field absent from `values` is *missing*: arithmetic treats it as zero,
/// tables render the "no data" marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

impl YearRecord {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter, mostly for tests and fixtures.
    #[must_use]
    pub fn with(mut self, field: &str, value: f64) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: f64) {
        self.values.insert(field.to_string(), value);
    }

    /// The value if present.
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    /// The value, or zero when missing.
    pub fn value(&self, field: &str) -> f64 {
        self.get(field).unwrap_or(0.0)
    }

    /// Sum of `fields`, missing ones counting as zero.
    pub fn sum(&self, fields: &[&str]) -> f64 {
        fields.iter().map(|f| self.value(f)).sum()
    }

    /// The record's total under `policy`.
    ///
    /// With [`TotalPolicy::PreferProvided`] a present `total_field` is
    /// authoritative; otherwise the categories are summed.
    pub fn total(&self, categories: &[&str], total_field: Option<&str>, policy: TotalPolicy) -> f64 {
        match (policy, total_field.and_then(|f| self.get(f))) {
            (TotalPolicy::PreferProvided, Some(provided)) => provided,
            _ => self.sum(categories),
        }
    }
}

/// How a page reconciles a provided total with the sum of its categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalPolicy {
    /// Trust the provided total field when present.
    #[default]
    PreferProvided,
    /// Always sum the category fields.
    Recompute,
}

/// A year whose provided total differs from the sum of its parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalDrift {
    pub year: i32,
    pub provided: f64,
    pub computed: f64,
}

impl TotalDrift {
    pub fn difference(&self) -> f64 {
        self.provided - self.computed
    }
}

/// Ordered year records backing one page. Years are strictly ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<YearRecord>,
}

impl Dataset {
    /// Build from records in any order.
    ///
    /// Records are sorted by year. When a year repeats, the first occurrence
    /// in input order wins and the rest are dropped.
    pub fn from_records(records: Vec<YearRecord>) -> Self {
        let mut by_year: BTreeMap<i32, YearRecord> = BTreeMap::new();
        for record in records {
            if by_year.contains_key(&record.year) {
                tracing::warn!(year = record.year, "duplicate year dropped");
                continue;
            }
            by_year.insert(record.year, record);
        }
        Self {
            records: by_year.into_values().collect(),
        }
    }

    pub fn records(&self) -> &[YearRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.records.iter().map(|r| r.year)
    }

    pub fn first(&self) -> Option<&YearRecord> {
        self.records.first()
    }

    /// The most recent year's record.
    pub fn latest(&self) -> Option<&YearRecord> {
        self.records.last()
    }

    pub fn get(&self, year: i32) -> Option<&YearRecord> {
        self.records
            .binary_search_by_key(&year, |r| r.year)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Field names that appear in any record.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .records
            .iter()
            .flat_map(|r| r.values.keys().map(String::as_str))
            .collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }

    /// Years where the provided total differs from the category sum by more
    /// than `tolerance` (absolute).
    pub fn total_drift(&self, categories: &[&str], total_field: &str, tolerance: f64) -> Vec<TotalDrift> {
        self.records
            .iter()
            .filter_map(|r| {
                let provided = r.get(total_field)?;
                let computed = r.sum(categories);
                ((provided - computed).abs() > tolerance).then_some(TotalDrift {
                    year: r.year,
                    provided,
                    computed,
                })
            })
            .collect()
    }

    /// Years in `first..=last` with no record.
    pub fn missing_years(&self) -> Vec<i32> {
        let (Some(first), Some(last)) = (self.first(), self.latest()) else {
            return Vec::new();
        };
        (first.year..=last.year)
            .filter(|y| self.get(*y).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_and_drops_duplicate_years() {
        let ds = Dataset::from_records(vec![
            YearRecord::new(2021).with("total", 2.0),
            YearRecord::new(2019).with("total", 1.0),
            YearRecord::new(2021).with("total", 99.0),
        ]);
        let years: Vec<_> = ds.years().collect();
        assert_eq!(years, vec![2019, 2021]);
        assert_eq!(ds.get(2021).and_then(|r| r.get("total")), Some(2.0));
        assert_eq!(ds.missing_years(), vec![2020]);
    }

    #[test]
    fn missing_fields_count_as_zero() {
        let r = YearRecord::new(2020).with("oil_gas", 3.0);
        assert_eq!(r.get("electricity"), None);
        assert_eq!(r.sum(&["oil_gas", "electricity"]), 3.0);
    }

    #[test]
    fn total_policy() {
        let r = YearRecord::new(2020)
            .with("a", 1.0)
            .with("b", 2.0)
            .with("total", 3.5);
        assert_eq!(r.total(&["a", "b"], Some("total"), TotalPolicy::PreferProvided), 3.5);
        assert_eq!(r.total(&["a", "b"], Some("total"), TotalPolicy::Recompute), 3.0);
        assert_eq!(r.total(&["a", "b"], None, TotalPolicy::PreferProvided), 3.0);

        let no_total = YearRecord::new(2021).with("a", 1.0);
        assert_eq!(no_total.total(&["a", "b"], Some("total"), TotalPolicy::PreferProvided), 1.0);
    }

    #[test]
    fn reports_drift_beyond_tolerance() {
        let ds = Dataset::from_records(vec![
            YearRecord::new(2019).with("a", 1.0).with("b", 2.0).with("total", 3.04),
            YearRecord::new(2020).with("a", 1.0).with("b", 2.0).with("total", 4.0),
            YearRecord::new(2021).with("a", 1.0),
        ]);
        let drift = ds.total_drift(&["a", "b"], "total", 0.05);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].year, 2020);
        assert_eq!(drift[0].difference(), 1.0);
    }
}
