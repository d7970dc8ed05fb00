//! Chart series: one per category, one value slot per year.

use factbook_protocol::ThemeToken;
use serde::Serialize;

use crate::analysis::ratio_percent;
use crate::catalog::PageSpec;
use crate::format::{format_percent, format_value};
use crate::i18n::Language;
use crate::model::{Dataset, TotalPolicy, Unit};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub field: &'static str,
    pub label: String,
    pub color: ThemeToken,
    /// `None` where the year has no value for this category.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub years: Vec<i32>,
    pub series: Vec<ChartSeries>,
    /// Per-year total under the page's [`TotalPolicy`].
    pub totals: Vec<f64>,
    pub unit: Unit,
    /// Shares are shown in tooltips only when categories add up to a whole.
    pub part_of_whole: bool,
    pub language: Language,
}

impl ChartData {
    pub fn from_dataset(page: &PageSpec, dataset: &Dataset, lang: Language, policy: TotalPolicy) -> Self {
        let fields = page.category_fields();
        let series = page
            .categories
            .iter()
            .map(|c| ChartSeries {
                field: c.field,
                label: c.label(lang).to_string(),
                color: c.color,
                values: dataset.records().iter().map(|r| r.get(c.field)).collect(),
            })
            .collect();
        Self {
            years: dataset.years().collect(),
            series,
            totals: dataset
                .records()
                .iter()
                .map(|r| r.total(&fields, page.total_field, policy))
                .collect(),
            unit: page.unit,
            part_of_whole: page.chart.is_part_of_whole(),
            language: lang,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty() || self.series.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.years.len() * self.series.len()
    }

    /// Value used for drawing; missing counts as zero.
    pub fn value(&self, series: usize, point: usize) -> f64 {
        self.series
            .get(series)
            .and_then(|s| s.values.get(point).copied().flatten())
            .unwrap_or(0.0)
    }

    /// Largest bar in a stacked layout (positive parts only).
    pub fn max_stacked(&self) -> f64 {
        (0..self.years.len())
            .map(|p| (0..self.series.len()).map(|s| self.value(s, p).max(0.0)).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// Largest single value.
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .copied()
            .fold(0.0, f64::max)
    }

    /// Denominator for shares at `point`: the total, or the sum of the
    /// positive parts when that is larger. Tooltips and pie wedges both use it.
    pub fn share_base(&self, point: usize) -> f64 {
        let parts: f64 = (0..self.series.len()).map(|s| self.value(s, point).max(0.0)).sum();
        self.totals.get(point).copied().unwrap_or(0.0).max(parts)
    }

    pub fn latest_point(&self) -> Option<usize> {
        self.years.len().checked_sub(1)
    }

    /// `Oil and gas: $12.3 billion (45.2%)`. The share is omitted unless the
    /// categories are parts of a whole.
    pub fn tooltip(&self, series: usize, point: usize) -> Option<String> {
        let s = self.series.get(series)?;
        let slot = s.values.get(point)?;
        let Some(value) = slot else {
            let no_data = crate::i18n::text("common.no_data", self.language);
            return Some(format!("{}: {no_data}", s.label));
        };
        let formatted = format_value(*value, self.unit, self.language);
        if !self.part_of_whole {
            return Some(format!("{}: {formatted}", s.label));
        }
        let share = ratio_percent(*value, self.share_base(point));
        Some(format!("{}: {formatted} ({})", s.label, format_percent(share, self.language)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PAGE_11, PAGE_24};
    use crate::model::YearRecord;

    fn capex() -> Dataset {
        Dataset::from_records(vec![
            YearRecord::new(2021).with("oil_gas", 30.0).with("electricity", 10.0).with("other", 10.0),
            YearRecord::new(2022)
                .with("oil_gas", 4_520.0)
                .with("electricity", 2_000.0)
                .with("total", 10_000.0),
        ])
    }

    #[test]
    fn builds_one_series_per_category() {
        let data = ChartData::from_dataset(&PAGE_24, &capex(), Language::En, TotalPolicy::PreferProvided);
        assert_eq!(data.years, vec![2021, 2022]);
        assert_eq!(data.series.len(), 3);
        assert_eq!(data.series[2].values, vec![Some(10.0), None]);
        assert_eq!(data.totals, vec![50.0, 10_000.0]);
        assert_eq!(data.value(2, 1), 0.0);
        assert_eq!(data.max_stacked(), 6_520.0);
    }

    #[test]
    fn tooltip_with_share() {
        let data = ChartData::from_dataset(&PAGE_24, &capex(), Language::En, TotalPolicy::PreferProvided);
        assert_eq!(data.tooltip(0, 1).unwrap(), "Oil and gas: $4.5 billion (45.2%)");
        assert_eq!(data.tooltip(2, 1).unwrap(), "Other: No data");
        assert!(data.tooltip(9, 0).is_none());
    }

    #[test]
    fn share_base_never_undercuts_the_parts() {
        let ds = Dataset::from_records(vec![
            YearRecord::new(2022).with("oil_gas", 30.0).with("electricity", 30.0).with("total", 40.0),
        ]);
        let data = ChartData::from_dataset(&PAGE_24, &ds, Language::En, TotalPolicy::PreferProvided);
        assert_eq!(data.share_base(0), 60.0);
        assert!(data.tooltip(0, 0).unwrap().ends_with("(50.0%)"));
        assert_eq!(data.share_base(5), 0.0);
    }

    #[test]
    fn grouped_tooltip_has_no_share() {
        let ds = Dataset::from_records(vec![YearRecord::new(2022).with("gdp", 250.0)]);
        let data = ChartData::from_dataset(&PAGE_11, &ds, Language::Fr, TotalPolicy::PreferProvided);
        let tip = data.tooltip(0, 0).unwrap();
        assert!(!tip.contains('('), "{tip}");
    }
}
