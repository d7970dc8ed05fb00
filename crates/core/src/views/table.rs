//! The data table shown beneath each chart for screen readers and anyone
//! who prefers numbers to shapes.

use serde::Serialize;

use crate::catalog::PageSpec;
use crate::format::{format_cell, format_value};
use crate::i18n::{self, Language};
use crate::model::{Dataset, TotalPolicy, YearRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    /// Shown text: a formatted number or the "no data" marker.
    pub text: String,
    /// Spoken label: `2022, Oil and gas: $12.3 billion`.
    pub aria_label: String,
    /// Raw value, `None` when missing.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub year: i32,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessibleTable {
    pub caption: String,
    /// Unit line under the caption, e.g. "Millions of dollars".
    pub unit_label: String,
    /// First column is the year.
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl AccessibleTable {
    /// One row per year, one cell per category, plus a total column when the
    /// page has one.
    pub fn build(page: &PageSpec, dataset: &Dataset, lang: Language, policy: TotalPolicy) -> Self {
        let mut headers = Vec::with_capacity(page.categories.len() + 2);
        headers.push(i18n::text("common.year", lang).to_string());
        headers.extend(page.categories.iter().map(|c| c.label(lang).to_string()));
        let with_total = has_total_column(page);
        if with_total {
            headers.push(i18n::text("common.total", lang).to_string());
        }

        let rows = dataset
            .records()
            .iter()
            .map(|record| {
                let mut cells: Vec<TableCell> = page
                    .categories
                    .iter()
                    .map(|c| cell(page, record.year, c.label(lang), record.get(c.field), lang))
                    .collect();
                if with_total {
                    let total = total_of(page, record, policy);
                    cells.push(cell(page, record.year, i18n::text("common.total", lang), total, lang));
                }
                TableRow {
                    year: record.year,
                    cells,
                }
            })
            .collect();

        Self {
            caption: page.title(lang).to_string(),
            unit_label: i18n::text(page.unit.label_key(), lang).to_string(),
            headers,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

fn has_total_column(page: &PageSpec) -> bool {
    page.total_field.is_some() || page.chart.is_part_of_whole()
}

/// Total for the row, missing only when nothing in the row is present.
fn total_of(page: &PageSpec, record: &YearRecord, policy: TotalPolicy) -> Option<f64> {
    let fields = page.category_fields();
    let provided = page.total_field.and_then(|f| record.get(f));
    let any_part = fields.iter().any(|f| record.get(f).is_some());
    if provided.is_none() && !any_part {
        return None;
    }
    Some(record.total(&fields, page.total_field, policy))
}

fn cell(page: &PageSpec, year: i32, column: &str, value: Option<f64>, lang: Language) -> TableCell {
    match value {
        Some(v) => TableCell {
            text: format_cell(v, page.unit, lang),
            aria_label: format!("{year}, {column}: {}", format_value(v, page.unit, lang)),
            value: Some(v),
        },
        None => {
            let no_data = i18n::text("common.no_data", lang);
            TableCell {
                text: no_data.to_string(),
                aria_label: format!("{year}, {column}: {no_data}"),
                value: None,
            }
        }
    }
}

/// Show/hide state of a page's table. Closed until the reader opens it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Disclosure {
    open: bool,
}

impl Disclosure {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Label for the toggle button in its current state.
    pub fn button_label(&self, lang: Language) -> &'static str {
        i18n::text(if self.open { "common.table_hide" } else { "common.table_show" }, lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PAGE_11, PAGE_24};

    fn capex() -> Dataset {
        Dataset::from_records(vec![
            YearRecord::new(2021).with("oil_gas", 12_300.0).with("electricity", 800.0),
            YearRecord::new(2022),
        ])
    }

    #[test]
    fn headers_and_rows() {
        let t = AccessibleTable::build(&PAGE_24, &capex(), Language::En, TotalPolicy::PreferProvided);
        assert_eq!(t.headers, vec!["Year", "Oil and gas", "Electricity", "Other", "Total"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].cells.len(), t.column_count() - 1);
        assert_eq!(t.unit_label, "Millions of dollars");
    }

    #[test]
    fn cells_carry_explicit_labels() {
        let t = AccessibleTable::build(&PAGE_24, &capex(), Language::En, TotalPolicy::PreferProvided);
        let row = &t.rows[0];
        assert_eq!(row.cells[0].aria_label, "2021, Oil and gas: $12.3 billion");
        assert_eq!(row.cells[0].text, "12,300.0");
        assert_eq!(row.cells[2].aria_label, "2021, Other: No data");
        assert_eq!(row.cells[3].value, Some(13_100.0));
        // An empty year has no total either.
        assert_eq!(t.rows[1].cells[3].text, "No data");
    }

    #[test]
    fn french_labels() {
        let t = AccessibleTable::build(&PAGE_24, &capex(), Language::Fr, TotalPolicy::PreferProvided);
        assert_eq!(t.headers[0], "Année");
        assert_eq!(t.rows[1].cells[0].aria_label, "2022, Pétrole et gaz: Aucune donnée");
    }

    #[test]
    fn grouped_pages_have_no_total() {
        let ds = Dataset::from_records(vec![YearRecord::new(2022).with("gdp", 1.0)]);
        let t = AccessibleTable::build(&PAGE_11, &ds, Language::En, TotalPolicy::PreferProvided);
        assert!(!t.headers.iter().any(|h| h == "Total"));
    }

    #[test]
    fn disclosure_starts_closed() {
        let mut d = Disclosure::default();
        assert!(!d.is_open());
        assert_eq!(d.button_label(Language::En), "Show data table");
        assert!(d.toggle());
        assert_eq!(d.button_label(Language::Fr), "Masquer le tableau de données");
    }
}
