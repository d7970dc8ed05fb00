//! Aggregates derived from a dataset for charts and narrative text.
//!
//! Every ratio goes through [`ratio_percent`], so a zero denominator yields
//! 0% rather than NaN or infinity.

use serde::Serialize;

use crate::catalog::{Headline, PageSpec};
use crate::model::{Dataset, TotalPolicy, YearRecord};

/// `part / whole * 100`, with `x / 0` taken as 0.
pub fn ratio_percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 || !whole.is_finite() {
        return 0.0;
    }
    part / whole * 100.0
}

/// Each value's share of `total`, in percent.
pub fn shares(values: &[f64], total: f64) -> Vec<f64> {
    values.iter().map(|v| ratio_percent(*v, total)).collect()
}

/// Relative change from `from` to `to`, in percent.
pub fn percent_change(from: f64, to: f64) -> f64 {
    ratio_percent(to - from, from)
}

/// `(peak - latest) / peak * 100`
pub fn decline_from_peak(peak: f64, latest: f64) -> f64 {
    ratio_percent(peak - latest, peak)
}

/// A single year's value of some field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// Record with the highest `value_of`; ties go to the earliest year.
pub fn peak_by<'a>(
    dataset: &'a Dataset,
    value_of: impl Fn(&YearRecord) -> f64,
) -> Option<(&'a YearRecord, f64)> {
    let mut best: Option<(&YearRecord, f64)> = None;
    for record in dataset.records() {
        let v = value_of(record);
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((record, v));
        }
    }
    best
}

/// Lowest and highest `value_of` across the dataset.
pub fn min_max(dataset: &Dataset, value_of: impl Fn(&YearRecord) -> f64) -> Option<(YearValue, YearValue)> {
    let mut iter = dataset.records().iter().map(|r| YearValue {
        year: r.year,
        value: value_of(r),
    });
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), yv| {
        (
            if yv.value < lo.value { yv } else { lo },
            if yv.value > hi.value { yv } else { hi },
        )
    }))
}

/// Share of one category in the latest year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub field: &'static str,
    pub value: f64,
    pub share: f64,
}

/// Everything a page's narrative bullets draw on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub latest: YearValue,
    pub first: YearValue,
    pub peak: YearValue,
    /// Percent the latest value sits below the peak; zero at the peak.
    pub decline_from_peak: f64,
    /// Percent change from the first year to the latest.
    pub change_since_first: f64,
    /// Latest-year category shares, for part-of-whole charts.
    pub shares: Vec<CategoryShare>,
}

impl Summary {
    /// The category with the largest latest-year share.
    pub fn largest_share(&self) -> Option<&CategoryShare> {
        self.shares
            .iter()
            .fold(None, |best: Option<&CategoryShare>, s| match best {
                Some(b) if b.share >= s.share => Some(b),
                _ => Some(s),
            })
    }
}

/// A record's headline value for `page`.
pub fn headline_value(page: &PageSpec, record: &YearRecord, policy: TotalPolicy) -> f64 {
    match page.headline {
        Headline::Total => record.total(&page.category_fields(), page.total_field, policy),
        Headline::Field(field) => record.value(field),
    }
}

/// Latest-year category shares of the record total.
pub fn category_shares(page: &PageSpec, record: &YearRecord, policy: TotalPolicy) -> Vec<CategoryShare> {
    let fields = page.category_fields();
    let total = record.total(&fields, page.total_field, policy);
    fields
        .into_iter()
        .map(|field| {
            let value = record.value(field);
            CategoryShare {
                field,
                value,
                share: ratio_percent(value, total),
            }
        })
        .collect()
}

/// Summarize `dataset` for `page`. `None` when the dataset is empty.
pub fn summarize(page: &PageSpec, dataset: &Dataset, policy: TotalPolicy) -> Option<Summary> {
    let value_of = |r: &YearRecord| headline_value(page, r, policy);
    let latest_record = dataset.latest()?;
    let first_record = dataset.first()?;
    let (peak_record, peak_value) = peak_by(dataset, value_of)?;

    let latest = YearValue {
        year: latest_record.year,
        value: value_of(latest_record),
    };
    let first = YearValue {
        year: first_record.year,
        value: value_of(first_record),
    };
    let shares = if page.chart.is_part_of_whole() {
        category_shares(page, latest_record, policy)
    } else {
        Vec::new()
    };

    Some(Summary {
        latest,
        first,
        peak: YearValue {
            year: peak_record.year,
            value: peak_value,
        },
        decline_from_peak: decline_from_peak(peak_value, latest.value),
        change_since_first: percent_change(first.value, latest.value),
        shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PAGE_24, PAGE_30};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn capex() -> Dataset {
        Dataset::from_records(vec![
            YearRecord::new(2014).with("oil_gas", 60.0).with("electricity", 20.0).with("other", 20.0).with("total", 100.0),
            YearRecord::new(2018).with("oil_gas", 40.0).with("electricity", 25.0).with("other", 15.0).with("total", 80.0),
            YearRecord::new(2022).with("oil_gas", 30.0).with("electricity", 30.0).with("other", 15.0),
        ])
    }

    #[test]
    fn zero_over_zero_is_zero() {
        assert_eq!(ratio_percent(0.0, 0.0), 0.0);
        assert_eq!(ratio_percent(5.0, 0.0), 0.0);
        assert_eq!(shares(&[0.0, 0.0], 0.0), vec![0.0, 0.0]);
    }

    #[test]
    fn summary_of_capex() {
        let s = summarize(&PAGE_24, &capex(), TotalPolicy::PreferProvided).unwrap();
        assert_eq!(s.peak, YearValue { year: 2014, value: 100.0 });
        // 2022 has no provided total, so the categories are summed.
        assert_eq!(s.latest, YearValue { year: 2022, value: 75.0 });
        assert_relative_eq!(s.decline_from_peak, 25.0);
        assert_relative_eq!(s.change_since_first, -25.0);
        assert_eq!(s.shares.len(), 3);
        let top = s.largest_share().unwrap();
        // Tie between oil_gas and electricity goes to the first category.
        assert_eq!(top.field, "oil_gas");
        assert_relative_eq!(top.share, 40.0);
    }

    #[test]
    fn field_headline_has_no_shares() {
        let ds = Dataset::from_records(vec![
            YearRecord::new(2020).with("oil_gas", 40.0),
            YearRecord::new(2021).with("oil_gas", 40.0),
        ]);
        let s = summarize(&PAGE_30, &ds, TotalPolicy::default()).unwrap();
        assert!(s.shares.is_empty());
        // Ties go to the earliest year.
        assert_eq!(s.peak.year, 2020);
        assert_eq!(s.decline_from_peak, 0.0);
    }

    #[test]
    fn min_max_spans_dataset() {
        let (lo, hi) = min_max(&capex(), |r| r.value("oil_gas")).unwrap();
        assert_eq!((lo.year, hi.year), (2022, 2014));
        assert!(min_max(&Dataset::default(), |r| r.value("x")).is_none());
    }

    proptest! {
        #[test]
        fn shares_sum_to_hundred(values in prop::collection::vec(0.0f64..1e6, 1..12)) {
            let total: f64 = values.iter().sum();
            let s = shares(&values, total);
            let sum: f64 = s.iter().sum();
            if total > 0.0 {
                prop_assert!((sum - 100.0).abs() < 1e-6, "sum = {sum}");
            } else {
                prop_assert!(s.iter().all(|x| *x == 0.0));
            }
        }

        #[test]
        fn decline_is_never_negative_at_peak(values in prop::collection::vec(0.0f64..1e6, 1..20)) {
            let records = values
                .iter()
                .enumerate()
                .map(|(i, v)| YearRecord::new(2000 + i as i32).with("total", *v))
                .collect();
            let ds = Dataset::from_records(records);
            let (_, peak) = peak_by(&ds, |r| r.value("total")).unwrap();
            let latest = ds.latest().unwrap().value("total");
            prop_assert!(decline_from_peak(peak, latest) >= 0.0);
        }
    }
}
