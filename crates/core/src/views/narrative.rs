//! Bullet-point summaries under each chart.

use crate::analysis::Summary;
use crate::catalog::PageSpec;
use crate::format::{format_percent, format_value};
use crate::i18n::{Language, text_with};

pub fn bullets(page: &PageSpec, summary: &Summary, lang: Language) -> Vec<String> {
    let label = page.headline_label(lang);
    let value = |v: f64| format_value(v, page.unit, lang);
    let latest_year = summary.latest.year.to_string();
    let mut out = Vec::with_capacity(4);

    out.push(text_with(
        "narrative.latest",
        lang,
        &[
            ("year", latest_year.as_str()),
            ("label", label),
            ("value", value(summary.latest.value).as_str()),
        ],
    ));

    if let Some(top) = summary.largest_share()
        && let Some(category) = page.category(top.field)
    {
        out.push(text_with(
            "narrative.largest_share",
            lang,
            &[
                ("category", category.label(lang)),
                ("year", latest_year.as_str()),
                ("share", format_percent(top.share, lang).as_str()),
            ],
        ));
    }

    if summary.peak.year != summary.latest.year {
        out.push(text_with(
            "narrative.peak",
            lang,
            &[
                ("label", label),
                ("value", value(summary.peak.value).as_str()),
                ("year", summary.peak.year.to_string().as_str()),
            ],
        ));
        if summary.decline_from_peak > 0.0 {
            out.push(text_with(
                "narrative.decline",
                lang,
                &[
                    ("year", latest_year.as_str()),
                    ("percent", format_percent(summary.decline_from_peak, lang).as_str()),
                ],
            ));
        }
    } else if summary.first.year != summary.latest.year {
        out.push(text_with(
            "narrative.change",
            lang,
            &[
                ("year", summary.first.year.to_string().as_str()),
                ("label", label),
                ("percent", format_percent(summary.change_since_first, lang).as_str()),
            ],
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summarize;
    use crate::catalog::PAGE_24;
    use crate::model::{Dataset, TotalPolicy, YearRecord};

    #[test]
    fn peak_and_decline() {
        let ds = Dataset::from_records(vec![
            YearRecord::new(2014).with("oil_gas", 80_000.0).with("electricity", 20_000.0),
            YearRecord::new(2022).with("oil_gas", 30_000.0).with("electricity", 30_000.0).with("other", 15_000.0),
        ]);
        let s = summarize(&PAGE_24, &ds, TotalPolicy::PreferProvided).unwrap();
        let b = bullets(&PAGE_24, &s, Language::En);
        assert_eq!(
            b,
            vec![
                "In 2022, the total was $75.0 billion.",
                "Oil and gas accounted for the largest share in 2022, at 40.0%.",
                "The peak for the total was $100.0 billion in 2014.",
                "The 2022 value is 25.0% below that peak.",
            ]
        );
    }

    #[test]
    fn rising_series_reports_change() {
        let ds = Dataset::from_records(vec![
            YearRecord::new(2020).with("oil_gas", 100.0),
            YearRecord::new(2022).with("oil_gas", 150.0),
        ]);
        let s = summarize(&PAGE_24, &ds, TotalPolicy::PreferProvided).unwrap();
        let b = bullets(&PAGE_24, &s, Language::Fr);
        assert_eq!(b.len(), 3);
        assert_eq!(b[2], "Depuis 2020, le total a varié de 50,0\u{a0}%.");
    }
}
