//! Locale-aware number formatting.
//!
//! English groups thousands with `,` and uses `.` for decimals. French
//! groups with a no-break space, uses `,` for decimals and puts a
//! no-break space before `%`.

use crate::i18n::Language;
use crate::model::{Scale, Unit};

const NBSP: char = '\u{a0}';

/// Format `value` with `decimals` fraction digits and locale grouping.
pub fn format_number(value: f64, decimals: usize, lang: Language) -> String {
    if !value.is_finite() {
        return "–".to_string();
    }
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let (group_sep, decimal_sep) = match lang {
        Language::En => (',', '.'),
        Language::Fr => (NBSP, ','),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut out = String::with_capacity(raw.len() + digits.len() / 3 + 1);
    // "-0.0" reads oddly, so only mark negatives that survive rounding.
    if value < 0.0 && raw.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(group_sep);
        }
        out.push(*c);
    }
    if let Some(frac) = frac_part {
        out.push(decimal_sep);
        out.push_str(frac);
    }
    out
}

/// `45.2%` / `45,2 %`
pub fn format_percent(value: f64, lang: Language) -> String {
    let n = format_number(value, 1, lang);
    match lang {
        Language::En => format!("{n}%"),
        Language::Fr => format!("{n}{NBSP}%"),
    }
}

/// Format a value in `unit` for tooltips, labels and narrative text.
///
/// Millions of dollars at or above one thousand are shown in billions.
pub fn format_value(value: f64, unit: Unit, lang: Language) -> String {
    match unit {
        Unit::Dollars(Scale::Millions) if value.abs() >= 1_000.0 => {
            format_value(value / 1_000.0, Unit::Dollars(Scale::Billions), lang)
        }
        Unit::Dollars(scale) => format_dollars(value, scale, lang),
        Unit::Percent => format_percent(value, lang),
        Unit::Count => format_number(value, 0, lang),
        Unit::Petajoules => format!("{}{NBSP}PJ", format_number(value, 0, lang)),
    }
}

fn format_dollars(value: f64, scale: Scale, lang: Language) -> String {
    let decimals = match scale {
        Scale::Billions => 1,
        _ => 0,
    };
    let n = format_number(value, decimals, lang);
    match (lang, scale) {
        (Language::En, Scale::Units) => format!("${n}"),
        (Language::En, Scale::Thousands) => format!("${n} thousand"),
        (Language::En, Scale::Millions) => format!("${n} million"),
        (Language::En, Scale::Billions) => format!("${n} billion"),
        (Language::Fr, Scale::Units) => format!("{n}{NBSP}$"),
        (Language::Fr, Scale::Thousands) => format!("{n}{NBSP}milliers de dollars"),
        (Language::Fr, Scale::Millions) => format!("{n}{NBSP}millions de dollars"),
        (Language::Fr, Scale::Billions) => format!("{n}{NBSP}milliards de dollars"),
    }
}

/// Plain number for table cells: locale grouping, unit-appropriate precision.
pub fn format_cell(value: f64, unit: Unit, lang: Language) -> String {
    let decimals = match unit {
        Unit::Count | Unit::Petajoules => 0,
        _ => 1,
    };
    format_number(value, decimals, lang)
}

/// Machine-readable number for CSV: no grouping, `.` decimal, no trailing zeros.
pub fn format_raw(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
