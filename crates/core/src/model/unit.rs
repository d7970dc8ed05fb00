use serde::{Deserialize, Serialize};

/// Multiplier applied to a dollar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Units,
    Thousands,
    Millions,
    Billions,
}

impl Scale {
    pub fn factor(self) -> f64 {
        match self {
            Self::Units => 1.0,
            Self::Thousands => 1e3,
            Self::Millions => 1e6,
            Self::Billions => 1e9,
        }
    }
}

/// What a series measures, driving value formatting and axis captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "scale")]
pub enum Unit {
    Dollars(Scale),
    Percent,
    Count,
    Petajoules,
}

impl Unit {
    /// Map a `metadata.csv` row's `uom` and `scalar_factor` columns to a unit.
    ///
    /// The scalar factor wins when it names a scale; `units` falls back to
    /// the unit-of-measure text since counts and percents both use it.
    pub fn from_metadata(uom: &str, scalar_factor: &str) -> Self {
        let uom_lower = uom.to_ascii_lowercase();
        match scalar_factor.trim().to_ascii_lowercase().as_str() {
            "percent" => Self::Percent,
            "petajoules" => Self::Petajoules,
            "billions" => Self::Dollars(Scale::Billions),
            "millions" => Self::Dollars(Scale::Millions),
            "thousands" if uom_lower.contains("dollar") => Self::Dollars(Scale::Thousands),
            _ if uom_lower.contains("percent") || uom_lower.trim() == "%" => Self::Percent,
            _ if uom_lower.contains("dollar") => Self::Dollars(Scale::Units),
            _ if uom_lower == "pj" => Self::Petajoules,
            _ => Self::Count,
        }
    }

    /// Translation key for the unit caption.
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Dollars(Scale::Units) => "unit.dollars",
            Self::Dollars(Scale::Thousands) => "unit.thousands",
            Self::Dollars(Scale::Millions) => "unit.millions",
            Self::Dollars(Scale::Billions) => "unit.billions",
            Self::Percent => "unit.percent",
            Self::Count => "unit.count",
            Self::Petajoules => "unit.petajoules",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_metadata_columns() {
        assert_eq!(
            Unit::from_metadata("Millions of dollars", "millions"),
            Unit::Dollars(Scale::Millions)
        );
        assert_eq!(Unit::from_metadata("%", "percent"), Unit::Percent);
        assert_eq!(Unit::from_metadata("Percent", "units"), Unit::Percent);
        assert_eq!(Unit::from_metadata("Number of projects", "units"), Unit::Count);
        assert_eq!(Unit::from_metadata("Jobs (thousands)", "thousands"), Unit::Count);
        assert_eq!(Unit::from_metadata("PJ", "petajoules"), Unit::Petajoules);
    }
}
