//! Static description of the site: sections, their routes, and the chart
//! pages they stack.

pub mod sources;

use factbook_protocol::ThemeToken;
use serde::Serialize;

use crate::i18n::{self, Language};
use crate::model::{Scale, Unit};

pub use sources::{VectorFilter, glob_match};

/// How a page draws its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    /// One bar per year, categories stacked.
    StackedBar,
    /// One cluster per year, a bar per category.
    GroupedBar,
    /// Latest year only, one slice per category.
    Pie,
}

impl ChartKind {
    /// Whether the categories are parts of a whole, so shares are meaningful.
    pub fn is_part_of_whole(self) -> bool {
        matches!(self, Self::StackedBar | Self::Pie)
    }
}

/// A chart category: a dataset field with a fixed colour and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub field: &'static str,
    pub label_key: &'static str,
    pub color: ThemeToken,
}

impl Category {
    pub fn label(&self, lang: Language) -> &'static str {
        i18n::text(self.label_key, lang)
    }
}

/// The value a page's narrative leads with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Headline {
    /// The record total (provided or summed).
    Total,
    /// A single category field.
    Field(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSpec {
    /// Page number in the printed factbook.
    pub number: u32,
    /// DOM anchor and URL fragment (`page-24`).
    pub anchor: &'static str,
    pub title_key: &'static str,
    /// Key of the language-dependent export file stem.
    pub file_key: &'static str,
    pub vector_prefix: &'static str,
    pub chart: ChartKind,
    pub categories: &'static [Category],
    pub total_field: Option<&'static str>,
    pub unit: Unit,
    pub headline: Headline,
}

impl PageSpec {
    pub fn title(&self, lang: Language) -> &'static str {
        i18n::text(self.title_key, lang)
    }

    pub fn file_stem(&self, lang: Language) -> &'static str {
        i18n::text(self.file_key, lang)
    }

    /// `Page24`, the name used by the data tooling.
    pub fn tooling_name(&self) -> String {
        format!("Page{}", self.number)
    }

    pub fn category_fields(&self) -> Vec<&'static str> {
        self.categories.iter().map(|c| c.field).collect()
    }

    pub fn category(&self, field: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.field == field)
    }

    /// Label for the headline value.
    pub fn headline_label(&self, lang: Language) -> &'static str {
        match self.headline {
            Headline::Total => i18n::text("narrative.total_label", lang),
            Headline::Field(field) => self
                .category(field)
                .map_or(field, |c| c.label(lang)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionSpec {
    /// `section-3`
    pub id: &'static str,
    /// `/section-3`
    pub route: &'static str,
    pub title_key: &'static str,
    pub pages: &'static [&'static PageSpec],
}

impl SectionSpec {
    pub fn title(&self, lang: Language) -> &'static str {
        i18n::text(self.title_key, lang)
    }

    pub fn first_anchor(&self) -> Option<&'static str> {
        self.pages.first().map(|p| p.anchor)
    }

    pub fn has_anchor(&self, anchor: &str) -> bool {
        self.pages.iter().any(|p| p.anchor == anchor)
    }
}

const fn cat(field: &'static str, label_key: &'static str, color: ThemeToken) -> Category {
    Category {
        field,
        label_key,
        color,
    }
}

use ThemeToken::{
    Series1 as S1, Series2 as S2, Series3 as S3, Series4 as S4, Series5 as S5, Series6 as S6,
    Series7 as S7, Series8 as S8, Series9 as S9, Series10 as S10, Series11 as S11,
};

const MILLIONS: Unit = Unit::Dollars(Scale::Millions);
const BILLIONS: Unit = Unit::Dollars(Scale::Billions);

pub static PAGE_2: PageSpec = PageSpec {
    number: 2,
    anchor: "page-2",
    title_key: "page.2.title",
    file_key: "page.2.file",
    vector_prefix: "energy_prod_",
    chart: ChartKind::GroupedBar,
    categories: &[
        cat("canada_pct", "cat.canada", S1),
        cat("united_states_pct", "cat.united_states", S2),
        cat("china_pct", "cat.china", S3),
        cat("india_pct", "cat.india", S4),
        cat("indonesia_pct", "cat.indonesia", S5),
        cat("australia_pct", "cat.australia", S6),
    ],
    total_field: None,
    unit: Unit::Percent,
    headline: Headline::Field("canada_pct"),
};

pub static PAGE_7: PageSpec = PageSpec {
    number: 7,
    anchor: "page-7",
    title_key: "page.7.title",
    file_key: "page.7.file",
    vector_prefix: "gdp_nominal_",
    chart: ChartKind::StackedBar,
    categories: &[
        cat("direct", "cat.direct", S1),
        cat("indirect", "cat.indirect", S2),
    ],
    total_field: Some("total"),
    unit: MILLIONS,
    headline: Headline::Total,
};

pub static PAGE_8: PageSpec = PageSpec {
    number: 8,
    anchor: "page-8",
    title_key: "page.8.title",
    file_key: "page.8.file",
    vector_prefix: "gdp_prov_",
    chart: ChartKind::Pie,
    categories: &[
        cat("ab", "cat.ab", S1),
        cat("sk", "cat.sk", S2),
        cat("bc", "cat.bc", S3),
        cat("nl", "cat.nl", S4),
        cat("on", "cat.on", S5),
        cat("qc", "cat.qc", S6),
        cat("mb", "cat.mb", S7),
        cat("nb", "cat.nb", S8),
        cat("ns", "cat.ns", S9),
        cat("pe", "cat.pe", S10),
    ],
    total_field: Some("national_total"),
    unit: MILLIONS,
    headline: Headline::Total,
};

pub static PAGE_11: PageSpec = PageSpec {
    number: 11,
    anchor: "page-11",
    title_key: "page.11.title",
    file_key: "page.11.file",
    vector_prefix: "econ_",
    chart: ChartKind::GroupedBar,
    categories: &[
        cat("gdp", "cat.gdp", S1),
        cat("employment_income", "cat.employment_income", S2),
        cat("investment_value", "cat.investment_value", S3),
    ],
    total_field: None,
    unit: MILLIONS,
    headline: Headline::Field("gdp"),
};

pub static PAGE_24: PageSpec = PageSpec {
    number: 24,
    anchor: "page-24",
    title_key: "page.24.title",
    file_key: "page.24.file",
    vector_prefix: "capex_",
    chart: ChartKind::StackedBar,
    categories: &[
        cat("oil_gas", "cat.oil_gas", S1),
        cat("electricity", "cat.electricity", S2),
        cat("other", "cat.other", S3),
    ],
    total_field: Some("total"),
    unit: MILLIONS,
    headline: Headline::Total,
};

pub static PAGE_25: PageSpec = PageSpec {
    number: 25,
    anchor: "page-25",
    title_key: "page.25.title",
    file_key: "page.25.file",
    vector_prefix: "infra_",
    chart: ChartKind::StackedBar,
    categories: &[
        cat("fuel_energy_pipelines", "cat.fuel_energy_pipelines", S1),
        cat("transport", "cat.transport", S2),
        cat("health_housing", "cat.health_housing", S3),
        cat("education", "cat.education", S4),
        cat("public_safety", "cat.public_safety", S5),
        cat("environmental", "cat.environmental", S6),
    ],
    total_field: Some("total"),
    unit: MILLIONS,
    headline: Headline::Total,
};

pub static PAGE_26: PageSpec = PageSpec {
    number: 26,
    anchor: "page-26",
    title_key: "page.26.title",
    file_key: "page.26.file",
    vector_prefix: "asset_",
    chart: ChartKind::StackedBar,
    categories: &[
        cat("transmission_distribution", "cat.transmission_distribution", S1),
        cat("pipelines", "cat.pipelines", S2),
        cat("nuclear", "cat.nuclear", S3),
        cat("other_electric", "cat.other_electric", S4),
        cat("hydraulic", "cat.hydraulic", S5),
        cat("wind_solar", "cat.wind_solar", S6),
        cat("steam_thermal", "cat.steam_thermal", S7),
    ],
    total_field: Some("total"),
    unit: MILLIONS,
    headline: Headline::Total,
};

pub static PAGE_27: PageSpec = PageSpec {
    number: 27,
    anchor: "page-27",
    title_key: "page.27.title",
    file_key: "page.27.file",
    vector_prefix: "intl_",
    chart: ChartKind::GroupedBar,
    categories: &[cat("fdi", "cat.fdi", S1), cat("cdia", "cat.cdia", S2)],
    total_field: None,
    unit: MILLIONS,
    headline: Headline::Field("cdia"),
};

pub static PAGE_28: PageSpec = PageSpec {
    number: 28,
    anchor: "page-28",
    title_key: "page.28.title",
    file_key: "page.28.file",
    vector_prefix: "projects_",
    chart: ChartKind::StackedBar,
    categories: &[
        cat("oil_gas_value", "cat.oil_gas", S1),
        cat("electricity_value", "cat.electricity", S2),
        cat("other_value", "cat.other", S3),
    ],
    total_field: Some("total_value"),
    unit: BILLIONS,
    headline: Headline::Total,
};

pub static PAGE_30: PageSpec = PageSpec {
    number: 30,
    anchor: "page-30",
    title_key: "page.30.title",
    file_key: "page.30.file",
    vector_prefix: "foreign_",
    chart: ChartKind::GroupedBar,
    categories: &[
        cat("oil_gas", "cat.oil_gas", S1),
        cat("utilities", "cat.utilities", S2),
        cat("all_non_financial", "cat.all_non_financial", S3),
    ],
    total_field: None,
    unit: Unit::Percent,
    headline: Headline::Field("oil_gas"),
};

pub static PAGE_33: PageSpec = PageSpec {
    number: 33,
    anchor: "page-33",
    title_key: "page.33.title",
    file_key: "page.33.file",
    vector_prefix: "cleantech_",
    chart: ChartKind::Pie,
    categories: &[
        cat("hydro_count", "cat.hydro", S1),
        cat("wind_count", "cat.wind", S2),
        cat("solar_count", "cat.solar", S3),
        cat("storage_count", "cat.storage", S4),
        cat("nuclear_count", "cat.nuclear", S5),
        cat("biomass_count", "cat.biomass", S6),
        cat("geothermal_count", "cat.geothermal", S7),
        cat("tidal_count", "cat.tidal", S8),
        cat("ccs_count", "cat.ccs", S9),
        cat("multiple_count", "cat.multiple", S10),
        cat("other_count", "cat.other", S11),
    ],
    total_field: Some("total_count"),
    unit: Unit::Count,
    headline: Headline::Total,
};

pub static PAGE_37: PageSpec = PageSpec {
    number: 37,
    anchor: "page-37",
    title_key: "page.37.title",
    file_key: "page.37.file",
    vector_prefix: "enviro_",
    chart: ChartKind::StackedBar,
    categories: &[
        cat("oil_gas_air", "cat.air", S1),
        cat("oil_gas_soil", "cat.soil", S2),
        cat("oil_gas_solid_waste", "cat.solid_waste", S3),
        cat("oil_gas_wastewater", "cat.wastewater", S4),
        cat("oil_gas_other", "cat.other", S5),
    ],
    total_field: Some("oil_gas_total"),
    unit: MILLIONS,
    headline: Headline::Total,
};

pub static PAGE_39: PageSpec = PageSpec {
    number: 39,
    anchor: "page-39",
    title_key: "page.39.title",
    file_key: "page.39.file",
    vector_prefix: "cea_",
    chart: ChartKind::Pie,
    categories: &[
        cat("north_america", "cat.north_america", S1),
        cat("europe", "cat.europe", S2),
        cat("latin_america", "cat.latin_america", S3),
        cat("asia", "cat.asia", S4),
        cat("oceania", "cat.oceania", S5),
        cat("africa", "cat.africa", S6),
    ],
    total_field: Some("abroad"),
    unit: BILLIONS,
    headline: Headline::Total,
};

pub static PAGES: &[&PageSpec] = &[
    &PAGE_2, &PAGE_7, &PAGE_8, &PAGE_11, &PAGE_24, &PAGE_25, &PAGE_26, &PAGE_27, &PAGE_28,
    &PAGE_30, &PAGE_33, &PAGE_37, &PAGE_39,
];

pub static SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        id: "section-1",
        route: "/section-1",
        title_key: "section.1",
        pages: &[&PAGE_2],
    },
    SectionSpec {
        id: "section-2",
        route: "/section-2",
        title_key: "section.2",
        pages: &[&PAGE_7, &PAGE_11],
    },
    SectionSpec {
        id: "section-3",
        route: "/section-3",
        title_key: "section.3",
        pages: &[&PAGE_24, &PAGE_25, &PAGE_26, &PAGE_27, &PAGE_28],
    },
    SectionSpec {
        id: "section-4",
        route: "/section-4",
        title_key: "section.4",
        pages: &[&PAGE_37, &PAGE_33],
    },
    SectionSpec {
        id: "section-5",
        route: "/section-5",
        title_key: "section.5",
        pages: &[&PAGE_30, &PAGE_39],
    },
    SectionSpec {
        id: "section-6",
        route: "/section-6",
        title_key: "section.6",
        pages: &[&PAGE_8],
    },
    SectionSpec {
        id: "section-test",
        route: "/section-test",
        title_key: "section.test",
        pages: &[&PAGE_24, &PAGE_25],
    },
];

/// Find a page by anchor (`page-24`), tooling name (`Page24`) or number.
pub fn find_page(name: &str) -> Option<&'static PageSpec> {
    let canonical = sources::canonical_page_name(name);
    PAGES.iter().copied().find(|p| {
        p.anchor == name
            || canonical.is_some_and(|c| c[4..] == p.number.to_string())
            || name.parse::<u32>().is_ok_and(|n| n == p.number)
    })
}

pub fn find_section(route: &str) -> Option<&'static SectionSpec> {
    let trimmed = route.trim_end_matches('/');
    SECTIONS
        .iter()
        .find(|s| s.route == trimmed || s.id == trimmed.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_page_has_translations() {
        for page in PAGES {
            for key in [page.title_key, page.file_key] {
                assert!(i18n::has_key(key), "missing {key}");
            }
            assert_eq!(page.title_key, format!("page.{}.title", page.number));
            for c in page.categories {
                assert!(i18n::has_key(c.label_key), "missing {}", c.label_key);
            }
        }
        for s in SECTIONS {
            assert!(i18n::has_key(s.title_key));
        }
    }

    #[test]
    fn category_colors_are_distinct_per_page() {
        for page in PAGES {
            let colors: std::collections::HashSet<_> =
                page.categories.iter().map(|c| c.color).collect();
            assert_eq!(colors.len(), page.categories.len(), "page {}", page.number);
        }
    }

    #[test]
    fn every_page_prefix_is_known_to_the_tooling() {
        for page in PAGES {
            let prefixes = sources::prefixes_for_page(&page.tooling_name()).unwrap();
            assert!(prefixes.contains(&page.vector_prefix));
        }
    }

    #[test]
    fn lookups() {
        assert_eq!(find_page("page-25").map(|p| p.number), Some(25));
        assert_eq!(find_page("Page39").map(|p| p.number), Some(39));
        assert_eq!(find_page("8").map(|p| p.number), Some(8));
        assert!(find_page("page-99").is_none());
        assert_eq!(find_section("/section-3/").map(|s| s.id), Some("section-3"));
        assert_eq!(find_section("section-test").map(|s| s.pages.len()), Some(2));
        assert_eq!(find_section("/section-3").and_then(SectionSpec::first_anchor), Some("page-24"));
    }
}
