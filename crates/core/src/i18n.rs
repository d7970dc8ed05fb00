//! English/French string lookup.
//!
//! Every user-visible string goes through [`text`]. Keys are grouped by
//! prefix: `app.`, `section.`, `page.<n>.`, `cat.`, `unit.`, `narrative.`,
//! `common.` and `export.`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Interface language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Fr];

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// Accepts `en`, `fr` and regional forms like `fr-CA`.
    pub fn from_code(code: &str) -> Option<Self> {
        let lower = code.trim().to_ascii_lowercase();
        match lower.split(['-', '_']).next() {
            Some("en") => Some(Self::En),
            Some("fr") => Some(Self::Fr),
            _ => None,
        }
    }

    /// The other language, for the header toggle.
    pub fn toggled(self) -> Self {
        match self {
            Self::En => Self::Fr,
            Self::Fr => Self::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// `(key, en, fr)`
static STRINGS: &[(&str, &str, &str)] = &[
    ("app.title", "Energy Factbook", "Cahier d'information sur l'énergie"),
    ("app.subtitle", "Canadian energy sector statistics", "Statistiques du secteur canadien de l'énergie"),
    // Sections
    ("section.1", "Canada in the world", "Le Canada dans le monde"),
    ("section.2", "Key indicators", "Indicateurs clés"),
    ("section.3", "Investment", "Investissement"),
    ("section.4", "Environmental protection and clean technology", "Protection de l'environnement et technologies propres"),
    ("section.5", "Ownership and energy assets", "Propriété et actifs énergétiques"),
    ("section.6", "Provincial economies", "Économies provinciales"),
    ("section.test", "Test section", "Section d'essai"),
    // Pages
    ("page.2.title", "Share of world energy production", "Part de la production mondiale d'énergie"),
    ("page.2.file", "world-energy-production", "production-mondiale-energie"),
    ("page.7.title", "Energy's contribution to nominal GDP", "Contribution de l'énergie au PIB nominal"),
    ("page.7.file", "nominal-gdp", "pib-nominal"),
    ("page.8.title", "Energy GDP by province", "PIB de l'énergie par province"),
    ("page.8.file", "provincial-gdp", "pib-provincial"),
    ("page.11.title", "Economic contributions of the energy sector", "Retombées économiques du secteur de l'énergie"),
    ("page.11.file", "economic-contributions", "retombees-economiques"),
    ("page.24.title", "Capital expenditures", "Dépenses en immobilisations"),
    ("page.24.file", "capital-expenditures", "depenses-immobilisations"),
    ("page.25.title", "Infrastructure stock", "Stock d'infrastructures"),
    ("page.25.file", "infrastructure", "infrastructures"),
    ("page.26.title", "Investment by asset type", "Investissement par type d'actif"),
    ("page.26.file", "investment-by-asset", "investissement-par-actif"),
    ("page.27.title", "International investment", "Investissement international"),
    ("page.27.file", "international-investment", "investissement-international"),
    ("page.28.title", "Major projects", "Grands projets"),
    ("page.28.file", "major-projects", "grands-projets"),
    ("page.30.title", "Foreign control of assets", "Contrôle étranger des actifs"),
    ("page.30.file", "foreign-control", "controle-etranger"),
    ("page.33.title", "Clean technology projects", "Projets de technologies propres"),
    ("page.33.file", "clean-technology", "technologies-propres"),
    ("page.37.title", "Environmental protection expenditures", "Dépenses de protection de l'environnement"),
    ("page.37.file", "environmental-protection", "protection-environnement"),
    ("page.39.title", "Canadian energy assets abroad", "Actifs énergétiques canadiens à l'étranger"),
    ("page.39.file", "canadian-energy-assets", "actifs-energetiques-canadiens"),
    // Categories
    ("cat.oil_gas", "Oil and gas", "Pétrole et gaz"),
    ("cat.electricity", "Electricity", "Électricité"),
    ("cat.other", "Other", "Autre"),
    ("cat.direct", "Direct", "Direct"),
    ("cat.indirect", "Indirect", "Indirect"),
    ("cat.gdp", "GDP", "PIB"),
    ("cat.employment_income", "Employment income", "Revenu d'emploi"),
    ("cat.investment_value", "Investment", "Investissement"),
    ("cat.fuel_energy_pipelines", "Fuel, energy and pipelines", "Carburants, énergie et pipelines"),
    ("cat.transport", "Transport", "Transport"),
    ("cat.health_housing", "Health and housing", "Santé et logement"),
    ("cat.education", "Education", "Éducation"),
    ("cat.public_safety", "Public safety and other", "Sécurité publique et autres"),
    ("cat.environmental", "Environmental protection", "Protection de l'environnement"),
    ("cat.transmission_distribution", "Transmission and distribution", "Transport et distribution"),
    ("cat.pipelines", "Pipelines", "Pipelines"),
    ("cat.nuclear", "Nuclear", "Nucléaire"),
    ("cat.other_electric", "Other electric", "Autre électricité"),
    ("cat.hydraulic", "Hydraulic", "Hydraulique"),
    ("cat.wind_solar", "Wind and solar", "Éolien et solaire"),
    ("cat.steam_thermal", "Steam and thermal", "Vapeur et thermique"),
    ("cat.fdi", "Foreign direct investment in Canada", "Investissement direct étranger au Canada"),
    ("cat.cdia", "Canadian direct investment abroad", "Investissement direct canadien à l'étranger"),
    ("cat.air", "Air pollution", "Pollution atmosphérique"),
    ("cat.soil", "Soil and groundwater", "Sol et eaux souterraines"),
    ("cat.solid_waste", "Solid waste", "Déchets solides"),
    ("cat.wastewater", "Wastewater", "Eaux usées"),
    ("cat.hydro", "Hydro", "Hydroélectricité"),
    ("cat.wind", "Wind", "Éolien"),
    ("cat.solar", "Solar", "Solaire"),
    ("cat.storage", "Energy storage", "Stockage d'énergie"),
    ("cat.biomass", "Biomass", "Biomasse"),
    ("cat.geothermal", "Geothermal", "Géothermie"),
    ("cat.tidal", "Tidal", "Marémotrice"),
    ("cat.ccs", "Carbon capture and storage", "Captage et stockage du carbone"),
    ("cat.multiple", "Multiple technologies", "Technologies multiples"),
    ("cat.utilities", "Utilities", "Services publics"),
    ("cat.all_non_financial", "All non-financial industries", "Toutes les industries non financières"),
    ("cat.north_america", "United States and Mexico", "États-Unis et Mexique"),
    ("cat.europe", "Europe", "Europe"),
    ("cat.asia", "Asia", "Asie"),
    ("cat.latin_america", "Latin America and Caribbean", "Amérique latine et Caraïbes"),
    ("cat.africa", "Africa", "Afrique"),
    ("cat.oceania", "Oceania", "Océanie"),
    ("cat.canada", "Canada", "Canada"),
    ("cat.united_states", "United States", "États-Unis"),
    ("cat.china", "China", "Chine"),
    ("cat.india", "India", "Inde"),
    ("cat.indonesia", "Indonesia", "Indonésie"),
    ("cat.australia", "Australia", "Australie"),
    ("cat.nl", "Newfoundland and Labrador", "Terre-Neuve-et-Labrador"),
    ("cat.pe", "Prince Edward Island", "Île-du-Prince-Édouard"),
    ("cat.ns", "Nova Scotia", "Nouvelle-Écosse"),
    ("cat.nb", "New Brunswick", "Nouveau-Brunswick"),
    ("cat.qc", "Quebec", "Québec"),
    ("cat.on", "Ontario", "Ontario"),
    ("cat.mb", "Manitoba", "Manitoba"),
    ("cat.sk", "Saskatchewan", "Saskatchewan"),
    ("cat.ab", "Alberta", "Alberta"),
    ("cat.bc", "British Columbia", "Colombie-Britannique"),
    // Units
    ("unit.dollars", "Dollars", "Dollars"),
    ("unit.thousands", "Thousands of dollars", "Milliers de dollars"),
    ("unit.millions", "Millions of dollars", "Millions de dollars"),
    ("unit.billions", "Billions of dollars", "Milliards de dollars"),
    ("unit.percent", "Percent", "Pourcentage"),
    ("unit.count", "Number", "Nombre"),
    ("unit.petajoules", "Petajoules", "Pétajoules"),
    // Narrative bullets
    ("narrative.total_label", "the total", "le total"),
    ("narrative.latest", "In {year}, {label} was {value}.", "En {year}, {label} s'établissait à {value}."),
    ("narrative.largest_share", "{category} accounted for the largest share in {year}, at {share}.", "{category} représentait la plus grande part en {year}, soit {share}."),
    ("narrative.peak", "The peak for {label} was {value} in {year}.", "Le sommet pour {label} était de {value} en {year}."),
    ("narrative.decline", "The {year} value is {percent} below that peak.", "La valeur de {year} est inférieure de {percent} à ce sommet."),
    ("narrative.change", "Since {year}, {label} has changed by {percent}.", "Depuis {year}, {label} a varié de {percent}."),
    // Common
    ("common.year", "Year", "Année"),
    ("common.total", "Total", "Total"),
    ("common.no_data", "No data", "Aucune donnée"),
    ("common.loading", "Loading data…", "Chargement des données…"),
    ("common.error", "The data could not be loaded", "Les données n'ont pas pu être chargées"),
    ("common.table_show", "Show data table", "Afficher le tableau de données"),
    ("common.table_hide", "Hide data table", "Masquer le tableau de données"),
    ("common.language_toggle", "Français", "English"),
    ("common.menu", "Menu", "Menu"),
    ("common.chart_hint", "Click a series to highlight it. Double-click to show only that series.", "Cliquez sur une série pour la mettre en évidence. Double-cliquez pour n'afficher que cette série."),
    // Export
    ("export.csv", "Download data (CSV)", "Télécharger les données (CSV)"),
    ("export.document", "Download table (Word)", "Télécharger le tableau (Word)"),
    ("export.image", "Download chart (image)", "Télécharger le graphique (image)"),
    ("export.missing_chart", "The chart is not available for export.", "Le graphique n'est pas disponible pour l'exportation."),
    ("export.missing_table", "The data table is not available for export.", "Le tableau de données n'est pas disponible pour l'exportation."),
    ("export.failed", "The file could not be created.", "Le fichier n'a pas pu être créé."),
    ("export.not_ready", "The data is still loading. Please try again.", "Les données sont en cours de chargement. Veuillez réessayer."),
    ("export.source", "Source: Statistics Canada", "Source : Statistique Canada"),
];

/// Look up `key` in `lang`.
///
/// An unknown key resolves to the key itself so the gap is visible on screen.
pub fn text(key: &str, lang: Language) -> &str {
    match STRINGS.iter().find(|(k, _, _)| *k == key) {
        Some((_, en, fr)) => match lang {
            Language::En => *en,
            Language::Fr => *fr,
        },
        None => {
            tracing::warn!(key, %lang, "missing translation");
            key
        }
    }
}

/// [`text`] with `{name}` placeholders substituted.
pub fn text_with(key: &str, lang: Language, args: &[(&str, &str)]) -> String {
    let mut out = text(key, lang).to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Whether `key` has an entry.
pub fn has_key(key: &str) -> bool {
    STRINGS.iter().any(|(k, _, _)| *k == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_languages() {
        assert_eq!(text("common.year", Language::En), "Year");
        assert_eq!(text("common.year", Language::Fr), "Année");
    }

    #[test]
    fn unknown_key_resolves_to_itself() {
        assert_eq!(text("nope.missing", Language::Fr), "nope.missing");
        assert!(!has_key("nope.missing"));
    }

    #[test]
    fn keys_are_unique_and_non_empty() {
        let mut seen = std::collections::HashSet::new();
        for (key, en, fr) in STRINGS {
            assert!(seen.insert(*key), "duplicate key {key}");
            assert!(!en.is_empty() && !fr.is_empty(), "empty text for {key}");
        }
    }

    #[test]
    fn substitutes_placeholders() {
        let s = text_with(
            "narrative.peak",
            Language::En,
            &[("label", "the total"), ("value", "$5.0 billion"), ("year", "2014")],
        );
        assert_eq!(s, "The peak for the total was $5.0 billion in 2014.");
    }

    #[test]
    fn parses_language_codes() {
        assert_eq!(Language::from_code("fr-CA"), Some(Language::Fr));
        assert_eq!("EN".parse::<Language>().ok(), Some(Language::En));
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::En.toggled(), Language::Fr);
    }
}
