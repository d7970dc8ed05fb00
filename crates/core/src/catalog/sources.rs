//! Which vectors belong to which data source and which page, for
//! selective merges of the published data files.

/// Data source → vector prefixes.
pub const SOURCE_PREFIXES: &[(&str, &[&str])] = &[
    ("canadian_energy_assets", &["cea_"]),
    ("capital_expenditures", &["capex_"]),
    ("clean_tech", &["cleantech_"]),
    ("economic_contributions", &["econ_"]),
    ("environmental_protection", &["enviro_"]),
    ("foreign_control", &["foreign_"]),
    ("infrastructure", &["infra_"]),
    ("international_investment", &["intl_"]),
    ("investment_by_asset", &["asset_"]),
    ("major_projects", &["projects_"]),
    ("nominal_gdp", &["gdp_nominal_"]),
    ("provincial_gdp", &["gdp_prov_"]),
    ("world_energy_production", &["energy_prod_"]),
];

/// Page → vector prefixes. Covers every published page, including the
/// text-only ones that have no chart of their own.
pub const PAGE_PREFIXES: &[(&str, &[&str])] = &[
    ("Page2", &["energy_prod_"]),
    ("Page3", &["energy_prod_"]),
    ("Page4", &["energy_prod_"]),
    ("Page7", &["gdp_nominal_"]),
    ("Page8", &["gdp_prov_"]),
    ("Page9", &["gdp_nominal_"]),
    ("Page10", &["gdp_nominal_"]),
    ("Page11", &["econ_"]),
    ("Page23", &["capex_"]),
    ("Page24", &["capex_"]),
    ("Page25", &["infra_"]),
    ("Page26", &["asset_"]),
    ("Page27", &["intl_"]),
    ("Page28", &["projects_"]),
    ("Page29", &["intl_"]),
    ("Page30", &["foreign_"]),
    ("Page31", &["intl_", "foreign_"]),
    ("Page32", &["enviro_"]),
    ("Page33", &["cleantech_"]),
    ("Page37", &["enviro_"]),
    ("Page39", &["cea_"]),
];

pub fn source_names() -> impl Iterator<Item = &'static str> {
    SOURCE_PREFIXES.iter().map(|(name, _)| *name)
}

pub fn page_names() -> impl Iterator<Item = &'static str> {
    PAGE_PREFIXES.iter().map(|(name, _)| *name)
}

pub fn prefixes_for_source(source: &str) -> Option<&'static [&'static str]> {
    SOURCE_PREFIXES
        .iter()
        .find(|(name, _)| *name == source)
        .map(|(_, p)| *p)
}

/// Normalize `page24`, `PAGE24`, `Page24` and `page-24` to `Page24`.
pub fn canonical_page_name(page: &str) -> Option<&'static str> {
    let digits: String = page
        .trim()
        .to_ascii_lowercase()
        .strip_prefix("page")?
        .trim_start_matches('-')
        .to_string();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    page_names().find(|name| name[4..] == digits)
}

pub fn prefixes_for_page(page: &str) -> Option<&'static [&'static str]> {
    let name = canonical_page_name(page)?;
    PAGE_PREFIXES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, p)| *p)
}

/// Shell-style wildcard match: `*` for any run, `?` for one character,
/// `[abc]`/`[a-z]`/`[!x]` for a set.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    glob_at(&p, &t)
}

fn glob_at(p: &[char], t: &[char]) -> bool {
    let (mut pi, mut ti) = (0, 0);
    // Backtrack point: pattern index after the last `*`, and the text index it matched up to.
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi + 1, ti));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                '[' => {
                    if let Some((matched, next)) = match_set(&p[pi..], t[ti])
                        && matched
                    {
                        pi += next;
                        ti += 1;
                        continue;
                    }
                }
                c if c == t[ti] => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                _ => {}
            }
        }
        match star {
            Some((sp, st)) => {
                pi = sp;
                ti = st + 1;
                star = Some((sp, st + 1));
            }
            None => return false,
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

/// Match `c` against a `[...]` set at the start of `p`. Returns whether it
/// matched and the set's length in pattern characters. An unterminated set
/// yields `None`.
fn match_set(p: &[char], c: char) -> Option<(bool, usize)> {
    let mut i = 1;
    let negate = matches!(p.get(i), Some('!') | Some('^'));
    if negate {
        i += 1;
    }
    let mut matched = false;
    let mut first = true;
    while i < p.len() {
        if p[i] == ']' && !first {
            return Some((matched != negate, i + 1));
        }
        first = false;
        if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            if p[i] <= c && c <= p[i + 2] {
                matched = true;
            }
            i += 3;
        } else {
            if p[i] == c {
                matched = true;
            }
            i += 1;
        }
    }
    None
}

/// Vector filter for a selective merge. All configured parts must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorFilter {
    prefixes: Vec<&'static str>,
    pattern: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("unknown source `{name}`; available: {available}")]
    UnknownSource { name: String, available: String },
    #[error("unknown page `{name}`; available: {available}")]
    UnknownPage { name: String, available: String },
}

impl VectorFilter {
    /// Match everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: &str) -> Result<Self, FilterError> {
        let prefixes = prefixes_for_source(source).ok_or_else(|| FilterError::UnknownSource {
            name: source.to_string(),
            available: source_names().collect::<Vec<_>>().join(", "),
        })?;
        self.prefixes = prefixes.to_vec();
        Ok(self)
    }

    pub fn page(mut self, page: &str) -> Result<Self, FilterError> {
        let prefixes = prefixes_for_page(page).ok_or_else(|| FilterError::UnknownPage {
            name: page.to_string(),
            available: page_names().collect::<Vec<_>>().join(", "),
        })?;
        self.prefixes = prefixes.to_vec();
        Ok(self)
    }

    #[must_use]
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    /// Whether any restriction is configured.
    pub fn is_filtered(&self) -> bool {
        !self.prefixes.is_empty() || self.pattern.is_some()
    }

    pub fn matches(&self, vector: &str) -> bool {
        if !self.prefixes.is_empty() && !self.prefixes.iter().any(|p| vector.starts_with(p)) {
            return false;
        }
        match &self.pattern {
            Some(pattern) => glob_match(pattern, vector),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_aliases() {
        assert_eq!(canonical_page_name("page24"), Some("Page24"));
        assert_eq!(canonical_page_name("Page-24"), Some("Page24"));
        assert_eq!(canonical_page_name("page99"), None);
        assert_eq!(prefixes_for_page("page31"), Some(&["intl_", "foreign_"][..]));
    }

    #[test]
    fn glob_patterns() {
        assert!(glob_match("capex_*", "capex_oil_gas"));
        assert!(glob_match("*_total", "infra_total"));
        assert!(!glob_match("*_total", "infra_total_billions"));
        assert!(glob_match("*gdp*", "gdp_prov_ab"));
        assert!(glob_match("capex_total", "capex_total"));
        assert!(glob_match("gdp_prov_?b", "gdp_prov_ab"));
        assert!(glob_match("gdp_prov_[an]b", "gdp_prov_nb"));
        assert!(!glob_match("gdp_prov_[!an]b", "gdp_prov_nb"));
        assert!(glob_match("*", ""));
        assert!(!glob_match("a", ""));
    }

    #[test]
    fn filter_combines_prefix_and_pattern() {
        let f = VectorFilter::all().source("capital_expenditures").unwrap().pattern("*_total");
        assert!(f.matches("capex_total"));
        assert!(!f.matches("capex_oil_gas"));
        assert!(!f.matches("infra_total"));
        assert!(!VectorFilter::all().is_filtered());
    }

    #[test]
    fn unknown_source_lists_choices() {
        let err = VectorFilter::all().source("nope").unwrap_err();
        assert!(err.to_string().contains("capital_expenditures"));
    }
}
