//! Runtime configuration: where the data files live, which language to start
//! in, what to log, and which sections and sources are enabled.
//!
//! Read from a JSON file with every field optional, then overridden by
//! `FACTBOOK_DATA_DIR`, `FACTBOOK_LANG` and `FACTBOOK_LOG`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{SECTIONS, SectionSpec, sources};
use crate::i18n::Language;
use crate::model::TotalPolicy;

pub const ENV_DATA_DIR: &str = "FACTBOOK_DATA_DIR";
pub const ENV_LANG: &str = "FACTBOOK_LANG";
pub const ENV_LOG: &str = "FACTBOOK_LOG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown language `{0}` in {1}")]
    Language(String, &'static str),
    #[error("unknown section `{0}`")]
    UnknownSection(String),
    #[error("unknown source `{0}`")]
    UnknownSource(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactbookConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub data_file: String,
    pub metadata_file: String,
    pub default_language: Language,
    /// `tracing-subscriber` filter directive, e.g. `info` or `factbook_core=debug`.
    pub log_level: String,
    pub total_policy: TotalPolicy,
    /// Section ids to show. Empty means all.
    pub sections: Vec<String>,
    /// Data sources the merge tool accepts. Empty means all.
    pub sources: Vec<String>,
}

impl Default for FactbookConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            data_file: "data.csv".into(),
            metadata_file: "metadata.csv".into(),
            default_language: Language::En,
            log_level: "info".into(),
            total_policy: TotalPolicy::PreferProvided,
            sections: Vec::new(),
            sources: Vec::new(),
        }
    }
}

impl FactbookConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` if given, else defaults; then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_json(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(lang) = lookup(ENV_LANG).filter(|v| !v.is_empty()) {
            self.default_language =
                Language::from_code(&lang).ok_or(ConfigError::Language(lang, ENV_LANG))?;
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bad) = self.sections.iter().find(|id| !SECTIONS.iter().any(|s| s.id == id.as_str())) {
            return Err(ConfigError::UnknownSection(bad.clone()));
        }
        if let Some(bad) = self.sources.iter().find(|s| sources::prefixes_for_source(s).is_none()) {
            return Err(ConfigError::UnknownSource(bad.clone()));
        }
        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        self.data_dir.join(&self.data_file)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }

    pub fn enabled_sections(&self) -> Vec<&'static SectionSpec> {
        SECTIONS
            .iter()
            .filter(|s| self.sections.is_empty() || self.sections.iter().any(|id| id == s.id))
            .collect()
    }

    pub fn enabled_sources(&self) -> Vec<&'static str> {
        sources::source_names()
            .filter(|name| self.sources.is_empty() || self.sources.iter().any(|s| s == name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_object_gives_defaults() {
        let config = FactbookConfig::from_json("{}").unwrap();
        assert_eq!(config, FactbookConfig::default());
        assert_eq!(config.data_path(), PathBuf::from("data/data.csv"));
        assert_eq!(config.enabled_sections().len(), SECTIONS.len());
    }

    #[test]
    fn partial_file() {
        let config = FactbookConfig::from_json(
            r#"{ "default_language": "fr", "sections": ["section-3"], "total_policy": "recompute" }"#,
        )
        .unwrap();
        assert_eq!(config.default_language, Language::Fr);
        assert_eq!(config.total_policy, TotalPolicy::Recompute);
        assert_eq!(config.enabled_sections().len(), 1);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!(
            FactbookConfig::from_json(r#"{ "sections": ["section-9"] }"#),
            Err(ConfigError::UnknownSection(_))
        ));
        assert!(matches!(
            FactbookConfig::from_json(r#"{ "sources": ["nowhere"] }"#),
            Err(ConfigError::UnknownSource(_))
        ));
        assert!(matches!(FactbookConfig::from_json(r#"{ "colour": 1 }"#), Err(ConfigError::Json(_))));
    }

    #[test]
    fn environment_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DATA_DIR, "/srv/factbook"),
            (ENV_LANG, "fr-CA"),
            (ENV_LOG, "debug"),
        ]);
        let mut config = FactbookConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/factbook"));
        assert_eq!(config.default_language, Language::Fr);
        assert_eq!(config.log_level, "debug");

        let mut config = FactbookConfig::default();
        let err = config.apply_env(|k| (k == ENV_LANG).then(|| "de".to_string()));
        assert!(matches!(err, Err(ConfigError::Language(..))));
    }
}
