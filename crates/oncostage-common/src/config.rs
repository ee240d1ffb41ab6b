//! Configuration loading for oncostage.
//! Reads oncostage.toml from the current directory or the path in ONCOSTAGE_CONFIG.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{OncostageError, Result};

pub const CONFIG_ENV_VAR: &str = "ONCOSTAGE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "oncostage.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub resources: ResourceConfig,
    #[serde(default)]
    pub histology: HistologyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default = "default_notes_path")]
    pub notes_path: PathBuf,
    #[serde(default = "default_histology_path")]
    pub histology_path: PathBuf,
}

fn default_notes_path()     -> PathBuf { PathBuf::from("resources/doctor_notes.txt") }
fn default_histology_path() -> PathBuf { PathBuf::from("resources/histologies.csv") }

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            notes_path: default_notes_path(),
            histology_path: default_histology_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistologyConfig {
    /// Phrases with more words than this are dropped from the vocabulary.
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    /// Minimum similarity ratio for a fuzzy histology match.
    #[serde(default = "default_similarity_cutoff")]
    pub similarity_cutoff: f64,
}

fn default_max_words()         -> usize { 3 }
fn default_similarity_cutoff() -> f64   { 0.6 }

impl Default for HistologyConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            similarity_cutoff: default_similarity_cutoff(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration. Call [`Config::validate`] once overrides are applied.
    ///
    /// An explicit path (argument or ONCOSTAGE_CONFIG) must exist. Without one,
    /// oncostage.toml in the current directory is used if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        match explicit {
            Some(path) => Self::from_toml(&path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_toml(path)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OncostageError::unavailable(path, e))?;
        toml::from_str(&content)
            .map_err(|e| OncostageError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OncostageError::unavailable(path, e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| OncostageError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        let cutoff = self.histology.similarity_cutoff;
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(OncostageError::Config(format!(
                "histology.similarity_cutoff must be in [0, 1], got {}",
                cutoff
            )));
        }
        if self.histology.max_words == 0 {
            return Err(OncostageError::Config(
                "histology.max_words must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.histology.max_words, 3);
        assert_eq!(config.histology.similarity_cutoff, 0.6);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [histology]
            max_words = 4

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.histology.max_words, 4);
        assert_eq!(config.histology.similarity_cutoff, 0.6);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.resources, ResourceConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_cutoff() {
        let mut config = Config::default();
        config.histology.similarity_cutoff = 1.5;
        assert!(matches!(config.validate(), Err(OncostageError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_max_words() {
        let mut config = Config::default();
        config.histology.max_words = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/oncostage.toml"))).unwrap_err();
        assert!(matches!(err, OncostageError::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resources]\nnotes_path = \"notes.txt\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.resources.notes_path, PathBuf::from("notes.txt"));
        assert_eq!(config.resources.histology_path, default_histology_path());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "histology:\n  max_words: 2\noutput:\n  format: json").unwrap();

        let config = Config::from_yaml(file.path()).unwrap();
        assert_eq!(config.histology.max_words, 2);
        assert_eq!(config.histology.similarity_cutoff, 0.6);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.resources, ResourceConfig::default());
    }

    #[test]
    fn test_from_yaml_missing_file() {
        let err = Config::from_yaml(Path::new("/nonexistent/oncostage.yaml")).unwrap_err();
        assert!(matches!(err, OncostageError::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
