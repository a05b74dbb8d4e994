//! Configuration schema (rulebook.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Build metadata rendered into the aggregated document header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
    /// Document title
    #[serde(default = "default_title")]
    pub title: String,

    /// Document version string
    #[serde(default = "default_version")]
    pub version: String,

    /// Publishing organization
    #[serde(default = "default_organization")]
    pub organization: String,

    /// Publication date; rendered verbatim, never replaced with "now"
    #[serde(default)]
    pub date: String,

    /// Abstract paragraph rendered below the header
    #[serde(default = "default_abstract")]
    pub abstract_text: String,

    /// Top-level references appended as the final document section
    #[serde(default)]
    pub references: Vec<String>,
}

fn default_title() -> String {
    "PostgreSQL Performance Best Practices".to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_organization() -> String {
    "Rulebook Maintainers".to_string()
}

fn default_abstract() -> String {
    "A curated collection of PostgreSQL performance-optimization guidelines, \
     organized by impact area, with incorrect and correct code examples for \
     each rule."
        .to_string()
}

impl Default for BuildMetadata {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            organization: default_organization(),
            date: String::new(),
            abstract_text: default_abstract(),
            references: Vec::new(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one markdown file per rule
    #[serde(default = "default_rules_dir")]
    pub rules_dir: PathBuf,

    /// Path the aggregated document is written to
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Path the extracted test-case list is written to
    #[serde(default = "default_test_cases")]
    pub test_cases: PathBuf,

    /// Optional section-definition TOML (defaults apply when absent)
    #[serde(default)]
    pub sections_file: Option<PathBuf>,

    /// Document header metadata
    #[serde(default)]
    pub metadata: BuildMetadata,
}

fn default_rules_dir() -> PathBuf {
    PathBuf::from("rules")
}

fn default_output() -> PathBuf {
    PathBuf::from("BEST_PRACTICES.md")
}

fn default_test_cases() -> PathBuf {
    PathBuf::from("test-cases.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_dir: default_rules_dir(),
            output: default_output(),
            test_cases: default_test_cases(),
            sections_file: None,
            metadata: BuildMetadata::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}
