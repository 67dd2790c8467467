//! Configuration file parsing.
//!
//! Parses individual `.fq.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Corpus section.
    pub corpus: Option<RawCorpus>,
    /// Field definitions: code -> field config.
    pub fields: Option<BTreeMap<String, RawField>>,
    /// Search settings section.
    pub search: Option<RawSearchSettings>,
    /// Logging section.
    pub log: Option<RawLogSettings>,
}

/// Raw corpus section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCorpus {
    /// Path to a corpus file or directory, relative to the config file.
    pub path: Option<String>,
}

/// Raw field definition.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawField {
    /// Record key(s) searched by the field. Accepts a string or an array of strings.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub keys: Option<Vec<String>>,
    /// Human-readable description.
    pub description: Option<String>,
}

/// Raw search settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Maximum number of document ids to print (0 = all).
    pub limit: Option<usize>,
    /// Evaluate operator operands in parallel.
    pub parallel: Option<bool>,
}

/// Raw logging settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLogSettings {
    /// Default log level filter.
    pub level: Option<String>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context (tests only).
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
