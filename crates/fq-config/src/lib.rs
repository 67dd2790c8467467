//! Configuration system for fq.
//!
//! fq uses TOML configuration files named `.fq.toml`. Configuration is resolved by walking up
//! the directory tree from the current working directory, collecting any `.fq.toml` files found,
//! then loading `~/.fq.toml` as the global config with lowest precedence.
//!
//! A configuration names the corpus to search and maps two-letter field codes to the record
//! keys they search:
//!
//! ```toml
//! [corpus]
//! path = "./papers.jsonl"
//!
//! [fields.ti]
//! keys = "title"
//!
//! [fields.ts]
//! keys = ["title", "abstract", "keywords"]
//! ```

#![warn(missing_docs)]

mod discovery;
mod display;
mod error;
mod merge;
mod parse;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use display::{format_origin, format_path_for_display};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawCorpus, RawField, RawLogSettings, RawSearchSettings, parse_config_file,
    parse_config_str,
};
pub use resolve::resolve_path;
use serde::{Deserialize, Serialize};
pub use templates::{global_template, local_template};
pub use validate::{ConfigWarning, is_valid_field_code};
use validate::validate_config;

/// Field code whose values name the topics a query is about.
pub const TOPIC_FIELD: &str = "ts";

/// Built-in field codes: code, record keys, description.
const DEFAULT_FIELDS: &[(&str, &[&str], &str)] = &[
    ("ab", &["abstract"], "Abstract"),
    ("au", &["authors"], "Authors"),
    ("kw", &["keywords"], "Author keywords"),
    ("py", &["year"], "Publication year"),
    ("so", &["source"], "Source title"),
    ("ti", &["title"], "Title"),
    (
        TOPIC_FIELD,
        &["title", "abstract", "keywords"],
        "Topic: title, abstract and keywords",
    ),
];

/// Top-level merged configuration for fq.
///
/// This represents the fully resolved configuration after merging all discovered `.fq.toml`
/// files according to precedence rules.
#[derive(Debug, Clone)]
pub struct Config {
    /// Resolved corpus path, if one is configured.
    pub corpus: Option<PathBuf>,
    /// Field definitions by code. Built-in codes are present unless overridden.
    pub fields: BTreeMap<String, Field>,
    /// Search-related settings.
    pub search: SearchSettings,
    /// Logging settings.
    pub log: LogSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
    /// Config files that contributed, highest precedence first.
    pub files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus: None,
            fields: default_fields(),
            search: SearchSettings::default(),
            log: LogSettings::default(),
            config_root: None,
            files: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.fq.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Returns the record keys of every field that has at least one.
    pub fn field_map(&self) -> BTreeMap<String, Vec<String>> {
        self.fields
            .iter()
            .filter(|(_, field)| !field.keys.is_empty())
            .map(|(code, field)| (code.clone(), field.keys.clone()))
            .collect()
    }

    /// Serializes the effective configuration to TOML format.
    ///
    /// The output has the same shape as a `.fq.toml` file, with the corpus path resolved.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableConfig {
            corpus: SerializableCorpus {
                path: self.corpus.as_ref().map(|p| p.display().to_string()),
            },
            search: &self.search,
            log: &self.log,
            fields: self
                .fields
                .iter()
                .map(|(code, field)| {
                    (
                        code.as_str(),
                        SerializableField {
                            keys: &field.keys,
                            description: field.description.as_deref(),
                        },
                    )
                })
                .collect(),
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Returns the built-in field definitions.
pub fn default_fields() -> BTreeMap<String, Field> {
    DEFAULT_FIELDS
        .iter()
        .map(|(code, keys, description)| {
            (
                (*code).to_string(),
                Field {
                    keys: keys.iter().map(|k| (*k).to_string()).collect(),
                    description: Some((*description).to_string()),
                    origin: None,
                },
            )
        })
        .collect()
}

/// A field code definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Record keys whose text the field searches.
    pub keys: Vec<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Config file that defined the field; `None` for built-in fields.
    pub origin: Option<PathBuf>,
}

/// Search-related settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum number of document ids to print (0 = all).
    pub limit: usize,
    /// Evaluate operator operands in parallel.
    pub parallel: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: 100,
            parallel: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level filter used when no `-v` flag is given.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: String::from("warn"),
        }
    }
}

/// Internal struct for TOML serialization of the effective configuration.
#[derive(Serialize)]
struct SerializableConfig<'a> {
    /// Corpus section.
    corpus: SerializableCorpus,
    /// Search settings.
    search: &'a SearchSettings,
    /// Logging settings.
    log: &'a LogSettings,
    /// Field definitions, sorted by code.
    fields: BTreeMap<&'a str, SerializableField<'a>>,
}

/// Corpus section for serialization.
#[derive(Serialize)]
struct SerializableCorpus {
    /// Resolved corpus path.
    path: Option<String>,
}

/// Field definition for serialization.
#[derive(Serialize)]
struct SerializableField<'a> {
    /// Record keys.
    keys: &'a [String],
    /// Description.
    description: Option<&'a str>,
}
