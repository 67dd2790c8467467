//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and resolving paths.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    Config, ConfigError, Field, LogSettings, SearchSettings, default_fields,
    parse::{RawConfig, RawLogSettings, RawSearchSettings},
    resolve::resolve_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory containing the config file.
    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins (highest precedence)
/// - Corpus path: first definition wins, resolved against its own file's directory
/// - Fields: merged by code, first definition wins completely; built-in codes fill the rest
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    Ok(Config {
        corpus: merge_corpus(configs)?,
        fields: merge_fields(configs),
        search: merge_search_settings(configs),
        log: merge_log_settings(configs),
        config_root: configs.first().map(|c| c.dir().to_path_buf()),
        files: configs.iter().map(|c| c.path.clone()).collect(),
    })
}

/// Resolves the highest-precedence corpus path.
fn merge_corpus(configs: &[ParsedConfig]) -> Result<Option<PathBuf>, ConfigError> {
    for parsed in configs {
        if let Some(corpus) = &parsed.config.corpus
            && let Some(path) = &corpus.path
        {
            return resolve_path(path, parsed.dir()).map(Some);
        }
    }
    Ok(None)
}

/// Merges field definitions by code.
fn merge_fields(configs: &[ParsedConfig]) -> BTreeMap<String, Field> {
    let mut fields = default_fields();
    let mut defined = Vec::new();

    // Iterate in precedence order (highest first) - first definition wins
    for parsed in configs {
        let Some(raw_fields) = &parsed.config.fields else {
            continue;
        };
        for (code, raw) in raw_fields {
            if defined.contains(code) {
                continue;
            }
            defined.push(code.clone());
            fields.insert(
                code.clone(),
                Field {
                    keys: raw.keys.clone().unwrap_or_default(),
                    description: raw.description.clone(),
                    origin: Some(parsed.path.clone()),
                },
            );
        }
    }

    fields
}

/// Merges search settings.
fn merge_search_settings(configs: &[ParsedConfig]) -> SearchSettings {
    let mut result = SearchSettings::default();

    // Iterate in reverse (lowest precedence first) so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref search) = parsed.config.search {
            apply_raw_search(&mut result, search);
        }
    }

    result
}

/// Applies raw search settings to result.
fn apply_raw_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(v) = raw.limit {
        result.limit = v;
    }
    if let Some(v) = raw.parallel {
        result.parallel = v;
    }
}

/// Merges logging settings.
fn merge_log_settings(configs: &[ParsedConfig]) -> LogSettings {
    let mut result = LogSettings::default();
    for parsed in configs.iter().rev() {
        if let Some(RawLogSettings { level: Some(level) }) = &parsed.config.log {
            result.level.clone_from(level);
        }
    }
    result
}
