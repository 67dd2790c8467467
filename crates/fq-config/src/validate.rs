//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use crate::Config;

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A field code is not two lowercase ASCII letters and can never appear in a query.
    InvalidFieldCode {
        /// The offending code.
        code: String,
    },
    /// A field is defined without any record keys and is ignored.
    FieldWithoutKeys {
        /// Code of the field.
        code: String,
    },
    /// No corpus path is configured.
    CorpusNotConfigured,
    /// The configured corpus path does not exist.
    CorpusPathMissing {
        /// Path that doesn't exist.
        path: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFieldCode { code } => {
                write!(
                    f,
                    "field code '{code}' is not two lowercase letters and cannot be queried"
                )
            }
            Self::FieldWithoutKeys { code } => {
                write!(f, "field '{code}' has no keys and will be ignored")
            }
            Self::CorpusNotConfigured => write!(f, "no corpus path is configured"),
            Self::CorpusPathMissing { path } => {
                write!(f, "corpus path does not exist: {path}")
            }
        }
    }
}

/// Returns true if `code` can appear as a field code in a query.
pub fn is_valid_field_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase())
}

/// Validates a configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    for (code, field) in &config.fields {
        if !is_valid_field_code(code) {
            warnings.push(ConfigWarning::InvalidFieldCode { code: code.clone() });
        }
        if field.keys.is_empty() {
            warnings.push(ConfigWarning::FieldWithoutKeys { code: code.clone() });
        }
    }

    match &config.corpus {
        None => warnings.push(ConfigWarning::CorpusNotConfigured),
        Some(path) if !path.exists() => warnings.push(ConfigWarning::CorpusPathMissing {
            path: path.display().to_string(),
        }),
        Some(_) => {}
    }

    warnings
}
