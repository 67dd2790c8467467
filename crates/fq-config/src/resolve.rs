//! Path resolution for configured paths.
//!
//! Resolves relative and tilde-prefixed paths to absolute paths.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Resolves a configured path to an absolute path.
///
/// Handles three cases:
/// - Tilde paths (`~/corpus`) - expanded to home directory
/// - Relative paths (`./corpus`, `../shared`) - resolved relative to `config_dir`
/// - Absolute paths - returned as-is
///
/// Existing paths are canonicalized. Missing paths are returned unresolved so that
/// validation can report them.
pub fn resolve_path(path: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(&expanded)
    };

    if !absolute.exists() {
        return Ok(absolute);
    }

    absolute
        .canonicalize()
        .map_err(|source| ConfigError::PathResolution {
            path: absolute.clone(),
            source,
        })
}

/// Expands a tilde prefix to the home directory.
///
/// - `~` alone becomes the home directory
/// - `~/foo` becomes home directory joined with `foo`
/// - Paths not starting with `~` are returned unchanged
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }

    if let Some(rest) = path.strip_prefix("~/") {
        let home = home_dir()?;
        return Ok(home.join(rest));
    }

    Ok(PathBuf::from(path))
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    #[test]
    fn test_resolve_relative_file() {
        let test_dir = TestDir::new();
        let corpus = test_dir.create_file("data/corpus.json", "[]");

        let resolved = resolve_path("./data/corpus.json", test_dir.path()).unwrap();
        assert_eq!(resolved, corpus.canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_parent_relative_dir() {
        let test_dir = TestDir::new();
        let shared = test_dir.create_dir("shared/corpus");
        let project = test_dir.create_dir("project");

        let resolved = resolve_path("../shared/corpus", &project).unwrap();
        assert_eq!(resolved, shared.canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_absolute_path() {
        let test_dir = TestDir::new();
        let corpus = test_dir.create_dir("corpus").canonicalize().unwrap();
        let other = test_dir.create_dir("elsewhere");

        let resolved = resolve_path(corpus.to_str().unwrap(), &other).unwrap();
        assert_eq!(resolved, corpus);
    }

    #[test]
    fn test_resolve_missing_path_is_kept() {
        let test_dir = TestDir::new();
        let resolved = resolve_path("missing.jsonl", test_dir.path()).unwrap();
        assert_eq!(resolved, test_dir.path().join("missing.jsonl"));
        assert!(!resolved.exists());
    }

    #[test]
    fn test_expand_tilde() {
        let Ok(home) = home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~").unwrap(), home);
        assert_eq!(expand_tilde("~/corpus").unwrap(), home.join("corpus"));
        assert_eq!(
            expand_tilde("./corpus").unwrap(),
            PathBuf::from("./corpus")
        );
        assert_eq!(expand_tilde("~user").unwrap(), PathBuf::from("~user"));
    }
}
