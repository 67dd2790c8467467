//! Integration tests for fq-config.
//!
//! Tests the full configuration loading pipeline: discovery -> parse -> resolve -> merge.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use fq_config::{Config, ConfigError, ConfigWarning, global_template, local_template};

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory and returns its path.
    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_load_isolated_root_config() {
    let env = TestEnv::new();
    let corpus = env.create_file("papers.jsonl", "");
    env.create_file(
        ".fq.toml",
        r#"
root = true

[corpus]
path = "papers.jsonl"

[search]
limit = 10
"#,
    );

    let config = Config::load(env.path()).unwrap();

    assert_eq!(config.corpus, Some(corpus.canonicalize().unwrap()));
    assert_eq!(config.search.limit, 10);
    assert!(!config.search.parallel);
    assert_eq!(config.log.level, "warn");
    assert_eq!(config.config_root.as_deref(), Some(env.path()));
    assert_eq!(config.files.len(), 1);
    assert_eq!(config.fields["ti"].keys, vec!["title"]);
    assert!(config.validate().is_empty());
}

#[test]
fn test_nested_configs_merge() {
    let env = TestEnv::new();
    env.create_dir("shared/corpus");
    env.create_file(
        "workspace/.fq.toml",
        r#"
root = true

[corpus]
path = "../shared/corpus"

[fields.ti]
keys = ["title", "subtitle"]

[fields.la]
keys = "language"

[search]
limit = 20
parallel = true
"#,
    );
    env.create_file(
        "workspace/project/.fq.toml",
        r#"
[fields.ti]
keys = "headline"

[search]
limit = 5
"#,
    );
    let cwd = env.create_dir("workspace/project/notes");

    let config = Config::load(&cwd).unwrap();

    assert_eq!(config.files.len(), 2);
    assert_eq!(
        config.config_root,
        Some(env.path().join("workspace/project"))
    );
    assert_eq!(
        config.corpus,
        Some(env.path().join("shared/corpus").canonicalize().unwrap())
    );
    assert_eq!(config.search.limit, 5);
    assert!(config.search.parallel);
    assert_eq!(config.fields["ti"].keys, vec!["headline"]);
    assert_eq!(config.fields["la"].keys, vec!["language"]);

    let map = config.field_map();
    assert_eq!(map["ts"], vec!["title", "abstract", "keywords"]);
}

#[test]
fn test_invalid_toml_reports_file() {
    let env = TestEnv::new();
    let path = env.create_file(".fq.toml", "root = true\n[search\nlimit = 1\n");

    let err = Config::load(env.path()).unwrap_err();
    match &err {
        ConfigError::ParseToml { path: p, .. } => assert_eq!(p, &path),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains(".fq.toml"));
}

#[test]
fn test_wrong_value_type_is_an_error() {
    let env = TestEnv::new();
    env.create_file(".fq.toml", "root = true\n[search]\nlimit = \"many\"\n");
    assert!(matches!(
        Config::load(env.path()),
        Err(ConfigError::ParseToml { .. })
    ));
}

#[test]
fn test_missing_corpus_warns() {
    let env = TestEnv::new();
    env.create_file(
        ".fq.toml",
        "root = true\n[corpus]\npath = \"gone.jsonl\"\n\n[fields.Bad]\nkeys = \"x\"\n",
    );

    let config = Config::load(env.path()).unwrap();
    let warnings = config.validate();
    assert!(warnings.contains(&ConfigWarning::InvalidFieldCode { code: "Bad".into() }));
    assert!(
        warnings
            .iter()
            .any(|w| matches!(w, ConfigWarning::CorpusPathMissing { .. }))
    );
}

#[test]
fn test_load_from_files_precedence() {
    let env = TestEnv::new();
    let high = env.create_file("a.toml", "[log]\nlevel = \"debug\"\n");
    let low = env.create_file("b.toml", "[log]\nlevel = \"info\"\n[search]\nlimit = 3\n");

    let config = Config::load_from_files(&[high.clone(), low]).unwrap();
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.search.limit, 3);
    assert_eq!(config.files[0], high);
}

#[test]
fn test_effective_config_round_trips() {
    let env = TestEnv::new();
    let corpus = env.create_file("data/papers.json", "[]");
    env.create_file(
        ".fq.toml",
        "root = true\n[corpus]\npath = \"data/papers.json\"\n[fields.la]\nkeys = \"language\"\n",
    );
    let config = Config::load(env.path()).unwrap();
    let rendered = config.settings_to_toml().unwrap();

    let elsewhere = env.create_file("other/.fq.toml", &format!("root = true\n{rendered}"));
    let reloaded = Config::load(elsewhere.parent().unwrap()).unwrap();

    assert_eq!(reloaded.corpus, Some(corpus.canonicalize().unwrap()));
    assert_eq!(reloaded.field_map(), config.field_map());
}

#[test]
fn test_templates_are_loadable() {
    let env = TestEnv::new();
    env.create_file(".fq.toml", &format!("root = true\n{}", local_template()));
    let config = Config::load(env.path()).unwrap();
    assert!(config.corpus.is_none());
    assert!(global_template().lines().all(|l| l.is_empty() || l.starts_with('#')));
}
