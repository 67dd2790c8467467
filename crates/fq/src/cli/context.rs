//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use fq_config::Config;
use fq_index::MemoryIndex;
use tracing::debug;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which should work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Returns the corpus to search: the override (relative to cwd) or the configured path.
    pub fn corpus_path(&self, corpus_override: Option<&Path>) -> Result<PathBuf, ExitCode> {
        if let Some(path) = corpus_override {
            return Ok(self.cwd.join(path));
        }
        self.config.corpus.clone().ok_or_else(|| {
            eprintln!("error: no corpus configured");
            eprintln!("Set [corpus] path in .fq.toml or pass --corpus.");
            ExitCode::FAILURE
        })
    }

    /// Loads the corpus and builds the in-memory index over the configured fields.
    pub fn open_index(&self, corpus_override: Option<&Path>) -> Result<MemoryIndex, ExitCode> {
        let path = self.corpus_path(corpus_override)?;
        debug!(corpus = %path.display(), "opening corpus");
        MemoryIndex::open(&path, &self.config.field_map()).map_err(|e| {
            eprintln!("error: failed to load corpus: {e}");
            ExitCode::FAILURE
        })
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
