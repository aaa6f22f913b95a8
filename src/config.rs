//! Project configuration (dtsx.toml) parsing and types.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "dtsx.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Root configuration structure for dtsx.toml.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DtsxConfig {
    /// Declaration generation settings.
    #[serde(default)]
    pub dts: DtsConfig,
}

/// The `[dts]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DtsConfig {
    /// Base directory that relative `root` and `outdir` are resolved against.
    pub cwd: Option<String>,
    /// Source root; entrypoints are matched under it.
    pub root: Option<String>,
    /// Glob patterns, relative to `root`.
    pub entrypoints: Option<Vec<String>>,
    /// Output directory for generated `.d.ts` files.
    pub outdir: Option<String>,
    /// Remove the output directory before generating.
    pub clean: Option<bool>,
    /// Emit doc comments attached to declarations.
    pub keep_comments: Option<bool>,
}

impl DtsxConfig {
    /// Load configuration from dtsx.toml in the current directory.
    /// Returns the default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl DtsConfig {
    /// Get the base directory, defaulting to the process working directory.
    pub fn cwd(&self) -> PathBuf {
        PathBuf::from(self.cwd.as_deref().unwrap_or("."))
    }

    /// Get the source root resolved against `cwd`, defaulting to "./src".
    pub fn root(&self) -> PathBuf {
        self.cwd().join(self.root.as_deref().unwrap_or("./src"))
    }

    /// Get the entrypoint patterns (default: every `.ts` file under root).
    pub fn entrypoints(&self) -> Vec<String> {
        self.entrypoints
            .clone()
            .unwrap_or_else(|| vec!["**/*.ts".to_string()])
    }

    /// Get the output directory resolved against `cwd`, defaulting to "./dist".
    pub fn outdir(&self) -> PathBuf {
        self.cwd().join(self.outdir.as_deref().unwrap_or("./dist"))
    }

    /// Get whether the output directory is cleaned first (default: false).
    pub fn clean(&self) -> bool {
        self.clean.unwrap_or(false)
    }

    /// Get whether doc comments are kept (default: true).
    pub fn keep_comments(&self) -> bool {
        self.keep_comments.unwrap_or(true)
    }
}
