//! Configuration for the extractor and the project indexer.
//!
//! Loaded from an optional JSON file; every field falls back to a default.
use std::ffi::OsStr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::parser::ParserOptions;

// ── Default value functions ──────────────────────────────────────────

fn default_extensions() -> Vec<String> {
    ["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    [
        "node_modules",
        "dist",
        "build",
        "out",
        ".next",
        ".nuxt",
        "coverage",
        ".git",
        ".hg",
        ".svn",
        "__snapshots__",
        ".idea",
        ".vscode",
        "target",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_exclude_suffixes() -> Vec<String> {
    [".min.js", ".map", ".d.ts"]
        .into_iter()
        .map(String::from)
        .collect()
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserOptions,

    #[serde(default)]
    pub index: IndexConfig,
}

/// Which files a project index picks up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// File extensions without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names pruned from the walk.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// File name endings that are skipped even with a matching extension.
    #[serde(default = "default_exclude_suffixes")]
    pub exclude_suffixes: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            exclude_suffixes: default_exclude_suffixes(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;

        let cfg: Config = serde_json::from_str(&data).map_err(|e| Error::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }
}

impl IndexConfig {
    pub fn is_excluded_dir(&self, name: &OsStr) -> bool {
        self.exclude_dirs.iter().any(|d| OsStr::new(d) == name)
    }

    pub fn accepts_file(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(OsStr::to_str) else {
            return false;
        };
        if self
            .exclude_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
        {
            return false;
        }
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}
