//! Build settings for Kiln
//!
//! Settings come from a `kiln.toml` file next to the sources:
//!
//! ```toml
//! name = "site"
//! srcs = ["styles/main.scss", "styles/print.scss"]
//! out_dir = "build"
//! release = false
//! ```
//!
//! All relative paths in the file are resolved against the directory the
//! file lives in. That directory also becomes the base directory for the
//! stylesheet build itself.

mod loader;
#[cfg(test)]
mod tests;

pub use loader::SettingsWarning;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::KilnResult;
use crate::paths::absolutize;

/// Settings for one stylesheet build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Artifact name; the output file is `<out_dir>/<name>.css`.
    pub name: String,

    /// Stylesheet source files. Entries with unrecognized extensions are
    /// ignored by plugins that don't claim them.
    #[serde(default)]
    pub srcs: Vec<PathBuf>,

    /// Directory the compiled artifact is written to.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Compress the output instead of pretty-printing it.
    #[serde(default)]
    pub release: bool,

    /// Directory imports and relative srcs resolve against. Derived from
    /// the settings file location, never read from the file itself.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("build")
}

impl BuildSettings {
    /// Settings with defaults, rooted at `base_dir`. Used by tests and by
    /// callers that embed Kiln without a settings file.
    pub fn new(name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            name: name.into(),
            srcs: Vec::new(),
            out_dir: absolutize(&base_dir, &default_out_dir()),
            release: false,
            base_dir,
        }
    }

    pub fn with_srcs(mut self, srcs: Vec<PathBuf>) -> Self {
        self.srcs = srcs
            .into_iter()
            .map(|s| absolutize(&self.base_dir, &s))
            .collect();
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl AsRef<Path>) -> Self {
        self.out_dir = absolutize(&self.base_dir, out_dir.as_ref());
        self
    }

    pub fn with_release(mut self, release: bool) -> Self {
        self.release = release;
        self
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> KilnResult<Self> {
        let (settings, _warnings) = loader::load_with_warnings(path)?;
        Ok(settings)
    }

    /// Load settings and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> KilnResult<(Self, Vec<SettingsWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Where the compiled artifact goes.
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.css", self.name))
    }
}
