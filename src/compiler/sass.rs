//! Sass/SCSS compilation via `grass`
//!
//! `grass` has no importer callback; its seam is the `grass::Fs` trait it
//! probes while resolving `@import` and `@use`. [`ImporterFs`] sits on that
//! seam: candidate probes (`is_file`, `is_dir`) pass through untouched, and
//! only the files grass actually loads are reported to the engine's
//! importer. Relative probe paths are rebased onto the build's base
//! directory so resolution never depends on the process working directory.

use std::cell::RefCell;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{KilnError, KilnResult};
use crate::paths::absolutize;

use super::{Importer, Issuer, StyleCompiler};

/// Production compiler backed by the `grass` crate.
pub struct GrassCompiler {
    base_dir: PathBuf,
    compress: bool,
}

impl GrassCompiler {
    pub fn new(base_dir: impl Into<PathBuf>, compress: bool) -> Self {
        Self {
            base_dir: base_dir.into(),
            compress,
        }
    }
}

impl StyleCompiler for GrassCompiler {
    fn render(&self, source: &str, importer: &mut dyn Importer) -> KilnResult<String> {
        let bridge = ImporterFs {
            base_dir: &self.base_dir,
            importer: RefCell::new(importer),
        };

        let style = if self.compress {
            grass::OutputStyle::Compressed
        } else {
            grass::OutputStyle::Expanded
        };
        let options = grass::Options::default().fs(&bridge).style(style);

        grass::from_string(source.to_owned(), &options).map_err(|e| KilnError::Compile {
            message: e.to_string(),
        })
    }
}

/// Filesystem bridge handed to grass for one render.
///
/// grass probes several candidate spellings per import (partials, index
/// files, both extensions) and then reads the winner. Only `read` reaches
/// the importer, so the watch set tracks files that were consulted, not
/// candidates that merely got probed.
struct ImporterFs<'a> {
    base_dir: &'a Path,
    importer: RefCell<&'a mut dyn Importer>,
}

impl ImporterFs<'_> {
    fn rebase(&self, path: &Path) -> PathBuf {
        absolutize(self.base_dir, path)
    }
}

impl grass::Fs for ImporterFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.rebase(path).is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.rebase(path).is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let full = self.rebase(path);
        let resolved = self
            .importer
            .borrow_mut()
            .resolve(&full.to_string_lossy(), Issuer::Root);
        std::fs::read(resolved)
    }
}

impl fmt::Debug for ImporterFs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImporterFs")
            .field("base_dir", &self.base_dir)
            .finish_non_exhaustive()
    }
}
