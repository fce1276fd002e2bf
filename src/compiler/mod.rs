//! Stylesheet compiler port
//!
//! The engine talks to the compiler through `StyleCompiler` and receives
//! import traffic back through `Importer`. Production code wires in
//! [`GrassCompiler`]; tests wire in scripted compilers that replay import
//! sequences without touching a real compiler.

mod sass;

pub use sass::GrassCompiler;

use std::path::{Path, PathBuf};

use crate::error::KilnResult;

/// Compiles one stylesheet source text into CSS.
///
/// Every file the compiler consults during the run must be routed through
/// the supplied importer, once per consultation.
pub trait StyleCompiler: Send {
    fn render(&self, source: &str, importer: &mut dyn Importer) -> KilnResult<String>;
}

/// Where an import specifier was written.
#[derive(Debug, Clone, Copy)]
pub enum Issuer<'a> {
    /// The synthetic root unit; relative specifiers resolve against the
    /// build's base directory.
    Root,
    /// A source file; relative specifiers resolve against its directory.
    File(&'a Path),
}

/// Receives every import the compiler resolves during a run.
///
/// Returns the canonical absolute path the compiler should load. The
/// engine's implementation records the path in the watch set as a side
/// effect.
pub trait Importer {
    fn resolve(&mut self, specifier: &str, issuer: Issuer<'_>) -> PathBuf;
}
