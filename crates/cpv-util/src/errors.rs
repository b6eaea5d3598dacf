use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all cpv operations.
#[derive(Debug, Error, Diagnostic)]
pub enum CpvError {
    /// The root directory is missing, empty or not a directory.
    #[error("Invalid root path '{path}': {reason}")]
    #[diagnostic(help("Pass an existing directory, e.g. `cpv centralize ./my-repo`"))]
    InvalidRootPath { path: String, reason: String },

    /// Walking the root directory for descriptors failed.
    #[error("Failed to search {} for project files: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor or manifest is not well-formed XML.
    #[error("Failed to parse {}: {message}", path.display())]
    #[diagnostic(help("Fix the markup by hand, or rerun with --keep-going to skip this file"))]
    DocumentParse { path: PathBuf, message: String },

    /// A version attribute is not a dot-separated list of integers.
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersionFormat { version: String, reason: String },

    /// Writing the centralized manifest failed. Rewritten descriptors are kept.
    #[error("Failed to write {}: {source}", path.display())]
    #[diagnostic(help(
        "Project files were already rewritten; fix the problem and rerun to regenerate the manifest"
    ))]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid `cpv.toml` or exclude pattern.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your cpv.toml for syntax errors"))]
    Config { message: String },

    /// Interactive prompt failed.
    #[error("Prompt error: {message}")]
    Prompt { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type CpvResult<T> = miette::Result<T>;
