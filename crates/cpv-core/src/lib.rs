//! Core of the cpv central package version tool.
//!
//! This crate holds the consolidation algorithm: dotted version ordering,
//! the descriptor transform that strips per-project versions, the aggregate
//! of winning versions, and rendering of the centralized manifest.
//!
//! This crate does no directory walking; callers hand it document text.

/// File name of the centralized manifest written at the repository root.
pub const DEFAULT_MANIFEST_FILE: &str = "Directory.Packages.props";

/// File name of the optional configuration file at the repository root.
pub const CONFIG_FILE: &str = "cpv.toml";

pub mod aggregate;
pub mod config;
pub mod document;
pub mod manifest;
pub mod transform;
pub mod version;
