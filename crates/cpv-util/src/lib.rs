//! Shared utilities for cpv.
//!
//! This crate provides cross-cutting concerns used by the other cpv crates:
//! the unified error type, descriptor discovery on disk, and Cargo-style
//! status output on the terminal.

pub mod errors;
pub mod fs;
pub mod progress;
