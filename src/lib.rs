//! # project-collector
//!
//! Collects an editor project together with every font and footage file it
//! references into a single self-contained ZIP archive.
//!
//! ## Overview
//!
//! A collection run queries the live document through [`host::HostDocument`],
//! validates that everything it references exists, copies footage into a
//! `(Footage)` tree that mirrors the project's folder structure, copies fonts
//! into a flat `Fonts` directory, repoints the document at the copies, and
//! archives the project file with both directories. Afterwards every change
//! is reversed: the document points at the original files again, staging
//! directories are removed, and any directory that was moved aside is
//! restored.
//!
//! ## Features
//!
//! - **Validation before mutation**: missing footage and broken fonts are
//!   reported in one batch before anything on disk changes
//! - **Bounded parallel copies**: a configurable worker pool per stage
//! - **Compensating actions**: every mutation registers its reversal
//! - **YAML configuration** with environment overrides
//!
//! ## Usage
//!
//! ```no_run
//! use project_collector::config::CollectionConfig;
//! use project_collector::host::ManifestDocument;
//! use project_collector::orchestrator::collect_project;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let document = ManifestDocument::open(Path::new("show.json"))?;
//! let config = CollectionConfig::default();
//!
//! let report = collect_project(&document, &config)?;
//! println!("Archive written to {}", report.archive_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions
//! - [`models`]: Records, maps and reports shared across stages
//! - [`paths`]: Path resolution and platform path quirks
//! - [`host`]: The host document surface and a manifest-backed implementation
//! - [`inventory`]: Asset discovery and validation
//! - [`fonts`]: Font file inspection
//! - [`collectors`]: Font and footage copying
//! - [`relink`]: Repointing footage references
//! - [`orchestrator`]: The collection state machine and its unwind stack
//! - [`utils`]: Archiving, hashing and summaries
//! - [`config`]: Configuration management
//! - [`errors`]: Error taxonomy
//! - [`constants`]: Application constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models shared across stages
pub mod models;

/// Error taxonomy for collection runs
pub mod errors;

/// Path resolution, long-path handling and folder mapping
pub mod paths;

/// The host document surface
pub mod host;

/// Asset discovery and validation
pub mod inventory;

/// Font file inspection
pub mod fonts;

/// Font and footage collectors
pub mod collectors;

/// Footage relinking
pub mod relink;

/// Collection state machine
pub mod orchestrator;

/// Archiving, hashing and reporting
pub mod utils;

/// Configuration management
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
