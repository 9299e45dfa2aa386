//! Error taxonomy for a collection run.
//!
//! Every failure that can abort a run maps onto one variant of
//! [`CollectError`]. Batched variants carry every offending item so the
//! message shown to the user lists all of them at once.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::LONG_PATH_ADVICE;

/// Filesystem step that produced an [`CollectError::Io`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RenameAside,
    CreateStaging,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::RenameAside => write!(f, "Renaming existing directory aside"),
            Stage::CreateStaging => write!(f, "Creating staging directory"),
        }
    }
}

/// Why a font failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontIssue {
    MissingExtension,
    MissingLocation,
    Unreadable(String),
    NameMismatch { found: Vec<String> },
}

/// A font that failed validation, reported by its logical name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontProblem {
    pub name: String,
    pub issue: FontIssue,
}

impl fmt::Display for FontProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            FontIssue::MissingExtension => write!(f, "{}: font file has no extension", self.name),
            FontIssue::MissingLocation => write!(f, "{}: font file location is unknown", self.name),
            FontIssue::Unreadable(reason) => write!(f, "{}: font file could not be read ({})", self.name, reason),
            FontIssue::NameMismatch { found } => {
                if found.is_empty() {
                    write!(f, "{}: font file declares no name", self.name)
                } else {
                    write!(f, "{}: font file declares {}", self.name, found.join(", "))
                }
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("The project must be saved to disk before it can be collected")]
    ProjectNotSaved,

    #[error("The following footage is missing: {}", .0.join(", "))]
    MissingAssets(Vec<String>),

    #[error("The following fonts are invalid:\n{}", join_lines(.0))]
    InvalidFont(Vec<FontProblem>),

    #[error("Footage paths are too long for this platform ({}). {}", .path.display(), LONG_PATH_ADVICE)]
    LongPath { path: PathBuf },

    #[error("Failed to collect fonts: {}", join_paths(.failed))]
    CollectFonts { failed: Vec<PathBuf> },

    #[error("Failed to collect footage: {}", join_paths(.failed))]
    CollectFootage { failed: Vec<PathBuf> },

    #[error("{stage} failed for {}: {source}", .path.display())]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Host call `{operation}` failed: {message}")]
    Host { operation: &'static str, message: String },

    #[error("Failed to create archive {}: {message}", .path.display())]
    Archive { path: PathBuf, message: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Collection finished but the project could not be fully restored: {}", .0.join("; "))]
    Unwind(Vec<String>),
}

impl CollectError {
    pub(crate) fn io(stage: Stage, path: &Path, source: io::Error) -> Self {
        CollectError::Io { stage, path: path.to_path_buf(), source }
    }

    pub(crate) fn host(operation: &'static str, err: anyhow::Error) -> Self {
        CollectError::Host { operation, message: format!("{:#}", err) }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths.iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_lines(problems: &[FontProblem]) -> String {
    problems.iter()
        .map(|p| format!("  {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}
