//! The host document: the live project owned by the editor.
//!
//! The collector never touches the project file directly. It asks the host
//! for the items it contains, repoints footage references through it and
//! asks it to save. [`HostDocument`] is that surface; [`ManifestDocument`]
//! implements it over a JSON manifest so the pipeline can run outside the
//! editor.

use std::path::Path;

use anyhow::Result;
use serde::{Serialize, Deserialize};

use crate::models::ItemId;

pub mod manifest;

pub use manifest::ManifestDocument;

/// What a project item is
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Composition,
    Footage,
    TextLayer,
}

/// A font as the host reports it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HostFont {
    /// Name the project refers to the font by (usually the PostScript name)
    pub name: String,
    /// File the font was loaded from, if the host knows it
    #[serde(default)]
    pub location: Option<String>,
}

/// One entry of the host's item list
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub name: String,
    #[serde(default)]
    pub source_path: Option<String>,
    /// Slash-delimited folder path inside the project, starting with the root label
    #[serde(default)]
    pub folder_path: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub fonts: Vec<HostFont>,
}

/// Query and mutation surface of the live project
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HostDocument: Send + Sync {
    /// Path of the project file, `None` if it was never saved
    async fn file_path(&self) -> Result<Option<String>>;

    /// Whether the document has no unsaved changes
    async fn is_saved(&self) -> Result<bool>;

    async fn save(&self) -> Result<()>;

    async fn items(&self) -> Result<Vec<ProjectItem>>;

    /// Point the footage item `item_id` at `path`
    async fn replace_source(&self, item_id: ItemId, path: &Path) -> Result<()>;
}
