//! File-backed host document.
//!
//! A manifest is a JSON description of a project:
//!
//! ```json
//! {
//!   "project_path": "/work/show/show.aep",
//!   "saved": true,
//!   "items": [
//!     { "id": 7, "kind": "footage", "name": "bg.mp4",
//!       "source_path": "/media/bg.mp4", "folder_path": "Root/Scenes" }
//!   ]
//! }
//! ```
//!
//! Relinks edit the in-memory copy; [`HostDocument::save`] writes it back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Serialize, Deserialize};
use tokio::sync::Mutex;

use crate::host::{HostDocument, ItemKind, ProjectItem};
use crate::models::ItemId;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    #[serde(default)]
    pub project_path: Option<String>,
    #[serde(default = "default_saved")]
    pub saved: bool,
    #[serde(default)]
    pub items: Vec<ProjectItem>,
}

fn default_saved() -> bool {
    true
}

/// [`HostDocument`] backed by a JSON manifest on disk
pub struct ManifestDocument {
    path: PathBuf,
    state: Mutex<Manifest>,
}

impl ManifestDocument {
    /// Load a manifest from disk
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read manifest: {}", path.display()))?;
        let manifest: Manifest = serde_json::from_str(&content)
            .context(format!("Failed to parse manifest: {}", path.display()))?;

        debug!("Loaded manifest {} with {} items", path.display(), manifest.items.len());
        Ok(Self::from_manifest(path, manifest))
    }

    /// Wrap an in-memory manifest that will be saved to `path`
    pub fn from_manifest(path: &Path, manifest: Manifest) -> Self {
        Self {
            path: path.to_path_buf(),
            state: Mutex::new(manifest),
        }
    }

    /// Snapshot of the current in-memory manifest
    pub async fn manifest(&self) -> Manifest {
        self.state.lock().await.clone()
    }

    pub fn manifest_path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl HostDocument for ManifestDocument {
    async fn file_path(&self) -> Result<Option<String>> {
        Ok(self.state.lock().await.project_path.clone())
    }

    async fn is_saved(&self) -> Result<bool> {
        Ok(self.state.lock().await.saved)
    }

    async fn save(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.saved = true;
        let json = serde_json::to_string_pretty(&*state)
            .context("Failed to serialize manifest")?;
        tokio::fs::write(&self.path, json)
            .await
            .context(format!("Failed to write manifest: {}", self.path.display()))?;
        debug!("Saved manifest {}", self.path.display());
        Ok(())
    }

    async fn items(&self) -> Result<Vec<ProjectItem>> {
        Ok(self.state.lock().await.items.clone())
    }

    async fn replace_source(&self, item_id: ItemId, path: &Path) -> Result<()> {
        let mut state = self.state.lock().await;
        let item = state.items.iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| anyhow!("No item with id {}", item_id))?;

        if item.kind != ItemKind::Footage {
            return Err(anyhow!("Item {} is not footage", item_id));
        }

        // The missing flag is left alone: a relink back to the originals can
        // run while they are still renamed aside
        item.source_path = Some(path.to_string_lossy().to_string());
        state.saved = false;
        Ok(())
    }
}
