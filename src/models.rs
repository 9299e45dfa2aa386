use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

/// Stable identity the host assigns to a project item
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A font used by the project
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FontRecord {
    pub name: String,
    pub extension: Option<String>,
    pub source_path: Option<PathBuf>,
}

/// A footage item that references a file on disk
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FootageRecord {
    pub item_id: ItemId,
    pub file_name: String,
    pub source_path: PathBuf,
    /// Slash-delimited logical folder, starting with the root label
    pub folder_path: String,
    pub missing: bool,
}

/// Everything a project references, rebuilt for every run
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AssetInventory {
    pub fonts: Vec<FontRecord>,
    pub footage: Vec<FootageRecord>,
}

/// Item identity to absolute path, used to repoint footage references
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RelinkMap {
    entries: BTreeMap<ItemId, PathBuf>,
}

impl RelinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item_id: ItemId, path: PathBuf) {
        self.entries.insert(item_id, path);
    }

    pub fn get(&self, item_id: ItemId) -> Option<&PathBuf> {
        self.entries.get(&item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &PathBuf)> {
        self.entries.iter()
    }
}

impl FromIterator<(ItemId, PathBuf)> for RelinkMap {
    fn from_iter<I: IntoIterator<Item = (ItemId, PathBuf)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// One input of the archiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub source: PathBuf,
    pub destination_name: String,
    pub required: bool,
}

/// Outcome of a successful run
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CollectionReport {
    pub project_path: PathBuf,
    pub archive_path: PathBuf,
    pub archive_sha256: Option<String>,
    pub fonts_collected: usize,
    pub footage_collected: usize,
    pub started_at: String,
    pub finished_at: String,
}

/// Where a run stages its copies: two sibling directories next to the
/// project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    pub project_dir: PathBuf,
    pub footage_root: PathBuf,
    pub fonts_root: PathBuf,
    /// Label stripped from the front of logical folder paths
    pub root_label: String,
}

impl StagingLayout {
    pub fn new(project_dir: &Path, footage_dir_name: &str, fonts_dir_name: &str, root_label: &str) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            footage_root: project_dir.join(footage_dir_name),
            fonts_root: project_dir.join(fonts_dir_name),
            root_label: root_label.to_string(),
        }
    }
}
