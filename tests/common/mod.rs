//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use project_collector::config::CollectionConfig;
use project_collector::host::manifest::Manifest;
use project_collector::host::{HostFont, ItemKind, ManifestDocument, ProjectItem};
use project_collector::models::ItemId;

/// A project on disk plus the manifest describing it
pub struct ProjectFixture {
    pub project_dir: TempDir,
    pub media_dir: TempDir,
    pub output_dir: TempDir,
    pub project_file: PathBuf,
    pub manifest_path: PathBuf,
    pub items: Vec<ProjectItem>,
}

impl ProjectFixture {
    pub fn new(project_name: &str) -> Result<Self> {
        let project_dir = TempDir::new()?;
        let media_dir = TempDir::new()?;
        let output_dir = TempDir::new()?;
        let project_file = write(&project_dir.path().join(project_name), b"project data")?;
        let manifest_path = media_dir.path().join("manifest.json");

        Ok(Self {
            project_dir,
            media_dir,
            output_dir,
            project_file,
            manifest_path,
            items: Vec::new(),
        })
    }

    pub fn project(&self) -> &Path {
        self.project_dir.path()
    }

    /// Create a media file and reference it from a footage item
    pub fn add_footage(&mut self, id: u32, rel_path: &str, folder: &str, content: &[u8]) -> Result<PathBuf> {
        let source = write(&self.media_dir.path().join(rel_path), content)?;
        self.reference_footage(id, &source, folder);
        Ok(source)
    }

    /// Reference an existing path from a footage item
    pub fn reference_footage(&mut self, id: u32, source: &Path, folder: &str) {
        self.items.push(ProjectItem {
            id: ItemId(id),
            kind: ItemKind::Footage,
            name: source.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            source_path: Some(source.to_string_lossy().to_string()),
            folder_path: folder.to_string(),
            missing: !source.exists(),
            fonts: Vec::new(),
        });
    }

    /// Reference a font file from a text layer
    pub fn add_font(&mut self, id: u32, name: &str, location: &Path) {
        self.items.push(ProjectItem {
            id: ItemId(id),
            kind: ItemKind::TextLayer,
            name: format!("Title {}", id),
            source_path: None,
            folder_path: "Root".to_string(),
            missing: false,
            fonts: vec![HostFont {
                name: name.to_string(),
                location: Some(location.to_string_lossy().to_string()),
            }],
        });
    }

    /// Write the manifest and open it as a host document
    pub fn open(&self) -> Result<ManifestDocument> {
        let manifest = Manifest {
            project_path: Some(self.project_file.to_string_lossy().to_string()),
            saved: true,
            items: self.items.clone(),
        };
        fs::write(&self.manifest_path, serde_json::to_string_pretty(&manifest)?)?;
        ManifestDocument::open(&self.manifest_path)
    }

    pub fn config(&self) -> CollectionConfig {
        CollectionConfig {
            output_dir: Some(self.output_dir.path().to_path_buf()),
            verify_font_names: false,
            copy_concurrency: 4,
            ..CollectionConfig::default()
        }
    }

    /// Names directly inside the project directory, sorted
    pub fn project_listing(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.project())? {
            names.push(entry?.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    /// Source paths recorded in the manifest on disk, by item id
    pub fn saved_sources(&self) -> Result<Vec<(u32, Option<String>)>> {
        let manifest: Manifest = serde_json::from_str(&fs::read_to_string(&self.manifest_path)?)?;
        Ok(manifest.items.into_iter()
            .filter(|item| item.kind == ItemKind::Footage)
            .map(|item| (item.id.0, item.source_path))
            .collect())
    }
}

pub fn write(path: &Path, content: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

/// Sorted file entries of a ZIP archive
pub fn archive_files(path: &Path) -> Result<Vec<String>> {
    let mut zip = zip::ZipArchive::new(fs::File::open(path)?)?;
    let mut names = Vec::new();
    for i in 0..zip.len() {
        let entry = zip.by_index(i)?;
        if entry.is_file() {
            names.push(entry.name().to_string());
        }
    }
    names.sort();
    Ok(names)
}

pub fn archive_read(path: &Path, name: &str) -> Result<Vec<u8>> {
    use std::io::Read;
    let mut zip = zip::ZipArchive::new(fs::File::open(path)?)?;
    let mut content = Vec::new();
    zip.by_name(name)?.read_to_end(&mut content)?;
    Ok(content)
}
