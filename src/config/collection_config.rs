use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Serialize, Deserialize};

use crate::collectors::pool::default_concurrency;
use crate::constants::{DEFAULT_COMPRESSION_LEVEL, FONTS_DIR_NAME, FOOTAGE_DIR_NAME, ROOT_FOLDER_LABEL};
use crate::models::StagingLayout;

/// Settings for a collection run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CollectionConfig {
    /// Staging directory that receives footage
    pub footage_dir_name: String,
    /// Staging directory that receives fonts
    pub fonts_dir_name: String,
    /// Synthetic label at the front of every logical folder path
    pub root_folder_label: String,
    /// Upper bound on concurrent copies
    pub copy_concurrency: usize,
    /// Deflate level for the archive
    pub compression_level: i32,
    /// Read font name tables during validation
    pub verify_font_names: bool,
    /// Where the archive is written; the system temp directory when unset
    pub output_dir: Option<PathBuf>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            footage_dir_name: FOOTAGE_DIR_NAME.to_string(),
            fonts_dir_name: FONTS_DIR_NAME.to_string(),
            root_folder_label: ROOT_FOLDER_LABEL.to_string(),
            copy_concurrency: default_concurrency(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            verify_font_names: true,
            output_dir: None,
        }
    }
}

impl CollectionConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: CollectionConfig = serde_yaml::from_str(&content)
            .context("Failed to parse YAML config")?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config to YAML")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, yaml)
            .context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Staging directories for a project living in `project_dir`
    pub fn layout_for(&self, project_dir: &Path) -> StagingLayout {
        StagingLayout::new(
            project_dir,
            &self.footage_dir_name,
            &self.fonts_dir_name,
            &self.root_folder_label,
        )
    }

    /// Directory the archive is written to
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Load a configuration file or create a default one.
///
/// * `Some(path)` that exists is parsed.
/// * `Some(path)` that does not exist gets a default configuration written
///   to it.
/// * `None` yields the default without touching the filesystem.
pub fn load_or_create_config(config_path: Option<&Path>) -> Result<CollectionConfig> {
    match config_path {
        Some(path) if path.exists() => CollectionConfig::from_yaml_file(path),
        Some(path) => {
            info!("Creating default config at {}", path.display());
            let default_config = CollectionConfig::default();
            default_config.save_to_yaml_file(path)?;
            Ok(default_config)
        }
        None => Ok(CollectionConfig::default()),
    }
}
