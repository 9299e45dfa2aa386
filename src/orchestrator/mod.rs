//! The collection run.
//!
//! ```text
//! Idle -> Validating -> StagingFootageRoot -> StagingFontsRoot
//!      -> CopyingFootage -> CopyingFonts -> Relinking -> Archiving
//!      -> Unwinding -> Done | Failed
//! ```
//!
//! Nothing on disk or in the document changes until validation passes.
//! Each mutation after that registers its reversal on an [`UnwindStack`],
//! and the stack is replayed on the way out whether the run succeeded or
//! not: the document ends up pointing at its original files, staging
//! directories are gone and pre-existing directories are back in place.
//! The archive is the only lasting output.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use crate::collectors::{copy_fonts, copy_footage};
use crate::config::CollectionConfig;
use crate::constants::ASIDE_PREFIX_LEN;
use crate::errors::{CollectError, Stage};
use crate::host::HostDocument;
use crate::inventory;
use crate::models::{ArchiveEntry, CollectionReport, FootageRecord};
use crate::paths::{self, exceeds_windows_limit, long_path, SourceRemap};
use crate::relink::{backward_map, forward_map, relink};
use crate::utils::compress::{archive, archive_path_for};
use crate::utils::hash::calculate_sha256;

pub mod state;
pub mod unwind;

pub use state::{CollectionState, StateTracker};
pub use unwind::{CompensatingAction, UnwindReport, UnwindStack};

/// Result of the forward stages
struct Staged {
    project_path: PathBuf,
    archive_path: PathBuf,
    archive_sha256: Option<String>,
    fonts_collected: usize,
    footage_collected: usize,
}

/// Drives one collection run against a host document.
///
/// Runs must not overlap for the same project; the orchestrator does not
/// guard against it.
pub struct CollectionOrchestrator<'a> {
    host: &'a dyn HostDocument,
    config: &'a CollectionConfig,
    state: StateTracker,
    unwind: UnwindStack,
}

impl<'a> CollectionOrchestrator<'a> {
    pub fn new(host: &'a dyn HostDocument, config: &'a CollectionConfig) -> Self {
        Self {
            host,
            config,
            state: StateTracker::new(),
            unwind: UnwindStack::new(),
        }
    }

    pub fn state(&self) -> CollectionState {
        self.state.current()
    }

    /// Every state the run has entered, starting with `Idle`
    pub fn history(&self) -> &[CollectionState] {
        self.state.history()
    }

    /// Collect the project into a single archive.
    ///
    /// On failure the original error is returned after unwinding. If every
    /// forward stage succeeded but a reversal failed, the archive is kept
    /// and [`CollectError::Unwind`] lists what could not be restored.
    pub async fn run(&mut self) -> Result<CollectionReport, CollectError> {
        let started_at = Utc::now().to_rfc3339();
        let forward = self.run_stages().await;

        self.state.enter(CollectionState::Unwinding);
        let unwound = self.unwind.unwind(self.host).await;

        match forward {
            Ok(staged) if unwound.is_clean() => {
                self.state.enter(CollectionState::Done);
                Ok(CollectionReport {
                    project_path: staged.project_path,
                    archive_path: staged.archive_path,
                    archive_sha256: staged.archive_sha256,
                    fonts_collected: staged.fonts_collected,
                    footage_collected: staged.footage_collected,
                    started_at,
                    finished_at: Utc::now().to_rfc3339(),
                })
            }
            Ok(staged) => {
                warn!(
                    "Archive {} was written but {} reversal(s) failed",
                    staged.archive_path.display(),
                    unwound.failures.len()
                );
                self.state.enter(CollectionState::Failed);
                Err(CollectError::Unwind(unwound.failures))
            }
            Err(e) => {
                if !unwound.is_clean() {
                    warn!("Collection failed and {} reversal(s) also failed", unwound.failures.len());
                }
                self.state.enter(CollectionState::Failed);
                Err(e)
            }
        }
    }

    async fn run_stages(&mut self) -> Result<Staged, CollectError> {
        self.state.enter(CollectionState::Validating);
        let project_path = self.project_path().await?;
        let project_dir = project_path.parent()
            .ok_or_else(|| CollectError::InvalidPath(project_path.display().to_string()))?
            .to_path_buf();

        let inventory = inventory::collect(self.host).await?;
        inventory::validate_footage(&inventory.footage)?;
        inventory::validate_fonts(&inventory.fonts, self.config.verify_font_names)?;

        let layout = self.config.layout_for(&project_dir);
        // Captured before anything moves
        let backward = backward_map(&inventory.footage);
        let mut remap = SourceRemap::new();

        self.state.enter(CollectionState::StagingFootageRoot);
        self.rename_aside(&layout.footage_root, &inventory.footage, &mut remap).await?;

        self.state.enter(CollectionState::StagingFontsRoot);
        self.rename_aside(&layout.fonts_root, &inventory.footage, &mut remap).await?;

        let concurrency = self.config.copy_concurrency;

        self.state.enter(CollectionState::CopyingFootage);
        self.unwind.push(CompensatingAction::DeleteDir { path: layout.footage_root.clone() });
        let plans = copy_footage(&inventory.footage, &layout, &remap, concurrency).await?;

        self.state.enter(CollectionState::CopyingFonts);
        self.unwind.push(CompensatingAction::DeleteDir { path: layout.fonts_root.clone() });
        let fonts_collected = copy_fonts(&inventory.fonts, &layout, &remap, concurrency).await?;

        self.state.enter(CollectionState::Relinking);
        let forward = forward_map(&plans);
        if !forward.is_empty() {
            // Registered first so a partial forward relink is still undone
            self.unwind.push(CompensatingAction::RelinkTo { map: backward });
            relink(self.host, &forward).await?;
        }

        self.state.enter(CollectionState::Archiving);
        let output_dir = self.config.resolved_output_dir();
        let archive_path = archive_path_for(&project_path, &output_dir)
            .map_err(|e| CollectError::InvalidPath(format!("{:#}", e)))?;

        let project_name = project_path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let entries = vec![
            ArchiveEntry { source: project_path.clone(), destination_name: project_name, required: true },
            ArchiveEntry {
                source: layout.footage_root.clone(),
                destination_name: self.config.footage_dir_name.clone(),
                required: !plans.is_empty(),
            },
            ArchiveEntry {
                source: layout.fonts_root.clone(),
                destination_name: self.config.fonts_dir_name.clone(),
                required: fonts_collected > 0,
            },
        ];

        let (archive_path, archive_sha256) = write_archive(archive_path, entries, self.config.compression_level).await?;

        Ok(Staged {
            project_path,
            archive_path,
            archive_sha256,
            fonts_collected,
            footage_collected: plans.len(),
        })
    }

    async fn project_path(&self) -> Result<PathBuf, CollectError> {
        let saved = self.host.is_saved()
            .await
            .map_err(|e| CollectError::host("is_saved", e))?;
        let file_path = self.host.file_path()
            .await
            .map_err(|e| CollectError::host("file_path", e))?;

        match file_path {
            Some(raw) if saved && !raw.trim().is_empty() => paths::resolve(&raw),
            _ => Err(CollectError::ProjectNotSaved),
        }
    }

    /// Move an existing directory at `root` to a randomly prefixed sibling so
    /// the staging directory can take its name.
    async fn rename_aside(
        &mut self,
        root: &Path,
        footage: &[FootageRecord],
        remap: &mut SourceRemap,
    ) -> Result<(), CollectError> {
        if tokio::fs::symlink_metadata(long_path(root)).await.is_err() {
            return Ok(());
        }

        let aside = aside_path(root);
        match tokio::fs::rename(long_path(root), long_path(&aside)).await {
            Ok(()) => {
                info!("Moved existing {} aside to {}", root.display(), aside.display());
                self.unwind.push(CompensatingAction::RenameBack { from: aside.clone(), to: root.to_path_buf() });
                remap.add(root.to_path_buf(), aside);
                Ok(())
            }
            Err(e) => Err(rename_failure(root, footage, e)),
        }
    }
}

/// Run a collection to completion on a fresh runtime.
///
/// For callers that are not async themselves, like the CLI.
pub fn collect_project(host: &dyn HostDocument, config: &CollectionConfig) -> anyhow::Result<CollectionReport> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let mut orchestrator = CollectionOrchestrator::new(host, config);
    let report = runtime.block_on(orchestrator.run())?;
    Ok(report)
}

/// `{dir}/{8 hex chars}_{name}`
fn aside_path(root: &Path) -> PathBuf {
    let name = root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let prefix: String = Uuid::new_v4().simple().to_string().chars().take(ASIDE_PREFIX_LEN).collect();
    root.with_file_name(format!("{}_{}", prefix, name))
}

fn rename_failure(root: &Path, footage: &[FootageRecord], err: io::Error) -> CollectError {
    if cfg!(windows) {
        if let Some(record) = footage.iter().find(|r| exceeds_windows_limit(&r.source_path)) {
            return CollectError::LongPath { path: record.source_path.clone() };
        }
    }
    if is_name_too_long(&err) {
        return CollectError::LongPath { path: root.to_path_buf() };
    }
    CollectError::io(Stage::RenameAside, root, err)
}

fn is_name_too_long(err: &io::Error) -> bool {
    let code = match err.raw_os_error() {
        Some(code) => code,
        None => return false,
    };

    #[cfg(windows)]
    {
        code == crate::constants::WINDOWS_ERROR_FILENAME_EXCED_RANGE
    }
    #[cfg(not(windows))]
    {
        code == libc::ENAMETOOLONG
    }
}

async fn write_archive(
    archive_path: PathBuf,
    entries: Vec<ArchiveEntry>,
    level: i32,
) -> Result<(PathBuf, Option<String>), CollectError> {
    let target = archive_path.clone();
    let result = tokio::task::spawn_blocking(move || {
        let written = archive(&target, &entries, level)?;
        let digest = match calculate_sha256(&written) {
            Ok(digest) => digest,
            Err(e) => {
                warn!("Failed to hash {}: {}", written.display(), e);
                None
            }
        };
        Ok::<_, anyhow::Error>((written, digest))
    })
    .await;

    match result {
        Ok(Ok(written)) => Ok(written),
        Ok(Err(e)) => Err(CollectError::Archive { path: archive_path, message: format!("{:#}", e) }),
        Err(e) => Err(CollectError::Archive { path: archive_path, message: e.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MockHostDocument, ProjectItem};
    use crate::models::ItemId;
    use crate::test_utils::generators::{footage_item, text_layer};
    use crate::test_utils::{create_temp_dir, write_file};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn config(output: &Path) -> CollectionConfig {
        CollectionConfig {
            output_dir: Some(output.to_path_buf()),
            verify_font_names: false,
            copy_concurrency: 2,
            ..CollectionConfig::default()
        }
    }

    fn saved_host(project: &Path, items: Vec<ProjectItem>) -> MockHostDocument {
        let mut host = MockHostDocument::new();
        let raw = project.to_string_lossy().to_string();
        host.expect_is_saved().returning(|| Ok(true));
        host.expect_file_path().returning(move || Ok(Some(raw.clone())));
        host.expect_items().returning(move || Ok(items.clone()));
        host
    }

    fn dir_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .map(|entries| {
                entries.filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_unsaved_project_fails_fast() {
        let mut host = MockHostDocument::new();
        host.expect_is_saved().returning(|| Ok(false));
        host.expect_file_path().returning(|| Ok(Some("/p/show.aep".into())));
        host.expect_items().times(0);

        let config = CollectionConfig::default();
        let mut orchestrator = CollectionOrchestrator::new(&host, &config);
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, CollectError::ProjectNotSaved));
        assert_eq!(orchestrator.state(), CollectionState::Failed);
    }

    #[tokio::test]
    async fn test_missing_footage_blocks_every_mutation() -> anyhow::Result<()> {
        let project = create_temp_dir()?;
        let out = create_temp_dir()?;
        let aep = write_file(&project.path().join("show.aep"), b"aep")?;
        write_file(&project.path().join("(Footage)/old.mov"), b"old")?;
        let before = dir_names(project.path());

        let mut missing = footage_item(4, &project.path().join("gone.mov"), "Root");
        missing.missing = true;
        let mut host = saved_host(&aep, vec![missing]);
        host.expect_replace_source().times(0);
        host.expect_save().times(0);

        let config = config(out.path());
        let mut orchestrator = CollectionOrchestrator::new(&host, &config);
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, CollectError::MissingAssets(_)));
        assert_eq!(dir_names(project.path()), before);
        assert!(!orchestrator.history().contains(&CollectionState::StagingFootageRoot));
        Ok(())
    }

    #[tokio::test]
    async fn test_relink_failure_unwinds_everything() -> anyhow::Result<()> {
        let project = create_temp_dir()?;
        let media = create_temp_dir()?;
        let out = create_temp_dir()?;
        let aep = write_file(&project.path().join("show.aep"), b"aep")?;
        let bg = write_file(&media.path().join("bg.mp4"), b"bg")?;
        let font = write_file(&media.path().join("Arial.ttf"), b"font")?;
        write_file(&project.path().join("Fonts/user.ttf"), b"user")?;

        let mut host = saved_host(
            &aep,
            vec![footage_item(7, &bg, "Root/Scenes"), text_layer(9, &[("Arial", Some(&font))])],
        );
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&calls);
        host.expect_replace_source().returning(move |id, path| {
            let mut calls = recorded.lock().unwrap();
            calls.push((id, path.to_path_buf()));
            if calls.len() == 1 {
                Err(anyhow::anyhow!("item is locked"))
            } else {
                Ok(())
            }
        });
        host.expect_save().returning(|| Ok(()));

        let config = config(out.path());
        let mut orchestrator = CollectionOrchestrator::new(&host, &config);
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, CollectError::Host { operation: "replace_source", .. }));
        // Staging removed, the user's Fonts directory is back, no aside leftovers
        assert_eq!(dir_names(project.path()), vec!["Fonts", "show.aep"]);
        assert_eq!(fs::read(project.path().join("Fonts/user.ttf"))?, b"user");
        // Forward attempt, then the compensating relink to the original path
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], (ItemId(7), bg.clone()));
        assert!(dir_names(out.path()).is_empty());
        assert_eq!(orchestrator.state(), CollectionState::Failed);
        Ok(())
    }

    #[tokio::test]
    async fn test_successful_run_relinks_forward_then_back() -> anyhow::Result<()> {
        let project = create_temp_dir()?;
        let media = create_temp_dir()?;
        let out = create_temp_dir()?;
        let aep = write_file(&project.path().join("show.aep"), b"aep")?;
        let bg = write_file(&media.path().join("bg.mp4"), b"bg")?;

        let mut host = saved_host(&aep, vec![footage_item(7, &bg, "Root/Scenes")]);
        let targets = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&targets);
        host.expect_replace_source().returning(move |_, path| {
            recorded.lock().unwrap().push(path.to_path_buf());
            Ok(())
        });
        let saves = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&saves);
        host.expect_save().returning(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let config = config(out.path());
        let mut orchestrator = CollectionOrchestrator::new(&host, &config);
        let report = orchestrator.run().await?;

        assert_eq!(report.archive_path, out.path().join("show.zip"));
        assert_eq!(report.footage_collected, 1);
        assert!(report.archive_sha256.is_some());
        assert_eq!(
            *targets.lock().unwrap(),
            vec![project.path().join("(Footage)/Scenes/bg.mp4"), bg.clone()]
        );
        assert_eq!(saves.load(Ordering::SeqCst), 2);
        assert_eq!(dir_names(project.path()), vec!["show.aep"]);
        assert_eq!(
            orchestrator.history(),
            &[
                CollectionState::Idle,
                CollectionState::Validating,
                CollectionState::StagingFootageRoot,
                CollectionState::StagingFontsRoot,
                CollectionState::CopyingFootage,
                CollectionState::CopyingFonts,
                CollectionState::Relinking,
                CollectionState::Archiving,
                CollectionState::Unwinding,
                CollectionState::Done,
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_reversal_after_success_is_reported() -> anyhow::Result<()> {
        let project = create_temp_dir()?;
        let media = create_temp_dir()?;
        let out = create_temp_dir()?;
        let aep = write_file(&project.path().join("show.aep"), b"aep")?;
        let bg = write_file(&media.path().join("bg.mp4"), b"bg")?;

        let mut host = saved_host(&aep, vec![footage_item(7, &bg, "Root")]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        host.expect_replace_source().returning(move |_, _| {
            // Forward relink succeeds, relinking back does not
            if counted.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(())
            } else {
                Err(anyhow::anyhow!("document closed"))
            }
        });
        host.expect_save().returning(|| Ok(()));

        let config = config(out.path());
        let mut orchestrator = CollectionOrchestrator::new(&host, &config);
        let err = orchestrator.run().await.unwrap_err();

        match err {
            CollectError::Unwind(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].contains("document closed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(orchestrator.state(), CollectionState::Failed);
        assert!(out.path().join("show.zip").exists());
        // Filesystem reversals still ran
        assert_eq!(dir_names(project.path()), vec!["show.aep"]);
        Ok(())
    }

    #[test]
    fn test_aside_path_is_prefixed_sibling() {
        let aside = aside_path(Path::new("/p/(Footage)"));
        let name = aside.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(aside.parent(), Some(Path::new("/p")));
        assert!(name.ends_with("_(Footage)"));
        assert_eq!(name.len(), ASIDE_PREFIX_LEN + 1 + "(Footage)".len());
    }

    #[cfg(unix)]
    #[test]
    fn test_name_too_long_becomes_long_path_error() {
        let err = io::Error::from_raw_os_error(libc::ENAMETOOLONG);
        match rename_failure(Path::new("/p/(Footage)"), &[], err) {
            CollectError::LongPath { path } => assert_eq!(path, PathBuf::from("/p/(Footage)")),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = io::Error::from_raw_os_error(libc::EACCES);
        assert!(matches!(
            rename_failure(Path::new("/p/Fonts"), &[], err),
            CollectError::Io { stage: Stage::RenameAside, .. }
        ));
    }
}
