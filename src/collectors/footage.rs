use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::collectors::copy_file;
use crate::collectors::failures::CopyFailures;
use crate::collectors::pool::run_bounded;
use crate::errors::{CollectError, Stage};
use crate::models::{FootageRecord, ItemId, StagingLayout};
use crate::paths::{folder_relative_path, long_path, SourceRemap};

/// Where one footage item will be copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootagePlan {
    pub item_id: ItemId,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Map every record to a destination under `layout.footage_root` that mirrors
/// its logical folder. Records that share a source and destination share a
/// copy; a different source aimed at a taken destination gets a numeric
/// suffix. Destinations are compared case-insensitively, since `bg.mp4` and
/// `BG.mp4` are the same file on macOS and Windows volumes and in most
/// extracted archives.
pub fn plan_footage(footage: &[FootageRecord], layout: &StagingLayout) -> Vec<FootagePlan> {
    // Lowercased destination -> (owning source, destination as first planned)
    let mut claimed: HashMap<String, (PathBuf, PathBuf)> = HashMap::new();
    let mut plans = Vec::with_capacity(footage.len());

    for record in footage {
        let folder = layout.footage_root.join(folder_relative_path(&record.folder_path, &layout.root_label));
        let mut destination = folder.join(&record.file_name);

        let mut counter = 1;
        while let Some((owner, taken)) = claimed.get(&claim_key(&destination)) {
            if owner == &record.source_path {
                destination = taken.clone();
                break;
            }
            destination = folder.join(suffixed_name(&record.file_name, counter));
            counter += 1;
        }
        claimed.entry(claim_key(&destination))
            .or_insert_with(|| (record.source_path.clone(), destination.clone()));

        plans.push(FootagePlan {
            item_id: record.item_id,
            source: record.source_path.clone(),
            destination,
        });
    }

    plans
}

fn claim_key(destination: &Path) -> String {
    destination.to_string_lossy().to_lowercase()
}

/// Add a numeric suffix before the extension: `bg.mp4` -> `bg_1.mp4`
fn suffixed_name(file_name: &str, counter: usize) -> String {
    let path = Path::new(file_name);
    let stem = path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, counter, ext.to_string_lossy()),
        None => format!("{}_{}", stem, counter),
    }
}

/// Copy every footage file into `layout.footage_root`, mirroring the
/// project's folder tree.
///
/// Sources under a directory that was renamed aside are read through
/// `remap`. All copies are attempted; failures are reported together as
/// [`CollectError::CollectFootage`] with the original source paths. On success
/// the plan is returned so callers can relink items to the copies.
pub async fn copy_footage(
    footage: &[FootageRecord],
    layout: &StagingLayout,
    remap: &SourceRemap,
    concurrency: usize,
) -> Result<Vec<FootagePlan>, CollectError> {
    if footage.is_empty() {
        return Ok(Vec::new());
    }

    tokio::fs::create_dir_all(long_path(&layout.footage_root))
        .await
        .map_err(|e| CollectError::io(Stage::CreateStaging, &layout.footage_root, e))?;

    let plans = plan_footage(footage, layout);

    // Items sharing a destination are copied once
    let mut copies: Vec<&FootagePlan> = Vec::new();
    for plan in &plans {
        if !copies.iter().any(|c| c.destination == plan.destination) {
            copies.push(plan);
        }
    }
    info!(
        "Collecting {} footage file(s) for {} item(s) into {}",
        copies.len(),
        plans.len(),
        layout.footage_root.display()
    );

    let results = run_bounded(copies.clone(), concurrency, |plan| async move {
        copy_into_folder(&remap.apply(&plan.source), &plan.destination).await
    })
    .await;

    let mut failures = CopyFailures::new();
    for (plan, result) in copies.iter().zip(results) {
        if let Err(e) = result {
            failures.record(&plan.source, &e);
        }
    }

    if failures.is_empty() {
        info!("Collected {} footage file(s)", copies.len());
        Ok(plans)
    } else {
        failures.report_permission_failures("footage");
        Err(CollectError::CollectFootage { failed: failures.into_paths() })
    }
}

async fn copy_into_folder(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        // Concurrent creation of the same folder is fine: create_dir_all is idempotent
        tokio::fs::create_dir_all(long_path(parent)).await?;
        debug!("Ensured folder {}", parent.display());
    }
    copy_file(source, destination).await.map(|_| ())
}
