//! Relinking footage references through the host.
//!
//! A run builds two maps from the same footage set: forward (item to its
//! staging copy) and backward (item to its original path, captured before
//! anything moves). [`relink`] applies either one and saves the document.
//! [`restore`] is the unwind flavour: it keeps going past failed items.

use log::{debug, info, warn};

use crate::collectors::FootagePlan;
use crate::errors::CollectError;
use crate::host::HostDocument;
use crate::models::{FootageRecord, RelinkMap};

/// Item to staging copy, from a footage plan
pub fn forward_map(plans: &[FootagePlan]) -> RelinkMap {
    plans.iter()
        .map(|plan| (plan.item_id, plan.destination.clone()))
        .collect()
}

/// Item to original source path
pub fn backward_map(footage: &[FootageRecord]) -> RelinkMap {
    footage.iter()
        .map(|record| (record.item_id, record.source_path.clone()))
        .collect()
}

/// Repoint every item in `map` and persist the document.
///
/// Stops at the first host failure; the orchestrator's compensating relink
/// covers items that were already repointed.
pub async fn relink(host: &dyn HostDocument, map: &RelinkMap) -> Result<(), CollectError> {
    if map.is_empty() {
        return Ok(());
    }

    for (item_id, path) in map.iter() {
        debug!("Relinking item {} to {}", item_id, path.display());
        host.replace_source(*item_id, path)
            .await
            .map_err(|e| CollectError::host("replace_source", e))?;
    }

    host.save()
        .await
        .map_err(|e| CollectError::host("save", e))?;

    info!("Relinked {} item(s)", map.len());
    Ok(())
}

/// Point every item in `map` back at its original path, best effort.
///
/// Every entry is attempted and the document is saved even when some items
/// fail, so items that were restored stay restored. All failures come back
/// together in one error.
pub async fn restore(host: &dyn HostDocument, map: &RelinkMap) -> anyhow::Result<()> {
    if map.is_empty() {
        return Ok(());
    }

    let mut failures = Vec::new();
    for (item_id, path) in map.iter() {
        debug!("Restoring item {} to {}", item_id, path.display());
        if let Err(e) = host.replace_source(*item_id, path).await {
            warn!("Failed to restore item {} to {}: {:#}", item_id, path.display(), e);
            failures.push(format!("item {}: {:#}", item_id, e));
        }
    }

    if let Err(e) = host.save().await {
        failures.push(format!("save: {:#}", e));
    }

    if failures.is_empty() {
        info!("Restored {} item(s)", map.len());
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} item(s) not restored: {}",
            failures.len(),
            map.len(),
            failures.join("; ")
        )
    }
}
