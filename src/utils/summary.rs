use serde_json::json;
use uuid::Uuid;
use anyhow::{Result, Context};

use crate::models::CollectionReport;

/// Create a JSON summary of a finished collection.
///
/// Every summary gets a fresh collection id so repeated runs of the same
/// project can be told apart.
///
/// # Example Output
///
/// ```json
/// {
///   "collection_id": "550e8400-e29b-41d4-a716-446655440000",
///   "project": "/p/show.aep",
///   "archive": "/tmp/show.zip",
///   "archive_sha256": "ba78...",
///   "fonts_collected": 2,
///   "footage_collected": 14,
///   "started_at": "2024-01-15T14:30:52+00:00",
///   "finished_at": "2024-01-15T14:31:07+00:00"
/// }
/// ```
pub fn create_collection_summary(report: &CollectionReport) -> Result<String> {
    let summary = json!({
        "collection_id": Uuid::new_v4().to_string(),
        "project": report.project_path,
        "archive": report.archive_path,
        "archive_sha256": report.archive_sha256,
        "fonts_collected": report.fonts_collected,
        "footage_collected": report.footage_collected,
        "started_at": report.started_at,
        "finished_at": report.finished_at,
        "os": std::env::consts::OS,
        "collector_version": env!("CARGO_PKG_VERSION"),
    });

    serde_json::to_string_pretty(&summary).context("Failed to serialize collection summary")
}
