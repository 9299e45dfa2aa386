use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

use log::{debug, info};

use crate::collectors::copy_file;
use crate::collectors::failures::CopyFailures;
use crate::collectors::pool::run_bounded;
use crate::constants::ALLOWED_FONT_EXTENSIONS;
use crate::errors::{CollectError, Stage};
use crate::models::{FontRecord, StagingLayout};
use crate::paths::{long_path, sanitize_file_name, SourceRemap};

/// A font copy after deduplication
#[derive(Debug, Clone, PartialEq, Eq)]
enum FontCopy {
    Copy { source: PathBuf, destination: PathBuf },
    Rejected { source: PathBuf, reason: String },
}

/// Copy every font into `layout.fonts_root`, named `{name}.{extension}`.
///
/// Fonts are deduplicated by (name, source path). All copies are attempted;
/// if any fails the call returns [`CollectError::CollectFonts`] listing the
/// failed sources once every attempt has finished. Returns the number of
/// files written.
pub async fn copy_fonts(
    fonts: &[FontRecord],
    layout: &StagingLayout,
    remap: &SourceRemap,
    concurrency: usize,
) -> Result<usize, CollectError> {
    if fonts.is_empty() {
        return Ok(0);
    }

    tokio::fs::create_dir_all(long_path(&layout.fonts_root))
        .await
        .map_err(|e| CollectError::io(Stage::CreateStaging, &layout.fonts_root, e))?;

    let plan = plan_fonts(fonts, layout);
    info!("Collecting {} font file(s) into {}", plan.len(), layout.fonts_root.display());

    let results = run_bounded(plan.clone(), concurrency, |entry| async move {
        match entry {
            FontCopy::Copy { source, destination } => {
                copy_file(&remap.apply(&source), &destination).await.map(|_| ())
            }
            FontCopy::Rejected { reason, .. } => {
                Err(io::Error::new(io::ErrorKind::InvalidInput, reason))
            }
        }
    })
    .await;

    let mut failures = CopyFailures::new();
    let mut copied = 0;
    for (entry, result) in plan.iter().zip(results) {
        let source = match entry {
            FontCopy::Copy { source, .. } | FontCopy::Rejected { source, .. } => source,
        };
        match result {
            Ok(()) => copied += 1,
            Err(e) => failures.record(source, &e),
        }
    }

    if failures.is_empty() {
        info!("Collected {} font file(s)", copied);
        Ok(copied)
    } else {
        failures.report_permission_failures("font");
        Err(CollectError::CollectFonts { failed: failures.into_paths() })
    }
}

fn plan_fonts(fonts: &[FontRecord], layout: &StagingLayout) -> Vec<FontCopy> {
    let mut seen = HashSet::new();
    let mut destinations = HashSet::new();
    let mut plan = Vec::new();

    for font in fonts {
        if !seen.insert((font.name.clone(), font.source_path.clone())) {
            continue;
        }

        let source = match &font.source_path {
            Some(source) => source.clone(),
            None => {
                plan.push(FontCopy::Rejected {
                    source: PathBuf::from(&font.name),
                    reason: format!("font {} has no file location", font.name),
                });
                continue;
            }
        };

        let extension = font.extension.clone().unwrap_or_default();
        if !ALLOWED_FONT_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
            plan.push(FontCopy::Rejected {
                reason: format!("unsupported font extension {:?}", extension),
                source,
            });
            continue;
        }

        let destination = layout.fonts_root
            .join(format!("{}.{}", sanitize_file_name(&font.name), extension));

        // Same logical name from another file: the first copy already satisfies it
        if !destinations.insert(destination.clone()) {
            debug!("Skipping {}: {} is already collected", source.display(), destination.display());
            continue;
        }

        plan.push(FontCopy::Copy { source, destination });
    }

    plan
}
