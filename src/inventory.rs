//! Asset inventory: what fonts and footage the live project references.
//!
//! [`collect`] only talks to the host. The two validators run before the
//! orchestrator mutates anything, so a run that cannot succeed leaves no
//! trace on disk.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::errors::{CollectError, FontIssue, FontProblem};
use crate::fonts::name_table::read_font_names;
use crate::host::{HostDocument, ItemKind};
use crate::models::{AssetInventory, FontRecord, FootageRecord};
use crate::paths;

/// Query the host for every referenced font and footage file.
pub async fn collect(host: &dyn HostDocument) -> Result<AssetInventory, CollectError> {
    let items = host.items()
        .await
        .map_err(|e| CollectError::host("items", e))?;

    let mut inventory = AssetInventory::default();

    for item in items {
        match item.kind {
            ItemKind::Footage => {
                // Solids and placeholders have no backing file
                let raw = match item.source_path.as_deref() {
                    Some(raw) if !raw.trim().is_empty() => raw,
                    _ => continue,
                };
                let source_path = paths::resolve(raw)?;
                let file_name = source_path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| item.name.clone());

                inventory.footage.push(FootageRecord {
                    item_id: item.id,
                    file_name,
                    source_path,
                    folder_path: item.folder_path.clone(),
                    missing: item.missing,
                });
            }
            ItemKind::TextLayer => {
                for font in item.fonts {
                    let source_path = match font.location.as_deref() {
                        Some(raw) if !raw.trim().is_empty() => Some(paths::resolve(raw)?),
                        _ => None,
                    };
                    let extension = source_path.as_deref()
                        .and_then(Path::extension)
                        .map(|e| e.to_string_lossy().to_string());

                    inventory.fonts.push(FontRecord {
                        name: font.name,
                        extension,
                        source_path,
                    });
                }
            }
            ItemKind::Composition => {}
        }
    }

    info!(
        "Inventory: {} font reference(s), {} footage item(s)",
        inventory.fonts.len(),
        inventory.footage.len()
    );
    Ok(inventory)
}

/// Fail with every missing footage item if any is missing.
pub fn validate_footage(footage: &[FootageRecord]) -> Result<(), CollectError> {
    let missing: Vec<String> = footage.iter()
        .filter(|record| record.missing)
        .map(|record| record.source_path.display().to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CollectError::MissingAssets(missing))
    }
}

/// Check that every font can be collected. With `verify_names`, the font file
/// must also declare the name the project uses for it.
pub fn validate_fonts(fonts: &[FontRecord], verify_names: bool) -> Result<(), CollectError> {
    validate_fonts_with(fonts, verify_names, read_font_names)
}

/// [`validate_fonts`] with the name-table reader supplied by the caller.
/// Each (name, source) pair is checked once and each file is read once, no
/// matter how many text layers use it.
fn validate_fonts_with<F>(fonts: &[FontRecord], verify_names: bool, mut read_names: F) -> Result<(), CollectError>
where
    F: FnMut(&Path) -> anyhow::Result<Vec<String>>,
{
    let mut problems: Vec<FontProblem> = Vec::new();
    let mut checked: HashSet<(&str, Option<&Path>)> = HashSet::new();
    let mut names_by_file: HashMap<PathBuf, Result<Vec<String>, String>> = HashMap::new();

    for font in fonts {
        if !checked.insert((font.name.as_str(), font.source_path.as_deref())) {
            continue;
        }
        if problems.iter().any(|p| p.name == font.name) {
            continue;
        }
        if let Some(issue) = check_font(font, verify_names, &mut names_by_file, &mut read_names) {
            problems.push(FontProblem { name: font.name.clone(), issue });
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(CollectError::InvalidFont(problems))
    }
}

fn check_font<F>(
    font: &FontRecord,
    verify_names: bool,
    names_by_file: &mut HashMap<PathBuf, Result<Vec<String>, String>>,
    read_names: &mut F,
) -> Option<FontIssue>
where
    F: FnMut(&Path) -> anyhow::Result<Vec<String>>,
{
    let source = match &font.source_path {
        Some(source) => source,
        None => return Some(FontIssue::MissingLocation),
    };
    if font.extension.as_deref().map_or(true, str::is_empty) {
        return Some(FontIssue::MissingExtension);
    }
    if !verify_names {
        return None;
    }

    let names = names_by_file.entry(source.clone())
        .or_insert_with(|| read_names(source).map_err(|e| format!("{:#}", e)));

    match names {
        Ok(found) => {
            if found.iter().any(|name| name.eq_ignore_ascii_case(&font.name)) {
                debug!("Font {} verified against {}", font.name, source.display());
                None
            } else {
                Some(FontIssue::NameMismatch { found: found.clone() })
            }
        }
        Err(reason) => Some(FontIssue::Unreadable(reason.clone())),
    }
}
