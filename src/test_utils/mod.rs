//! Test utilities for the project collector
//!
//! This module provides common testing utilities, helpers, and generators
//! for use across all unit test modules.

#![cfg(test)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::host::{HostFont, ItemKind, ProjectItem};
use crate::models::{FontRecord, FootageRecord, ItemId};

/// Creates a temporary directory that is automatically cleaned up
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Writes `content` to `path`, creating parent directories
pub fn write_file(path: &Path, content: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

/// Builds a minimal TrueType font containing only a `name` table with the
/// given (name ID, value) records, encoded for the Windows platform.
pub fn build_font(names: &[(u16, &str)]) -> Vec<u8> {
    build_font_at(names, 0)
}

/// Builds a font collection (`.ttc`) with one face per entry of `faces`.
pub fn build_font_collection(faces: &[&[(u16, &str)]]) -> Vec<u8> {
    let header_len = 12 + 4 * faces.len();
    let mut body = Vec::new();
    let mut offsets = Vec::new();

    for names in faces {
        let offset = header_len + body.len();
        offsets.push(offset as u32);
        body.extend(build_font_at(names, offset));
    }

    let mut data = Vec::new();
    data.extend_from_slice(b"ttcf");
    data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    data.extend_from_slice(&(faces.len() as u32).to_be_bytes());
    for offset in offsets {
        data.extend_from_slice(&offset.to_be_bytes());
    }
    data.extend(body);
    data
}

// Table offsets inside an sfnt are relative to the start of the file, so a
// face embedded in a collection needs to know where it will land.
fn build_font_at(names: &[(u16, &str)], base: usize) -> Vec<u8> {
    let mut storage = Vec::new();
    let mut records = Vec::new();
    for (name_id, value) in names {
        let encoded: Vec<u8> = value.encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        records.push((*name_id, encoded.len() as u16, storage.len() as u16));
        storage.extend(encoded);
    }

    let mut table = Vec::new();
    table.extend_from_slice(&0u16.to_be_bytes());
    table.extend_from_slice(&(records.len() as u16).to_be_bytes());
    table.extend_from_slice(&((6 + 12 * records.len()) as u16).to_be_bytes());
    for (name_id, length, offset) in records {
        table.extend_from_slice(&3u16.to_be_bytes());
        table.extend_from_slice(&1u16.to_be_bytes());
        table.extend_from_slice(&0x0409u16.to_be_bytes());
        table.extend_from_slice(&name_id.to_be_bytes());
        table.extend_from_slice(&length.to_be_bytes());
        table.extend_from_slice(&offset.to_be_bytes());
    }
    table.extend(storage);

    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    font.extend_from_slice(&1u16.to_be_bytes());
    font.extend_from_slice(&[0u8; 6]);
    font.extend_from_slice(b"name");
    font.extend_from_slice(&0u32.to_be_bytes());
    font.extend_from_slice(&((base + 12 + 16) as u32).to_be_bytes());
    font.extend_from_slice(&(table.len() as u32).to_be_bytes());
    font.extend(table);
    font
}

/// Test data generators for common types
pub mod generators {
    use super::*;

    pub fn footage_record(id: u32, source: &Path, folder: &str) -> FootageRecord {
        FootageRecord {
            item_id: ItemId(id),
            file_name: source.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            source_path: source.to_path_buf(),
            folder_path: folder.to_string(),
            missing: false,
        }
    }

    pub fn font_record(name: &str, source: &Path) -> FontRecord {
        FontRecord {
            name: name.to_string(),
            extension: source.extension().map(|e| e.to_string_lossy().to_string()),
            source_path: Some(source.to_path_buf()),
        }
    }

    pub fn footage_item(id: u32, source: &Path, folder: &str) -> ProjectItem {
        ProjectItem {
            id: ItemId(id),
            kind: ItemKind::Footage,
            name: source.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            source_path: Some(source.to_string_lossy().to_string()),
            folder_path: folder.to_string(),
            missing: false,
            fonts: Vec::new(),
        }
    }

    pub fn text_layer(id: u32, fonts: &[(&str, Option<&Path>)]) -> ProjectItem {
        ProjectItem {
            id: ItemId(id),
            kind: ItemKind::TextLayer,
            name: format!("Text {}", id),
            source_path: None,
            folder_path: "Root".to_string(),
            missing: false,
            fonts: fonts.iter()
                .map(|(name, location)| HostFont {
                    name: name.to_string(),
                    location: location.map(|p| p.to_string_lossy().to_string()),
                })
                .collect(),
        }
    }
}
