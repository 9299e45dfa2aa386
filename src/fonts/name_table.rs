//! Reader for the `name` table of TrueType/OpenType fonts and collections.
//!
//! Only the handful of name IDs needed to confirm a font's identity are
//! decoded. Layout reference: the OpenType `sfnt` table directory followed
//! by a `name` table with 12-byte name records.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::constants::FONT_NAME_IDS;

const TTC_TAG: &[u8; 4] = b"ttcf";
const NAME_TAG: &[u8; 4] = b"name";
const SFNT_VERSIONS: &[[u8; 4]] = &[
    [0x00, 0x01, 0x00, 0x00],
    *b"OTTO",
    *b"true",
    *b"typ1",
];

const TABLE_DIRECTORY_HEADER_LEN: usize = 12;
const TABLE_RECORD_LEN: usize = 16;
const NAME_HEADER_LEN: usize = 6;
const NAME_RECORD_LEN: usize = 12;

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_MACINTOSH: u16 = 1;
const PLATFORM_WINDOWS: u16 = 3;

/// Read a font file and return the identifying names it declares.
pub fn read_font_names(path: &Path) -> Result<Vec<String>> {
    let data = fs::read(path)
        .context(format!("Failed to read font file {}", path.display()))?;
    parse_font_names(&data)
        .context(format!("Failed to parse font file {}", path.display()))
}

/// Names (family, full, PostScript, typographic family) declared by every
/// face in `data`, deduplicated in order of appearance.
pub fn parse_font_names(data: &[u8]) -> Result<Vec<String>> {
    let tag = data.get(0..4).ok_or_else(|| anyhow!("File too short to be a font"))?;

    let offsets = if tag == TTC_TAG {
        let count = read_u32(data, 8)? as usize;
        (0..count)
            .map(|i| read_u32(data, 12 + i * 4).map(|o| o as usize))
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![0]
    };

    let mut names = Vec::new();
    for offset in offsets {
        for name in parse_face(data, offset)? {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn parse_face(data: &[u8], offset: usize) -> Result<Vec<String>> {
    let version = slice(data, offset, 4)?;
    if !SFNT_VERSIONS.iter().any(|v| v == version) {
        bail!("Unsupported font format (version tag {:02x?})", version);
    }

    let num_tables = read_u16(data, offset + 4)? as usize;
    for i in 0..num_tables {
        let record = offset + TABLE_DIRECTORY_HEADER_LEN + i * TABLE_RECORD_LEN;
        if slice(data, record, 4)? == NAME_TAG {
            let table_offset = read_u32(data, record + 8)? as usize;
            let table_len = read_u32(data, record + 12)? as usize;
            let table = slice(data, table_offset, table_len)?;
            return parse_name_table(table);
        }
    }

    bail!("Font has no name table")
}

fn parse_name_table(table: &[u8]) -> Result<Vec<String>> {
    let count = read_u16(table, 2)? as usize;
    let storage = read_u16(table, 4)? as usize;

    let mut names = Vec::new();
    for i in 0..count {
        let record = NAME_HEADER_LEN + i * NAME_RECORD_LEN;
        let platform = read_u16(table, record)?;
        let encoding = read_u16(table, record + 2)?;
        let name_id = read_u16(table, record + 6)?;
        let length = read_u16(table, record + 8)? as usize;
        let string_offset = read_u16(table, record + 10)? as usize;

        if !FONT_NAME_IDS.contains(&name_id) {
            continue;
        }

        let bytes = match slice(table, storage + string_offset, length) {
            Ok(bytes) => bytes,
            // One broken record should not hide the valid ones
            Err(_) => continue,
        };

        let decoded = match platform {
            PLATFORM_UNICODE | PLATFORM_WINDOWS => decode_utf16_be(bytes),
            PLATFORM_MACINTOSH if encoding == 0 => Some(decode_mac_roman(bytes)),
            _ => None,
        };

        if let Some(name) = decoded {
            let name = name.trim().to_string();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn decode_utf16_be(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

// The upper half of Mac Roman is approximated as Latin-1; font names are
// almost always ASCII.
fn decode_mac_roman(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset.checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| anyhow!("Font data truncated at offset {}", offset))
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    let b = slice(data, offset, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let b = slice(data, offset, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_font, build_font_collection};

    #[test]
    fn test_parse_single_font() -> Result<()> {
        let data = build_font(&[(1, "Arial"), (4, "Arial Bold"), (6, "Arial-BoldMT"), (2, "Bold")]);
        let names = parse_font_names(&data)?;
        assert_eq!(names, vec!["Arial", "Arial Bold", "Arial-BoldMT"]);
        Ok(())
    }

    #[test]
    fn test_parse_collection_merges_faces() -> Result<()> {
        let data = build_font_collection(&[
            &[(1, "Helvetica"), (6, "Helvetica")],
            &[(1, "Helvetica"), (6, "Helvetica-Bold")],
        ]);
        let names = parse_font_names(&data)?;
        assert_eq!(names, vec!["Helvetica", "Helvetica-Bold"]);
        Ok(())
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_font_names(b"not a font at all").is_err());
        assert!(parse_font_names(b"ab").is_err());
    }

    #[test]
    fn test_truncated_table_directory() {
        let mut data = build_font(&[(6, "Arial-BoldMT")]);
        data.truncate(20);
        assert!(parse_font_names(&data).is_err());
    }
}
