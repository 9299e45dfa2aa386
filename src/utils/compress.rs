use std::fs;
use std::io::{Read, Write, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use log::{info, debug};
use walkdir::WalkDir;
use zip::{write::FileOptions, ZipWriter};

use crate::constants::{
    COMPRESSION_CHUNK_SIZE as CHUNK_SIZE,
    COMPRESSED_EXTENSIONS,
    ZIP64_THRESHOLD,
};
use crate::models::ArchiveEntry;
use crate::paths::long_path;

/// Pick ZIP options for one file.
///
/// Media that is already compressed is stored as-is; everything else is
/// deflated at `level`. Files past 4GB get ZIP64 headers.
pub fn get_compression_options(path: &Path, size: u64, level: i32) -> FileOptions {
    let already_compressed = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => COMPRESSED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    };

    let options = if already_compressed {
        FileOptions::default().compression_method(zip::CompressionMethod::Stored)
    } else {
        FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(level))
    };

    options
        .unix_permissions(0o644)
        .large_file(size >= ZIP64_THRESHOLD)
}

/// Write `entries` into a single ZIP at `output_path`.
///
/// Directory sources are added recursively under their destination name,
/// files individually. An absent source is skipped when it is optional and
/// fails the whole archive when it is required. On any failure the partial
/// output is deleted.
pub fn archive(output_path: &Path, entries: &[ArchiveEntry], compression_level: i32) -> Result<PathBuf> {
    let start = Instant::now();

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(long_path(parent))
            .context(format!("Failed to create output directory {}", parent.display()))?;
    }

    let file = fs::File::create(long_path(output_path))
        .context(format!("Failed to create archive {}", output_path.display()))?;

    match write_entries(ZipWriter::new(file), entries, compression_level) {
        Ok(count) => {
            info!(
                "Created archive {} with {} file(s) in {:.2?}",
                output_path.display(),
                count,
                start.elapsed()
            );
            Ok(output_path.to_path_buf())
        }
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(long_path(output_path)) {
                debug!("Could not remove partial archive {}: {}", output_path.display(), remove_err);
            }
            Err(e)
        }
    }
}

fn write_entries(mut zip: ZipWriter<fs::File>, entries: &[ArchiveEntry], level: i32) -> Result<usize> {
    // Reusable buffer for streaming reads
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut count = 0;

    for entry in entries {
        let source = long_path(&entry.source);
        let metadata = match fs::metadata(&source) {
            Ok(metadata) => metadata,
            Err(_) if !entry.required => {
                debug!("Skipping optional archive entry {}", entry.source.display());
                continue;
            }
            Err(e) => {
                return Err(e).context(format!(
                    "Required archive entry {} is missing",
                    entry.source.display()
                ));
            }
        };

        if metadata.is_dir() {
            count += add_directory(&mut zip, &source, &entry.destination_name, level, &mut buffer)?;
        } else {
            add_file(&mut zip, &source, &entry.destination_name, metadata.len(), level, &mut buffer)?;
            count += 1;
        }
    }

    zip.finish().context("Failed to finalize archive")?;
    Ok(count)
}

fn add_directory(
    zip: &mut ZipWriter<fs::File>,
    root: &Path,
    destination_name: &str,
    level: i32,
    buffer: &mut [u8],
) -> Result<usize> {
    let mut count = 0;
    zip.add_directory(format!("{}/", destination_name), FileOptions::default())
        .context(format!("Failed to add directory {}", destination_name))?;

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.context(format!("Failed to walk {}", root.display()))?;
        let rel_path = entry.path().strip_prefix(root)
            .context("Walked entry outside its root")?;
        let name = archive_name(destination_name, rel_path);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), FileOptions::default())
                .context(format!("Failed to add directory {}", name))?;
        } else if entry.file_type().is_file() {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            add_file(zip, entry.path(), &name, size, level, buffer)?;
            count += 1;
        } else {
            debug!("Skipping non-regular entry {}", entry.path().display());
        }
    }

    Ok(count)
}

fn add_file(
    zip: &mut ZipWriter<fs::File>,
    path: &Path,
    name: &str,
    size: u64,
    level: i32,
    buffer: &mut [u8],
) -> Result<()> {
    let file = fs::File::open(path)
        .context(format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);

    zip.start_file(name, get_compression_options(path, size, level))
        .context(format!("Failed to add {} to archive", name))?;

    loop {
        let bytes_read = reader.read(buffer)
            .context(format!("Failed to read {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        zip.write_all(&buffer[..bytes_read])
            .context(format!("Failed to write {} to archive", name))?;
    }

    debug!("Archived {} as {}", path.display(), name);
    Ok(())
}

/// ZIP entry names always use forward slashes
fn archive_name(destination_name: &str, rel_path: &Path) -> String {
    let mut name = destination_name.trim_end_matches('/').to_string();
    for component in rel_path.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

/// Output location for a project: `{output_dir}/{project stem}.zip`
pub fn archive_path_for(project_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = match project_path.file_stem() {
        Some(stem) => stem.to_string_lossy().to_string(),
        None => bail!("Project path {} has no file name", project_path.display()),
    };
    Ok(output_dir.join(format!("{}.{}", stem, crate::constants::ARCHIVE_EXTENSION)))
}
