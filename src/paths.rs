//! Path resolution for user- and host-supplied paths.
//!
//! Hosts hand back paths in several shapes: `~/...`, percent-encoded
//! `file://` URIs, relative paths. Everything that touches the filesystem
//! goes through [`resolve`] first so later stages can compare and rewrite
//! paths reliably.

use std::path::{Component, Path, PathBuf};

use crate::constants::{
    WINDOWS_LONG_PATH_PREFIX, WINDOWS_LONG_UNC_PREFIX, WINDOWS_MAX_PATH,
};
use crate::errors::CollectError;

/// Resolve a raw path against the current working directory.
pub fn resolve(raw: &str) -> Result<PathBuf, CollectError> {
    let base = std::env::current_dir()
        .map_err(|e| CollectError::InvalidPath(format!("cannot determine working directory: {}", e)))?;
    resolve_from(raw, &base)
}

/// Resolve a raw path: expand `~`, decode percent escapes, make it absolute
/// against `base` and normalize `.`/`..` lexically.
pub fn resolve_from(raw: &str, base: &Path) -> Result<PathBuf, CollectError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CollectError::InvalidPath("path is empty".to_string()));
    }
    if trimmed.contains('\0') {
        return Err(CollectError::InvalidPath(format!("path contains a null byte: {:?}", raw)));
    }

    // Percent escapes only mean something inside a URI
    let decoded = match strip_file_scheme(trimmed) {
        Some(uri_path) => urlencoding::decode(uri_path)
            .map_err(|e| CollectError::InvalidPath(format!("{}: {}", raw, e)))?
            .into_owned(),
        None => expand_home(trimmed),
    };

    let path = PathBuf::from(&decoded);
    let absolute = if path.is_absolute() || has_drive_prefix(&decoded) {
        path
    } else {
        base.join(path)
    };

    Ok(normalize(&absolute))
}

/// Replace a leading `~` with the user's home directory.
pub fn expand_home(raw: &str) -> String {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return raw.to_string(),
    };

    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.to_string_lossy(), rest),
        None => raw.to_string(),
    }
}

fn strip_file_scheme(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix("file://")?;
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);

    // file:///C:/... carries a slash in front of the drive letter
    if rest.len() > 2 && rest.starts_with('/') && has_drive_prefix(&rest[1..]) {
        Some(&rest[1..])
    } else {
        Some(rest)
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Lexically remove `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !matches!(normalized.components().next_back(), Some(Component::RootDir | Component::Prefix(_)) | None) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Prefix a path with the Windows extended-length marker when it is too long
/// for the classic API. A no-op on other platforms.
pub fn long_path(path: &Path) -> PathBuf {
    with_long_path_prefix(path, cfg!(windows))
}

/// Platform-independent core of [`long_path`].
pub fn with_long_path_prefix(path: &Path, windows: bool) -> PathBuf {
    if !windows {
        return path.to_path_buf();
    }

    let raw = path.to_string_lossy();
    if raw.chars().count() <= WINDOWS_MAX_PATH || raw.starts_with(WINDOWS_LONG_PATH_PREFIX) {
        return path.to_path_buf();
    }

    let backslashed = raw.replace('/', "\\");
    match backslashed.strip_prefix(r"\\") {
        Some(unc) => PathBuf::from(format!("{}{}", WINDOWS_LONG_UNC_PREFIX, unc)),
        None => PathBuf::from(format!("{}{}", WINDOWS_LONG_PATH_PREFIX, backslashed)),
    }
}

/// Whether a path is longer than Windows accepts without the long-path prefix.
pub fn exceeds_windows_limit(path: &Path) -> bool {
    path.to_string_lossy().chars().count() > WINDOWS_MAX_PATH
}

/// Turn a logical folder path such as `Root/Scenes/Intro` into a relative
/// directory (`Scenes/Intro`), dropping the synthetic root label.
pub fn folder_relative_path(folder_path: &str, root_label: &str) -> PathBuf {
    let mut segments = folder_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .peekable();

    if segments.peek() == Some(&root_label) {
        segments.next();
    }

    segments.collect()
}

/// Replace characters that cannot appear in a file name.
pub fn sanitize_file_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.chars().all(|c| c == '.') {
        sanitized = format!("_{}", sanitized);
    }
    sanitized
}

/// Redirects sources that lived inside a directory which has since been
/// renamed aside.
#[derive(Debug, Clone, Default)]
pub struct SourceRemap {
    roots: Vec<(PathBuf, PathBuf)>,
}

impl SourceRemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, original: PathBuf, aside: PathBuf) {
        self.roots.push((original, aside));
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Map `source` into the renamed-aside tree if it lived under a moved root.
    pub fn apply(&self, source: &Path) -> PathBuf {
        for (original, aside) in &self.roots {
            if let Ok(rest) = source.strip_prefix(original) {
                return aside.join(rest);
            }
        }
        source.to_path_buf()
    }
}
