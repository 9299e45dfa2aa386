//! Global constants for the project collector.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

// Staging layout
/// Default name of the staging directory that receives footage
pub const FOOTAGE_DIR_NAME: &str = "(Footage)";

/// Default name of the staging directory that receives fonts
pub const FONTS_DIR_NAME: &str = "Fonts";

/// Label the host puts in front of every logical folder path
pub const ROOT_FOLDER_LABEL: &str = "Root";

/// Number of hex characters used for the renamed-aside prefix
pub const ASIDE_PREFIX_LEN: usize = 8;

// Fonts
/// Font file extensions accepted by the font collector
pub const ALLOWED_FONT_EXTENSIONS: &[&str] = &["otf", "ttf", "ttc"];

/// OpenType name IDs checked against the recorded font name
/// (family, full name, PostScript name, typographic family)
pub const FONT_NAME_IDS: &[u16] = &[1, 4, 6, 16];

// Paths
/// Longest path Windows accepts without the extended-length prefix
pub const WINDOWS_MAX_PATH: usize = 255;

/// Windows extended-length path prefix
pub const WINDOWS_LONG_PATH_PREFIX: &str = r"\\?\";

/// Windows extended-length prefix for UNC shares
pub const WINDOWS_LONG_UNC_PREFIX: &str = r"\\?\UNC\";

/// Win32 ERROR_FILENAME_EXCED_RANGE
pub const WINDOWS_ERROR_FILENAME_EXCED_RANGE: i32 = 206;

// Concurrency
/// Upper bound for the default copy concurrency
pub const MAX_DEFAULT_COPY_CONCURRENCY: usize = 32;

// Archive
/// Deflate level used for archives; they are transient, so speed wins
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 1;

/// Chunk size for streaming files into the archive (512KB)
pub const COMPRESSION_CHUNK_SIZE: usize = 512 * 1024;

/// Extensions that are already compressed and are stored as-is
pub const COMPRESSED_EXTENSIONS: &[&str] = &[
    "zip", "gz", "7z", "rar", "jpg", "jpeg", "png", "gif", "mp3", "mp4", "m4a", "aac", "avi",
    "mov", "mpg", "mpeg", "mkv", "webm", "heic",
];

/// Entries at or above this size need ZIP64 headers
pub const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Archive file extension
pub const ARCHIVE_EXTENSION: &str = "zip";

// Environment overrides
pub const ENV_OUTPUT_DIR: &str = "PROJECT_COLLECTOR_OUTPUT_DIR";
pub const ENV_CONCURRENCY: &str = "PROJECT_COLLECTOR_CONCURRENCY";
pub const ENV_COMPRESSION_LEVEL: &str = "PROJECT_COLLECTOR_COMPRESSION_LEVEL";

// Error messages
pub const LONG_PATH_ADVICE: &str = "Move the project closer to the root of the drive or shorten \
the names of the folders that contain its footage, then collect again.";
