//! Copy failure tracking and reporting
//!
//! Collectors record every failed copy here. Permission problems get a
//! summary with guidance, since they are the failures users can usually fix
//! themselves.

use std::io;
use std::path::{Path, PathBuf};

use log::warn;

/// Failed copies of one collection batch, in input order
#[derive(Debug, Default)]
pub struct CopyFailures {
    failed: Vec<(PathBuf, String)>,
    permission_denied: Vec<PathBuf>,
}

impl CopyFailures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed copy of `source`
    pub fn record(&mut self, source: &Path, error: &io::Error) {
        warn!("Failed to copy {}: {}", source.display(), error);
        if Self::is_permission_error(error) {
            self.permission_denied.push(source.to_path_buf());
        }
        self.failed.push((source.to_path_buf(), error.to_string()));
    }

    /// Check if an error indicates a permission problem
    pub fn is_permission_error(error: &io::Error) -> bool {
        if error.kind() == io::ErrorKind::PermissionDenied {
            return true;
        }
        let msg = error.to_string();
        msg.contains("Permission denied") || msg.contains("Access is denied")
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failed.len()
    }

    /// Source paths of every failed copy
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.failed.into_iter().map(|(path, _)| path).collect()
    }

    /// Log a summary of permission failures with guidance
    pub fn report_permission_failures(&self, what: &str) {
        if self.permission_denied.is_empty() {
            return;
        }

        warn!(
            "The following {} {} file(s) could not be read due to insufficient permissions:",
            self.permission_denied.len(),
            what
        );
        for path in &self.permission_denied {
            warn!("  • {}", path.display());
        }

        #[cfg(target_os = "windows")]
        {
            warn!("Check that your account can read these files and that no other program has them locked.");
        }

        #[cfg(target_os = "macos")]
        {
            warn!("Grant the host application Full Disk Access in System Settings > Privacy & Security,");
            warn!("or check the file permissions with 'ls -la'.");
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            warn!("Check the file permissions with 'ls -la' and make them readable by your user.");
        }
    }
}
