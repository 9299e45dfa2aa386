//! Archive-side utilities.
//!
//! ## Components
//!
//! - **Compression**: the archiver that packs the project file and its
//!   staging roots into one ZIP
//! - **Hashing**: SHA-256 of the produced archive
//! - **Summary**: JSON report of a finished collection
//!
//! ## Creating an Archive
//!
//! ```no_run
//! use project_collector::models::ArchiveEntry;
//! use project_collector::utils::compress::archive;
//! use std::path::{Path, PathBuf};
//!
//! # fn example() -> anyhow::Result<()> {
//! let entries = vec![ArchiveEntry {
//!     source: PathBuf::from("/projects/show/show.aep"),
//!     destination_name: "show.aep".to_string(),
//!     required: true,
//! }];
//!
//! let zip_path = archive(Path::new("/tmp/show.zip"), &entries, 1)?;
//! println!("Created archive: {}", zip_path.display());
//! # Ok(())
//! # }
//! ```

/// Collection summary generation
pub mod summary;

/// ZIP archive creation
pub mod compress;

/// Cryptographic hash calculation
pub mod hash;
