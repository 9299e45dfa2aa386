//! Asset collectors.
//!
//! Collectors copy the files a project references into the staging layout
//! next to the project file. Every copy in a batch is attempted, even after
//! one fails; failures are gathered and reported together once the batch is
//! done, so partial copies stay on disk for the orchestrator to clean up.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        CollectionOrchestrator           │
//! ├─────────────────────────────────────────┤
//! │  ┌──────────────┬──────────────────┐    │
//! │  │ FontCollector│ FootageCollector │    │
//! │  └──────────────┴──────────────────┘    │
//! ├─────────────────────────────────────────┤
//! │   Bounded worker pool + failure list    │
//! └─────────────────────────────────────────┘
//! ```

use std::io;
use std::path::Path;

use log::debug;

use crate::paths;

/// Font collection into the `Fonts` staging directory
pub mod fonts;

/// Footage collection into the `(Footage)` staging directory
pub mod footage;

/// Bounded concurrent execution of per-file work
pub mod pool;

/// Copy failure aggregation and reporting
pub mod failures;

pub use fonts::copy_fonts;
pub use footage::{copy_footage, plan_footage, FootagePlan};

/// Copy one file, quoting long paths where the platform needs it.
pub(crate) async fn copy_file(source: &Path, destination: &Path) -> io::Result<u64> {
    debug!("Copying {} to {}", source.display(), destination.display());
    tokio::fs::copy(paths::long_path(source), paths::long_path(destination)).await
}
