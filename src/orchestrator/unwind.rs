//! Compensating actions and the stack that replays them.
//!
//! Every mutation the orchestrator performs registers its reversal here as
//! data, not as a closure, so the unwind order can be inspected in tests.
//! [`UnwindStack::unwind`] runs the actions last-registered-first and keeps
//! going past individual failures.

use std::fmt;
use std::io;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::host::HostDocument;
use crate::models::RelinkMap;
use crate::paths::long_path;
use crate::relink::restore;

/// One reversal registered during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensatingAction {
    /// Move a renamed-aside directory back to its original name
    RenameBack { from: PathBuf, to: PathBuf },
    /// Remove a staging directory if it exists
    DeleteDir { path: PathBuf },
    /// Point the document back at these paths
    RelinkTo { map: RelinkMap },
}

impl fmt::Display for CompensatingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompensatingAction::RenameBack { from, to } => {
                write!(f, "rename {} back to {}", from.display(), to.display())
            }
            CompensatingAction::DeleteDir { path } => write!(f, "delete {}", path.display()),
            CompensatingAction::RelinkTo { map } => write!(f, "relink {} item(s) to original paths", map.len()),
        }
    }
}

/// Failures collected while unwinding
#[derive(Debug, Default)]
pub struct UnwindReport {
    pub completed: usize,
    pub failures: Vec<String>,
}

impl UnwindReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct UnwindStack {
    actions: Vec<CompensatingAction>,
}

impl UnwindStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: CompensatingAction) {
        debug!("Registered compensating action: {}", action);
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions in the order [`unwind`](Self::unwind) will run them
    pub fn pending(&self) -> impl Iterator<Item = &CompensatingAction> {
        self.actions.iter().rev()
    }

    /// Run every action in reverse registration order. Failures are logged
    /// and collected; they never stop the remaining actions.
    pub async fn unwind(&mut self, host: &dyn HostDocument) -> UnwindReport {
        let mut report = UnwindReport::default();
        if self.actions.is_empty() {
            return report;
        }

        info!("Unwinding {} compensating action(s)", self.actions.len());
        while let Some(action) = self.actions.pop() {
            match run_action(&action, host).await {
                Ok(()) => {
                    debug!("Unwound: {}", action);
                    report.completed += 1;
                }
                Err(e) => {
                    warn!("Failed to {}: {:#}", action, e);
                    report.failures.push(format!("failed to {}: {:#}", action, e));
                }
            }
        }
        report
    }
}

async fn run_action(action: &CompensatingAction, host: &dyn HostDocument) -> anyhow::Result<()> {
    match action {
        CompensatingAction::RenameBack { from, to } => {
            tokio::fs::rename(long_path(from), long_path(to)).await?;
        }
        CompensatingAction::DeleteDir { path } => {
            match tokio::fs::remove_dir_all(long_path(path)).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        CompensatingAction::RelinkTo { map } => {
            restore(host, map).await?;
        }
    }
    Ok(())
}
