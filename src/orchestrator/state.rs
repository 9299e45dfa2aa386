use std::fmt;

use serde::Serialize;

/// Stages of a collection run, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollectionState {
    Idle,
    Validating,
    StagingFootageRoot,
    StagingFontsRoot,
    CopyingFootage,
    CopyingFonts,
    Relinking,
    Archiving,
    Unwinding,
    Done,
    Failed,
}

impl CollectionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CollectionState::Done | CollectionState::Failed)
    }
}

impl fmt::Display for CollectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CollectionState::Idle => "idle",
            CollectionState::Validating => "validating",
            CollectionState::StagingFootageRoot => "staging footage root",
            CollectionState::StagingFontsRoot => "staging fonts root",
            CollectionState::CopyingFootage => "copying footage",
            CollectionState::CopyingFonts => "copying fonts",
            CollectionState::Relinking => "relinking",
            CollectionState::Archiving => "archiving",
            CollectionState::Unwinding => "unwinding",
            CollectionState::Done => "done",
            CollectionState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Records every state a run passes through
#[derive(Debug, Clone)]
pub struct StateTracker {
    history: Vec<CollectionState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self { history: vec![CollectionState::Idle] }
    }

    pub fn enter(&mut self, state: CollectionState) {
        log::info!("Collection: {}", state);
        self.history.push(state);
    }

    pub fn current(&self) -> CollectionState {
        self.history.last().copied().unwrap_or(CollectionState::Idle)
    }

    pub fn history(&self) -> &[CollectionState] {
        &self.history
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}
