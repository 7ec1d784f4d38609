//! Reconciliation result types

use crate::error::MoveFailure;
use crate::types::ContentHash;
use serde::Serialize;

/// Whether moves are applied to disk or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    DryRun,
    Execute,
}

impl Mode {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Mode::DryRun)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::DryRun => "DRY RUN",
            Mode::Execute => "EXECUTE",
        }
    }
}

/// A file that must move to satisfy the target layout. Paths are relative to
/// the base directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Move {
    pub source: String,
    pub destination: String,
    pub hash: ContentHash,
}

/// A move that was not carried out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedMove {
    #[serde(flatten)]
    pub planned: Move,
    pub failure: MoveFailure,
}

/// A hash present in only one of the two maps
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Unmatched {
    pub path: String,
    pub hash: ContentHash,
}

/// Everything one reconciliation did (or would do in dry-run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub mode: Mode,
    pub moved: Vec<Move>,
    pub failed: Vec<FailedMove>,
    /// In the target but absent from the current map
    pub missing: Vec<Unmatched>,
    /// In the current map but absent from the target
    pub extra: Vec<Unmatched>,
    /// Directories created to make destinations writable, relative to the base
    pub created_dirs: Vec<String>,
    /// Target hashes already at their target path
    pub in_place: usize,
}

impl ReconciliationResult {
    pub(crate) fn new(mode: Mode) -> Self {
        Self {
            mode,
            moved: Vec::new(),
            failed: Vec::new(),
            missing: Vec::new(),
            extra: Vec::new(),
            created_dirs: Vec::new(),
            in_place: 0,
        }
    }

    pub fn successful_moves(&self) -> usize {
        self.moved.len()
    }

    pub fn failed_moves(&self) -> usize {
        self.failed.len()
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn extra_count(&self) -> usize {
        self.extra.len()
    }

    /// No moves were needed and none failed.
    pub fn is_settled(&self) -> bool {
        self.moved.is_empty() && self.failed.is_empty()
    }
}
