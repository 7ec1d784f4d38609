//! Move Reconciler
//!
//! Computes the moves that turn a "current" layout into a "target" layout
//! (both given as content maps over the same base directory), validates each
//! move against the filesystem, and applies it or, in dry-run mode, reports
//! what would happen.

pub mod fs;
pub mod logger;
pub mod plan;
pub mod report;

pub use logger::{CapturingLogger, LogEvent, MoveLogger, TracingLogger};
pub use plan::MovePlan;
pub use report::{FailedMove, Mode, Move, ReconciliationResult, Unmatched};

use crate::error::{MoveFailure, ReconcileError};
use crate::map::path;
use crate::map::ContentMap;
use fs::{EntryKind, FsView, LiveFs, SimulatedFs};
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::{instrument, Level};

/// Applies the move-set between two content maps under one base directory.
///
/// Not safe to run twice concurrently against the same base directory; the
/// caller must serialize runs (see [`crate::lock::RunLock`]).
pub struct Reconciler<'a> {
    base_dir: PathBuf,
    logger: &'a dyn MoveLogger,
}

impl<'a> Reconciler<'a> {
    pub fn new(base_dir: impl Into<PathBuf>, logger: &'a dyn MoveLogger) -> Self {
        Self {
            base_dir: base_dir.into(),
            logger,
        }
    }

    /// Reconcile `current` towards `target`.
    ///
    /// Per-move failures are recorded in the result. Only a missing base
    /// directory is an error.
    #[instrument(skip_all, fields(base = %self.base_dir.display(), mode = mode.label()))]
    pub fn reconcile(
        &self,
        current: &ContentMap,
        target: &ContentMap,
        mode: Mode,
    ) -> Result<ReconciliationResult, ReconcileError> {
        if !self.base_dir.is_dir() {
            return Err(ReconcileError::BaseDirNotFound(self.base_dir.clone()));
        }

        let plan = MovePlan::compute(current, target);
        let planned = plan.moves.len().to_string();
        self.logger.log(
            Level::INFO,
            "Processing file moves",
            &[("mode", mode.label()), ("count", &planned)],
        );

        let mut result = ReconciliationResult::new(mode);
        result.in_place = plan.in_place;
        match mode {
            Mode::DryRun => self.apply(plan.moves, &mut SimulatedFs::default(), &mut result),
            Mode::Execute => self.apply(plan.moves, &mut LiveFs, &mut result),
        }

        for missing in &plan.missing {
            self.logger.log(
                Level::INFO,
                "Missing file",
                &[("path", &missing.path), ("hash", missing.hash.as_str())],
            );
        }
        for extra in &plan.extra {
            self.logger.log(
                Level::INFO,
                "Extra file",
                &[("path", &extra.path), ("hash", extra.hash.as_str())],
            );
        }
        result.missing = plan.missing;
        result.extra = plan.extra;

        let counts = [
            result.successful_moves().to_string(),
            result.failed_moves().to_string(),
            result.missing_count().to_string(),
            result.extra_count().to_string(),
        ];
        self.logger.log(
            Level::INFO,
            "Reconciliation summary",
            &[
                ("mode", mode.label()),
                ("moved", &counts[0]),
                ("failed", &counts[1]),
                ("missing", &counts[2]),
                ("extra", &counts[3]),
            ],
        );

        Ok(result)
    }

    /// Run pending moves in order. A move blocked only because its destination,
    /// or a non-directory ancestor of it, is still the source of another
    /// pending move waits for that move; rounds repeat while any move
    /// resolves. Whatever stays blocked (cycles) fails with the conflict that
    /// blocks it.
    fn apply(&self, moves: Vec<Move>, fs: &mut dyn FsView, result: &mut ReconciliationResult) {
        let mut pending = moves;
        loop {
            let mut queue: VecDeque<Move> = pending.into();
            let mut deferred: Vec<Move> = Vec::new();
            let mut progressed = false;

            while let Some(mv) = queue.pop_front() {
                match self.validate(&mv, &*fs) {
                    Err(ref failure)
                        if blocker(&mv, failure).is_some_and(|blocked| {
                            queue
                                .iter()
                                .chain(deferred.iter())
                                .any(|other| other.source == blocked)
                        }) =>
                    {
                        self.logger.log(
                            Level::DEBUG,
                            "Deferring move until destination is vacated",
                            &fields(&mv),
                        );
                        deferred.push(mv);
                        continue;
                    }
                    Err(failure) => self.fail(mv, failure, result),
                    Ok((source, destination)) => {
                        self.perform(mv, source, destination, fs, result)
                    }
                }
                progressed = true;
            }

            if deferred.is_empty() {
                break;
            }
            if !progressed {
                for mv in deferred {
                    let failure = match self.validate(&mv, &*fs) {
                        Err(failure) => failure,
                        Ok(_) => MoveFailure::DestinationConflict,
                    };
                    self.fail(mv, failure, result);
                }
                break;
            }
            pending = deferred;
        }
    }

    fn validate(
        &self,
        mv: &Move,
        fs: &dyn FsView,
    ) -> Result<(PathBuf, PathBuf), MoveFailure> {
        let source = path::resolve_under(&self.base_dir, &mv.source).ok_or_else(|| {
            MoveFailure::UnsafePath {
                path: mv.source.clone(),
            }
        })?;
        let destination =
            path::resolve_under(&self.base_dir, &mv.destination).ok_or_else(|| {
                MoveFailure::UnsafePath {
                    path: mv.destination.clone(),
                }
            })?;

        if fs.kind(&source) != Some(EntryKind::File) {
            return Err(MoveFailure::SourceNotFound);
        }
        if fs.exists(&destination) {
            return Err(MoveFailure::DestinationConflict);
        }
        let mut ancestor = path::parent_of(&mv.destination);
        while let Some(rel) = ancestor {
            match fs.kind(&self.base_dir.join(rel)) {
                Some(EntryKind::Dir) => break,
                Some(_) => {
                    return Err(MoveFailure::ParentNotDirectory {
                        path: rel.to_string(),
                    })
                }
                None => ancestor = path::parent_of(rel),
            }
        }
        Ok((source, destination))
    }

    fn perform(
        &self,
        mv: Move,
        source: PathBuf,
        destination: PathBuf,
        fs: &mut dyn FsView,
        result: &mut ReconciliationResult,
    ) {
        let dry_run = result.mode.is_dry_run();

        if let (Some(parent_rel), Some(parent)) = (path::parent_of(&mv.destination), destination.parent()) {
            if !fs.exists(parent) {
                if let Err(e) = fs.create_dir_all(parent) {
                    let reason = format!("Failed to create directory {}: {}", parent_rel, e);
                    self.fail(mv, MoveFailure::MoveFailed { reason }, result);
                    return;
                }
                let message = if dry_run {
                    "Would create directory"
                } else {
                    "Created directory"
                };
                self.logger.log(Level::INFO, message, &[("path", parent_rel)]);
                result.created_dirs.push(parent_rel.to_string());
            }
        }

        match fs.rename(&source, &destination) {
            Ok(()) => {
                let message = if dry_run { "Would move file" } else { "Moved file" };
                self.logger.log(Level::INFO, message, &fields(&mv));
                result.moved.push(mv);
            }
            Err(e) => {
                let reason = e.to_string();
                self.fail(mv, MoveFailure::MoveFailed { reason }, result);
            }
        }
    }

    fn fail(&self, mv: Move, failure: MoveFailure, result: &mut ReconciliationResult) {
        let level = match failure {
            MoveFailure::MoveFailed { .. } => Level::ERROR,
            _ => Level::WARN,
        };
        let reason = failure.to_string();
        let mut event = fields(&mv).to_vec();
        event.push(("reason", reason.as_str()));
        self.logger.log(level, "Move not performed", &event);
        result.failed.push(FailedMove {
            planned: mv,
            failure,
        });
    }
}

/// The relative path whose occupant blocks `mv`, if the failure is one a
/// pending move could clear by vacating that path.
fn blocker<'m>(mv: &'m Move, failure: &'m MoveFailure) -> Option<&'m str> {
    match failure {
        MoveFailure::DestinationConflict => Some(mv.destination.as_str()),
        MoveFailure::ParentNotDirectory { path } => Some(path.as_str()),
        _ => None,
    }
}

fn fields(mv: &Move) -> [(&'static str, &str); 3] {
    [
        ("source", mv.source.as_str()),
        ("destination", mv.destination.as_str()),
        ("hash", mv.hash.as_str()),
    ]
}
