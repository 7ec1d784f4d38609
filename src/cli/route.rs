//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation;
use crate::config::{ConfigLoader, MirrorConfig};
use crate::error::ApiError;
use crate::lock::RunLock;
use crate::map::{ContentMap, MapFile, Scanner};
use crate::reconcile::{Mode, Reconciler, TracingLogger};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Runtime context for CLI execution: the merged configuration.
pub struct RunContext {
    config: MirrorConfig,
}

impl RunContext {
    /// Create run context from an optional config path, layered over the
    /// defaults and global file the same way logging setup reads it.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Ok(Self { config })
    }

    pub fn with_config(config: MirrorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Execute a command and return the text to print on stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let start = Instant::now();
        let output = match command {
            Commands::Scan {
                root,
                output,
                force,
                algorithm,
                checkpoint_every,
            } => self.handle_scan(root, output, *force, *algorithm, *checkpoint_every),
            Commands::Reconcile {
                base_directory,
                current_map,
                target_map,
                dry_run: _,
                execute,
                format,
            } => self.handle_reconcile(base_directory, current_map, target_map, *execute, *format),
        }?;
        info!(duration_ms = start.elapsed().as_millis(), "Command finished");
        Ok(output)
    }

    fn handle_scan(
        &self,
        root: &Path,
        output: &Path,
        force: bool,
        algorithm: Option<crate::map::HashAlgorithm>,
        checkpoint_every: Option<usize>,
    ) -> Result<String, ApiError> {
        let map_file = MapFile::new(output);
        let previous = if force {
            ContentMap::new()
        } else {
            match map_file.load_or_default() {
                Ok(map) => map,
                Err(e) => {
                    warn!(error = %e, "Could not load previous hash map; scanning from scratch");
                    ContentMap::new()
                }
            }
        };

        let mut options = self.config.scan.to_options(force);
        if let Some(algorithm) = algorithm {
            options.algorithm = algorithm;
        }
        if let Some(every) = checkpoint_every {
            options.checkpoint_every = every;
        }

        info!(
            root = %root.display(),
            output = %output.display(),
            algorithm = options.algorithm.name(),
            previous_entries = previous.len(),
            "Starting scan"
        );
        let outcome = Scanner::with_options(root.to_path_buf(), options)
            .with_checkpoint(map_file.clone())
            .scan(&previous)?;
        map_file.save(&outcome.map)?;

        Ok(presentation::format_scan_summary(&outcome, output))
    }

    fn handle_reconcile(
        &self,
        base_directory: &Path,
        current_path: &Path,
        target_path: &Path,
        execute: bool,
        format: OutputFormat,
    ) -> Result<String, ApiError> {
        let mode = if execute { Mode::Execute } else { Mode::DryRun };
        info!(
            base = %base_directory.display(),
            current = %current_path.display(),
            target = %target_path.display(),
            mode = mode.label(),
            "Starting reconciliation"
        );

        let current = MapFile::new(current_path).load()?;
        let target = MapFile::new(target_path).load()?;
        info!(
            current_entries = current.len(),
            target_entries = target.len(),
            "Loaded hash maps"
        );
        if current.is_empty() || target.is_empty() {
            warn!("One of the hash maps is empty; every entry will be reported as missing or extra");
        }

        let _lock = if mode == Mode::Execute && self.config.reconcile.lock {
            if !base_directory.is_dir() {
                return Err(crate::error::ReconcileError::BaseDirNotFound(
                    base_directory.to_path_buf(),
                )
                .into());
            }
            Some(RunLock::acquire(base_directory)?)
        } else {
            None
        };

        let logger = TracingLogger;
        let result = Reconciler::new(base_directory, &logger).reconcile(&current, &target, mode)?;

        match format {
            OutputFormat::Text => Ok(presentation::format_reconciliation_text(&result)),
            OutputFormat::Json => presentation::format_reconciliation_json(&result),
        }
    }
}
