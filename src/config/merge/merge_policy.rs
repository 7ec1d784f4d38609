//! Merge rules: defaults, override order, conflict handling.

use crate::map::hasher::DEFAULT_CHUNK_SIZE;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones: defaults, then the global file, then
/// an explicit `--config` file, then environment variables.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("scan.algorithm", "blake3")?
        .set_default("scan.chunk_size", DEFAULT_CHUNK_SIZE as i64)?
        .set_default("scan.checkpoint_every", 100_i64)?
        .set_default("scan.follow_symlinks", false)?
        .set_default("reconcile.lock", true)
}
