//! ConfigLoader: the single entry point for reading configuration.

use crate::config::merge::merge_policy;
use crate::config::sources::{environment, global_file};
use crate::config::MirrorConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;

/// Loads [`MirrorConfig`] from layered sources and validates it.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, optional explicit file, environment.
    pub fn load(explicit: Option<&Path>) -> Result<MirrorConfig, ApiError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = environment::add_to_builder(builder);
        Self::finish(builder)
    }

    /// Built-in defaults only.
    pub fn defaults() -> MirrorConfig {
        MirrorConfig::default()
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<MirrorConfig, ApiError> {
        let config: MirrorConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
