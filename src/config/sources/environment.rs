//! Environment source: MIRROR_MOVE__SECTION__KEY, e.g. MIRROR_MOVE__SCAN__CHUNK_SIZE.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "MIRROR_MOVE";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("scan.ignore_patterns"),
    )
}
