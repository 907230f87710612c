//! Environment source: the standard Nomad client variables.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// (variable, config key) pairs, applied as overrides when set and non-empty.
pub const NOMAD_ENV_VARS: &[(&str, &str)] = &[
    ("NOMAD_ADDR", "nomad.address"),
    ("NOMAD_REGION", "nomad.region"),
    ("NOMAD_NAMESPACE", "nomad.namespace"),
    ("NOMAD_TOKEN", "nomad.token"),
];

pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in NOMAD_ENV_VARS {
        let value = std::env::var(var).ok().filter(|v| !v.is_empty());
        builder = builder.set_override_option(*key, value)?;
    }
    Ok(builder)
}
