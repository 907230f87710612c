//! Config loading entry point.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::NodewatchConfig;
use crate::error::ConfigError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Builds a validated [`NodewatchConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from defaults, the global file, workspace files under
    /// `workspace_root/config/`, then `NOMAD_*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<NodewatchConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        let config: NodewatchConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(address = %config.nomad.address, "Configuration loaded");
        Ok(config)
    }

    /// Load from defaults and a single explicit file, then environment.
    /// The file must exist.
    pub fn load_from_file(path: &Path) -> Result<NodewatchConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder)?;

        let config: NodewatchConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
