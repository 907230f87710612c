//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources replace earlier ones key by key; tables merge, scalars do not.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("nomad.address", "http://127.0.0.1:4646")?
        .set_default("nomad.stale", false)?
        .set_default("nomad.timeout_secs", 60)?
        .set_default("poll.wait_secs", 300)?
        .set_default("poll.min_backoff_ms", 250)?
        .set_default("poll.max_backoff_ms", 30_000)?
        .set_default("codec.encoding", "json")?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
