//! Built-in defaults, the lowest-precedence configuration layer.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the default values applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("registry.duplicate_names", "shadow")?
        .set_default("poller.interval_ms", 1000)?
        .set_default("poller.thread_name", "change-registry-poller")?
        .set_default("poller.skip_empty", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
