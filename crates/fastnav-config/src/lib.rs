//! Persisted settings for fast navigation.
//!
//! Settings live in a `config.ron` file, can be overridden from the command
//! line, and are reloaded when the file changes. Unknown fields are ignored
//! and missing ones fall back to defaults, so old and new files both load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, DetailConfig, EffectsConfig, FadeConfig, MotionConfig, SpatialConfig,
    default_config_dir,
};
pub use error::ConfigError;
