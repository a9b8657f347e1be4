//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level fast-navigation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Idle timing.
    pub motion: MotionConfig,
    /// Crossfade back to quality mode.
    pub fade: FadeConfig,
    /// Effects hidden while moving.
    pub effects: EffectsConfig,
    /// Detail culling rules.
    pub detail: DetailConfig,
    /// KD-tree and view culling.
    pub spatial: SpatialConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Seconds without motion before quality is restored.
    pub idle_timeout: f32,
    /// Seconds between starting the crossfade and re-enabling effects.
    pub restore_delay: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FadeConfig {
    pub enabled: bool,
    /// Seconds from opaque to hidden.
    pub duration: f32,
    /// Seconds between opacity steps.
    pub interval: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    pub hide_pbr: bool,
    pub hide_ambient_occlusion: bool,
    pub hide_edges: bool,
}

/// Detail culling rules. Values are stored as written; negative or NaN
/// thresholds mean "disabled" once converted to runtime settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetailConfig {
    /// Cull objects with at least this many triangles. 0 disables.
    pub triangle_threshold: i64,
    /// Cull objects whose bounding-box diagonal is at most this. 0 disables.
    pub size_threshold: f32,
    /// Object types always culled while moving.
    pub always_hide: Vec<String>,
    /// Object types never culled. Wins over `always_hide`.
    pub never_hide: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpatialConfig {
    /// Maximum KD-tree depth.
    pub max_depth: u32,
    /// Write frustum results to the host's view-cull layer.
    pub apply_view_culling: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: 0.6,
            restore_delay: 0.1,
        }
    }
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 0.5,
            interval: 0.05,
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            hide_pbr: true,
            hide_ambient_occlusion: true,
            hide_edges: true,
        }
    }
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            apply_view_culling: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Per-user config directory, e.g. `~/.config/fastnav` on Linux.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("fastnav"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
