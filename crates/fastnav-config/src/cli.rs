//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Fast-navigation demo command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "fastnav", about = "Adaptive fast-navigation culling demo")]
pub struct CliArgs {
    /// Seconds without motion before quality is restored.
    #[arg(long)]
    pub idle_timeout: Option<f32>,

    /// Cull objects with at least this many triangles (0 or negative disables).
    #[arg(long, allow_hyphen_values = true)]
    pub triangle_threshold: Option<i64>,

    /// Cull objects whose bounding-box diagonal is at most this (0 or negative disables).
    #[arg(long, allow_hyphen_values = true)]
    pub size_threshold: Option<f32>,

    /// Maximum KD-tree depth.
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Frames of scripted camera motion to simulate.
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Number of synthetic scene objects.
    #[arg(long, default_value_t = 2000)]
    pub objects: usize,

    /// Seed for the synthetic scene.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(t) = args.idle_timeout {
            self.motion.idle_timeout = t;
        }
        if let Some(t) = args.triangle_threshold {
            self.detail.triangle_threshold = t;
        }
        if let Some(s) = args.size_threshold {
            self.detail.size_threshold = s;
        }
        if let Some(d) = args.max_depth {
            self.spatial.max_depth = d;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            idle_timeout: Some(1.2),
            triangle_threshold: Some(20_000),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.motion.idle_timeout, 1.2);
        assert_eq!(config.detail.triangle_threshold, 20_000);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.motion.restore_delay, 0.1);
        assert_eq!(config.spatial.max_depth, 8);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "fastnav",
            "--triangle-threshold",
            "-1",
            "--size-threshold",
            "0.5",
            "--max-depth",
            "12",
            "--frames",
            "30",
        ]);
        assert_eq!(args.triangle_threshold, Some(-1));
        assert_eq!(args.size_threshold, Some(0.5));
        assert_eq!(args.max_depth, Some(12));
        assert_eq!(args.frames, 30);
        assert_eq!(args.objects, 2000);
        assert_eq!(args.seed, 42);
    }
}
