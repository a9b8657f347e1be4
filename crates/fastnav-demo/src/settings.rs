//! Conversion from the persisted config to runtime controller settings.

use fastnav_config::Config;
use fastnav_cull::{ClipDepth, DetailCullConfig};
use fastnav_motion::{EffectSuppression, FadeSettings, FastNavSettings, MotionTimings};

/// Build controller settings from `config`, normalising malformed values.
pub fn fast_nav_settings(config: &Config) -> FastNavSettings {
    FastNavSettings {
        timings: MotionTimings {
            idle_timeout: config.motion.idle_timeout.max(0.0),
            restore_delay: config.motion.restore_delay.max(0.0),
        },
        fade_enabled: config.fade.enabled,
        fade: FadeSettings {
            duration: config.fade.duration.max(0.0),
            interval: config.fade.interval.max(0.0),
        },
        effects: EffectSuppression {
            pbr: config.effects.hide_pbr,
            ambient_occlusion: config.effects.hide_ambient_occlusion,
            edges: config.effects.hide_edges,
        },
        detail: DetailCullConfig::new()
            .with_triangle_threshold(config.detail.triangle_threshold)
            .with_size_threshold(config.detail.size_threshold)
            .with_always_hide(config.detail.always_hide.iter().cloned())
            .with_never_hide(config.detail.never_hide.iter().cloned()),
        max_depth: config.spatial.max_depth,
        clip_depth: ClipDepth::ZeroToOne,
        apply_view_culling: config.spatial.apply_view_culling,
    }
}
