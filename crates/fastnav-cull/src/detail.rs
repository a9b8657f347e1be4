//! Detail culling: hides small and/or triangle-heavy objects while the camera moves.
//!
//! Each object is tested against a fixed-precedence predicate (see
//! [`should_cull`]). The resulting index set is recomputed wholesale whenever
//! it is dirty and only written to the [`CullStore`] by
//! [`DetailCullSelector::apply`].

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::scene::{CullStore, SceneObject, SceneSource};

/// Thresholds and type lists driving detail culling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailCullConfig {
    /// Minimum triangle count for an object to be culled. 0 disables.
    pub triangle_threshold: u32,
    /// Maximum AABB diagonal for an object to be culled. 0 disables.
    pub size_threshold: f32,
    /// Types that are always culled (unless also in `never_hide`).
    pub always_hide: FxHashSet<String>,
    /// Types that are never culled. Wins over `always_hide`.
    pub never_hide: FxHashSet<String>,
}

impl DetailCullConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style triangle threshold; negative values disable the rule.
    pub fn with_triangle_threshold(mut self, threshold: i64) -> Self {
        self.triangle_threshold = normalize_triangle_threshold(threshold);
        self
    }

    /// Builder-style size threshold; negative or NaN values disable the rule.
    pub fn with_size_threshold(mut self, threshold: f32) -> Self {
        self.size_threshold = normalize_size_threshold(threshold);
        self
    }

    pub fn with_always_hide<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.always_hide = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_never_hide<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.never_hide = types.into_iter().map(Into::into).collect();
        self
    }
}

/// Clamp a host-supplied triangle threshold into range. Negative means disabled.
pub fn normalize_triangle_threshold(threshold: i64) -> u32 {
    u32::try_from(threshold.max(0)).unwrap_or(u32::MAX)
}

/// Negative and NaN size thresholds mean disabled.
pub fn normalize_size_threshold(threshold: f32) -> f32 {
    if threshold > 0.0 { threshold } else { 0.0 }
}

/// Decide whether `object` is detail-culled under `config`.
///
/// Precedence, first match wins:
/// 1. type in `never_hide` → keep
/// 2. type in `always_hide` → cull
/// 3. both thresholds set → `triangles >= tri && diagonal <= size`
/// 4. triangle threshold only → `triangles >= tri`
/// 5. size threshold only → `diagonal <= size`
/// 6. neither → keep
pub fn should_cull(config: &DetailCullConfig, object: &SceneObject) -> bool {
    if let Some(tag) = object.type_tag.as_deref() {
        if config.never_hide.contains(tag) {
            return false;
        }
        if config.always_hide.contains(tag) {
            return true;
        }
    }

    let by_triangles = object.triangle_count >= config.triangle_threshold;
    let by_size = object.aabb.diagonal() <= config.size_threshold;

    match (config.triangle_threshold > 0, config.size_threshold > 0.0) {
        (true, true) => by_triangles && by_size,
        (true, false) => by_triangles,
        (false, true) => by_size,
        (false, false) => false,
    }
}

/// Maintains the detail-cull set and the flags it has written to the store.
#[derive(Debug)]
pub struct DetailCullSelector {
    config: DetailCullConfig,
    /// Culled indices for the current config, ascending. Stale while `dirty`.
    culled: Vec<usize>,
    dirty: bool,
    /// Indices whose `detail_culled` flag this selector set to true.
    applied: Vec<usize>,
}

impl DetailCullSelector {
    pub fn new(config: DetailCullConfig) -> Self {
        Self {
            config,
            culled: Vec::new(),
            dirty: true,
            applied: Vec::new(),
        }
    }

    pub fn config(&self) -> &DetailCullConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DetailCullConfig) {
        self.config = config;
        self.dirty = true;
    }

    pub fn set_triangle_threshold(&mut self, threshold: i64) {
        self.config.triangle_threshold = normalize_triangle_threshold(threshold);
        self.dirty = true;
    }

    pub fn set_size_threshold(&mut self, threshold: f32) {
        self.config.size_threshold = normalize_size_threshold(threshold);
        self.dirty = true;
    }

    pub fn set_always_hide<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.always_hide = types.into_iter().map(Into::into).collect();
        self.dirty = true;
    }

    pub fn set_never_hide<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.never_hide = types.into_iter().map(Into::into).collect();
        self.dirty = true;
    }

    /// Invalidate the cull set (object added or removed).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recompute the cull set from scratch. Does not touch any cull store.
    pub fn rebuild<S: SceneSource + ?Sized>(&mut self, scene: &S) {
        self.culled = (0..scene.object_count())
            .filter(|&i| scene.object(i).is_some_and(|o| should_cull(&self.config, o)))
            .collect();
        self.dirty = false;
        debug!(
            culled = self.culled.len(),
            total = scene.object_count(),
            "rebuilt detail cull set"
        );
    }

    /// Rebuild if dirty. Returns true if a rebuild happened.
    pub fn ensure_built<S: SceneSource + ?Sized>(&mut self, scene: &S) -> bool {
        if self.dirty {
            self.rebuild(scene);
            true
        } else {
            false
        }
    }

    /// The up-to-date cull set, rebuilding first if needed.
    pub fn culled<S: SceneSource + ?Sized>(&mut self, scene: &S) -> &[usize] {
        self.ensure_built(scene);
        &self.culled
    }

    /// The cull set, or `None` if it is stale.
    pub fn current(&self) -> Option<&[usize]> {
        (!self.dirty).then_some(self.culled.as_slice())
    }

    /// Indices currently flagged by this selector.
    pub fn applied(&self) -> &[usize] {
        &self.applied
    }

    pub fn is_applied(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Write the cull set to `store` (`culled = true`) or undo exactly what
    /// was previously written (`culled = false`).
    pub fn apply<S, C>(&mut self, culled: bool, scene: &S, store: &mut C)
    where
        S: SceneSource + ?Sized,
        C: CullStore + ?Sized,
    {
        if culled {
            self.ensure_built(scene);

            // A re-apply under a changed config must not strand old flags.
            if !self.applied.is_empty() {
                let next: FxHashSet<usize> = self.culled.iter().copied().collect();
                for &i in self.applied.iter().filter(|i| !next.contains(*i)) {
                    store.set_detail_culled(i, false);
                }
            }
            for &i in &self.culled {
                store.set_detail_culled(i, true);
            }
            self.applied.clone_from(&self.culled);
        } else {
            self.release(store);
        }
    }

    /// Clear every flag this selector set.
    pub fn release<C: CullStore + ?Sized>(&mut self, store: &mut C) {
        for i in self.applied.drain(..) {
            store.set_detail_culled(i, false);
        }
    }
}

impl Default for DetailCullSelector {
    fn default() -> Self {
        Self::new(DetailCullConfig::default())
    }
}
