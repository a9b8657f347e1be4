//! The fast-navigation controller: wires motion events from a host viewer to
//! effect suppression, detail culling, the spatial index and the crossfade.

use fastnav_cull::{
    ClipDepth, CullStore, DEFAULT_MAX_DEPTH, DetailCullConfig, DetailCullSelector, FrustumQuery,
    FrustumTracker, SceneSource, SpatialIndex,
};
use glam::Mat4;
use tracing::{debug, warn};

use crate::compositor::{FadeSettings, OverlaySurface, RenderSurface, TransitionCompositor};
use crate::effects::{EffectSuppression, EffectToggles, SuppressedEffects};
use crate::state_machine::{
    MotionHooks, MotionState, MotionStateMachine, MotionTimings, MotionTrigger,
};

/// Everything the controller needs from the host application.
pub trait Viewer: EffectToggles + RenderSurface {
    type Scene: SceneSource;
    type CullStore: CullStore;

    fn scene(&self) -> &Self::Scene;

    /// Disjoint borrows of the scene and the cull store.
    fn scene_and_cull_store(&mut self) -> (&Self::Scene, &mut Self::CullStore);

    fn view_matrix(&self) -> Mat4;
    fn projection_matrix(&self) -> Mat4;
}

/// Host notifications, for hosts that prefer a single dispatch point over
/// the individual `on_*` methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerEvent {
    ViewMatrixChanged,
    ProjectionMatrixChanged,
    CanvasResized,
    PointerDown,
    PointerUp,
    PointerMove,
    ObjectAdded(usize),
    ObjectRemoved(usize),
}

/// All controller tunables.
#[derive(Clone, Debug, PartialEq)]
pub struct FastNavSettings {
    pub timings: MotionTimings,
    /// Crossfade when restoring quality. Without it effects return immediately.
    pub fade_enabled: bool,
    pub fade: FadeSettings,
    pub effects: EffectSuppression,
    pub detail: DetailCullConfig,
    pub max_depth: u32,
    pub clip_depth: ClipDepth,
    /// Write frustum results to the `view_culled` layer.
    pub apply_view_culling: bool,
}

impl Default for FastNavSettings {
    fn default() -> Self {
        Self {
            timings: MotionTimings::default(),
            fade_enabled: true,
            fade: FadeSettings::default(),
            effects: EffectSuppression::default(),
            detail: DetailCullConfig::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            clip_depth: ClipDepth::default(),
            apply_view_culling: false,
        }
    }
}

/// Adaptive fast-navigation controller.
///
/// Owns the motion state machine, the detail cull set, the KD-tree and the
/// crossfade overlay. One instance serves one viewer; all methods are meant
/// to be called from that viewer's event and frame callbacks.
#[derive(Debug)]
pub struct FastNav<O: OverlaySurface> {
    machine: MotionStateMachine,
    detail: DetailCullSelector,
    index: SpatialIndex,
    frustum: FrustumTracker,
    compositor: TransitionCompositor<O>,
    suppressed: SuppressedEffects,
    effects: EffectSuppression,
    fade_enabled: bool,
    apply_view_culling: bool,
    /// Indices whose `view_culled` flag this controller set.
    view_culled: Vec<usize>,
    pointer_down: bool,
}

impl<O: OverlaySurface> FastNav<O> {
    pub fn new(overlay: O, settings: FastNavSettings) -> Self {
        Self {
            machine: MotionStateMachine::new(settings.timings),
            detail: DetailCullSelector::new(settings.detail),
            index: SpatialIndex::new(settings.max_depth),
            frustum: FrustumTracker::new(settings.clip_depth),
            compositor: TransitionCompositor::new(overlay, settings.fade),
            suppressed: SuppressedEffects::new(),
            effects: settings.effects,
            fade_enabled: settings.fade_enabled,
            apply_view_culling: settings.apply_view_culling,
            view_culled: Vec::new(),
            pointer_down: false,
        }
    }

    pub fn state(&self) -> MotionState {
        self.machine.state()
    }

    pub fn machine(&self) -> &MotionStateMachine {
        &self.machine
    }

    pub fn detail(&self) -> &DetailCullSelector {
        &self.detail
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn compositor(&self) -> &TransitionCompositor<O> {
        &self.compositor
    }

    pub fn suppressed(&self) -> &SuppressedEffects {
        &self.suppressed
    }

    pub fn is_frustum_dirty(&self) -> bool {
        self.frustum.is_dirty()
    }

    // ── Configuration ───────────────────────────────────────────────

    /// Takes effect the next time fast mode is entered.
    pub fn set_effect_suppression(&mut self, effects: EffectSuppression) {
        self.effects = effects;
    }

    pub fn set_triangle_threshold(&mut self, threshold: i64) {
        self.detail.set_triangle_threshold(threshold);
    }

    pub fn set_size_threshold(&mut self, threshold: f32) {
        self.detail.set_size_threshold(threshold);
    }

    pub fn set_always_hide_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.detail.set_always_hide(types);
    }

    pub fn set_never_hide_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.detail.set_never_hide(types);
    }

    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.index.set_max_depth(max_depth);
    }

    pub fn set_timings(&mut self, timings: MotionTimings) {
        self.machine.set_timings(timings);
    }

    pub fn set_fade(&mut self, enabled: bool, fade: FadeSettings) {
        self.fade_enabled = enabled;
        self.compositor.set_settings(fade);
    }

    /// Turning view culling off clears every `view_culled` flag it set.
    pub fn set_view_culling<V: Viewer>(&mut self, enabled: bool, viewer: &mut V) {
        self.apply_view_culling = enabled;
        if enabled {
            self.frustum.mark_dirty();
        } else {
            let (_, store) = viewer.scene_and_cull_store();
            for i in self.view_culled.drain(..) {
                store.set_view_culled(i, false);
            }
        }
    }

    /// Apply every setting at once, e.g. after a config reload. Switching
    /// view culling off here clears its flags like [`Self::set_view_culling`].
    pub fn apply_settings<V: Viewer>(&mut self, settings: FastNavSettings, viewer: &mut V) {
        self.machine.set_timings(settings.timings);
        self.fade_enabled = settings.fade_enabled;
        self.compositor.set_settings(settings.fade);
        self.effects = settings.effects;
        self.detail.set_config(settings.detail);
        self.index.set_max_depth(settings.max_depth);
        if settings.apply_view_culling != self.apply_view_culling {
            self.set_view_culling(settings.apply_view_culling, viewer);
        }
    }

    /// Pick up the viewer's current camera without treating it as motion.
    /// Call once after construction.
    pub fn sync_camera<V: Viewer>(&mut self, viewer: &V) {
        self.frustum.set_view(viewer.view_matrix());
        self.frustum.set_projection(viewer.projection_matrix());
    }

    // ── Host events ─────────────────────────────────────────────────

    pub fn handle_event<V: Viewer>(&mut self, event: ViewerEvent, viewer: &mut V) {
        match event {
            ViewerEvent::ViewMatrixChanged => self.on_view_matrix_changed(viewer),
            ViewerEvent::ProjectionMatrixChanged => self.on_projection_matrix_changed(viewer),
            ViewerEvent::CanvasResized => self.on_canvas_resized(viewer),
            ViewerEvent::PointerDown => self.on_pointer_down(),
            ViewerEvent::PointerUp => self.on_pointer_up(),
            ViewerEvent::PointerMove => self.on_pointer_move(viewer),
            ViewerEvent::ObjectAdded(index) => self.on_object_added(index),
            ViewerEvent::ObjectRemoved(index) => self.on_object_removed(index),
        }
    }

    pub fn on_view_matrix_changed<V: Viewer>(&mut self, viewer: &mut V) {
        self.frustum.set_view(viewer.view_matrix());
        self.motion(MotionTrigger::CameraView, viewer);
    }

    pub fn on_projection_matrix_changed<V: Viewer>(&mut self, viewer: &mut V) {
        self.frustum.set_projection(viewer.projection_matrix());
        self.motion(MotionTrigger::CameraProjection, viewer);
    }

    pub fn on_canvas_resized<V: Viewer>(&mut self, viewer: &mut V) {
        self.motion(MotionTrigger::CanvasResize, viewer);
    }

    pub fn on_pointer_down(&mut self) {
        self.pointer_down = true;
    }

    pub fn on_pointer_up(&mut self) {
        self.pointer_down = false;
    }

    /// Only drags (moves with a button held) count as motion.
    pub fn on_pointer_move<V: Viewer>(&mut self, viewer: &mut V) {
        if self.pointer_down {
            self.motion(MotionTrigger::PointerDrag, viewer);
        }
    }

    pub fn on_object_added(&mut self, index: usize) {
        debug!(index, "object added, invalidating cull caches");
        self.index.mark_dirty();
        self.detail.mark_dirty();
        self.frustum.mark_dirty();
    }

    pub fn on_object_removed(&mut self, index: usize) {
        debug!(index, "object removed, invalidating cull caches");
        self.index.mark_dirty();
        self.detail.mark_dirty();
        self.frustum.mark_dirty();
    }

    /// Per-frame update with the elapsed time in seconds.
    pub fn tick<V: Viewer>(&mut self, dt: f32, viewer: &mut V) {
        // A fade started by this tick's recovery starts counting next frame.
        self.compositor.step(dt, &*viewer);

        let (machine, mut hooks) = self.split(viewer);
        machine.tick(dt, &mut hooks);

        if self.apply_view_culling && self.frustum.is_dirty() {
            self.update_view_culling(viewer);
        }
    }

    /// Cancel any running crossfade.
    pub fn clear(&mut self) {
        self.compositor.cancel();
    }

    /// Classify every scene object against the current camera frustum.
    pub fn objects_in_frustum<V: Viewer>(&mut self, viewer: &V) -> FrustumQuery {
        let frustum = *self.frustum.frustum();
        let generation = self.frustum.generation();
        self.index
            .classify_objects(&frustum, generation, viewer.scene())
    }

    /// Stop reacting to the viewer and undo every change made to it: effects
    /// come back on, cull flags are cleared and the overlay is detached.
    /// Returns the overlay to the host.
    pub fn destroy<V: Viewer>(mut self, viewer: &mut V) -> O {
        self.machine.reset();
        self.suppressed.restore(viewer);
        let (_, store) = viewer.scene_and_cull_store();
        self.detail.release(store);
        for i in self.view_culled.drain(..) {
            store.set_view_culled(i, false);
        }
        debug!("fast navigation torn down");
        self.compositor.into_overlay()
    }

    fn motion<V: Viewer>(&mut self, trigger: MotionTrigger, viewer: &mut V) {
        let (machine, mut hooks) = self.split(viewer);
        machine.on_motion(trigger, &mut hooks);
    }

    fn split<'a, V: Viewer>(
        &'a mut self,
        viewer: &'a mut V,
    ) -> (&'a mut MotionStateMachine, Actions<'a, V, O>) {
        let hooks = Actions {
            detail: &mut self.detail,
            frustum: &mut self.frustum,
            compositor: &mut self.compositor,
            suppressed: &mut self.suppressed,
            effects: &self.effects,
            fade_enabled: self.fade_enabled,
            viewer,
        };
        (&mut self.machine, hooks)
    }

    fn update_view_culling<V: Viewer>(&mut self, viewer: &mut V) {
        let query = self.objects_in_frustum(&*viewer);
        let (_, store) = viewer.scene_and_cull_store();
        for &i in &self.view_culled {
            if query.outside.binary_search(&i).is_err() {
                store.set_view_culled(i, false);
            }
        }
        for &i in &query.outside {
            store.set_view_culled(i, true);
        }
        debug!(
            outside = query.outside.len(),
            visible = query.inside.len() + query.intersecting.len(),
            "view culling updated"
        );
        self.view_culled = query.outside;
    }
}

/// Split borrow of the controller handed to the state machine.
struct Actions<'a, V: Viewer, O: OverlaySurface> {
    detail: &'a mut DetailCullSelector,
    frustum: &'a mut FrustumTracker,
    compositor: &'a mut TransitionCompositor<O>,
    suppressed: &'a mut SuppressedEffects,
    effects: &'a EffectSuppression,
    fade_enabled: bool,
    viewer: &'a mut V,
}

impl<V: Viewer, O: OverlaySurface> MotionHooks for Actions<'_, V, O> {
    fn enter_fast(&mut self, trigger: MotionTrigger) {
        self.suppressed.suppress(self.effects, &mut *self.viewer);
        let (scene, store) = self.viewer.scene_and_cull_store();
        self.detail.apply(true, scene, store);
        self.frustum.mark_dirty();
        debug!(
            ?trigger,
            detail_culled = self.detail.applied().len(),
            "fast mode applied"
        );
    }

    fn begin_recovery(&mut self) -> bool {
        if !self.fade_enabled {
            return false;
        }
        match self.compositor.start_fade(&mut *self.viewer) {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "skipping crossfade");
                false
            }
        }
    }

    fn finish_recovery(&mut self) {
        let restored = self.suppressed.restore(&mut *self.viewer);
        let (scene, store) = self.viewer.scene_and_cull_store();
        self.detail.apply(false, scene, store);
        debug!(effects = restored, "quality mode applied");
    }

    fn cancel_recovery(&mut self) {
        self.compositor.cancel();
    }
}
