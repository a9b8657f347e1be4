#![allow(dead_code)]

use std::f32::consts::FRAC_PI_4;

use fastnav_cull::{CullStateTable, Scene, SceneObject};
use fastnav_math::{Aabb, Mat4, Vec3};
use fastnav_motion::{
    CaptureError, Effect, EffectToggles, FadeSettings, FastNav, FastNavSettings, MotionTimings,
    OverlaySurface, RenderSurface, SurfaceRect, Viewer,
};
use image::RgbaImage;

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayCall {
    Attach,
    Show(f32),
    Reposition(SurfaceRect),
    Opacity(f32),
    Hide,
    Detach,
}

#[derive(Debug, Default)]
pub struct RecordingOverlay {
    pub calls: Vec<OverlayCall>,
}

impl RecordingOverlay {
    pub fn count(&self, pred: impl Fn(&OverlayCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl OverlaySurface for RecordingOverlay {
    fn attach(&mut self, _rect: SurfaceRect) {
        self.calls.push(OverlayCall::Attach);
    }
    fn show(&mut self, _image: RgbaImage, _rect: SurfaceRect, opacity: f32) {
        self.calls.push(OverlayCall::Show(opacity));
    }
    fn reposition(&mut self, rect: SurfaceRect) {
        self.calls.push(OverlayCall::Reposition(rect));
    }
    fn set_opacity(&mut self, opacity: f32) {
        self.calls.push(OverlayCall::Opacity(opacity));
    }
    fn hide(&mut self) {
        self.calls.push(OverlayCall::Hide);
    }
    fn detach(&mut self) {
        self.calls.push(OverlayCall::Detach);
    }
}

/// In-memory viewer with three effects, a small scene and a camera at
/// (0, 0, 10) looking down -Z.
pub struct MockViewer {
    pub scene: Scene,
    pub cull: CullStateTable,
    pub effects: [bool; 3],
    /// Every `set_effect_enabled(_, true)` call, in order.
    pub enables: Vec<Effect>,
    pub rect: SurfaceRect,
    pub capturable: bool,
    pub view: Mat4,
    pub projection: Mat4,
}

fn slot(effect: Effect) -> usize {
    match effect {
        Effect::Pbr => 0,
        Effect::AmbientOcclusion => 1,
        Effect::Edges => 2,
    }
}

pub fn cube(center: Vec3, half: f32) -> Aabb {
    Aabb::new(center - Vec3::splat(half), center + Vec3::splat(half))
}

impl MockViewer {
    /// Objects:
    /// 0. heavy, small, in view
    /// 1. light, small, in view
    /// 2. heavy, tagged "pipe", in view
    /// 3. heavy, behind the camera
    pub fn new() -> Self {
        let scene: Scene = [
            SceneObject::new(0, cube(Vec3::ZERO, 0.5), 50_000),
            SceneObject::new(1, cube(Vec3::new(2.0, 0.0, 0.0), 0.5), 12),
            SceneObject::new(2, cube(Vec3::new(-2.0, 0.0, 0.0), 0.5), 80_000).with_type("pipe"),
            SceneObject::new(3, cube(Vec3::new(0.0, 0.0, 40.0), 0.5), 60_000),
        ]
        .into_iter()
        .collect();

        Self {
            cull: CullStateTable::with_len(4),
            scene,
            effects: [true; 3],
            enables: Vec::new(),
            rect: SurfaceRect::new(0.0, 0.0, 320.0, 180.0),
            capturable: true,
            view: Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(FRAC_PI_4, 16.0 / 9.0, 0.1, 1000.0),
        }
    }

    pub fn all_effects_on(&self) -> bool {
        self.effects.iter().all(|&e| e)
    }

    pub fn all_effects_off(&self) -> bool {
        self.effects.iter().all(|&e| !e)
    }
}

impl EffectToggles for MockViewer {
    fn effect_enabled(&self, effect: Effect) -> bool {
        self.effects[slot(effect)]
    }

    fn set_effect_enabled(&mut self, effect: Effect, enabled: bool) {
        self.effects[slot(effect)] = enabled;
        if enabled {
            self.enables.push(effect);
        }
    }
}

impl RenderSurface for MockViewer {
    fn surface_rect(&self) -> SurfaceRect {
        self.rect
    }

    fn capture_frame(&mut self) -> Result<RgbaImage, CaptureError> {
        if self.capturable {
            Ok(RgbaImage::new(self.rect.width as u32, self.rect.height as u32))
        } else {
            Err(CaptureError::Failed("context lost".into()))
        }
    }
}

impl Viewer for MockViewer {
    type Scene = Scene;
    type CullStore = CullStateTable;

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_and_cull_store(&mut self) -> (&Scene, &mut CullStateTable) {
        (&self.scene, &mut self.cull)
    }

    fn view_matrix(&self) -> Mat4 {
        self.view
    }

    fn projection_matrix(&self) -> Mat4 {
        self.projection
    }
}

/// Idle 0.6 s, restore delay 0.1 s, 0.5 s fade in 0.05 s steps, objects
/// with 1000+ triangles detail-culled, "pipe" never hidden.
pub fn settings() -> FastNavSettings {
    let mut settings = FastNavSettings {
        timings: MotionTimings {
            idle_timeout: 0.6,
            restore_delay: 0.1,
        },
        fade: FadeSettings {
            duration: 0.5,
            interval: 0.05,
        },
        ..Default::default()
    };
    settings.detail = settings
        .detail
        .with_triangle_threshold(1000)
        .with_never_hide(["pipe"]);
    settings
}

pub fn controller(viewer: &MockViewer) -> FastNav<RecordingOverlay> {
    controller_with(viewer, settings())
}

pub fn controller_with(viewer: &MockViewer, settings: FastNavSettings) -> FastNav<RecordingOverlay> {
    let mut nav = FastNav::new(RecordingOverlay::default(), settings);
    nav.sync_camera(viewer);
    nav
}

/// Tick `n` frames of `dt` seconds.
pub fn run(nav: &mut FastNav<RecordingOverlay>, viewer: &mut MockViewer, n: usize, dt: f32) {
    for _ in 0..n {
        nav.tick(dt, viewer);
    }
}
