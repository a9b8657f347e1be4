//! Headless stand-ins for a real viewer: a synthetic scene, an orbiting
//! camera and an overlay that only records what it was asked to show.

use std::f32::consts::{FRAC_PI_4, TAU};

use fastnav_cull::{CullStateTable, Scene, SceneObject, SceneSource};
use fastnav_math::{Aabb, Mat4, Vec3};
use fastnav_motion::{
    CaptureError, Effect, EffectToggles, OverlaySurface, RenderSurface, SurfaceRect, Viewer,
};
use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, trace};

/// Object kinds in the synthetic scene: (type tag, half-extent range, triangle range).
const KINDS: [(&str, (f32, f32), (u32, u32)); 5] = [
    ("wall", (4.0, 10.0), (12, 400)),
    ("pipe", (1.0, 4.0), (2_000, 40_000)),
    ("cable", (0.5, 3.0), (500, 8_000)),
    ("bolt", (0.05, 0.3), (200, 3_000)),
    ("panel", (1.0, 3.0), (50, 1_500)),
];

/// Scene extent along each axis, centred on the origin.
const WORLD_HALF_EXTENT: f32 = 60.0;

/// Generate `count` typed objects scattered through the world.
pub fn generate_scene(count: usize, seed: u64) -> Scene {
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let (tag, (min_half, max_half), (min_tri, max_tri)) =
                KINDS[rng.gen_range(0..KINDS.len())];
            let center = Vec3::new(
                rng.gen_range(-WORLD_HALF_EXTENT..WORLD_HALF_EXTENT),
                rng.gen_range(-WORLD_HALF_EXTENT..WORLD_HALF_EXTENT),
                rng.gen_range(-WORLD_HALF_EXTENT..WORLD_HALF_EXTENT),
            );
            let half = Vec3::new(
                rng.gen_range(min_half..max_half),
                rng.gen_range(min_half..max_half),
                rng.gen_range(min_half..max_half),
            );
            SceneObject::new(
                i as u64,
                Aabb::new(center - half, center + half),
                rng.gen_range(min_tri..max_tri),
            )
            .with_type(tag)
        })
        .collect()
}

/// Camera orbiting the origin.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub radius: f32,
    pub height: f32,
    pub angle: f32,
    pub aspect: f32,
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            self.radius * self.angle.cos(),
            self.height,
            self.radius * self.angle.sin(),
        )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(FRAC_PI_4, self.aspect, 0.1, 500.0)
    }

    /// Advance `revolutions_per_second * dt` of a full turn.
    pub fn orbit(&mut self, revolutions_per_second: f32, dt: f32) {
        self.angle = (self.angle + revolutions_per_second * TAU * dt) % TAU;
    }
}

/// In-memory viewer driven by the demo loop.
pub struct SimViewer {
    pub scene: Scene,
    pub cull: CullStateTable,
    pub camera: OrbitCamera,
    pub canvas: SurfaceRect,
    effects: [bool; 3],
}

impl SimViewer {
    pub fn new(scene: Scene, canvas: SurfaceRect) -> Self {
        let cull = CullStateTable::with_len(scene.object_count());
        Self {
            scene,
            cull,
            camera: OrbitCamera {
                radius: 140.0,
                height: 30.0,
                angle: 0.0,
                aspect: canvas.width / canvas.height.max(1.0),
            },
            canvas,
            effects: [true; 3],
        }
    }

    /// Objects the renderer would draw this frame.
    pub fn drawn(&self) -> usize {
        (0..self.scene.object_count())
            .filter(|&i| self.cull.is_visible(i))
            .count()
    }

    pub fn effects_on(&self) -> usize {
        self.effects.iter().filter(|&&e| e).count()
    }
}

fn slot(effect: Effect) -> usize {
    match effect {
        Effect::Pbr => 0,
        Effect::AmbientOcclusion => 1,
        Effect::Edges => 2,
    }
}

impl EffectToggles for SimViewer {
    fn effect_enabled(&self, effect: Effect) -> bool {
        self.effects[slot(effect)]
    }

    fn set_effect_enabled(&mut self, effect: Effect, enabled: bool) {
        trace!(?effect, enabled, "effect toggled");
        self.effects[slot(effect)] = enabled;
    }
}

impl RenderSurface for SimViewer {
    fn surface_rect(&self) -> SurfaceRect {
        self.canvas
    }

    /// A flat frame shaded by how much of the scene is drawn.
    fn capture_frame(&mut self) -> Result<RgbaImage, CaptureError> {
        let total = self.scene.object_count().max(1);
        let shade = (255 * self.drawn() / total) as u8;
        Ok(RgbaImage::from_pixel(
            self.canvas.width as u32,
            self.canvas.height as u32,
            Rgba([shade, shade, shade, 255]),
        ))
    }
}

impl Viewer for SimViewer {
    type Scene = Scene;
    type CullStore = CullStateTable;

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_and_cull_store(&mut self) -> (&Scene, &mut CullStateTable) {
        (&self.scene, &mut self.cull)
    }

    fn view_matrix(&self) -> Mat4 {
        self.camera.view()
    }

    fn projection_matrix(&self) -> Mat4 {
        self.camera.projection()
    }
}

/// Overlay that logs and counts instead of drawing.
#[derive(Debug, Default)]
pub struct LogOverlay {
    pub attached: bool,
    pub shown: u32,
    pub opacity: f32,
}

impl OverlaySurface for LogOverlay {
    fn attach(&mut self, rect: SurfaceRect) {
        debug!(width = rect.width, height = rect.height, "overlay attached");
        self.attached = true;
    }

    fn show(&mut self, image: RgbaImage, _rect: SurfaceRect, opacity: f32) {
        debug!(
            width = image.width(),
            height = image.height(),
            "overlay showing captured frame"
        );
        self.shown += 1;
        self.opacity = opacity;
    }

    fn reposition(&mut self, _rect: SurfaceRect) {}

    fn set_opacity(&mut self, opacity: f32) {
        trace!(opacity, "overlay opacity");
        self.opacity = opacity;
    }

    fn hide(&mut self) {
        self.opacity = 0.0;
    }

    fn detach(&mut self) {
        debug!("overlay detached");
        self.attached = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_is_deterministic() {
        let a = generate_scene(50, 7);
        let b = generate_scene(50, 7);
        assert!(a.objects().eq(b.objects()));
        assert_eq!(a.object_count(), 50);
    }

    #[test]
    fn test_scene_objects_are_tagged_and_bounded() {
        let scene = generate_scene(200, 1);
        let limit = WORLD_HALF_EXTENT + 10.0;
        for object in scene.objects() {
            assert!(object.type_tag.is_some());
            assert!(!object.aabb.is_empty());
            assert!(object.aabb.max.max_element() <= limit);
            assert!(object.aabb.min.min_element() >= -limit);
        }
    }

    #[test]
    fn test_orbit_wraps() {
        let mut camera = OrbitCamera {
            radius: 10.0,
            height: 0.0,
            angle: 0.0,
            aspect: 1.0,
        };
        camera.orbit(1.5, 1.0);
        assert!(camera.angle >= 0.0 && camera.angle < TAU);
        assert!((camera.eye().length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_capture_matches_canvas() {
        let canvas = SurfaceRect::new(0.0, 0.0, 32.0, 16.0);
        let mut viewer = SimViewer::new(generate_scene(10, 3), canvas);
        let frame = viewer.capture_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (32, 16));
    }
}
