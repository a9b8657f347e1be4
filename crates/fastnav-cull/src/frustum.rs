//! View-frustum extraction and tri-state AABB classification.
//!
//! Planes are extracted from the combined view-projection matrix and tested
//! with the p-vertex / n-vertex method. Classification is conservative: it
//! never reports [`Containment::Outside`] for a box that overlaps the frustum,
//! but may report [`Containment::Intersecting`] for boxes near frustum corners
//! that are in fact fully outside.

use fastnav_math::Aabb;
use glam::{Mat4, Vec3, Vec4};

/// Plane indices into the frustum planes array.
const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// Depth range of clip space produced by the projection matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClipDepth {
    /// `0 <= z <= w` (wgpu, Vulkan, `glam::Mat4::perspective_rh`). Also
    /// covers reverse-Z, which swaps which plane is near and far but not the
    /// pair of planes itself.
    #[default]
    ZeroToOne,
    /// `-w <= z <= w` (OpenGL / WebGL, `glam::Mat4::perspective_rh_gl`).
    NegOneToOne,
}

/// Result of testing a box against the frustum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Containment {
    /// Entirely inside all six planes.
    Inside,
    /// Entirely behind at least one plane.
    Outside,
    /// Straddles at least one plane (or could not be proven either way).
    Intersecting,
}

/// A view frustum defined by six inward-pointing planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    /// Six planes: left, right, bottom, top, near, far.
    /// Each `Vec4(a, b, c, d)` where `(a,b,c)` is the normalized inward
    /// normal and `d` is the signed distance term.
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a combined view-projection matrix
    /// using the Griggs-Hartmann method.
    pub fn from_view_projection(vp: &Mat4, depth: ClipDepth) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        planes[NEAR] = match depth {
            ClipDepth::ZeroToOne => rows[2],
            ClipDepth::NegOneToOne => rows[3] + rows[2],
        };
        planes[FAR] = rows[3] - rows[2];

        // Normalize each plane so that (a,b,c) is a unit vector.
        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Build the frustum from separate view and projection matrices.
    pub fn from_matrices(view: &Mat4, projection: &Mat4, depth: ClipDepth) -> Self {
        Self::from_view_projection(&(*projection * *view), depth)
    }

    /// The six planes in left, right, bottom, top, near, far order.
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// Classify an AABB against the frustum.
    pub fn classify(&self, aabb: &Aabb) -> Containment {
        let mut straddles = false;

        for plane in &self.planes {
            let normal = plane.truncate();
            let d = plane.w;

            // Positive vertex: the corner furthest along the plane normal.
            // Negative vertex: the corner furthest against it.
            let (p, n) = support_corners(normal, aabb);

            if normal.dot(p) + d < 0.0 {
                return Containment::Outside;
            }
            if normal.dot(n) + d < 0.0 {
                straddles = true;
            }
        }

        if straddles {
            Containment::Intersecting
        } else {
            Containment::Inside
        }
    }

    /// Returns `true` if the AABB is at least partially inside the frustum.
    pub fn is_visible(&self, aabb: &Aabb) -> bool {
        self.classify(aabb) != Containment::Outside
    }
}

fn support_corners(normal: Vec3, aabb: &Aabb) -> (Vec3, Vec3) {
    let pick = |n: f32, lo: f32, hi: f32| if n >= 0.0 { (hi, lo) } else { (lo, hi) };
    let (px, nx) = pick(normal.x, aabb.min.x, aabb.max.x);
    let (py, ny) = pick(normal.y, aabb.min.y, aabb.max.y);
    let (pz, nz) = pick(normal.z, aabb.min.z, aabb.max.z);
    (Vec3::new(px, py, pz), Vec3::new(nx, ny, nz))
}

/// Lazily recomputed frustum tied to the camera's current matrices.
///
/// Camera-change notifications mark the tracker dirty; the planes are only
/// re-extracted the next time [`frustum`](Self::frustum) is called. Every
/// recomputation bumps [`generation`](Self::generation), which lets callers
/// cache per-frustum results and detect when they go stale.
#[derive(Clone, Debug)]
pub struct FrustumTracker {
    view: Mat4,
    projection: Mat4,
    depth: ClipDepth,
    frustum: Frustum,
    dirty: bool,
    generation: u64,
}

impl FrustumTracker {
    /// Create a tracker for the given clip-space convention. Matrices start
    /// as identity and the tracker starts dirty.
    pub fn new(depth: ClipDepth) -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            depth,
            frustum: Frustum::from_view_projection(&Mat4::IDENTITY, depth),
            dirty: true,
            generation: 0,
        }
    }

    /// Record a new view matrix.
    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
        self.dirty = true;
    }

    /// Record a new projection matrix.
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
        self.dirty = true;
    }

    /// Force recomputation on next access.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Generation of the frustum last returned by [`frustum`](Self::frustum).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current frustum, re-extracted first if either matrix changed.
    pub fn frustum(&mut self) -> &Frustum {
        if self.dirty {
            self.frustum = Frustum::from_matrices(&self.view, &self.projection, self.depth);
            self.generation += 1;
            self.dirty = false;
        }
        &self.frustum
    }
}

impl Default for FrustumTracker {
    fn default() -> Self {
        Self::new(ClipDepth::default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn default_view() -> Mat4 {
        Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y)
    }

    pub(crate) fn default_projection() -> Mat4 {
        Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 1000.0)
    }

    pub(crate) fn default_frustum() -> Frustum {
        Frustum::from_matrices(&default_view(), &default_projection(), ClipDepth::ZeroToOne)
    }

    #[test]
    fn test_box_in_front_is_inside() {
        let f = default_frustum();
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -6.0), Vec3::new(1.0, 1.0, -4.0));
        assert_eq!(f.classify(&aabb), Containment::Inside);
    }

    #[test]
    fn test_box_behind_camera_is_outside() {
        let f = default_frustum();
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 10.0));
        assert_eq!(f.classify(&aabb), Containment::Outside);
    }

    #[test]
    fn test_box_straddling_side_plane_intersects() {
        let f = default_frustum();
        let aabb = Aabb::new(Vec3::new(-100.0, -1.0, -10.0), Vec3::new(1.0, 1.0, -5.0));
        assert_eq!(f.classify(&aabb), Containment::Intersecting);
        assert!(f.is_visible(&aabb));
    }

    #[test]
    fn test_box_enclosing_camera_intersects() {
        let f = default_frustum();
        let aabb = Aabb::new(Vec3::splat(-5000.0), Vec3::splat(5000.0));
        assert_eq!(f.classify(&aabb), Containment::Intersecting);
    }

    #[test]
    fn test_all_six_planes_reject() {
        let f = default_frustum();
        let cases = [
            Aabb::new(Vec3::splat(10.0), Vec3::splat(20.0)),
            Aabb::new(Vec3::new(-1000.0, 0.0, -5.0), Vec3::new(-999.0, 1.0, -4.0)),
            Aabb::new(Vec3::new(999.0, 0.0, -5.0), Vec3::new(1000.0, 1.0, -4.0)),
            Aabb::new(Vec3::new(0.0, 999.0, -5.0), Vec3::new(1.0, 1000.0, -4.0)),
            Aabb::new(Vec3::new(0.0, -1000.0, -5.0), Vec3::new(1.0, -999.0, -4.0)),
            Aabb::new(Vec3::new(0.0, 0.0, -2000.0), Vec3::new(1.0, 1.0, -1500.0)),
        ];
        for aabb in &cases {
            assert_eq!(f.classify(aabb), Containment::Outside, "{aabb:?}");
        }
    }

    #[test]
    fn test_gl_depth_range_matches() {
        let proj = Mat4::perspective_rh_gl(std::f32::consts::FRAC_PI_4, 1.0, 0.1, 100.0);
        let f = Frustum::from_matrices(&default_view(), &proj, ClipDepth::NegOneToOne);
        let inside = Aabb::new(Vec3::new(-0.5, -0.5, -3.0), Vec3::new(0.5, 0.5, -2.0));
        let beyond = Aabb::new(Vec3::new(-0.5, -0.5, -300.0), Vec3::new(0.5, 0.5, -200.0));
        let before_near = Aabb::new(Vec3::new(-0.01, -0.01, -0.05), Vec3::new(0.01, 0.01, -0.01));
        assert_eq!(f.classify(&inside), Containment::Inside);
        assert_eq!(f.classify(&beyond), Containment::Outside);
        assert_eq!(f.classify(&before_near), Containment::Outside);
    }

    #[test]
    fn test_planes_normalized() {
        let f = default_frustum();
        for plane in f.planes() {
            let len = plane.truncate().length();
            assert!((len - 1.0).abs() < 1e-4, "plane normal not normalized: {len}");
        }
    }

    #[test]
    fn test_tracker_recomputes_lazily() {
        let mut tracker = FrustumTracker::default();
        tracker.set_view(default_view());
        tracker.set_projection(default_projection());
        assert!(tracker.is_dirty());

        let f = *tracker.frustum();
        assert_eq!(f, default_frustum());
        assert_eq!(tracker.generation(), 1);
        assert!(!tracker.is_dirty());

        // No change: same generation.
        tracker.frustum();
        assert_eq!(tracker.generation(), 1);

        tracker.set_view(Mat4::look_to_rh(Vec3::ZERO, Vec3::Z, Vec3::Y));
        let turned = *tracker.frustum();
        assert_eq!(tracker.generation(), 2);
        let ahead = Aabb::new(Vec3::new(-1.0, -1.0, -6.0), Vec3::new(1.0, 1.0, -4.0));
        assert_eq!(turned.classify(&ahead), Containment::Outside);
    }
}
