use glam::Vec3;

/// One of the three coordinate axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Index of the axis into a `Vec3` (`0`, `1` or `2`).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Axis-aligned bounding box in f32 world space.
///
/// Invariant for non-empty boxes: min.x <= max.x, min.y <= max.y, min.z <= max.z.
/// [`Aabb::EMPTY`] deliberately breaks it so that it acts as the identity for
/// [`union`](Aabb::union).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Vec3,
    /// Maximum corner of the bounding box.
    pub max: Vec3,
}

impl Aabb {
    /// The inverted-infinite box. Contains nothing, and `EMPTY.union(b) == b`.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create an AABB from two corners. Automatically sorts
    /// components so that min <= max on every axis.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB from the flat `[min_x, min_y, min_z, max_x, max_y, max_z]`
    /// layout scene hosts usually store.
    pub fn from_array(v: [f32; 6]) -> Self {
        Self::new(Vec3::new(v[0], v[1], v[2]), Vec3::new(v[3], v[4], v[5]))
    }

    /// Flat `[min_x, min_y, min_z, max_x, max_y, max_z]` representation.
    pub fn to_array(&self) -> [f32; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }

    /// Smallest box enclosing every box in `boxes`. Returns [`Aabb::EMPTY`]
    /// for an empty iterator.
    pub fn enclosing<'a>(boxes: impl IntoIterator<Item = &'a Aabb>) -> Aabb {
        boxes
            .into_iter()
            .fold(Aabb::EMPTY, |acc, b| acc.union(b))
    }

    /// Returns true if the box encloses no point (min > max on some axis).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns the center point of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the min→max diagonal. Zero for empty boxes.
    pub fn diagonal(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.size().length()
        }
    }

    /// Axis with the largest extent. Ties resolve to X, then Y, then Z.
    pub fn longest_axis(&self) -> Axis {
        let s = self.size();
        if s.x >= s.y && s.x >= s.z {
            Axis::X
        } else if s.y >= s.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Split the box in half along `axis`, returning `(lower, upper)`.
    pub fn split(&self, axis: Axis) -> (Aabb, Aabb) {
        let i = axis.index();
        let mid = (self.min[i] + self.max[i]) * 0.5;

        let mut lower = *self;
        lower.max[i] = mid;
        let mut upper = *self;
        upper.min[i] = mid;
        (lower, upper)
    }

    /// Returns the smallest AABB enclosing both self and other.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow this box in place so that it also encloses `other`.
    pub fn expand_to_include(&mut self, other: &Aabb) {
        *self = self.union(other);
    }

    /// Returns true if `other` lies entirely inside this box
    /// (touching faces count as inside).
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
            && other.min.z >= self.min.z
            && other.max.z <= self.max.z
    }

    /// Returns true if this AABB overlaps with other
    /// (including touching edges/faces).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_constructor_auto_sorts() {
        let aabb = Aabb::new(Vec3::splat(10.0), Vec3::ZERO);
        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::splat(10.0));
    }

    #[test]
    fn test_from_array_layout() {
        let aabb = Aabb::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(aabb.min, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(aabb.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_empty_is_union_identity() {
        let b = unit();
        assert!(Aabb::EMPTY.is_empty());
        assert_eq!(Aabb::EMPTY.union(&b), b);
        assert_eq!(b.union(&Aabb::EMPTY), b);
        assert_eq!(Aabb::EMPTY.diagonal(), 0.0);
    }

    #[test]
    fn test_enclosing() {
        let boxes = [
            Aabb::new(Vec3::ZERO, Vec3::ONE),
            Aabb::new(Vec3::splat(-2.0), Vec3::splat(-1.0)),
        ];
        let e = Aabb::enclosing(&boxes);
        assert_eq!(e.min, Vec3::splat(-2.0));
        assert_eq!(e.max, Vec3::ONE);
        assert!(Aabb::enclosing(&[]).is_empty());
    }

    #[test]
    fn test_diagonal() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
        assert!((aabb.diagonal() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_longest_axis() {
        assert_eq!(
            Aabb::new(Vec3::ZERO, Vec3::new(5.0, 1.0, 1.0)).longest_axis(),
            Axis::X
        );
        assert_eq!(
            Aabb::new(Vec3::ZERO, Vec3::new(1.0, 5.0, 1.0)).longest_axis(),
            Axis::Y
        );
        assert_eq!(
            Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 5.0)).longest_axis(),
            Axis::Z
        );
        // Cube: ties go to X.
        assert_eq!(unit().longest_axis(), Axis::X);
    }

    #[test]
    fn test_split_halves_cover_parent() {
        let parent = Aabb::new(Vec3::ZERO, Vec3::new(8.0, 2.0, 2.0));
        let (lo, hi) = parent.split(Axis::X);
        assert_eq!(lo.max.x, 4.0);
        assert_eq!(hi.min.x, 4.0);
        assert!(parent.contains(&lo));
        assert!(parent.contains(&hi));
        assert_eq!(lo.union(&hi), parent);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let outer = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Aabb::new(Vec3::ONE, Vec3::splat(2.0))));
        assert!(!outer.contains(&Aabb::new(Vec3::splat(9.0), Vec3::splat(11.0))));
    }

    #[test]
    fn test_intersects_touching() {
        let a = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        let b = Aabb::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 10.0, 10.0));
        let c = Aabb::new(Vec3::splat(20.0), Vec3::splat(30.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_expand_to_include_only_grows() {
        let mut a = unit();
        a.expand_to_include(&Aabb::new(Vec3::splat(0.25), Vec3::splat(0.5)));
        assert_eq!(a, unit());
        a.expand_to_include(&Aabb::new(Vec3::splat(-1.0), Vec3::ZERO));
        assert_eq!(a.min, Vec3::splat(-1.0));
        assert_eq!(a.max, Vec3::ONE);
    }
}
