//! Scene-side collaborators: read-only object data and the per-object cull store.
//!
//! The culling core never owns scene objects. It reads them through
//! [`SceneSource`] and writes cull flags through [`CullStore`]; [`Scene`] and
//! [`CullStateTable`] are plain in-memory implementations for hosts that do
//! not have their own.

use fastnav_math::Aabb;

/// Stable identity of a scene object, assigned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// A renderable object as seen by the culling core.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    /// World-space bounds.
    pub aabb: Aabb,
    pub triangle_count: u32,
    /// Semantic type (e.g. `"IfcWindow"`). `None` matches no type list.
    pub type_tag: Option<String>,
}

impl SceneObject {
    pub fn new(id: u64, aabb: Aabb, triangle_count: u32) -> Self {
        Self {
            id: ObjectId(id),
            aabb,
            triangle_count,
            type_tag: None,
        }
    }

    /// Builder-style setter for the semantic type tag.
    pub fn with_type(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }
}

/// Read access to the host's objects, addressed by dense index.
pub trait SceneSource {
    /// Number of index slots; valid indices are `0..object_count()`.
    fn object_count(&self) -> usize;

    /// Object at `index`, or `None` if the slot is empty.
    fn object(&self, index: usize) -> Option<&SceneObject>;

    /// Bound of the whole scene.
    fn scene_bounds(&self) -> Aabb {
        (0..self.object_count())
            .filter_map(|i| self.object(i))
            .fold(Aabb::EMPTY, |acc, o| acc.union(&o.aabb))
    }
}

/// Write access to per-object cull flags.
pub trait CullStore {
    fn set_detail_culled(&mut self, index: usize, culled: bool);
    fn set_view_culled(&mut self, index: usize, culled: bool);
}

/// Cull flags of a single object. Final visibility is the OR of every layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CullState {
    pub view_culled: bool,
    pub detail_culled: bool,
}

impl CullState {
    pub fn is_culled(&self) -> bool {
        self.view_culled || self.detail_culled
    }
}

/// Growable object list with stable indices.
///
/// Removing an object leaves an empty slot, so indices recorded by a cull
/// layer keep naming the same objects.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    slots: Vec<Option<SceneObject>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object and return its index.
    pub fn add(&mut self, object: SceneObject) -> usize {
        self.slots.push(Some(object));
        self.slots.len() - 1
    }

    /// Take the object at `index` out, leaving its slot empty.
    pub fn remove(&mut self, index: usize) -> Option<SceneObject> {
        self.slots.get_mut(index)?.take()
    }

    /// Live objects with their indices, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SceneObject)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|o| (i, o)))
    }

    /// Live objects in index order.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.slots.iter().flatten()
    }

    pub fn live_count(&self) -> usize {
        self.objects().count()
    }
}

impl FromIterator<SceneObject> for Scene {
    fn from_iter<T: IntoIterator<Item = SceneObject>>(iter: T) -> Self {
        Self {
            slots: iter.into_iter().map(Some).collect(),
        }
    }
}

impl SceneSource for Scene {
    fn object_count(&self) -> usize {
        self.slots.len()
    }

    fn object(&self, index: usize) -> Option<&SceneObject> {
        self.slots.get(index)?.as_ref()
    }
}

/// Dense per-object cull flags. Writes past the end grow the table.
#[derive(Clone, Debug, Default)]
pub struct CullStateTable {
    states: Vec<CullState>,
}

impl CullStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            states: vec![CullState::default(); len],
        }
    }

    pub fn get(&self, index: usize) -> CullState {
        self.states.get(index).copied().unwrap_or_default()
    }

    /// Returns true unless some cull layer hides the object.
    pub fn is_visible(&self, index: usize) -> bool {
        !self.get(index).is_culled()
    }

    /// Indices whose `detail_culled` flag is set, ascending.
    pub fn detail_culled_indices(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.detail_culled.then_some(i))
            .collect()
    }

    /// Indices whose `view_culled` flag is set, ascending.
    pub fn view_culled_indices(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.view_culled.then_some(i))
            .collect()
    }

    fn slot(&mut self, index: usize) -> &mut CullState {
        if index >= self.states.len() {
            self.states.resize(index + 1, CullState::default());
        }
        &mut self.states[index]
    }
}

impl CullStore for CullStateTable {
    fn set_detail_culled(&mut self, index: usize, culled: bool) {
        self.slot(index).detail_culled = culled;
    }

    fn set_view_culled(&mut self, index: usize, culled: bool) {
        self.slot(index).view_culled = culled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_scene_bounds_encloses_all() {
        let scene: Scene = [
            SceneObject::new(1, Aabb::new(Vec3::ZERO, Vec3::ONE), 10),
            SceneObject::new(2, Aabb::new(Vec3::splat(-3.0), Vec3::splat(-2.0)), 10),
        ]
        .into_iter()
        .collect();
        let b = scene.scene_bounds();
        assert_eq!(b.min, Vec3::splat(-3.0));
        assert_eq!(b.max, Vec3::ONE);
    }

    #[test]
    fn test_empty_scene_bounds_is_empty() {
        assert!(Scene::new().scene_bounds().is_empty());
    }

    #[test]
    fn test_cull_layers_combine() {
        let mut table = CullStateTable::with_len(2);
        assert!(table.is_visible(0));
        table.set_detail_culled(0, true);
        assert!(!table.is_visible(0));
        table.set_view_culled(1, true);
        assert!(!table.is_visible(1));
        table.set_detail_culled(0, false);
        assert!(table.is_visible(0));
    }

    #[test]
    fn test_table_grows_on_write() {
        let mut table = CullStateTable::new();
        table.set_detail_culled(5, true);
        assert_eq!(table.detail_culled_indices(), vec![5]);
        assert!(table.is_visible(4));
        assert!(table.is_visible(100));
    }

    #[test]
    fn test_remove_keeps_later_indices() {
        let mut scene = Scene::new();
        scene.add(SceneObject::new(1, Aabb::new(Vec3::ZERO, Vec3::ONE), 1));
        scene.add(SceneObject::new(2, Aabb::new(Vec3::ZERO, Vec3::ONE), 2));
        assert_eq!(scene.remove(0).map(|o| o.id), Some(ObjectId(1)));
        assert!(scene.object(0).is_none());
        assert_eq!(scene.object(1).map(|o| o.id), Some(ObjectId(2)));
        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.live_count(), 1);
        assert!(scene.remove(0).is_none());
        assert!(scene.remove(7).is_none());

        let index = scene.add(SceneObject::new(3, Aabb::new(Vec3::ZERO, Vec3::ONE), 3));
        assert_eq!(index, 2);
        let live: Vec<usize> = scene.iter().map(|(i, _)| i).collect();
        assert_eq!(live, vec![1, 2]);
    }

    #[test]
    fn test_removed_slot_skipped_by_bounds() {
        let mut scene = Scene::new();
        scene.add(SceneObject::new(1, Aabb::new(Vec3::splat(10.0), Vec3::splat(11.0)), 1));
        scene.add(SceneObject::new(2, Aabb::new(Vec3::ZERO, Vec3::ONE), 1));
        scene.remove(0);
        let b = scene.scene_bounds();
        assert_eq!(b.max, Vec3::ONE);
    }
}
