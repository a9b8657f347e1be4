//! Loose, bounds-expanding KD-tree over scene objects.
//!
//! Each node splits its bound in half along the longest axis. An object
//! descends into the first child whose bound fully contains it; objects that
//! fit in neither child (or that reach the depth limit) stay in the node's
//! overflow list, and the node's bound grows to enclose them. Bounds only ever
//! grow, so every node bound encloses all objects in its subtree.
//!
//! The tree is never patched after a structural scene change: adding or
//! removing an object marks the index dirty and the next access rebuilds it
//! from scratch.

use fastnav_math::Aabb;
use tracing::debug;

use crate::frustum::{Containment, Frustum};
use crate::scene::SceneSource;

/// Default maximum node depth (root is depth 0).
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// A node of the KD-tree. Children are exclusively owned.
#[derive(Debug)]
pub struct KdNode {
    bound: Aabb,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
    objects: Vec<usize>,
    /// Last classification, stamped with the frustum generation it was made against.
    classification: Option<(u64, Containment)>,
    depth: u32,
}

impl KdNode {
    fn new(bound: Aabb, depth: u32) -> Self {
        Self {
            bound,
            left: None,
            right: None,
            objects: Vec::new(),
            classification: None,
            depth,
        }
    }

    pub fn bound(&self) -> &Aabb {
        &self.bound
    }

    pub fn left(&self) -> Option<&KdNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&KdNode> {
        self.right.as_deref()
    }

    /// Indices of the objects stored directly in this node.
    pub fn objects(&self) -> &[usize] {
        &self.objects
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Cached classification, if one was made against frustum `generation`.
    pub fn cached_classification(&self, generation: u64) -> Option<Containment> {
        match self.classification {
            Some((g, c)) if g == generation => Some(c),
            _ => None,
        }
    }

    /// Existing children, left first.
    pub fn children(&self) -> impl Iterator<Item = &KdNode> {
        self.left().into_iter().chain(self.right())
    }

    /// Calls `f` with every object index in this subtree.
    pub fn for_each_object(&self, f: &mut impl FnMut(usize)) {
        self.objects.iter().copied().for_each(&mut *f);
        for child in self.children() {
            child.for_each_object(f);
        }
    }

    fn insert(&mut self, aabb: &Aabb, index: usize, max_depth: u32) {
        if let Some(left) = self.left.as_deref_mut()
            && left.bound.contains(aabb)
        {
            left.insert(aabb, index, max_depth);
            return;
        }
        if let Some(right) = self.right.as_deref_mut()
            && right.bound.contains(aabb)
        {
            right.insert(aabb, index, max_depth);
            return;
        }

        if self.depth < max_depth && !self.bound.is_empty() {
            let (lower, upper) = self.bound.split(self.bound.longest_axis());
            let child_depth = self.depth + 1;

            if self.left.is_none() {
                let left = self.left.insert(Box::new(KdNode::new(lower, child_depth)));
                if left.bound.contains(aabb) {
                    left.insert(aabb, index, max_depth);
                    return;
                }
            }
            if self.right.is_none() {
                let right = self.right.insert(Box::new(KdNode::new(upper, child_depth)));
                if right.bound.contains(aabb) {
                    right.insert(aabb, index, max_depth);
                    return;
                }
            }
        }

        self.objects.push(index);
        if !self.bound.contains(aabb) {
            self.bound.expand_to_include(aabb);
            self.classification = None;
        }
    }

    fn traverse(
        &mut self,
        frustum: &Frustum,
        generation: u64,
        stats: &mut TraversalStats,
        visitor: &mut impl FnMut(&KdNode, Containment),
    ) {
        if self.bound.is_empty() {
            return;
        }
        stats.nodes_visited += 1;

        let containment = match self.cached_classification(generation) {
            Some(c) => c,
            None => {
                stats.nodes_classified += 1;
                let c = frustum.classify(&self.bound);
                self.classification = Some((generation, c));
                c
            }
        };

        visitor(&*self, containment);

        if containment == Containment::Intersecting {
            if let Some(left) = self.left.as_deref_mut() {
                left.traverse(frustum, generation, stats, visitor);
            }
            if let Some(right) = self.right.as_deref_mut() {
                right.traverse(frustum, generation, stats, visitor);
            }
        }
    }

    fn accumulate_stats(&self, stats: &mut TreeStats) {
        stats.node_count += 1;
        stats.object_count += self.objects.len();
        stats.deepest = stats.deepest.max(self.depth);
        for child in self.children() {
            child.accumulate_stats(stats);
        }
    }
}

/// Shape summary of a built tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub node_count: usize,
    pub object_count: usize,
    /// Depth of the deepest node.
    pub deepest: u32,
}

/// Work done by a single [`SpatialIndex::traverse`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub nodes_visited: usize,
    /// Nodes whose classification was computed rather than read from cache.
    pub nodes_classified: usize,
}

/// Object indices partitioned by their containment in a frustum.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrustumQuery {
    pub inside: Vec<usize>,
    pub intersecting: Vec<usize>,
    pub outside: Vec<usize>,
}

impl FrustumQuery {
    /// Containment of `index`, or `None` if the object was not classified.
    pub fn containment_of(&self, index: usize) -> Option<Containment> {
        if self.inside.contains(&index) {
            Some(Containment::Inside)
        } else if self.intersecting.contains(&index) {
            Some(Containment::Intersecting)
        } else if self.outside.contains(&index) {
            Some(Containment::Outside)
        } else {
            None
        }
    }

    /// Indices not fully outside the frustum, ascending.
    pub fn visible(&self) -> Vec<usize> {
        let mut v: Vec<usize> = self
            .inside
            .iter()
            .chain(&self.intersecting)
            .copied()
            .collect();
        v.sort_unstable();
        v
    }

    fn sort(&mut self) {
        self.inside.sort_unstable();
        self.intersecting.sort_unstable();
        self.outside.sort_unstable();
    }
}

/// Lazily built KD-tree over a [`SceneSource`].
#[derive(Debug)]
pub struct SpatialIndex {
    root: Option<Box<KdNode>>,
    max_depth: u32,
    dirty: bool,
}

impl SpatialIndex {
    pub fn new(max_depth: u32) -> Self {
        Self {
            root: None,
            max_depth,
            dirty: true,
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Change the depth limit. Takes effect on the next rebuild.
    pub fn set_max_depth(&mut self, max_depth: u32) {
        if self.max_depth != max_depth {
            self.max_depth = max_depth;
            self.dirty = true;
        }
    }

    /// Invalidate the whole tree (object added or removed).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Root node, if the tree has been built.
    pub fn root(&self) -> Option<&KdNode> {
        self.root.as_deref()
    }

    /// Rebuild if dirty. Returns true if a rebuild happened.
    pub fn ensure_built<S: SceneSource + ?Sized>(&mut self, scene: &S) -> bool {
        if self.dirty || self.root.is_none() {
            self.rebuild(scene);
            true
        } else {
            false
        }
    }

    /// Discard the tree and insert every scene object, in index order, into a
    /// fresh root spanning the scene bound.
    pub fn rebuild<S: SceneSource + ?Sized>(&mut self, scene: &S) {
        let mut root = Box::new(KdNode::new(scene.scene_bounds(), 0));
        for index in 0..scene.object_count() {
            if let Some(object) = scene.object(index) {
                root.insert(&object.aabb, index, self.max_depth);
            }
        }
        self.root = Some(root);
        self.dirty = false;

        let stats = self.stats();
        debug!(
            nodes = stats.node_count,
            objects = stats.object_count,
            deepest = stats.deepest,
            "rebuilt kd-tree"
        );
    }

    /// Insert a single object. Creates the root from the object's bound if
    /// the tree is empty.
    pub fn insert(&mut self, aabb: &Aabb, index: usize) {
        let max_depth = self.max_depth;
        self.root
            .get_or_insert_with(|| Box::new(KdNode::new(*aabb, 0)))
            .insert(aabb, index, max_depth);
    }

    /// Visit nodes top-down against `frustum`.
    ///
    /// The visitor receives each reached node with its containment. Children
    /// are only descended into for [`Containment::Intersecting`] nodes; an
    /// `Inside` or `Outside` result holds for the whole subtree. Per-node
    /// results are cached under `generation` and reused by later traversals
    /// with the same generation.
    pub fn traverse(
        &mut self,
        frustum: &Frustum,
        generation: u64,
        mut visitor: impl FnMut(&KdNode, Containment),
    ) -> TraversalStats {
        let mut stats = TraversalStats::default();
        if let Some(root) = self.root.as_deref_mut() {
            root.traverse(frustum, generation, &mut stats, &mut visitor);
        }
        stats
    }

    /// Partition every indexed object by frustum containment.
    ///
    /// Objects under an `Inside`/`Outside` node inherit its result. Objects
    /// stored in an `Intersecting` node are classified individually, so each
    /// object ends up with the same result as classifying its own box.
    pub fn classify_objects<S: SceneSource + ?Sized>(
        &mut self,
        frustum: &Frustum,
        generation: u64,
        scene: &S,
    ) -> FrustumQuery {
        self.ensure_built(scene);

        let mut query = FrustumQuery::default();
        self.traverse(frustum, generation, |node, containment| match containment {
            Containment::Inside => node.for_each_object(&mut |i| query.inside.push(i)),
            Containment::Outside => node.for_each_object(&mut |i| query.outside.push(i)),
            Containment::Intersecting => {
                for &i in node.objects() {
                    let Some(object) = scene.object(i) else {
                        continue;
                    };
                    match frustum.classify(&object.aabb) {
                        Containment::Inside => query.inside.push(i),
                        Containment::Outside => query.outside.push(i),
                        Containment::Intersecting => query.intersecting.push(i),
                    }
                }
            }
        });
        query.sort();
        query
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        if let Some(root) = self.root() {
            root.accumulate_stats(&mut stats);
        }
        stats
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
