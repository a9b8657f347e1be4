//! Culling core: frustum classification, the loose KD-tree spatial index, and
//! detail culling over host-owned scene objects.

pub mod detail;
pub mod frustum;
pub mod kd_tree;
pub mod scene;

pub use detail::{
    DetailCullConfig, DetailCullSelector, normalize_size_threshold, normalize_triangle_threshold,
    should_cull,
};
pub use frustum::{ClipDepth, Containment, Frustum, FrustumTracker};
pub use kd_tree::{
    DEFAULT_MAX_DEPTH, FrustumQuery, KdNode, SpatialIndex, TraversalStats, TreeStats,
};
pub use scene::{CullState, CullStateTable, CullStore, ObjectId, Scene, SceneObject, SceneSource};
