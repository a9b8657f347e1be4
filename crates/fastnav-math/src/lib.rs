//! Geometry primitives shared by the culling crates: f32 axis-aligned boxes and axes.

mod aabb;

pub use aabb::{Aabb, Axis};
pub use glam::{Mat4, Vec3, Vec4};
