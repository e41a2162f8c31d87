//! Deterministic physics kernel
//!
//! Polygon bodies, SAT collision, force generators and the scene tick.
//! Nothing here touches rendering, input or the clock:
//! - Caller-supplied dt only (clamped per scene)
//! - Stable iteration order (arena slot order, generator registration order)

pub mod body;
pub mod collision;
pub mod forces;
pub mod polygon;
pub mod scene;

pub use body::{BodyKind, BulletKind, HidingKind, Rgb, RigidBody};
pub use collision::{CollisionInfo, find_collision, find_collision_unchecked, overlaps};
pub use forces::{
    CollisionHandler, CollisionResponse, ContactState, ForceGenerator, elastic_impulse,
    reduced_mass,
};
pub use polygon::{Aabb, Polygon};
pub use scene::{BodyId, Scene};
