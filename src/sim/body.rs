//! Rigid bodies and their integrator
//!
//! A body owns its world-space hull and keeps a cached centroid in sync with
//! it. Forces and impulses are queued and only take effect in `tick`.

use serde::{Deserialize, Serialize};

use super::polygon::Polygon;
use crate::Vector;

/// RGB color, consumed by the renderer only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Hiding spot flavors in the stealth map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HidingKind {
    Locker,
    Dumpster,
}

/// Projectile flavors in the shooter demos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BulletKind {
    #[default]
    Plain,
    /// Knocks the target back and disappears
    Explosive,
    /// Slows the target with a fading drag
    Gravity,
}

/// What a body represents to game code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BodyKind {
    #[default]
    Untagged,
    Ball,
    Brick,
    Player,
    Wall,
    Door,
    Coin,
    HidingSpot(HidingKind),
    Node,
    Bullet(BulletKind),
    Alien,
}

/// A polygonal rigid body
#[derive(Debug, Clone)]
pub struct RigidBody {
    shape: Polygon,
    centroid: Vector,
    velocity: Vector,
    /// Radians; tracked apart from the hull so `set_rotation` is absolute
    orientation: f64,
    /// May be `f64::INFINITY` for immovable bodies
    mass: f64,
    color: Rgb,
    kind: BodyKind,
    forces: Vec<Vector>,
    impulses: Vec<Vector>,
    removed: bool,
}

impl RigidBody {
    /// Panics unless `mass` is positive (infinity allowed).
    pub fn new(shape: Polygon, mass: f64, color: Rgb) -> Self {
        assert!(mass > 0.0, "body mass must be positive, got {mass}");
        let centroid = shape.centroid();
        Self {
            shape,
            centroid,
            velocity: Vector::ZERO,
            orientation: 0.0,
            mass,
            color,
            kind: BodyKind::Untagged,
            forces: Vec::new(),
            impulses: Vec::new(),
            removed: false,
        }
    }

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn shape(&self) -> &Polygon {
        &self.shape
    }

    #[inline]
    pub fn centroid(&self) -> Vector {
        self.centroid
    }

    /// Move the body so its centroid lands on `centroid`
    pub fn set_centroid(&mut self, centroid: Vector) {
        self.shape.translate(centroid - self.centroid);
        self.centroid = centroid;
    }

    #[inline]
    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    #[inline]
    pub fn set_velocity(&mut self, velocity: Vector) {
        self.velocity = velocity;
    }

    #[inline]
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// Rotate the hull about its centroid to the absolute angle `angle`
    pub fn set_rotation(&mut self, angle: f64) {
        self.shape.rotate(angle - self.orientation, self.centroid);
        self.orientation = angle;
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// 1/m, exactly zero for infinite mass
    #[inline]
    pub fn inverse_mass(&self) -> f64 {
        if self.mass.is_infinite() { 0.0 } else { 1.0 / self.mass }
    }

    #[inline]
    pub fn is_immovable(&self) -> bool {
        self.mass.is_infinite()
    }

    #[inline]
    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    #[inline]
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: BodyKind) {
        self.kind = kind;
    }

    /// Queue a force for the next tick
    pub fn add_force(&mut self, force: Vector) {
        self.forces.push(force);
    }

    /// Queue an instantaneous momentum change for the next tick
    pub fn add_impulse(&mut self, impulse: Vector) {
        self.impulses.push(impulse);
    }

    /// Soft-delete; the scene reaps the body at the start of its next tick
    pub fn remove(&mut self) {
        self.removed = true;
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Linear momentum (zero for immovable bodies at rest)
    pub fn momentum(&self) -> Vector {
        if self.is_immovable() {
            return Vector::ZERO;
        }
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        if self.is_immovable() {
            return 0.0;
        }
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Integrate queued forces and impulses over `dt`
    ///
    /// Velocity takes every force (scaled by dt) and every impulse; position
    /// advances by the average of the old and new velocity.
    pub fn tick(&mut self, dt: f64) {
        let inv_mass = self.inverse_mass();
        let old_velocity = self.velocity;

        let force_dv: Vector = self.forces.iter().map(|f| *f * inv_mass * dt).sum();
        let impulse_dv: Vector = self.impulses.iter().map(|j| *j * inv_mass).sum();
        let new_velocity = old_velocity + force_dv + impulse_dv;

        let centroid = self.centroid + (old_velocity + new_velocity) * (0.5 * dt);
        self.set_centroid(centroid);
        self.velocity = new_velocity;

        self.forces.clear();
        self.impulses.clear();
    }
}
