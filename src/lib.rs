//! Polyarcade - a small 2D physics kernel for arcade game demos
//!
//! Core modules:
//! - `sim`: Polygon bodies, SAT collision, force generators and the scene tick
//! - `nav`: Fixed navigation grid, sorted priority queue and A* search
//! - `ai`: Line-of-sight and the stalking state machine
//! - `stealth`: World aggregate for the stealth-chase demo
//! - `settings`: Data-driven simulation tuning

pub mod ai;
pub mod nav;
pub mod settings;
pub mod sim;
pub mod stealth;

pub use settings::{Difficulty, SettingsError, SimSettings};

use glam::DVec2;

/// 2D vector used throughout the kernel (float64)
pub type Vector = DVec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Largest dt a single scene tick will integrate
    pub const MAX_DT: f64 = 0.1;

    /// Navigation grid dimensions (cells)
    pub const GRID_WIDTH: usize = 100;
    pub const GRID_HEIGHT: usize = 100;
    /// World units per grid cell
    pub const CELL_SIZE: f64 = 10.0;
    /// Edge weight for an axis-aligned grid move
    pub const STRAIGHT_COST: f64 = CELL_SIZE;
    /// Edge weight for a diagonal grid move
    pub const DIAGONAL_COST: f64 = CELL_SIZE * std::f64::consts::SQRT_2;

    /// Below this separation gravity contributes no force
    pub const GRAVITY_BUFFER: f64 = 0.01;
    /// Per-tick decrement of a fading drag coefficient
    pub const DRAG_FADE_STEP: f64 = 0.2;
    /// Elasticity used by demo collisions unless configured otherwise
    pub const DEFAULT_ELASTICITY: f64 = 1.0;

    /// Stalker defaults
    pub const VISION_RADIUS: f64 = 75.0;
    pub const LOOK_TIME: f64 = 1.0;
    pub const STALK_SPEED: f64 = 50.0;
    pub const CHASE_SPEED: f64 = 75.0;
    pub const MAX_PATH_LEGS: usize = 3;
    pub const ARRIVAL_TOLERANCE: f64 = 5.0;
    /// Patrol sampling radius around the player (cells)
    pub const STALK_RADIUS: usize = 15;

    /// Player/alien diamond radius
    pub const ACTOR_RADIUS: f64 = CELL_SIZE / 2.5;
    pub const ACTOR_MASS: f64 = 1.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> Vector {
    Vector::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vector) -> (f64, f64) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Z component of the 3D cross product of two planar vectors
#[inline]
pub fn cross(a: Vector, b: Vector) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Rotate `v` counterclockwise by `angle` radians about the origin
#[inline]
pub fn rotate(v: Vector, angle: f64) -> Vector {
    let (sin, cos) = angle.sin_cos();
    Vector::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[inline]
pub fn distance(a: Vector, b: Vector) -> f64 {
    a.distance(b)
}

/// Angle of `point` as seen from `origin`, measured from +x, in [-π, π)
#[inline]
pub fn angle_from(point: Vector, origin: Vector) -> f64 {
    let d = point - origin;
    normalize_angle(d.y.atan2(d.x))
}

/// Component-wise closeness: both |dx| and |dy| below `epsilon`
#[inline]
pub fn is_close(epsilon: f64, a: Vector, b: Vector) -> bool {
    (a.x - b.x).abs() < epsilon && (a.y - b.y).abs() < epsilon
}
