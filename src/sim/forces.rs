//! Force generators
//!
//! Each generator runs once per scene tick and only queues forces or
//! impulses on the bodies it tracks; integration happens afterwards.
//! Generators hold body handles, never the bodies themselves.

use std::fmt;

use super::body::{BodyKind, RigidBody};
use super::collision::find_collision;
use super::scene::{Bodies, BodyId};
use crate::Vector;
use crate::consts::{DRAG_FADE_STEP, GRAVITY_BUFFER};

/// App-supplied collision callback; owns whatever context it needs
pub trait CollisionHandler {
    /// Called once when the pair enters contact. `axis` points from `first`
    /// toward `second`.
    fn on_contact(&mut self, first: &mut RigidBody, second: &mut RigidBody, axis: Vector);
}

impl<F> CollisionHandler for F
where
    F: FnMut(&mut RigidBody, &mut RigidBody, Vector),
{
    fn on_contact(&mut self, first: &mut RigidBody, second: &mut RigidBody, axis: Vector) {
        self(first, second, axis)
    }
}

/// Edge-trigger latch for a collision pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactState {
    #[default]
    Separated,
    Touching,
}

impl ContactState {
    /// Feed this tick's overlap result; true only on entering contact
    pub fn advance(&mut self, collided: bool) -> bool {
        match (*self, collided) {
            (ContactState::Separated, true) => {
                *self = ContactState::Touching;
                true
            }
            (ContactState::Touching, false) => {
                *self = ContactState::Separated;
                false
            }
            _ => false,
        }
    }
}

/// What happens when a collision pair first touches
pub enum CollisionResponse {
    /// Exchange momentum along the collision axis
    Impulse { elasticity: f64 },
    /// Reflect the first body off the second, which is treated as immovable
    ///
    /// Writes the velocity instead of queuing an impulse, and only when the
    /// first body is still moving into the second. Several blockers entered
    /// in the same tick therefore reflect it once per axis.
    Reflect { elasticity: f64 },
    /// Remove both bodies
    DestroyBoth,
    /// Remove the first body only
    DestroyFirst,
    /// Remove whichever body has `kind` (first checked first) and bounce the other
    DestroyTagged { kind: BodyKind, elasticity: f64 },
    /// Remove whichever body has `kind` and slow the other with a fading drag
    SlowOnHit { kind: BodyKind, gamma: f64 },
    Custom(Box<dyn CollisionHandler>),
}

impl fmt::Debug for CollisionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionResponse::Impulse { elasticity } => f
                .debug_struct("Impulse")
                .field("elasticity", elasticity)
                .finish(),
            CollisionResponse::Reflect { elasticity } => f
                .debug_struct("Reflect")
                .field("elasticity", elasticity)
                .finish(),
            CollisionResponse::DestroyBoth => f.write_str("DestroyBoth"),
            CollisionResponse::DestroyFirst => f.write_str("DestroyFirst"),
            CollisionResponse::DestroyTagged { kind, elasticity } => f
                .debug_struct("DestroyTagged")
                .field("kind", kind)
                .field("elasticity", elasticity)
                .finish(),
            CollisionResponse::SlowOnHit { kind, gamma } => f
                .debug_struct("SlowOnHit")
                .field("kind", kind)
                .field("gamma", gamma)
                .finish(),
            CollisionResponse::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A per-tick force source
#[derive(Debug)]
pub enum ForceGenerator {
    /// Inverse-square attraction between two bodies
    Gravity { g: f64, pair: [BodyId; 2] },
    /// Linear spring with zero rest length
    Spring { k: f64, pair: [BodyId; 2] },
    /// Force opposing velocity
    Drag { gamma: f64, body: BodyId },
    /// Drag whose coefficient decays by a fixed step each tick until zero
    FadingDrag { gamma: f64, body: BodyId },
    Collision {
        pair: [BodyId; 2],
        state: ContactState,
        response: CollisionResponse,
    },
}

impl ForceGenerator {
    pub fn gravity(g: f64, a: BodyId, b: BodyId) -> Self {
        ForceGenerator::Gravity { g, pair: [a, b] }
    }

    pub fn spring(k: f64, a: BodyId, b: BodyId) -> Self {
        ForceGenerator::Spring { k, pair: [a, b] }
    }

    pub fn drag(gamma: f64, body: BodyId) -> Self {
        ForceGenerator::Drag { gamma, body }
    }

    pub fn fading_drag(gamma: f64, body: BodyId) -> Self {
        ForceGenerator::FadingDrag { gamma, body }
    }

    pub fn collision(a: BodyId, b: BodyId, response: CollisionResponse) -> Self {
        ForceGenerator::Collision {
            pair: [a, b],
            state: ContactState::Separated,
            response,
        }
    }

    /// Handles of every body this generator reads or writes
    pub fn bodies(&self) -> &[BodyId] {
        match self {
            ForceGenerator::Gravity { pair, .. }
            | ForceGenerator::Spring { pair, .. }
            | ForceGenerator::Collision { pair, .. } => pair,
            ForceGenerator::Drag { body, .. } | ForceGenerator::FadingDrag { body, .. } => {
                std::slice::from_ref(body)
            }
        }
    }

    /// Queue this tick's forces. Generators created as a side effect (a slow
    /// effect attached on hit) are pushed to `spawned`.
    pub(crate) fn apply(&mut self, bodies: &mut Bodies, spawned: &mut Vec<ForceGenerator>) {
        match self {
            ForceGenerator::Gravity { g, pair } => {
                let Some([a, b]) = bodies.get_disjoint_mut(*pair) else {
                    return;
                };
                let force = gravity_force(*g, a, b);
                a.add_force(force);
                b.add_force(-force);
            }
            ForceGenerator::Spring { k, pair } => {
                let Some([a, b]) = bodies.get_disjoint_mut(*pair) else {
                    return;
                };
                let force = -*k * (a.centroid() - b.centroid());
                a.add_force(force);
                b.add_force(-force);
            }
            ForceGenerator::Drag { gamma, body } => {
                if let Some(body) = bodies.get_mut(*body) {
                    apply_drag(*gamma, body);
                }
            }
            ForceGenerator::FadingDrag { gamma, body } => {
                if *gamma <= 0.0 {
                    return;
                }
                *gamma = (*gamma - DRAG_FADE_STEP).max(0.0);
                if *gamma > 0.0 {
                    if let Some(body) = bodies.get_mut(*body) {
                        apply_drag(*gamma, body);
                    }
                }
            }
            ForceGenerator::Collision {
                pair,
                state,
                response,
            } => {
                let ids = *pair;
                let Some([a, b]) = bodies.get_disjoint_mut(ids) else {
                    return;
                };
                let info = find_collision(a.shape(), b.shape());
                if state.advance(info.collided) {
                    response.handle(a, b, info.axis, ids, spawned);
                }
            }
        }
    }
}

impl CollisionResponse {
    fn handle(
        &mut self,
        a: &mut RigidBody,
        b: &mut RigidBody,
        axis: Vector,
        ids: [BodyId; 2],
        spawned: &mut Vec<ForceGenerator>,
    ) {
        match self {
            CollisionResponse::Impulse { elasticity } => {
                let impulse = elastic_impulse(a, b, axis, *elasticity);
                a.add_impulse(impulse);
                b.add_impulse(-impulse);
            }
            CollisionResponse::Reflect { elasticity } => {
                let approach = a.velocity().dot(axis);
                if approach > 0.0 {
                    a.set_velocity(a.velocity() - axis * ((1.0 + *elasticity) * approach));
                }
            }
            CollisionResponse::DestroyBoth => {
                a.remove();
                b.remove();
            }
            CollisionResponse::DestroyFirst => a.remove(),
            CollisionResponse::DestroyTagged { kind, elasticity } => {
                let impulse = elastic_impulse(a, b, axis, *elasticity);
                if a.kind() == *kind {
                    a.remove();
                    b.add_impulse(-impulse);
                } else if b.kind() == *kind {
                    b.remove();
                    a.add_impulse(impulse);
                }
            }
            CollisionResponse::SlowOnHit { kind, gamma } => {
                if a.kind() == *kind {
                    a.remove();
                    spawned.push(ForceGenerator::fading_drag(*gamma, ids[1]));
                } else if b.kind() == *kind {
                    b.remove();
                    spawned.push(ForceGenerator::fading_drag(*gamma, ids[0]));
                }
            }
            CollisionResponse::Custom(handler) => handler.on_contact(a, b, axis),
        }
    }
}

/// Effective mass of a two-body exchange
///
/// Harmonic combination when both are finite, the finite mass when one side is
/// infinite, zero when both are.
pub fn reduced_mass(m1: f64, m2: f64) -> f64 {
    match (m1.is_infinite(), m2.is_infinite()) {
        (false, false) => m1 * m2 / (m1 + m2),
        (false, true) => m1,
        (true, false) => m2,
        (true, true) => 0.0,
    }
}

/// Impulse to add to `first` (and subtract from `second`) for a collision
/// along `axis`
pub fn elastic_impulse(first: &RigidBody, second: &RigidBody, axis: Vector, elasticity: f64) -> Vector {
    let u1 = first.velocity().dot(axis);
    let u2 = second.velocity().dot(axis);
    let mu = reduced_mass(first.mass(), second.mass());
    axis * (mu * (1.0 + elasticity) * (u2 - u1))
}

/// Force on `a` due to `b`
///
/// Zero at or inside the buffer distance, and whenever either body is
/// immovable.
fn gravity_force(g: f64, a: &RigidBody, b: &RigidBody) -> Vector {
    if a.is_immovable() || b.is_immovable() {
        return Vector::ZERO;
    }
    let offset = b.centroid() - a.centroid();
    let distance = offset.length();
    if distance <= GRAVITY_BUFFER {
        return Vector::ZERO;
    }
    let magnitude = g * a.mass() * b.mass() / (distance * distance);
    offset / distance * magnitude
}

fn apply_drag(gamma: f64, body: &mut RigidBody) {
    let force = -gamma * body.velocity();
    body.add_force(force);
}
