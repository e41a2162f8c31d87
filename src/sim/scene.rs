//! Scene: body arena plus ordered force generators
//!
//! Each tick reaps soft-deleted bodies (and any generator that referenced
//! them), runs every generator once in registration order, then integrates
//! every remaining body.

use std::ops::{Index, IndexMut};

use slotmap::{SlotMap, new_key_type};

use super::body::{BodyKind, RigidBody};
use super::forces::{CollisionHandler, CollisionResponse, ForceGenerator};
use crate::consts::MAX_DT;

new_key_type! {
    /// Generation-checked handle to a body in a [`Scene`]
    pub struct BodyId;
}

pub(crate) type Bodies = SlotMap<BodyId, RigidBody>;

#[derive(Debug)]
pub struct Scene {
    bodies: Bodies,
    generators: Vec<ForceGenerator>,
    max_dt: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_max_dt(MAX_DT)
    }

    /// Scene whose `tick` integrates at most `max_dt` seconds per call
    pub fn with_max_dt(max_dt: f64) -> Self {
        assert!(max_dt > 0.0, "max_dt must be positive, got {max_dt}");
        Self {
            bodies: SlotMap::with_key(),
            generators: Vec::new(),
            max_dt,
        }
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        self.bodies.insert(body)
    }

    /// Soft-delete; the body stays readable until the next tick reaps it.
    /// Returns false for an unknown or already reaped handle.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        match self.bodies.get_mut(id) {
            Some(body) => {
                body.remove();
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn get(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Every body still in the arena, including ones flagged for removal
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies.iter()
    }

    /// Bodies tagged with `kind`
    pub fn bodies_of_kind(&self, kind: BodyKind) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies.iter().filter(move |(_, body)| body.kind() == kind)
    }

    #[inline]
    pub fn max_dt(&self) -> f64 {
        self.max_dt
    }

    /// Panics if the generator references a body not in the scene.
    pub fn add_generator(&mut self, generator: ForceGenerator) {
        for id in generator.bodies() {
            assert!(
                self.bodies.contains_key(*id),
                "force generator references unknown body {id:?}"
            );
        }
        self.generators.push(generator);
    }

    pub fn add_gravity(&mut self, g: f64, a: BodyId, b: BodyId) {
        self.add_generator(ForceGenerator::gravity(g, a, b));
    }

    pub fn add_spring(&mut self, k: f64, a: BodyId, b: BodyId) {
        self.add_generator(ForceGenerator::spring(k, a, b));
    }

    pub fn add_drag(&mut self, gamma: f64, body: BodyId) {
        self.add_generator(ForceGenerator::drag(gamma, body));
    }

    pub fn add_fading_drag(&mut self, gamma: f64, body: BodyId) {
        self.add_generator(ForceGenerator::fading_drag(gamma, body));
    }

    pub fn add_collision(&mut self, a: BodyId, b: BodyId, response: CollisionResponse) {
        self.add_generator(ForceGenerator::collision(a, b, response));
    }

    /// Bounce the pair off each other on first contact
    pub fn add_impulse_collision(&mut self, elasticity: f64, a: BodyId, b: BodyId) {
        self.add_collision(a, b, CollisionResponse::Impulse { elasticity });
    }

    /// Bounce `body` off an immovable `blocker` without stacking when it enters
    /// several blockers at once
    pub fn add_reflect_collision(&mut self, elasticity: f64, body: BodyId, blocker: BodyId) {
        self.add_collision(body, blocker, CollisionResponse::Reflect { elasticity });
    }

    /// Remove both bodies, or only `a` when `first_only`, on first contact
    pub fn add_destructive_collision(&mut self, a: BodyId, b: BodyId, first_only: bool) {
        let response = if first_only {
            CollisionResponse::DestroyFirst
        } else {
            CollisionResponse::DestroyBoth
        };
        self.add_collision(a, b, response);
    }

    pub fn add_custom_collision(&mut self, a: BodyId, b: BodyId, handler: impl CollisionHandler + 'static) {
        self.add_collision(a, b, CollisionResponse::Custom(Box::new(handler)));
    }

    #[inline]
    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    /// Advance the scene by `dt` seconds (clamped to `max_dt`)
    pub fn tick(&mut self, dt: f64) {
        assert!(dt >= 0.0, "negative dt {dt}");
        let dt = if dt > self.max_dt {
            log::warn!("dt {:.4} exceeds max {:.4}, clamping", dt, self.max_dt);
            self.max_dt
        } else {
            dt
        };

        self.reap_removed();

        let mut spawned = Vec::new();
        for generator in &mut self.generators {
            generator.apply(&mut self.bodies, &mut spawned);
        }
        if !spawned.is_empty() {
            log::debug!("{} force generators spawned by collisions", spawned.len());
            self.generators.append(&mut spawned);
        }

        for (_, body) in self.bodies.iter_mut() {
            body.tick(dt);
        }
    }

    /// Drop removed bodies and every generator that still points at one
    fn reap_removed(&mut self) {
        let before = self.bodies.len();
        self.bodies.retain(|_, body| !body.is_removed());
        let reaped = before - self.bodies.len();
        if reaped == 0 {
            return;
        }

        let generators = self.generators.len();
        let bodies = &self.bodies;
        self.generators
            .retain(|g| g.bodies().iter().all(|id| bodies.contains_key(*id)));
        log::debug!(
            "Reaped {} bodies and {} force generators",
            reaped,
            generators - self.generators.len()
        );
    }
}

/// Panics on a stale or foreign handle, like slice indexing.
impl Index<BodyId> for Scene {
    type Output = RigidBody;

    fn index(&self, id: BodyId) -> &RigidBody {
        &self.bodies[id]
    }
}

impl IndexMut<BodyId> for Scene {
    fn index_mut(&mut self, id: BodyId) -> &mut RigidBody {
        &mut self.bodies[id]
    }
}
