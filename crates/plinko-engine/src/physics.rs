//! rapier2d world for the Plinko board.
//!
//! The [`PhysicsWorld`] owns every rapier set and the pipeline. Each collider
//! carries a [`BodyTag`] back-reference, so contact events come out already
//! resolved to "chip X touched peg" or "chip X entered slot sensor 4" without
//! any string labels on the bodies.
//!
//! # Determinism
//!
//! rapier2d is compiled with `enhanced-determinism`. Started contacts are
//! sorted by tag before they leave [`PhysicsWorld::step`], so a seeded engine
//! replays identically on the same platform.

use std::collections::HashMap;

use plinko_core::board::{Point, Rect};
use plinko_core::chip_id::ChipId;
use plinko_core::tuning::{CHIP_DENSITY, FORCE_TO_IMPULSE};
use rapier2d::prelude::*;

// ---------------------------------------------------------------------------
// BodyTag
// ---------------------------------------------------------------------------

/// What a collider is, from the game's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyTag {
    Peg,
    /// Side walls, top guide and floor.
    Wall,
    Divider,
    SlotSensor(usize),
    Chip(ChipId),
}

/// Restitution and friction of a static collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub restitution: f64,
    pub friction: f64,
}

/// Everything needed to put a chip body into the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipBody {
    pub position: Point,
    /// px/s
    pub velocity: (f64, f64),
    /// rad/s
    pub spin: f64,
    pub radius: f64,
    pub restitution: f64,
    pub friction: f64,
}

/// Read-back of a chip body after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChipMotion {
    pub position: Point,
    pub velocity: (f64, f64),
    pub angle: f64,
    pub mass: f64,
}

impl ChipMotion {
    pub fn speed(&self) -> f64 {
        self.velocity.0.hypot(self.velocity.1)
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// rapier2d simulation state plus the collider → tag map.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    tags: HashMap<ColliderHandle, BodyTag>,
}

impl PhysicsWorld {
    /// Create an empty world with downward gravity in px/s².
    pub fn new(gravity: f64) -> Self {
        let mut integration_params = IntegrationParameters::default();
        // Tolerances are tuned for metre-scale scenes; the board is in pixels.
        integration_params.length_unit = 100.0;
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, gravity as Real],
            integration_params,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            tags: HashMap::new(),
        }
    }

    /// Drop every body and collider.
    pub fn clear(&mut self) {
        let gravity = self.gravity.y as f64;
        *self = Self::new(gravity);
    }

    /// Add a fixed circle (a peg).
    pub fn add_static_circle(&mut self, center: Point, radius: f64, material: Material, tag: BodyTag) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius as Real)
            .translation(vector![center.x as Real, center.y as Real])
            .restitution(material.restitution as Real)
            .friction(material.friction as Real)
            .build();
        self.insert_static(collider, tag)
    }

    /// Add a fixed box (walls, guide, floor, dividers).
    pub fn add_static_box(&mut self, rect: &Rect, material: Material, tag: BodyTag) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(rect.half_width as Real, rect.half_height as Real)
            .translation(vector![rect.cx as Real, rect.cy as Real])
            .restitution(material.restitution as Real)
            .friction(material.friction as Real)
            .build();
        self.insert_static(collider, tag)
    }

    /// Add a non-colliding trigger volume that reports chips entering it.
    pub fn add_sensor(&mut self, rect: &Rect, tag: BodyTag) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(rect.half_width as Real, rect.half_height as Real)
            .translation(vector![rect.cx as Real, rect.cy as Real])
            .sensor(true)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.insert_static(collider, tag)
    }

    fn insert_static(&mut self, collider: Collider, tag: BodyTag) -> ColliderHandle {
        let handle = self.collider_set.insert(collider);
        self.tags.insert(handle, tag);
        handle
    }

    /// Add a dynamic chip body.
    pub fn add_chip(&mut self, id: ChipId, chip: &ChipBody) -> (RigidBodyHandle, ColliderHandle) {
        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![chip.position.x as Real, chip.position.y as Real])
            .linvel(vector![chip.velocity.0 as Real, chip.velocity.1 as Real])
            .angvel(chip.spin as Real)
            .ccd_enabled(true)
            .build();
        let body = self.rigid_body_set.insert(rb);

        let collider = ColliderBuilder::ball(chip.radius as Real)
            .density(CHIP_DENSITY as Real)
            .restitution(chip.restitution as Real)
            .friction(chip.friction as Real)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider =
            self.collider_set
                .insert_with_parent(collider, body, &mut self.rigid_body_set);
        self.tags.insert(collider, BodyTag::Chip(id));
        (body, collider)
    }

    /// Remove a chip body and its collider. No-op for unknown handles.
    pub fn remove_chip(&mut self, body: RigidBodyHandle, collider: ColliderHandle) {
        self.tags.remove(&collider);
        self.rigid_body_set.remove(
            body,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
    }

    /// Step the simulation by `dt` seconds.
    ///
    /// Returns the contacts that started during the step, resolved to tags
    /// and sorted for deterministic dispatch.
    pub fn step(&mut self, dt: f64) -> Vec<Contact> {
        self.integration_params.dt = dt as Real;

        let (collision_send, collision_recv) =
            rapier2d::crossbeam::channel::unbounded::<CollisionEvent>();
        let (force_send, _force_recv) =
            rapier2d::crossbeam::channel::unbounded::<ContactForceEvent>();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None, // query pipeline (unused)
            &(),  // physics hooks
            &event_handler,
        );

        let mut contacts = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _flags) = event {
                if let (Some(&a), Some(&b)) = (self.tags.get(&h1), self.tags.get(&h2)) {
                    contacts.push(Contact { a, b });
                }
            }
        }

        // Channel delivery order is not part of rapier's determinism contract.
        contacts.sort_by_key(|c| (c.a.min(c.b), c.a.max(c.b)));
        contacts
    }

    /// Position, velocity and mass of a chip body.
    pub fn chip_motion(&self, body: RigidBodyHandle) -> Option<ChipMotion> {
        let rb = self.rigid_body_set.get(body)?;
        let t = rb.translation();
        let v = rb.linvel();
        Some(ChipMotion {
            position: Point {
                x: t.x as f64,
                y: t.y as f64,
            },
            velocity: (v.x as f64, v.y as f64),
            angle: rb.rotation().angle() as f64,
            mass: rb.mass() as f64,
        })
    }

    /// Apply a board force for one step, as an instantaneous impulse.
    pub fn apply_force_step(&mut self, body: RigidBodyHandle, force: (f64, f64)) {
        if let Some(rb) = self.rigid_body_set.get_mut(body) {
            let impulse = vector![
                (force.0 * FORCE_TO_IMPULSE) as Real,
                (force.1 * FORCE_TO_IMPULSE) as Real
            ];
            rb.apply_impulse(impulse, true);
        }
    }

    /// Change a chip's velocity by `dv` px/s (applied as `mass * dv`).
    pub fn apply_velocity_change(&mut self, body: RigidBodyHandle, dv: (f64, f64)) {
        if let Some(rb) = self.rigid_body_set.get_mut(body) {
            let m = rb.mass();
            rb.apply_impulse(vector![dv.0 as Real * m, dv.1 as Real * m], true);
        }
    }

    /// Add to a chip's angular velocity.
    pub fn add_spin(&mut self, body: RigidBodyHandle, spin: f64) {
        if let Some(rb) = self.rigid_body_set.get_mut(body) {
            let angvel = rb.angvel() + spin as Real;
            rb.set_angvel(angvel, true);
        }
    }

    /// Overwrite a chip's linear velocity.
    pub fn set_velocity(&mut self, body: RigidBodyHandle, velocity: (f64, f64)) {
        if let Some(rb) = self.rigid_body_set.get_mut(body) {
            rb.set_linvel(vector![velocity.0 as Real, velocity.1 as Real], true);
        }
    }

    /// Teleport a chip and zero its motion.
    pub fn pin_chip(&mut self, body: RigidBodyHandle, position: Point) {
        if let Some(rb) = self.rigid_body_set.get_mut(body) {
            rb.set_translation(vector![position.x as Real, position.y as Real], true);
            rb.set_linvel(vector![0.0, 0.0], true);
            rb.set_angvel(0.0, true);
        }
    }

    /// Number of rigid bodies (chips only; statics are parentless colliders).
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Number of colliders carrying a tag that matches `pred`.
    pub fn count_tagged(&self, pred: impl Fn(&BodyTag) -> bool) -> usize {
        self.tags.values().filter(|t| pred(t)).count()
    }

    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// A contact that started during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: BodyTag,
    pub b: BodyTag,
}

impl Contact {
    /// The chip involved and whatever it touched. Chip-on-chip contacts
    /// yield `None`; they carry no game meaning.
    pub fn chip_and_other(&self) -> Option<(ChipId, BodyTag)> {
        match (self.a, self.b) {
            (BodyTag::Chip(_), BodyTag::Chip(_)) => None,
            (BodyTag::Chip(id), other) | (other, BodyTag::Chip(id)) => Some((id, other)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
