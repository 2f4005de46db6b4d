//! Turns a [`BoardLayout`] into static rapier colliders.
//!
//! Building is total: [`rebuild`] empties the physics world first, chips
//! included, then lays down pegs, walls, dividers and slot sensors.

use plinko_core::board::BoardLayout;
use rapier2d::prelude::ColliderHandle;

use crate::physics::{BodyTag, Material, PhysicsWorld};

pub const PEG_MATERIAL: Material = Material {
    restitution: 0.5,
    friction: 0.05,
};

pub const WALL_MATERIAL: Material = Material {
    restitution: 0.3,
    friction: 0.0,
};

/// Nearly dead ceiling so chips spawned near it are not flung back down.
pub const GUIDE_MATERIAL: Material = Material {
    restitution: 0.1,
    friction: 0.0,
};

pub const DIVIDER_MATERIAL: Material = Material {
    restitution: 0.2,
    friction: 0.0,
};

pub const FLOOR_MATERIAL: Material = Material {
    restitution: 0.0,
    friction: 0.5,
};

/// Handles of the static colliders, grouped by role.
#[derive(Debug, Clone, Default)]
pub struct BuiltWorld {
    pub pegs: Vec<ColliderHandle>,
    /// Left, right, top guide, floor.
    pub walls: Vec<ColliderHandle>,
    /// Indexed by slot.
    pub slot_sensors: Vec<ColliderHandle>,
    pub slot_dividers: Vec<ColliderHandle>,
}

/// Add the board's static geometry to `physics`.
pub fn build(physics: &mut PhysicsWorld, layout: &BoardLayout) -> BuiltWorld {
    let pegs = layout
        .pegs
        .iter()
        .flatten()
        .map(|&p| physics.add_static_circle(p, layout.peg_radius, PEG_MATERIAL, BodyTag::Peg))
        .collect();

    let b = &layout.boundary;
    let walls = vec![
        physics.add_static_box(&b.left, WALL_MATERIAL, BodyTag::Wall),
        physics.add_static_box(&b.right, WALL_MATERIAL, BodyTag::Wall),
        physics.add_static_box(&b.top_guide, GUIDE_MATERIAL, BodyTag::Wall),
        physics.add_static_box(&b.floor, FLOOR_MATERIAL, BodyTag::Wall),
    ];

    let slot_dividers = layout
        .dividers
        .iter()
        .map(|d| physics.add_static_box(d, DIVIDER_MATERIAL, BodyTag::Divider))
        .collect();

    let slot_sensors = layout
        .slots
        .iter()
        .map(|s| physics.add_sensor(&s.sensor, BodyTag::SlotSensor(s.index)))
        .collect();

    let built = BuiltWorld {
        pegs,
        walls,
        slot_sensors,
        slot_dividers,
    };
    tracing::info!(
        rows = layout.rows().get(),
        width = layout.config.width,
        height = layout.config.height,
        pegs = built.pegs.len(),
        slots = built.slot_sensors.len(),
        "board built"
    );
    built
}

/// Clear `physics` completely and build `layout` into it.
pub fn rebuild(physics: &mut PhysicsWorld, layout: &BoardLayout) -> BuiltWorld {
    physics.clear();
    build(physics, layout)
}
