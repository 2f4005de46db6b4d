//! The engine's active-chip registry.
//!
//! Chips are keyed by generational [`ChipId`]. Physics bodies only carry the
//! id (through [`BodyTag::Chip`](crate::physics::BodyTag)); all game state
//! lives here.

use std::collections::BTreeMap;

use plinko_core::board::Point;
use plinko_core::chip_id::{ChipAllocator, ChipId};
use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

use crate::drop::{DropMode, Steering};

/// One chip in flight.
#[derive(Debug, Clone)]
pub struct Chip {
    pub id: ChipId,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub mode: DropMode,
    pub target_slot: Option<usize>,
    /// Present while a steered chip may still be steered.
    pub steering: Option<Steering>,
    /// Flips false → true once, on first slot-sensor contact.
    pub landed: bool,
    /// Simulation time of the drop.
    pub created_at: f64,
    /// Position seen by the last liveness check.
    pub last_position: Point,
    pub stuck_since: Option<f64>,
}

/// Chip state by id, plus the allocator that hands out the ids.
#[derive(Debug, Default)]
pub struct ChipRegistry {
    allocator: ChipAllocator,
    chips: BTreeMap<ChipId, Chip>,
}

impl ChipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id for a chip about to be inserted.
    pub fn allocate(&mut self) -> ChipId {
        self.allocator.allocate()
    }

    pub fn insert(&mut self, chip: Chip) {
        self.chips.insert(chip.id, chip);
    }

    pub fn get(&self, id: ChipId) -> Option<&Chip> {
        self.chips.get(&id)
    }

    pub fn get_mut(&mut self, id: ChipId) -> Option<&mut Chip> {
        self.chips.get_mut(&id)
    }

    pub fn contains(&self, id: ChipId) -> bool {
        self.allocator.is_live(id) && self.chips.contains_key(&id)
    }

    /// Mark a chip landed. Returns `true` only on the first call for a live
    /// chip; every later call is a no-op.
    pub fn mark_landed(&mut self, id: ChipId) -> bool {
        match self.chips.get_mut(&id) {
            Some(chip) if !chip.landed => {
                chip.landed = true;
                true
            }
            _ => false,
        }
    }

    /// Remove a chip and retire its id.
    pub fn remove(&mut self, id: ChipId) -> Option<Chip> {
        let chip = self.chips.remove(&id)?;
        self.allocator.release(id);
        Some(chip)
    }

    /// Drop every chip. Returns how many were in flight.
    pub fn clear(&mut self) -> usize {
        self.allocator.release_all();
        let n = self.chips.len();
        self.chips.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Chips in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Chip> {
        self.chips.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chip> {
        self.chips.values_mut()
    }
}
