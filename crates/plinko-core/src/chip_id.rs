//! Chip handles.
//!
//! Physics bodies, scheduled tasks and emitted events refer to chips only by
//! [`ChipId`]. An id names a registry index plus the generation that index
//! had when the chip was dropped; once the chip is removed the index may be
//! handed to a later drop, but under a new generation, so every old copy of
//! the id stops resolving.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// ---------------------------------------------------------------------------
// ChipId
// ---------------------------------------------------------------------------

/// Handle to one dropped chip. Orders by index, then generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChipId {
    index: u32,
    generation: u32,
}

impl ChipId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Registry index, shared by every chip that reuses it.
    pub fn index(self) -> u32 {
        self.index
    }

    /// How many chips held this index before this one.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChipId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chip#{}v{}", self.index, self.generation)
    }
}

// ---------------------------------------------------------------------------
// ChipAllocator
// ---------------------------------------------------------------------------

/// Allocates and recycles [`ChipId`]s with generational tracking.
///
/// Free indices are kept in a FIFO queue so that a just-released index is the
/// last one to come back, which keeps generations spread out when chips are
/// dropped and removed at a steady rate.
#[derive(Debug, Default)]
pub struct ChipAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_indices: VecDeque<u32>,
    live: usize,
}

impl ChipAllocator {
    /// Create a new, empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh [`ChipId`], reusing a released index when one is
    /// available.
    pub fn allocate(&mut self) -> ChipId {
        self.live += 1;
        if let Some(index) = self.free_indices.pop_front() {
            // Generation was already bumped on release.
            self.alive[index as usize] = true;
            ChipId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            ChipId::new(index, 0)
        }
    }

    /// Release a chip, invalidating every outstanding copy of its handle.
    ///
    /// Returns `true` if the chip was live and is now released, `false` if it
    /// was already released or the handle is stale.
    pub fn release(&mut self, id: ChipId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        let idx = id.index() as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push_back(id.index());
        self.live -= 1;
        true
    }

    /// Returns `true` if `id` refers to a live chip whose generation matches
    /// the allocator's current generation for that index.
    pub fn is_live(&self, id: ChipId) -> bool {
        let idx = id.index() as usize;
        idx < self.generations.len() && self.alive[idx] && self.generations[idx] == id.generation()
    }

    /// Number of currently live chips.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Release every live chip at once.
    ///
    /// Used when the world is rebuilt and all in-flight chips are discarded.
    /// Returns the number of chips that were released.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for idx in 0..self.alive.len() {
            if self.alive[idx] {
                self.alive[idx] = false;
                self.generations[idx] = self.generations[idx].wrapping_add(1);
                self.free_indices.push_back(idx as u32);
                released += 1;
            }
        }
        self.live = 0;
        released
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
