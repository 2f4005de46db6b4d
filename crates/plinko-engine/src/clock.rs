//! Fixed-timestep simulation clock and deferred chip tasks.
//!
//! The [`SimClock`] turns wall-clock time into a whole number of fixed steps.
//! Simulation time is always `tick * fixed_dt`, computed, never accumulated.
//!
//! The [`Scheduler`] holds work deferred to a later tick (landing dispatch,
//! steering corrections). Tasks are keyed by the chip they belong to, so
//! removing a chip or tearing down the engine cancels its whole group. A task
//! that does fire must still re-check that its chip is live before acting.
//!
//! # Example
//!
//! ```
//! use plinko_engine::clock::{Scheduler, SimClock};
//! use plinko_core::chip_id::ChipId;
//!
//! let mut clock = SimClock::new(1.0 / 60.0, 5).unwrap();
//! let mut scheduler: Scheduler<&str> = Scheduler::new();
//!
//! let chip = ChipId::new(0, 0);
//! let due = clock.tick_count() + clock.ticks_for(0.1);
//! scheduler.schedule(due, chip, "land");
//!
//! let mut fired = Vec::new();
//! for _ in 0..10 {
//!     fired.extend(scheduler.take_due(clock.tick_count()));
//!     clock.advance_tick();
//! }
//! assert_eq!(fired.len(), 1);
//! assert_eq!(fired[0].due, 6);
//! ```

use std::collections::BTreeMap;

use plinko_core::chip_id::ChipId;
use plinko_core::ConfigError;

// ---------------------------------------------------------------------------
// SimClock
// ---------------------------------------------------------------------------

/// Fixed-step clock with a wall-time accumulator.
#[derive(Debug, Clone)]
pub struct SimClock {
    fixed_dt: f64,
    max_substeps: u32,
    tick: u64,
    accumulator: f64,
}

impl SimClock {
    /// Create a clock at tick 0.
    ///
    /// `max_substeps` bounds how many steps one [`pending_steps`](Self::pending_steps)
    /// call may return; `0` is treated as `1`.
    pub fn new(fixed_dt: f64, max_substeps: u32) -> Result<Self, ConfigError> {
        if !(fixed_dt > 0.0 && fixed_dt.is_finite()) {
            return Err(ConfigError::InvalidTimestep { fixed_dt });
        }
        Ok(Self {
            fixed_dt,
            max_substeps: max_substeps.max(1),
            tick: 0,
            accumulator: 0.0,
        })
    }

    #[inline]
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Simulation time in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.tick as f64 * self.fixed_dt
    }

    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Add elapsed wall time and return how many fixed steps to run now.
    ///
    /// When more than `max_substeps` steps are owed, the excess is dropped
    /// rather than carried, so a long stall never snowballs.
    pub fn pending_steps(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }
        let owed = (self.accumulator / self.fixed_dt).floor();
        if owed > f64::from(self.max_substeps) {
            tracing::debug!(owed, max = self.max_substeps, "dropping excess simulation steps");
            self.accumulator = 0.0;
            return self.max_substeps;
        }
        let steps = owed as u32;
        self.accumulator -= f64::from(steps) * self.fixed_dt;
        steps
    }

    /// Whole ticks covering `seconds`, at least one.
    pub fn ticks_for(&self, seconds: f64) -> u64 {
        // Tolerate 0.1 / (1/60) landing a hair above 6.
        ((seconds / self.fixed_dt) - 1e-9).ceil().max(1.0) as u64
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// A task that came due.
#[derive(Debug, Clone, PartialEq)]
pub struct DueTask<T> {
    pub due: u64,
    pub chip: ChipId,
    pub task: T,
}

/// Tick-ordered queue of per-chip deferred work.
///
/// Tasks due on the same tick fire in the order they were scheduled.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    tasks: BTreeMap<(u64, u64), (ChipId, T)>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, due: u64, chip: ChipId, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.insert((due, seq), (chip, task));
    }

    /// Remove and return every task due at or before `tick`, in firing order.
    pub fn take_due(&mut self, tick: u64) -> Vec<DueTask<T>> {
        let later = self.tasks.split_off(&(tick.saturating_add(1), 0));
        let due = std::mem::replace(&mut self.tasks, later);
        due.into_iter()
            .map(|((due, _), (chip, task))| DueTask { due, chip, task })
            .collect()
    }

    /// Cancel every task belonging to `chip`. Returns how many were dropped.
    pub fn cancel_chip(&mut self, chip: ChipId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, (owner, _)| *owner != chip);
        before - self.tasks.len()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_for(&self, chip: ChipId) -> usize {
        self.tasks.values().filter(|(owner, _)| *owner == chip).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_timestep() {
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SimClock::new(dt, 5),
                Err(ConfigError::InvalidTimestep { .. })
            ));
        }
    }

    #[test]
    fn sim_time_computed_not_accumulated() {
        let mut clock = SimClock::new(1.0 / 60.0, 5).unwrap();
        for _ in 0..600 {
            clock.advance_tick();
        }
        assert_eq!(clock.tick_count(), 600);
        assert_eq!(clock.now(), 600.0 * (1.0 / 60.0));
    }

    #[test]
    fn accumulator_carries_remainder() {
        let mut clock = SimClock::new(0.01, 5).unwrap();
        assert_eq!(clock.pending_steps(0.025), 2);
        // 0.005 carried + 0.006 = 0.011
        assert_eq!(clock.pending_steps(0.006), 1);
        assert_eq!(clock.pending_steps(0.0), 0);
    }

    #[test]
    fn excess_steps_are_dropped() {
        let mut clock = SimClock::new(0.01, 5).unwrap();
        assert_eq!(clock.pending_steps(1.0), 5);
        // Nothing carried over from the stall.
        assert_eq!(clock.pending_steps(0.0), 0);
    }

    #[test]
    fn negative_or_nan_elapsed_is_ignored() {
        let mut clock = SimClock::new(0.01, 5).unwrap();
        assert_eq!(clock.pending_steps(-3.0), 0);
        assert_eq!(clock.pending_steps(f64::NAN), 0);
    }

    #[test]
    fn ticks_for_rounds_up() {
        let clock = SimClock::new(1.0 / 60.0, 5).unwrap();
        assert_eq!(clock.ticks_for(0.1), 6);
        assert_eq!(clock.ticks_for(0.105), 7);
        assert_eq!(clock.ticks_for(0.0), 1);
    }

    #[test]
    fn scheduler_orders_by_tick_then_insertion() {
        let mut s = Scheduler::new();
        let a = ChipId::new(0, 0);
        let b = ChipId::new(1, 0);
        s.schedule(5, a, "a-late");
        s.schedule(3, b, "b-first");
        s.schedule(3, a, "a-second");
        let due: Vec<_> = s.take_due(4).into_iter().map(|t| t.task).collect();
        assert_eq!(due, vec!["b-first", "a-second"]);
        assert_eq!(s.len(), 1);
        assert!(s.take_due(4).is_empty());
        assert_eq!(s.take_due(5).len(), 1);
        assert!(s.is_empty());
    }

    #[test]
    fn cancel_chip_drops_whole_group() {
        let mut s = Scheduler::new();
        let a = ChipId::new(0, 0);
        let b = ChipId::new(1, 0);
        s.schedule(1, a, 1);
        s.schedule(2, a, 2);
        s.schedule(2, b, 3);
        assert_eq!(s.pending_for(a), 2);
        assert_eq!(s.cancel_chip(a), 2);
        assert_eq!(s.pending_for(a), 0);
        let left: Vec<_> = s.take_due(10).into_iter().map(|t| t.chip).collect();
        assert_eq!(left, vec![b]);
    }

    #[test]
    fn clear_empties_queue() {
        let mut s = Scheduler::new();
        s.schedule(1, ChipId::new(0, 0), ());
        s.clear();
        assert!(s.take_due(u64::MAX - 1).is_empty());
    }
}
