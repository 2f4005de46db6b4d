//! The engine facade: one handle owning the board, the physics world, the
//! chip registry, the clock and the deferred-task scheduler.
//!
//! Per fixed step, in order:
//!
//! 1. Deferred tasks due this tick run (landing dispatch, steering
//!    supervision). Each re-checks that its chip is still live.
//! 2. Engaged steering accelerates its chips sideways for this step.
//! 3. Physics advances one `fixed_dt`.
//! 4. Started contacts are routed: peg hits are reported and kicked, first
//!    sensor contacts mark chips landed and schedule their landing.
//! 5. Stuck chips are kicked loose.
//! 6. The tick counter advances and the frame hook, if any, sees the result.
//!
//! Events are returned from [`Engine::step`] / [`Engine::advance`] rather than
//! pushed through callbacks, so nothing can be delivered after
//! [`Engine::destroy`].

use plinko_core::board::{BoardConfig, BoardLayout, RowCount, SlotGeometry};
use plinko_core::chip_id::ChipId;
use plinko_core::tuning::{Tuning, GRAVITY};
use plinko_core::ConfigError;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::chip::{Chip, ChipRegistry};
use crate::clock::{DueTask, Scheduler, SimClock};
use crate::drop::{self, DropMode, DropRequest, SteerPhase, Steering};
use crate::physics::{Contact, PhysicsWorld};
use crate::recovery;
use crate::router::{self, Routed};
use crate::world_builder::{self, BuiltWorld};
use crate::EngineError;

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Everything needed to construct an [`Engine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board: BoardConfig,
    /// Seconds per physics step.
    pub fixed_dt: f64,
    /// Most steps one [`Engine::advance`] call may run.
    pub max_substeps: u32,
    /// Master seed. `None` draws one from the OS-seeded thread RNG.
    pub seed: Option<u64>,
    /// Refuse drops once this many chips are in flight. `None` disables.
    pub chip_cap: Option<usize>,
    pub tuning: Tuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            fixed_dt: 1.0 / 60.0,
            max_substeps: 5,
            seed: None,
            chip_cap: Some(200),
            tuning: Tuning::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        self.tuning.validate()?;
        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return Err(ConfigError::InvalidTimestep {
                fixed_dt: self.fixed_dt,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Something the presentation layer should hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    ChipCreated { chip: ChipId },
    PegHit { chip: ChipId },
    SlotLanded { chip: ChipId, slot: usize },
}

impl EngineEvent {
    pub fn chip(&self) -> ChipId {
        match *self {
            Self::ChipCreated { chip } | Self::PegHit { chip } | Self::SlotLanded { chip, .. } => chip,
        }
    }
}

/// Where a chip is, for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChipView {
    pub id: ChipId,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub landed: bool,
    pub mode: DropMode,
    pub target_slot: Option<usize>,
}

/// What the frame hook sees after each step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub tick: u64,
    pub time: f64,
    pub chips: Vec<ChipView>,
}

/// Presentation callback, run once per step.
pub type FrameHook = Box<dyn FnMut(&FrameView)>;

/// Running totals since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub drops: u64,
    pub landings: u64,
    pub peg_hits: u64,
    pub recoveries: u64,
    /// Chip-steps on which steering pushed a chip sideways.
    pub steering_corrections: u64,
    pub discarded_on_rebuild: u64,
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChipTask {
    Land { slot: usize },
    Steer,
}

/// Independent random streams, so e.g. an extra peg contact does not shift
/// every later spawn.
struct Streams {
    spawn: Pcg64,
    chaos: Pcg64,
    recovery: Pcg64,
    target: Pcg64,
}

impl Streams {
    fn new(master: u64) -> Self {
        let stream = |domain: &str| Pcg64::seed_from_u64(derive_seed(master, domain));
        Self {
            spawn: stream("plinko/spawn"),
            chaos: stream("plinko/chaos"),
            recovery: stream("plinko/recovery"),
            target: stream("plinko/target"),
        }
    }
}

fn derive_seed(master: u64, domain: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master.to_le_bytes());
    hasher.update(domain.as_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A running Plinko board.
pub struct Engine {
    config: EngineConfig,
    layout: BoardLayout,
    physics: PhysicsWorld,
    world: BuiltWorld,
    clock: SimClock,
    scheduler: Scheduler<ChipTask>,
    chips: ChipRegistry,
    streams: Streams,
    events: Vec<EngineEvent>,
    stats: EngineStats,
    frame_hook: Option<FrameHook>,
    destroyed: bool,
}

impl Engine {
    /// Validate `config`, lay out the board and build the physics world.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let layout = BoardLayout::new(config.board)?;
        let clock = SimClock::new(config.fixed_dt, config.max_substeps)?;
        let master = config.seed.unwrap_or_else(|| rand::thread_rng().gen());

        let mut physics = PhysicsWorld::new(GRAVITY);
        let world = world_builder::build(&mut physics, &layout);
        tracing::info!(seeded = config.seed.is_some(), chip_cap = ?config.chip_cap, "engine created");

        Ok(Self {
            config,
            layout,
            physics,
            world,
            clock,
            scheduler: Scheduler::new(),
            chips: ChipRegistry::new(),
            streams: Streams::new(master),
            events: Vec::new(),
            stats: EngineStats::default(),
            frame_hook: None,
            destroyed: false,
        })
    }

    // -- drops --------------------------------------------------------------

    /// Spawn a chip. A `ChipCreated` event is reported with the next step.
    pub fn drop_chip(&mut self, request: DropRequest) -> Result<ChipId, EngineError> {
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }
        if let Some(cap) = self.config.chip_cap {
            if self.chips.len() >= cap {
                tracing::warn!(cap, "drop refused: chip cap reached");
                return Err(EngineError::ChipCapReached { cap });
            }
        }
        if let Some(slot) = request.target_slot {
            let slot_count = self.layout.slot_count();
            if slot >= slot_count {
                tracing::warn!(slot, slot_count, "drop refused: target slot out of range");
                return Err(EngineError::InvalidTargetSlot { slot, slot_count });
            }
        }

        let target = drop::resolve_target(&request, &self.layout, &mut self.streams.target);
        let spawn = drop::plan_spawn(&request, target, &self.layout, &self.config.tuning, &mut self.streams.spawn);

        let id = self.chips.allocate();
        let (body, collider) = self.physics.add_chip(id, &spawn);
        self.chips.insert(Chip {
            id,
            body,
            collider,
            mode: request.mode,
            target_slot: target,
            steering: target.map(|slot| Steering::new(slot, &self.layout)),
            landed: false,
            created_at: self.clock.now(),
            last_position: spawn.position,
            stuck_since: None,
        });

        if target.is_some() {
            self.scheduler.schedule(self.clock.tick_count(), id, ChipTask::Steer);
        }

        self.stats.drops += 1;
        self.events.push(EngineEvent::ChipCreated { chip: id });
        tracing::debug!(
            chip = %id,
            mode = ?request.mode,
            target = ?target,
            x = spawn.position.x,
            "chip dropped"
        );
        Ok(id)
    }

    // -- stepping -----------------------------------------------------------

    /// Run exactly one fixed step and return the events it produced.
    pub fn step(&mut self) -> Vec<EngineEvent> {
        if self.destroyed {
            return Vec::new();
        }
        self.run_due_tasks();
        self.apply_steering();
        let contacts = self.physics.step(self.clock.fixed_dt());
        self.route_contacts(&contacts);
        self.recover_stuck();
        self.clock.advance_tick();
        self.notify_frame();
        std::mem::take(&mut self.events)
    }

    /// Feed elapsed wall time; runs as many fixed steps as are owed, up to
    /// `max_substeps`.
    pub fn advance(&mut self, elapsed: f64) -> Vec<EngineEvent> {
        if self.destroyed {
            return Vec::new();
        }
        let steps = self.clock.pending_steps(elapsed);
        let mut events = Vec::new();
        for _ in 0..steps {
            events.extend(self.step());
        }
        events
    }

    /// Step until no chip is in flight and no task is pending, or until
    /// `max_steps` have run.
    pub fn run_until_idle(&mut self, max_steps: u64) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for _ in 0..max_steps {
            if self.destroyed || (self.chips.is_empty() && self.scheduler.is_empty()) {
                break;
            }
            events.extend(self.step());
        }
        // Creations queued since the last step.
        events.append(&mut self.events);
        events
    }

    fn run_due_tasks(&mut self) {
        for DueTask { chip, task, .. } in self.scheduler.take_due(self.clock.tick_count()) {
            if !self.chips.contains(chip) {
                tracing::trace!(chip = %chip, "task for removed chip skipped");
                continue;
            }
            match task {
                ChipTask::Land { slot } => self.land(chip, slot),
                ChipTask::Steer => self.supervise_steering(chip),
            }
        }
    }

    fn land(&mut self, id: ChipId, slot: usize) {
        let Some(chip) = self.chips.remove(id) else {
            return;
        };
        self.scheduler.cancel_chip(id);
        self.physics.remove_chip(chip.body, chip.collider);
        self.stats.landings += 1;
        self.events.push(EngineEvent::SlotLanded { chip: id, slot });
        tracing::debug!(
            chip = %id,
            slot,
            target = ?chip.target_slot,
            flight_time = self.clock.now() - chip.created_at,
            "chip landed"
        );
    }

    fn supervise_steering(&mut self, id: ChipId) {
        let Some(chip) = self.chips.get_mut(id) else {
            return;
        };
        let Some(mut steering) = chip.steering.filter(|_| !chip.landed) else {
            chip.steering = None;
            return;
        };
        let Some(motion) = self.physics.chip_motion(chip.body) else {
            return;
        };
        let phase = steering.supervise(motion.position.y, &self.layout, &self.config.tuning);
        if phase == SteerPhase::Finished {
            chip.steering = None;
            tracing::trace!(chip = %id, y = motion.position.y, "steering retired");
            return;
        }
        chip.steering = Some(steering);
        let due = self.clock.tick_count() + self.clock.ticks_for(self.config.tuning.steer_interval);
        self.scheduler.schedule(due, id, ChipTask::Steer);
    }

    fn apply_steering(&mut self) {
        let dt = self.clock.fixed_dt();
        for chip in self.chips.iter().filter(|c| !c.landed) {
            let Some(steering) = chip.steering else {
                continue;
            };
            let Some(motion) = self.physics.chip_motion(chip.body) else {
                continue;
            };
            let tuning = &self.config.tuning;
            if let Some(accel) = steering.acceleration(motion.position, motion.velocity.0, &self.layout, tuning) {
                self.physics.apply_velocity_change(chip.body, (accel * dt, 0.0));
                self.stats.steering_corrections += 1;
            }
        }
    }

    fn route_contacts(&mut self, contacts: &[Contact]) {
        for routed in router::route(contacts, &mut self.chips) {
            match routed {
                Routed::PegHit(id) => {
                    self.stats.peg_hits += 1;
                    self.events.push(EngineEvent::PegHit { chip: id });
                    let Some(body) = self.chips.get(id).map(|c| c.body) else {
                        continue;
                    };
                    let Some(motion) = self.physics.chip_motion(body) else {
                        continue;
                    };
                    let kick = router::chaos_kick(
                        &mut self.streams.chaos,
                        motion.position.x,
                        &self.layout,
                        &self.config.tuning,
                    );
                    self.physics.apply_force_step(body, (kick.force_x, 0.0));
                    self.physics.add_spin(body, kick.spin);
                    tracing::trace!(chip = %id, force_x = kick.force_x, "peg hit");
                }
                Routed::Landed { chip, slot } => {
                    let due = self.clock.tick_count() + self.clock.ticks_for(self.config.tuning.landing_delay);
                    self.scheduler.schedule(due, chip, ChipTask::Land { slot });
                    tracing::trace!(chip = %chip, slot, "slot sensor entered");
                }
            }
        }
    }

    fn recover_stuck(&mut self) {
        let now = self.clock.now();
        let mut wedged = Vec::new();
        for chip in self.chips.iter_mut().filter(|c| !c.landed) {
            let Some(motion) = self.physics.chip_motion(chip.body) else {
                continue;
            };
            if recovery::check_stuck(
                &mut chip.last_position,
                &mut chip.stuck_since,
                motion.position,
                motion.speed(),
                now,
                &self.config.tuning,
            ) {
                wedged.push((chip.id, chip.body));
            }
        }

        for (id, body) in wedged {
            let kick = recovery::escape_kick(&mut self.streams.recovery, &self.config.tuning);
            self.physics.apply_force_step(body, kick.force);
            if let Some(motion) = self.physics.chip_motion(body) {
                self.physics
                    .set_velocity(body, recovery::boosted_velocity(motion.velocity, kick.boost));
            }
            self.stats.recoveries += 1;
            tracing::debug!(chip = %id, "stuck chip kicked loose");
        }
    }

    fn notify_frame(&mut self) {
        if self.frame_hook.is_none() {
            return;
        }
        let view = FrameView {
            tick: self.clock.tick_count(),
            time: self.clock.now(),
            chips: self.chips(),
        };
        if let Some(hook) = self.frame_hook.as_mut() {
            hook(&view);
        }
    }

    // -- lifecycle ----------------------------------------------------------

    /// Change the viewport. In-flight chips are discarded.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), EngineError> {
        let board = BoardConfig {
            width,
            height,
            ..self.config.board
        };
        self.reconfigure(board)
    }

    /// Change the row count. In-flight chips are discarded.
    pub fn set_rows(&mut self, rows: u32) -> Result<(), EngineError> {
        let board = BoardConfig {
            rows: RowCount::new(rows)?,
            ..self.config.board
        };
        self.reconfigure(board)
    }

    fn reconfigure(&mut self, board: BoardConfig) -> Result<(), EngineError> {
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }
        let layout = BoardLayout::new(board)?;

        let discarded = self.chips.clear();
        self.scheduler.clear();
        self.world = world_builder::rebuild(&mut self.physics, &layout);
        self.layout = layout;
        self.config.board = board;
        self.stats.discarded_on_rebuild += discarded as u64;
        tracing::info!(
            rows = board.rows.get(),
            width = board.width,
            height = board.height,
            discarded,
            "board reconfigured"
        );
        Ok(())
    }

    /// Stop the engine and release every body. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let in_flight = self.chips.clear();
        self.scheduler.clear();
        self.physics.clear();
        self.world = BuiltWorld::default();
        self.events.clear();
        self.frame_hook = None;
        tracing::info!(in_flight, "engine destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Install the per-step presentation hook, replacing any previous one.
    /// Ignored after [`destroy`](Self::destroy).
    pub fn set_frame_hook(&mut self, hook: impl FnMut(&FrameView) + 'static) {
        if !self.destroyed {
            self.frame_hook = Some(Box::new(hook));
        }
    }

    pub fn clear_frame_hook(&mut self) {
        self.frame_hook = None;
    }

    // -- queries ------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Slot centres and widths, by index.
    pub fn slots(&self) -> &[SlotGeometry] {
        &self.layout.slots
    }

    /// Board size in pixels, `(width, height)`.
    pub fn board_size(&self) -> (f64, f64) {
        (self.layout.config.width, self.layout.config.height)
    }

    pub fn drop_zone(&self) -> (f64, f64) {
        self.layout.drop_zone()
    }

    pub fn active_chip_count(&self) -> usize {
        self.chips.len()
    }

    /// Every chip in flight, by id.
    pub fn chips(&self) -> Vec<ChipView> {
        self.chips
            .iter()
            .filter_map(|c| self.chip_view(c))
            .collect()
    }

    pub fn chip(&self, id: ChipId) -> Option<ChipView> {
        self.chips.get(id).and_then(|c| self.chip_view(c))
    }

    fn chip_view(&self, chip: &Chip) -> Option<ChipView> {
        let motion = self.physics.chip_motion(chip.body)?;
        Some(ChipView {
            id: chip.id,
            x: motion.position.x,
            y: motion.position.y,
            angle: motion.angle,
            landed: chip.landed,
            mode: chip.mode,
            target_slot: chip.target_slot,
        })
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn tick_count(&self) -> u64 {
        self.clock.tick_count()
    }

    /// Simulated seconds since construction.
    pub fn sim_time(&self) -> f64 {
        self.clock.now()
    }

    /// Static colliders of the current board.
    pub fn built_world(&self) -> &BuiltWorld {
        &self.world
    }

    /// Deferred tasks still queued.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine(rows: u32, seed: u64) -> Engine {
        Engine::new(EngineConfig {
            board: BoardConfig::new(rows, 800.0, 900.0).unwrap(),
            seed: Some(seed),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn derived_seeds_differ_by_domain_and_master() {
        assert_ne!(derive_seed(1, "plinko/spawn"), derive_seed(1, "plinko/chaos"));
        assert_ne!(derive_seed(1, "plinko/spawn"), derive_seed(2, "plinko/spawn"));
        assert_eq!(derive_seed(7, "plinko/target"), derive_seed(7, "plinko/target"));
    }

    #[test]
    fn pinned_chip_gets_downward_escape() {
        let mut e = engine(8, 3);
        let id = e.drop_chip(DropRequest::physics_at(0.5)).unwrap();
        let chip = e.chips.get(id).unwrap();
        let (body, pin) = (chip.body, chip.last_position);

        for _ in 0..45 {
            e.physics.pin_chip(body, pin);
            e.recover_stuck();
            e.clock.advance_tick();
            if e.stats.recoveries > 0 {
                break;
            }
        }
        assert_eq!(e.stats.recoveries, 1);
        let v = e.physics.chip_motion(body).unwrap().velocity;
        assert!(v.1 > 0.0, "escape must leave a downward velocity, got {v:?}");
        assert!(e.chips.get(id).unwrap().stuck_since.is_none(), "timer resets after a kick");
    }

    #[test]
    fn steering_acts_only_inside_the_band() {
        let mut e = engine(8, 11);
        let id = e.drop_chip(DropRequest::targeting(0)).unwrap();
        let (top, _) = drop::steer_band(&e.layout, &e.config.tuning);
        let mut pushed = false;
        for _ in 0..600 {
            let Some(y) = e.chip(id).map(|c| c.y) else {
                break;
            };
            let before = e.stats.steering_corrections;
            e.step();
            if e.stats.steering_corrections > before {
                assert!(y >= top, "pushed at y {y}, band starts at {top}");
                pushed = true;
            }
        }
        assert!(pushed, "a chip aimed at the outer slot must be steered");
    }

    #[test]
    fn physics_chips_are_never_steered() {
        let mut e = engine(8, 12);
        for i in 0..5 {
            e.drop_chip(DropRequest::physics_at(i as f64 / 4.0)).unwrap();
        }
        e.run_until_idle(60 * 60);
        assert_eq!(e.stats.landings, 5);
        assert_eq!(e.stats.steering_corrections, 0);
    }

    #[test]
    fn landed_chip_is_not_checked_for_stuck() {
        let mut e = engine(8, 4);
        let id = e.drop_chip(DropRequest::physics_at(0.5)).unwrap();
        assert!(e.chips.mark_landed(id));
        let chip = e.chips.get(id).unwrap();
        let (body, pin) = (chip.body, chip.last_position);
        for _ in 0..90 {
            e.physics.pin_chip(body, pin);
            e.recover_stuck();
            e.clock.advance_tick();
        }
        assert_eq!(e.stats.recoveries, 0);
    }

    #[test]
    fn stale_landing_task_is_a_no_op() {
        let mut e = engine(8, 5);
        let id = e.drop_chip(DropRequest::physics()).unwrap();
        let chip = e.chips.remove(id).unwrap();
        e.physics.remove_chip(chip.body, chip.collider);
        // A task that outlived its chip (scheduled without group cancel).
        e.scheduler.schedule(e.clock.tick_count(), id, ChipTask::Land { slot: 2 });
        let events = e.step();
        assert!(!events.iter().any(|ev| matches!(ev, EngineEvent::SlotLanded { .. })));
        assert_eq!(e.stats.landings, 0);
    }

    #[test]
    fn landing_cancels_remaining_chip_tasks() {
        let mut e = engine(8, 6);
        let id = e.drop_chip(DropRequest::targeting(4)).unwrap();
        assert_eq!(e.scheduler.pending_for(id), 1, "steering task queued");
        e.land(id, 4);
        assert_eq!(e.scheduler.pending_for(id), 0);
        assert_eq!(e.active_chip_count(), 0);
        assert!(e.events.contains(&EngineEvent::SlotLanded { chip: id, slot: 4 }));
    }

    #[test]
    fn frame_hook_runs_once_per_step() {
        let mut e = engine(10, 7);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        e.set_frame_hook(move |frame| sink.borrow_mut().push((frame.tick, frame.chips.len())));
        e.drop_chip(DropRequest::physics()).unwrap();
        for _ in 0..3 {
            e.step();
        }
        assert_eq!(*seen.borrow(), vec![(1, 1), (2, 1), (3, 1)]);
        e.destroy();
        e.step();
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = EngineConfig {
            seed: Some(99),
            chip_cap: None,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = EngineConfig::from_json(r#"{ "board": { "rows": 12 }, "seed": 5 }"#).unwrap();
        assert_eq!(config.board.rows, RowCount::R12);
        assert_eq!(config.board.width, 800.0);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.chip_cap, Some(200));
    }

    #[test]
    fn bad_json_config_is_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "board": { "rows": 9 } }"#),
            Err(EngineError::Json(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "fixed_dt": 0.0 }"#),
            Err(EngineError::Config(ConfigError::InvalidTimestep { .. }))
        ));
    }
}
