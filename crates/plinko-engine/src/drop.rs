//! Drop controller: where and how a chip is spawned, and how a steered chip
//! is nudged toward its target slot.
//!
//! In [`DropMode::Physics`] the landing slot is whatever the simulation
//! produces. In [`DropMode::Deterministic`] a target slot is chosen first
//! (explicitly or from the binomial distribution), the spawn is biased
//! toward it, and [`Steering`] pulls the chip toward the target slot with a
//! damped lateral spring from the upper rows down to the slot mouths. Pegs
//! keep bouncing it around on the way, so the target is likely, not
//! certain.

use plinko_core::board::{BoardLayout, Point};
use plinko_core::probability::sample_slot_with;
use plinko_core::tuning::{ChipDraw, Range, Tuning};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::physics::ChipBody;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// How a drop resolves its landing slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropMode {
    /// Outcome emerges from the simulation.
    #[default]
    Physics,
    /// Outcome pre-selected, then steered toward.
    Deterministic,
}

/// A request to drop one chip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DropRequest {
    /// Normalised horizontal position in `0..=1` across the safe drop zone.
    /// Honoured in physics mode only.
    pub x_position: Option<f64>,
    pub mode: DropMode,
    /// Explicit target slot. Used in deterministic mode only.
    pub target_slot: Option<usize>,
}

impl DropRequest {
    pub fn physics() -> Self {
        Self::default()
    }

    pub fn physics_at(x_position: f64) -> Self {
        Self {
            x_position: Some(x_position),
            ..Self::default()
        }
    }

    /// Deterministic drop with a sampled target.
    pub fn deterministic() -> Self {
        Self {
            mode: DropMode::Deterministic,
            ..Self::default()
        }
    }

    pub fn targeting(slot: usize) -> Self {
        Self {
            mode: DropMode::Deterministic,
            target_slot: Some(slot),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Spawn planning
// ---------------------------------------------------------------------------

/// Target slot for a request: `None` in physics mode, otherwise the explicit
/// slot or one sampled from the landing distribution.
///
/// The explicit slot must already be validated against the layout.
pub fn resolve_target<R: Rng + ?Sized>(request: &DropRequest, layout: &BoardLayout, rng: &mut R) -> Option<usize> {
    match request.mode {
        DropMode::Physics => None,
        DropMode::Deterministic => Some(
            request
                .target_slot
                .unwrap_or_else(|| sample_slot_with(layout.rows(), rng)),
        ),
    }
}

/// Spawn x for a drop.
pub fn spawn_x<R: Rng + ?Sized>(
    request: &DropRequest,
    target: Option<usize>,
    layout: &BoardLayout,
    tuning: &Tuning,
    rng: &mut R,
) -> f64 {
    let (min, max) = layout.drop_zone();
    let cx = layout.centre_x();
    let x = match (request.mode, target) {
        (DropMode::Deterministic, Some(slot)) => {
            let geometry = &layout.slots[slot.min(layout.slot_count() - 1)];
            let jitter = rng.gen_range(-1.0..=1.0) * tuning.target_jitter * geometry.width;
            cx + tuning.target_bias * (geometry.x - cx) + jitter
        }
        _ => match request.x_position {
            Some(n) if n.is_finite() => min + n.clamp(0.0, 1.0) * (max - min),
            _ => {
                let band = tuning.physics_band * (max - min);
                cx + rng.gen_range(-0.5..=0.5) * band
            }
        },
    };
    x.clamp(min, max)
}

/// Draw a chip's material and initial motion.
pub fn draw_chip<R: Rng + ?Sized>(draw: &ChipDraw, x: f64, layout: &BoardLayout, rng: &mut R) -> ChipBody {
    let mut sample = |r: Range| r.lerp(rng.gen::<f64>());
    let restitution = sample(draw.restitution);
    let friction = sample(draw.friction);
    let vx = sample(draw.velocity_x);
    let vy = sample(draw.velocity_y);
    let spin = sample(draw.spin);
    ChipBody {
        position: Point {
            x,
            y: layout.spawn_y,
        },
        velocity: (vx, vy),
        spin,
        radius: layout.chip_radius,
        restitution,
        friction,
    }
}

/// Full spawn for a request whose target has been resolved.
pub fn plan_spawn<R: Rng + ?Sized>(
    request: &DropRequest,
    target: Option<usize>,
    layout: &BoardLayout,
    tuning: &Tuning,
    rng: &mut R,
) -> ChipBody {
    let x = spawn_x(request, target, layout, tuning, rng);
    let draw = match request.mode {
        DropMode::Physics => &tuning.physics_draw,
        DropMode::Deterministic => &tuning.steered_draw,
    };
    draw_chip(draw, x, layout, rng)
}

// ---------------------------------------------------------------------------
// Steering
// ---------------------------------------------------------------------------

/// What a supervision tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerPhase {
    /// The chip is still above the band.
    Waiting,
    /// The chip is in the band; steering acts every step.
    Engaged,
    /// The chip has left the band, or the tick cap ran out.
    Finished,
}

/// Per-chip steering state.
///
/// A periodic supervision task moves this through its phases; while it is
/// engaged the engine applies [`Steering::acceleration`] on every physics
/// step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Steering {
    pub target_slot: usize,
    /// Supervision ticks left before steering is retired regardless.
    pub ticks_left: u32,
    pub engaged: bool,
}

impl Steering {
    /// The tick cap grows with half the row count, plus slack for the fall
    /// above the band.
    pub fn new(target_slot: usize, layout: &BoardLayout) -> Self {
        Self {
            target_slot,
            ticks_left: 4 * (layout.rows().get() / 2).max(1) + 20,
            engaged: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.ticks_left == 0
    }

    /// One supervision tick for a chip at height `y`.
    pub fn supervise(&mut self, y: f64, layout: &BoardLayout, tuning: &Tuning) -> SteerPhase {
        if self.is_finished() {
            return self.finish();
        }
        self.ticks_left -= 1;

        let (top, bottom) = steer_band(layout, tuning);
        if y > bottom || self.is_finished() {
            return self.finish();
        }
        if y < top {
            return SteerPhase::Waiting;
        }
        self.engaged = true;
        SteerPhase::Engaged
    }

    fn finish(&mut self) -> SteerPhase {
        self.ticks_left = 0;
        self.engaged = false;
        SteerPhase::Finished
    }

    /// Lateral acceleration for this step, px/s², or `None` when steering is
    /// not engaged, the chip is outside the band, or it is already within
    /// the dead-band of its target.
    pub fn acceleration(&self, position: Point, vx: f64, layout: &BoardLayout, tuning: &Tuning) -> Option<f64> {
        if !self.engaged {
            return None;
        }
        let (top, bottom) = steer_band(layout, tuning);
        if position.y < top || position.y > bottom {
            return None;
        }
        let slot = layout.slots.get(self.target_slot)?;
        lateral_accel(position.x - slot.x, vx, slot.width, tuning)
    }
}

/// Vertical extent of the steering band, `(top, bottom)` in px.
pub fn steer_band(layout: &BoardLayout, tuning: &Tuning) -> (f64, f64) {
    let span = layout.slot_top - layout.first_row_y;
    (
        layout.first_row_y + tuning.steer_band.min * span,
        layout.first_row_y + tuning.steer_band.max * span,
    )
}

/// Damped spring toward the target slot centre.
///
/// Zero inside the dead-band, so a chip balanced on a peg above its target
/// is left to gravity and the peg chaos; outside it, proportional to the
/// offset with lateral speed damped, clamped to `steer_max_accel`.
pub fn lateral_accel(offset: f64, vx: f64, slot_width: f64, tuning: &Tuning) -> Option<f64> {
    if offset.abs() <= tuning.steer_threshold * slot_width {
        return None;
    }
    let accel = -tuning.steer_stiffness * offset - tuning.steer_damping * vx;
    Some(accel.clamp(-tuning.steer_max_accel, tuning.steer_max_accel))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
