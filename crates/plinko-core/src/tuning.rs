//! Numeric tuning for the drop simulation.
//!
//! Force magnitudes are in board force units: a force `F` acting for one
//! 60 Hz step is applied as the impulse `F * FORCE_TO_IMPULSE`. Velocity
//! boosts are plain px/s and are applied as `mass * dv`. Steering is a
//! lateral acceleration in px/s², integrated over each step.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Gravity in px/s², pointing down the screen.
pub const GRAVITY: f64 = 1000.0;

/// Chip mass per square pixel.
pub const CHIP_DENSITY: f64 = 0.001;

/// Converts a board force acting for one step into an impulse.
///
/// `(1000 / 60)^2 * 60`: the step length squared in milliseconds, rescaled
/// from px/step to px/s.
pub const FORCE_TO_IMPULSE: f64 = (1000.0 / 60.0) * (1000.0 / 60.0) * 60.0;

/// Closed interval used for per-chip random draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Symmetric range `[-v, v]`.
    pub const fn symmetric(v: f64) -> Self {
        Self { min: -v, max: v }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Linear interpolation, `t` in `[0, 1]`.
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + (self.max - self.min) * t
    }
}

/// Material and initial-motion ranges a chip is drawn from at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChipDraw {
    pub restitution: Range,
    pub friction: Range,
    /// Initial horizontal velocity, px/s.
    pub velocity_x: Range,
    /// Initial downward velocity, px/s.
    pub velocity_y: Range,
    /// Initial spin, rad/s.
    pub spin: Range,
}

impl ChipDraw {
    /// Wide ranges for unsteered drops.
    pub const PHYSICS: ChipDraw = ChipDraw {
        restitution: Range::new(0.3, 0.6),
        friction: Range::new(0.01, 0.12),
        velocity_x: Range::symmetric(40.0),
        velocity_y: Range::new(20.0, 80.0),
        spin: Range::symmetric(2.0),
    };

    /// Narrow ranges for steered drops; less bounce makes corrections stick.
    pub const STEERED: ChipDraw = ChipDraw {
        restitution: Range::new(0.35, 0.45),
        friction: Range::new(0.04, 0.06),
        velocity_x: Range::symmetric(10.0),
        velocity_y: Range::new(30.0, 50.0),
        spin: Range::symmetric(0.5),
    };

    fn ranges(&self) -> [(&'static str, Range); 5] {
        [
            ("restitution", self.restitution),
            ("friction", self.friction),
            ("velocity_x", self.velocity_x),
            ("velocity_y", self.velocity_y),
            ("spin", self.spin),
        ]
    }
}

/// Every tuned constant of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // -- peg contact chaos --
    pub chaos_impulse: Range,
    /// Weight of the pull toward the board centre, per unit of normalized
    /// horizontal offset.
    pub chaos_center_bias: f64,
    /// Maximum spin perturbation per contact, rad/s.
    pub chaos_spin: f64,

    // -- landing --
    /// Seconds between sensor contact and landing dispatch.
    pub landing_delay: f64,

    // -- stuck recovery --
    pub stuck_move_threshold: f64,
    pub stuck_time_threshold: f64,
    pub stuck_speed_threshold: f64,
    pub escape_impulse: f64,
    pub escape_boost_x: f64,
    pub escape_boost_y: Range,

    // -- drop controller --
    pub physics_draw: ChipDraw,
    pub steered_draw: ChipDraw,
    /// Share of the safe drop zone used for random physics-mode drops.
    pub physics_band: f64,
    /// Fraction of the centre-to-target offset applied to the spawn x.
    pub target_bias: f64,
    /// Residual spawn randomness, as a fraction of slot width.
    pub target_jitter: f64,

    // -- steering --
    /// Period of the task that engages and retires steering, seconds.
    pub steer_interval: f64,
    /// Active band as fractions of the first-row to slot-top span.
    pub steer_band: Range,
    /// Dead-band as a fraction of slot width.
    pub steer_threshold: f64,
    /// Lateral acceleration per pixel of offset, 1/s².
    pub steer_stiffness: f64,
    /// Lateral acceleration per px/s of lateral speed, 1/s.
    pub steer_damping: f64,
    /// Clamp on the steering acceleration, px/s².
    pub steer_max_accel: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            chaos_impulse: Range::new(3e-5, 1.2e-4),
            chaos_center_bias: 0.3,
            chaos_spin: 3.0,
            landing_delay: 0.1,
            stuck_move_threshold: 0.5,
            stuck_time_threshold: 0.5,
            stuck_speed_threshold: 6.0,
            escape_impulse: 5e-4,
            escape_boost_x: 60.0,
            escape_boost_y: Range::new(60.0, 120.0),
            physics_draw: ChipDraw::PHYSICS,
            steered_draw: ChipDraw::STEERED,
            physics_band: 0.7,
            target_bias: 0.15,
            target_jitter: 0.1,
            steer_interval: 0.1,
            steer_band: Range::new(0.15, 1.0),
            steer_threshold: 0.15,
            steer_stiffness: 64.0,
            steer_damping: 16.0,
            steer_max_accel: 2000.0,
        }
    }
}

impl Tuning {
    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidTuning {
            field: field.to_owned(),
            reason: reason.to_owned(),
        };

        let ranges = [
            ("chaos_impulse", self.chaos_impulse),
            ("escape_boost_y", self.escape_boost_y),
            ("steer_band", self.steer_band),
        ];
        for (field, range) in ranges {
            if !range.is_valid() {
                return Err(invalid(field, "min must not exceed max"));
            }
        }
        for (prefix, draw) in [("physics_draw", &self.physics_draw), ("steered_draw", &self.steered_draw)] {
            for (name, range) in draw.ranges() {
                if !range.is_valid() {
                    return Err(invalid(&format!("{prefix}.{name}"), "min must not exceed max"));
                }
            }
        }

        if self.chaos_impulse.min < 0.0 {
            return Err(invalid("chaos_impulse", "must be non-negative"));
        }
        if self.escape_boost_y.min <= 0.0 {
            return Err(invalid("escape_boost_y", "downward boost must be positive"));
        }
        if !(0.0..=1.0).contains(&self.steer_band.min) || !(0.0..=1.0).contains(&self.steer_band.max) {
            return Err(invalid("steer_band", "must lie within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.physics_band) {
            return Err(invalid("physics_band", "must lie within [0, 1]"));
        }
        let positive = [
            ("landing_delay", self.landing_delay),
            ("stuck_time_threshold", self.stuck_time_threshold),
            ("stuck_move_threshold", self.stuck_move_threshold),
            ("stuck_speed_threshold", self.stuck_speed_threshold),
            ("steer_interval", self.steer_interval),
            ("steer_max_accel", self.steer_max_accel),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, "must be positive and finite"));
            }
        }
        for (field, value) in [("steer_stiffness", self.steer_stiffness), ("steer_damping", self.steer_damping)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be non-negative and finite"));
            }
        }
        Ok(())
    }
}
