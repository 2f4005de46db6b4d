//! Plinko Core -- physics-free building blocks of the Plinko drop simulation.
//!
//! This crate holds everything that can be computed without a physics world:
//! the binomial landing distribution and target sampling, the board layout
//! derived from row count and viewport, the tuned simulation constants, and
//! generational chip identifiers.
//!
//! # Quick Start
//!
//! ```
//! use plinko_core::prelude::*;
//!
//! let config = BoardConfig::new(12, 800.0, 900.0).unwrap();
//! let layout = BoardLayout::new(config).unwrap();
//! assert_eq!(layout.slot_count(), 13);
//!
//! let probs = distribution(config.rows);
//! assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
//!
//! let slot = sample_slot(config.rows, Some(7));
//! assert_eq!(slot, sample_slot(config.rows, Some(7)));
//! ```

#![deny(unsafe_code)]

pub mod board;
pub mod chip_id;
pub mod probability;
pub mod tuning;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A board or simulation configuration that cannot be built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Row count outside the supported board sizes.
    #[error("invalid row count {rows}: expected one of 8, 10, 12, 14, 16")]
    InvalidRowCount { rows: u32 },

    /// Viewport too small, non-positive or non-finite.
    #[error("invalid viewport {width}x{height}: dimensions must be positive and finite")]
    InvalidViewport { width: f64, height: f64 },

    /// A tuning value the simulation cannot run with.
    #[error("invalid tuning value '{field}': {reason}")]
    InvalidTuning { field: String, reason: String },

    /// Fixed timestep not positive and finite.
    #[error("fixed_dt must be positive and finite, got {fixed_dt}")]
    InvalidTimestep { fixed_dt: f64 },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::board::{BoardConfig, BoardLayout, Boundary, Point, Rect, RowCount, SlotGeometry};
    pub use crate::chip_id::{ChipAllocator, ChipId};
    pub use crate::probability::{distribution, sample_slot, sample_slot_with};
    pub use crate::tuning::{ChipDraw, Range, Tuning};
    pub use crate::ConfigError;
}
