//! Plinko Engine -- rapier2d drop simulation with physics and steered modes.
//!
//! This crate builds on [`plinko_core`] to run the board: it turns a
//! [`BoardLayout`](plinko_core::board::BoardLayout) into static colliders,
//! spawns chips, routes contacts into peg-hit and slot-landing events, kicks
//! wedged chips loose, and (in deterministic mode) steers chips toward a
//! pre-selected slot.
//!
//! # Quick Start
//!
//! ```
//! use plinko_engine::prelude::*;
//!
//! let config = EngineConfig {
//!     board: BoardConfig::new(8, 800.0, 900.0).unwrap(),
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! let mut engine = Engine::new(config).unwrap();
//!
//! let chip = engine.drop_chip(DropRequest::targeting(4)).unwrap();
//! let events = engine.run_until_idle(60 * 60);
//!
//! let landings: Vec<_> = events
//!     .iter()
//!     .filter(|e| matches!(e, EngineEvent::SlotLanded { .. }))
//!     .collect();
//! assert_eq!(landings.len(), 1);
//! assert_eq!(landings[0].chip(), chip);
//! assert_eq!(engine.active_chip_count(), 0);
//! ```

#![deny(unsafe_code)]

pub mod chip;
pub mod clock;
pub mod drop;
pub mod engine;
pub mod physics;
pub mod recovery;
pub mod router;
pub mod world_builder;

/// Re-export the core crate for convenience.
pub use plinko_core;

use plinko_core::ConfigError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why the engine refused an operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Board, timestep or tuning rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Config text that does not parse.
    #[error("malformed engine config: {0}")]
    Json(#[from] serde_json::Error),

    /// The engine was torn down.
    #[error("engine has been destroyed")]
    Destroyed,

    /// Too many chips in flight.
    #[error("active chip cap of {cap} reached")]
    ChipCapReached { cap: usize },

    /// Explicit target past the last slot.
    #[error("target slot {slot} out of range: board has {slot_count} slots")]
    InvalidTargetSlot { slot: usize, slot_count: usize },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use plinko_core::prelude::*;

    pub use crate::drop::{DropMode, DropRequest};
    pub use crate::engine::{
        ChipView, Engine, EngineConfig, EngineEvent, EngineStats, FrameHook, FrameView,
    };
    pub use crate::physics::{BodyTag, PhysicsWorld};
    pub use crate::world_builder::BuiltWorld;
    pub use crate::EngineError;
}
