//! Collision/event routing.
//!
//! Each chip moves through `Falling → Landed → Removed`. While falling, every
//! peg contact yields a [`Routed::PegHit`] and the engine applies a
//! [`chaos_kick`]. The first slot-sensor contact marks the chip landed and
//! yields [`Routed::Landed`]; the engine defers the landing event and the
//! removal by the settle delay. Once landed, a chip's contacts are ignored.

use plinko_core::board::BoardLayout;
use plinko_core::chip_id::ChipId;
use plinko_core::tuning::Tuning;
use rand::Rng;

use crate::chip::ChipRegistry;
use crate::physics::{BodyTag, Contact};

/// A contact that means something to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    PegHit(ChipId),
    Landed { chip: ChipId, slot: usize },
}

/// Resolve one step's contacts against the registry.
///
/// Sensor contacts flip the chip's landed flag here, in contact order, so a
/// peg contact that sorts after the sensor in the same step is dropped too.
pub fn route(contacts: &[Contact], chips: &mut ChipRegistry) -> Vec<Routed> {
    let mut routed = Vec::new();
    for contact in contacts {
        let Some((id, other)) = contact.chip_and_other() else {
            continue;
        };
        let falling = chips.get(id).is_some_and(|c| !c.landed);
        if !falling {
            tracing::trace!(chip = %id, ?other, "contact ignored");
            continue;
        }
        match other {
            BodyTag::Peg => routed.push(Routed::PegHit(id)),
            BodyTag::SlotSensor(slot) => {
                if chips.mark_landed(id) {
                    routed.push(Routed::Landed { chip: id, slot });
                }
            }
            BodyTag::Wall | BodyTag::Divider | BodyTag::Chip(_) => {}
        }
    }
    routed
}

/// Random nudge applied on a peg contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaosKick {
    /// Lateral force in board force units (applied for one step).
    pub force_x: f64,
    /// Added angular velocity, rad/s.
    pub spin: f64,
}

/// Draw a lateral kick for a chip at horizontal position `x`.
///
/// The magnitude is uniform in `tuning.chaos_impulse`. The direction is a
/// coin flip weighted toward the board centre by
/// `chaos_center_bias * normalised_offset`.
pub fn chaos_kick<R: Rng + ?Sized>(rng: &mut R, x: f64, layout: &BoardLayout, tuning: &Tuning) -> ChaosKick {
    let half = layout.half_inner_width().max(f64::EPSILON);
    let offset = ((x - layout.centre_x()) / half).clamp(-1.0, 1.0);
    let lean = rng.gen_range(-1.0..=1.0) - tuning.chaos_center_bias * offset;
    let direction = if lean < 0.0 { -1.0 } else { 1.0 };
    let magnitude = tuning.chaos_impulse.lerp(rng.gen::<f64>());
    let spin = rng.gen_range(-1.0..=1.0) * tuning.chaos_spin;
    ChaosKick {
        force_x: direction * magnitude,
        spin,
    }
}
