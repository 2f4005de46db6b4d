//! Acceptance tests for steered ("deterministic") drops.
//!
//! Validates:
//! 1. Rows 8, centre target: at least 80% of 100 seeded drops land on target
//! 2. Steering clearly beats free fall from the same spawn
//! 3. Off-centre and larger-board targets are reached too
//! 4. Every steered chip lands
//!
//! Steering is probabilistic assistance, so these assert hit rates over many
//! seeded trials rather than individual outcomes.

use plinko_engine::prelude::*;

const TRIALS: u64 = 100;

/// Drop one chip on a fresh seeded board and return the slot it landed in.
fn land_one(rows: u32, seed: u64, request: DropRequest) -> Option<usize> {
    let mut engine = Engine::new(EngineConfig {
        board: BoardConfig::new(rows, 800.0, 900.0).unwrap(),
        seed: Some(seed),
        ..Default::default()
    })
    .unwrap();
    let id = engine.drop_chip(request).unwrap();
    engine
        .run_until_idle(60 * 60)
        .into_iter()
        .find_map(|e| match e {
            EngineEvent::SlotLanded { chip, slot } if chip == id => Some(slot),
            _ => None,
        })
}

fn hit_rate(rows: u32, target: usize, request: impl Fn() -> DropRequest) -> f64 {
    let hits = (0..TRIALS)
        .filter(|&seed| land_one(rows, seed, request()) == Some(target))
        .count();
    hits as f64 / TRIALS as f64
}

#[test]
fn steered_centre_drops_hit_target() {
    let steered = hit_rate(8, 4, || DropRequest::targeting(4));
    // Binomial centre probability for 8 rows is 70/256 ≈ 0.27.
    assert!(steered >= 0.8, "steered hit rate {steered:.2}");
}

#[test]
fn steering_beats_free_fall_from_centre() {
    let steered = hit_rate(8, 4, || DropRequest::targeting(4));
    let free = hit_rate(8, 4, || DropRequest::physics_at(0.5));
    assert!(steered > free + 0.3, "steered {steered:.2} vs free {free:.2}");
}

#[test]
fn off_centre_target_pulls_chips_sideways() {
    // Slot 2 of 9: unsteered chips from the centre end up there about 11% of
    // the time.
    let steered = hit_rate(8, 2, || DropRequest::targeting(2));
    let free = hit_rate(8, 2, || DropRequest::physics_at(0.5));
    assert!(steered >= 0.7, "steered hit rate {steered:.2}");
    assert!(steered > free + 0.3, "steered {steered:.2} vs free {free:.2}");
}

#[test]
fn twelve_row_centre_target_is_reached() {
    let steered = hit_rate(12, 6, || DropRequest::targeting(6));
    assert!(steered >= 0.7, "steered hit rate {steered:.2}");
}

#[test]
fn every_steered_chip_lands() {
    for seed in 0..20 {
        assert!(land_one(16, seed, DropRequest::deterministic()).is_some(), "seed {seed}");
    }
}
