//! Binomial landing distribution and target-slot sampling.
//!
//! A chip that bounces left or right with equal probability at each of `n`
//! peg rows lands in slot `i` with probability `C(n, i) / 2^n`. The table for
//! each valid [`RowCount`] is computed once and shared.

use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::board::RowCount;

static TABLES: OnceLock<Vec<Vec<f64>>> = OnceLock::new();

/// Binomial coefficients `C(n, 0..=n)` normalized to sum to 1.
///
/// Works for any `n`; the cached tables in [`distribution`] only cover the
/// valid board sizes.
pub fn binomial_distribution(n: u32) -> Vec<f64> {
    let mut coefficients = Vec::with_capacity(n as usize + 1);
    let mut c = 1.0_f64;
    coefficients.push(c);
    for k in 1..=n {
        c = c * f64::from(n - k + 1) / f64::from(k);
        coefficients.push(c);
    }
    let total: f64 = coefficients.iter().sum();
    coefficients.iter().map(|c| c / total).collect()
}

/// The landing distribution for `rows`: `rows + 1` entries summing to 1,
/// symmetric about the centre slot.
pub fn distribution(rows: RowCount) -> &'static [f64] {
    let tables = TABLES.get_or_init(|| {
        RowCount::ALL
            .iter()
            .map(|r| binomial_distribution(r.get()))
            .collect()
    });
    &tables[rows.table_index()]
}

/// Map a uniform variate in `[0, 1)` to the slot whose cumulative
/// probability first exceeds it.
///
/// Falls back to the last slot when rounding leaves the cumulative sum just
/// below `u`.
pub fn slot_for_variate(probs: &[f64], u: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, p) in probs.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return i;
        }
    }
    probs.len().saturating_sub(1)
}

/// Draw a target slot from `distribution(rows)` using the caller's RNG.
pub fn sample_slot_with<R: Rng + ?Sized>(rows: RowCount, rng: &mut R) -> usize {
    slot_for_variate(distribution(rows), rng.gen::<f64>())
}

/// Draw a target slot for `rows`.
///
/// With a seed the draw comes from a [`Pcg64`] seeded with it, so the same
/// `(rows, seed)` always yields the same slot. Without one the thread RNG is
/// used.
pub fn sample_slot(rows: RowCount, seed: Option<u64>) -> usize {
    match seed {
        Some(seed) => sample_slot_with(rows, &mut Pcg64::seed_from_u64(seed)),
        None => sample_slot_with(rows, &mut rand::thread_rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_rows_matches_pascal_row() {
        let probs = distribution(RowCount::R8);
        let expected = [1.0, 8.0, 28.0, 56.0, 70.0, 56.0, 28.0, 8.0, 1.0];
        assert_eq!(probs.len(), 9);
        for (p, c) in probs.iter().zip(expected) {
            assert!((p - c / 256.0).abs() < 1e-12, "got {p}, expected {}", c / 256.0);
        }
    }

    #[test]
    fn every_board_size_sums_to_one_and_is_symmetric() {
        for rows in RowCount::ALL {
            let probs = distribution(rows);
            assert_eq!(probs.len(), rows.slot_count());
            let sum: f64 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "rows {rows}: sum {sum}");
            let n = probs.len();
            for i in 0..n {
                assert_eq!(probs[i], probs[n - 1 - i], "rows {rows}: asymmetric at {i}");
            }
        }
    }

    #[test]
    fn centre_slot_is_the_mode() {
        for rows in RowCount::ALL {
            let probs = distribution(rows);
            let centre = probs[rows.get() as usize / 2];
            assert!(probs.iter().all(|&p| p <= centre), "rows {rows}");
        }
    }

    #[test]
    fn variate_edges() {
        let probs = distribution(RowCount::R8);
        assert_eq!(slot_for_variate(probs, 0.0), 0);
        assert_eq!(slot_for_variate(probs, 0.5), 4);
        // Anything at or past the rounded total lands in the last slot.
        assert_eq!(slot_for_variate(probs, 1.0), 8);
        assert_eq!(slot_for_variate(probs, 1.5), 8);
    }

    #[test]
    fn seeded_sample_is_repeatable() {
        for seed in [0_u64, 1, 42, u64::MAX] {
            let first = sample_slot(RowCount::R12, Some(seed));
            for _ in 0..10 {
                assert_eq!(sample_slot(RowCount::R12, Some(seed)), first);
            }
        }
    }

    #[test]
    fn unseeded_sample_is_in_range() {
        for _ in 0..100 {
            assert!(sample_slot(RowCount::R16, None) < 17);
        }
    }
}
