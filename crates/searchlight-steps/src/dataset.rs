//! Random sorted datasets for array cards.

use rand::seq::SliceRandom;
use rand::Rng;

/// Length of a freshly generated dataset.
pub const DEFAULT_LEN: usize = 14;

/// Strictly increasing values: the first in `2..=11`, each gap in `2..=10`.
pub fn random_sorted<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<i64> {
    let mut current = rng.gen_range(2..=11);
    (0..len)
        .map(|_| {
            let value = current;
            current += rng.gen_range(2..=10);
            value
        })
        .collect()
}

/// A uniformly chosen element of `data`.
pub fn pick_target<R: Rng + ?Sized>(rng: &mut R, data: &[i64]) -> Option<i64> {
    data.choose(rng).copied()
}
