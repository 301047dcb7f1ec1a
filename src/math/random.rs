use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

/// Deterministic seed for the `stream_index`-th independent unit of work.
#[inline]
pub fn stream_seed(base_seed: u64, stream_index: usize) -> u64 {
    base_seed.wrapping_add((stream_index as u64).wrapping_mul(7_919))
}

/// Seed drawn from the thread-local entropy-seeded generator.
#[inline]
pub fn fresh_seed() -> u64 {
    rand::rng().random::<u64>()
}

/// Reproducible generator for an explicit seed.
#[inline]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
