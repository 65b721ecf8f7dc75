//! Seed derivation: one base seed feeds independent random streams

use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::time::{SystemTime, UNIX_EPOCH};

const GENERATION_SALT: u64 = 0x9E37_79B9_7F4A_7C15;
const ORDER_SALT: u64 = 0xC2B2_AE3D_27D4_EB4F;
const INCIDENTAL_SALT: u64 = 0x1656_67B1_9E37_79F9;

/// Spreads attempt numbers across the seed space
pub const ATTEMPT_STRIDE: u64 = 0x632B_E59B_D9B4_E019;

/// Replace a zero seed with a clock-derived, non-zero one
pub fn resolve_base_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(GENERATION_SALT);
    non_zero(nanos ^ GENERATION_SALT.rotate_left(17), GENERATION_SALT)
}

/// Seed used by attempt `attempt` (attempt 0 uses the base seed itself)
pub fn attempt_seed(base: u64, attempt: u32) -> u64 {
    non_zero(base ^ u64::from(attempt).wrapping_mul(ATTEMPT_STRIDE), ATTEMPT_STRIDE)
}

fn non_zero(seed: u64, fallback: u64) -> u64 {
    if seed == 0 { fallback } else { seed }
}

/// The per-attempt random streams
pub struct SeedStreams {
    /// Placement algorithms
    pub generation: Pcg64,
    /// Rule ordering
    pub order: Pcg64,
    /// Anything else (start fallback, goal picks)
    pub incidental: Pcg64,
}

impl SeedStreams {
    pub fn from_seed(seed: u64) -> Self {
        let stream = |salt: u64| Pcg64::seed_from_u64(non_zero(seed ^ salt, salt));
        Self {
            generation: stream(GENERATION_SALT),
            order: stream(ORDER_SALT),
            incidental: stream(INCIDENTAL_SALT),
        }
    }
}
