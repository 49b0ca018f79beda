//! Seeded ordering for gallery discovery pages.
//!
//! The permutation only depends on the seed string and the input order, so a
//! client that keeps its seed sees the same arrangement on every reload.

const LCG_MULTIPLIER: i64 = 9301;
const LCG_INCREMENT: i64 = 49297;
const LCG_MODULUS: i64 = 233_280;

/// 32-bit rolling string hash (`h = h * 31 + unit`, wrapping) over UTF-16 code units.
pub fn hash_seed(seed: &str) -> i32 {
    seed.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

#[derive(Debug, Clone)]
pub struct SeededRng {
    state: i64,
}

impl SeededRng {
    pub fn from_seed(seed: &str) -> Self {
        Self {
            state: i64::from(hash_seed(seed)).rem_euclid(LCG_MODULUS),
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT).rem_euclid(LCG_MODULUS);
        self.state as f64 / LCG_MODULUS as f64
    }

    /// Next index in `0..bound`. `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        let scaled = (self.next_unit() * bound as f64).floor() as usize;
        scaled.min(bound.saturating_sub(1))
    }
}

/// Fisher–Yates shuffle driven by [`SeededRng`].
pub fn seeded_shuffle<T>(items: &mut [T], seed: &str) {
    let mut rng = SeededRng::from_seed(seed);
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}
