//! Deterministic pseudo-random sequence for the miss fallback sound.
//!
//! A plain linear congruential generator carried around as a value: each draw
//! consumes the generator and hands back its successor, so replays with the
//! same seed and the same key presses reproduce the same sounds and scores.

const MODULUS: u64 = 0x8000_0000; // 2^31
const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;

pub const DEFAULT_SEED: u32 = 42;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
    draws: u64,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self {
            state: (seed as u64 % MODULUS) as u32,
            draws: 0,
        }
    }

    fn hash(state: u32) -> u32 {
        ((MULTIPLIER * state as u64 + INCREMENT) % MODULUS) as u32
    }

    fn scale(hash: u32) -> f64 {
        (2.0 * hash as f64) / ((MODULUS - 1) as f64) - 1.0
    }

    /// Next value in `[-1, 1]` and the advanced generator.
    pub fn draw(self) -> (f64, Lcg) {
        let state = Self::hash(self.state);
        let next = Lcg {
            state,
            draws: self.draws + 1,
        };
        (Self::scale(state), next)
    }

    /// Number of values drawn since seeding.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Lcg::new(DEFAULT_SEED)
    }
}

/// Map a value in `[-1, 1]` onto an index of a slice of length `len`.
/// `None` for an empty slice.
pub fn pick_index(value: f64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let unit = ((value + 1.0) / 2.0).clamp(0.0, 1.0);
    let idx = (unit * len as f64).floor() as usize;
    Some(idx.min(len - 1))
}
