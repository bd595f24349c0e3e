//! Injectable randomness for render passes.
//!
//! The packer, the gallery and the grid renderer never reach for a global
//! generator; they take a `&mut dyn RandomSource` so a fixed seed (or a scripted
//! source in tests) reproduces a layout exactly.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `lo..=hi`. Always consumes one draw, even for a
    /// single-value range, so callers keep a fixed draw order.
    fn next_usize_inclusive(&mut self, lo: usize, hi: usize) -> usize {
        let draw = self.next_f64();
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo + 1) as f64;
        let offset = (draw * span).floor() as usize;
        lo + offset.min(hi - lo)
    }

    /// Uniform real in `[lo, hi)`; `lo` when the range is empty. Always
    /// consumes one draw.
    fn next_f64_in(&mut self, lo: f64, hi: f64) -> f64 {
        let draw = self.next_f64();
        if hi <= lo {
            return lo;
        }
        lo + draw * (hi - lo)
    }
}

/// Simple LCG PRNG for deterministic generation.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    /// Seeds from the OS, falling back to the clock when no entropy source is available.
    pub fn from_entropy() -> Self {
        Self::new(entropy_seed())
    }

    pub fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }
}

impl RandomSource for SeededRng {
    fn next_f64(&mut self) -> f64 {
        // 53 high bits keep the result strictly below 1.0
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

pub fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            debug!(error = %e, "OS entropy unavailable, seeding from clock");
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        }
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Always returns the same draw.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedSource {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
