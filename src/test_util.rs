// Reference helpers shared by the unit tests.

use crate::fixed::types::{ComplexFixed, Wide};
use core::f64::consts::PI;
use num_complex::Complex64;

/// Direct O(n^2) forward DFT in f64.
pub(crate) fn dft(x: &[Complex64]) -> Vec<Complex64> {
    let n = x.len();
    (0..n)
        .map(|k| {
            x.iter()
                .enumerate()
                .map(|(t, &v)| {
                    let angle = -2.0 * PI * ((k * t) % n) as f64 / n as f64;
                    v * Complex64::new(angle.cos(), angle.sin())
                })
                .sum()
        })
        .collect()
}

pub(crate) fn wide_to_c64(w: Wide) -> Complex64 {
    Complex64::new(w.re as f64, w.im as f64)
}

/// Raw integer components as f64 (no Q scaling).
pub(crate) fn raw_c64<const FRAC: u32>(c: ComplexFixed<FRAC>) -> Complex64 {
    Complex64::new(c.re.to_bits() as f64, c.im.to_bits() as f64)
}

/// Small xorshift generator so tests stay deterministic without extra crates.
pub(crate) struct XorShift(u64);

impl XorShift {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform value in `[-limit, limit]`.
    pub(crate) fn range_i32(&mut self, limit: i32) -> i32 {
        let span = 2 * limit as u64 + 1;
        ((self.next_u64() % span) as i64 - limit as i64) as i32
    }

    /// Uniform value in `[-1, 1)`.
    pub(crate) fn unit_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }
}
