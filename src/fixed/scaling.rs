// src/fixed/scaling.rs

use super::types::{ComplexFixed, Fixed, Wide};

/// How a stage keeps its outputs inside the fixed-point range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingMode {
    /// Scaling option 3: every stage shifts by its radix worst case,
    /// independent of the data.
    Static,
    /// Scaling option 2: each stage shifts only by the headroom it is missing,
    /// judged from the block exponent of its input.
    Dynamic,
}

/// Right-shifts applied inside one butterfly.
///
/// `shift1` rounds the results of the first add/sub layer, `shift2` rounds
/// the butterfly outputs. Passed explicitly to every call; there is no
/// shared rounding state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundingConfig {
    pub shift1: u32,
    pub shift2: u32,
}

impl RoundingConfig {
    pub const NONE: Self = Self { shift1: 0, shift2: 0 };

    pub const fn new(shift1: u32, shift2: u32) -> Self {
        Self { shift1, shift2 }
    }

    /// Distributes a total shift over both layers, the larger half first.
    pub const fn split(total: u32) -> Self {
        let shift2 = total / 2;
        Self { shift1: total - shift2, shift2 }
    }

    pub const fn total(self) -> u32 {
        self.shift1 + self.shift2
    }
}

/// Rounding arithmetic right shift (round half up).
#[inline]
pub fn round_shift(x: i64, shift: u32) -> i64 {
    if shift == 0 {
        x
    } else {
        (x + (1i64 << (shift - 1))) >> shift
    }
}

#[inline]
pub fn round_shift_wide(x: Wide, shift: u32) -> Wide {
    Wide::new(round_shift(x.re, shift), round_shift(x.im, shift))
}

/// Rounding shift over i128, right for positive `shift`, left for negative.
/// Shifts that would push every bit out return zero.
#[inline]
pub(crate) fn shift_i128(x: i128, shift: i32) -> i128 {
    if shift > 0 {
        if shift >= 127 {
            return 0;
        }
        x.saturating_add(1i128 << (shift - 1)) >> shift
    } else {
        let lsh = shift.unsigned_abs();
        if x == 0 {
            0
        } else if lsh < 127 && x.unsigned_abs() <= (i128::MAX >> lsh) as u128 {
            x << lsh
        } else if x < 0 {
            i128::MIN
        } else {
            i128::MAX
        }
    }
}

#[inline]
pub(crate) fn saturate_i32(x: i128) -> i32 {
    x.clamp(i32::MIN as i128, i32::MAX as i128) as i32
}

/// Block exponent of a complex buffer: the minimum NSA over every component.
/// An empty or all-zero buffer reports 31.
pub fn block_exponent<const FRAC: u32>(x: &[ComplexFixed<FRAC>]) -> u32 {
    x.iter().fold(31, |acc, c| acc.min(c.nsa()))
}

/// Block exponent of a real buffer.
pub fn block_exponent_real<const FRAC: u32>(x: &[Fixed<FRAC>]) -> u32 {
    x.iter().fold(31, |acc, v| acc.min(v.nsa()))
}
