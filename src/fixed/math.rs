// src/fixed/math.rs

//! Scalar and vector approximations on 32-bit fixed point.
//!
//! Every routine normalizes with NSA, works on a polynomial or an exact
//! integer iteration, and re-applies the exponent in one final saturating
//! shift. Unrepresentable results come back as sentinels, never as errors:
//!
//! - negative square root input gives `0x80000000`,
//! - a zero divisor gives a full-scale mantissa of the numerator's sign with
//!   exponent 31 (15 for the 16-bit divide),
//! - logarithm of a non-positive value gives `0x80000000`.

use super::scaling::{block_exponent_real, saturate_i32, shift_i128};
use super::types::{Fixed, MantExp};

/// sin(pi/2 * u) = sum SINE_COEFS[k] * u^(2k+1), Taylor to degree 13.
const SINE_COEFS: [f64; 7] = [
    1.5707963267948966,
    -0.6459640975062462,
    0.07969262624616703,
    -0.004681754135318687,
    0.00016044118478735975,
    -3.598843235212084e-06,
    5.692172921967922e-08,
];

/// 2^f = sum ANTILOG_COEFS[k] * f^k, `(ln 2)^k / k!`.
const ANTILOG_COEFS: [f64; 11] = [
    1.0,
    0.6931471805599453,
    0.2402265069591007,
    0.05550410866482158,
    0.009618129107628477,
    0.0013333558146428443,
    0.00015403530393381608,
    1.525273380405984e-05,
    1.3215486790144307e-06,
    1.0178086009239699e-07,
    7.054911620801123e-09,
];

const Q30: f64 = (1u64 << 30) as f64;

#[inline]
fn q30(c: f64) -> i64 {
    libm::round(c * Q30) as i64
}

/// Rounded Q30 product.
#[inline]
fn mul_q30(a: i64, b: i64) -> i64 {
    (a * b + (1 << 29)) >> 30
}

/// Floor of the square root.
pub(crate) fn isqrt_u128(v: u128) -> u128 {
    if v < 2 {
        return v;
    }
    let bits = 128 - v.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    loop {
        let y = (x + v / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Square root rounded to nearest.
pub(crate) fn isqrt_round(v: u128) -> u128 {
    let r = isqrt_u128(v);
    if v - r * r > r { r + 1 } else { r }
}

/// Square root of a Q31 value, accurate to 1 LSB.
pub fn sqrt32x32(x: Fixed<31>) -> Fixed<31> {
    let bits = x.to_bits();
    if bits < 0 {
        return Fixed::MIN;
    }
    let r = isqrt_round((bits as u128) << 31);
    Fixed::from_bits(r.min(i32::MAX as u128) as i32)
}

/// Quotient of two magnitudes as a Q31 mantissa in `[0.5, 1)` plus exponent.
fn divide_raw(num: u64, den: u64, negative: bool) -> MantExp<i32> {
    debug_assert!(den != 0);
    if num == 0 {
        return MantExp { mantissa: 0, exponent: 0 };
    }
    let ln = num.leading_zeros() - 1;
    let ld = den.leading_zeros() - 1;
    let n = (num << ln) as u128;
    let d = (den << ld) as u128;

    let mut exponent = ld as i32 - ln as i32;
    let mut mant = if n < d {
        ((n << 31) + d / 2) / d
    } else {
        exponent += 1;
        ((n << 30) + d / 2) / d
    };
    if mant >= 1 << 31 {
        mant = (mant + 1) >> 1;
        exponent += 1;
    }

    let signed = if negative { -(mant as i64) } else { mant as i64 };
    let mantissa = signed as i32;
    MantExp { mantissa, exponent }
}

/// `num / den`, both Q31. Accurate to 1 LSB of the mantissa.
pub fn divide32x32(num: Fixed<31>, den: Fixed<31>) -> MantExp<i32> {
    let (n, d) = (num.to_bits() as i64, den.to_bits() as i64);
    if d == 0 {
        let mantissa = if n < 0 { -i32::MAX } else { i32::MAX };
        return MantExp { mantissa, exponent: 31 };
    }
    divide_raw(n.unsigned_abs(), d.unsigned_abs(), (n < 0) != (d < 0))
}

/// `1 / x` for Q31 `x`. Zero gives `{0x7fffffff, 31}`.
pub fn recip32x32(x: Fixed<31>) -> MantExp<i32> {
    let d = x.to_bits() as i64;
    if d == 0 {
        return MantExp { mantissa: i32::MAX, exponent: 31 };
    }
    divide_raw(1 << 31, d.unsigned_abs(), d < 0)
}

/// 16-bit divide, mantissa Q15.
pub fn divide16x16(num: i16, den: i16) -> MantExp<i16> {
    if den == 0 {
        let mantissa = if num < 0 { -i16::MAX } else { i16::MAX };
        return MantExp { mantissa, exponent: 15 };
    }
    let q = divide_raw(
        (num as i64).unsigned_abs() << 16,
        (den as i64).unsigned_abs() << 16,
        (num < 0) != (den < 0),
    );
    let mut mant = (q.mantissa.unsigned_abs() as u32 + (1 << 15)) >> 16;
    let mut exponent = q.exponent;
    if mant >= 1 << 15 {
        mant = (mant + 1) >> 1;
        exponent += 1;
    }
    let signed = if q.mantissa < 0 { -(mant as i32) } else { mant as i32 };
    let mantissa = signed as i16;
    MantExp { mantissa, exponent }
}

/// `sin(pi * x)` with `x` a Q31 phase, so the full input range covers
/// `[-pi, pi)`. Absolute error below 8e-7.
pub fn sine32x32(x: Fixed<31>) -> Fixed<31> {
    let half = 1i64 << 30;
    let mut t = x.to_bits() as i64;
    if t > half {
        t = (1 << 31) - t;
    } else if t < -half {
        t = -(1 << 31) - t;
    }

    // u = 2t in Q30 has the same raw value as t in Q31.
    let u = t;
    let u2 = mul_q30(u, u);
    let mut p = q30(SINE_COEFS[SINE_COEFS.len() - 1]);
    for &c in SINE_COEFS.iter().rev().skip(1) {
        p = q30(c) + mul_q30(p, u2);
    }
    let s = mul_q30(p, u);
    Fixed::saturating_from_wide(2 * s)
}

/// `log2(x)` for Q31 `x` in `(0, 1)`, result in Q25.
pub fn log2_32x32(x: Fixed<31>) -> Fixed<25> {
    let bits = x.to_bits();
    if bits <= 0 {
        return Fixed::MIN;
    }
    let e = x.nsa();
    let m = (bits << e) as u128;

    // y = 2 * m / 2^31 in [1, 2), Q62. Squaring doubles the log; every
    // overflow past 2 is one more fractional bit.
    let mut y = m << 32;
    let mut frac: i64 = 0;
    for _ in 0..26 {
        y = (y * y) >> 62;
        frac <<= 1;
        if y >= 1 << 63 {
            frac |= 1;
            y >>= 1;
        }
    }
    let frac_q25 = (frac + 1) >> 1;
    let int_part = -1 - e as i64;
    Fixed::saturating_from_wide((int_part << 25) + frac_q25)
}

/// `2^x` for Q25 `x`, result in Q31. Non-negative inputs saturate.
pub fn antilog2_32x32(x: Fixed<25>) -> Fixed<31> {
    let bits = x.to_bits();
    if bits >= 0 {
        return Fixed::MAX;
    }
    let k = (bits >> 25) as i64;
    let f = ((bits & ((1 << 25) - 1)) as i64) << 5;

    let mut p = q30(ANTILOG_COEFS[ANTILOG_COEFS.len() - 1]);
    for &c in ANTILOG_COEFS.iter().rev().skip(1) {
        p = q30(c) + mul_q30(p, f);
    }

    // p * 2^k in Q31 is p in Q30 shifted by -(k + 1).
    let rsh = -(k + 1);
    if rsh >= 62 {
        return Fixed::ZERO;
    }
    Fixed::saturating_from_wide(shift_i128(p as i128, rsh as i32) as i64)
}

/// Dot product in Q62, saturated to 64 bits.
pub fn vec_dot32x32(x: &[Fixed<31>], y: &[Fixed<31>]) -> i64 {
    debug_assert_eq!(x.len(), y.len());
    let acc: i128 = x
        .iter()
        .zip(y)
        .map(|(a, b)| a.to_bits() as i128 * b.to_bits() as i128)
        .sum();
    acc.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Signal power: sum of squares in Q62, right-shifted by `rsh` with rounding.
pub fn vec_power32x32(x: &[Fixed<31>], rsh: u32) -> i64 {
    let acc: i128 = x.iter().map(|a| (a.to_bits() as i128).pow(2)).sum();
    shift_i128(acc, rsh as i32).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// `y = x * scale * 2^lsh`, rounded and saturated. `lsh` may be negative.
pub fn vec_scale32x32(y: &mut [Fixed<31>], x: &[Fixed<31>], scale: Fixed<31>, lsh: i32) {
    debug_assert_eq!(x.len(), y.len());
    let s = scale.to_bits() as i128;
    for (out, a) in y.iter_mut().zip(x) {
        let prod = a.to_bits() as i128 * s;
        *out = Fixed::from_bits(saturate_i32(shift_i128(prod, 31 - lsh)));
    }
}

/// Common headroom of a block: the smallest NSA over all elements.
pub fn vec_bexp32(x: &[Fixed<31>]) -> u32 {
    block_exponent_real(x)
}

#[cfg(test)]
#[path = "math_tests.rs"]
mod tests;
