// src/fixed/butterfly.rs

//! Small-radix DFT butterflies over wide complex values.
//!
//! Inputs are forward-transform legs already multiplied by their twiddles.
//! Internal sums are kept in i64, so nothing wraps inside a butterfly; the
//! [`RoundingConfig`] decides where magnitudes are brought back down.
//! Outputs are in natural order `X0..X(r-1)`.

use super::scaling::{RoundingConfig, round_shift_wide};
use super::types::Wide;

/// sin(2*pi/3) in Q31.
const SIN_2PI_3: i64 = 1_859_775_393;
/// cos(2*pi/5), cos(4*pi/5), sin(2*pi/5), sin(4*pi/5) in Q31.
const COS_2PI_5: i64 = 663_608_942;
const COS_4PI_5: i64 = -1_737_350_766;
const SIN_2PI_5: i64 = 2_042_378_317;
const SIN_4PI_5: i64 = 1_262_259_218;
/// sqrt(1/2) in Q31.
const SQRT_HALF: i64 = 1_518_500_250;

/// Largest butterfly handled by a stage.
pub const MAX_RADIX: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Two,
    Three,
    Four,
    Five,
    Six,
    Eight,
}

impl Radix {
    pub const fn size(self) -> usize {
        match self {
            Radix::Two => 2,
            Radix::Three => 3,
            Radix::Four => 4,
            Radix::Five => 5,
            Radix::Six => 6,
            Radix::Eight => 8,
        }
    }

    /// Bits of growth a butterfly of this radix can produce on one component:
    /// `ceil(log2(r * sqrt(2)))`. Shifting by this much keeps any in-range
    /// input in range.
    pub const fn headroom(self) -> u32 {
        match self {
            Radix::Two => 2,
            Radix::Three | Radix::Four | Radix::Five => 3,
            Radix::Six | Radix::Eight => 4,
        }
    }

    pub const fn from_size(r: usize) -> Option<Self> {
        match r {
            2 => Some(Radix::Two),
            3 => Some(Radix::Three),
            4 => Some(Radix::Four),
            5 => Some(Radix::Five),
            6 => Some(Radix::Six),
            8 => Some(Radix::Eight),
            _ => None,
        }
    }

    /// Runs the butterfly of this radix on `x[..r]` into `y[..r]`.
    pub fn butterfly(self, x: &[Wide], y: &mut [Wide], cfg: RoundingConfig) {
        let r = self.size();
        debug_assert!(x.len() >= r && y.len() >= r);
        match self {
            Radix::Two => y[..2].copy_from_slice(&dft2([x[0], x[1]], cfg)),
            Radix::Three => y[..3].copy_from_slice(&dft3([x[0], x[1], x[2]], cfg)),
            Radix::Four => y[..4].copy_from_slice(&dft4([x[0], x[1], x[2], x[3]], cfg)),
            Radix::Five => y[..5].copy_from_slice(&dft5([x[0], x[1], x[2], x[3], x[4]], cfg)),
            Radix::Six => {
                y[..6].copy_from_slice(&dft6([x[0], x[1], x[2], x[3], x[4], x[5]], cfg))
            }
            Radix::Eight => {
                let mut a = [Wide::new(0, 0); 8];
                a.copy_from_slice(&x[..8]);
                y[..8].copy_from_slice(&dft8(a, cfg));
            }
        }
    }
}

/// Rounded product with a Q31 constant (`frac` = 31) or a Q30 one.
#[inline]
fn mul_const(x: i64, c: i64, frac: u32) -> i64 {
    ((x as i128 * c as i128 + (1i128 << (frac - 1))) >> frac) as i64
}

/// `(a*ca + b*cb) / 2^31`, rounded once.
#[inline]
fn dot2(a: i64, ca: i64, b: i64, cb: i64) -> i64 {
    ((a as i128 * ca as i128 + b as i128 * cb as i128 + (1i128 << 30)) >> 31) as i64
}

/// Multiplies by -j: (re, im) -> (im, -re).
#[inline]
fn mul_neg_j(x: Wide) -> Wide {
    Wide::new(x.im, -x.re)
}

pub fn dft2(x: [Wide; 2], cfg: RoundingConfig) -> [Wide; 2] {
    let s = cfg.total();
    [round_shift_wide(x[0] + x[1], s), round_shift_wide(x[0] - x[1], s)]
}

/// 3-point DFT: `X0 = x0 + t`, `X1,2 = x0 - t/2 -/+ j*sin(2pi/3)*d`
/// with `t = x1 + x2`, `d = x1 - x2`.
pub fn dft3(x: [Wide; 3], cfg: RoundingConfig) -> [Wide; 3] {
    let x0 = round_shift_wide(x[0], cfg.shift1);
    let t = round_shift_wide(x[1] + x[2], cfg.shift1);
    let d = round_shift_wide(x[1] - x[2], cfg.shift1);

    // Doubled so that t/2 stays exact until the final rounding.
    let a2 = x0 * 2 - t;
    let b2 = Wide::new(mul_const(d.re, SIN_2PI_3, 30), mul_const(d.im, SIN_2PI_3, 30));
    let jb = mul_neg_j(b2);

    let s = cfg.shift2;
    [
        round_shift_wide(x0 + t, s),
        round_shift_wide(a2 + jb, s + 1),
        round_shift_wide(a2 - jb, s + 1),
    ]
}

/// 4-point DFT in natural order `(X0, X1, X2, X3)`, not the bit-reversed
/// `(X0, X2, X1, X3)` of a DIT butterfly; the Stockham stages expect it.
pub fn dft4(x: [Wide; 4], cfg: RoundingConfig) -> [Wide; 4] {
    let s1 = cfg.shift1;
    let sum02 = round_shift_wide(x[0] + x[2], s1);
    let dif02 = round_shift_wide(x[0] - x[2], s1);
    let sum13 = round_shift_wide(x[1] + x[3], s1);
    let dif13 = mul_neg_j(round_shift_wide(x[1] - x[3], s1));

    let s2 = cfg.shift2;
    [
        round_shift_wide(sum02 + sum13, s2),
        round_shift_wide(dif02 + dif13, s2),
        round_shift_wide(sum02 - sum13, s2),
        round_shift_wide(dif02 - dif13, s2),
    ]
}

pub fn dft5(x: [Wide; 5], cfg: RoundingConfig) -> [Wide; 5] {
    let s1 = cfg.shift1;
    let x0 = round_shift_wide(x[0], s1);
    let t1 = round_shift_wide(x[1] + x[4], s1);
    let t2 = round_shift_wide(x[2] + x[3], s1);
    let d1 = round_shift_wide(x[1] - x[4], s1);
    let d2 = round_shift_wide(x[2] - x[3], s1);

    let a1 = x0 + Wide::new(
        dot2(t1.re, COS_2PI_5, t2.re, COS_4PI_5),
        dot2(t1.im, COS_2PI_5, t2.im, COS_4PI_5),
    );
    let a2 = x0 + Wide::new(
        dot2(t1.re, COS_4PI_5, t2.re, COS_2PI_5),
        dot2(t1.im, COS_4PI_5, t2.im, COS_2PI_5),
    );
    let b1 = mul_neg_j(Wide::new(
        dot2(d1.re, SIN_2PI_5, d2.re, SIN_4PI_5),
        dot2(d1.im, SIN_2PI_5, d2.im, SIN_4PI_5),
    ));
    let b2 = mul_neg_j(Wide::new(
        dot2(d1.re, SIN_4PI_5, d2.re, -SIN_2PI_5),
        dot2(d1.im, SIN_4PI_5, d2.im, -SIN_2PI_5),
    ));

    let s2 = cfg.shift2;
    [
        round_shift_wide(x0 + t1 + t2, s2),
        round_shift_wide(a1 + b1, s2),
        round_shift_wide(a2 + b2, s2),
        round_shift_wide(a2 - b2, s2),
        round_shift_wide(a1 - b1, s2),
    ]
}

/// 6-point DFT as a 2x3 prime-factor split: radix-2 on the pairs
/// `(x0,x3) (x2,x5) (x4,x1)`, then two radix-3 butterflies whose outputs
/// land on `X[(3*k1 + 4*k2) % 6]`.
pub fn dft6(x: [Wide; 6], cfg: RoundingConfig) -> [Wide; 6] {
    let s1 = cfg.shift1;
    let pairs = [(x[0], x[3]), (x[2], x[5]), (x[4], x[1])];
    let mut even = [Wide::new(0, 0); 3];
    let mut odd = [Wide::new(0, 0); 3];
    for (n2, &(a, b)) in pairs.iter().enumerate() {
        even[n2] = round_shift_wide(a + b, s1);
        odd[n2] = round_shift_wide(a - b, s1);
    }

    let inner = RoundingConfig::new(0, cfg.shift2);
    let e = dft3(even, inner);
    let o = dft3(odd, inner);
    [e[0], o[1], e[2], o[0], e[1], o[2]]
}

/// 8-point DFT: two 4-point halves, the odd half rotated by `w8^k`,
/// then a radix-2 combine.
pub fn dft8(x: [Wide; 8], cfg: RoundingConfig) -> [Wide; 8] {
    let first = RoundingConfig::new(cfg.shift1, 0);
    let e = dft4([x[0], x[2], x[4], x[6]], first);
    let o = dft4([x[1], x[3], x[5], x[7]], first);

    let rot = [
        o[0],
        Wide::new(
            mul_const(o[1].re + o[1].im, SQRT_HALF, 31),
            mul_const(o[1].im - o[1].re, SQRT_HALF, 31),
        ),
        mul_neg_j(o[2]),
        Wide::new(
            mul_const(o[3].im - o[3].re, SQRT_HALF, 31),
            -mul_const(o[3].re + o[3].im, SQRT_HALF, 31),
        ),
    ];

    let s2 = cfg.shift2;
    let mut y = [Wide::new(0, 0); 8];
    for k in 0..4 {
        y[k] = round_shift_wide(e[k] + rot[k], s2);
        y[k + 4] = round_shift_wide(e[k] - rot[k], s2);
    }
    y
}

#[cfg(test)]
#[path = "butterfly_tests.rs"]
mod tests;
