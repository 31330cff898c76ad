// src/fixed/stage.rs

//! One pass of a mixed-radix, self-sorting (Stockham) decimation-in-time FFT.
//!
//! A transform of size `n` is a chain of stages. Before a stage, `v` is the
//! size of the sub-transforms already combined; the stage gathers `r` of them,
//! rotates legs `1..r` by their twiddles, runs the radix-`r` butterfly and
//! leaves sub-transforms of size `v*r`. With `s = n/(v*r)`:
//!
//! ```text
//! leg k of (p, q) = x[q + s*(r*p + k)]          p in 0..v, q in 0..s
//! y[q + s*(p + k*v)] = X_k
//! ```
//!
//! The first stage reads `r` interleaved sub-sequences of length `n/r` and
//! uses no twiddles. After the last stage `v == n` and `y` is the transform
//! in natural order. Input and output buffers must be distinct; the caller
//! ping-pongs them between stages.
//!
//! Every stage returns the right-shift it applied. Summed over the chain, it
//! gives the power of two the result must be multiplied by to get the
//! unscaled transform.

use super::butterfly::{MAX_RADIX, Radix};
use super::scaling::{RoundingConfig, ScalingMode};
use super::twiddle::Twiddle;
use super::types::{ComplexFixed, Wide};

/// Shift a stage applies for the given scaling mode and input block exponent.
///
/// Static scaling always takes the radix worst case. Dynamic scaling takes
/// only the headroom the input is missing and never shifts left.
#[inline]
pub fn stage_shift(radix: Radix, mode: ScalingMode, bexp: u32) -> u32 {
    match mode {
        ScalingMode::Static => radix.headroom(),
        ScalingMode::Dynamic => radix.headroom().saturating_sub(bexp),
    }
}

/// First stage: `v` must be 1, no twiddles are applied.
pub fn stage_first<const FRAC: u32>(
    radix: Radix,
    mode: ScalingMode,
    x: &[ComplexFixed<FRAC>],
    y: &mut [ComplexFixed<FRAC>],
    v: &mut usize,
    bexp: &mut u32,
) -> u32 {
    debug_assert_eq!(*v, 1, "first stage expects no combined sub-transforms");
    run_stage(radix, mode, None, 1, x, y, v, bexp)
}

/// Inner stage: rotates by `tw` (laid out by `fill_stage_twiddles` for a
/// sub-size of `v * tw_step`) and leaves more stages to run.
#[allow(clippy::too_many_arguments)]
pub fn stage_inner<const FRAC: u32>(
    radix: Radix,
    mode: ScalingMode,
    tw: &[Twiddle],
    tw_step: usize,
    x: &[ComplexFixed<FRAC>],
    y: &mut [ComplexFixed<FRAC>],
    v: &mut usize,
    bexp: &mut u32,
) -> u32 {
    debug_assert!(*v > 1 && *v * radix.size() < x.len());
    run_stage(radix, mode, Some(tw), tw_step, x, y, v, bexp)
}

/// Last stage: completes the transform (`v * r == n`). With dynamic scaling
/// `bexp` ends up as the block exponent of the finished spectrum.
#[allow(clippy::too_many_arguments)]
pub fn stage_last<const FRAC: u32>(
    radix: Radix,
    mode: ScalingMode,
    tw: &[Twiddle],
    tw_step: usize,
    x: &[ComplexFixed<FRAC>],
    y: &mut [ComplexFixed<FRAC>],
    v: &mut usize,
    bexp: &mut u32,
) -> u32 {
    debug_assert_eq!(*v * radix.size(), x.len(), "last stage must complete the transform");
    run_stage(radix, mode, Some(tw), tw_step, x, y, v, bexp)
}

#[allow(clippy::too_many_arguments)]
fn run_stage<const FRAC: u32>(
    radix: Radix,
    mode: ScalingMode,
    tw: Option<&[Twiddle]>,
    tw_step: usize,
    x: &[ComplexFixed<FRAC>],
    y: &mut [ComplexFixed<FRAC>],
    v: &mut usize,
    bexp: &mut u32,
) -> u32 {
    let n = x.len();
    let r = radix.size();
    let v0 = *v;
    debug_assert_eq!(y.len(), n);
    debug_assert!(v0 > 0 && n % (v0 * r) == 0);

    let shift = stage_shift(radix, mode, *bexp);
    let cfg = RoundingConfig::split(shift);
    let s = n / (v0 * r);

    let mut legs = [Wide::new(0, 0); MAX_RADIX];
    let mut out = [Wide::new(0, 0); MAX_RADIX];
    let mut min_nsa = 31;

    for p in 0..v0 {
        let row = p * tw_step * (r - 1);
        for q in 0..s {
            for (k, leg) in legs[..r].iter_mut().enumerate() {
                let a = x[q + s * (r * p + k)];
                *leg = match tw {
                    // Row p = 0 is all ones, skip the rounding it would add.
                    Some(t) if k > 0 && p > 0 => a.mul_twiddle_wide(t[row + k - 1], 0),
                    _ => a.widen(),
                };
            }

            radix.butterfly(&legs, &mut out, cfg);

            for (k, &o) in out[..r].iter().enumerate() {
                let c = ComplexFixed::saturating_from_wide(o);
                min_nsa = min_nsa.min(c.nsa());
                y[q + s * (p + k * v0)] = c;
            }
        }
    }

    *v = v0 * r;
    if mode == ScalingMode::Dynamic {
        *bexp = min_nsa;
    }
    shift
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
