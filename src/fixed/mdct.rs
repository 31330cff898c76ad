// src/fixed/mdct.rs

//! DCT-IV through a half-length complex FFT, and the MDCT/IMDCT pair built
//! on top of it by time-domain aliasing folds.
//!
//! All transforms are unnormalized. Each returns the right-shift it applied;
//! the output times `2^shift` is the exact transform of the input.

use super::complex::CplxFft;
use super::scaling::{ScalingMode, round_shift};
use super::twiddle::{Twiddle, twiddle};
use super::types::{ComplexFixed, Fixed};
use crate::common::DspError;
use log::debug;

/// Shift of the MDCT fold, which adds pairs of samples.
const FOLD_SHIFT: u32 = 1;

/// `X[k] = sum u[n] cos(pi/N (n + 1/2)(k + 1/2))` for even `N`.
///
/// Pairs `u[2n] + i*u[N-1-2n]` are rotated by `exp(-i*pi*(4n+1)/(4N))`, sent
/// through an `N/2`-point FFT, and rotated again by `exp(-i*pi*k/N)`. The real
/// parts give the even bins, the negated imaginary parts the odd bins from
/// the top. Both rotations shift by one bit.
pub struct Dct4<'a> {
    pre: &'a [Twiddle],
    post: &'a [Twiddle],
    fft: CplxFft<'a>,
    n: usize,
}

impl<'a> Dct4<'a> {
    pub fn new(tables: &'a mut [Twiddle], n: usize, mode: ScalingMode) -> Result<Self, DspError> {
        if n < 2 || n % 2 != 0 {
            return Err(DspError::UnsupportedSize);
        }
        let half = n / 2;
        if tables.len() < Self::table_len(n)? {
            return Err(DspError::BufferTooSmall);
        }

        let (pre, rest) = tables.split_at_mut(half);
        let (post, fft_tw) = rest.split_at_mut(half);
        for (m, w) in pre.iter_mut().enumerate() {
            *w = twiddle(4 * m + 1, 8 * n);
        }
        for (k, w) in post.iter_mut().enumerate() {
            *w = twiddle(k, 2 * n);
        }
        let fft = CplxFft::new(fft_tw, half, mode)?;

        debug!("dct4 plan: n={}, inner fft radices={:?}", n, fft.radices());
        Ok(Self { pre, post, fft, n })
    }

    /// Twiddle entries `new` expects for a transform of length `n`.
    pub fn table_len(n: usize) -> Result<usize, DspError> {
        if n < 2 || n % 2 != 0 {
            return Err(DspError::UnsupportedSize);
        }
        Ok(n + CplxFft::twiddle_len(n / 2)?)
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Out-of-place transform. `work` and `scratch` need `n/2` entries each.
    pub fn process<const FRAC: u32>(
        &self,
        input: &[Fixed<FRAC>],
        output: &mut [Fixed<FRAC>],
        work: &mut [ComplexFixed<FRAC>],
        scratch: &mut [ComplexFixed<FRAC>],
    ) -> Result<u32, DspError> {
        if input.len() != self.n {
            return Err(DspError::SizeMismatch);
        }
        if output.len() != self.n {
            return Err(DspError::SizeMismatch);
        }
        output.copy_from_slice(input);
        self.process_in_place(output, work, scratch)
    }

    /// In-place transform; the whole input is consumed before any output is written.
    pub fn process_in_place<const FRAC: u32>(
        &self,
        data: &mut [Fixed<FRAC>],
        work: &mut [ComplexFixed<FRAC>],
        scratch: &mut [ComplexFixed<FRAC>],
    ) -> Result<u32, DspError> {
        let n = self.n;
        let half = n / 2;
        if data.len() != n {
            return Err(DspError::SizeMismatch);
        }
        if work.len() < half || scratch.len() < half {
            return Err(DspError::BufferTooSmall);
        }
        let work = &mut work[..half];

        for (m, z) in work.iter_mut().enumerate() {
            let pair = ComplexFixed::new(data[2 * m], data[n - 1 - 2 * m]);
            *z = ComplexFixed::saturating_from_wide(pair.mul_twiddle_wide(self.pre[m], 1));
        }

        let fft_shift = self.fft.process(work, scratch, false)?;

        for (k, y) in work.iter().enumerate() {
            let r = y.mul_twiddle_wide(self.post[k], 1);
            data[2 * k] = Fixed::saturating_from_wide(r.re);
            data[n - 1 - 2 * k] = Fixed::saturating_from_wide(-r.im);
        }

        Ok(fft_shift + 2)
    }
}

/// MDCT of `2N` samples into `N` coefficients, and the matching IMDCT.
///
/// Windowing and overlap-add stay with the caller. With a Princen-Bradley
/// window applied on both sides, overlap-added IMDCT frames reproduce the
/// signal times `N/2`.
pub struct Mdct<'a> {
    dct: Dct4<'a>,
}

impl<'a> Mdct<'a> {
    /// `n` is the number of coefficients; frames hold `2n` samples. `n` must
    /// be even.
    pub fn new(tables: &'a mut [Twiddle], n: usize, mode: ScalingMode) -> Result<Self, DspError> {
        Ok(Self { dct: Dct4::new(tables, n, mode)? })
    }

    pub fn table_len(n: usize) -> Result<usize, DspError> {
        Dct4::table_len(n)
    }

    /// Number of coefficients per frame.
    pub fn len(&self) -> usize {
        self.dct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dct.is_empty()
    }

    /// `2N` samples in, `N` coefficients out. `work`/`scratch` need `N/2` entries.
    pub fn forward<const FRAC: u32>(
        &self,
        input: &[Fixed<FRAC>],
        output: &mut [Fixed<FRAC>],
        work: &mut [ComplexFixed<FRAC>],
        scratch: &mut [ComplexFixed<FRAC>],
    ) -> Result<u32, DspError> {
        let n = self.len();
        if input.len() != 2 * n || output.len() != n {
            return Err(DspError::SizeMismatch);
        }
        let half = n / 2;
        let edge = 3 * half;

        // (a, b, c, d) -> (-c_r - d, a - b_r)
        for i in 0..half {
            output[i] = fold(-wide(input[edge - 1 - i]), -wide(input[edge + i]));
        }
        for i in half..n {
            output[i] = fold(wide(input[i - half]), -wide(input[edge - 1 - i]));
        }

        Ok(FOLD_SHIFT + self.dct.process_in_place(output, work, scratch)?)
    }

    /// `N` coefficients in, `2N` aliased samples out. `work`/`scratch` need `N/2` entries.
    pub fn inverse<const FRAC: u32>(
        &self,
        input: &[Fixed<FRAC>],
        output: &mut [Fixed<FRAC>],
        work: &mut [ComplexFixed<FRAC>],
        scratch: &mut [ComplexFixed<FRAC>],
    ) -> Result<u32, DspError> {
        let n = self.len();
        if input.len() != n || output.len() != 2 * n {
            return Err(DspError::SizeMismatch);
        }
        let half = n / 2;

        // w = (w1, w2) lands in the upper half.
        let shift = self.dct.process(input, &mut output[n..], work, scratch)?;

        // y = (w2, -w2_r, -w1_r, -w1)
        for j in 0..half {
            let w2 = output[n + half + j];
            output[j] = w2;
            output[n - 1 - j] = -w2;
        }
        for j in 0..half {
            output[n + half + j] = -output[n + j];
        }
        for j in 0..half {
            output[n + j] = output[2 * n - 1 - j];
        }

        Ok(shift)
    }
}

#[inline]
fn wide<const FRAC: u32>(x: Fixed<FRAC>) -> i64 {
    x.to_bits() as i64
}

#[inline]
fn fold<const FRAC: u32>(a: i64, b: i64) -> Fixed<FRAC> {
    Fixed::saturating_from_wide(round_shift(a + b, FOLD_SHIFT))
}

#[cfg(test)]
#[path = "mdct_tests.rs"]
mod tests;
