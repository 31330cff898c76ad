// src/fixed/fir.rs

//! Streaming multirate FIR filters over a caller-owned circular delay line,
//! and block circular convolution/correlation.
//!
//! Coefficients are Q31, samples any `Fixed<FRAC>`. Each output is one
//! 128-bit dot product rounded by 31 bits and saturated, so outputs keep
//! the sample format.
//!
//! The streaming kernels follow the hand-off convention of the delay line:
//! they take the current write index and return the next one. The
//! [`FirDecimator`] and [`FirInterpolator`] structs keep that state for you.

use super::types::Fixed;
use crate::common::DspError;
use log::trace;

/// Ring buffer view over a caller slice. `wr_ix` is where the next sample
/// goes; the newest sample sits just before it.
pub struct DelayLine<'a, T> {
    buf: &'a mut [T],
    wr_ix: usize,
}

impl<'a, T: Copy + Default> DelayLine<'a, T> {
    pub fn new(buf: &'a mut [T], wr_ix: usize) -> Self {
        debug_assert!(!buf.is_empty());
        let wr_ix = wr_ix % buf.len();
        Self { buf, wr_ix }
    }

    #[inline]
    pub fn push(&mut self, x: T) {
        self.buf[self.wr_ix] = x;
        self.wr_ix += 1;
        if self.wr_ix == self.buf.len() {
            self.wr_ix = 0;
        }
    }

    /// The `k`-th most recent sample, `k = 0` being the newest.
    #[inline]
    pub fn tap(&self, k: usize) -> T {
        let len = self.buf.len();
        debug_assert!(k < len);
        self.buf[(self.wr_ix + len - 1 - k) % len]
    }

    pub fn wr_ix(&self) -> usize {
        self.wr_ix
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.fill(T::default());
        self.wr_ix = 0;
    }
}

/// `sum h[k*stride + phase] * tap(k)` over the taps of one polyphase branch.
#[inline]
fn polyphase_dot<const FRAC: u32>(
    line: &DelayLine<'_, Fixed<FRAC>>,
    h: &[Fixed<31>],
    phase: usize,
    stride: usize,
) -> Fixed<FRAC> {
    let acc: i128 = h[phase..]
        .iter()
        .step_by(stride)
        .enumerate()
        .map(|(k, c)| c.to_bits() as i128 * line.tap(k).to_bits() as i128)
        .sum();
    round_q31(acc)
}

#[inline]
fn round_q31<const FRAC: u32>(acc: i128) -> Fixed<FRAC> {
    let rounded = (acc + (1 << 30)) >> 31;
    Fixed::from_bits(rounded.clamp(i32::MIN as i128, i32::MAX as i128) as i32)
}

/// Decimating FIR: `y[j] = sum_k h[k] * x[(j+1)*factor - 1 - k]`.
///
/// Each output is computed once `factor` new samples are in the delay line.
/// `x.len()` must be a multiple of `factor` and `y` holds `x.len() / factor`
/// outputs. The delay line needs at least `h.len()` entries. Returns the new
/// write index.
pub fn fir_decimate<const FRAC: u32>(
    y: &mut [Fixed<FRAC>],
    delay: &mut [Fixed<FRAC>],
    x: &[Fixed<FRAC>],
    h: &[Fixed<31>],
    wr_ix: usize,
    factor: usize,
) -> usize {
    debug_assert!(factor > 0 && x.len() % factor == 0);
    debug_assert_eq!(y.len(), x.len() / factor);
    debug_assert!(delay.len() >= h.len());

    let mut line = DelayLine::new(delay, wr_ix);
    for (i, &sample) in x.iter().enumerate() {
        line.push(sample);
        if (i + 1) % factor == 0 {
            y[i / factor] = polyphase_dot(&line, h, 0, 1);
        }
    }
    line.wr_ix()
}

/// Interpolating FIR: `y[n*factor + p] = sum_k h[k*factor + p] * x[n - k]`.
///
/// `h.len()` must be a multiple of `factor`; `y` holds `x.len() * factor`
/// outputs. The delay line needs at least `h.len() / factor` entries.
/// Returns the new write index.
pub fn fir_interpolate<const FRAC: u32>(
    y: &mut [Fixed<FRAC>],
    delay: &mut [Fixed<FRAC>],
    x: &[Fixed<FRAC>],
    h: &[Fixed<31>],
    wr_ix: usize,
    factor: usize,
) -> usize {
    debug_assert!(factor > 0 && h.len() % factor == 0);
    debug_assert_eq!(y.len(), x.len() * factor);
    debug_assert!(delay.len() >= h.len() / factor);

    let mut line = DelayLine::new(delay, wr_ix);
    for (n, &sample) in x.iter().enumerate() {
        line.push(sample);
        for (p, out) in y[n * factor..(n + 1) * factor].iter_mut().enumerate() {
            *out = polyphase_dot(&line, h, p, factor);
        }
    }
    line.wr_ix()
}

/// Decimator that owns its delay-line state between blocks.
pub struct FirDecimator<'a, const FRAC: u32> {
    h: &'a [Fixed<31>],
    delay: &'a mut [Fixed<FRAC>],
    wr_ix: usize,
    factor: usize,
}

impl<'a, const FRAC: u32> FirDecimator<'a, FRAC> {
    pub fn new(h: &'a [Fixed<31>], delay: &'a mut [Fixed<FRAC>], factor: usize) -> Result<Self, DspError> {
        if factor == 0 || h.is_empty() {
            return Err(DspError::InvalidFactor);
        }
        if delay.len() < h.len() {
            return Err(DspError::BufferTooSmall);
        }
        delay.fill(Fixed::ZERO);
        trace!("fir decimator: taps={}, factor={}, delay={}", h.len(), factor, delay.len());
        Ok(Self { h, delay, wr_ix: 0, factor })
    }

    /// Filters one block; `y.len()` must be `x.len() / factor`.
    pub fn process(&mut self, x: &[Fixed<FRAC>], y: &mut [Fixed<FRAC>]) -> Result<(), DspError> {
        if x.len() % self.factor != 0 || y.len() != x.len() / self.factor {
            return Err(DspError::SizeMismatch);
        }
        self.wr_ix = fir_decimate(y, self.delay, x, self.h, self.wr_ix, self.factor);
        Ok(())
    }

    pub fn reset(&mut self) {
        DelayLine::new(&mut *self.delay, 0).clear();
        self.wr_ix = 0;
    }
}

/// Interpolator that owns its delay-line state between blocks.
pub struct FirInterpolator<'a, const FRAC: u32> {
    h: &'a [Fixed<31>],
    delay: &'a mut [Fixed<FRAC>],
    wr_ix: usize,
    factor: usize,
}

impl<'a, const FRAC: u32> FirInterpolator<'a, FRAC> {
    pub fn new(h: &'a [Fixed<31>], delay: &'a mut [Fixed<FRAC>], factor: usize) -> Result<Self, DspError> {
        if factor == 0 || h.is_empty() || h.len() % factor != 0 {
            return Err(DspError::InvalidFactor);
        }
        if delay.len() < h.len() / factor {
            return Err(DspError::BufferTooSmall);
        }
        delay.fill(Fixed::ZERO);
        trace!("fir interpolator: taps={}, factor={}, delay={}", h.len(), factor, delay.len());
        Ok(Self { h, delay, wr_ix: 0, factor })
    }

    /// Filters one block; `y.len()` must be `x.len() * factor`.
    pub fn process(&mut self, x: &[Fixed<FRAC>], y: &mut [Fixed<FRAC>]) -> Result<(), DspError> {
        if y.len() != x.len() * self.factor {
            return Err(DspError::SizeMismatch);
        }
        self.wr_ix = fir_interpolate(y, self.delay, x, self.h, self.wr_ix, self.factor);
        Ok(())
    }

    pub fn reset(&mut self) {
        DelayLine::new(&mut *self.delay, 0).clear();
        self.wr_ix = 0;
    }
}

/// `r[n] = sum_m x_pad[n + m] * y[m]` for every `n` in `r`.
/// `x_pad` needs `r.len() + y.len() - 1` samples.
pub fn raw_corr(r: &mut [Fixed<31>], x_pad: &[Fixed<31>], y: &[Fixed<31>]) {
    debug_assert!(!y.is_empty() && x_pad.len() + 1 >= r.len() + y.len());
    for (n, out) in r.iter_mut().enumerate() {
        let acc: i128 = x_pad[n..n + y.len()]
            .iter()
            .zip(y)
            .map(|(a, b)| a.to_bits() as i128 * b.to_bits() as i128)
            .sum();
        *out = round_q31(acc);
    }
}

/// Scratch entries [`fir_xcorr`] and [`fir_convolve`] need.
pub const fn circular_scratch_len(n: usize, m: usize) -> usize {
    n + 2 * m - 1
}

/// Circular cross-correlation `r[n] = sum_m x[(n + m) mod N] * y[m]`, `N = x.len()`.
pub fn fir_xcorr(r: &mut [Fixed<31>], x: &[Fixed<31>], y: &[Fixed<31>], scratch: &mut [Fixed<31>]) {
    let (n, m) = (x.len(), y.len());
    debug_assert!(n > 0 && m > 0 && r.len() == n);
    debug_assert!(scratch.len() >= circular_scratch_len(n, m));

    let x_pad = &mut scratch[..n + m - 1];
    for (j, v) in x_pad.iter_mut().enumerate() {
        *v = x[j % n];
    }
    raw_corr(r, x_pad, y);
}

/// Circular convolution `r[n] = sum_m x[(n - m) mod N] * y[m]`, `N = x.len()`.
pub fn fir_convolve(r: &mut [Fixed<31>], x: &[Fixed<31>], y: &[Fixed<31>], scratch: &mut [Fixed<31>]) {
    let (n, m) = (x.len(), y.len());
    debug_assert!(n > 0 && m > 0 && r.len() == n);
    debug_assert!(scratch.len() >= circular_scratch_len(n, m));

    // Correlate against reversed y, starting M-1 samples back.
    let (x_pad, rest) = scratch.split_at_mut(n + m - 1);
    let y_rev = &mut rest[..m];
    let back = (m - 1) % n;
    for (j, v) in x_pad.iter_mut().enumerate() {
        *v = x[(j + n - back) % n];
    }
    for (k, v) in y_rev.iter_mut().enumerate() {
        *v = y[m - 1 - k];
    }
    raw_corr(r, x_pad, y_rev);
}

#[cfg(test)]
#[path = "fir_tests.rs"]
mod tests;
