use super::butterfly::Radix;
use super::scaling::{ScalingMode, block_exponent};
use super::stage::{stage_first, stage_inner, stage_last};
use super::twiddle::{Twiddle, fill_stage_twiddles, stage_twiddle_len};
use super::types::ComplexFixed;
use crate::common::{DspError, FftProcess};
use log::{debug, trace};

/// Longest radix chain a plan can hold (2^32 points with radix 2).
pub const MAX_STAGES: usize = 32;

/// Complex FFT plan: a radix chain plus its per-stage twiddle tables.
///
/// The twiddle storage is borrowed from the caller, like the scratch buffer
/// passed to [`CplxFft::process`], so the plan never allocates. Twiddles are
/// Q31, which lets one plan process buffers of any fractional precision.
pub struct CplxFft<'a> {
    twiddles: &'a mut [Twiddle],
    radices: [Radix; MAX_STAGES],
    stages: usize,
    n: usize,
    mode: ScalingMode,
}

impl<'a> CplxFft<'a> {
    /// Builds a plan with the default chain for `n`: radix 4 while possible,
    /// one radix 2 for an odd power of two, then radix 3s and 5s.
    pub fn new(twiddles: &'a mut [Twiddle], n: usize, mode: ScalingMode) -> Result<Self, DspError> {
        let (radices, stages) = factor(n)?;
        Self::with_radices(twiddles, n, &radices[..stages], mode)
    }

    /// Builds a plan with an explicit chain. The product of the radices must be `n`.
    pub fn with_radices(
        twiddles: &'a mut [Twiddle],
        n: usize,
        chain: &[Radix],
        mode: ScalingMode,
    ) -> Result<Self, DspError> {
        if chain.len() > MAX_STAGES {
            return Err(DspError::TooManyStages);
        }
        if n == 0 || chain.iter().map(|r| r.size()).product::<usize>() != n {
            return Err(DspError::UnsupportedSize);
        }
        let needed = chain_twiddle_len(chain);
        if twiddles.len() < needed {
            return Err(DspError::BufferTooSmall);
        }

        let mut radices = [Radix::Two; MAX_STAGES];
        radices[..chain.len()].copy_from_slice(chain);
        let mut fft = Self { twiddles, radices, stages: chain.len(), n, mode };
        fft.precompute();

        debug!(
            "fft plan: n={}, mode={:?}, radices={:?}, twiddles={}",
            n,
            mode,
            fft.radices(),
            needed
        );
        Ok(fft)
    }

    /// Twiddle entries the default chain for `n` needs.
    pub fn twiddle_len(n: usize) -> Result<usize, DspError> {
        let (radices, stages) = factor(n)?;
        Ok(chain_twiddle_len(&radices[..stages]))
    }

    /// Fills every stage's table back to back, first stage excluded.
    fn precompute(&mut self) {
        let mut v = 1;
        let mut offset = 0;
        for i in 0..self.stages {
            let radix = self.radices[i];
            if i > 0 {
                fill_stage_twiddles(&mut self.twiddles[offset..], v, radix);
                offset += stage_twiddle_len(v, radix);
            }
            v *= radix.size();
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn radices(&self) -> &[Radix] {
        &self.radices[..self.stages]
    }

    pub fn mode(&self) -> ScalingMode {
        self.mode
    }

    /// Total shift of a static-scaling run; it does not depend on the data.
    pub fn static_shift(&self) -> u32 {
        self.radices().iter().map(|r| r.headroom()).sum()
    }

    /// Executes the FFT in place, using `scratch` as the ping-pong buffer.
    /// Returns the accumulated right-shift.
    pub fn process<const FRAC: u32>(
        &self,
        buffer: &mut [ComplexFixed<FRAC>],
        scratch: &mut [ComplexFixed<FRAC>],
        inverse: bool,
    ) -> Result<u32, DspError> {
        self.process_with_exponent(buffer, scratch, inverse).map(|(shift, _)| shift)
    }

    /// Same as [`process`](Self::process), also returning the block exponent
    /// of the result (minimum NSA over all components).
    pub fn process_with_exponent<const FRAC: u32>(
        &self,
        buffer: &mut [ComplexFixed<FRAC>],
        scratch: &mut [ComplexFixed<FRAC>],
        inverse: bool,
    ) -> Result<(u32, u32), DspError> {
        if buffer.len() != self.n {
            return Err(DspError::SizeMismatch);
        }
        if scratch.len() < self.n {
            return Err(DspError::BufferTooSmall);
        }
        let scratch = &mut scratch[..self.n];

        // The inverse transform is conj(FFT(conj(x))).
        if inverse {
            buffer.iter_mut().for_each(|c| *c = c.conj());
        }

        let mut bexp = block_exponent(buffer);
        let mut v = 1;
        let mut total = 0;
        let mut offset = 0;
        let mut in_buffer = true;

        for (i, &radix) in self.radices().iter().enumerate() {
            let len = if i == 0 { 0 } else { stage_twiddle_len(v, radix) };
            let tw = &self.twiddles[offset..offset + len];
            total += if in_buffer {
                self.run_stage(i, radix, tw, buffer, scratch, &mut v, &mut bexp)
            } else {
                self.run_stage(i, radix, tw, scratch, buffer, &mut v, &mut bexp)
            };
            offset += len;
            in_buffer = !in_buffer;
        }

        if !in_buffer {
            buffer.copy_from_slice(scratch);
        }
        if inverse {
            buffer.iter_mut().for_each(|c| *c = c.conj());
        }
        if self.mode == ScalingMode::Static {
            bexp = block_exponent(buffer);
        }

        trace!("fft n={} inverse={} shift={} bexp={}", self.n, inverse, total, bexp);
        Ok((total, bexp))
    }

    #[allow(clippy::too_many_arguments)]
    fn run_stage<const FRAC: u32>(
        &self,
        index: usize,
        radix: Radix,
        tw: &[Twiddle],
        x: &[ComplexFixed<FRAC>],
        y: &mut [ComplexFixed<FRAC>],
        v: &mut usize,
        bexp: &mut u32,
    ) -> u32 {
        if index == 0 {
            stage_first(radix, self.mode, x, y, v, bexp)
        } else if index + 1 == self.stages {
            stage_last(radix, self.mode, tw, 1, x, y, v, bexp)
        } else {
            stage_inner(radix, self.mode, tw, 1, x, y, v, bexp)
        }
    }
}

// Implement FftProcess for ANY fixed-point precision.
impl<'a, const FRAC: u32> FftProcess<ComplexFixed<FRAC>> for CplxFft<'a> {
    fn process(
        &self,
        buffer: &mut [ComplexFixed<FRAC>],
        scratch: &mut [ComplexFixed<FRAC>],
        inverse: bool,
    ) -> Result<u32, DspError> {
        CplxFft::process(self, buffer, scratch, inverse)
    }
}

fn chain_twiddle_len(chain: &[Radix]) -> usize {
    let mut v = 1;
    let mut len = 0;
    for (i, r) in chain.iter().enumerate() {
        if i > 0 {
            len += stage_twiddle_len(v, *r);
        }
        v *= r.size();
    }
    len
}

fn factor(n: usize) -> Result<([Radix; MAX_STAGES], usize), DspError> {
    if n == 0 {
        return Err(DspError::UnsupportedSize);
    }
    let mut radices = [Radix::Two; MAX_STAGES];
    let mut stages = 0;
    let mut rest = n;
    let mut push = |r: Radix, rest: &mut usize| -> Result<(), DspError> {
        if stages == MAX_STAGES {
            return Err(DspError::TooManyStages);
        }
        radices[stages] = r;
        stages += 1;
        *rest /= r.size();
        Ok(())
    };

    while rest % 4 == 0 {
        push(Radix::Four, &mut rest)?;
    }
    if rest % 2 == 0 {
        push(Radix::Two, &mut rest)?;
    }
    while rest % 3 == 0 {
        push(Radix::Three, &mut rest)?;
    }
    while rest % 5 == 0 {
        push(Radix::Five, &mut rest)?;
    }
    if rest != 1 {
        return Err(DspError::UnsupportedSize);
    }
    Ok((radices, stages))
}

#[cfg(test)]
#[path = "complex_tests.rs"]
mod tests;
