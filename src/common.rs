// src/common.rs

use core::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DspError {
    SizeMismatch,
    UnsupportedSize,
    BufferTooSmall,
    InvalidFactor,
    TooManyStages,
}

impl fmt::Display for DspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DspError::SizeMismatch => write!(f, "Data buffer size does not match transform size"),
            DspError::UnsupportedSize => write!(f, "Size cannot be factored into supported radices"),
            DspError::BufferTooSmall => write!(f, "Auxiliary buffers are too small"),
            DspError::InvalidFactor => write!(f, "Invalid decimation/interpolation configuration"),
            DspError::TooManyStages => write!(f, "Radix chain exceeds the maximum stage count"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DspError {}

/// Common interface for transforms that run over a caller buffer with a
/// caller-provided scratch area and report the right-shift they applied.
///
/// The result, multiplied by `2^shift`, is the unscaled transform.
pub trait FftProcess<T> {
    fn process(&self, buffer: &mut [T], scratch: &mut [T], inverse: bool) -> Result<u32, DspError>;
}
