pub mod types;
pub mod scaling;
pub mod butterfly;
pub mod twiddle;
pub mod stage;
pub mod complex;
pub mod mdct;
pub mod cholesky;
pub mod fir;
pub mod math;

pub use butterfly::Radix;
pub use cholesky::{CholeskyDims, CholeskySample};
pub use complex::CplxFft;
pub use fir::{DelayLine, FirDecimator, FirInterpolator};
pub use mdct::{Dct4, Mdct};
pub use scaling::{RoundingConfig, ScalingMode};
pub use types::{ComplexFixed, Fixed, MantExp};
