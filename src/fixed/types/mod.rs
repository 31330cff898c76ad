mod fixed;
mod fixed_complex;
mod mant_exp;

pub use fixed::{Fixed, nsa32};
pub use fixed_complex::{ComplexFixed, Wide};
pub use mant_exp::MantExp;
