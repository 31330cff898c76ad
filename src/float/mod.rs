pub mod math;

pub use math::{tanf, tanhf, vec_tanf, vec_tanhf};
