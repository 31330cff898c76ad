/// A number split into a normalized mantissa and a power-of-two exponent,
/// `value = mantissa * 2^-(bits-1) * 2^exponent`.
///
/// Results that do not fit a single fixed-point word (reciprocals, quotients,
/// the Cholesky diagonal) travel in this form and the exponent is applied
/// only by the consumer's final shift. A mantissa is never meaningful
/// without its exponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct MantExp<T> {
    pub mantissa: T,
    pub exponent: i32,
}

impl MantExp<i32> {
    /// Reconstructs the value from a Q31 mantissa.
    pub fn to_f64(self) -> f64 {
        libm::ldexp(self.mantissa as f64 / (1u64 << 31) as f64, self.exponent)
    }
}

impl MantExp<i16> {
    /// Reconstructs the value from a Q15 mantissa.
    pub fn to_f64(self) -> f64 {
        libm::ldexp(self.mantissa as f64 / (1u32 << 15) as f64, self.exponent)
    }
}
