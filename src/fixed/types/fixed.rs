// src/fixed/types/fixed.rs
use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Generic fixed-point structure based on the number of fractional bits (FRAC).
/// The internal value is stored as a signed 32-bit integer.
///
/// Addition and subtraction saturate at the i32 limits, multiplication
/// rounds to nearest and wraps, as the hardware kernels do.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[repr(transparent)]
pub struct Fixed<const FRAC: u32>(i32);

impl<const FRAC: u32> Fixed<FRAC> {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);

    /// Creates a Fixed from the raw integer value (without shift).
    #[inline]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// Creates a Fixed from an integer, applying the necessary shift.
    /// E.g.: Fixed::<8>::from_int(1) will result in internal value 256.
    #[inline]
    pub fn from_int(value: i32) -> Self {
        Self(value << FRAC)
    }

    /// Converts an f64 to Fixed, applying correct rounding.
    /// Out-of-range values saturate, so `Fixed::<31>::from_f64(1.0)` is `0x7fffffff`.
    pub fn from_f64(value: f64) -> Self {
        let scaling_factor = (1u64 << FRAC) as f64;
        let bits = libm::round(value * scaling_factor) as i32;
        Self::from_bits(bits)
    }

    /// Returns the stored raw value.
    #[inline]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Real value represented by this number.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1u64 << FRAC) as f64
    }

    /// Saturates a wide raw value into the i32 storage.
    #[inline]
    pub fn saturating_from_wide(bits: i64) -> Self {
        Self(bits.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    /// Number of redundant sign bits (NSA). Zero and -1 both give 31.
    #[inline]
    pub fn nsa(self) -> u32 {
        nsa32(self.0)
    }
}

/// Count of leading bits equal to the sign bit, excluding the sign bit itself.
#[inline]
pub const fn nsa32(x: i32) -> u32 {
    (x ^ (x >> 31)).leading_zeros() - 1
}

impl<const FRAC: u32> Fixed<FRAC> {
    #[inline]
    pub fn convert<const TO_FRAC: u32>(self) -> Fixed<TO_FRAC> {
        if TO_FRAC > FRAC {
            Fixed::from_bits(self.0 << (TO_FRAC - FRAC))
        } else {
            Fixed::from_bits(self.0 >> (FRAC - TO_FRAC))
        }
    }
}

impl<const F1: u32, const F2: u32> Add<Fixed<F2>> for Fixed<F1> {
    type Output = Fixed<F1>;

    #[inline]
    fn add(self, rhs: Fixed<F2>) -> Self::Output {
        let rhs_converted: Fixed<F1> = rhs.convert();
        Fixed(self.0.saturating_add(rhs_converted.0))
    }
}

impl<const F1: u32, const F2: u32> AddAssign<Fixed<F2>> for Fixed<F1> {
    #[inline]
    fn add_assign(&mut self, rhs: Fixed<F2>) {
        *self = *self + rhs;
    }
}

impl<const F1: u32, const F2: u32> Sub<Fixed<F2>> for Fixed<F1> {
    type Output = Fixed<F1>;

    #[inline]
    fn sub(self, rhs: Fixed<F2>) -> Self::Output {
        let rhs_converted = rhs.convert::<F1>();
        Fixed(self.0.saturating_sub(rhs_converted.0))
    }
}

impl<const F1: u32, const F2: u32> SubAssign<Fixed<F2>> for Fixed<F1> {
    #[inline]
    fn sub_assign(&mut self, rhs: Fixed<F2>) {
        *self = *self - rhs;
    }
}

impl<const F1: u32, const F2: u32> Mul<Fixed<F2>> for Fixed<F1> {
    type Output = Fixed<F1>;

    #[inline]
    fn mul(self, rhs: Fixed<F2>) -> Self::Output {
        let product = self.0 as i64 * rhs.0 as i64;

        // If F2 > 0, add 2^(F2-1) for rounding
        let rounded = if F2 > 0 {
            let offset = 1i64 << (F2 - 1);
            (product + offset) >> F2
        } else {
            product
        };

        Fixed::from_bits(rounded as i32)
    }
}

impl<const F1: u32, const F2: u32> MulAssign<Fixed<F2>> for Fixed<F1> {
    #[inline]
    fn mul_assign(&mut self, rhs: Fixed<F2>) {
        *self = *self * rhs;
    }
}

impl<const FRAC: u32> Neg for Fixed<FRAC> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl<const FRAC: u32> fmt::Display for Fixed<FRAC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.to_f64())
    }
}

impl<const FRAC: u32> fmt::Debug for Fixed<FRAC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // In Debug, show both the decimal value and the raw value in parentheses
        write!(f, "{:.6} (raw: {})", self.to_f64(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_same_scale() {
        let a = Fixed::<23>::from_int(10);
        let b = Fixed::<23>::from_int(5);
        assert_eq!((a + b).to_bits(), Fixed::<23>::from_int(15).to_bits());
    }

    #[test]
    fn test_sum_saturates() {
        let a = Fixed::<31>::from_bits(i32::MAX - 10);
        let b = Fixed::<31>::from_bits(100);
        assert_eq!(a + b, Fixed::<31>::MAX);
        assert_eq!(Fixed::<31>::MIN - b, Fixed::<31>::MIN);
    }

    #[test]
    fn test_multiplication_with_rounding() {
        // 0.5 (Q31) * 0.5 (Q31) = 0.25
        let a = Fixed::<31>::from_bits(1 << 30);
        let b = Fixed::<31>::from_bits(1 << 30);
        assert_eq!((a * b).to_bits(), 1 << 29);
    }

    #[test]
    fn test_mixed_precision_multiplication() {
        // 2.0 (Q16) * 0.5 (Q31) = 1.0 (Q16)
        let a = Fixed::<16>::from_int(2);
        let b = Fixed::<31>::from_bits(1 << 30);
        assert_eq!(a * b, Fixed::<16>::from_int(1));
    }

    #[test]
    fn test_from_f64_saturates_one_in_q31() {
        assert_eq!(Fixed::<31>::from_f64(1.0).to_bits(), i32::MAX);
        assert_eq!(Fixed::<31>::from_f64(-1.0).to_bits(), i32::MIN);
        assert_eq!(Fixed::<23>::from_f64(0.5).to_bits(), 1 << 22);
    }

    #[test]
    fn test_nsa() {
        assert_eq!(nsa32(0), 31);
        assert_eq!(nsa32(-1), 31);
        assert_eq!(nsa32(1), 30);
        assert_eq!(nsa32(i32::MAX), 0);
        assert_eq!(nsa32(i32::MIN), 0);
        assert_eq!(nsa32(1 << 20), 10);
        assert_eq!(nsa32(-(1 << 20)), 11);
    }

    #[test]
    fn test_debug_display() {
        let val = Fixed::<23>::from_bits(1 << 22);
        assert_eq!(format!("{}", val), "0.500000");
        assert_eq!(format!("{:?}", val), "0.500000 (raw: 4194304)");
    }
}
