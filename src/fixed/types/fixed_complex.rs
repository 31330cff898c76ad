use super::fixed::Fixed;
use core::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use num_complex::Complex;

/// Wide complex value used between the load and the final saturating store
/// of a kernel. Never rounded except where a kernel says so.
pub type Wide = Complex<i64>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(C)]
pub struct ComplexFixed<const FRAC: u32> {
    pub re: Fixed<FRAC>,
    pub im: Fixed<FRAC>,
}

impl<const FRAC: u32> ComplexFixed<FRAC> {
    pub const ZERO: Self = Self { re: Fixed::ZERO, im: Fixed::ZERO };

    pub const fn new(re: Fixed<FRAC>, im: Fixed<FRAC>) -> Self {
        Self { re, im }
    }

    #[inline]
    pub const fn from_bits(re: i32, im: i32) -> Self {
        Self { re: Fixed::from_bits(re), im: Fixed::from_bits(im) }
    }

    pub fn from_f64(re: f64, im: f64) -> Self {
        Self::new(Fixed::from_f64(re), Fixed::from_f64(im))
    }

    /// Returns the complex conjugate (a - bi)
    #[inline]
    pub fn conj(self) -> Self {
        ComplexFixed {
            re: self.re,
            im: -self.im,
        }
    }

    /// Smallest NSA of the two components.
    #[inline]
    pub fn nsa(self) -> u32 {
        self.re.nsa().min(self.im.nsa())
    }

    #[inline]
    pub fn widen(self) -> Wide {
        Wide::new(self.re.to_bits() as i64, self.im.to_bits() as i64)
    }

    #[inline]
    pub fn saturating_from_wide(w: Wide) -> Self {
        Self {
            re: Fixed::saturating_from_wide(w.re),
            im: Fixed::saturating_from_wide(w.im),
        }
    }

    /// Exact product with a Q31 twiddle, rounded once by `31 + rsh` bits.
    /// The result stays wide, so a full-scale rotation cannot wrap.
    #[inline]
    pub fn mul_twiddle_wide(self, w: ComplexFixed<31>, rsh: u32) -> Wide {
        let (ar, ai) = (self.re.to_bits() as i128, self.im.to_bits() as i128);
        let (wr, wi) = (w.re.to_bits() as i128, w.im.to_bits() as i128);
        let re = ar * wr - ai * wi;
        let im = ar * wi + ai * wr;
        let s = 31 + rsh;
        let round = 1i128 << (s - 1);
        Wide::new(((re + round) >> s) as i64, ((im + round) >> s) as i64)
    }
}

// Addition: ComplexFixed<F1> + ComplexFixed<F2> -> ComplexFixed<F1>
impl<const F1: u32, const F2: u32> Add<ComplexFixed<F2>> for ComplexFixed<F1> {
    type Output = ComplexFixed<F1>;

    #[inline]
    fn add(self, rhs: ComplexFixed<F2>) -> Self::Output {
        ComplexFixed {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl<const F1: u32, const F2: u32> AddAssign<ComplexFixed<F2>> for ComplexFixed<F1> {
    #[inline]
    fn add_assign(&mut self, rhs: ComplexFixed<F2>) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

// Subtraction: ComplexFixed<F1> - ComplexFixed<F2> -> ComplexFixed<F1>
impl<const F1: u32, const F2: u32> Sub<ComplexFixed<F2>> for ComplexFixed<F1> {
    type Output = ComplexFixed<F1>;

    #[inline]
    fn sub(self, rhs: ComplexFixed<F2>) -> Self::Output {
        ComplexFixed {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl<const F1: u32, const F2: u32> SubAssign<ComplexFixed<F2>> for ComplexFixed<F1> {
    #[inline]
    fn sub_assign(&mut self, rhs: ComplexFixed<F2>) {
        self.re -= rhs.re;
        self.im -= rhs.im;
    }
}

// Multiplication: ComplexFixed<F1> * ComplexFixed<F2> -> ComplexFixed<F1>
// Cross terms are summed at full precision and rounded once.
impl<const F1: u32, const F2: u32> Mul<ComplexFixed<F2>> for ComplexFixed<F1> {
    type Output = ComplexFixed<F1>;

    #[inline]
    fn mul(self, rhs: ComplexFixed<F2>) -> Self::Output {
        let (a, b) = (self.re.to_bits() as i128, self.im.to_bits() as i128);
        let (c, d) = (rhs.re.to_bits() as i128, rhs.im.to_bits() as i128);
        let round = if F2 > 0 { 1i128 << (F2 - 1) } else { 0 };
        // (ac - bd)
        let re = (a * c - b * d + round) >> F2;
        // (ad + bc)
        let im = (a * d + b * c + round) >> F2;

        ComplexFixed::from_bits(re as i32, im as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addition_mixed_precision() {
        // (1 + 2i) [Q16] + (0.5 + 0.5i) [Q31] = (1.5 + 2.5i) [Q16]
        let a = ComplexFixed::new(Fixed::<16>::from_int(1), Fixed::<16>::from_int(2));
        let b = ComplexFixed::<31>::from_bits(1 << 30, 1 << 30);

        let result = a + b;

        assert_eq!(result.re, Fixed::<16>::from_f64(1.5));
        assert_eq!(result.im, Fixed::<16>::from_f64(2.5));
    }

    #[test]
    fn test_multiplication_same_precision() {
        // (1 + 2i) * (3 + 4i) = -5 + 10i
        let a = ComplexFixed::new(Fixed::<16>::from_int(1), Fixed::<16>::from_int(2));
        let b = ComplexFixed::new(Fixed::<16>::from_int(3), Fixed::<16>::from_int(4));

        let result = a * b;

        assert_eq!(result.re, Fixed::<16>::from_int(-5));
        assert_eq!(result.im, Fixed::<16>::from_int(10));
    }

    #[test]
    fn test_conj_saturates_min() {
        let a = ComplexFixed::<31>::from_bits(5, i32::MIN);
        assert_eq!(a.conj(), ComplexFixed::from_bits(5, i32::MAX));
    }

    #[test]
    fn test_nsa_takes_smaller_component() {
        let a = ComplexFixed::<31>::from_bits(1 << 10, -(1 << 25));
        assert_eq!(a.nsa(), 6);
    }

    #[test]
    fn test_mul_twiddle_wide_does_not_wrap() {
        // Full-scale (1 + i) rotated by exp(-i*pi/4) has magnitude sqrt(2) on one axis.
        let a = ComplexFixed::<31>::from_bits(i32::MAX, i32::MAX);
        let h = core::f64::consts::FRAC_1_SQRT_2;
        let w = ComplexFixed::<31>::from_f64(h, -h);
        let r = a.mul_twiddle_wide(w, 0);
        assert!(r.re > i32::MAX as i64);
        assert!(r.im.abs() < 4);

        let sat = ComplexFixed::<31>::saturating_from_wide(r);
        assert_eq!(sat.re.to_bits(), i32::MAX);
    }

    #[test]
    fn test_mul_twiddle_wide_with_shift() {
        let a = ComplexFixed::<31>::from_bits(1 << 20, 0);
        let one = ComplexFixed::<31>::from_bits(i32::MAX, 0);
        assert_eq!(a.mul_twiddle_wide(one, 2), Wide::new(1 << 18, 0));
    }
}
