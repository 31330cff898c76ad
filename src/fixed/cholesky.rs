// src/fixed/cholesky.rs

//! Regularized least-squares through a Cholesky factorization, for real
//! (`Fixed<31>`) and complex (`ComplexFixed<31>`) Q31 matrices.
//!
//! Solving `(A'A + sigma2*I) x = A'B` takes three steps:
//!
//! 1. [`cholesky_decompose`] builds the packed upper factor `R` with
//!    `R'R = A'A + sigma2*I`, and `D[i] = 1 / R[i][i]` as mantissa/exponent.
//! 2. [`cholesky_forward`] solves `R'y = A'B` (or [`cholesky_forward_z`] when
//!    the cross product `Z = A'B` is already known).
//! 3. [`cholesky_backward`] solves `R x = y`.
//!
//! Every dot product runs in a 128-bit accumulator and is rounded once, when
//! it is multiplied by the reciprocal diagonal and the exponent of `D` is
//! applied in the same final shift.
//!
//! Matrices are row-major: `A` is `M x N`, `B` is `M x P`, `y` and `x` are
//! `N x P`. `R` holds the upper triangle row by row, `N(N+1)/2` entries.
//!
//! A singular system with too small a `sigma2` is not reported: the zero
//! diagonal gets the reciprocal sentinel and the results are meaningless.

use super::math::{isqrt_round, recip32x32};
use super::scaling::{saturate_i32, shift_i128};
use super::types::{ComplexFixed, Fixed, MantExp};
use core::ops::{Add, Sub};
use num_complex::Complex;

/// Element type of the Cholesky kernels.
pub trait CholeskySample: Copy {
    /// Exact accumulator for sums of Q62 products.
    type Acc: Copy + Add<Output = Self::Acc> + Sub<Output = Self::Acc>;

    const ZERO: Self;

    fn acc_zero() -> Self::Acc;
    /// `conj(a) * b`, exact.
    fn conj_mul(a: Self, b: Self) -> Self::Acc;
    /// `a * b`, exact.
    fn mul(a: Self, b: Self) -> Self::Acc;
    /// `a << lsh`, saturating.
    fn widen(a: Self, lsh: u32) -> Self::Acc;
    fn acc_shl(acc: Self::Acc, lsh: u32) -> Self::Acc;
    /// Real part of an accumulator; the diagonal energies are real.
    fn acc_real(acc: Self::Acc) -> i128;
    fn from_real(x: Fixed<31>) -> Self;
    /// `acc * d >> (rsh - d.exponent)` with `d` a Q31 mantissa, rounded once
    /// and saturated.
    fn scale(acc: Self::Acc, d: MantExp<i32>, rsh: i32) -> Self;
}

#[inline]
fn scale_i128(acc: i128, d: MantExp<i32>, rsh: i32) -> i32 {
    saturate_i32(shift_i128(acc.saturating_mul(d.mantissa as i128), rsh - d.exponent))
}

impl CholeskySample for Fixed<31> {
    type Acc = i128;

    const ZERO: Self = Fixed::ZERO;

    #[inline]
    fn acc_zero() -> i128 {
        0
    }

    #[inline]
    fn conj_mul(a: Self, b: Self) -> i128 {
        a.to_bits() as i128 * b.to_bits() as i128
    }

    #[inline]
    fn mul(a: Self, b: Self) -> i128 {
        a.to_bits() as i128 * b.to_bits() as i128
    }

    #[inline]
    fn widen(a: Self, lsh: u32) -> i128 {
        shift_i128(a.to_bits() as i128, -(lsh as i32))
    }

    #[inline]
    fn acc_shl(acc: i128, lsh: u32) -> i128 {
        shift_i128(acc, -(lsh as i32))
    }

    #[inline]
    fn acc_real(acc: i128) -> i128 {
        acc
    }

    #[inline]
    fn from_real(x: Fixed<31>) -> Self {
        x
    }

    #[inline]
    fn scale(acc: i128, d: MantExp<i32>, rsh: i32) -> Self {
        Fixed::from_bits(scale_i128(acc, d, rsh))
    }
}

impl CholeskySample for ComplexFixed<31> {
    type Acc = Complex<i128>;

    const ZERO: Self = ComplexFixed::ZERO;

    #[inline]
    fn acc_zero() -> Complex<i128> {
        Complex::new(0, 0)
    }

    #[inline]
    fn conj_mul(a: Self, b: Self) -> Complex<i128> {
        let (ar, ai) = (a.re.to_bits() as i128, a.im.to_bits() as i128);
        let (br, bi) = (b.re.to_bits() as i128, b.im.to_bits() as i128);
        Complex::new(ar * br + ai * bi, ar * bi - ai * br)
    }

    #[inline]
    fn mul(a: Self, b: Self) -> Complex<i128> {
        let (ar, ai) = (a.re.to_bits() as i128, a.im.to_bits() as i128);
        let (br, bi) = (b.re.to_bits() as i128, b.im.to_bits() as i128);
        Complex::new(ar * br - ai * bi, ar * bi + ai * br)
    }

    #[inline]
    fn widen(a: Self, lsh: u32) -> Complex<i128> {
        let s = -(lsh as i32);
        Complex::new(
            shift_i128(a.re.to_bits() as i128, s),
            shift_i128(a.im.to_bits() as i128, s),
        )
    }

    #[inline]
    fn acc_shl(acc: Complex<i128>, lsh: u32) -> Complex<i128> {
        let s = -(lsh as i32);
        Complex::new(shift_i128(acc.re, s), shift_i128(acc.im, s))
    }

    #[inline]
    fn acc_real(acc: Complex<i128>) -> i128 {
        acc.re
    }

    #[inline]
    fn from_real(x: Fixed<31>) -> Self {
        ComplexFixed::new(x, Fixed::ZERO)
    }

    #[inline]
    fn scale(acc: Complex<i128>, d: MantExp<i32>, rsh: i32) -> Self {
        ComplexFixed::from_bits(scale_i128(acc.re, d, rsh), scale_i128(acc.im, d, rsh))
    }
}

/// Problem dimensions: `A` is `m x n`, `B` has `p` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CholeskyDims {
    pub m: usize,
    pub n: usize,
    pub p: usize,
}

impl CholeskyDims {
    pub const fn new(m: usize, n: usize, p: usize) -> Self {
        Self { m, n, p }
    }

    /// Packed length of `R`.
    pub const fn r_len(&self) -> usize {
        self.n * (self.n + 1) / 2
    }
}

/// Index of `R[i][j]`, `i <= j`, in the packed upper triangle.
#[inline]
pub const fn packed_index(n: usize, i: usize, j: usize) -> usize {
    i * (2 * n - i + 1) / 2 + (j - i)
}

/// Factors `A'A + sigma2*I` (`sigma2` in Q31) into `R'R`.
///
/// `R` is Q31, so the columns of `A` must have a norm below one.
pub fn cholesky_decompose<T: CholeskySample>(
    r: &mut [T],
    d: &mut [MantExp<i32>],
    a: &[T],
    dims: CholeskyDims,
    sigma2: Fixed<31>,
) {
    let (m, n) = (dims.m, dims.n);
    debug_assert!(a.len() >= m * n);
    debug_assert!(r.len() >= dims.r_len() && d.len() >= n);

    for j in 0..n {
        for i in 0..j {
            let mut acc = gram(a, m, n, i, j);
            for k in 0..i {
                acc = acc - T::conj_mul(r[packed_index(n, k, i)], r[packed_index(n, k, j)]);
            }
            r[packed_index(n, i, j)] = T::scale(acc, d[i], 62);
        }

        let mut acc = gram(a, m, n, j, j) + T::widen(T::from_real(sigma2), 31);
        for k in 0..j {
            let rkj = r[packed_index(n, k, j)];
            acc = acc - T::conj_mul(rkj, rkj);
        }
        // Q62 energy, Q31 root.
        let energy = T::acc_real(acc).max(0) as u128;
        let diag = Fixed::from_bits(isqrt_round(energy).min(i32::MAX as u128) as i32);
        r[packed_index(n, j, j)] = T::from_real(diag);
        d[j] = recip32x32(diag);
    }
}

/// `(A'A)[i][j]` in Q62.
#[inline]
fn gram<T: CholeskySample>(a: &[T], m: usize, n: usize, i: usize, j: usize) -> T::Acc {
    (0..m).fold(T::acc_zero(), |acc, row| acc + T::conj_mul(a[row * n + i], a[row * n + j]))
}

/// Solves `R'y = A'B`. `y` comes out in `Q(31 + q_ybra)`.
#[allow(clippy::too_many_arguments)]
pub fn cholesky_forward<T: CholeskySample>(
    y: &mut [T],
    r: &[T],
    d: &[MantExp<i32>],
    a: &[T],
    b: &[T],
    dims: CholeskyDims,
    q_ybra: i32,
) {
    let (m, n, p) = (dims.m, dims.n, dims.p);
    debug_assert!(a.len() >= m * n && b.len() >= m * p);
    // Q62 cross products.
    forward_core(y, r, d, dims, q_ybra, |i, col| {
        (0..m).fold(T::acc_zero(), |acc, row| acc + T::conj_mul(a[row * n + i], b[row * p + col]))
    });
}

/// Solves `R'y = Z` for a precomputed Q31 cross product `Z` (`N x P`).
/// `y` comes out in `Q(31 + q_yz)`.
pub fn cholesky_forward_z<T: CholeskySample>(
    y: &mut [T],
    r: &[T],
    d: &[MantExp<i32>],
    z: &[T],
    dims: CholeskyDims,
    q_yz: i32,
) {
    let p = dims.p;
    debug_assert!(z.len() >= dims.n * p);
    forward_core(y, r, d, dims, q_yz, |i, col| T::widen(z[i * p + col], 31));
}

/// Forward recursion over a Q62 right-hand side.
///
/// The accumulator holds `Q(62 + max(0, q))`: the right-hand side is raised
/// by `max(0, q)` and the `R'y` products, natively `Q(62 + q)`, by `max(0, -q)`.
fn forward_core<T, F>(y: &mut [T], r: &[T], d: &[MantExp<i32>], dims: CholeskyDims, q: i32, rhs: F)
where
    T: CholeskySample,
    F: Fn(usize, usize) -> T::Acc,
{
    let (n, p) = (dims.n, dims.p);
    debug_assert!(y.len() >= n * p && r.len() >= dims.r_len() && d.len() >= n);

    let rhs_lsh = q.max(0) as u32;
    let prod_lsh = (-q).max(0) as u32;
    let rsh = 62 + q.max(0) + 31 - (31 + q);

    for col in 0..p {
        for i in 0..n {
            let mut acc = T::acc_shl(rhs(i, col), rhs_lsh);
            for k in 0..i {
                let ry = T::conj_mul(r[packed_index(n, k, i)], y[k * p + col]);
                acc = acc - T::acc_shl(ry, prod_lsh);
            }
            y[i * p + col] = T::scale(acc, d[i], rsh);
        }
    }
}

/// Solves `R x = y`, from the last row up. With `y` in `Qy`, `x` comes out
/// in `Q(Qy + q_xyr)`.
pub fn cholesky_backward<T: CholeskySample>(
    x: &mut [T],
    r: &[T],
    d: &[MantExp<i32>],
    y: &[T],
    dims: CholeskyDims,
    q_xyr: i32,
) {
    let (n, p) = (dims.n, dims.p);
    debug_assert!(x.len() >= n * p && y.len() >= n * p);
    debug_assert!(r.len() >= dims.r_len() && d.len() >= n);

    // Accumulator in Q(Qy + 31 + max(0, q)).
    let y_lsh = 31 + q_xyr.max(0) as u32;
    let prod_lsh = (-q_xyr).max(0) as u32;
    let rsh = 31 + q_xyr.max(0) - q_xyr + 31;

    for col in 0..p {
        for k in (0..n).rev() {
            let mut acc = T::widen(y[k * p + col], y_lsh);
            for j in k + 1..n {
                let rx = T::mul(r[packed_index(n, k, j)], x[j * p + col]);
                acc = acc - T::acc_shl(rx, prod_lsh);
            }
            x[k * p + col] = T::scale(acc, d[k], rsh);
        }
    }
}

#[cfg(test)]
#[path = "cholesky_tests.rs"]
mod tests;
