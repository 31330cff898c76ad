// src/float/math.rs

//! Single-precision `tan` and `tanh`, scalar and over slices.
//!
//! With `std` these call the platform `f32` methods; without it they go
//! through `libm`.

/// `tanh` saturates to exactly +-1 beyond this magnitude in f32.
const TANH_SATURATION: f32 = 9.011;

#[inline]
fn tan_raw(x: f32) -> f32 {
    #[cfg(feature = "std")]
    return x.tan();

    #[cfg(not(feature = "std"))]
    return libm::tanf(x);
}

#[inline]
fn tanh_raw(x: f32) -> f32 {
    #[cfg(feature = "std")]
    return x.tanh();

    #[cfg(not(feature = "std"))]
    return libm::tanhf(x);
}

/// Tangent of `x` radians. NaN and infinities give NaN.
pub fn tanf(x: f32) -> f32 {
    if !x.is_finite() {
        return f32::NAN;
    }
    tan_raw(x)
}

/// Hyperbolic tangent. NaN passes through; large magnitudes give +-1.
pub fn tanhf(x: f32) -> f32 {
    if x.is_nan() {
        return x;
    }
    if x > TANH_SATURATION {
        return 1.0;
    }
    if x < -TANH_SATURATION {
        return -1.0;
    }
    tanh_raw(x)
}

pub fn vec_tanf(y: &mut [f32], x: &[f32]) {
    debug_assert_eq!(x.len(), y.len());
    for (out, &v) in y.iter_mut().zip(x) {
        *out = tanf(v);
    }
}

pub fn vec_tanhf(y: &mut [f32], x: &[f32]) {
    debug_assert_eq!(x.len(), y.len());
    for (out, &v) in y.iter_mut().zip(x) {
        *out = tanhf(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    #[test]
    fn test_tan_values() {
        assert_eq!(tanf(0.0), 0.0);
        assert!((tanf(PI / 4.0) - 1.0).abs() < 1e-6);
        assert!((tanf(-PI / 4.0) + 1.0).abs() < 1e-6);
        assert!(tanf(f32::INFINITY).is_nan());
        assert!(tanf(f32::NAN).is_nan());
    }

    #[test]
    fn test_tanh_values() {
        assert_eq!(tanhf(0.0), 0.0);
        assert!((tanhf(0.5) - 0.46211716).abs() < 1e-6);
        assert_eq!(tanhf(20.0), 1.0);
        assert_eq!(tanhf(-20.0), -1.0);
        assert_eq!(tanhf(f32::NEG_INFINITY), -1.0);
        assert!(tanhf(f32::NAN).is_nan());
    }

    #[test]
    fn test_vector_forms_match_scalar() {
        let x = [-3.0, -0.25, 0.0, 0.7, 1.2, 12.0];
        let mut y = [0.0; 6];
        vec_tanhf(&mut y, &x);
        for (a, b) in x.iter().zip(&y) {
            assert_eq!(tanhf(*a), *b);
        }
        vec_tanf(&mut y, &x);
        for (a, b) in x.iter().zip(&y) {
            assert_eq!(tanf(*a), *b);
        }
    }
}
