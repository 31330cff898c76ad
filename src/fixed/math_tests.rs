use super::*;
use crate::test_util::XorShift;
use core::f64::consts::PI;

const LSB31: f64 = 1.0 / 2147483648.0;
const LSB25: f64 = 1.0 / 33554432.0;

fn q31(bits: i32) -> Fixed<31> {
    Fixed::from_bits(bits)
}

#[test]
fn test_sqrt_sentinel_and_exact_squares() {
    assert_eq!(sqrt32x32(q31(-1)), Fixed::MIN);
    assert_eq!(sqrt32x32(q31(i32::MIN)).to_bits(), i32::MIN);
    assert_eq!(sqrt32x32(q31(0)), Fixed::ZERO);
    assert_eq!(sqrt32x32(q31(1 << 29)).to_bits(), 1 << 30);
    assert_eq!(sqrt32x32(q31(1 << 27)).to_bits(), 1 << 29);

    let mut rng = XorShift::new(17);
    for _ in 0..1000 {
        let s = (1i64 << 29) + (rng.next_u64() % ((1u64 << 31) - (1 << 29))) as i64;
        let square = ((s * s + (1 << 30)) >> 31) as i32;
        let got = sqrt32x32(q31(square)).to_bits() as i64;
        assert!((got - s).abs() <= 2, "sqrt of {}: got {}, want {}", square, got, s);
    }
}

#[test]
fn test_sqrt_matches_libm_within_one_lsb() {
    let mut rng = XorShift::new(23);
    for _ in 0..1000 {
        let x = (rng.next_u64() >> 33) as i32;
        let got = sqrt32x32(q31(x)).to_bits() as f64;
        let want = (x as f64 * LSB31).sqrt() / LSB31;
        assert!((got - want).abs() <= 1.0, "x={}: {} vs {}", x, got, want);
    }
}

#[test]
fn test_divide32x32_accuracy() {
    let mut rng = XorShift::new(5);
    for _ in 0..2000 {
        let num = rng.range_i32(i32::MAX);
        let mut den = rng.range_i32(i32::MAX) >> (rng.next_u64() % 24);
        if den == 0 {
            den = 3;
        }
        let q = divide32x32(q31(num), q31(den));
        let exact = num as f64 / den as f64;
        let lsb = libm::ldexp(LSB31, q.exponent);
        assert!(
            (q.to_f64() - exact).abs() <= 2.0 * lsb,
            "{}/{}: {:?} = {} vs {}",
            num,
            den,
            q,
            q.to_f64(),
            exact
        );
        if num != 0 {
            assert!(q.mantissa.unsigned_abs() >= 1 << 30, "mantissa not normalized: {:?}", q);
        }
    }
}

#[test]
fn test_divide_by_zero_sentinels() {
    assert_eq!(divide32x32(q31(5), q31(0)), MantExp { mantissa: i32::MAX, exponent: 31 });
    assert_eq!(divide32x32(q31(-5), q31(0)), MantExp { mantissa: -i32::MAX, exponent: 31 });
    assert_eq!(recip32x32(q31(0)), MantExp { mantissa: i32::MAX, exponent: 31 });
    assert_eq!(divide16x16(7, 0), MantExp { mantissa: i16::MAX, exponent: 15 });
    assert_eq!(divide16x16(-7, 0), MantExp { mantissa: -i16::MAX, exponent: 15 });
    assert_eq!(divide32x32(q31(0), q31(9)), MantExp { mantissa: 0, exponent: 0 });
}

#[test]
fn test_recip_values() {
    let half = recip32x32(q31(1 << 30));
    assert_eq!(half, MantExp { mantissa: 1 << 30, exponent: 2 });
    assert_eq!(half.to_f64(), 2.0);

    let neg_quarter = recip32x32(q31(-(1 << 29)));
    assert_eq!(neg_quarter.to_f64(), -4.0);

    let third = recip32x32(Fixed::from_f64(1.0 / 3.0));
    assert!((third.to_f64() - 3.0).abs() < 1e-8);
}

#[test]
fn test_divide16x16_accuracy() {
    let mut rng = XorShift::new(61);
    for _ in 0..2000 {
        let num = rng.range_i32(i16::MAX as i32) as i16;
        let den = match rng.range_i32(i16::MAX as i32) as i16 {
            0 => 1,
            d => d,
        };
        let q = divide16x16(num, den);
        let exact = num as f64 / den as f64;
        let lsb = libm::ldexp(1.0 / 32768.0, q.exponent);
        assert!(
            (q.to_f64() - exact).abs() <= 2.0 * lsb,
            "{}/{}: {:?} vs {}",
            num,
            den,
            q,
            exact
        );
    }
    assert_eq!(divide16x16(1, 2).to_f64(), 0.5);
    assert_eq!(divide16x16(-3, 4).to_f64(), -0.75);
}

#[test]
fn test_sine_accuracy() {
    for i in -2048..2048 {
        let bits = (i as i32) << 20;
        let got = sine32x32(q31(bits)).to_f64();
        let want = (PI * bits as f64 * LSB31).sin();
        assert!((got - want).abs() < 7.9e-7, "phase {}: {} vs {}", bits, got, want);
    }
    for bits in [i32::MIN, i32::MAX, 1 << 30, -(1 << 30), 1, -1] {
        let got = sine32x32(q31(bits)).to_f64();
        let want = (PI * bits as f64 * LSB31).sin();
        assert!((got - want).abs() < 7.9e-7, "phase {}: {} vs {}", bits, got, want);
    }
    assert_eq!(sine32x32(Fixed::ZERO), Fixed::ZERO);
}

#[test]
fn test_log2_exact_powers_and_sentinel() {
    assert_eq!(log2_32x32(q31(1 << 30)).to_bits(), -(1 << 25));
    assert_eq!(log2_32x32(q31(1 << 29)).to_bits(), -2 << 25);
    assert_eq!(log2_32x32(q31(1)).to_bits(), -31 << 25);
    assert_eq!(log2_32x32(q31(0)), Fixed::MIN);
    assert_eq!(log2_32x32(q31(-5)), Fixed::MIN);
}

#[test]
fn test_log2_accuracy() {
    let mut rng = XorShift::new(12);
    for _ in 0..2000 {
        let x = ((rng.next_u64() >> 33) as i32).max(1);
        let got = log2_32x32(q31(x)).to_f64();
        let want = (x as f64 * LSB31).log2();
        assert!((got - want).abs() <= 2.0 * LSB25, "x={}: {} vs {}", x, got, want);
    }
}

#[test]
fn test_antilog2_accuracy() {
    assert_eq!(antilog2_32x32(Fixed::from_bits(-(1 << 25))).to_bits(), 1 << 30);
    assert_eq!(antilog2_32x32(Fixed::from_bits(0)), Fixed::MAX);
    assert_eq!(antilog2_32x32(Fixed::MIN), Fixed::ZERO);

    let mut rng = XorShift::new(3);
    for _ in 0..2000 {
        let x = -(((rng.next_u64() % (20u64 << 25)) as i32) + 1);
        let got = antilog2_32x32(Fixed::from_bits(x)).to_f64();
        let want = (x as f64 * LSB25).exp2();
        assert!((got - want).abs() < 1e-8, "x={}: {} vs {}", x, got, want);
    }
}

#[test]
fn test_log2_antilog2_round_trip() {
    for x in [0.9, 0.5, 0.3, 0.01] {
        let l = log2_32x32(Fixed::from_f64(x));
        let back = antilog2_32x32(l).to_f64();
        assert!((back - x).abs() / x < 1e-6, "{} -> {}", x, back);
    }
}

#[test]
fn test_vector_kernels() {
    let x = [q31(1 << 30), q31(1 << 30)];
    let y = [q31(1 << 30), q31(-(1 << 29))];
    assert_eq!(vec_dot32x32(&x, &y), 1 << 59);
    assert_eq!(vec_dot32x32(&[Fixed::MIN; 4], &[Fixed::MIN; 4]), i64::MAX);

    assert_eq!(vec_power32x32(&x, 1), 1 << 60);
    assert_eq!(vec_power32x32(&x, 0), 1 << 61);

    let mut out = [Fixed::ZERO; 2];
    vec_scale32x32(&mut out, &x, q31(1 << 30), 1);
    assert_eq!(out, [q31(1 << 30); 2]);
    vec_scale32x32(&mut out, &x, q31(1 << 30), -1);
    assert_eq!(out, [q31(1 << 28); 2]);
    vec_scale32x32(&mut out, &[Fixed::MAX, Fixed::MIN], Fixed::MAX, 2);
    assert_eq!(out, [Fixed::MAX, Fixed::MIN]);

    assert_eq!(vec_bexp32(&[q31(1 << 20), q31(-(1 << 25))]), 6);
    assert_eq!(vec_bexp32(&[]), 31);
}

#[test]
fn test_isqrt() {
    assert_eq!(isqrt_u128(0), 0);
    assert_eq!(isqrt_u128(15), 3);
    assert_eq!(isqrt_u128(16), 4);
    assert_eq!(isqrt_u128(u128::MAX), u64::MAX as u128);
    assert_eq!(isqrt_round(12), 3);
    assert_eq!(isqrt_round(13), 4);
}
