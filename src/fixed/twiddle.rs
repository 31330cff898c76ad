// src/fixed/twiddle.rs

use super::butterfly::Radix;
use super::types::ComplexFixed;
use core::f64::consts::PI;

/// Fractional bits for twiddle factors (high precision).
/// Using Q31 format for maximum precision in twiddle factors.
pub const TWIDDLE_FRAC: u32 = 31;

pub type Twiddle = ComplexFixed<TWIDDLE_FRAC>;

/// `exp(-2*pi*i*k/n)` in Q31. 1.0 saturates to `0x7fffffff`.
pub fn twiddle(k: usize, n: usize) -> Twiddle {
    let angle = -2.0 * PI * ((k % n) as f64) / (n as f64);
    Twiddle::from_f64(libm::cos(angle), libm::sin(angle))
}

/// Entries needed by a stage of `radix` that combines sub-transforms of size `v`.
pub const fn stage_twiddle_len(v: usize, radix: Radix) -> usize {
    v * (radix.size() - 1)
}

/// Lays out the twiddles of one stage in consumption order: for every
/// position `p` in `0..v`, the legs `1..r` in turn, entry
/// `p*(r-1) + (leg-1)` holding `exp(-2*pi*i*leg*p/(v*r))`.
pub fn fill_stage_twiddles(table: &mut [Twiddle], v: usize, radix: Radix) {
    let r = radix.size();
    debug_assert!(table.len() >= stage_twiddle_len(v, radix));
    for p in 0..v {
        for leg in 1..r {
            table[p * (r - 1) + leg - 1] = twiddle(leg * p, v * r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twiddle_quadrants() {
        let one = Twiddle::from_bits(i32::MAX, 0);
        assert_eq!(twiddle(0, 4), one);
        assert_eq!(twiddle(1, 4), Twiddle::from_bits(0, i32::MIN));
        assert_eq!(twiddle(2, 4), Twiddle::from_bits(i32::MIN, 0));
        assert_eq!(twiddle(4, 4), one);
    }

    #[test]
    fn test_stage_layout() {
        // v = 2, radix 4: rows p = 0 and p = 1, three legs each
        let mut table = [Twiddle::ZERO; 6];
        fill_stage_twiddles(&mut table, 2, Radix::Four);
        for leg in 0..3 {
            assert_eq!(table[leg], twiddle(0, 8));
        }
        assert_eq!(table[3], twiddle(1, 8));
        assert_eq!(table[4], twiddle(2, 8));
        assert_eq!(table[5], twiddle(3, 8));
        assert_eq!(stage_twiddle_len(2, Radix::Four), 6);
    }
}
