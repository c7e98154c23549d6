// ============================================================================
// fixbin
// Arbitrary-width binary fixed-point arithmetic library
// ============================================================================

//! # fixbin
//!
//! Arbitrary-width binary fixed-point numbers: `NBITS` total bits, `RBITS`
//! of them fractional, two's-complement storage, with a selectable overflow
//! policy.
//!
//! ## Features
//!
//! - **Compile-time shape**: width, fraction width and overflow policy are
//!   const generics; mixing shapes is a type error
//! - **Two overflow disciplines**: modulo (wraparound) and saturating
//!   (clamp to the representable extremes)
//! - **Correct rounding**: round-to-nearest, ties-to-even on float import,
//!   multiplication and division (guard/round/sticky analysis)
//! - **Lossless decimal conversion**: an exact decimal engine renders and
//!   parses every representable value without floating-point round trips
//! - **Native bridges**: construction from every integer primitive and
//!   f32/f64, extraction back with subnormal-aware float export
//!
//! ## Example
//!
//! ```rust
//! use fixbin::{FixedPoint, SATURATING};
//!
//! // Q8.4 with wraparound overflow
//! let a = FixedPoint::<8, 4>::from(1.5);
//! let b = FixedPoint::<8, 4>::from(0.25);
//! assert_eq!((a.clone() + b.clone()).to_string(), "1.7500");
//! assert_eq!((a * b).to_string(), "0.3750");
//!
//! // the same shape, clamping instead of wrapping
//! let top = FixedPoint::<8, 4, SATURATING>::max_pos();
//! let one = FixedPoint::<8, 4, SATURATING>::from(1);
//! assert_eq!(top.clone() + one, top);
//! ```

mod decimal;

pub mod errors;
pub mod fixed_point;
pub mod format;
pub mod register;

// Re-exports for convenience
pub use errors::{FixedPointError, FixedPointResult};
pub use fixed_point::{DivModResult, FixedPoint, MODULO, SATURATING};
pub use format::{
    ones_complement, parse, scale, to_binary, to_decimal_string, to_triple, twos_complement,
};
pub use register::BitRegister;

#[cfg(test)]
mod integration_tests {
    use super::*;

    type Q8_4 = FixedPoint<8, 4>;
    type Q8_4Sat = FixedPoint<8, 4, SATURATING>;

    #[test]
    fn test_end_to_end_arithmetic_and_formatting() {
        let a: Q8_4 = "1.5".parse().unwrap();
        let b = Q8_4::from(0.25);

        let sum = a.clone() + b.clone();
        assert_eq!(to_binary(&sum), "b0001.1100");
        assert_eq!(sum.to_string(), "1.7500");

        let product = a.clone() * b.clone();
        assert_eq!(to_binary(&product), "b0000.0110");
        assert_eq!(product.to_string(), "0.3750");

        let quotient = a / b;
        assert_eq!(quotient.to_i64(), 6);
    }

    #[test]
    fn test_policy_boundary_behavior() {
        // modulo wraps across the top of the range
        assert_eq!(Q8_4::max_pos() + Q8_4::min_pos(), Q8_4::max_neg());
        // saturating clamps at it
        assert_eq!(Q8_4Sat::max_pos() + Q8_4Sat::min_pos(), Q8_4Sat::max_pos());
    }

    #[test]
    fn test_round_trip_through_every_surface() {
        for raw in [0u64, 1, 0x18, 0x7F, 0x80, 0xC3, 0xFF] {
            let v = Q8_4::from_raw_bits(raw);
            // decimal string
            let text = to_decimal_string(&v);
            assert_eq!(text.parse::<Q8_4>().unwrap(), v);
            // native float
            assert_eq!(Q8_4::from(v.to_f64()), v);
        }
    }
}
