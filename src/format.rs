// ============================================================================
// Conversion & Formatting
// Decimal/binary/triple renderings and the literal parser
// ============================================================================
//
// The decimal path goes through the exact decimal engine in both directions,
// so every representable value round-trips through its decimal string. The
// integer part is converted by a Horner-style double-and-add bit scan; the
// fraction is the exact expansion of k / 2^RBITS via range / levels / step.

use crate::decimal::{self, Decimal};
use crate::errors::{FixedPointError, FixedPointResult};
use crate::fixed_point::FixedPoint;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Free functions
// ============================================================================

/// One's complement copy.
pub fn ones_complement<const NBITS: u32, const RBITS: u32, const POLICY: bool>(
    value: &FixedPoint<NBITS, RBITS, POLICY>,
) -> FixedPoint<NBITS, RBITS, POLICY> {
    let mut ones = value.clone();
    ones.flip();
    ones
}

/// Two's complement copy. The most negative value maps to itself.
pub fn twos_complement<const NBITS: u32, const RBITS: u32, const POLICY: bool>(
    value: &FixedPoint<NBITS, RBITS, POLICY>,
) -> FixedPoint<NBITS, RBITS, POLICY> {
    let mut twos = value.clone();
    twos.twos_complement();
    twos
}

/// Base-2 exponent of the leading significant bit relative to the radix
/// point: 0 for values in [1, 2), negative for pure fractions, 0 for zero.
/// The most negative value, whose magnitude has no positive counterpart,
/// reports `NBITS - RBITS`.
pub fn scale<const NBITS: u32, const RBITS: u32, const POLICY: bool>(
    value: &FixedPoint<NBITS, RBITS, POLICY>,
) -> i32 {
    if value.is_zero() {
        return 0;
    }
    let magnitude = if value.sign() {
        let negated = twos_complement(value);
        if &negated == value {
            return NBITS as i32 - RBITS as i32;
        }
        negated
    } else {
        value.clone()
    };
    let mut msb = 0;
    for i in (0..NBITS).rev() {
        if magnitude.at(i) {
            msb = i;
            break;
        }
    }
    msb as i32 - RBITS as i32
}

// ============================================================================
// Renderers
// ============================================================================

/// Exact decimal rendering: `[-]digits.digits` with exactly RBITS fraction
/// digits, zero padded.
pub fn to_decimal_string<const NBITS: u32, const RBITS: u32, const POLICY: bool>(
    value: &FixedPoint<NBITS, RBITS, POLICY>,
) -> String {
    let nbits = NBITS as usize;
    let rbits = RBITS as usize;
    if value.is_zero() {
        let mut out = String::from("0");
        if rbits > 0 {
            out.push('.');
            out.extend(std::iter::repeat('0').take(rbits));
        }
        return out;
    }
    let mut out = String::new();
    if value.sign() {
        out.push('-');
    }
    let number = if value.sign() { twos_complement(value) } else { value.clone() };

    if nbits > rbits {
        // integer part: double-and-add decimal multipliers over the bits
        // above the radix point
        let mut partial = Decimal::new();
        let mut multiplier = Decimal::from_digit(1, false);
        for i in rbits..nbits {
            if number.at(i as u32) {
                decimal::add(&mut partial, &multiplier);
            }
            let doubled = multiplier.clone();
            decimal::add(&mut multiplier, &doubled);
        }
        out.push_str(&partial.to_string());
    } else {
        out.push('0');
    }

    if rbits > 0 {
        out.push('.');
        // the fraction pattern k samples the decimal range 10^rbits in
        // 2^rbits discretization levels; step = range / levels is exact
        // because 10^r / 2^r = 5^r
        let mut range = Decimal::from_digit(1, false);
        range.shift_left(rbits);
        let mut levels = Decimal::from_digit(1, false);
        for _ in 0..rbits {
            let doubled = levels.clone();
            decimal::add(&mut levels, &doubled);
        }
        let step = decimal::div(&range, &levels).expect("levels is nonzero");
        let mut partial = Decimal::new();
        let mut multiplier = Decimal::from_digit(1, false);
        for i in 0..rbits {
            if number.at(i as u32) {
                decimal::add(&mut partial, &multiplier);
            }
            let doubled = multiplier.clone();
            decimal::add(&mut multiplier, &doubled);
        }
        decimal::mul(&mut partial, &step);
        // partial counts parts of the range, so its digit count against the
        // range's reveals the leading zeros
        let leading_zeros = range.num_digits() - partial.num_digits() - 1;
        out.extend(std::iter::repeat('0').take(leading_zeros));
        let mut digits_written = leading_zeros + partial.num_digits();
        out.push_str(&partial.to_string());
        while digits_written < rbits {
            out.push('0');
            digits_written += 1;
        }
    }
    out
}

/// Lossless bit-literal rendering: `b<integer-bits>.<fraction-bits>`.
pub fn to_binary<const NBITS: u32, const RBITS: u32, const POLICY: bool>(
    value: &FixedPoint<NBITS, RBITS, POLICY>,
) -> String {
    let mut out = String::with_capacity(NBITS as usize + 2);
    out.push('b');
    for i in (RBITS..NBITS).rev() {
        out.push(if value.at(i) { '1' } else { '0' });
    }
    out.push('.');
    for i in (0..RBITS).rev() {
        out.push(if value.at(i) { '1' } else { '0' });
    }
    out
}

/// Triple rendering `(sign,scale,fraction-bits)`, with `~` standing in for
/// the fraction when RBITS is zero.
pub fn to_triple<const NBITS: u32, const RBITS: u32, const POLICY: bool>(
    value: &FixedPoint<NBITS, RBITS, POLICY>,
) -> String {
    let mut out = String::new();
    out.push_str(if value.sign() { "(-," } else { "(+," });
    out.push_str(&scale(value).to_string());
    out.push(',');
    for i in (0..RBITS).rev() {
        out.push(if value.at(i) { '1' } else { '0' });
    }
    out.push_str(if RBITS == 0 { "~)" } else { ")" });
    out
}

// ============================================================================
// Parser
// ============================================================================

/// Parse a fixed-point literal: decimal `[-]digits[.digits]`, hexadecimal
/// `0x`/`0X` with optional `'` digit grouping, or a leading-zero octal form
/// (recognized but not supported).
///
/// Decimal integer digits are accumulated with the fixed-point's own
/// arithmetic, so a literal beyond the representable range follows the
/// active overflow policy instead of failing.
///
/// # Errors
/// `ParseFailure` for anything that is not a recognized literal, and for
/// octal literals.
pub fn parse<const NBITS: u32, const RBITS: u32, const POLICY: bool>(
    text: &str,
) -> FixedPointResult<FixedPoint<NBITS, RBITS, POLICY>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FixedPointError::ParseFailure);
    }
    if let Some(digits) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return parse_hex(digits);
    }
    if is_octal_literal(trimmed) {
        tracing::debug!(literal = trimmed, "octal fixed-point literals are not supported");
        return Err(FixedPointError::ParseFailure);
    }
    parse_decimal(trimmed)
}

fn is_octal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 2
        && bytes[0] == b'0'
        && (b'1'..=b'7').contains(&bytes[1])
        && bytes[2..].iter().all(|b| (b'0'..=b'7').contains(b))
}

/// Raw nibble injection, least significant digit last in the text. Bits
/// beyond NBITS are dropped.
fn parse_hex<const NBITS: u32, const RBITS: u32, const POLICY: bool>(
    digits: &str,
) -> FixedPointResult<FixedPoint<NBITS, RBITS, POLICY>> {
    let mut value = FixedPoint::new();
    let mut position = 0u32;
    let mut nibbles = 0usize;
    for ch in digits.chars().rev() {
        if ch == '\'' {
            continue;
        }
        let nibble = ch.to_digit(16).ok_or(FixedPointError::ParseFailure)? as u64;
        for b in 0..4 {
            let index = position + b;
            if index < NBITS && nibble >> b & 1 == 1 {
                value.set(index, true)?;
            }
        }
        position += 4;
        nibbles += 1;
    }
    if nibbles == 0 {
        return Err(FixedPointError::ParseFailure);
    }
    Ok(value)
}

fn parse_decimal<const NBITS: u32, const RBITS: u32, const POLICY: bool>(
    text: &str,
) -> FixedPointResult<FixedPoint<NBITS, RBITS, POLICY>> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if unsigned.is_empty() {
        return Err(FixedPointError::ParseFailure);
    }
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };
    if int_part.is_empty() && frac_part.is_none_or(str::is_empty) {
        return Err(FixedPointError::ParseFailure);
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FixedPointError::ParseFailure);
    }
    if let Some(frac) = frac_part {
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FixedPointError::ParseFailure);
        }
    }

    // integer digits accumulate through the fixed-point's own arithmetic;
    // over-range literals wrap or clamp per the active policy
    let mut value = FixedPoint::<NBITS, RBITS, POLICY>::new();
    let mut multiplier = FixedPoint::<NBITS, RBITS, POLICY>::from(1u64);
    let ten = FixedPoint::<NBITS, RBITS, POLICY>::from(10u64);
    for b in int_part.bytes().rev() {
        let digit = FixedPoint::<NBITS, RBITS, POLICY>::from(u64::from(b - b'0'));
        value += multiplier.clone() * digit;
        multiplier *= ten.clone();
    }

    if let Some(frac) = frac_part {
        if !frac.is_empty() {
            let (bits, carry) = fraction_bits(frac, RBITS as usize)?;
            for (i, set) in bits.iter().enumerate() {
                if *set {
                    value.set(i as u32, true)?;
                }
            }
            if carry {
                value += FixedPoint::from(1u64);
            }
        }
    }

    if negative {
        value.twos_complement();
    }
    Ok(value)
}

/// Exact conversion of decimal fraction digits to `rbits` binary fraction
/// bits: k = F * 2^rbits / 10^len, rounded to nearest with ties to even.
/// Returns the bits (LSB first) and whether the rounding carried into the
/// integer part.
fn fraction_bits(frac: &str, rbits: usize) -> FixedPointResult<(Vec<bool>, bool)> {
    let f = Decimal::from_ascii_digits(frac)?;
    let mut numerator = f;
    for _ in 0..rbits {
        let doubled = numerator.clone();
        decimal::add(&mut numerator, &doubled);
    }
    let mut denominator = Decimal::from_digit(1, false);
    denominator.shift_left(frac.len());
    let (mut quotient, remainder) = decimal::div_rem(&numerator, &denominator)?;
    // round half to even on the discarded remainder
    let mut twice = remainder.clone();
    decimal::add(&mut twice, &remainder);
    let round_up = if decimal::less(&denominator, &twice) {
        true
    } else {
        !decimal::less(&twice, &denominator) && quotient.is_odd()
    };
    if round_up {
        let one = Decimal::from_digit(1, false);
        decimal::add(&mut quotient, &one);
    }
    // peel the bits off k; anything left after rbits halvings carries up
    let two = Decimal::from_u64(2);
    let mut bits = Vec::with_capacity(rbits);
    for _ in 0..rbits {
        bits.push(quotient.is_odd());
        quotient = decimal::div(&quotient, &two)?;
    }
    Ok((bits, !quotient.is_zero()))
}

// ============================================================================
// Display / FromStr
// ============================================================================

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> fmt::Display
    for FixedPoint<NBITS, RBITS, POLICY>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&to_decimal_string(self))
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> FromStr
    for FixedPoint<NBITS, RBITS, POLICY>
{
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::{MODULO, SATURATING};

    type Q8_4 = FixedPoint<8, 4>;
    type Q8_0 = FixedPoint<8, 0>;
    type Q8_4Sat = FixedPoint<8, 4, SATURATING>;

    #[test]
    fn test_zero_renders_all_fraction_zeros() {
        assert_eq!(to_decimal_string(&Q8_4::zero()), "0.0000");
        assert_eq!(to_decimal_string(&Q8_0::zero()), "0");
        assert_eq!(to_decimal_string(&FixedPoint::<12, 12>::zero()), "0.000000000000");
    }

    #[test]
    fn test_decimal_string_exact_fractions() {
        assert_eq!(to_decimal_string(&Q8_4::from(1.5f64)), "1.5000");
        assert_eq!(to_decimal_string(&Q8_4::from(0.25f64)), "0.2500");
        assert_eq!(to_decimal_string(&Q8_4::min_pos()), "0.0625");
        assert_eq!(to_decimal_string(&Q8_4::from(-1.75f64)), "-1.7500");
        assert_eq!(to_decimal_string(&Q8_4::max_neg()), "-8.0000");
        assert_eq!(to_decimal_string(&Q8_4::min_neg()), "-0.0625");
    }

    #[test]
    fn test_decimal_string_integer_only() {
        assert_eq!(to_decimal_string(&Q8_0::from(127i64)), "127");
        assert_eq!(to_decimal_string(&Q8_0::from(-128i64)), "-128");
        assert_eq!(to_decimal_string(&Q8_0::from(-1i64)), "-1");
    }

    #[test]
    fn test_all_fraction_bits_configuration() {
        // nbits == rbits: no integer field at all
        let v = FixedPoint::<4, 4>::from_raw_bits(0b1000); // -0.5
        assert_eq!(to_decimal_string(&v), "-0.5000");
        let w = FixedPoint::<4, 4>::from_raw_bits(0b0111);
        assert_eq!(to_decimal_string(&w), "0.4375");
    }

    #[test]
    fn test_display_binds_to_decimal_string() {
        let v = Q8_4::from(2.5f64);
        assert_eq!(v.to_string(), "2.5000");
        assert_eq!(format!("{:>8}", v), "  2.5000");
    }

    #[test]
    fn test_to_binary() {
        assert_eq!(to_binary(&Q8_4::from(1.5f64)), "b0001.1000");
        assert_eq!(to_binary(&Q8_4::from(-1.5f64)), "b1110.1000");
        assert_eq!(to_binary(&Q8_0::from(5i64)), "b00000101.");
    }

    #[test]
    fn test_to_triple() {
        assert_eq!(to_triple(&Q8_4::from(1.5f64)), "(+,0,1000)");
        assert_eq!(to_triple(&Q8_4::from(4.0f64)), "(+,2,0000)");
        assert_eq!(to_triple(&Q8_4::from(-1.5f64)), "(-,0,1000)");
        assert_eq!(to_triple(&Q8_0::from(3i64)), "(+,1,~)");
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale(&Q8_4::zero()), 0);
        assert_eq!(scale(&Q8_4::from(1i64)), 0);
        assert_eq!(scale(&Q8_4::from(4i64)), 2);
        assert_eq!(scale(&Q8_4::from(0.25f64)), -2);
        assert_eq!(scale(&Q8_4::min_neg()), -4);
        // the most negative value has no positive counterpart
        assert_eq!(scale(&Q8_4::max_neg()), 4);
    }

    #[test]
    fn test_parse_decimal_forms() {
        assert_eq!(parse::<8, 4, MODULO>("1.5").unwrap(), Q8_4::from(1.5f64));
        assert_eq!(parse::<8, 4, MODULO>("-0.0625").unwrap(), Q8_4::min_neg());
        assert_eq!(parse::<8, 4, MODULO>("7").unwrap(), Q8_4::from(7i64));
        assert_eq!(parse::<8, 0, MODULO>("42").unwrap(), Q8_0::from(42i64));
        assert_eq!(parse::<8, 4, MODULO>("0.5000").unwrap(), Q8_4::from(0.5f64));
    }

    #[test]
    fn test_parse_rounds_excess_fraction_digits_to_even() {
        // 0.03125 is half an ULP at RBITS = 4: ties to even -> 0
        assert!(parse::<8, 4, MODULO>("0.03125").unwrap().is_zero());
        // 0.09375 is 1.5 ULP -> 2 ULP
        assert_eq!(
            parse::<8, 4, MODULO>("0.09375").unwrap(),
            Q8_4::from_raw_bits(2)
        );
        // fraction rounding can carry into the integer part
        assert_eq!(parse::<8, 4, MODULO>("1.99").unwrap(), Q8_4::from(2i64));
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse::<8, 4, MODULO>("0x1F").unwrap(), Q8_4::from_raw_bits(0x1F));
        assert_eq!(parse::<8, 4, MODULO>("0XfF").unwrap(), Q8_4::from_raw_bits(0xFF));
        // digit grouping
        assert_eq!(
            parse::<16, 8, MODULO>("0x1'2F").unwrap(),
            FixedPoint::<16, 8>::from_raw_bits(0x12F)
        );
        // bits beyond the width are dropped
        assert_eq!(parse::<8, 4, MODULO>("0x3FF").unwrap(), Q8_4::from_raw_bits(0xFF));
    }

    #[test]
    fn test_parse_rejects_octal_and_garbage() {
        assert_eq!(parse::<8, 4, MODULO>("0755"), Err(FixedPointError::ParseFailure));
        assert_eq!(parse::<8, 4, MODULO>("abc"), Err(FixedPointError::ParseFailure));
        assert_eq!(parse::<8, 4, MODULO>(""), Err(FixedPointError::ParseFailure));
        assert_eq!(parse::<8, 4, MODULO>("."), Err(FixedPointError::ParseFailure));
        assert_eq!(parse::<8, 4, MODULO>("0x"), Err(FixedPointError::ParseFailure));
        assert_eq!(parse::<8, 4, MODULO>("1.2.3"), Err(FixedPointError::ParseFailure));
        assert_eq!(parse::<8, 4, MODULO>("--1"), Err(FixedPointError::ParseFailure));
    }

    #[test]
    fn test_parse_overflow_follows_policy() {
        // 100 does not fit Q8.4 (max 7.9375): modulo wraps, saturating clamps
        let wrapped = parse::<8, 4, MODULO>("100").unwrap();
        assert_ne!(wrapped, Q8_4::max_pos());
        let clamped: Q8_4Sat = "100".parse().unwrap();
        assert_eq!(clamped, Q8_4Sat::max_pos());
    }

    #[test]
    fn test_round_trip_full_range_q8_4() {
        for raw in 0u64..=255 {
            let v = Q8_4::from_raw_bits(raw);
            let text = to_decimal_string(&v);
            let back: Q8_4 = text.parse().unwrap();
            assert_eq!(back, v, "round trip failed for {text}");
        }
    }

    #[test]
    fn test_round_trip_full_range_q8_0() {
        for raw in 0u64..=255 {
            let v = Q8_0::from_raw_bits(raw);
            let back: Q8_0 = to_decimal_string(&v).parse().unwrap();
            assert_eq!(back, v);
        }
    }

    #[test]
    fn test_round_trip_wide_configuration() {
        let v = FixedPoint::<72, 36>::from(-1234.5f64);
        let back: FixedPoint<72, 36> = to_decimal_string(&v).parse().unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_from_str_binds_to_parser() {
        let v: Q8_4 = "1.5".parse().unwrap();
        assert_eq!(v, Q8_4::from(1.5f64));
        let err: Result<Q8_4, _> = "0777".parse();
        assert_eq!(err, Err(FixedPointError::ParseFailure));
    }
}
