// ============================================================================
// Fixed-Point Value Type
// Arbitrary-width binary fixed-point number with configurable overflow policy
// ============================================================================

use crate::errors::{FixedPointError, FixedPointResult};
use crate::register::BitRegister;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign,
    Shr, ShrAssign, Sub, SubAssign,
};

/// Wraparound overflow policy: high-order bits are quietly discarded, the
/// result is congruent mod 2^NBITS.
pub const MODULO: bool = false;

/// Clamping overflow policy: overflow saturates at the representable
/// extremes.
pub const SATURATING: bool = true;

/// Number of guard/round/sticky bits carried through division.
const ROUNDING_DECISION_BITS: usize = 4;

/// Binary fixed-point number with `NBITS` total bits, `RBITS` of which sit
/// right of the radix point.
///
/// The bit pattern is a two's-complement integer scaled by 2^RBITS, so
/// `0001.1000` in a `FixedPoint<8, 4>` is 24/16 = 1.5. Overflow behavior is
/// selected by `POLICY`:
///
/// - [`MODULO`] (default): arithmetic wraps at `NBITS` bits.
/// - [`SATURATING`]: arithmetic clamps to `max_pos`/`max_neg`.
///
/// # Type Parameters
/// - `NBITS`: total width, at least 1.
/// - `RBITS`: fraction width; `NBITS >= RBITS` is enforced at
///   monomorphization time.
///
/// # Example
/// ```ignore
/// use fixbin::FixedPoint;
///
/// let a = FixedPoint::<8, 4>::from(1.5);
/// let b = FixedPoint::<8, 4>::from(0.25);
/// assert_eq!((a + b).to_string(), "1.7500");
/// ```
#[derive(Clone)]
pub struct FixedPoint<const NBITS: u32, const RBITS: u32, const POLICY: bool = MODULO> {
    bits: BitRegister,
}

/// Quotient/remainder pair of fixed-point long division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivModResult<const NBITS: u32, const RBITS: u32, const POLICY: bool = MODULO> {
    pub quot: FixedPoint<NBITS, RBITS, POLICY>,
    pub rem: FixedPoint<NBITS, RBITS, POLICY>,
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> FixedPoint<NBITS, RBITS, POLICY> {
    const SHAPE_OK: () = assert!(
        NBITS >= RBITS && NBITS >= 1,
        "fixed-point configuration error: nbits must be >= rbits and at least 1"
    );
    const F32_EXPORT_OK: () = assert!(
        RBITS <= 149,
        "to_f32: fixed-point fraction is too small to represent with a native f32"
    );
    const F64_EXPORT_OK: () = assert!(
        RBITS <= 1074,
        "to_f64: fixed-point fraction is too small to represent with a native f64"
    );

    /// Total width in bits.
    pub const fn total_bits() -> u32 {
        NBITS
    }

    /// Fraction width in bits.
    pub const fn fraction_bits() -> u32 {
        RBITS
    }

    /// True when the saturating overflow policy is active.
    pub const fn is_saturating() -> bool {
        POLICY == SATURATING
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Zero.
    pub fn new() -> Self {
        let () = Self::SHAPE_OK;
        Self { bits: BitRegister::new(NBITS as usize) }
    }

    /// Zero (alias of `new`).
    pub fn zero() -> Self {
        Self::new()
    }

    /// Largest representable value: `0111...1`.
    pub fn max_pos() -> Self {
        let mut v = Self::new();
        v.bits.flip();
        v.bits.reset(NBITS as usize - 1);
        v
    }

    /// Most negative representable value: `1000...0`.
    pub fn max_neg() -> Self {
        let mut v = Self::new();
        v.bits.set(NBITS as usize - 1, true);
        v
    }

    /// Smallest positive value, one ULP: `0...01`.
    pub fn min_pos() -> Self {
        let mut v = Self::new();
        v.bits.set(0, true);
        v
    }

    /// Closest-to-zero negative value, minus one ULP: `1...1`.
    pub fn min_neg() -> Self {
        let mut v = Self::new();
        v.bits.flip();
        v
    }

    /// Build from an un-interpreted raw bit pattern (low 64 bits).
    pub fn from_raw_bits(raw: u64) -> Self {
        let mut v = Self::new();
        v.bits.set_raw_u64(raw);
        v
    }

    fn from_signed(value: i64) -> Self {
        let mut result = Self::new();
        if value == 0 {
            return result;
        }
        if Self::is_saturating() {
            // range check against the extremes, compared as floating values
            let max = Self::max_pos();
            if value as f64 >= max.to_f64() {
                return max;
            }
            let min = Self::max_neg();
            if (value as f64) <= min.to_f64() {
                return min;
            }
        }
        let negative = value < 0;
        result.bits.set_raw_u64(value.unsigned_abs());
        result.bits.shl_assign(RBITS as usize);
        if negative {
            result.bits.twos_complement();
        }
        result
    }

    fn from_unsigned(value: u64) -> Self {
        let mut result = Self::new();
        if value == 0 {
            return result;
        }
        if Self::is_saturating() {
            let max = Self::max_pos();
            if value as f64 >= max.to_f64() {
                return max;
            }
        }
        result.bits.set_raw_u64(value);
        result.bits.shl_assign(RBITS as usize);
        result
    }

    /// Import an `f32`, rounding to nearest with ties to even.
    pub fn from_f32(value: f32) -> Self {
        let result = Self::new();
        if value == 0.0 || value.is_nan() {
            return result;
        }
        if value.is_infinite() {
            return if value.is_sign_positive() { Self::max_pos() } else { Self::max_neg() };
        }
        if Self::is_saturating() {
            let max = Self::max_pos();
            if value >= max.to_f32() {
                return max;
            }
            let min = Self::max_neg();
            if value <= min.to_f32() {
                return min;
            }
        }
        let bits = value.to_bits();
        let sign = bits >> 31 == 1;
        let biased = ((bits >> 23) & 0xFF) as i64;
        let fraction = (bits & 0x007F_FFFF) as u64;
        // subnormals have no hidden bit and anchor at the minimum exponent
        let (raw, exponent) = if biased == 0 {
            (fraction, 1 - 127)
        } else {
            (fraction | (1 << 23), biased - 127)
        };
        let radix_point = 23 - exponent;
        Self::import_rounded(sign, raw, radix_point - RBITS as i64)
    }

    /// Import an `f64`, rounding to nearest with ties to even.
    pub fn from_f64(value: f64) -> Self {
        let result = Self::new();
        if value == 0.0 || value.is_nan() {
            return result;
        }
        if value.is_infinite() {
            return if value.is_sign_positive() { Self::max_pos() } else { Self::max_neg() };
        }
        if Self::is_saturating() {
            let max = Self::max_pos();
            if value >= max.to_f64() {
                return max;
            }
            let min = Self::max_neg();
            if value <= min.to_f64() {
                return min;
            }
        }
        let bits = value.to_bits();
        let sign = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7FF) as i64;
        let fraction = bits & 0x000F_FFFF_FFFF_FFFF;
        let (raw, exponent) = if biased == 0 {
            (fraction, 1 - 1023)
        } else {
            (fraction | (1u64 << 52), biased - 1023)
        };
        let radix_point = 52 - exponent;
        Self::import_rounded(sign, raw, radix_point - RBITS as i64)
    }

    /// Place a decoded mantissa at the radix point, rounding away
    /// `shift_right` low bits (guard/round/sticky, ties to even) when the
    /// mantissa carries more precision than RBITS holds.
    fn import_rounded(sign: bool, mut raw: u64, shift_right: i64) -> Self {
        let mut result = Self::new();
        if shift_right > 0 {
            let sr = shift_right as u32;
            if sr > 64 {
                // every mantissa bit is below the guard position
                raw = 0;
            } else if sr == 64 {
                let guard = raw >> 63 & 1 == 1;
                let round = raw >> 62 & 1 == 1;
                let sticky = raw & ((1u64 << 62) - 1) != 0;
                raw = u64::from(guard && (round || sticky));
            } else {
                let guard = (raw >> (sr - 1)) & 1 == 1;
                let round = sr >= 2 && (raw >> (sr - 2)) & 1 == 1;
                let sticky = sr >= 3 && raw & ((1u64 << (sr - 2)) - 1) != 0;
                raw >>= sr;
                let lsb = raw & 1 == 1;
                if guard && (round || sticky || lsb) {
                    raw += 1;
                }
            }
            result.bits.set_raw_u64(raw);
        } else {
            result.bits.set_raw_u64(raw);
            result.bits.shl_assign((-shift_right) as usize);
        }
        if sign {
            result.bits.twos_complement();
        }
        result
    }

    /// Sign-extending width conversion to a same-RBITS, same-policy shape.
    ///
    /// # Errors
    /// `UnsupportedConversion` when `M < NBITS`: narrowing would have to
    /// discard significant bits and is rejected rather than silently
    /// rounded.
    pub fn resize<const M: u32>(&self) -> FixedPointResult<FixedPoint<M, RBITS, POLICY>> {
        if M < NBITS {
            tracing::debug!(from = NBITS, to = M, "narrowing width conversion rejected");
            return Err(FixedPointError::UnsupportedConversion);
        }
        let mut out = FixedPoint::<M, RBITS, POLICY>::new();
        out.bits = self.bits.resize(M as usize);
        Ok(out)
    }

    // ========================================================================
    // Selectors
    // ========================================================================

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.bits.is_zero()
    }

    /// Sign bit.
    #[inline]
    pub fn sign(&self) -> bool {
        self.bits.sign()
    }

    /// Test bit `index`; out-of-range indices read as zero.
    #[inline]
    pub fn at(&self, index: u32) -> bool {
        index < NBITS && self.bits.bit(index as usize)
    }

    /// Alias of `at`.
    #[inline]
    pub fn test(&self, index: u32) -> bool {
        self.at(index)
    }

    /// The underlying storage register.
    ///
    /// Exposed so the formatting layer can walk the raw pattern without
    /// privileged access to the type's internals.
    #[inline]
    pub fn bits(&self) -> &BitRegister {
        &self.bits
    }

    // ========================================================================
    // Modifiers
    // ========================================================================

    /// Zero every bit.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Set bit `index` to `value`.
    ///
    /// # Errors
    /// `OutOfBounds` when `index >= NBITS`.
    pub fn set(&mut self, index: u32, value: bool) -> FixedPointResult<()> {
        if index >= NBITS {
            return Err(FixedPointError::OutOfBounds);
        }
        self.bits.set(index as usize, value);
        Ok(())
    }

    /// Clear bit `index`.
    ///
    /// # Errors
    /// `OutOfBounds` when `index >= NBITS`.
    pub fn reset(&mut self, index: u32) -> FixedPointResult<()> {
        if index >= NBITS {
            return Err(FixedPointError::OutOfBounds);
        }
        self.bits.reset(index as usize);
        Ok(())
    }

    /// In-place one's complement.
    pub fn flip(&mut self) {
        self.bits.flip();
    }

    /// In-place two's complement (negation). The most negative value maps
    /// to itself.
    pub fn twos_complement(&mut self) {
        self.bits.twos_complement();
    }

    /// Overwrite the pattern from raw bits (low 64).
    pub fn set_raw_bits(&mut self, raw: u64) {
        self.bits.set_raw_u64(raw);
    }

    /// Add one ULP through the active overflow policy.
    pub fn increment(&mut self) {
        let ulp = Self::min_pos();
        self.add_impl(&ulp);
    }

    /// Subtract one ULP through the active overflow policy.
    pub fn decrement(&mut self) {
        let ulp = Self::min_pos();
        self.sub_impl(&ulp);
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Truncate a widened intermediate back to NBITS, clamping first when
    /// the saturating policy is active.
    fn narrow(wide: BitRegister) -> BitRegister {
        if Self::is_saturating() {
            let max_pos = Self::max_pos().bits;
            if wide.cmp_signed(&max_pos.resize(wide.width())) == Ordering::Greater {
                return max_pos;
            }
            let max_neg = Self::max_neg().bits;
            if wide.cmp_signed(&max_neg.resize(wide.width())) == Ordering::Less {
                return max_neg;
            }
        }
        wide.resize(NBITS as usize)
    }

    fn add_impl(&mut self, rhs: &Self) {
        if Self::is_saturating() {
            let wide = BitRegister::wide_add(&self.bits, &rhs.bits);
            self.bits = Self::narrow(wide);
        } else {
            self.bits.wrapping_add_assign(&rhs.bits);
        }
    }

    fn sub_impl(&mut self, rhs: &Self) {
        if Self::is_saturating() {
            let wide = BitRegister::wide_sub(&self.bits, &rhs.bits);
            self.bits = Self::narrow(wide);
        } else {
            // a - b == a + twos_complement(b)
            let mut negated = rhs.bits.clone();
            negated.twos_complement();
            self.bits.wrapping_add_assign(&negated);
        }
    }

    fn mul_impl(&mut self, rhs: &Self) {
        // exact 2*NBITS product carries 2*RBITS fraction bits; round the
        // RBITS about to be shifted out, nearest-even
        let mut wide = BitRegister::wide_mul(&self.bits, &rhs.bits);
        let round_up = wide.round_up_at(RBITS as usize);
        wide.shr_assign(RBITS as usize);
        if round_up {
            wide.increment();
        }
        self.bits = Self::narrow(wide);
    }

    fn div_impl(&mut self, rhs: &Self) -> FixedPointResult<()> {
        if rhs.is_zero() {
            return Err(FixedPointError::DivideByZero);
        }
        let wide = 2 * NBITS as usize + ROUNDING_DECISION_BITS;
        let negative = self.sign() != rhs.sign();
        // magnitudes in the widened register, numerator pre-shifted so the
        // quotient lands with ROUNDING_DECISION_BITS extra fraction bits
        let mut numerator = self.bits.resize(wide).magnitude();
        numerator.shl_assign(RBITS as usize + ROUNDING_DECISION_BITS);
        let denominator = rhs.bits.resize(wide).magnitude();
        let (mut quot, rem) = BitRegister::udiv_rem(&numerator, &denominator);
        // guard/round/sticky live in the low decision bits; a nonzero
        // remainder folds into sticky
        let guard = quot.bit(ROUNDING_DECISION_BITS - 1);
        let round = quot.bit(ROUNDING_DECISION_BITS - 2);
        let sticky = quot.any_bit_below(ROUNDING_DECISION_BITS - 2) || !rem.is_zero();
        quot.shr_assign_logical(ROUNDING_DECISION_BITS);
        let lsb = quot.bit(0);
        if guard && (round || sticky || lsb) {
            quot.increment();
        }
        if negative {
            quot.twos_complement();
        }
        self.bits = Self::narrow(quot);
        Ok(())
    }

    fn rem_impl(&mut self, rhs: &Self) -> FixedPointResult<()> {
        if rhs.is_zero() {
            return Err(FixedPointError::DivideByZero);
        }
        let (_, rem) = BitRegister::div_rem_signed(&self.bits, &rhs.bits);
        self.bits = rem;
        Ok(())
    }

    /// Checked division.
    ///
    /// # Errors
    /// `DivideByZero` when `rhs` is zero.
    pub fn checked_div(&self, rhs: &Self) -> FixedPointResult<Self> {
        let mut out = self.clone();
        out.div_impl(rhs)?;
        Ok(out)
    }

    /// Checked remainder.
    ///
    /// # Errors
    /// `DivideByZero` when `rhs` is zero.
    pub fn checked_rem(&self, rhs: &Self) -> FixedPointResult<Self> {
        let mut out = self.clone();
        out.rem_impl(rhs)?;
        Ok(out)
    }

    /// Quotient and remainder in one call.
    ///
    /// # Errors
    /// `DivideByZero` when `rhs` is zero.
    pub fn div_rem(&self, rhs: &Self) -> FixedPointResult<DivModResult<NBITS, RBITS, POLICY>> {
        Ok(DivModResult {
            quot: self.checked_div(rhs)?,
            rem: self.checked_rem(rhs)?,
        })
    }

    // ========================================================================
    // Conversions to native types
    // ========================================================================

    /// The integer part as an `i64`, truncated toward negative infinity
    /// (the fraction bits are simply dropped), sign extended.
    pub fn to_i64(&self) -> i64 {
        if NBITS <= RBITS {
            return 0;
        }
        let mut v = self.bits.clone();
        v.shr_assign(RBITS as usize);
        v.to_i64_sign_extended()
    }

    pub fn to_i32(&self) -> i32 {
        self.to_i64() as i32
    }

    pub fn to_i16(&self) -> i16 {
        self.to_i64() as i16
    }

    pub fn to_i8(&self) -> i8 {
        self.to_i64() as i8
    }

    /// The integer part bits as a `u64` (two's-complement truncation).
    pub fn to_u64(&self) -> u64 {
        self.to_i64() as u64
    }

    pub fn to_u32(&self) -> u32 {
        self.to_i64() as u32
    }

    /// Export to `f32` by error-free summation of powers of two, anchored
    /// at the normal or subnormal end of the target format.
    pub fn to_f32(&self) -> f32 {
        let () = Self::F32_EXPORT_OK;
        let mut multiplier: f32 = if RBITS > 126 {
            // 2^-149, the smallest positive f32 subnormal
            let mut m = f32::from_bits(1);
            for _ in 0..(149 - RBITS) {
                m *= 2.0;
            }
            m
        } else {
            // 2^-126, the smallest positive f32 normal
            let mut m = f32::MIN_POSITIVE;
            for _ in 0..(126 - RBITS) {
                m *= 2.0;
            }
            m
        };
        let raw = self.bits.magnitude();
        let mut value = 0.0f32;
        for i in 0..NBITS as usize {
            if raw.bit(i) {
                value += multiplier;
            }
            multiplier *= 2.0;
        }
        if self.sign() {
            -value
        } else {
            value
        }
    }

    /// Export to `f64` by error-free summation of powers of two, anchored
    /// at the normal or subnormal end of the target format.
    pub fn to_f64(&self) -> f64 {
        let () = Self::F64_EXPORT_OK;
        let mut multiplier: f64 = if RBITS > 1022 {
            // 2^-1074, the smallest positive f64 subnormal
            let mut m = f64::from_bits(1);
            for _ in 0..(1074 - RBITS) {
                m *= 2.0;
            }
            m
        } else {
            // 2^-1022, the smallest positive f64 normal
            let mut m = f64::MIN_POSITIVE;
            for _ in 0..(1022 - RBITS) {
                m *= 2.0;
            }
            m
        };
        let raw = self.bits.magnitude();
        let mut value = 0.0f64;
        for i in 0..NBITS as usize {
            if raw.bit(i) {
                value += multiplier;
            }
            multiplier *= 2.0;
        }
        if self.sign() {
            -value
        } else {
            value
        }
    }

    // ========================================================================
    // rust_decimal boundary conversions
    // ========================================================================

    /// Convert from `rust_decimal::Decimal`, intended for API boundaries
    /// (parsing user input). Routed through the literal parser, so range
    /// overflow follows the active overflow policy.
    ///
    /// # Errors
    /// `ParseFailure` when the rendered decimal is not a parseable literal.
    pub fn from_decimal(d: rust_decimal::Decimal) -> FixedPointResult<Self> {
        crate::format::parse(&d.to_string())
    }

    /// Convert to `rust_decimal::Decimal`, intended for display/debugging
    /// only.
    ///
    /// # Errors
    /// `UnsupportedConversion` when the exact decimal expansion exceeds
    /// what `rust_decimal` can carry (28 significant digits).
    pub fn to_decimal(&self) -> FixedPointResult<rust_decimal::Decimal> {
        use std::str::FromStr;
        rust_decimal::Decimal::from_str(&crate::format::to_decimal_string(self))
            .map_err(|_| FixedPointError::UnsupportedConversion)
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Default
    for FixedPoint<NBITS, RBITS, POLICY>
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> PartialEq
    for FixedPoint<NBITS, RBITS, POLICY>
{
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // precondition: no stray bits above NBITS, guaranteed by every
        // construction and arithmetic path
        self.bits == other.bits
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Eq
    for FixedPoint<NBITS, RBITS, POLICY>
{
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> PartialOrd
    for FixedPoint<NBITS, RBITS, POLICY>
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Ord
    for FixedPoint<NBITS, RBITS, POLICY>
{
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.bits.cmp_signed(&other.bits)
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Hash
    for FixedPoint<NBITS, RBITS, POLICY>
{
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> fmt::Debug
    for FixedPoint<NBITS, RBITS, POLICY>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FixedPoint<{},{}>({}, raw={})",
            NBITS,
            RBITS,
            self,
            crate::format::to_binary(self)
        )
    }
}

// ============================================================================
// Construction From Native Types
// ============================================================================

macro_rules! impl_from_signed_int {
    ($($t:ty),* $(,)?) => {$(
        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> From<$t>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            #[inline]
            fn from(value: $t) -> Self {
                Self::from_signed(value as i64)
            }
        }
    )*};
}

macro_rules! impl_from_unsigned_int {
    ($($t:ty),* $(,)?) => {$(
        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> From<$t>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            #[inline]
            fn from(value: $t) -> Self {
                Self::from_unsigned(value as u64)
            }
        }
    )*};
}

impl_from_signed_int!(i8, i16, i32, i64, isize);
impl_from_unsigned_int!(u8, u16, u32, u64, usize);

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> From<f32>
    for FixedPoint<NBITS, RBITS, POLICY>
{
    #[inline]
    fn from(value: f32) -> Self {
        Self::from_f32(value)
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> From<f64>
    for FixedPoint<NBITS, RBITS, POLICY>
{
    #[inline]
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

// ============================================================================
// Unary Operators
// ============================================================================

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Neg
    for FixedPoint<NBITS, RBITS, POLICY>
{
    type Output = Self;

    #[inline]
    fn neg(mut self) -> Self::Output {
        self.twos_complement();
        self
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Neg
    for &FixedPoint<NBITS, RBITS, POLICY>
{
    type Output = FixedPoint<NBITS, RBITS, POLICY>;

    #[inline]
    fn neg(self) -> Self::Output {
        -self.clone()
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Not
    for FixedPoint<NBITS, RBITS, POLICY>
{
    type Output = Self;

    /// One's complement of the bit pattern.
    #[inline]
    fn not(mut self) -> Self::Output {
        self.flip();
        self
    }
}

// ============================================================================
// Binary Arithmetic Operators
// ============================================================================
// Infallible Add/Sub/Mul for ergonomics; Div/Rem panic on a zero divisor —
// use checked_div/checked_rem in production.

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $impl_fn:ident) => {
        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> $assign_trait<&Self>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            #[inline]
            fn $assign_method(&mut self, rhs: &Self) {
                self.$impl_fn(rhs);
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> $assign_trait
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            #[inline]
            fn $assign_method(&mut self, rhs: Self) {
                self.$impl_fn(&rhs);
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> $trait
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            type Output = Self;

            #[inline]
            fn $method(mut self, rhs: Self) -> Self::Output {
                self.$impl_fn(&rhs);
                self
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> $trait
            for &FixedPoint<NBITS, RBITS, POLICY>
        {
            type Output = FixedPoint<NBITS, RBITS, POLICY>;

            #[inline]
            fn $method(self, rhs: Self) -> Self::Output {
                let mut out = self.clone();
                out.$impl_fn(rhs);
                out
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, add_impl);
impl_binary_op!(Sub, sub, SubAssign, sub_assign, sub_impl);
impl_binary_op!(Mul, mul, MulAssign, mul_assign, mul_impl);

macro_rules! impl_fallible_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident,
     $impl_fn:ident, $msg:literal) => {
        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> $assign_trait<&Self>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            #[inline]
            fn $assign_method(&mut self, rhs: &Self) {
                self.$impl_fn(rhs).expect($msg);
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> $assign_trait
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            #[inline]
            fn $assign_method(&mut self, rhs: Self) {
                self.$impl_fn(&rhs).expect($msg);
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> $trait
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            type Output = Self;

            #[inline]
            fn $method(mut self, rhs: Self) -> Self::Output {
                self.$impl_fn(&rhs).expect($msg);
                self
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> $trait
            for &FixedPoint<NBITS, RBITS, POLICY>
        {
            type Output = FixedPoint<NBITS, RBITS, POLICY>;

            #[inline]
            fn $method(self, rhs: Self) -> Self::Output {
                let mut out = self.clone();
                out.$impl_fn(rhs).expect($msg);
                out
            }
        }
    };
}

impl_fallible_binary_op!(Div, div, DivAssign, div_assign, div_impl, "FixedPoint division by zero");
impl_fallible_binary_op!(Rem, rem, RemAssign, rem_assign, rem_impl, "FixedPoint remainder by zero");

// ============================================================================
// Shift Operators
// ============================================================================
// Raw bit shifts on the underlying storage: left is logical, right is
// arithmetic. No rounding. A negative amount shifts the other way.

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> ShlAssign<i32>
    for FixedPoint<NBITS, RBITS, POLICY>
{
    fn shl_assign(&mut self, shift: i32) {
        if shift < 0 {
            self.bits.shr_assign(shift.unsigned_abs() as usize);
        } else {
            self.bits.shl_assign(shift as usize);
        }
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> ShrAssign<i32>
    for FixedPoint<NBITS, RBITS, POLICY>
{
    fn shr_assign(&mut self, shift: i32) {
        if shift < 0 {
            self.bits.shl_assign(shift.unsigned_abs() as usize);
        } else {
            self.bits.shr_assign(shift as usize);
        }
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Shl<i32>
    for FixedPoint<NBITS, RBITS, POLICY>
{
    type Output = Self;

    fn shl(mut self, shift: i32) -> Self::Output {
        self <<= shift;
        self
    }
}

impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Shr<i32>
    for FixedPoint<NBITS, RBITS, POLICY>
{
    type Output = Self;

    fn shr(mut self, shift: i32) -> Self::Output {
        self >>= shift;
        self
    }
}

// ============================================================================
// Literal Operators
// ============================================================================
// Comparisons and arithmetic against native literals on either side; the
// literal is converted through the matching From impl first, so float
// literals compare at the fixed-point's own resolution.

macro_rules! impl_literal_cmp {
    ($($t:ty),* $(,)?) => {$(
        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> PartialEq<$t>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            #[inline]
            fn eq(&self, other: &$t) -> bool {
                *self == Self::from(*other)
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool>
            PartialEq<FixedPoint<NBITS, RBITS, POLICY>> for $t
        {
            #[inline]
            fn eq(&self, other: &FixedPoint<NBITS, RBITS, POLICY>) -> bool {
                FixedPoint::<NBITS, RBITS, POLICY>::from(*self) == *other
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> PartialOrd<$t>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            #[inline]
            fn partial_cmp(&self, other: &$t) -> Option<Ordering> {
                Some(self.cmp(&Self::from(*other)))
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool>
            PartialOrd<FixedPoint<NBITS, RBITS, POLICY>> for $t
        {
            #[inline]
            fn partial_cmp(&self, other: &FixedPoint<NBITS, RBITS, POLICY>) -> Option<Ordering> {
                Some(FixedPoint::<NBITS, RBITS, POLICY>::from(*self).cmp(other))
            }
        }
    )*};
}

impl_literal_cmp!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

macro_rules! impl_literal_arith {
    ($($t:ty),* $(,)?) => {$(
        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Add<$t>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            type Output = Self;

            #[inline]
            fn add(self, rhs: $t) -> Self::Output {
                self + Self::from(rhs)
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool>
            Add<FixedPoint<NBITS, RBITS, POLICY>> for $t
        {
            type Output = FixedPoint<NBITS, RBITS, POLICY>;

            #[inline]
            fn add(self, rhs: FixedPoint<NBITS, RBITS, POLICY>) -> Self::Output {
                FixedPoint::<NBITS, RBITS, POLICY>::from(self) + rhs
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Sub<$t>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: $t) -> Self::Output {
                self - Self::from(rhs)
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool>
            Sub<FixedPoint<NBITS, RBITS, POLICY>> for $t
        {
            type Output = FixedPoint<NBITS, RBITS, POLICY>;

            #[inline]
            fn sub(self, rhs: FixedPoint<NBITS, RBITS, POLICY>) -> Self::Output {
                FixedPoint::<NBITS, RBITS, POLICY>::from(self) - rhs
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Mul<$t>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: $t) -> Self::Output {
                self * Self::from(rhs)
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool>
            Mul<FixedPoint<NBITS, RBITS, POLICY>> for $t
        {
            type Output = FixedPoint<NBITS, RBITS, POLICY>;

            #[inline]
            fn mul(self, rhs: FixedPoint<NBITS, RBITS, POLICY>) -> Self::Output {
                FixedPoint::<NBITS, RBITS, POLICY>::from(self) * rhs
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Div<$t>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            type Output = Self;

            #[inline]
            fn div(self, rhs: $t) -> Self::Output {
                self / Self::from(rhs)
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool>
            Div<FixedPoint<NBITS, RBITS, POLICY>> for $t
        {
            type Output = FixedPoint<NBITS, RBITS, POLICY>;

            #[inline]
            fn div(self, rhs: FixedPoint<NBITS, RBITS, POLICY>) -> Self::Output {
                FixedPoint::<NBITS, RBITS, POLICY>::from(self) / rhs
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> Rem<$t>
            for FixedPoint<NBITS, RBITS, POLICY>
        {
            type Output = Self;

            #[inline]
            fn rem(self, rhs: $t) -> Self::Output {
                self % Self::from(rhs)
            }
        }

        impl<const NBITS: u32, const RBITS: u32, const POLICY: bool>
            Rem<FixedPoint<NBITS, RBITS, POLICY>> for $t
        {
            type Output = FixedPoint<NBITS, RBITS, POLICY>;

            #[inline]
            fn rem(self, rhs: FixedPoint<NBITS, RBITS, POLICY>) -> Self::Output {
                FixedPoint::<NBITS, RBITS, POLICY>::from(self) % rhs
            }
        }
    )*};
}

impl_literal_arith!(i32, i64, u32, u64, f64);

// ============================================================================
// Serde (optional, through the decimal string form)
// ============================================================================

#[cfg(feature = "serde")]
impl<const NBITS: u32, const RBITS: u32, const POLICY: bool> serde::Serialize
    for FixedPoint<NBITS, RBITS, POLICY>
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::format::to_decimal_string(self))
    }
}

#[cfg(feature = "serde")]
impl<'de, const NBITS: u32, const RBITS: u32, const POLICY: bool> serde::Deserialize<'de>
    for FixedPoint<NBITS, RBITS, POLICY>
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        crate::format::parse(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================
