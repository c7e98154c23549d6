// ============================================================================
// Fixed-Point Errors
// Error types for binary fixed-point operations
// ============================================================================

use std::fmt;

/// Errors that can occur during fixed-point operations.
///
/// Arithmetic overflow is deliberately absent: overflow is resolved by the
/// configured overflow policy (wraparound or clamp) and never surfaced as a
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedPointError {
    /// Bit index at or beyond the total width
    OutOfBounds,
    /// Attempted division by zero
    DivideByZero,
    /// Width conversion that would have to discard significant bits
    UnsupportedConversion,
    /// Input string is not a recognized literal form
    ParseFailure,
}

impl fmt::Display for FixedPointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixedPointError::OutOfBounds => {
                write!(f, "bit index out of bounds: index exceeds total width")
            },
            FixedPointError::DivideByZero => write!(f, "division by zero"),
            FixedPointError::UnsupportedConversion => write!(
                f,
                "unsupported conversion: narrowing would discard significant bits"
            ),
            FixedPointError::ParseFailure => write!(f, "parse failure: unrecognized literal"),
        }
    }
}

impl std::error::Error for FixedPointError {}

/// Result type alias for fixed-point operations
pub type FixedPointResult<T> = Result<T, FixedPointError>;
