//! Error types for fixed-point operations.

use std::fmt;

/// Result type for fixed-point operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during fixed-point arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Division where the divisor is exactly zero.
    DivideByZero,

    /// The exact result does not fit in a 16.16 value.
    Overflow {
        /// The widened raw result that was out of range.
        wide: i64,
    },
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivideByZero => write!(f, "fixed-point division by zero"),
            Self::Overflow { wide } => {
                write!(f, "fixed-point overflow: raw result {wide} exceeds 32 bits")
            }
        }
    }
}

impl std::error::Error for MathError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_divide_by_zero() {
        let msg = MathError::DivideByZero.to_string();
        assert!(msg.contains("division by zero"));
    }

    #[test]
    fn error_display_overflow() {
        let err = MathError::Overflow {
            wide: 1 << 40,
        };
        let msg = err.to_string();
        assert!(msg.contains("overflow"));
        assert!(msg.contains(&(1i64 << 40).to_string()));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<MathError>();
    }
}
