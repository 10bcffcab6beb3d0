//! Error types for fixed-point operations

use thiserror::Error;

/// Failure of a fixed-point operation.
///
/// Arithmetic overflow is never an error: the safe operations saturate. Only
/// domain violations and malformed input fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixedError {
    #[error("attempt to divide by zero")]
    DivideByZero,

    #[error("argument out of range: {0}")]
    OutOfRange(&'static str),

    #[error("invalid fixed-point literal: {0:?}")]
    Parse(String),
}
