//! Unified error handling for pingcalc functions
//!
//! Every failure a function can hit while resolving its operands or computing
//! its result is one variant of [`FunctionError`]. The `Display` output of a
//! variant is exactly the body sent back to the client, and
//! [`FunctionError::status`] picks the HTTP status for it.

use std::fmt;

use http::StatusCode;

/// Fixed body returned when operand resolution fails entirely.
pub const MISSING_OPERAND_MESSAGE: &str = "Error. At least one number did not resolve.";

/// Fixed body returned for a zero divisor.
pub const DIVIDE_BY_ZERO_MESSAGE: &str = "I'm sorry, Dave, I can't let you divide by zero";

/// Errors produced while handling a single function invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionError {
    /// One or both operands are absent from the chosen source
    MissingOperand,

    /// An operand is present but cannot be coerced to an integer
    MalformedOperand { name: String, value: String },

    /// The request declared a JSON body that could not be used
    MalformedBody(String),

    /// The query string could not be decoded
    MalformedQuery(String),

    /// Divisor is zero (divide only)
    DivideByZero,

    /// Request body exceeded the configured limit
    BodyTooLarge(usize),
}

impl FunctionError {
    pub fn malformed_operand(name: &str, value: impl Into<String>) -> Self {
        FunctionError::MalformedOperand {
            name: name.to_string(),
            value: value.into(),
        }
    }

    /// HTTP status that accompanies this error on the wire.
    pub fn status(&self) -> StatusCode {
        match self {
            FunctionError::MissingOperand
            | FunctionError::MalformedOperand { .. }
            | FunctionError::MalformedBody(_)
            | FunctionError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            FunctionError::DivideByZero => StatusCode::UNPROCESSABLE_ENTITY,
            FunctionError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionError::MissingOperand => f.write_str(MISSING_OPERAND_MESSAGE),
            FunctionError::MalformedOperand { name, value } => {
                write!(f, "Error. {name} is not a valid integer: {value:?}")
            }
            FunctionError::MalformedBody(msg) => write!(f, "Error. Malformed JSON body: {msg}"),
            FunctionError::MalformedQuery(msg) => {
                write!(f, "Error. Malformed query string: {msg}")
            }
            FunctionError::DivideByZero => f.write_str(DIVIDE_BY_ZERO_MESSAGE),
            FunctionError::BodyTooLarge(limit) => {
                write!(f, "Error. Request body exceeds {limit} bytes")
            }
        }
    }
}

impl std::error::Error for FunctionError {}

/// Result type alias for function invocations
pub type FunctionResult<T> = std::result::Result<T, FunctionError>;
