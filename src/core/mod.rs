//! Shared error type and process-wide readiness state.

pub mod error;
pub mod status;

pub use error::{
    FunctionError, FunctionResult, DIVIDE_BY_ZERO_MESSAGE, MISSING_OPERAND_MESSAGE,
};
