use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{FunctionError, FunctionResult};

use super::OperandPair;

/// Fixed body for a multiplication with a zero operand.
///
/// The "be" typo is part of the public response text and is kept as is.
pub const ZERO_PRODUCT_MESSAGE: &str = "You multiplied be zero. The answer is 0.";

/// Arithmetic operation a function performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Divide,
    /// `calc` is accepted as a legacy name for multiply.
    #[serde(alias = "calc")]
    Multiply,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Divide => "divide",
            Operation::Multiply => "multiply",
        }
    }

    pub fn evaluate(&self, pair: OperandPair) -> FunctionResult<Evaluation> {
        let OperandPair { num1, num2 } = pair;
        match self {
            Operation::Divide => {
                if num2 == 0 {
                    return Err(FunctionError::DivideByZero);
                }
                Ok(Evaluation::Quotient {
                    dividend: num1,
                    divisor: num2,
                    quotient: num1 as f64 / num2 as f64,
                })
            }
            Operation::Multiply => {
                if num1 == 0 || num2 == 0 {
                    return Ok(Evaluation::ZeroProduct);
                }
                Ok(Evaluation::Product {
                    multiplicand: num1,
                    multiplier: num2,
                    product: i128::from(num1) * i128::from(num2),
                })
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful result of a function. Its `Display` is the response body.
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluation {
    Quotient {
        dividend: i64,
        divisor: i64,
        quotient: f64,
    },
    Product {
        multiplicand: i64,
        multiplier: i64,
        product: i128,
    },
    ZeroProduct,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Quotient {
                dividend,
                divisor,
                quotient,
            } => write!(f, "{dividend} / {divisor} = {}", format_float(*quotient)),
            Evaluation::Product {
                multiplicand,
                multiplier,
                product,
            } => write!(f, "{multiplicand} * {multiplier} = {product}"),
            Evaluation::ZeroProduct => f.write_str(ZERO_PRODUCT_MESSAGE),
        }
    }
}

/// Render a float with the shortest digits that round-trip.
///
/// Integral values keep a trailing `.0`; magnitudes below `1e-4` or from
/// `1e16` up switch to exponent form with a signed, two-digit exponent
/// (`1e-05`, `1.5e+16`).
pub fn format_float(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{value:e}");
        if let Some((mantissa, exponent)) = sci.split_once('e') {
            if let Ok(exp) = exponent.parse::<i32>() {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{mantissa}e{sign}{:02}", exp.unsigned_abs());
            }
        }
        return sci;
    }
    format!("{value:?}")
}
