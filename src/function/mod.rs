//! Stateless arithmetic functions.
//!
//! A function is invoked once per request: it resolves two integer operands
//! from a [`FunctionRequest`], applies its [`Operation`] and yields either an
//! [`Evaluation`] or a [`FunctionError`](crate::core::FunctionError). Both
//! render to the plain string sent back to the client. Nothing is kept
//! between invocations.

mod operand;
mod operation;

use http::StatusCode;

use crate::core::FunctionResult;

pub use operand::{FunctionRequest, OperandPair, OperandSource, NUM1, NUM2};
pub use operation::{format_float, Evaluation, Operation, ZERO_PRODUCT_MESSAGE};

/// Run `operation` against one request.
pub fn invoke(operation: Operation, request: &FunctionRequest) -> FunctionResult<Evaluation> {
    let pair = OperandPair::resolve(request)?;
    operation.evaluate(pair)
}

/// Final status and body of one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn from_result(result: FunctionResult<Evaluation>) -> Self {
        match result {
            Ok(eval) => Self {
                status: StatusCode::OK,
                body: eval.to_string(),
            },
            Err(e) => Self {
                status: e.status(),
                body: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MISSING_OPERAND_MESSAGE;
    use serde_json::json;

    fn json_request(value: serde_json::Value) -> FunctionRequest {
        let body = serde_json::to_vec(&value).unwrap();
        FunctionRequest::from_parts(Some("application/json"), &body, None).unwrap()
    }

    fn query_request(query: &str) -> FunctionRequest {
        FunctionRequest::from_parts(None, b"", Some(query)).unwrap()
    }

    fn reply(operation: Operation, request: &FunctionRequest) -> Reply {
        Reply::from_result(invoke(operation, request))
    }

    #[test]
    fn test_divide_json() {
        let r = reply(Operation::Divide, &json_request(json!({"num1": 10, "num2": 2})));
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.body, "10 / 2 = 5.0");
    }

    #[test]
    fn test_divide_query_by_zero() {
        let r = reply(Operation::Divide, &query_request("num1=5&num2=0"));
        assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(r.body, "I'm sorry, Dave, I can't let you divide by zero");
    }

    #[test]
    fn test_divide_query_converts_operands() {
        let r = reply(Operation::Divide, &query_request("num1=9&num2=3"));
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.body, "9 / 3 = 3.0");
    }

    #[test]
    fn test_multiply_query() {
        let r = reply(Operation::Multiply, &query_request("num1=3&num2=4"));
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.body, "3 * 4 = 12");
    }

    #[test]
    fn test_multiply_query_zero() {
        let r = reply(Operation::Multiply, &query_request("num1=0&num2=5"));
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.body, "You multiplied be zero. The answer is 0.");
    }

    #[test]
    fn test_missing_operand_both_endpoints() {
        for op in [Operation::Divide, Operation::Multiply] {
            for req in [
                query_request("num1=1"),
                query_request("num2=1"),
                query_request(""),
                json_request(json!({"num1": 4})),
            ] {
                let r = reply(op, &req);
                assert_eq!(r.status, StatusCode::BAD_REQUEST);
                assert_eq!(r.body, MISSING_OPERAND_MESSAGE);
            }
        }
    }

    #[test]
    fn test_non_numeric_operand_is_client_error() {
        for op in [Operation::Divide, Operation::Multiply] {
            let r = reply(op, &query_request("num1=abc&num2=2"));
            assert_eq!(r.status, StatusCode::BAD_REQUEST);
            assert!(r.body.contains("num1"));
        }
    }

    #[test]
    fn test_invocation_is_idempotent() {
        let req = query_request("num1=22&num2=7");
        for op in [Operation::Divide, Operation::Multiply] {
            assert_eq!(reply(op, &req), reply(op, &req));
        }
    }

    #[test]
    fn test_divide_matches_float_division() {
        for (a, b) in [(1_i64, 7_i64), (-100, 3), (123_456, -789), (i64::MAX, 2)] {
            let r = reply(
                Operation::Divide,
                &query_request(&format!("num1={a}&num2={b}")),
            );
            let expected = format!("{a} / {b} = {}", format_float(a as f64 / b as f64));
            assert_eq!(r.body, expected);
        }
    }

    #[test]
    fn test_multiply_matches_integer_product() {
        for (a, b) in [(2_i64, 21_i64), (-6, -7), (1_000_000, 1_000_000)] {
            let r = reply(
                Operation::Multiply,
                &query_request(&format!("num1={a}&num2={b}")),
            );
            assert_eq!(r.body, format!("{a} * {b} = {}", a * b));
        }
    }
}
