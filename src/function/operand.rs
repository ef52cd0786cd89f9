use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::core::{FunctionError, FunctionResult};
use crate::utils::request::{is_json_content_type, parse_query_args};

pub const NUM1: &str = "num1";
pub const NUM2: &str = "num2";

/// The materialized request a function is invoked with.
///
/// Holds both operand sources. Only one of them is ever consulted: the JSON
/// object when it is present and non-empty, the query arguments otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionRequest {
    json: Option<Map<String, JsonValue>>,
    args: HashMap<String, String>,
}

/// Which part of the request operands were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSource {
    Json,
    Query,
}

impl FunctionRequest {
    pub fn new(json: Option<Map<String, JsonValue>>, args: HashMap<String, String>) -> Self {
        Self { json, args }
    }

    /// Build a request from raw HTTP parts.
    ///
    /// The body is only interpreted when the content type says it is JSON;
    /// other bodies are ignored. A JSON body that does not parse, or that is
    /// a non-empty value other than an object, is rejected.
    pub fn from_parts(
        content_type: Option<&str>,
        body: &[u8],
        query: Option<&str>,
    ) -> FunctionResult<Self> {
        let json = match content_type {
            Some(ct) if is_json_content_type(ct) && !body.is_empty() => {
                let value: JsonValue = serde_json::from_slice(body)
                    .map_err(|e| FunctionError::MalformedBody(e.to_string()))?;
                json_object(value)?
            }
            _ => None,
        };

        let args = match query {
            Some(q) => parse_query_args(q)?,
            None => HashMap::new(),
        };

        Ok(Self::new(json, args))
    }

    pub fn source(&self) -> OperandSource {
        match &self.json {
            Some(map) if !map.is_empty() => OperandSource::Json,
            _ => OperandSource::Query,
        }
    }

    fn lookup(&self, name: &str) -> Option<RawOperand<'_>> {
        match self.source() {
            OperandSource::Json => match self.json.as_ref()?.get(name)? {
                JsonValue::Null => None,
                value => Some(RawOperand::Json(value)),
            },
            OperandSource::Query => self.args.get(name).map(|v| RawOperand::Text(v.as_str())),
        }
    }
}

/// Keep a JSON body only if it is a non-empty object.
///
/// Empty values (`null`, `false`, `0`, `""`, `[]`, `{}`) count as no body at
/// all so the query string is used instead.
fn json_object(value: JsonValue) -> FunctionResult<Option<Map<String, JsonValue>>> {
    match value {
        JsonValue::Object(map) if map.is_empty() => Ok(None),
        JsonValue::Object(map) => Ok(Some(map)),
        JsonValue::Null | JsonValue::Bool(false) => Ok(None),
        JsonValue::Number(ref n) if n.as_f64() == Some(0.0) => Ok(None),
        JsonValue::String(ref s) if s.is_empty() => Ok(None),
        JsonValue::Array(ref a) if a.is_empty() => Ok(None),
        _ => Err(FunctionError::MalformedBody(
            "expected a JSON object".to_string(),
        )),
    }
}

enum RawOperand<'a> {
    Json(&'a JsonValue),
    Text(&'a str),
}

/// The two integer operands of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandPair {
    pub num1: i64,
    pub num2: i64,
}

impl OperandPair {
    pub fn new(num1: i64, num2: i64) -> Self {
        Self { num1, num2 }
    }

    /// Resolve and coerce both operands.
    ///
    /// Absence of either operand is reported before any coercion failure, so
    /// `num1=abc` with no `num2` still yields [`FunctionError::MissingOperand`].
    pub fn resolve(request: &FunctionRequest) -> FunctionResult<Self> {
        log::debug!("Reading operands from {:?}", request.source());

        let (Some(raw1), Some(raw2)) = (request.lookup(NUM1), request.lookup(NUM2)) else {
            return Err(FunctionError::MissingOperand);
        };

        Ok(Self::new(coerce(NUM1, raw1)?, coerce(NUM2, raw2)?))
    }
}

fn coerce(name: &str, raw: RawOperand<'_>) -> FunctionResult<i64> {
    match raw {
        RawOperand::Text(text) => parse_integer_text(name, text),
        RawOperand::Json(JsonValue::String(text)) => parse_integer_text(name, text),
        RawOperand::Json(JsonValue::Bool(b)) => Ok(i64::from(*b)),
        RawOperand::Json(JsonValue::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            // u64 above i64::MAX falls through to the float check and fails there
            match n.as_f64().map(f64::trunc) {
                Some(f) if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(FunctionError::malformed_operand(name, n.to_string())),
            }
        }
        RawOperand::Json(other) => Err(FunctionError::malformed_operand(name, other.to_string())),
    }
}

fn parse_integer_text(name: &str, text: &str) -> FunctionResult<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| FunctionError::malformed_operand(name, text))
}
