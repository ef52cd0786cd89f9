use std::collections::HashMap;

use pingora::protocols::http::ServerSession;
use pingora_http::RequestHeader;

use crate::core::{FunctionError, FunctionResult};

/// Decodes a query string into a map of arguments.
///
/// Values are percent-decoded. When a name repeats, the first occurrence wins.
pub fn parse_query_args(query: &str) -> FunctionResult<HashMap<String, String>> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|e| FunctionError::MalformedQuery(e.to_string()))?;

    let mut args = HashMap::with_capacity(pairs.len());
    for (k, v) in pairs {
        args.entry(k).or_insert(v);
    }
    Ok(args)
}

/// Whether a `Content-Type` value denotes JSON (`application/json` or `*/*+json`).
pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.contains('/') && mime.ends_with("+json"))
}

/// Retrieves the value of a specific header from the request.
///
/// Returns `None` if the header is not present or its value is not valid UTF-8.
pub fn get_req_header_value<'a>(req_header: &'a RequestHeader, key: &str) -> Option<&'a str> {
    req_header
        .headers
        .get(key)
        .and_then(|value| value.to_str().ok())
}

/// Gets the peer address of the downstream connection, or an empty string.
pub fn get_client_addr(session: &ServerSession) -> String {
    session
        .client_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_default()
}
