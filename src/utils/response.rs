//! Response building shared by the function host and the status listener.

use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;

use crate::function::Reply;

/// Standard content types
pub mod content_type {
    pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
    pub const APPLICATION_JSON: &str = "application/json";
}

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Build a response with the given status, body and optional content type.
    pub fn http(
        status: StatusCode,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Response<Vec<u8>> {
        let mut builder = Response::builder().status(status);

        if let Some(ct) = content_type {
            match HeaderValue::from_str(ct) {
                Ok(header_value) => {
                    builder = builder.header(header::CONTENT_TYPE, header_value);
                }
                Err(e) => {
                    log::error!("Invalid content type '{ct}': {e}");
                }
            }
        }

        builder.body(body).unwrap_or_else(|e| {
            log::error!("Failed to build response: {e}");
            Self::internal_error()
        })
    }

    /// Plain text response.
    pub fn text(status: StatusCode, message: &str) -> Response<Vec<u8>> {
        Self::http(
            status,
            message.as_bytes().to_vec(),
            Some(content_type::TEXT_PLAIN),
        )
    }

    /// JSON response; serialization failures become a 500.
    pub fn json<T: Serialize>(status: StatusCode, data: &T) -> Response<Vec<u8>> {
        match serde_json::to_vec(data) {
            Ok(body) => Self::http(status, body, Some(content_type::APPLICATION_JSON)),
            Err(e) => {
                log::error!("Failed to serialize JSON response: {e}");
                Self::text(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "JSON serialization failed",
                )
            }
        }
    }

    /// Convert the outcome of a function into a text response.
    pub fn reply(reply: &Reply) -> Response<Vec<u8>> {
        Self::text(reply.status, &reply.body)
    }

    fn internal_error() -> Response<Vec<u8>> {
        let mut resp = Response::new(b"Internal Server Error".to_vec());
        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        resp
    }
}

/// Common error response helpers
pub struct CommonErrors;

impl CommonErrors {
    pub fn not_found() -> Response<Vec<u8>> {
        ResponseBuilder::text(StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn method_not_allowed() -> Response<Vec<u8>> {
        ResponseBuilder::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response() {
        let response = ResponseBuilder::text(StatusCode::OK, "3 * 4 = 12");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), b"3 * 4 = 12");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            content_type::TEXT_PLAIN
        );
    }

    #[test]
    fn test_json_response() {
        use serde_json::json;
        let data = json!({"status": "ok"});
        let response = ResponseBuilder::json(StatusCode::OK, &data);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), br#"{"status":"ok"}"#);
    }

    #[test]
    fn test_reply_response() {
        let reply = Reply {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: "I'm sorry, Dave, I can't let you divide by zero".to_string(),
        };
        let response = ResponseBuilder::reply(&reply);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body(), reply.body.as_bytes());
    }

    #[test]
    fn test_common_errors() {
        assert_eq!(CommonErrors::not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            CommonErrors::method_not_allowed().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
