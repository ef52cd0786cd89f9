use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use http::{header, Method, Response};
use matchit::Router;
use pingora::{
    apps::http_app::ServeHttp, protocols::http::ServerSession, services::listening::Service,
};
use pingora_core::listeners::tls::TlsSettings;
use pingora_error::{ErrorType::InternalError, OrErr, Result};

use crate::config::{self, Config, Tls};
use crate::core::{FunctionError, FunctionResult};
use crate::function::{invoke, FunctionRequest, Reply};
use crate::service::metrics;
use crate::utils::request::{get_client_addr, get_req_header_value};
use crate::utils::response::{CommonErrors, ResponseBuilder};

const UNMATCHED: &str = "unmatched";

/// HTTP host for the configured arithmetic functions.
///
/// Each request path is matched to one [`config::Function`]; the request body
/// and query are materialized and the function is invoked exactly once.
pub struct FunctionHttpApp {
    router: Router<Arc<config::Function>>,
    functions: usize,
    max_body_size: usize,
}

impl FunctionHttpApp {
    pub fn new(config: &Config) -> Result<Self> {
        let mut router = Router::new();
        for function in config.functions.iter() {
            log::info!(
                "Configuring function: {} ({} at {})",
                function.id,
                function.operation,
                function.uri
            );
            router
                .insert(function.uri.clone(), Arc::new(function.clone()))
                .or_err_with(InternalError, || {
                    format!("Unable to register function {}", function.id)
                })?;
        }

        Ok(Self {
            router,
            functions: config.functions.len(),
            max_body_size: config.max_body_size,
        })
    }

    /// Build the listening service with every configured listener attached.
    pub fn function_http_service(config: &Config) -> Result<Service<Self>> {
        let app = Self::new(config)?;
        let mut service = Service::new("Function HTTP".to_string(), app);

        for listener in config.listeners.iter() {
            let addr = listener.address.to_string();
            match &listener.tls {
                Some(Tls {
                    cert_path,
                    key_path,
                }) => {
                    let mut settings = TlsSettings::intermediate(cert_path, key_path)?;
                    if listener.offer_h2 {
                        settings.enable_h2();
                    }
                    log::info!("Adding TLS listener on {addr}");
                    service.add_tls_with_settings(&addr, None, settings);
                }
                None => {
                    log::info!("Adding TCP listener on {addr}");
                    service.add_tcp(&addr);
                }
            }
        }

        Ok(service)
    }

    pub fn function_count(&self) -> usize {
        self.functions
    }

    /// Match a request to a function, or produce the 404/405 response.
    #[allow(clippy::result_large_err)]
    pub fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> std::result::Result<Arc<config::Function>, Response<Vec<u8>>> {
        let function = match self.router.at(path) {
            Ok(matched) => matched.value.clone(),
            Err(_) => return Err(CommonErrors::not_found()),
        };

        if !function.allows(method) {
            return Err(CommonErrors::method_not_allowed());
        }

        Ok(function)
    }

    /// Invoke a function on already materialized request parts.
    pub fn dispatch(
        function: &config::Function,
        content_type: Option<&str>,
        body: &[u8],
        query: Option<&str>,
    ) -> Reply {
        let result = FunctionRequest::from_parts(content_type, body, query)
            .and_then(|request| invoke(function.operation, &request));

        if let Err(e) = &result {
            log::debug!("Function {} rejected request: {e}", function.id);
        }

        Reply::from_result(result)
    }
}

#[async_trait]
impl ServeHttp for FunctionHttpApp {
    async fn response(&self, http_session: &mut ServerSession) -> Response<Vec<u8>> {
        let start = Instant::now();

        let (method, path, query, content_type) = {
            let req_header = http_session.req_header();
            (
                req_header.method.clone(),
                req_header.uri.path().to_string(),
                req_header.uri.query().map(str::to_string),
                get_req_header_value(req_header, header::CONTENT_TYPE.as_str())
                    .map(str::to_string),
            )
        };

        let function = match self.lookup(&method, &path) {
            Ok(function) => function,
            Err(resp) => {
                http_session.set_keepalive(None);
                metrics::observe(UNMATCHED, resp.status().as_u16(), start.elapsed());
                log::info!(
                    "{} {method} {path} -> {}",
                    get_client_addr(http_session),
                    resp.status().as_u16()
                );
                return resp;
            }
        };

        let reply = match read_request_body(http_session, self.max_body_size).await {
            Ok(body) => {
                Self::dispatch(&function, content_type.as_deref(), &body, query.as_deref())
            }
            Err(e) => {
                http_session.set_keepalive(None);
                Reply::from_result(Err(e))
            }
        };

        metrics::observe(&function.id, reply.status.as_u16(), start.elapsed());
        log::info!(
            "{} {method} {path} -> {} {} in {:?}",
            get_client_addr(http_session),
            function.id,
            reply.status.as_u16(),
            start.elapsed()
        );

        ResponseBuilder::reply(&reply)
    }
}

async fn read_request_body(
    http_session: &mut ServerSession,
    limit: usize,
) -> FunctionResult<Vec<u8>> {
    let mut body_data = Vec::new();
    loop {
        match http_session.read_request_body().await {
            Ok(Some(bytes)) => append_chunk(&mut body_data, &bytes, limit)?,
            Ok(None) => break,
            Err(e) => {
                log::warn!("Failed to read request body: {e}");
                return Err(FunctionError::MalformedBody(
                    "unable to read request body".to_string(),
                ));
            }
        }
    }
    Ok(body_data)
}

/// Append one body chunk, refusing to grow past `limit` bytes in total.
fn append_chunk(buf: &mut Vec<u8>, chunk: &[u8], limit: usize) -> FunctionResult<()> {
    if buf.len() + chunk.len() > limit {
        return Err(FunctionError::BodyTooLarge(limit));
    }
    buf.extend_from_slice(chunk);
    Ok(())
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::core::MISSING_OPERAND_MESSAGE;

    fn test_config() -> Config {
        Config::from_yaml(
            r#"
listeners:
  - address: 127.0.0.1:8080
functions:
  - id: divide
    uri: /divide
    operation: divide
  - id: multiply
    uri: /multiply
    operation: multiply
    methods: [GET, POST]
  - id: calc
    uri: /calc
    operation: calc
        "#,
        )
        .unwrap()
    }

    fn call(app: &FunctionHttpApp, method: Method, path: &str, query: Option<&str>) -> Reply {
        let function = app.lookup(&method, path).unwrap();
        FunctionHttpApp::dispatch(&function, None, b"", query)
    }

    #[test]
    fn test_routes_registered() {
        let app = FunctionHttpApp::new(&test_config()).unwrap();
        assert_eq!(app.function_count(), 3);
        assert_eq!(app.lookup(&Method::GET, "/divide").unwrap().id, "divide");
        assert_eq!(app.lookup(&Method::GET, "/calc").unwrap().id, "calc");
    }

    #[test]
    fn test_unknown_path() {
        let app = FunctionHttpApp::new(&test_config()).unwrap();
        let resp = app.lookup(&Method::GET, "/subtract").unwrap_err();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_method_not_allowed() {
        let app = FunctionHttpApp::new(&test_config()).unwrap();
        let resp = app.lookup(&Method::DELETE, "/multiply").unwrap_err();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        // no method list means any method
        assert!(app.lookup(&Method::DELETE, "/divide").is_ok());
    }

    #[test]
    fn test_dispatch_examples() {
        let app = FunctionHttpApp::new(&test_config()).unwrap();

        let function = app.lookup(&Method::POST, "/divide").unwrap();
        let reply = FunctionHttpApp::dispatch(
            &function,
            Some("application/json"),
            br#"{"num1": 10, "num2": 2}"#,
            None,
        );
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, "10 / 2 = 5.0");

        let reply = call(&app, Method::GET, "/multiply", Some("num1=3&num2=4"));
        assert_eq!(reply.body, "3 * 4 = 12");

        let reply = call(&app, Method::GET, "/multiply", Some("num1=0&num2=5"));
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, "You multiplied be zero. The answer is 0.");

        let reply = call(&app, Method::GET, "/divide", Some("num1=5&num2=0"));
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.body, "I'm sorry, Dave, I can't let you divide by zero");
    }

    #[test]
    fn test_calc_alias_matches_multiply() {
        let app = FunctionHttpApp::new(&test_config()).unwrap();
        for query in ["num1=6&num2=7", "num1=0&num2=7", "num1=x&num2=7", "num2=7"] {
            assert_eq!(
                call(&app, Method::GET, "/calc", Some(query)),
                call(&app, Method::GET, "/multiply", Some(query))
            );
        }
    }

    #[test]
    fn test_dispatch_client_errors() {
        let app = FunctionHttpApp::new(&test_config()).unwrap();

        let reply = call(&app, Method::GET, "/divide", None);
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body, MISSING_OPERAND_MESSAGE);

        let reply = call(&app, Method::GET, "/divide", Some("num1=abc&num2=2"));
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);

        let function = app.lookup(&Method::POST, "/divide").unwrap();
        let reply =
            FunctionHttpApp::dispatch(&function, Some("application/json"), b"{not json", None);
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_body_limit_boundary() {
        let mut body = Vec::new();
        append_chunk(&mut body, &[b'1'; 8], 8).unwrap();
        assert_eq!(body.len(), 8);

        let mut body = Vec::new();
        let err = append_chunk(&mut body, &[b'1'; 9], 8).unwrap_err();
        assert_eq!(err, FunctionError::BodyTooLarge(8));
        assert!(body.is_empty());
    }

    #[test]
    fn test_body_limit_across_chunks() {
        let mut body = Vec::new();
        append_chunk(&mut body, br#"{"num1": "#, 16).unwrap();
        append_chunk(&mut body, b"10, ", 16).unwrap();
        assert_eq!(body.len(), 13);
        append_chunk(&mut body, b"", 16).unwrap();
        append_chunk(&mut body, b"123", 16).unwrap();
        assert_eq!(body.len(), 16);

        let err = append_chunk(&mut body, b"}", 16).unwrap_err();
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body.len(), 16);
    }
}
