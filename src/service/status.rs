use async_trait::async_trait;
use http::{Response, StatusCode};
use pingora::{
    apps::http_app::ServeHttp, protocols::http::ServerSession, services::listening::Service,
};
use serde::Serialize;

use crate::config::Status;
use crate::core::status;
use crate::service::metrics;
use crate::utils::response::{CommonErrors, ResponseBuilder};

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4";

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Readiness probe and metrics exposition, kept off the function listeners.
///
/// - `GET /status/ready`: 200 `{"status":"ok"}` once functions are loaded,
///   503 otherwise
/// - `GET /metrics`: Prometheus text format
pub struct StatusHttpApp {
    config: Status,
}

impl StatusHttpApp {
    pub fn new(cfg: &Status) -> Self {
        Self {
            config: cfg.clone(),
        }
    }

    pub fn status_http_service(cfg: &Status) -> Service<Self> {
        let app = Self::new(cfg);
        let addr = &app.config.address.to_string();
        let mut service = Service::new("Status HTTP".to_string(), app);
        service.add_tcp(addr);
        service
    }

    fn route(&self, path: &str) -> Response<Vec<u8>> {
        match path {
            "/status/ready" => handle_ready_endpoint(),
            "/metrics" => handle_metrics_endpoint(),
            _ => CommonErrors::not_found(),
        }
    }
}

#[async_trait]
impl ServeHttp for StatusHttpApp {
    async fn response(&self, http_session: &mut ServerSession) -> Response<Vec<u8>> {
        http_session.set_keepalive(None);
        let path = http_session.req_header().uri.path().to_string();
        self.route(&path)
    }
}

fn handle_ready_endpoint() -> Response<Vec<u8>> {
    if status::is_ready() {
        let response = StatusResponse {
            status: "ok".to_string(),
            error: None,
        };
        ResponseBuilder::json(StatusCode::OK, &response)
    } else {
        let response = StatusResponse {
            status: "error".to_string(),
            error: Some("Functions not loaded yet".to_string()),
        };
        ResponseBuilder::json(StatusCode::SERVICE_UNAVAILABLE, &response)
    }
}

fn handle_metrics_endpoint() -> Response<Vec<u8>> {
    match metrics::render() {
        Ok(body) => ResponseBuilder::http(StatusCode::OK, body, Some(PROMETHEUS_TEXT)),
        Err(e) => {
            log::error!("Failed to encode metrics: {e}");
            ResponseBuilder::text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}
