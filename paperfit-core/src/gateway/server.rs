//! HTTP gateway built on axum.

use super::SharedGateway;
use super::views::{PageContext, ResultContext, data_uri};
use crate::controller::{self, AnalysisRequest, LiveView, Outcome};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Build an axum Router with the page, the JSON API and `/health`.
pub fn router(shared: SharedGateway) -> Router {
    let limit = shared.server.max_upload_bytes;
    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_page_handler))
        .route("/api/analyze", post(api_analyze_handler))
        .route("/api/report", post(api_report_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Collect the form fields into a request. Unknown fields are skipped.
async fn read_request(mut multipart: Multipart) -> Result<AnalysisRequest, MultipartError> {
    let mut request = AnalysisRequest::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "paper" => request.paper = Some(field.bytes().await?.to_vec()),
            "thesis" => request.thesis_file = Some(field.bytes().await?.to_vec()),
            "thesis_topic" => request.thesis_topic = Some(field.text().await?),
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }
    Ok(request)
}

fn render_page(gw: &SharedGateway, context: &PageContext) -> Response {
    match gw.views.page(context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

/// The empty form.
async fn index_handler(State(gw): State<SharedGateway>) -> Response {
    render_page(&gw, &PageContext::default())
}

/// Form submission: the page again, with the live view or an error banner.
async fn analyze_page_handler(State(gw): State<SharedGateway>, multipart: Multipart) -> Response {
    let request = match read_request(multipart).await {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    let topic = request.thesis_topic.clone().unwrap_or_default();

    let context = match controller::handle(&gw.analyzer, request).await {
        Outcome::Idle => PageContext {
            topic,
            ..Default::default()
        },
        Outcome::Failed(message) => PageContext {
            topic,
            error: Some(message),
            result: None,
        },
        Outcome::Completed(report) => PageContext {
            topic,
            error: None,
            result: Some(ResultContext::new(
                LiveView::from_analysis(&report.analysis),
                data_uri(report.content_type, &report.pdf),
                gw.report_file_name.clone(),
            )),
        },
    };
    render_page(&gw, &context)
}

/// Same controller, JSON out.
async fn api_analyze_handler(State(gw): State<SharedGateway>, multipart: Multipart) -> Response {
    let request = match read_request(multipart).await {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    match controller::handle(&gw.analyzer, request).await {
        Outcome::Idle => Json(serde_json::json!({ "status": "idle" })).into_response(),
        Outcome::Failed(message) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "status": "error", "message": message })),
        )
            .into_response(),
        Outcome::Completed(report) => Json(serde_json::json!({
            "status": "ok",
            "analysis": report.analysis,
        }))
        .into_response(),
    }
}

/// Same controller, report bytes out as an attachment.
async fn api_report_handler(State(gw): State<SharedGateway>, multipart: Multipart) -> Response {
    let request = match read_request(multipart).await {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    match controller::handle(&gw.analyzer, request).await {
        Outcome::Idle => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "idle",
                "message": "A paper and a thesis topic or thesis file are required",
            })),
        )
            .into_response(),
        Outcome::Failed(message) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "status": "error", "message": message })),
        )
            .into_response(),
        Outcome::Completed(report) => {
            let disposition = format!("attachment; filename=\"{}\"", gw.report_file_name);
            (
                [
                    (header::CONTENT_TYPE, report.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                report.pdf,
            )
                .into_response()
        }
    }
}

/// Health check endpoint.
async fn health_handler(State(gw): State<SharedGateway>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "provider": gw.analyzer.provider_name(),
    });
    Json(body)
}

/// Start the gateway on the configured address.
///
/// Runs until Ctrl-C.
pub async fn run(gw: SharedGateway) -> Result<(), std::io::Error> {
    let addr = format!("{}:{}", gw.server.host, gw.server.port);
    let app = router(gw);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gateway");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::config::{AnalysisConfig, ReportConfig, ServerConfig};
    use crate::extract::PlainTextExtractor;
    use crate::gateway::GatewayState;
    use crate::providers::MockModelProvider;
    use crate::report::PlainTextRenderer;
    use axum::body::Body;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "paperfit-test-boundary";

    fn make_shared_gateway(mock: Arc<MockModelProvider>, server: ServerConfig) -> SharedGateway {
        let analyzer = Analyzer::new(
            mock,
            Arc::new(PlainTextExtractor),
            Arc::new(PlainTextRenderer),
            AnalysisConfig::default(),
        );
        GatewayState::new(analyzer, server, &ReportConfig::default())
            .unwrap()
            .shared()
    }

    fn multipart_body(fields: &[(&str, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn post(uri: &str, fields: &[(&str, &str)]) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields)))
            .unwrap()
    }

    async fn body_string(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_router_builds() {
        let gw = make_shared_gateway(Arc::new(MockModelProvider::new()), ServerConfig::default());
        let _app = router(gw);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let gw = make_shared_gateway(Arc::new(MockModelProvider::new()), ServerConfig::default());
        let req = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(gw), req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["provider"], "mock");
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let gw = make_shared_gateway(Arc::new(MockModelProvider::new()), ServerConfig::default());
        let req = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(gw), req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert!(body_string(resp).await.contains("Analyze Paper"));
    }

    #[tokio::test]
    async fn test_analyze_page_idle_without_paper() {
        let mock = Arc::new(MockModelProvider::new());
        let gw = make_shared_gateway(Arc::clone(&mock), ServerConfig::default());
        let req = post("/analyze", &[("thesis_topic", "climate")]);
        let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(gw), req)
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let html = body_string(resp).await;
        assert!(!html.contains("Relevance Score"));
        assert!(!html.contains("Something went wrong"));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_page_failure_banner() {
        let mock = Arc::new(MockModelProvider::new());
        mock.fail_with("quota exceeded");
        let gw = make_shared_gateway(mock, ServerConfig::default());
        let req = post(
            "/analyze",
            &[("paper", "paper text"), ("thesis_topic", "climate")],
        );
        let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(gw), req)
            .await
            .unwrap();
        let html = body_string(resp).await;
        assert!(html.contains("Something went wrong: "));
        assert!(html.contains("quota exceeded"));
        assert!(!html.contains("Relevance Score"));
    }

    #[tokio::test]
    async fn test_api_report_idle_is_bad_request() {
        let gw = make_shared_gateway(Arc::new(MockModelProvider::new()), ServerConfig::default());
        let req = post("/api/report", &[("paper", "paper text")]);
        let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(gw), req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_limit() {
        let server = ServerConfig {
            max_upload_bytes: 64,
            ..Default::default()
        };
        let gw = make_shared_gateway(Arc::new(MockModelProvider::new()), server);
        let big = "a".repeat(4096);
        let req = post("/api/analyze", &[("paper", big.as_str()), ("thesis_topic", "t")]);
        let resp = ServiceExt::<axum::http::Request<Body>>::oneshot(router(gw), req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
