//! End-to-end tests of the web gateway with a mock model provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use paperfit_core::config::{AnalysisConfig, ReportConfig, ServerConfig};
use paperfit_core::gateway::{GatewayState, SharedGateway, gateway_router};
use paperfit_core::{Analyzer, MockModelProvider, PlainTextExtractor, PlainTextRenderer};

const BOUNDARY: &str = "gateway-api-boundary";
const PAPER: &str =
    "Climate change impacts [1] are discussed in (Jones, 2019) and show significant risk.";
const TOPIC: &str = "climate risk modeling";

fn gateway(mock: Arc<MockModelProvider>) -> SharedGateway {
    let analyzer = Analyzer::new(
        mock,
        Arc::new(PlainTextExtractor),
        Arc::new(PlainTextRenderer),
        AnalysisConfig::default(),
    );
    GatewayState::new(analyzer, ServerConfig::default(), &ReportConfig::default())
        .unwrap()
        .shared()
}

fn form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(gw: SharedGateway, req: Request<Body>) -> (StatusCode, header::HeaderMap, Vec<u8>) {
    let resp = ServiceExt::<Request<Body>>::oneshot(gateway_router(gw), req)
        .await
        .unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

fn relevant_mock() -> Arc<MockModelProvider> {
    Arc::new(
        MockModelProvider::new()
            .with_embedding(TOPIC, vec![1.0, 0.0, 0.0])
            .with_summary("- Warming raises flood risk.")
            .with_generation("Certainly! Prior work ties warming to risk."),
    )
}

#[tokio::test]
async fn test_api_analyze_end_to_end() {
    let mock = relevant_mock();
    let (status, _, body) = send(
        gateway(Arc::clone(&mock)),
        form("/api/analyze", &[("paper", PAPER), ("thesis_topic", TOPIC)]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    let analysis = &json["analysis"];
    assert!((analysis["score"].as_f64().unwrap() - 0.6).abs() < 1e-6);
    assert_eq!(analysis["low_score"], false);
    assert_eq!(
        analysis["citations"],
        serde_json::json!(["[1]", "(Jones, 2019)"])
    );
    assert_eq!(analysis["review"], "Prior work ties warming to risk.");
    assert_eq!(mock.calls().len(), 4);
}

#[tokio::test]
async fn test_api_analyze_low_score() {
    let mock = Arc::new(MockModelProvider::new().with_embedding(TOPIC, vec![0.8, -0.6, 0.0]));
    let (_, _, body) = send(
        gateway(mock),
        form("/api/analyze", &[("paper", PAPER), ("thesis_topic", TOPIC)]),
    )
    .await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    // 0.8 * 0.6 - 0.6 * 0.8 = 0
    assert!(json["analysis"]["score"].as_f64().unwrap().abs() < 1e-6);
    assert_eq!(json["analysis"]["low_score"], true);
}

#[tokio::test]
async fn test_api_analyze_idle_and_failure() {
    let (status, _, body) = send(
        gateway(relevant_mock()),
        form("/api/analyze", &[("thesis_topic", TOPIC)]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "idle");

    let failing = relevant_mock();
    failing.fail_with("invalid api token");
    let (status, _, body) = send(
        gateway(failing),
        form("/api/analyze", &[("paper", PAPER), ("thesis_topic", TOPIC)]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "error");
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("Something went wrong: "));
    assert!(message.contains("invalid api token"));
}

#[tokio::test]
async fn test_thesis_file_used_without_topic() {
    let mock = relevant_mock();
    let (status, _, _) = send(
        gateway(Arc::clone(&mock)),
        form("/api/analyze", &[("paper", PAPER), ("thesis", TOPIC)]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        mock.calls()[0],
        paperfit_core::providers::MockCall::Embed {
            text: TOPIC.to_string(),
            input_type: paperfit_core::InputType::SearchQuery,
        }
    );
}

#[tokio::test]
async fn test_api_report_is_attachment() {
    let (status, headers, body) = send(
        gateway(relevant_mock()),
        form("/api/report", &[("paper", PAPER), ("thesis_topic", TOPIC)]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"research_paper_summary.pdf\""
    );
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );

    let report = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "Research Paper Relevance Report");
    assert_eq!(lines[1], "Relevance Score: 0.60");
    assert!(report.contains("Summary of the Paper\n- Warming raises flood risk."));
    assert!(report.contains("Suggested Citations\n1. [1]\n2. (Jones, 2019)"));
    assert!(report.contains("Literature Review Paragraph\nPrior work ties warming to risk."));
    assert!(!report.contains("Warning:"));
}

#[tokio::test]
async fn test_page_shows_live_view_and_download() {
    let (status, _, body) = send(
        gateway(relevant_mock()),
        form("/analyze", &[("paper", PAPER), ("thesis_topic", TOPIC)]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Relevance Score: <code>0.60</code>"));
    assert!(html.contains("<li>[1]</li>"));
    assert!(html.contains("<li>(Jones, 2019)</li>"));
    assert!(html.contains("Prior work ties warming to risk."));
    assert!(html.contains("data:text/plain"));
    assert!(html.contains(r#"download="research_paper_summary.pdf""#));
    assert!(!html.contains("may not be very relevant"));
}

#[tokio::test]
async fn test_page_without_citations_shows_notice() {
    let paper = "A study of coastal flooding published in 2021 with no references.";
    let (_, _, body) = send(
        gateway(relevant_mock()),
        form("/analyze", &[("paper", paper), ("thesis_topic", TOPIC)]),
    )
    .await;
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("No clear citations found."));
    assert!(!html.contains("<ol>"));
}
