mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use budget_audit::routes::{AppState, router};
use budget_audit::{CohereReviewer, ReviewerConfig};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn test_router() -> axum::Router {
    // Points at a closed local port; these tests never reach the reviewer.
    let config = ReviewerConfig {
        api_key: "test-key".to_string(),
        model: budget_audit::DEFAULT_MODEL.to_string(),
        endpoint: "http://127.0.0.1:9".to_string(),
    };
    let reviewer = CohereReviewer::new(config).expect("client builds");
    router(Arc::new(AppState { reviewer }))
}

fn multipart_request(uri: &str, content_type: &str, payload: &[u8]) -> Request<Body> {
    let boundary = "audit-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"document\"; filename=\"upload\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

#[tokio::test]
async fn serves_the_upload_form() {
    let response = test_router()
        .oneshot(Request::get("/").body(Body::empty()).expect("request builds"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.expect("body").to_bytes();
    let html = String::from_utf8(body.to_vec()).expect("utf-8 body");
    assert!(html.contains("multipart/form-data"));
    assert!(html.contains("name=\"document\""));
}

#[tokio::test]
async fn health_endpoint_responds_ok() {
    let response = test_router()
        .oneshot(
            Request::get("/health")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rejects_non_pdf_uploads_before_processing() {
    let request = multipart_request("/audit", "text/plain", b"just text");
    let response = test_router().oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = response.into_body().collect().await.expect("body").to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json error body");
    assert_eq!(json["code"], "invalid_file_type");
}

#[tokio::test]
async fn json_api_rejects_unparseable_pdf_bytes() {
    let request = multipart_request("/api/v1/audit", "application/pdf", b"not a pdf at all");
    let response = test_router().oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.into_body().collect().await.expect("body").to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json error body");
    assert_eq!(json["code"], "extraction_error");
}

#[tokio::test]
async fn unreachable_reviewer_degrades_to_a_warning() {
    let pdf = common::pdf_with_pages(&[vec![
        "Item  Amount",
        "Wood  $1,000",
        "Nails  $50.00",
        "Total Amount: 1,050.00",
    ]]);
    let request = multipart_request("/api/v1/audit", "application/pdf", &pdf);
    let response = test_router().oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.expect("body").to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");

    assert_eq!(json["matched"], true);
    assert!(json.get("reviewerComment").is_none());
    let warnings = json["warnings"].as_array().expect("warnings array");
    assert!(
        warnings
            .iter()
            .any(|warning| warning.as_str().is_some_and(|w| w.starts_with("reviewer_call_failed"))),
        "warnings: {warnings:?}"
    );
}

#[tokio::test]
async fn missing_document_field_is_a_bad_request() {
    let boundary = "audit-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/audit")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request builds");

    let response = test_router().oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
