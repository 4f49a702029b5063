pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::builder::handlers as builder;
use crate::state::AppState;

/// `max_upload_bytes` caps every request body, uploads and JSON alike.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route("/api/v1/analyze/extract", post(analysis::handle_extract))
        .route(
            "/api/v1/analyze/similarity",
            post(analysis::handle_similarity),
        )
        .route("/api/v1/analyze/feedback", post(analysis::handle_feedback))
        // Builder API
        .route("/api/v1/builder/generate", post(builder::handle_generate))
        .route("/api/v1/builder/export", post(builder::handle_export))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::similarity::testing::LetterEmbedder;
    use crate::analysis::similarity::UnavailableEmbedder;
    use crate::export::{default_page_config, render_pdf};
    use crate::llm_client::testing::RecordingGenerator;

    const BOUNDARY: &str = "resume-api-test-boundary";
    const BODY_LIMIT: usize = 10 * 1024 * 1024;

    fn state_with(llm: Arc<RecordingGenerator>) -> AppState {
        AppState {
            llm,
            embedder: Arc::new(LetterEmbedder),
        }
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// (field name, optional (file name, content type), payload)
    type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

    fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file, payload) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file {
                Some((file_name, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(payload);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

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

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn sample_pdf() -> Vec<u8> {
        render_pdf(
            "Jane Doe\nExperienced engineer with 5 years in backend systems.",
            &default_page_config(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_fields_without_remote_call() {
        let llm = Arc::new(RecordingGenerator::replying("unused"));
        let app = build_router(state_with(llm.clone()), BODY_LIMIT);

        let response = app
            .oneshot(json_request(
                "/api/v1/builder/generate",
                json!({"name": "Jane Doe", "title": "Data Scientist", "summary": "...", "skills": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["step"], "validate");
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generate_returns_resume_text() {
        let llm = Arc::new(RecordingGenerator::replying("JANE DOE\nData Scientist"));
        let app = build_router(state_with(llm.clone()), BODY_LIMIT);

        let response = app
            .oneshot(json_request(
                "/api/v1/builder/generate",
                json!({"name": "Jane Doe", "title": "Data Scientist", "summary": "...", "skills": "Python, SQL"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["resume"], "JANE DOE\nData Scientist");
        assert_eq!(llm.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_surfaces_rate_limit() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::failing())), BODY_LIMIT);
        let response = app
            .oneshot(json_request(
                "/api/v1/builder/generate",
                json!({"name": "Jane Doe", "title": "Data Scientist", "summary": "...", "skills": "Python"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(response).await["error"]["step"], "generate");
    }

    #[tokio::test]
    async fn test_export_serves_pdf_attachment() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let response = app
            .oneshot(json_request(
                "/api/v1/builder/export",
                json!({"text": "JANE DOE\nData Scientist\n\n• Python\n• SQL"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_export_rejects_unsupported_characters() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let response = app
            .oneshot(json_request("/api/v1/builder/export", json!({"text": "履歴書"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "EXPORT_ERROR");
        assert_eq!(body["error"]["step"], "export");
    }

    #[tokio::test]
    async fn test_similarity_without_job_description_is_not_applicable() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let response = app
            .oneshot(json_request(
                "/api/v1/analyze/similarity",
                json!({"resume_text": "Experienced engineer"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["similarity"], "N/A");
    }

    #[tokio::test]
    async fn test_similarity_with_unloaded_model_is_503() {
        let state = AppState {
            llm: Arc::new(RecordingGenerator::replying("")),
            embedder: Arc::new(UnavailableEmbedder::new("model download failed")),
        };
        let response = build_router(state, BODY_LIMIT)
            .oneshot(json_request(
                "/api/v1/analyze/similarity",
                json!({"resume_text": "Experienced engineer", "job_description": "Backend engineer"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["error"]["code"], "MODEL_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_feedback_endpoint_returns_model_text() {
        let llm = Arc::new(RecordingGenerator::replying("Resume Score: Average"));
        let app = build_router(state_with(llm.clone()), BODY_LIMIT);
        let response = app
            .oneshot(json_request(
                "/api/v1/analyze/feedback",
                json!({"resume_text": "Experienced engineer", "job_description": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["feedback"], "Resume Score: Average");
        assert!(llm.calls()[0].0.contains("\"\"\"\"\"\""));
    }

    #[tokio::test]
    async fn test_extract_endpoint_returns_normalized_text() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let pdf = sample_pdf();
        let response = app
            .oneshot(multipart_request(
                "/api/v1/analyze/extract",
                &[("resume", Some(("resume.pdf", "application/pdf")), pdf.as_slice())],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["resume_text"],
            "Jane Doe Experienced engineer with 5 years in backend systems."
        );
    }

    #[tokio::test]
    async fn test_extract_rejects_non_pdf_bytes() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let response = app
            .oneshot(multipart_request(
                "/api/v1/analyze/extract",
                &[("resume", Some(("resume.pdf", "application/pdf")), b"not a pdf".as_slice())],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["step"], "extract");
    }

    #[tokio::test]
    async fn test_analyze_requires_resume_upload() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let response = app
            .oneshot(multipart_request(
                "/api/v1/analyze",
                &[("job_description", None, b"Backend engineer".as_slice())],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_full_pipeline() {
        let llm = Arc::new(RecordingGenerator::replying("1. Resume Score: Good"));
        let app = build_router(state_with(llm.clone()), BODY_LIMIT);
        let pdf = sample_pdf();
        let response = app
            .oneshot(multipart_request(
                "/api/v1/analyze",
                &[
                    ("resume", Some(("resume.pdf", "application/pdf")), pdf.as_slice()),
                    (
                        "job_description",
                        None,
                        b"Looking for a backend engineer with 5+ years experience".as_slice(),
                    ),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["feedback"], "1. Resume Score: Good");
        let score = body["similarity"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
        assert!(body["failures"].as_array().unwrap().is_empty());
        assert!(llm.calls()[0].0.contains("Looking for a backend engineer"));
    }

    #[tokio::test]
    async fn test_analyze_keeps_partial_results_when_feedback_fails() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::failing())), BODY_LIMIT);
        let pdf = sample_pdf();
        let response = app
            .oneshot(multipart_request(
                "/api/v1/analyze",
                &[("resume", Some(("resume.pdf", "application/pdf")), pdf.as_slice())],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["resume_text"],
            "Jane Doe Experienced engineer with 5 years in backend systems."
        );
        assert!(body["feedback"].is_null());
        assert_eq!(body["similarity"], "N/A");
        assert_eq!(body["failures"][0]["step"], "feedback");
        assert_eq!(body["failures"][0]["code"], "REMOTE_RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_analyze_keeps_partial_results_when_similarity_fails() {
        let state = AppState {
            llm: Arc::new(RecordingGenerator::replying("1. Resume Score: Average")),
            embedder: Arc::new(UnavailableEmbedder::new("model download failed")),
        };
        let pdf = sample_pdf();
        let response = build_router(state, BODY_LIMIT)
            .oneshot(multipart_request(
                "/api/v1/analyze",
                &[
                    ("resume", Some(("resume.pdf", "application/pdf")), pdf.as_slice()),
                    ("job_description", None, b"Backend engineer".as_slice()),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["feedback"], "1. Resume Score: Average");
        assert!(body["similarity"].is_null());
        assert_eq!(body["failures"].as_array().unwrap().len(), 1);
        assert_eq!(body["failures"][0]["step"], "similarity");
        assert_eq!(body["failures"][0]["code"], "MODEL_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_generate_with_omitted_key_is_validation_error() {
        let llm = Arc::new(RecordingGenerator::replying("unused"));
        let app = build_router(state_with(llm.clone()), BODY_LIMIT);

        let response = app
            .oneshot(json_request(
                "/api/v1/builder/generate",
                json!({"title": "Data Scientist", "summary": "s", "skills": "Python"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["step"], "validate");
        assert!(body["error"]["message"].as_str().unwrap().contains("name"));
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_gets_error_envelope() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/builder/export")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["step"], "validate");
    }

    #[tokio::test]
    async fn test_similarity_without_resume_text_gets_error_envelope() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let response = app
            .oneshot(json_request(
                "/api/v1/analyze/similarity",
                json!({"job_description": "x"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["step"], "validate");
    }

    #[tokio::test]
    async fn test_extract_without_multipart_body_gets_error_envelope() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), BODY_LIMIT);
        let response = app
            .oneshot(json_request("/api/v1/analyze/extract", json!({"resume": "x"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["step"], "validate");
    }

    #[tokio::test]
    async fn test_oversized_json_body_is_413() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), 1024);
        let response = app
            .oneshot(json_request(
                "/api/v1/builder/export",
                json!({"text": "x".repeat(4096)}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_413() {
        let app = build_router(state_with(Arc::new(RecordingGenerator::replying(""))), 1024);
        let payload = vec![b'x'; 4096];
        let response = app
            .oneshot(multipart_request(
                "/api/v1/analyze/extract",
                &[("resume", Some(("resume.pdf", "application/pdf")), payload.as_slice())],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(body["error"]["step"], "validate");
    }
}
