//! HTTP surface: `POST /analyze` plus a health check.
//!
//! No authentication, no upload size limit and fully open CORS.

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use lia_core::AnalysisResult;
use log::{error, info, warn};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::config::AnalyzerArgs;
use crate::service::{AnalysisError, AnalysisService};

/// Multipart field carrying the uploaded image.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing multipart field 'file'")]
    MissingUpload,
    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUpload => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Analysis failed: {}", self);
        } else {
            warn!("Rejected upload: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(service: AnalysisService) -> Router {
    Router::new()
        .route("/analyze", post(analyze_upload))
        .route("/health", get(|| async { "ok" }))
        .with_state(service)
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
}

async fn analyze_upload(
    State(service): State<AnalysisService>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("<unnamed>").to_string();
        let image = field.bytes().await?;
        info!("Received {} ({} bytes)", filename, image.len());
        let result = service.analyze(image).await?;
        return Ok(Json(result));
    }
    Err(ApiError::MissingUpload)
}

pub async fn run_serve(port: u16, analyzer: AnalyzerArgs) -> anyhow::Result<()> {
    let service = analyzer.build_service()?;
    let app = router(service);

    let addr = format!("0.0.0.0:{}", port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::{png, service_with, FixedClassifier};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "lia-test-boundary";

    fn multipart_request(field: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"site.png\"\r\n",
                field
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_upload() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("report.csv");
        let app = router(service_with(Arc::new(FixedClassifier("desert_sand")), &report));

        let response = app
            .oneshot(multipart_request("file", &png(80, 60, [200, 170, 120])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["land_type"], "desert_sand");
        assert!(body["greenness_index"].as_f64().unwrap() < 0.0);
        assert_eq!(body["weather"]["description"], "Unavailable");
        assert_eq!(body["weather"]["precipitation"], 0.0);
        assert_eq!(
            body["suggestions"],
            json!(["Drought-resistant plants", "Rainwater harvesting", "Solar panels"])
        );
        assert_eq!(
            body["costs"],
            json!([["Rainwater Tank", 2500], ["Solar Panels per acre", 500000]])
        );
        assert!(report.exists());
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(service_with(
            Arc::new(FixedClassifier("lakeside")),
            &dir.path().join("report.csv"),
        ));

        let response = app
            .oneshot(multipart_request("file", b"plain text"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("could not decode image"));
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(service_with(
            Arc::new(FixedClassifier("lakeside")),
            &dir.path().join("report.csv"),
        ));

        let response = app
            .oneshot(multipart_request("photo", &png(4, 4, [1, 2, 3])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_report_failure_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(service_with(
            Arc::new(FixedClassifier("lakeside")),
            &dir.path().join("gone").join("report.csv"),
        ));

        let response = app
            .oneshot(multipart_request("file", &png(4, 4, [1, 2, 3])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(service_with(
            Arc::new(FixedClassifier("lakeside")),
            &dir.path().join("report.csv"),
        ));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_cors_is_open() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(service_with(
            Arc::new(FixedClassifier("lakeside")),
            &dir.path().join("report.csv"),
        ));

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/analyze")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
