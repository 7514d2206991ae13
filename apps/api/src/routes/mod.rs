pub mod applications;
pub mod health;
pub mod jobs;
pub mod resume_pdf;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::submission::{APPLICATIONS_PATH, EXPORT_PDF_PATH};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/jobs", get(jobs::list_jobs))
        .route(
            APPLICATIONS_PATH,
            post(applications::submit_application).get(applications::list_applications),
        )
        .route(EXPORT_PDF_PATH, post(resume_pdf::generate_resume_pdf))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::default_catalog;
    use crate::config::Config;
    use crate::export::RenderError;
    use crate::models::application::ResumePdfRequest;
    use crate::render::ResumePdfRenderer;
    use crate::store::InMemoryStore;

    struct FixedRenderer(Result<&'static [u8], &'static str>);

    #[async_trait]
    impl ResumePdfRenderer for FixedRenderer {
        async fn render(&self, _request: &ResumePdfRequest) -> Result<Bytes, RenderError> {
            match self.0 {
                Ok(bytes) => Ok(Bytes::from_static(bytes)),
                Err(msg) => Err(RenderError::Failed(msg.to_string())),
            }
        }
    }

    fn app_with(renderer: FixedRenderer) -> Router {
        build_router(AppState {
            config: Config::default(),
            catalog: Arc::new(default_catalog()),
            store: Arc::new(InMemoryStore::new()),
            renderer: Arc::new(renderer),
        })
    }

    fn app() -> Router {
        app_with(FixedRenderer(Ok(&b"%PDF-1.5 test"[..])))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn application(job_id: &str, resume: &str) -> Value {
        json!({
            "jobId": job_id,
            "jobTitle": "Senior Frontend Developer",
            "company": "TechCorp Inc.",
            "appliedAt": "2024-03-09T14:05:07.000Z",
            "mode": "smart",
            "resume": resume
        })
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["port"], 5001);
        assert_eq!(body["structuredPdf"], true);
    }

    #[tokio::test]
    async fn test_health_reports_configured_port() {
        let app = build_router(AppState {
            config: Config {
                port: 8080,
                structured_pdf: false,
                ..Config::default()
            },
            catalog: Arc::new(default_catalog()),
            store: Arc::new(InMemoryStore::new()),
            renderer: Arc::new(FixedRenderer(Ok(&b"%PDF"[..]))),
        });
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["port"], 8080);
        assert_eq!(body["structuredPdf"], false);
    }

    #[tokio::test]
    async fn test_jobs_lists_catalog() {
        let response = app()
            .oneshot(Request::get("/api/jobs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[0]["title"], "Senior Frontend Developer");
    }

    #[tokio::test]
    async fn test_application_created_then_duplicate() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_json(APPLICATIONS_PATH, application("1", "my resume")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(
            body["message"],
            "Application submitted for Senior Frontend Developer!"
        );
        assert!(body["id"].is_string());

        let response = app
            .clone()
            .oneshot(post_json(APPLICATIONS_PATH, application("1", "my resume")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["message"], "duplicate application");

        let response = app
            .oneshot(Request::get(APPLICATIONS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_application_validation() {
        let response = app()
            .oneshot(post_json(APPLICATIONS_PATH, application("99", "resume")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app()
            .oneshot(post_json(APPLICATIONS_PATH, application("1", "   ")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_resume_pdf_is_attachment() {
        let response = app()
            .oneshot(post_json(
                EXPORT_PDF_PATH,
                json!({"jobTitle": "C++ Dev", "resumeText": "resume"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"C Dev.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.5 test");
    }

    #[tokio::test]
    async fn test_resume_pdf_failures() {
        let response = app()
            .oneshot(post_json(EXPORT_PDF_PATH, json!({"resumeText": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Nothing to export.");

        let response = app_with(FixedRenderer(Err("pdflatex exited with 1")))
            .oneshot(post_json(EXPORT_PDF_PATH, json!({"resumeText": "resume"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["message"], "Failed to generate PDF");
    }
}
