pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Single-resume analysis
        .route(
            "/analyze-skills",
            post(handlers::handle_analyze_skills).layer(upload_limit),
        )
        // Partner shortlisting
        .route("/partner/shortlist", post(handlers::handle_shortlist))
        .route(
            "/partner/shortlisted/:internship_id",
            get(handlers::handle_get_shortlisted),
        )
        .route(
            "/partner/fetch-applications/:job_id",
            get(handlers::handle_fetch_applications),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::screening::pipeline::tests::{application, screener, MemoryBlobs, MemoryStore};

    const JOB: &str = "65f1a2b3c4d5e6f708192a3b";

    const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

    fn app_with_limit(blobs: MemoryBlobs, store: Arc<MemoryStore>, max_upload_bytes: usize) -> Router {
        let screener = Arc::new(screener(blobs, store.clone()));
        build_router(AppState {
            screener,
            store,
            max_upload_bytes,
        })
    }

    fn app_with(blobs: MemoryBlobs, store: Arc<MemoryStore>) -> Router {
        app_with_limit(blobs, store, UPLOAD_LIMIT)
    }

    fn app() -> Router {
        app_with(MemoryBlobs::default(), Arc::new(MemoryStore::default()))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart(filename: &str, contents: &str, required_skills: &str) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {contents}\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"job_description\"\r\n\r\n\
             Backend role\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"required_skills\"\r\n\r\n\
             {required_skills}\r\n\
             --{boundary}--\r\n"
        );
        Request::post("/analyze-skills")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "screener");
    }

    #[tokio::test]
    async fn test_analyze_skills() {
        let (status, body) = send(app(), multipart("cv.pdf", "Python and AWS", "Python,AWS,Docker")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["readiness_score"], 66.67);
        assert_eq!(body["user_skills"], json!(["aws", "python"]));
        assert_eq!(body["skill_gaps"], json!(["docker"]));
        assert_eq!(body["job_skills"], json!(["Python", "AWS", "Docker"]));
    }

    #[tokio::test]
    async fn test_analyze_skills_accepts_resumes_over_two_megabytes() {
        let resume = "Python AWS Docker engineer\n".repeat(3 * 1024 * 1024 / 27 + 1);
        assert!(resume.len() > 3 * 1024 * 1024);

        let (status, body) = send(app(), multipart("cv.pdf", &resume, "Python,AWS,Docker")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["readiness_score"], 100.0);
    }

    #[tokio::test]
    async fn test_analyze_skills_over_the_limit_is_payload_too_large() {
        let app = app_with_limit(MemoryBlobs::default(), Arc::new(MemoryStore::default()), 1024);
        let resume = "Python ".repeat(1024);

        let (status, body) = send(app, multipart("cv.pdf", &resume, "Python")).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_analyze_skills_rejects_other_formats() {
        let (status, body) = send(app(), multipart("cv.txt", "Python", "Python")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_FORMAT");
    }

    #[tokio::test]
    async fn test_analyze_skills_without_skills() {
        let (status, body) = send(app(), multipart("cv.docx", "Gardening", "Python")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "NO_SKILLS_FOUND");
    }

    #[tokio::test]
    async fn test_shortlist_rejects_invalid_job_id() {
        let store = Arc::new(MemoryStore::default());
        let app = app_with(MemoryBlobs::default(), store.clone());
        let (status, body) = send(
            app,
            post_json(
                "/partner/shortlist",
                json!({"internship_id": "not-an-id", "job_skills": [], "resumes": ["s3://b/a.pdf"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_JOB_ID");
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shortlist_then_read_back() {
        let mut blobs = MemoryBlobs::default();
        blobs.objects = HashMap::from([
            ("s3://b/ada.pdf".to_string(), "Python AWS Docker"),
            ("s3://b/bob.pdf".to_string(), "Java"),
        ]);
        let store = Arc::new(MemoryStore {
            applications: vec![application("s3://b/ada.pdf", "Ada")],
            ..MemoryStore::default()
        });
        let app = app_with(blobs, store);

        let (status, body) = send(
            app.clone(),
            post_json(
                "/partner/shortlist",
                json!({
                    "internship_id": JOB,
                    "job_description": "Cloud backend",
                    "job_skills": "[\"Python\", \"AWS\", \"Docker\"]",
                    "resumes": ["s3://b/ada.pdf", "s3://b/bob.pdf", "s3://b/gone.pdf"]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let shortlisted = body["shortlisted_candidates"].as_array().unwrap();
        assert_eq!(shortlisted.len(), 1);
        assert_eq!(shortlisted[0]["internship_id"], JOB);
        assert_eq!(shortlisted[0]["name"], "Ada");
        assert_eq!(shortlisted[0]["resumeUrl"], "s3://b/ada.pdf");
        assert_eq!(shortlisted[0]["readiness_score"], 100.0);

        let (status, body) = send(
            app,
            Request::get(format!("/partner/shortlisted/{JOB}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shortlisted_candidates"][0]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_get_shortlisted_validates_job_id() {
        let (status, body) = send(
            app(),
            Request::get("/partner/shortlisted/123").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_JOB_ID");
    }

    #[tokio::test]
    async fn test_fetch_applications() {
        let store = Arc::new(MemoryStore {
            applications: vec![application("s3://b/ada.pdf", "Ada")],
            ..MemoryStore::default()
        });
        let (status, body) = send(
            app_with(MemoryBlobs::default(), store),
            Request::get(format!("/partner/fetch-applications/{JOB}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applications"][0]["userName"], "Ada");
    }
}
