//! End-to-end pipeline tests through the HTTP router, with fake providers.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;
use tutor_common::ProviderResult;
use tutord::config::TutordConfig;
use tutord::extract::PlainTextExtractor;
use tutord::orchestrator::FallbackOrchestrator;
use tutord::profile::NoProfiles;
use tutord::providers::{AnswerProvider, GenerationOptions, ProviderError};
use tutord::search::NoopSearch;
use tutord::server::{build_router, AppState};

const LONG_ANSWER: &str =
    "Photosynthesis converts light energy into chemical energy stored in glucose molecules.";

struct FakeProvider {
    name: &'static str,
    fail: bool,
    answer: &'static str,
    calls: AtomicUsize,
}

impl FakeProvider {
    fn ok(name: &'static str, answer: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: false,
            answer,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: true,
            answer: "",
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AnswerProvider for FakeProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        _prompt: &str,
        _opts: &GenerationOptions,
    ) -> Result<ProviderResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ProviderError::Network("connection refused".to_string()))
        } else {
            Ok(ProviderResult::new(self.answer, self.name))
        }
    }
}

fn test_router(providers: Vec<Arc<dyn AnswerProvider>>) -> Router {
    let mut config = TutordConfig::default();
    // No pacing delays in tests.
    config.pipeline.content_chunk_delay_ms = 0;
    config.pipeline.thinking_step_delay_ms = 0;

    let orchestrator =
        FallbackOrchestrator::new(providers, config.pipeline.min_acceptable_answer_chars);
    build_router(Arc::new(AppState {
        orchestrator,
        search: Arc::new(NoopSearch),
        profiles: Arc::new(NoProfiles),
        extractor: Arc::new(PlainTextExtractor),
        start_time: Instant::now(),
        config,
    }))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn stream_events(response: axum::response::Response) -> Vec<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn test_stream_reconstructs_answer_and_reports_provider() {
    let router = test_router(vec![FakeProvider::ok("gemini", LONG_ANSWER)]);

    let response = router
        .oneshot(post_json(
            "/v1/answer/stream",
            json!({ "question": "explain photosynthesis step by step" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-ndjson"
    );

    let events = stream_events(response).await;
    let reconstructed: String = events
        .iter()
        .filter(|e| e["type"] == "content")
        .map(|e| e["content"].as_str().unwrap())
        .collect();
    let done = events.last().unwrap();
    assert_eq!(done["type"], "done");
    assert_eq!(done["answer"].as_str().unwrap(), reconstructed);
    assert_eq!(done["fullResponse"], done["answer"]);
    assert_eq!(done["provider"], "gemini");
    assert_eq!(
        events
            .iter()
            .filter(|e| e["type"] == "done" || e["type"] == "error")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_fallback_to_secondary_provider() {
    let primary = FakeProvider::failing("gemini");
    let secondary = FakeProvider::ok("openrouter", LONG_ANSWER);
    let router = test_router(vec![primary.clone(), secondary.clone()]);

    let response = router
        .oneshot(post_json(
            "/v1/answer/stream",
            json!({ "question": "explain photosynthesis in detail" }),
        ))
        .await
        .unwrap();

    let events = stream_events(response).await;
    let done = events.last().unwrap();
    assert_eq!(done["provider"], "openrouter");
    assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exhaustion_still_streams_an_answer() {
    let router = test_router(vec![
        FakeProvider::failing("gemini"),
        FakeProvider::failing("openrouter"),
    ]);

    let response = router
        .oneshot(post_json(
            "/v1/answer/stream",
            json!({ "question": "summarize chapter three of the textbook" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = stream_events(response).await;
    let done = events.last().unwrap();
    assert_eq!(done["type"], "done");
    assert_eq!(done["provider"], "fallback");
    assert!(!done["answer"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_thinking_events_precede_content() {
    let router = test_router(vec![FakeProvider::ok("gemini", LONG_ANSWER)]);

    let response = router
        .oneshot(post_json(
            "/v1/answer/stream",
            json!({
                "question": "why does entropy increase in a closed system",
                "thinkingMode": true
            }),
        ))
        .await
        .unwrap();

    let events = stream_events(response).await;
    let thinking: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e["type"] == "thinking")
        .map(|(i, _)| i)
        .collect();
    let first_content = events
        .iter()
        .position(|e| e["type"] == "content")
        .unwrap();

    // Fake provider returns no trace, so the synthetic four-step one appears.
    assert_eq!(thinking.len(), 4);
    assert!(thinking.iter().all(|&i| i < first_content));

    let done = events.last().unwrap();
    assert_eq!(done["thinkingSteps"].as_array().unwrap().len(), 4);
    assert!(!done["thinkingSummary"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_public_chat_without_mention_is_silent() {
    let provider = FakeProvider::ok("gemini", LONG_ANSWER);
    let router = test_router(vec![provider.clone()]);

    let response = router
        .oneshot(post_json(
            "/v1/answer/stream",
            json!({
                "question": "does anyone have notes from yesterday?",
                "isPublicChat": true,
                "shouldCallAI": false
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["answer"], Value::Null);
    assert_eq!(body["shouldRespond"], false);
    // The pipeline never ran.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_public_chat_with_should_call_ai_answers() {
    let router = test_router(vec![FakeProvider::ok("gemini", LONG_ANSWER)]);

    let response = router
        .oneshot(post_json(
            "/v1/answer/stream",
            json!({
                "question": "@ai what is photosynthesis?",
                "isPublicChat": true,
                "shouldCallAI": true
            }),
        ))
        .await
        .unwrap();

    let events = stream_events(response).await;
    assert_eq!(events.last().unwrap()["type"], "done");
}

#[tokio::test]
async fn test_missing_question_is_bad_request() {
    let router = test_router(vec![FakeProvider::ok("gemini", LONG_ANSWER)]);

    let response = router
        .oneshot(post_json("/v1/answer/stream", json!({ "question": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "question is required");
}

#[tokio::test]
async fn test_mention_only_question_is_bad_request() {
    let router = test_router(vec![FakeProvider::ok("gemini", LONG_ANSWER)]);

    let response = router
        .oneshot(post_json("/v1/answer/stream", json!({ "question": "@ai" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_streaming_answer_endpoint() {
    let router = test_router(vec![FakeProvider::ok("gemini", LONG_ANSWER)]);

    let response = router
        .oneshot(post_json(
            "/v1/answer",
            json!({ "question": "explain photosynthesis thoroughly" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["provider"], "gemini");
    assert!(!body["answer"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_course_topics_are_highlighted_in_answer() {
    let provider = FakeProvider::ok(
        "gemini",
        "Photosynthesis is the process plants use to turn sunlight into usable chemical energy.",
    );
    let router = test_router(vec![provider]);

    let response = router
        .oneshot(post_json(
            "/v1/answer",
            json!({
                "question": "tell me about this week's material",
                "courseData": { "courseName": "Biology 101", "topics": ["photosynthesis"] }
            }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert!(body["answer"].as_str().unwrap().contains("[[Photosynthesis]]"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = test_router(vec![FakeProvider::ok("gemini", LONG_ANSWER)]);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["providers"][0], "gemini");
}

#[tokio::test]
async fn test_extract_endpoint_plain_text() {
    let router = test_router(vec![]);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/extract")
                .header(header::CONTENT_TYPE, "text/plain")
                .header("x-file-name", "notes.txt")
                .body(Body::from("lecture notes"))
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["text"], "lecture notes");
}

#[tokio::test]
async fn test_extract_endpoint_rejects_pdf_with_guidance() {
    let router = test_router(vec![]);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/extract")
                .header(header::CONTENT_TYPE, "application/pdf")
                .header("x-file-name", "slides.pdf")
                .body(Body::from(&b"%PDF-1.7"[..]))
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("slides.pdf"));
}
