//! HTTP route handlers.
//!
//! Two answer endpoints share one pipeline: `/v1/answer/stream` plays the
//! result out as NDJSON events, `/v1/answer` returns it as a single JSON
//! body. Guard rails (public-chat silence, empty question) run before any
//! work is dispatched, so their failures are plain JSON responses rather
//! than stream events.

use crate::extract::extraction_failure_message;
use crate::search::fetch_snippet;
use crate::server::AppState;
use crate::stream::StreamEmitter;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::info;
use tutor_common::{
    assemble, classify, encode_line, highlight_terms, is_simple_question, needs_current_info,
    strip_mentions, AnswerRequest, AnswerResponse, ContextBundle, ProviderResult, Source,
};
use uuid::Uuid;

pub fn answer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/answer", post(answer_question))
        .route("/v1/answer/stream", post(answer_question_stream))
        .route("/v1/extract", post(extract_document))
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/health", get(health))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    providers: Vec<String>,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        providers: state.orchestrator.provider_names(),
    })
}

/// Pre-pipeline guards shared by both answer endpoints. `Err` carries the
/// ready-made short-circuit response.
fn admit(req: &AnswerRequest) -> Result<String, Response> {
    // In a shared room the assistant stays silent unless addressed.
    if req.is_public_chat && !req.should_call_ai {
        return Err(Json(json!({
            "success": true,
            "answer": null,
            "shouldRespond": false
        }))
        .into_response());
    }

    let question = strip_mentions(&req.question);
    if question.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "question is required"
            })),
        )
            .into_response());
    }

    Ok(question)
}

async fn answer_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    let question = match admit(&req) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    let request_id = Uuid::new_v4();
    info!("[Q]  {} \"{}\"", request_id, preview(&question));

    let result = generate_answer(&state, &req, &question).await;
    info!("[A]  {} answered by '{}'", request_id, result.provider);

    Json(AnswerResponse::from(result)).into_response()
}

async fn answer_question_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    let question = match admit(&req) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    let request_id = Uuid::new_v4();
    info!("[Q]  {} \"{}\" (streaming)", request_id, preview(&question));

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let emitter = StreamEmitter::new(tx, &state.config.pipeline);
        let result = generate_answer(&state, &req, &question).await;
        info!("[A]  {} answered by '{}'", request_id, result.provider);
        emitter.emit_answer(&result, req.thinking_mode).await;
    });

    ndjson_response(rx)
}

/// Wrap the event channel as a chunked NDJSON body. The response starts
/// immediately; lines arrive as the pipeline produces them.
fn ndjson_response(rx: mpsc::UnboundedReceiver<tutor_common::StreamEvent>) -> Response {
    let body = Body::from_stream(
        UnboundedReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(encode_line(&event))),
    );
    (
        [
            (header::CONTENT_TYPE, "application/x-ndjson"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

/// The full pipeline for one admitted question. Infallible by construction:
/// the orchestrator always yields some answer.
async fn generate_answer(
    state: &AppState,
    req: &AnswerRequest,
    question: &str,
) -> ProviderResult {
    let query_type = classify(question);
    let simple = is_simple_question(question);

    let profile = req
        .user_id
        .as_deref()
        .and_then(|id| state.profiles.learning_profile(id));

    let current_info = if needs_current_info(question) {
        let snippet = fetch_snippet(
            state.search.as_ref(),
            question,
            state.config.pipeline.search_timeout_secs,
        )
        .await;
        if snippet.is_empty() {
            None
        } else {
            Some(snippet)
        }
    } else {
        None
    };
    let searched = current_info.is_some();

    let bundle = ContextBundle {
        extra_context: req.context.clone(),
        course: req.course_data.clone(),
        enrolled: req.all_syllabi.clone(),
        profile,
        current_info,
        history: req.conversation_history.clone(),
    };
    let assembled = assemble(&bundle);

    let prompt = tutor_common::build_prompt(question, query_type, &assembled, simple);
    let opts = crate::providers::GenerationOptions {
        max_tokens: query_type.max_tokens(),
        thinking_mode: req.thinking_mode,
        search_required: searched,
    };

    let mut result = state
        .orchestrator
        .generate(&prompt, &opts, question, &bundle)
        .await;

    if searched && result.sources.is_empty() {
        result.sources.push(Source {
            title: "Live web search".to_string(),
            url: None,
        });
    }

    result.answer = highlight_terms(&result.answer, &assembled.highlight_terms);
    result
}

async fn extract_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mime_hint = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let file_name = headers
        .get("x-file-name")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("attachment")
        .to_string();

    match state.extractor.extract(&body, mime_hint.as_deref()) {
        Ok(text) => Json(json!({ "success": true, "text": text })).into_response(),
        Err(e) => Json(json!({
            "success": false,
            "message": extraction_failure_message(&file_name, &e)
        }))
        .into_response(),
    }
}

fn preview(question: &str) -> String {
    let mut p: String = question.chars().take(80).collect();
    if p.len() < question.len() {
        p.push_str("...");
    }
    p
}
