//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - `POST /api/generate-problem` and `POST /api/feedback`
/// - `GET /api/health`
/// - CORS (allow any origin/method/headers) so a browser page on another origin can call us
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(http::http_health))
        .route("/api/generate-problem", post(http::http_generate_problem))
        .route("/api/feedback", post(http::http_post_feedback))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeminiConfig, Prompts};
    use crate::error::GatewayError;
    use crate::gemini::{Gemini, LlmGateway};
    use crate::logic::tests::ScriptedGateway;
    use crate::protocol::{ErrorKind, ErrorOut, FeedbackOut};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app(gw: Arc<ScriptedGateway>) -> Router {
        build_router(Arc::new(AppState::new(gw, Prompts::default())))
    }

    async fn post(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn generate_returns_exactly_the_two_fields() {
        let gw = ScriptedGateway::new(|| {
            Ok("Here you go: {\"problem_text\":\"Tom has 5 apples and buys 3 more. How many now?\",\"final_answer\":8,\"extra\":1}".into())
        });
        let (status, body) = post(app(gw), "/api/generate-problem", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({"problem_text": "Tom has 5 apples and buys 3 more. How many now?", "final_answer": 8})
        );
    }

    #[tokio::test]
    async fn generate_failures_are_distinct_and_never_200() {
        let cases: [(fn() -> Result<String, GatewayError>, StatusCode, ErrorKind); 4] = [
            (|| Err(GatewayError::EmptyResponse), StatusCode::BAD_GATEWAY, ErrorKind::EmptyResponse),
            (|| Err(GatewayError::NotConfigured), StatusCode::BAD_GATEWAY, ErrorKind::Transport),
            (|| Err(GatewayError::MalformedResponse("expected value".into())), StatusCode::BAD_GATEWAY, ErrorKind::Transport),
            (|| Ok("no json".into()), StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Unparsable),
        ];
        for (reply, want_status, want_kind) in cases {
            let (status, body) = post(app(ScriptedGateway::new(reply)), "/api/generate-problem", "").await;
            assert_eq!(status, want_status);
            let err: ErrorOut = serde_json::from_value(body).unwrap();
            assert_eq!(err.kind, want_kind);
            assert!(!err.error.is_empty());
            assert_eq!(err.raw.is_some(), want_kind == ErrorKind::Unparsable);
        }
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_failure() {
        // Port 1 on loopback refuses connections, so reqwest itself errors.
        let gemini = Gemini::new(GeminiConfig {
            api_key: Some("test-key".into()),
            base_url: "http://127.0.0.1:1/v1beta".into(),
            ..GeminiConfig::default()
        });
        assert!(matches!(gemini.generate_text("hi").await, Err(GatewayError::Transport(_))));

        let app = build_router(Arc::new(AppState::new(Arc::new(gemini), Prompts::default())));
        let (status, body) = post(app, "/api/generate-problem", "").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let err: ErrorOut = serde_json::from_value(body).unwrap();
        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.error, "Provider request failed");
    }

    #[tokio::test]
    async fn feedback_endpoint_always_answers() {
        let body = r#"{"problemText":"2+2?","userAnswer":5,"finalAnswer":4}"#;
        let (status, out) = post(app(ScriptedGateway::new(|| Err(GatewayError::EmptyResponse))), "/api/feedback", body).await;
        assert_eq!(status, StatusCode::OK);
        let out: FeedbackOut = serde_json::from_value(out).unwrap();
        assert_eq!(out.feedback, "Good effort!");
    }
}
