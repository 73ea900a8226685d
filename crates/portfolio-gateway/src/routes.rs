//! HTTP surface: thin adapter from routes to the chat gateway and portfolio store.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use portfolio_core::{ChatError, ChatGateway, PortfolioRecord, PortfolioStore};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::session_cookie::CookieSigner;

pub const SERVICE_NAME: &str = "Portfolio Chatbot API";

#[derive(Clone)]
pub struct AppState {
    pub gateway: ChatGateway,
    pub portfolio: PortfolioStore,
    pub cookies: CookieSigner,
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_chat_ui))
        .route("/api/chat", post(chat_handler))
        .route("/api/clear", post(clear_handler))
        .route("/api/portfolio", get(portfolio_handler))
        .route("/health", get(health))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    response
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message, "status": "error" }))).into_response()
}

fn chat_error_response(err: &ChatError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_body(status, err.public_message())
}

/// Chat UI: single embedded page.
async fn serve_chat_ui() -> Html<&'static str> {
    const INDEX: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/index.html"));
    Html(INDEX)
}

/// POST /api/chat: one turn for the caller's session. The cookie is re-issued on
/// every call so its expiry slides with the server-side TTL.
async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let (session, fresh) = state.cookies.resolve(&headers);

    let mut response = match body {
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected chat body");
            error_body(StatusCode::BAD_REQUEST, "Invalid request body".to_string())
        }
        Ok(Json(req)) => match state.gateway.handle_turn(&session, &req.message).await {
            Ok(reply) => Json(json!({ "response": reply, "status": "success" })).into_response(),
            Err(err) => chat_error_response(&err),
        },
    };

    if fresh {
        tracing::debug!(session = %session, "issued new session");
    }
    response
        .headers_mut()
        .insert(header::SET_COOKIE, state.cookies.set_cookie(&session));
    response
}

/// POST /api/clear: reset the caller's conversation. No-op without a valid session.
async fn clear_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(session) = state.cookies.from_headers(&headers) {
        state.gateway.clear(&session);
    }
    Json(json!({ "status": "success", "message": "Chat cleared" })).into_response()
}

async fn portfolio_handler(State(state): State<Arc<AppState>>) -> Json<PortfolioRecord> {
    Json(state.portfolio.get().clone())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use portfolio_core::{
        ChatMessage, CompletionClient, ConversationTurn, InMemorySessionStore, SessionId,
        SystemPrompt,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    struct ScriptedClient {
        outcomes: Mutex<VecDeque<Result<String, ChatError>>>,
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String, ChatError> {
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ChatError::Unknown("script exhausted".into())))
        }
    }

    fn test_state(outcomes: Vec<Result<String, ChatError>>) -> Arc<AppState> {
        let portfolio = PortfolioStore::new(PortfolioRecord::builtin());
        let gateway = ChatGateway::new(
            Arc::new(SystemPrompt::build(portfolio.get())),
            Arc::new(InMemorySessionStore::default()),
            Arc::new(ScriptedClient {
                outcomes: Mutex::new(outcomes.into()),
            }),
        );
        Arc::new(AppState {
            gateway,
            portfolio,
            cookies: CookieSigner::new("test-secret", Duration::from_secs(7200)).unwrap(),
        })
    }

    fn chat_request(body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// `name=value` part of the response's Set-Cookie header.
    fn session_cookie(res: &Response) -> String {
        let raw = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    fn session_of(state: &AppState, cookie: &str) -> SessionId {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        state.cookies.from_headers(&headers).unwrap()
    }

    async fn json_body(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_service() {
        let app = build_app(test_state(vec![]));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "Portfolio Chatbot API");
    }

    #[tokio::test]
    async fn portfolio_returns_record() {
        let app = build_app(test_state(vec![]));
        let req = Request::builder().uri("/api/portfolio").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json, serde_json::to_value(PortfolioRecord::builtin()).unwrap());
    }

    #[tokio::test]
    async fn index_serves_chat_page() {
        let app = build_app(test_state(vec![]));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/api/chat"));
    }

    #[tokio::test]
    async fn chat_success_then_history_follows_cookie() {
        let state = test_state(vec![Ok("Hi there".into()), Ok("Python".into())]);
        let app = build_app(Arc::clone(&state));

        let res = app
            .clone()
            .oneshot(chat_request(r#"{"message":"Hello"}"#, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res);
        let json = json_body(res).await;
        assert_eq!(json["response"], "Hi there");
        assert_eq!(json["status"], "success");

        let res = app
            .oneshot(chat_request(r#"{"message":"Skills?"}"#, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(session_cookie(&res), cookie);

        let history = state.gateway.history(&session_of(&state, &cookie));
        assert_eq!(
            history,
            vec![
                ConversationTurn::user("Hello"),
                ConversationTurn::assistant("Hi there"),
                ConversationTurn::user("Skills?"),
                ConversationTurn::assistant("Python"),
            ]
        );
    }

    #[tokio::test]
    async fn empty_message_is_bad_request() {
        let app = build_app(test_state(vec![]));
        for body in [r#"{"message":"   "}"#, r#"{}"#] {
            let res = app.clone().oneshot(chat_request(body, None)).await.unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            let json = json_body(res).await;
            assert_eq!(json["error"], "Message cannot be empty");
            assert_eq!(json["status"], "error");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = build_app(test_state(vec![]));
        let res = app.oneshot(chat_request("not json", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["status"], "error");
    }

    #[tokio::test]
    async fn upstream_failures_map_to_status_codes() {
        let state = test_state(vec![
            Err(ChatError::Upstream { status: 503 }),
            Err(ChatError::Timeout),
            Err(ChatError::Unknown("dns lookup failed for internal-host".into())),
        ]);
        let app = build_app(state);

        let res = app.clone().oneshot(chat_request(r#"{"message":"a"}"#, None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(res).await["error"], "API Error: 503");

        let res = app.clone().oneshot(chat_request(r#"{"message":"b"}"#, None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json_body(res).await["error"], "Request timeout. Please try again.");

        let res = app.oneshot(chat_request(r#"{"message":"c"}"#, None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(res).await;
        assert_eq!(json["status"], "error");
        assert!(!json["error"].as_str().unwrap().contains("internal-host"));
    }

    #[tokio::test]
    async fn tampered_cookie_gets_fresh_session() {
        let state = test_state(vec![Ok("one".into())]);
        let app = build_app(Arc::clone(&state));
        let forged = format!("portfolio_session={}.00ff", SessionId::generate());

        let res = app
            .oneshot(chat_request(r#"{"message":"hi"}"#, Some(&forged)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let issued = session_cookie(&res);
        assert_ne!(issued, forged);
        assert_eq!(state.gateway.history(&session_of(&state, &issued)).len(), 2);
    }

    #[tokio::test]
    async fn clear_empties_the_session() {
        let state = test_state(vec![Ok("reply".into())]);
        let app = build_app(Arc::clone(&state));

        let res = app
            .clone()
            .oneshot(chat_request(r#"{"message":"hi"}"#, None))
            .await
            .unwrap();
        let cookie = session_cookie(&res);

        let req = Request::builder()
            .method("POST")
            .uri("/api/clear")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Chat cleared");
        assert!(state.gateway.history(&session_of(&state, &cookie)).is_empty());
    }

    #[tokio::test]
    async fn clear_without_session_still_succeeds() {
        let app = build_app(test_state(vec![]));
        let req = Request::builder()
            .method("POST")
            .uri("/api/clear")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
