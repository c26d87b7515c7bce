// HTTP request handlers

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use super::middleware::{auth_middleware, track_errors};
use super::session::{SessionError, SessionState};
use super::WellnessServer;
use crate::analysis::{classify, ClassificationResult, ConversationInput};
use crate::conversation::{require_user_messages, ChatMessage, ConversationError};
use crate::responder::{encode_data_frame, stream_words, FINISH_FRAME};

/// Response header carrying the session id
pub const SESSION_HEADER: &str = "x-session-id";

/// Create the main application router
pub fn create_router(server: Arc<WellnessServer>) -> Router {
    Router::new()
        .route("/api/analyze", post(handle_analyze))
        .route("/api/chat", post(handle_chat))
        .route("/api/session/:id", get(get_session).delete(delete_session))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&server),
            auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&server),
            track_errors,
        ))
        .with_state(server)
}

/// Request body shared by /api/analyze and /api/chat
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest {
    /// Full conversation so far, oldest first
    pub messages: Vec<ChatMessage>,
    /// Session to attach the conversation to
    #[serde(default)]
    pub session_id: Option<String>,
}

fn parse_request(
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<ConversationRequest, AppError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Attach a request to its session, creating one when needed.
///
/// Returns `None` when the session table is full; the request then runs
/// without a session.
fn open_session(server: &WellnessServer, requested: Option<&str>) -> Option<String> {
    match server.session_manager().get_or_create(requested) {
        Ok(session) => Some(session.id),
        Err(e) => {
            tracing::warn!(error = %e, "Serving request without a session");
            None
        }
    }
}

/// Apply a change to a session that may have been deleted meanwhile
fn record_in_session(
    server: &WellnessServer,
    session_id: &str,
    f: impl FnOnce(&mut SessionState),
) {
    if let Err(e) = server.session_manager().modify(session_id, f) {
        tracing::debug!(error = %e, "Session closed before the request finished");
    }
}

/// Handle POST /api/analyze - classify a conversation
async fn handle_analyze(
    State(server): State<Arc<WellnessServer>>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = parse_request(payload)?;

    require_user_messages(
        &request.messages,
        server.config().analysis.min_user_messages,
    )?;

    let result = classify(&ConversationInput::from_messages(&request.messages));
    server.metrics().record_analysis(&result);

    let session_id = open_session(&server, request.session_id.as_deref());

    tracing::info!(
        session_id = session_id.as_deref().unwrap_or("-"),
        mood = %result.overall_mood,
        score = result.mood_score,
        risk = %result.risk_level,
        "Conversation analyzed"
    );

    let mut response = Json(result.clone()).into_response();
    if let Some(id) = session_id {
        let messages = request.messages;
        record_in_session(&server, &id, |session| {
            session.messages = messages;
            session.last_analysis = Some(result);
        });
        let value = HeaderValue::from_str(&id).map_err(anyhow::Error::from)?;
        response.headers_mut().insert(SESSION_HEADER, value);
    }

    Ok(response)
}

/// Handle POST /api/chat - stream the assistant's next turn word by word
async fn handle_chat(
    State(server): State<Arc<WellnessServer>>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = parse_request(payload)?;

    if request.messages.is_empty() {
        return Err(ConversationError::Empty.into());
    }

    let session_id = open_session(&server, request.session_id.as_deref());

    let delay = server.thinking_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let (reply, source) = server
        .responder()
        .respond_with_source(&request.messages)
        .await?;
    server.metrics().record_chat(source);

    tracing::info!(
        session_id = session_id.as_deref().unwrap_or("-"),
        responder = %source,
        words = reply.split(' ').count(),
        "Streaming reply"
    );

    if let Some(id) = &session_id {
        let mut messages = request.messages;
        messages.push(ChatMessage::assistant(reply.clone()));
        record_in_session(&server, id, |session| session.messages = messages);
    }

    let words = stream_words(
        &reply,
        server.stream_pacing(),
        Arc::clone(server.picker()),
        server.shutdown_token(),
    );
    let frames = words
        .map(|word| Ok::<_, Infallible>(encode_data_frame(&word)))
        .chain(stream::once(async {
            Ok::<_, Infallible>(FINISH_FRAME.to_string())
        }));

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("x-vercel-ai-data-stream", "v1");
    if let Some(id) = session_id {
        builder = builder.header(SESSION_HEADER, id);
    }

    let response = builder
        .body(Body::from_stream(frames))
        .map_err(anyhow::Error::from)?;

    Ok(response)
}

/// Session information
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub created_at: String,
    pub last_activity: String,
    pub message_count: usize,
    pub last_analysis: Option<ClassificationResult>,
}

/// Handle GET /api/session/:id - Retrieve session state
async fn get_session(
    State(server): State<Arc<WellnessServer>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>, AppError> {
    let session = server
        .session_manager()
        .get(&session_id)
        .ok_or(SessionError::NotFound(session_id))?;

    Ok(Json(SessionInfo {
        id: session.id,
        created_at: session.created_at.to_rfc3339(),
        last_activity: session.last_activity.to_rfc3339(),
        message_count: session.messages.len(),
        last_analysis: session.last_analysis,
    }))
}

/// Handle DELETE /api/session/:id - Delete session
async fn delete_session(
    State(server): State<Arc<WellnessServer>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if server.session_manager().delete(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(SessionError::NotFound(session_id).into())
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

/// Handle GET /health - Health check endpoint
pub async fn health_check(State(server): State<Arc<WellnessServer>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        uptime_seconds: server.uptime().as_secs(),
        active_sessions: server.session_manager().active_count(),
    })
}

/// Handle GET /metrics - Prometheus metrics endpoint
pub async fn metrics_endpoint(
    State(server): State<Arc<WellnessServer>>,
) -> Result<Response, AppError> {
    let body = server.metrics().render()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Application error mapped to an HTTP status.
///
/// Internal failures never leak their detail to the client; it is logged
/// instead.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error", message)
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "Missing or invalid API key".to_string(),
            ),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found_error", message),
            AppError::Internal(error) => {
                tracing::error!(error = %format!("{:#}", error), "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "api_error",
                    "Internal server error".to_string(),
                )
            }
        };

        if status.is_client_error() {
            tracing::debug!(status = %status, message = %message, "Rejected request");
        }

        let body = serde_json::json!({
            "error": {
                "message": message,
                "type": error_type
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<ConversationError> for AppError {
    fn from(err: ConversationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::LimitReached { .. } => Self::Internal(err.into()),
            SessionError::NotFound(_) => Self::NotFound(err.to_string()),
        }
    }
}
