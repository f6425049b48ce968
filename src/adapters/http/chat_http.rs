//! Chat HTTP server.
//!
//! Serves the participant chat page and the JSON API behind it: session
//! start, turn submission, session view and teardown, plus a read-only view
//! of the allocation ledger for the research team.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::script;
use crate::domain::models::{AllocationCaps, LedgerSnapshot, ServerConfig, SessionView};
use crate::services::{DialogueService, TurnOutcome};

const CHAT_PAGE_TEMPLATE: &str = include_str!("chat_page.html");

/// Request to submit one utterance.
#[derive(Debug, Deserialize)]
pub struct SubmitTurnRequest {
    pub message: String,
}

/// One ledger cell.
#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerRowResponse {
    pub condition: String,
    pub tone: String,
    pub mirroring: String,
    pub count: u32,
}

/// Ledger counts together with the caps they are checked against.
#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerResponse {
    pub rows: Vec<LedgerRowResponse>,
    pub total: u32,
    pub per_condition_cap: u32,
    pub global_cap: u32,
    pub remaining: u32,
    pub exhausted: bool,
}

impl LedgerResponse {
    pub fn new(snapshot: &LedgerSnapshot, caps: &AllocationCaps) -> Self {
        Self {
            rows: snapshot
                .rows
                .iter()
                .map(|r| LedgerRowResponse {
                    condition: r.condition.letter().to_string(),
                    tone: r.condition.tone.label().to_string(),
                    mirroring: r.condition.mirroring.label().to_string(),
                    count: r.count,
                })
                .collect(),
            total: snapshot.total(),
            per_condition_cap: caps.per_condition,
            global_cap: caps.global,
            remaining: snapshot.remaining(caps),
            exhausted: snapshot.is_exhausted(caps),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &DomainError) -> ApiError {
    let (status, code, message) = match err {
        DomainError::StudyFull => (StatusCode::SERVICE_UNAVAILABLE, "STUDY_FULL", err.to_string()),
        DomainError::AllocationContended { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "ALLOCATION_CONTENDED",
            err.to_string(),
        ),
        // The participant sees the warning text itself.
        DomainError::InputRejected(warning) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INPUT_REJECTED", warning.clone())
        }
        DomainError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        DomainError::SessionCompleted(_) => (
            StatusCode::CONFLICT,
            "SESSION_COMPLETED",
            script::COMPLETED_NOTICE.to_string(),
        ),
        DomainError::UnknownCondition(_) | DomainError::ValidationFailed(_) => {
            (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
        }
        DomainError::DatabaseError(_)
        | DomainError::SerializationError(_)
        | DomainError::ExecutionFailed(_) => {
            tracing::error!(error = %err, "Request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", err.to_string())
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
        }),
    )
}

/// Shared state for the chat HTTP server.
struct AppState {
    dialogue: Arc<DialogueService>,
    page: String,
}

/// Chat HTTP server.
pub struct ChatHttpServer {
    config: ServerConfig,
    dialogue: Arc<DialogueService>,
    max_input_chars: usize,
}

impl ChatHttpServer {
    pub fn new(dialogue: Arc<DialogueService>, config: ServerConfig, max_input_chars: usize) -> Self {
        Self {
            config,
            dialogue,
            max_input_chars,
        }
    }

    /// Build the router.
    pub fn build_router(self) -> Router {
        let state = Arc::new(AppState {
            dialogue: self.dialogue,
            page: render_page(self.max_input_chars),
        });

        let app = Router::new()
            .route("/", get(chat_page))
            .route("/api/v1/sessions", post(start_session))
            .route(
                "/api/v1/sessions/{id}",
                get(get_session).delete(end_session),
            )
            .route("/api/v1/sessions/{id}/turns", post(submit_turn))
            .route("/api/v1/ledger", get(get_ledger))
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.enable_cors {
            app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("Chat HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("Chat HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

fn render_page(max_input_chars: usize) -> String {
    CHAT_PAGE_TEMPLATE
        .replace("{{instructions}}", script::INSTRUCTIONS)
        .replace("{{placeholder}}", &script::input_placeholder(max_input_chars))
        .replace("{{max_input_chars}}", &max_input_chars.to_string())
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn chat_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn start_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    state
        .dialogue
        .start_session()
        .await
        .map(|view| (StatusCode::CREATED, Json(view)))
        .map_err(|e| api_error(&e))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state.dialogue.view(id).await.map(Json).map_err(|e| api_error(&e))
}

async fn submit_turn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitTurnRequest>,
) -> Result<Json<TurnOutcome>, ApiError> {
    state
        .dialogue
        .submit_turn(id, &req.message)
        .await
        .map(Json)
        .map_err(|e| api_error(&e))
}

async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .dialogue
        .end_session(id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| api_error(&e))
}

async fn get_ledger(State(state): State<Arc<AppState>>) -> Result<Json<LedgerResponse>, ApiError> {
    let allocation = state.dialogue.allocation();
    let snapshot = allocation.snapshot().await.map_err(|e| api_error(&e))?;
    Ok(Json(LedgerResponse::new(&snapshot, &allocation.caps())))
}
