//! HTTP API for the primary role.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::primary::Coordinator;

pub struct AppState {
    pub coordinator: Coordinator,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/messages", post(append_message).get(list_messages))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct MessageCreate {
    message: String,
    #[serde(default = "default_write_concern")]
    write_concern: u32,
}

fn default_write_concern() -> u32 {
    1
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    id: u64,
    message: String,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct MessageList {
    messages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::QuorumLost => StatusCode::SERVICE_UNAVAILABLE,
            Error::WriteConcernUnmet => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

async fn append_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MessageCreate>,
) -> Result<Json<MessageResponse>, Error> {
    let id = state
        .coordinator
        .append(body.message.clone(), body.write_concern)
        .await?;
    Ok(Json(MessageResponse {
        id,
        message: body.message,
        status: "success",
    }))
}

async fn list_messages(State(state): State<Arc<AppState>>) -> Json<MessageList> {
    Json(MessageList {
        messages: state.coordinator.list(),
    })
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.coordinator.health())
}
