//! HTTP API for the secondary role.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::secondary::OrderedStorage;

pub struct AppState {
    pub storage: Arc<OrderedStorage>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/messages", get(list_messages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct MessageList {
    messages: Vec<String>,
}

async fn list_messages(State(state): State<Arc<AppState>>) -> Json<MessageList> {
    Json(MessageList {
        messages: state.storage.get_all(),
    })
}
