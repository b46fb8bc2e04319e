//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/chat` speaks the `ajax-response` envelope for both GET and POST; the
//! action names arrive as one or more `ajax` parameters. `/healthz` is a
//! plain liveness probe.

pub mod chat;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/chat", get(chat::get_chat).post(chat::post_chat))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
