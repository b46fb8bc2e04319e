//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the single chat room and the server configuration. The room mutex
//! is never held across the long-poll wait.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::services::room::ChatRoom;

/// Clone is required by Axum; the room is `Arc`-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub room: Arc<Mutex<ChatRoom>>,
    pub config: ServerConfig,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { room: Arc::new(Mutex::new(ChatRoom::new())), config }
    }
}
