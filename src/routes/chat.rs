//! Chat endpoint: decodes `ajax` actions, answers with one envelope.
//!
//! DESIGN
//! ======
//! Session identity is the `CHATSESSION` cookie, minted on the first request
//! that lacks one. Each `ajax` parameter names one action; actions run in
//! order and their responses are concatenated into a single envelope.
//! Unknown actions produce an error response instead of failing the request.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use ajax::{Action, Response};
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tokio::time::Instant;
use tracing::{error, warn};
use uuid::Uuid;

use crate::services::room;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "CHATSESSION";

type Params = Vec<(String, String)>;

/// `GET /chat?ajax=…`
pub async fn get_chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<Params>,
) -> axum::response::Response {
    respond(&state, jar, params).await
}

/// `POST /chat` with a form body; query parameters come first.
pub async fn post_chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(mut params): Query<Params>,
    Form(body): Form<Params>,
) -> axum::response::Response {
    params.extend(body);
    respond(&state, jar, params).await
}

async fn respond(state: &AppState, jar: CookieJar, params: Params) -> axum::response::Response {
    let (jar, session) = session_id(jar);

    let methods: Vec<String> = ajax::requested_actions(&params).map(str::to_owned).collect();
    let mut responses = Vec::new();
    for method in methods {
        match Action::from_params(&method, &params) {
            Ok(action) => responses.extend(handle_action(state, &session, action).await),
            Err(err) => {
                warn!(%session, %method, error = %err, "chat: unknown action");
                responses.push(Response::Error(err.to_string()));
            }
        }
    }

    match ajax::encode_envelope(&responses) {
        Ok(body) => (jar, [(CONTENT_TYPE, "text/xml; charset=utf-8")], body).into_response(),
        Err(err) => {
            error!(%session, error = %err, "chat: failed to encode envelope");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode response").into_response()
        }
    }
}

/// Run one action for `session`.
async fn handle_action(state: &AppState, session: &str, action: Action) -> Vec<Response> {
    match action {
        Action::Join { name } => {
            let mut room = state.room.lock().await;
            room.join(session, &name, Instant::now());
            vec![Response::Members(room.roster()), Response::Joined]
        }
        Action::Leave => {
            state.room.lock().await.leave(session);
            vec![Response::Left]
        }
        Action::Chat { text } => {
            state.room.lock().await.chat(session, &text, Instant::now());
            Vec::new()
        }
        Action::GetEvents => vec![room::next_event(&state.room, session, state.config.poll_timeout).await],
        Action::GetMember { member } => vec![Response::Member(state.room.lock().await.member(&member))],
    }
}

/// Existing session cookie, or a fresh one added to the jar.
fn session_id(jar: CookieJar) -> (CookieJar, String) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            let id = cookie.value().to_owned();
            return (jar, id);
        }
    }
    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone())).path("/").http_only(true);
    (jar.add(cookie), id)
}
