//! Chat session state machine.
//!
//! DESIGN
//! ======
//! `SessionController` is synchronous and performs no I/O. Each operation
//! mutates session state, drives the [`ChatView`], and returns the request
//! the caller should send next (if any). The runner in `net::runner` owns
//! the actual sending, which keeps every rule here testable without a
//! transport.
//!
//! STATE MACHINE
//! =============
//! `NotJoined --join(valid)--> Joined --left--> NotJoined`. While joined,
//! every handled envelope carrying `joined`, `event` or `poll` yields
//! exactly one follow-up `getEvents`; an envelope carrying `left` yields
//! none, which is what ends the poll loop.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use ajax::{Action, Response};
use tracing::{debug, warn};

use crate::view::render::LogEntry;
use crate::view::{ChatView, Panel};

/// Key codes that submit the chat input (CR and LF).
pub const ENTER_KEY_CODES: [u32; 2] = [13, 10];

pub const EMPTY_USERNAME_ALERT: &str = "Please enter a username!";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    NotJoined,
    Joined,
}

/// Whether a key press was consumed by the chat input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Suppress the default form submission.
    Handled,
    PassThrough,
}

/// One chat session: membership state, last rendered speaker, and the view.
pub struct SessionController<V> {
    view: V,
    state: SessionState,
    username: Option<String>,
    last_speaker: String,
}

impl<V: ChatView> SessionController<V> {
    #[must_use]
    pub fn new(view: V) -> Self {
        Self { view, state: SessionState::NotJoined, username: None, last_speaker: String::new() }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Name most recently submitted through [`SessionController::join`].
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn last_speaker(&self) -> &str {
        &self.last_speaker
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    // =========================================================================
    // USER ACTIONS
    // =========================================================================

    /// Validate the username input and produce the `join` request.
    ///
    /// The request carries the name with surrounding whitespace trimmed; the
    /// server applies the same trim, so `" alice"` and `"alice"` are one
    /// member. An empty (or whitespace-only) name raises one alert and
    /// produces no request.
    pub fn join(&mut self, username: &str) -> Option<Action> {
        let name = username.trim();
        if name.is_empty() {
            self.view.alert(EMPTY_USERNAME_ALERT);
            return None;
        }
        self.username = Some(name.to_owned());
        Some(Action::Join { name: name.to_owned() })
    }

    /// Produce the `leave` request. Only meaningful while joined.
    pub fn leave(&mut self) -> Option<Action> {
        match self.state {
            SessionState::Joined => Some(Action::Leave),
            SessionState::NotJoined => None,
        }
    }

    /// Submit the chat input. Blank text is ignored without feedback.
    ///
    /// The text is sent exactly as typed; escaping happens at render time.
    pub fn submit_chat(&mut self, text: &str) -> Option<Action> {
        if text.trim().is_empty() {
            return None;
        }
        self.view.clear_chat_input();
        Some(Action::Chat { text: text.to_owned() })
    }

    /// Key press inside the chat input. Enter submits; other keys pass through.
    pub fn on_chat_key(&mut self, key_code: u32, text: &str) -> (KeyOutcome, Option<Action>) {
        if ENTER_KEY_CODES.contains(&key_code) {
            (KeyOutcome::Handled, self.submit_chat(text))
        } else {
            (KeyOutcome::PassThrough, None)
        }
    }

    /// Produce a `getMember` request for a roster entry.
    pub fn lookup_member(&mut self, member: &str) -> Option<Action> {
        let member = member.trim();
        if member.is_empty() {
            return None;
        }
        Some(Action::GetMember { member: member.to_owned() })
    }

    // =========================================================================
    // RESPONSES
    // =========================================================================

    /// Apply one decoded envelope and return the follow-up poll, if any.
    ///
    /// At most one `getEvents` is returned per envelope, however many
    /// events it carried, so the caller never has two polls in flight.
    pub fn handle_responses(&mut self, responses: Vec<Response>) -> Option<Action> {
        let mut rearm = false;
        for response in responses {
            match response {
                Response::Joined => {
                    self.enter(SessionState::Joined);
                    rearm = true;
                }
                Response::Left => {
                    self.enter(SessionState::NotJoined);
                    rearm = false;
                }
                Response::Event(event) => {
                    self.render_event(&event);
                    rearm = true;
                }
                Response::PollAck => rearm = true,
                Response::Members(names) => self.view.set_roster(&names),
                Response::Member(member) => self.view.show_member(&member),
                Response::Error(message) => warn!(%message, "server reported an error"),
                Response::Unknown { kind, id } => debug!(%kind, %id, "ignoring unrecognized response"),
            }
        }
        (rearm && self.state == SessionState::Joined).then_some(Action::GetEvents)
    }

    fn enter(&mut self, state: SessionState) {
        self.state = state;
        let panel = match state {
            SessionState::Joined => Panel::Joined,
            SessionState::NotJoined => Panel::Join,
        };
        self.view.show_panel(panel);
        self.view.rebind();
    }

    fn render_event(&mut self, event: &ajax::ChatEvent) {
        let entry = LogEntry::from_event(event, &mut self.last_speaker);
        self.view.append_entry(&entry);
        self.view.scroll_to_bottom();
    }
}
