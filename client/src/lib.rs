//! Long-poll chat client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `state::session` is the synchronous session state machine (join, chat,
//! leave, event rendering). `net` performs the I/O: `transport` sends
//! actions and decodes `ajax-response` envelopes, and `runner` drives the
//! controller from a command channel while keeping exactly one `getEvents`
//! request in flight. `view` is the seam to whatever renders the chat.

pub mod config;
pub mod error;
pub mod net;
pub mod state;
pub mod view;

pub use config::ClientConfig;
pub use error::ClientError;
pub use net::runner::{Command, SessionRunner};
pub use net::transport::{HttpTransport, Transport};
pub use state::session::{KeyOutcome, SessionController, SessionState};
pub use view::memory::MemoryView;
pub use view::render::{EntryStyle, LogEntry, Speaker, escape_controls};
pub use view::{ChatView, Panel};
