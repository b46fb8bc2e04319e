//! Session runner: drives a [`SessionController`] over a [`Transport`].
//!
//! DESIGN
//! ======
//! User input arrives as [`Command`]s on an mpsc channel and is handled one
//! at a time. The poll loop runs as its own task so chat can be sent while a
//! `getEvents` request is parked on the server.
//!
//! LIFECYCLE
//! =========
//! 1. `Join` → send `join` → controller returns `getEvents` → poll task starts
//! 2. Poll task: send `getEvents` → controller handles envelope → repeat
//! 3. `Leave` → cancel the poll token (aborts the in-flight poll) → send `leave`
//! 4. `leave` request fails → still joined, so a fresh poll task is started
//!
//! Each poll task owns a fresh `CancellationToken`. Starting a new one first
//! cancels the previous task and waits for it to exit, so at most one
//! `getEvents` is ever in flight.
//! A failed poll is logged and not retried.

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;

use std::sync::Arc;

use ajax::Action;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::transport::Transport;
use crate::state::session::{SessionController, SessionState};
use crate::view::ChatView;

/// Input from the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Join button with the username input's contents.
    Join(String),
    /// Send button with the chat input's contents.
    Chat(String),
    /// Key press inside the chat input.
    KeyPress { code: u32, text: String },
    Leave,
    /// Roster entry clicked.
    LookupMember(String),
    /// Stop the runner.
    Quit,
}

struct PollTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct SessionRunner<V> {
    transport: Arc<dyn Transport>,
    controller: Arc<Mutex<SessionController<V>>>,
    poll: Option<PollTask>,
}

impl<V> SessionRunner<V> {
    /// Shared handle to the controller (and through it, the view).
    #[must_use]
    pub fn controller(&self) -> Arc<Mutex<SessionController<V>>> {
        Arc::clone(&self.controller)
    }

    /// Whether a poll task is currently running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|task| !task.handle.is_finished())
    }

    /// Cancel the poll task and wait for it to drop its in-flight request.
    async fn stop_polling(&mut self) {
        if let Some(task) = self.poll.take() {
            task.token.cancel();
            if let Err(err) = task.handle.await {
                warn!(error = %err, "poll task ended abnormally");
            }
            debug!("poll loop stopped");
        }
    }
}

impl<V: ChatView + 'static> SessionRunner<V> {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, view: V) -> Self {
        Self { transport, controller: Arc::new(Mutex::new(SessionController::new(view))), poll: None }
    }

    /// Handle commands until `Quit` or until every sender is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        info!("session runner started");
        while let Some(command) = commands.recv().await {
            if command == Command::Quit {
                break;
            }
            self.dispatch(command).await;
        }
        self.stop_polling().await;
        info!("session runner stopped");
    }

    /// Handle a single command to completion.
    pub async fn dispatch(&mut self, command: Command) {
        let action = {
            let mut controller = self.controller.lock().await;
            match command {
                Command::Join(name) => controller.join(&name),
                Command::Chat(text) => controller.submit_chat(&text),
                Command::KeyPress { code, text } => controller.on_chat_key(code, &text).1,
                Command::Leave => controller.leave(),
                Command::LookupMember(member) => controller.lookup_member(&member),
                Command::Quit => None,
            }
        };

        let Some(action) = action else {
            return;
        };
        if action == Action::Leave {
            self.stop_polling().await;
        }
        self.exchange(action).await;
    }

    /// Send `action`, hand its envelope to the controller, and apply the
    /// controller's decision about polling.
    async fn exchange(&mut self, action: Action) {
        let responses = match self.transport.send(&action).await {
            Ok(responses) => responses,
            Err(err) => {
                warn!(action = action.name(), error = %err, "request failed");
                if action == Action::Leave {
                    self.resume_after_failed_leave().await;
                }
                return;
            }
        };

        let (next, state) = {
            let mut controller = self.controller.lock().await;
            let next = controller.handle_responses(responses);
            (next, controller.state())
        };

        match (next, state) {
            (Some(poll), _) => self.start_polling(poll).await,
            (None, SessionState::NotJoined) => self.stop_polling().await,
            (None, SessionState::Joined) => {}
        }
    }

    /// The poll was cancelled for a `leave` the server never saw.
    async fn resume_after_failed_leave(&mut self) {
        if self.controller.lock().await.state() == SessionState::Joined {
            info!("leave failed; resuming poll");
            self.start_polling(Action::GetEvents).await;
        }
    }

    async fn start_polling(&mut self, first: Action) {
        self.stop_polling().await;
        let token = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&self.transport),
            Arc::clone(&self.controller),
            token.clone(),
            first,
        ));
        self.poll = Some(PollTask { token, handle });
        debug!("poll loop started");
    }
}

impl<V> Drop for SessionRunner<V> {
    fn drop(&mut self) {
        if let Some(task) = self.poll.take() {
            task.token.cancel();
        }
    }
}

/// Long-poll until the controller stops asking, the token is cancelled, or
/// a request fails.
async fn poll_loop<V: ChatView>(
    transport: Arc<dyn Transport>,
    controller: Arc<Mutex<SessionController<V>>>,
    token: CancellationToken,
    first: Action,
) {
    let mut next = Some(first);
    while let Some(action) = next.take() {
        let result = tokio::select! {
            biased;
            () = token.cancelled() => return,
            result = transport.send(&action) => result,
        };

        let responses = match result {
            Ok(responses) => responses,
            Err(err) => {
                warn!(error = %err, "poll failed; no further events will be delivered");
                return;
            }
        };

        let mut session = controller.lock().await;
        // A leave may have landed while this poll was completing.
        if token.is_cancelled() {
            return;
        }
        next = session.handle_responses(responses);
    }
    debug!("poll loop finished");
}
