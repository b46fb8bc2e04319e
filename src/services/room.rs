//! Chat room service: membership, per-member event queues, long-poll waits.
//!
//! DESIGN
//! ======
//! Members are keyed by session id (the `CHATSESSION` cookie). Every
//! broadcast appends the event to each member's queue and wakes that
//! member's `Notify`. A `getEvents` request takes at most one queued event;
//! with an empty queue it waits on the member's `Notify` outside the room
//! lock, bounded by the poll timeout.
//!
//! `Notify::notify_one` stores a permit when nobody is waiting, so an event
//! broadcast between "queue empty" and "start waiting" is never missed. A
//! stale permit only costs one empty `poll` reply.

#[cfg(test)]
#[path = "room_test.rs"]
mod room_test;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use ajax::{ChatEvent, MemberInfo, Response};
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, info};

/// Name given to members who join without one.
pub const DEFAULT_NAME: &str = "Newbie";

struct Member {
    name: String,
    /// Join order, used to list the roster.
    seq: u64,
    events: VecDeque<ChatEvent>,
    notify: Arc<Notify>,
    last_seen: Instant,
}

/// Result of asking the room for the next event of a session.
pub enum Poll {
    /// The session is not (or no longer) a member.
    NotMember,
    Ready(ChatEvent),
    /// Nothing queued; wait on the notifier and ask again.
    Pending(Arc<Notify>),
}

#[derive(Default)]
pub struct ChatRoom {
    members: HashMap<String, Member>,
    next_seq: u64,
}

impl ChatRoom {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Join or rename. Returns the effective name.
    pub fn join(&mut self, session: &str, name: &str, now: Instant) -> String {
        let name = match name.trim() {
            "" => DEFAULT_NAME.to_owned(),
            trimmed => trimmed.to_owned(),
        };

        if let Some(member) = self.members.get_mut(session) {
            member.last_seen = now;
            if member.name != name {
                let old = std::mem::replace(&mut member.name, name.clone());
                info!(%session, %old, new = %name, "chat: rename");
                self.broadcast(&announcement(&name, format!("{name} has changed their name from {old}")));
            }
            return name;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.members.insert(
            session.to_owned(),
            Member {
                name: name.clone(),
                seq,
                events: VecDeque::new(),
                notify: Arc::new(Notify::new()),
                last_seen: now,
            },
        );
        info!(%session, %name, members = self.members.len(), "chat: join");
        self.broadcast(&announcement(&name, format!("{name} has joined the chat")));
        name
    }

    /// Remove the session's member. Returns the departed name.
    pub fn leave(&mut self, session: &str) -> Option<String> {
        let member = self.members.remove(session)?;
        // Wake a parked poll so it can answer `left`.
        member.notify.notify_one();
        info!(%session, name = %member.name, members = self.members.len(), "chat: leave");
        self.broadcast(&announcement(&member.name, format!("{} has left the chat", member.name)));
        Some(member.name)
    }

    /// Broadcast `text` from the session's member. Non-members are ignored.
    pub fn chat(&mut self, session: &str, text: &str, now: Instant) -> bool {
        let Some(member) = self.members.get_mut(session) else {
            debug!(%session, "chat: message from non-member ignored");
            return false;
        };
        member.last_seen = now;
        let event = ChatEvent { from: member.name.clone(), alert: false, text: text.to_owned() };
        self.broadcast(&event);
        true
    }

    /// Take the next queued event for `session`.
    pub fn poll(&mut self, session: &str, now: Instant) -> Poll {
        let Some(member) = self.members.get_mut(session) else {
            return Poll::NotMember;
        };
        member.last_seen = now;
        match member.events.pop_front() {
            Some(event) => Poll::Ready(event),
            None => Poll::Pending(Arc::clone(&member.notify)),
        }
    }

    /// Member names in join order.
    #[must_use]
    pub fn roster(&self) -> Vec<String> {
        let mut members: Vec<&Member> = self.members.values().collect();
        members.sort_by_key(|m| m.seq);
        members.into_iter().map(|m| m.name.clone()).collect()
    }

    #[must_use]
    pub fn member(&self, name: &str) -> MemberInfo {
        let present = self.members.values().any(|m| m.name == name);
        MemberInfo { name: name.to_owned(), present }
    }

    /// Remove members not seen within `idle`, announcing each departure.
    pub fn evict_idle(&mut self, now: Instant, idle: Duration) -> Vec<String> {
        let stale: Vec<String> = self
            .members
            .iter()
            .filter(|(_, m)| now.saturating_duration_since(m.last_seen) > idle)
            .map(|(session, _)| session.clone())
            .collect();
        stale.iter().filter_map(|session| self.leave(session)).collect()
    }

    fn broadcast(&mut self, event: &ChatEvent) {
        for member in self.members.values_mut() {
            member.events.push_back(event.clone());
            member.notify.notify_one();
        }
    }
}

/// Answer a `getEvents` request: one event, `poll` after `timeout`, or `left`
/// for a non-member.
pub async fn next_event(room: &Mutex<ChatRoom>, session: &str, timeout: Duration) -> Response {
    let notify = match room.lock().await.poll(session, Instant::now()) {
        Poll::NotMember => return Response::Left,
        Poll::Ready(event) => return Response::Event(event),
        Poll::Pending(notify) => notify,
    };

    if tokio::time::timeout(timeout, notify.notified()).await.is_err() {
        debug!(%session, "chat: poll timed out");
    }

    match room.lock().await.poll(session, Instant::now()) {
        Poll::NotMember => Response::Left,
        Poll::Ready(event) => Response::Event(event),
        Poll::Pending(_) => Response::PollAck,
    }
}

fn announcement(from: &str, text: String) -> ChatEvent {
    ChatEvent { from: from.to_owned(), alert: true, text }
}
