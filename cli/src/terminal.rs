//! Line-oriented [`ChatView`] for a terminal.
//!
//! The chat log owns the writer (stdout in the binary); diagnostics go to
//! stderr through `tracing`. There is no input widget to clear or rebind,
//! so those calls are no-ops.
//!
//! Names and text come from other members. Everything remote goes through
//! [`escape_controls`], so one entry is always exactly one terminal line.

#[cfg(test)]
#[path = "terminal_test.rs"]
mod terminal_test;

use std::fmt;
use std::io::Write;

use ajax::MemberInfo;
use client::{ChatView, EntryStyle, LogEntry, Panel, escape_controls};
use tracing::warn;

pub struct TerminalView<W> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{args}") {
            warn!(error = %err, "terminal: write failed");
        }
    }
}

impl<W: Write + Send> ChatView for TerminalView<W> {
    fn alert(&mut self, message: &str) {
        self.line(format_args!("! {message}"));
    }

    fn show_panel(&mut self, panel: Panel) {
        match panel {
            Panel::Join => self.line(format_args!("-- not in the chat; /join <name> to enter --")),
            Panel::Joined => self.line(format_args!("-- joined; type to chat, /leave to leave --")),
        }
    }

    fn clear_chat_input(&mut self) {}

    fn append_entry(&mut self, entry: &LogEntry) {
        match entry.style {
            EntryStyle::Alert => self.line(format_args!("* {entry}")),
            EntryStyle::Normal => self.line(format_args!("{entry}")),
        }
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(err) = self.out.flush() {
            warn!(error = %err, "terminal: flush failed");
        }
    }

    fn set_roster(&mut self, names: &[String]) {
        let names: Vec<_> = names.iter().map(|n| escape_controls(n)).collect();
        self.line(format_args!("members: {}", names.join(", ")));
    }

    fn show_member(&mut self, member: &MemberInfo) {
        let state = if member.present { "is here" } else { "is not here" };
        self.line(format_args!("{} {state}", escape_controls(&member.name)));
    }
}
