//! Chat log entries.
//!
//! Entries are data. Speaker and text arrive from other members verbatim,
//! so the plain form escapes control characters: a line of chat can never
//! start a new log line or reach a terminal as an escape sequence.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::borrow::Cow;
use std::fmt;

use ajax::ChatEvent;

/// Shown instead of the speaker's name when the same speaker talks twice in a row.
pub const REPEAT_MARKER: &str = "...";
pub const SEPARATOR: &str = ": ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryStyle {
    Normal,
    /// System notices such as joins, renames and departures.
    Alert,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Speaker {
    Name(String),
    /// Same speaker as the previous entry.
    Repeat,
}

impl Speaker {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Repeat => REPEAT_MARKER,
        }
    }
}

/// One line of the chat log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub speaker: Speaker,
    pub text: String,
    pub style: EntryStyle,
}

impl LogEntry {
    /// Build the entry for `event`, collapsing a repeated speaker.
    ///
    /// `last_speaker` is updated whenever a new name is shown.
    #[must_use]
    pub fn from_event(event: &ChatEvent, last_speaker: &mut String) -> Self {
        let speaker = if event.from == *last_speaker {
            Speaker::Repeat
        } else {
            last_speaker.clone_from(&event.from);
            Speaker::Name(event.from.clone())
        };
        let style = if event.alert { EntryStyle::Alert } else { EntryStyle::Normal };
        Self { speaker, text: event.text.clone(), style }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", escape_controls(self.speaker.label()), escape_controls(&self.text))
    }
}

/// Replace control characters (newlines, ESC, ...) with their `\n`-style
/// escapes. Everything else passes through.
#[must_use]
pub fn escape_controls(raw: &str) -> Cow<'_, str> {
    if !raw.chars().any(char::is_control) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        if c.is_control() {
            escaped.extend(c.escape_default());
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}
