use std::borrow::Cow;

use super::*;

fn event(from: &str, text: &str, alert: bool) -> ChatEvent {
    ChatEvent { from: from.to_owned(), alert, text: text.to_owned() }
}

// =============================================================
// from_event
// =============================================================

#[test]
fn new_speaker_is_named_and_remembered() {
    let mut last = String::new();
    let entry = LogEntry::from_event(&event("bob", "hi", false), &mut last);
    assert_eq!(entry.speaker, Speaker::Name("bob".into()));
    assert_eq!(entry.style, EntryStyle::Normal);
    assert_eq!(last, "bob");
}

#[test]
fn repeated_speaker_collapses_to_marker() {
    let mut last = "bob".to_owned();
    let entry = LogEntry::from_event(&event("bob", "there", false), &mut last);
    assert_eq!(entry.speaker, Speaker::Repeat);
    assert_eq!(last, "bob");
}

#[test]
fn alert_flag_selects_alert_style() {
    let mut last = String::new();
    let entry = LogEntry::from_event(&event("alice", "alice has joined the chat", true), &mut last);
    assert_eq!(entry.style, EntryStyle::Alert);
}

// =============================================================
// Display
// =============================================================

#[test]
fn display_joins_label_and_text() {
    let named = LogEntry { speaker: Speaker::Name("bob".into()), text: "hi".into(), style: EntryStyle::Normal };
    let repeat = LogEntry { speaker: Speaker::Repeat, text: "there".into(), style: EntryStyle::Normal };
    assert_eq!(named.to_string(), "bob: hi");
    assert_eq!(repeat.to_string(), "...: there");
}

#[test]
fn display_escapes_control_characters_in_speaker_and_text() {
    let entry = LogEntry {
        speaker: Speaker::Name("eve\x1b[31m".into()),
        text: "hi\n* bob has left the chat\x1b[2J".into(),
        style: EntryStyle::Normal,
    };
    let line = entry.to_string();
    assert!(!line.chars().any(char::is_control), "control character survived: {line:?}");
    assert_eq!(line, "eve\\u{1b}[31m: hi\\n* bob has left the chat\\u{1b}[2J");
}

#[test]
fn display_keeps_markup_and_unicode_as_text() {
    let entry = LogEntry { speaker: Speaker::Repeat, text: "<b>héllo</b> & co".into(), style: EntryStyle::Alert };
    assert_eq!(entry.to_string(), "...: <b>héllo</b> & co");
}

#[test]
fn escape_controls_borrows_clean_input() {
    assert!(matches!(escape_controls("plain text"), Cow::Borrowed("plain text")));
    assert_eq!(escape_controls("tab\there"), "tab\\there");
}
