use ajax::{ChatEvent, MemberInfo};

use super::*;
use crate::view::HIDDEN_CLASS;
use crate::view::memory::MemoryView;

fn controller() -> SessionController<MemoryView> {
    SessionController::new(MemoryView::default())
}

fn joined_controller() -> SessionController<MemoryView> {
    let mut c = controller();
    assert!(c.join("alice").is_some());
    assert_eq!(c.handle_responses(vec![Response::Joined]), Some(Action::GetEvents));
    c
}

fn event(from: &str, text: &str) -> Response {
    Response::Event(ChatEvent { from: from.to_owned(), alert: false, text: text.to_owned() })
}

// =============================================================
// join
// =============================================================

#[test]
fn join_with_name_issues_one_request_without_alert() {
    for name in ["alice", "Bob Smith", "x"] {
        let mut c = controller();
        assert_eq!(c.join(name), Some(Action::Join { name: name.to_owned() }));
        assert!(c.view().alerts.is_empty());
        assert_eq!(c.username(), Some(name));
    }
}

#[test]
fn join_with_empty_name_alerts_once_and_sends_nothing() {
    let mut c = controller();
    assert_eq!(c.join(""), None);
    assert_eq!(c.view().alerts, vec![EMPTY_USERNAME_ALERT.to_owned()]);
    assert_eq!(c.state(), SessionState::NotJoined);
}

#[test]
fn join_with_whitespace_name_counts_as_empty() {
    let mut c = controller();
    assert_eq!(c.join("   "), None);
    assert_eq!(c.view().alerts.len(), 1);
}

#[test]
fn join_trims_surrounding_whitespace() {
    let mut c = controller();
    assert_eq!(c.join("  alice "), Some(Action::Join { name: "alice".into() }));
}

#[test]
fn join_scenario_shows_joined_form_and_polls_once() {
    let mut c = controller();
    let request = c.join("alice").expect("valid name");
    assert_eq!(request.query(), vec![("ajax", "join".to_owned()), ("name", "alice".to_owned())]);

    let next = c.handle_responses(vec![Response::Members(vec!["alice".into()]), Response::Joined]);
    assert_eq!(next, Some(Action::GetEvents));
    assert_eq!(c.state(), SessionState::Joined);
    assert_eq!(c.view().visible_panel(), Panel::Joined);
    assert_eq!(c.view().join_form_class, HIDDEN_CLASS);
    assert_eq!(c.view().roster, vec!["alice".to_owned()]);
    assert_eq!(c.view().rebinds, 1);
}

// =============================================================
// left
// =============================================================

#[test]
fn left_returns_to_join_form_without_polling() {
    let mut c = joined_controller();
    assert_eq!(c.leave(), Some(Action::Leave));
    assert_eq!(c.handle_responses(vec![Response::Left]), None);
    assert_eq!(c.state(), SessionState::NotJoined);
    assert_eq!(c.view().visible_panel(), Panel::Join);
    assert_eq!(c.view().joined_form_class, HIDDEN_CLASS);
    assert_eq!(c.view().rebinds, 2);
}

#[test]
fn left_inside_poll_envelope_stops_polling() {
    let mut c = joined_controller();
    assert_eq!(c.handle_responses(vec![event("bob", "bye"), Response::Left]), None);
    assert_eq!(c.state(), SessionState::NotJoined);
    assert_eq!(c.view().log.len(), 1);
}

#[test]
fn leave_before_join_is_a_no_op() {
    let mut c = controller();
    assert_eq!(c.leave(), None);
}

#[test]
fn left_while_not_joined_does_not_poll() {
    let mut c = controller();
    assert_eq!(c.handle_responses(vec![Response::Left]), None);
    assert_eq!(c.state(), SessionState::NotJoined);
}

// =============================================================
// events / poll loop
// =============================================================

#[test]
fn every_event_appends_one_entry_and_rearms_once() {
    let mut c = joined_controller();
    for i in 0..5 {
        let next = c.handle_responses(vec![event("bob", &format!("line {i}"))]);
        assert_eq!(next, Some(Action::GetEvents));
        assert_eq!(c.view().log.len(), i + 1);
    }
}

#[test]
fn poll_ack_rearms_without_rendering() {
    let mut c = joined_controller();
    assert_eq!(c.handle_responses(vec![Response::PollAck]), Some(Action::GetEvents));
    assert!(c.view().log.is_empty());
}

#[test]
fn batched_events_render_all_but_rearm_once() {
    let mut c = joined_controller();
    let next = c.handle_responses(vec![event("bob", "a"), event("carol", "b"), Response::PollAck]);
    assert_eq!(next, Some(Action::GetEvents));
    assert_eq!(c.view().log_lines(), vec!["bob: a".to_owned(), "carol: b".to_owned()]);
}

#[test]
fn same_speaker_twice_collapses_second_label() {
    let mut c = joined_controller();
    let mut polls = 0;
    for response in [event("bob", "hi"), event("bob", "there")] {
        if c.handle_responses(vec![response]) == Some(Action::GetEvents) {
            polls += 1;
        }
    }
    assert_eq!(c.view().log_lines(), vec!["bob: hi".to_owned(), "...: there".to_owned()]);
    assert_eq!(polls, 2);
    assert_eq!(c.last_speaker(), "bob");
}

#[test]
fn different_speakers_both_keep_their_names() {
    let mut c = joined_controller();
    c.handle_responses(vec![event("bob", "hi")]);
    c.handle_responses(vec![event("carol", "hey")]);
    c.handle_responses(vec![event("bob", "again")]);
    assert_eq!(
        c.view().log_lines(),
        vec!["bob: hi".to_owned(), "carol: hey".to_owned(), "bob: again".to_owned()]
    );
}

#[test]
fn alert_event_uses_alert_style() {
    let mut c = joined_controller();
    c.handle_responses(vec![Response::Event(ChatEvent {
        from: "dave".into(),
        alert: true,
        text: "dave has joined the chat".into(),
    })]);
    assert_eq!(c.view().log[0].style, crate::view::render::EntryStyle::Alert);
}

#[test]
fn events_scroll_log_to_bottom() {
    let mut c = SessionController::new(MemoryView::new(3));
    c.join("alice");
    c.handle_responses(vec![Response::Joined]);
    for i in 0..10 {
        c.handle_responses(vec![event(&format!("user{i}"), "hi")]);
    }
    assert_eq!(c.view().viewport.scroll_top, 7);
}

#[test]
fn unknown_and_error_responses_do_not_rearm() {
    let mut c = joined_controller();
    let next = c.handle_responses(vec![
        Response::Unknown { kind: "object".into(), id: "weather".into() },
        Response::Error("No implementation for dance".into()),
    ]);
    assert_eq!(next, None);
    assert_eq!(c.state(), SessionState::Joined);
}

#[test]
fn member_detail_reaches_view() {
    let mut c = joined_controller();
    assert_eq!(c.lookup_member(" bob "), Some(Action::GetMember { member: "bob".into() }));
    let info = MemberInfo { name: "bob".into(), present: true };
    assert_eq!(c.handle_responses(vec![Response::Member(info.clone())]), None);
    assert_eq!(c.view().member, Some(info));
}

#[test]
fn lookup_member_ignores_blank_entry() {
    let mut c = joined_controller();
    assert_eq!(c.lookup_member(""), None);
}

// =============================================================
// chat input
// =============================================================

#[test]
fn submit_chat_sends_raw_text_and_clears_input() {
    let mut c = joined_controller();
    let raw = "  <b>hi</b> & bye ";
    assert_eq!(c.submit_chat(raw), Some(Action::Chat { text: raw.to_owned() }));
    assert_eq!(c.view().chat_input_clears, 1);
}

#[test]
fn blank_chat_is_silently_ignored() {
    let mut c = joined_controller();
    assert_eq!(c.submit_chat("  "), None);
    assert_eq!(c.submit_chat(""), None);
    assert!(c.view().alerts.is_empty());
    assert_eq!(c.view().chat_input_clears, 0);
}

#[test]
fn enter_keys_submit_and_are_handled() {
    let mut c = joined_controller();
    for code in ENTER_KEY_CODES {
        let (outcome, action) = c.on_chat_key(code, "hello");
        assert_eq!(outcome, KeyOutcome::Handled);
        assert_eq!(action, Some(Action::Chat { text: "hello".into() }));
    }
}

#[test]
fn enter_on_blank_input_is_handled_without_request() {
    let mut c = joined_controller();
    assert_eq!(c.on_chat_key(13, " "), (KeyOutcome::Handled, None));
}

#[test]
fn other_keys_pass_through() {
    let mut c = joined_controller();
    assert_eq!(c.on_chat_key(65, "hello"), (KeyOutcome::PassThrough, None));
    assert_eq!(c.view().chat_input_clears, 0);
}
