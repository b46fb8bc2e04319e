//! Headless [`ChatView`] that records every call.
//!
//! Used by tests across the workspace and by anything that needs to drive a
//! session without a screen.

use ajax::MemberInfo;

use super::render::LogEntry;
use super::{ChatView, Panel, Viewport};

/// Rows of log visible at once unless the caller says otherwise.
pub const DEFAULT_CLIENT_ROWS: u32 = 20;

#[derive(Clone, Debug)]
pub struct MemoryView {
    pub join_form_class: &'static str,
    pub joined_form_class: &'static str,
    pub alerts: Vec<String>,
    pub log: Vec<LogEntry>,
    pub roster: Vec<String>,
    pub member: Option<MemberInfo>,
    pub chat_input_clears: usize,
    pub rebinds: usize,
    /// One row per log entry.
    pub viewport: Viewport,
}

impl MemoryView {
    /// A view showing the join form, with `client_rows` visible log rows.
    #[must_use]
    pub fn new(client_rows: u32) -> Self {
        Self {
            join_form_class: Panel::Join.join_form_class(),
            joined_form_class: Panel::Join.joined_form_class(),
            alerts: Vec::new(),
            log: Vec::new(),
            roster: Vec::new(),
            member: None,
            chat_input_clears: 0,
            rebinds: 0,
            viewport: Viewport { client_height: client_rows, ..Viewport::default() },
        }
    }

    /// Plain-text log lines, oldest first.
    #[must_use]
    pub fn log_lines(&self) -> Vec<String> {
        self.log.iter().map(ToString::to_string).collect()
    }

    /// The form whose class is not `hidden`.
    #[must_use]
    pub fn visible_panel(&self) -> Panel {
        if self.join_form_class.is_empty() { Panel::Join } else { Panel::Joined }
    }
}

impl Default for MemoryView {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_ROWS)
    }
}

impl ChatView for MemoryView {
    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_owned());
    }

    fn show_panel(&mut self, panel: Panel) {
        self.join_form_class = panel.join_form_class();
        self.joined_form_class = panel.joined_form_class();
    }

    fn rebind(&mut self) {
        self.rebinds += 1;
    }

    fn clear_chat_input(&mut self) {
        self.chat_input_clears += 1;
    }

    fn append_entry(&mut self, entry: &LogEntry) {
        self.log.push(entry.clone());
        self.viewport.scroll_height += 1;
    }

    fn scroll_to_bottom(&mut self) {
        self.viewport.scroll_to_bottom();
    }

    fn set_roster(&mut self, names: &[String]) {
        self.roster = names.to_vec();
    }

    fn show_member(&mut self, member: &MemberInfo) {
        self.member = Some(member.clone());
    }
}
