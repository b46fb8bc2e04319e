//! Rendering seam between the session controller and a concrete UI.
//!
//! DESIGN
//! ======
//! The controller never renders directly. It calls into a [`ChatView`],
//! which owns the join form, the joined form, the chat log, the chat input
//! and the roster. Visibility is a CSS-class switch (`hidden` vs empty), so
//! implementations toggle a class rather than removing elements.

pub mod memory;
pub mod render;


use ajax::MemberInfo;

use render::LogEntry;

/// Class applied to a hidden form.
pub const HIDDEN_CLASS: &str = "hidden";

/// Which of the two forms is on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    /// Username input and join button.
    Join,
    /// Chat log, chat input, roster and leave button.
    Joined,
}

impl Panel {
    /// Class for the join form while this panel is active.
    #[must_use]
    pub fn join_form_class(self) -> &'static str {
        visibility_class(self == Self::Join)
    }

    /// Class for the joined form while this panel is active.
    #[must_use]
    pub fn joined_form_class(self) -> &'static str {
        visibility_class(self == Self::Joined)
    }
}

#[must_use]
pub fn visibility_class(visible: bool) -> &'static str {
    if visible { "" } else { HIDDEN_CLASS }
}

/// Log container scroll geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Full height of the log content.
    pub scroll_height: u32,
    /// Visible height of the log container.
    pub client_height: u32,
    pub scroll_top: u32,
}

impl Viewport {
    /// Pin the log to its last line.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.scroll_height.saturating_sub(self.client_height);
    }
}

/// Everything the session controller needs from a UI.
pub trait ChatView: Send {
    /// Blocking, user-visible validation message.
    fn alert(&mut self, message: &str);

    /// Show `panel` and hide the other form.
    fn show_panel(&mut self, panel: Panel);

    /// Re-attach interactive bindings after a visibility change.
    fn rebind(&mut self) {}

    fn clear_chat_input(&mut self);

    /// Append one rendered line to the chat log.
    fn append_entry(&mut self, entry: &LogEntry);

    fn scroll_to_bottom(&mut self);

    fn set_roster(&mut self, names: &[String]);

    fn show_member(&mut self, member: &MemberInfo);
}
