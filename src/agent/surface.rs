//! Presentation seam
//!
//! The chat widget itself (DOM, CSS, bubbles) lives outside this crate; the
//! agent drives it through this trait. The input-enabled flag doubles as the
//! sole guard against overlapping sends.

/// Sink for everything the agent wants the user to see
pub trait ChatSurface: Send + Sync {
    /// Render the user's own message
    fn show_user_message(&self, text: &str, username: &str);

    /// Render a bot message, replacing any pending loading indicator
    fn show_bot_message(&self, text: &str);

    /// Render a transient loading indicator
    fn show_loading(&self);

    /// Enable or disable the input box
    fn set_input_enabled(&self, enabled: bool);

    /// Whether the input box currently accepts a send
    fn input_enabled(&self) -> bool;
}

/// Surface that prints to stdout; used by the diagnostic CLI
pub struct ConsoleSurface {
    input_enabled: std::sync::atomic::AtomicBool,
}

impl ConsoleSurface {
    /// Create a console surface with the input enabled
    pub fn new() -> Self {
        Self {
            input_enabled: std::sync::atomic::AtomicBool::new(true),
        }
    }
}

impl Default for ConsoleSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSurface for ConsoleSurface {
    fn show_user_message(&self, text: &str, username: &str) {
        println!("{}: {}", username, text);
    }

    fn show_bot_message(&self, text: &str) {
        println!("bot: {}", text);
    }

    fn show_loading(&self) {
        println!("bot: ...");
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.input_enabled
            .store(enabled, std::sync::atomic::Ordering::SeqCst);
    }

    fn input_enabled(&self) -> bool {
        self.input_enabled.load(std::sync::atomic::Ordering::SeqCst)
    }
}
