//! Per-page-load session state

use std::fmt;

/// State accumulated by the page agent over one page load
///
/// Never persisted and never shared across page loads. The session token is
/// opaque and sensitive; the `Debug` impl redacts it.
#[derive(Clone, Default)]
pub struct SessionContext {
    /// Salesforce session token obtained from the bridge
    pub session_token: Option<String>,

    /// Resolved username; a placeholder until user info arrives
    pub username: String,

    /// Flow id from the page URL, if any
    pub flow_id: Option<String>,

    /// Flow metadata, fetched lazily during bootstrap
    pub flow_metadata: Option<serde_json::Value>,

    /// Summary shown on first open of the chat panel
    pub flow_summary: Option<String>,

    /// One-shot latch for the first-open flow
    pub first_open_done: bool,
}

impl SessionContext {
    /// Create a fresh context with the given placeholder username
    pub fn new(placeholder_username: &str) -> Self {
        Self {
            username: placeholder_username.to_string(),
            ..Default::default()
        }
    }

    /// Whether bootstrap obtained a session token
    pub fn has_session(&self) -> bool {
        self.session_token.is_some()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("username", &self.username)
            .field("flow_id", &self.flow_id)
            .field("flow_metadata", &self.flow_metadata.is_some())
            .field("flow_summary", &self.flow_summary)
            .field("first_open_done", &self.first_open_done)
            .finish()
    }
}
