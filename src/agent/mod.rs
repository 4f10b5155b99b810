//! Page agent
//!
//! Runs in the context of the host page and orchestrates everything the
//! page itself is not privileged to do: it asks the bridge for the session
//! cookie, proxies the authenticated Salesforce calls through it, talks to
//! the chat backend, and drives the presentation surface with the results.

pub mod context;
pub mod page;
pub mod surface;

pub use context::SessionContext;
pub use page::PageLocation;
pub use surface::{ChatSurface, ConsoleSurface};

use crate::backend::BackendClient;
use crate::bridge::{BridgeHandle, BridgeOp};
use crate::config::{FlowBridgeConfig, SalesforceConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shown when the initial summary cannot be produced, for any reason
const SUMMARY_FALLBACK: &str = "Could not connect to the server to get a summary.";

/// Shown when a chat request fails
const CHAT_FALLBACK: &str = "Could not connect to the server.";

/// Orchestrates session bootstrap and chat interaction for one page load
pub struct PageAgent {
    location: PageLocation,
    context: SessionContext,
    bridge: BridgeHandle,
    backend: BackendClient,
    surface: Arc<dyn ChatSurface>,
    salesforce: SalesforceConfig,
    selected_model: String,
    panel_open: bool,
    alive: Arc<AtomicBool>,
}

impl PageAgent {
    /// Attach an agent to a page, or `None` when the page is not a
    /// recognized Flow Builder page
    pub fn attach(
        location: PageLocation,
        bridge: BridgeHandle,
        backend: BackendClient,
        surface: Arc<dyn ChatSurface>,
        config: &FlowBridgeConfig,
    ) -> Option<Self> {
        if !location.is_flow_builder_page() {
            tracing::debug!(origin = %location.origin(), "Not a Flow Builder page, agent inactive");
            return None;
        }

        Some(Self {
            location,
            context: SessionContext::new(&config.chat.placeholder_username),
            bridge,
            backend,
            surface,
            salesforce: config.salesforce.clone(),
            selected_model: config.chat.default_model.clone(),
            panel_open: false,
            alive: Arc::new(AtomicBool::new(true)),
        })
    }

    /// The accumulated session state
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Change the AI model used for subsequent chat messages
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.selected_model = model.into();
    }

    /// Mark the page as gone; in-flight results are no longer applied
    pub fn retire(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Run the session bootstrap once per page load
    ///
    /// Cookie acquisition gates everything else; user-info and flow-metadata
    /// fetches are issued concurrently and each fails soft. Results are
    /// dropped if the page has been retired in the meantime.
    pub async fn bootstrap(&mut self) {
        tracing::info!(origin = %self.location.origin(), "Session bootstrap started");

        let api_origin = self.location.api_origin(&self.salesforce);
        let cookie = self
            .bridge
            .call(BridgeOp::GetSessionCookie {
                url: api_origin.clone(),
            })
            .await;

        let sid = match cookie.into_result() {
            Ok(serde_json::Value::String(sid)) => sid,
            Ok(other) => {
                tracing::warn!(?other, "Bootstrap halted: unexpected cookie payload");
                return;
            }
            Err(error) => {
                tracing::warn!(%error, "Bootstrap halted: no session cookie");
                return;
            }
        };

        if !self.is_alive() {
            tracing::debug!("Page retired during bootstrap, dropping session token");
            return;
        }

        self.context.session_token = Some(sid.clone());
        self.context.flow_id = self.location.flow_id();

        let user_info = self.bridge.call(BridgeOp::FetchUserInfo {
            base_url: api_origin.clone(),
            sid: sid.clone(),
        });
        let flow_metadata = async {
            match &self.context.flow_id {
                Some(flow_id) => Some(
                    self.bridge
                        .call(BridgeOp::FetchFlowMetadata {
                            instance_url: api_origin.clone(),
                            session_id: sid.clone(),
                            flow_id: flow_id.clone(),
                        })
                        .await,
                ),
                None => None,
            }
        };
        let (user_info, flow_metadata) = tokio::join!(user_info, flow_metadata);

        if !self.is_alive() {
            tracing::debug!("Page retired during bootstrap, dropping fetched data");
            return;
        }

        match user_info.into_result() {
            Ok(data) => {
                if let Some(name) = data.get("name").and_then(|v| v.as_str()) {
                    self.context.username = name.to_string();
                    tracing::info!(username = %self.context.username, "User info resolved");
                }
            }
            Err(error) => {
                // Non-fatal: the placeholder username is kept
                tracing::warn!(%error, "Failed to fetch user info");
            }
        }

        if let Some(response) = flow_metadata {
            match response.into_result() {
                Ok(serde_json::Value::Null) => {
                    tracing::debug!("No flow metadata record found");
                }
                Ok(metadata) => {
                    self.context.flow_metadata = Some(metadata);
                    tracing::info!("Flow metadata obtained");
                }
                Err(error) => {
                    // Non-fatal: metadata stays unset
                    tracing::warn!(%error, "Failed to fetch flow metadata");
                }
            }
        }

        tracing::info!("Session bootstrap finished");
    }

    /// Toggle the chat panel; the first open triggers the initial summary
    ///
    /// Returns whether the panel is now open.
    pub async fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        if self.panel_open && !self.context.first_open_done {
            self.context.first_open_done = true;
            self.run_first_open().await;
        }
        self.panel_open
    }

    /// Handle a user-submitted chat message
    ///
    /// The disabled-input check is the sole guard against overlapping
    /// sends; a send attempted while one is in flight is a no-op.
    pub async fn send_message(&mut self, text: &str) {
        let message = text.trim();
        if message.is_empty() || !self.surface.input_enabled() {
            return;
        }

        self.surface.show_user_message(message, &self.context.username);
        self.surface.set_input_enabled(false);
        self.surface.show_loading();

        match self.backend.chat(message, &self.selected_model).await {
            Ok(reply) => self.surface.show_bot_message(&reply),
            Err(error) => {
                tracing::warn!(%error, "Chat request failed");
                self.surface.show_bot_message(CHAT_FALLBACK);
            }
        }

        self.surface.set_input_enabled(true);
    }

    async fn run_first_open(&mut self) {
        self.surface.set_input_enabled(false);
        self.surface.show_loading();

        let summary = match (&self.context.session_token, &self.context.flow_id) {
            (Some(sid), Some(flow_id)) => {
                match self
                    .backend
                    .initial_summary(sid, &self.location.hostname(), flow_id)
                    .await
                {
                    Ok(summary) => summary,
                    Err(error) => {
                        tracing::warn!(%error, "Initial summary fetch failed");
                        SUMMARY_FALLBACK.to_string()
                    }
                }
            }
            _ => {
                tracing::warn!("Salesforce data not available from initial page load");
                SUMMARY_FALLBACK.to_string()
            }
        };

        self.context.flow_summary = Some(summary.clone());
        self.surface.show_bot_message(&summary);
        self.surface.set_input_enabled(true);
    }
}
