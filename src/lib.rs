//! flowbridge - session-acquisition bridge for a Flow Builder chat assistant
//!
//! flowbridge is the messaging core of a chat assistant for Salesforce Flow
//! Builder. A page-side agent cannot read cross-origin cookies or issue
//! authenticated Salesforce calls itself, so it asks a privileged bridge to
//! do both, over an async request/response channel that resolves each
//! request exactly once.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       Page Agent                          │
//! │  - detects eligible Flow Builder pages                    │
//! │  - bootstraps SessionContext (token, user, metadata)      │
//! │  - drives the presentation surface (ChatSurface)          │
//! └───────────────┬───────────────────────────┬───────────────┘
//!                 │ BridgeOp / BridgeResponse │ HTTP
//! ┌───────────────▼───────────────┐  ┌────────▼──────────────┐
//! │       Privileged Bridge       │  │     Chat Backend      │
//! │  - session cookie lookup      │  │  - /api/get-initial-  │
//! │  - oauth2 userinfo            │  │    data               │
//! │  - Tooling API flow metadata  │  │  - /api/chat          │
//! └───────────────┬───────────────┘  └───────────────────────┘
//!                 │ HTTP
//! ┌───────────────▼───────────────┐
//! │           Salesforce          │
//! └───────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`bridge`]: privileged request handling and the message channel
//! - [`agent`]: page agent, session context, presentation seam
//! - [`backend`]: chat backend client
//! - [`config`]: configuration management

pub mod agent;
pub mod backend;
pub mod bridge;
pub mod config;
pub mod error;

pub use config::FlowBridgeConfig;
pub use error::{Error, Result};
