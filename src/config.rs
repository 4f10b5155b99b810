//! flowbridge configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main flowbridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowBridgeConfig {
    /// Chat backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Salesforce endpoint configuration
    #[serde(default)]
    pub salesforce: SalesforceConfig,

    /// Chat defaults
    #[serde(default)]
    pub chat: ChatConfig,
}

impl FlowBridgeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Chat backend configuration
///
/// The backend exposes the flow-summary and chat-completion endpoints.
/// A single base URL is the source of truth for both call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the chat backend
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://floxplorer-server.vercel.app".to_string(),
        }
    }
}

/// Salesforce endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesforceConfig {
    /// Tooling API version
    pub api_version: String,

    /// Name of the session cookie
    pub cookie_name: String,

    /// Host suffix of Lightning Experience pages
    pub lightning_suffix: String,

    /// Host suffix of the matching API origin
    pub api_suffix: String,
}

impl Default for SalesforceConfig {
    fn default() -> Self {
        Self {
            api_version: "58.0".to_string(),
            cookie_name: "sid".to_string(),
            lightning_suffix: ".lightning.force.com".to_string(),
            api_suffix: ".my.salesforce.com".to_string(),
        }
    }
}

/// Chat defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// AI model selected until the user picks another one
    pub default_model: String,

    /// Username shown until user info resolves
    pub placeholder_username: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_model: "Gemini".to_string(),
            placeholder_username: "User".to_string(),
        }
    }
}
