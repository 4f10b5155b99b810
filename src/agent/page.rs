//! Page eligibility and URL derivation
//!
//! The agent only activates on recognized Flow Builder pages. From the page
//! URL it derives the matching API origin (Lightning host suffix rewritten
//! to the API host suffix) and the flow id carried in the query string.

use crate::config::SalesforceConfig;
use crate::error::{Error, Result};
use url::Url;

/// Parsed location of the host page
#[derive(Debug, Clone)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    /// Parse a page URL
    pub fn parse(page_url: &str) -> Result<Self> {
        let url = Url::parse(page_url)
            .map_err(|e| Error::Session(format!("Invalid page URL: {}", e)))?;
        Ok(Self { url })
    }

    /// Whether this is a recognized host-application page
    pub fn is_flow_builder_page(&self) -> bool {
        let href = self.url.as_str();
        href.contains(".salesforce.com") || href.contains(".force.com")
    }

    /// The page origin rewritten to its API origin
    pub fn api_origin(&self, config: &SalesforceConfig) -> String {
        self.origin()
            .replace(&config.lightning_suffix, &config.api_suffix)
    }

    /// The page origin as a string, without trailing slash
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// The page hostname
    pub fn hostname(&self) -> String {
        self.url.host_str().unwrap_or_default().to_string()
    }

    /// The `flowId` query parameter, if present
    pub fn flow_id(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == "flowId")
            .map(|(_, value)| value.into_owned())
    }
}
