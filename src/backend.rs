//! Chat backend client
//!
//! The external service providing the flow-summary and chat-completion
//! endpoints. Both call sites share the one configured base URL.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Client for the chat backend
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitialDataRequest<'a> {
    session_id: &'a str,
    salesforce_host: &'a str,
    flow_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    question: &'a str,
    ai_model: &'a str,
}

#[derive(Deserialize)]
struct InitialDataResponse {
    summary: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl BackendClient {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the initial flow summary
    pub async fn initial_summary(
        &self,
        session_id: &str,
        salesforce_host: &str,
        flow_id: &str,
    ) -> Result<String> {
        let url = format!("{}/api/get-initial-data", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&InitialDataRequest {
                session_id,
                salesforce_host,
                flow_id,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_body(response, "Failed to fetch initial data").await);
        }

        let data: InitialDataResponse = response.json().await?;
        Ok(data.summary)
    }

    /// Send a chat message and return the reply
    pub async fn chat(&self, question: &str, ai_model: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&ChatRequest { question, ai_model })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_body(response, "Failed to fetch chat response").await);
        }

        let data: ChatResponse = response.json().await?;
        Ok(data.reply)
    }

    /// Prefer the body's `error` field, fall back to a fixed message
    async fn error_from_body(response: reqwest::Response, fallback: &str) -> Error {
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| fallback.to_string());
        Error::Backend(message)
    }
}
