//! Bridge message protocol
//!
//! Shared contract between the page agent and the privileged bridge. Every
//! request resolves to exactly one response, success or failure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to the privileged bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRequest {
    /// Unique request ID
    pub id: String,
    /// Requested operation
    pub op: BridgeOp,
    /// Timestamp (millis since epoch)
    pub timestamp: i64,
}

impl BridgeRequest {
    /// Create a new request
    pub fn new(op: BridgeOp) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            op,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Operations the bridge can perform on behalf of the page agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeOp {
    /// Look up the session cookie scoped to a Salesforce API origin
    GetSessionCookie { url: String },
    /// GET the authenticated userinfo endpoint
    FetchUserInfo { base_url: String, sid: String },
    /// Query the Tooling API for a flow's metadata
    FetchFlowMetadata {
        instance_url: String,
        session_id: String,
        flow_id: String,
    },
}

/// Response from the privileged bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    /// Request ID this responds to
    pub request_id: String,
    /// Response status
    pub status: BridgeStatus,
    /// Success payload; `Null` for failures and for empty results
    pub data: serde_json::Value,
}

/// Response status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeStatus {
    /// Request succeeded
    Success,
    /// Request failed
    Error { message: String },
}

impl BridgeResponse {
    /// Create a success response
    pub fn success(request_id: String, data: serde_json::Value) -> Self {
        Self {
            request_id,
            status: BridgeStatus::Success,
            data,
        }
    }

    /// Create an error response
    pub fn failure(request_id: String, message: impl Into<String>) -> Self {
        Self {
            request_id,
            status: BridgeStatus::Error {
                message: message.into(),
            },
            data: serde_json::Value::Null,
        }
    }

    /// Whether this response carries a success payload
    pub fn is_success(&self) -> bool {
        matches!(self.status, BridgeStatus::Success)
    }

    /// Convert into the payload or the failure message
    pub fn into_result(self) -> std::result::Result<serde_json::Value, String> {
        match self.status {
            BridgeStatus::Success => Ok(self.data),
            BridgeStatus::Error { message } => Err(message),
        }
    }
}
