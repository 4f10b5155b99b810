//! Privileged request dispatch
//!
//! The single inbound entry point of the bridge. Pattern-matches on the
//! requested operation, performs the cookie lookup or the authenticated
//! Salesforce call, and always folds the outcome into a `BridgeResponse` —
//! errors never cross the channel as anything but a failure payload.

use super::cookies::CookieStore;
use super::protocol::{BridgeOp, BridgeRequest, BridgeResponse};
use std::sync::Arc;

/// Handles bridge requests; holds no state across requests
pub struct BridgeHandler {
    cookies: Arc<dyn CookieStore>,
    http: reqwest::Client,
    cookie_name: String,
    api_version: String,
}

impl BridgeHandler {
    /// Create a handler over a cookie store
    pub fn new(cookies: Arc<dyn CookieStore>, cookie_name: String, api_version: String) -> Self {
        Self {
            cookies,
            http: reqwest::Client::new(),
            cookie_name,
            api_version,
        }
    }

    /// Dispatch a single request
    pub async fn handle(&self, request: BridgeRequest) -> BridgeResponse {
        let request_id = request.id;
        match request.op {
            BridgeOp::GetSessionCookie { url } => self.get_session_cookie(request_id, &url).await,
            BridgeOp::FetchUserInfo { base_url, sid } => {
                self.fetch_user_info(request_id, &base_url, &sid).await
            }
            BridgeOp::FetchFlowMetadata {
                instance_url,
                session_id,
                flow_id,
            } => {
                self.fetch_flow_metadata(request_id, &instance_url, &session_id, &flow_id)
                    .await
            }
        }
    }

    async fn get_session_cookie(&self, request_id: String, url: &str) -> BridgeResponse {
        if url.is_empty() {
            tracing::warn!("SID cookie requested without a URL");
            return BridgeResponse::failure(request_id, "URL not provided for SID cookie.");
        }

        match self.cookies.get(url, &self.cookie_name).await {
            Ok(Some(value)) if !value.is_empty() => {
                tracing::debug!(url, "SID cookie found");
                BridgeResponse::success(request_id, serde_json::Value::String(value))
            }
            Ok(_) => {
                tracing::warn!(url, "SID cookie not found");
                BridgeResponse::failure(request_id, "SID cookie not found")
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Cookie store lookup failed");
                BridgeResponse::failure(request_id, e.to_string())
            }
        }
    }

    async fn fetch_user_info(&self, request_id: String, base_url: &str, sid: &str) -> BridgeResponse {
        let url = format!("{}/services/oauth2/userinfo", base_url);
        match self.get_json(&url, sid, "Salesforce API error").await {
            Ok(data) => BridgeResponse::success(request_id, data),
            Err(message) => {
                tracing::warn!(%message, "Failed to fetch user info");
                BridgeResponse::failure(request_id, message)
            }
        }
    }

    async fn fetch_flow_metadata(
        &self,
        request_id: String,
        instance_url: &str,
        session_id: &str,
        flow_id: &str,
    ) -> BridgeResponse {
        // Flow ids land inside a SOQL literal; anything beyond ASCII
        // alphanumerics is rejected before the query is built.
        if !is_valid_flow_id(flow_id) {
            tracing::warn!(flow_id, "Rejected malformed flow id");
            return BridgeResponse::failure(request_id, format!("Invalid flow id '{}'", flow_id));
        }

        let query = format!("SELECT Id, Metadata FROM Flow WHERE Id='{}'", flow_id);
        let endpoint = format!(
            "{}/services/data/v{}/tooling/query/",
            instance_url, self.api_version
        );
        let url = match url::Url::parse_with_params(&endpoint, [("q", query.as_str())]) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(instance_url, error = %e, "Invalid Tooling API URL");
                return BridgeResponse::failure(request_id, e.to_string());
            }
        };

        match self
            .get_json(url.as_str(), session_id, "Salesforce Tooling API error")
            .await
        {
            Ok(body) => {
                // No matching record is a soft miss, not a failure
                let metadata = body
                    .get("records")
                    .and_then(|r| r.get(0))
                    .and_then(|r| r.get("Metadata"))
                    .cloned()
                    .unwrap_or(serde_json::Value::Null);
                BridgeResponse::success(request_id, metadata)
            }
            Err(message) => {
                tracing::warn!(%message, "Failed to fetch flow metadata");
                BridgeResponse::failure(request_id, message)
            }
        }
    }

    async fn get_json(
        &self,
        url: &str,
        token: &str,
        error_prefix: &str,
    ) -> std::result::Result<serde_json::Value, String> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{}: {} {}", error_prefix, status.as_u16(), body));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| e.to_string())
    }
}

/// A usable flow id is non-empty and entirely ASCII-alphanumeric, which
/// keeps quotes and other SOQL metacharacters unrepresentable
fn is_valid_flow_id(flow_id: &str) -> bool {
    !flow_id.is_empty() && flow_id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::cookies::MemoryCookieStore;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_handler(cookies: Arc<dyn CookieStore>) -> BridgeHandler {
        BridgeHandler::new(cookies, "sid".to_string(), "58.0".to_string())
    }

    fn request(op: BridgeOp) -> BridgeRequest {
        BridgeRequest::new(op)
    }

    /// Cookie store that counts lookups and always fails
    struct CountingStore {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl CookieStore for CountingStore {
        async fn get(&self, _url: &str, _name: &str) -> Result<Option<String>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Err(Error::Cookie("permission denied".to_string()))
        }
    }

    #[tokio::test]
    async fn test_cookie_present_returns_exact_value() {
        let store = Arc::new(MemoryCookieStore::new());
        store
            .set("https://acme.my.salesforce.com", "sid", "TOKEN123")
            .await;
        let handler = make_handler(store);

        let response = handler
            .handle(request(BridgeOp::GetSessionCookie {
                url: "https://acme.my.salesforce.com".to_string(),
            }))
            .await;

        assert_eq!(response.into_result().unwrap(), "TOKEN123");
    }

    #[tokio::test]
    async fn test_cookie_absent_exact_message() {
        let handler = make_handler(Arc::new(MemoryCookieStore::new()));

        let response = handler
            .handle(request(BridgeOp::GetSessionCookie {
                url: "https://acme.my.salesforce.com".to_string(),
            }))
            .await;

        assert_eq!(response.into_result().unwrap_err(), "SID cookie not found");
    }

    #[tokio::test]
    async fn test_empty_cookie_value_is_not_found() {
        let store = Arc::new(MemoryCookieStore::new());
        store.set("https://acme.my.salesforce.com", "sid", "").await;
        let handler = make_handler(store);

        let response = handler
            .handle(request(BridgeOp::GetSessionCookie {
                url: "https://acme.my.salesforce.com".to_string(),
            }))
            .await;

        assert_eq!(response.into_result().unwrap_err(), "SID cookie not found");
    }

    #[tokio::test]
    async fn test_empty_url_fails_without_store_lookup() {
        let store = Arc::new(CountingStore {
            lookups: AtomicUsize::new(0),
        });
        let handler = make_handler(store.clone());

        let response = handler
            .handle(request(BridgeOp::GetSessionCookie {
                url: String::new(),
            }))
            .await;

        assert_eq!(
            response.into_result().unwrap_err(),
            "URL not provided for SID cookie."
        );
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_error_message_passed_through() {
        let store = Arc::new(CountingStore {
            lookups: AtomicUsize::new(0),
        });
        let handler = make_handler(store.clone());

        let response = handler
            .handle(request(BridgeOp::GetSessionCookie {
                url: "https://acme.my.salesforce.com".to_string(),
            }))
            .await;

        let message = response.into_result().unwrap_err();
        assert!(message.contains("permission denied"));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_user_info_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/oauth2/userinfo"))
            .and(header("Authorization", "Bearer TOKEN123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Jane",
                "email": "jane@example.com"
            })))
            .mount(&server)
            .await;

        let handler = make_handler(Arc::new(MemoryCookieStore::new()));
        let response = handler
            .handle(request(BridgeOp::FetchUserInfo {
                base_url: server.uri(),
                sid: "TOKEN123".to_string(),
            }))
            .await;

        let data = response.into_result().unwrap();
        assert_eq!(data["name"], "Jane");
    }

    #[tokio::test]
    async fn test_user_info_http_error_embeds_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/oauth2/userinfo"))
            .respond_with(ResponseTemplate::new(401).set_body_string("INVALID_SESSION_ID"))
            .mount(&server)
            .await;

        let handler = make_handler(Arc::new(MemoryCookieStore::new()));
        let response = handler
            .handle(request(BridgeOp::FetchUserInfo {
                base_url: server.uri(),
                sid: "stale".to_string(),
            }))
            .await;

        let message = response.into_result().unwrap_err();
        assert!(message.starts_with("Salesforce API error: 401"));
        assert!(message.contains("INVALID_SESSION_ID"));
    }

    #[tokio::test]
    async fn test_flow_metadata_extracts_first_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v58.0/tooling/query/"))
            .and(query_param(
                "q",
                "SELECT Id, Metadata FROM Flow WHERE Id='300000000000abcDEF'",
            ))
            .and(header("Authorization", "Bearer TOKEN123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [{"Id": "300000000000abcDEF", "Metadata": {"label": "MyFlow"}}]
            })))
            .mount(&server)
            .await;

        let handler = make_handler(Arc::new(MemoryCookieStore::new()));
        let response = handler
            .handle(request(BridgeOp::FetchFlowMetadata {
                instance_url: server.uri(),
                session_id: "TOKEN123".to_string(),
                flow_id: "300000000000abcDEF".to_string(),
            }))
            .await;

        let data = response.into_result().unwrap();
        assert_eq!(data["label"], "MyFlow");
    }

    #[tokio::test]
    async fn test_flow_metadata_zero_records_is_null_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v58.0/tooling/query/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"records": []})),
            )
            .mount(&server)
            .await;

        let handler = make_handler(Arc::new(MemoryCookieStore::new()));
        let response = handler
            .handle(request(BridgeOp::FetchFlowMetadata {
                instance_url: server.uri(),
                session_id: "TOKEN123".to_string(),
                flow_id: "300000000000abc".to_string(),
            }))
            .await;

        assert!(response.is_success());
        assert_eq!(response.into_result().unwrap(), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_flow_metadata_http_error_embeds_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v58.0/tooling/query/"))
            .respond_with(ResponseTemplate::new(400).set_body_string("MALFORMED_QUERY"))
            .mount(&server)
            .await;

        let handler = make_handler(Arc::new(MemoryCookieStore::new()));
        let response = handler
            .handle(request(BridgeOp::FetchFlowMetadata {
                instance_url: server.uri(),
                session_id: "TOKEN123".to_string(),
                flow_id: "300000000000abc".to_string(),
            }))
            .await;

        let message = response.into_result().unwrap_err();
        assert!(message.starts_with("Salesforce Tooling API error: 400"));
        assert!(message.contains("MALFORMED_QUERY"));
    }

    #[tokio::test]
    async fn test_malformed_flow_id_rejected_without_request() {
        let server = MockServer::start().await;
        // A mounted-but-unexpected mock: zero matching requests expected
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let handler = make_handler(Arc::new(MemoryCookieStore::new()));
        let response = handler
            .handle(request(BridgeOp::FetchFlowMetadata {
                instance_url: server.uri(),
                session_id: "TOKEN123".to_string(),
                flow_id: "300' OR Name != '".to_string(),
            }))
            .await;

        let message = response.into_result().unwrap_err();
        assert!(message.starts_with("Invalid flow id"));
    }

    #[test]
    fn test_flow_id_validation() {
        assert!(is_valid_flow_id("300000000000abc"));
        assert!(is_valid_flow_id("300000000000abcDEF"));
        assert!(is_valid_flow_id("300abc"));
        assert!(!is_valid_flow_id(""));
        assert!(!is_valid_flow_id("300000000000ab'"));
        assert!(!is_valid_flow_id("300 abc"));
        assert!(!is_valid_flow_id("300abc' OR Name != '"));
    }

    #[tokio::test]
    async fn test_short_flow_id_reaches_tooling_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v58.0/tooling/query/"))
            .and(query_param(
                "q",
                "SELECT Id, Metadata FROM Flow WHERE Id='300abc'",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [{"Id": "300abc", "Metadata": {"label": "MyFlow"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handler = make_handler(Arc::new(MemoryCookieStore::new()));
        let response = handler
            .handle(request(BridgeOp::FetchFlowMetadata {
                instance_url: server.uri(),
                session_id: "TOKEN123".to_string(),
                flow_id: "300abc".to_string(),
            }))
            .await;

        let data = response.into_result().unwrap();
        assert_eq!(data["label"], "MyFlow");
    }
}
