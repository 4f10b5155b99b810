//! Cookie store seam
//!
//! The bridge is the only component allowed to read cross-origin cookies.
//! The actual store is platform-provided; this trait is the seam the bridge
//! dispatches through, with an in-memory implementation for the CLI and
//! tests.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Read access to a privileged cookie store
#[async_trait]
pub trait CookieStore: Send + Sync {
    /// Look up a cookie by origin URL and name
    ///
    /// Returns `Ok(None)` when no such cookie exists; `Err` only when the
    /// store itself fails (e.g. permission denied).
    async fn get(&self, url: &str, name: &str) -> Result<Option<String>>;
}

/// In-memory cookie store keyed by (origin, cookie name)
#[derive(Default)]
pub struct MemoryCookieStore {
    cookies: RwLock<HashMap<(String, String), String>>,
}

impl MemoryCookieStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cookie value
    pub async fn set(&self, url: &str, name: &str, value: &str) {
        self.cookies
            .write()
            .await
            .insert((url.to_string(), name.to_string()), value.to_string());
    }
}

#[async_trait]
impl CookieStore for MemoryCookieStore {
    async fn get(&self, url: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .cookies
            .read()
            .await
            .get(&(url.to_string(), name.to_string()))
            .cloned())
    }
}
