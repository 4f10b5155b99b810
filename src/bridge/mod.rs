//! Privileged bridge
//!
//! The only component with access to cross-origin cookies and unrestricted
//! outbound HTTP. The page agent reaches it exclusively through an async
//! request/response channel: each request carries a oneshot sender, so every
//! call resolves exactly once — channel breakdown included, which surfaces
//! as a failure response rather than a hang.

pub mod cookies;
pub mod handler;
pub mod protocol;

pub use cookies::{CookieStore, MemoryCookieStore};
pub use handler::BridgeHandler;
pub use protocol::{BridgeOp, BridgeRequest, BridgeResponse, BridgeStatus};

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Capacity of the request channel
const CHANNEL_CAPACITY: usize = 32;

type Envelope = (BridgeRequest, oneshot::Sender<BridgeResponse>);

/// The bridge service; owns the handler and drains the request channel
pub struct Bridge;

impl Bridge {
    /// Spawn the bridge task and return a handle for issuing requests
    pub fn spawn(handler: BridgeHandler) -> BridgeHandle {
        let (tx, mut rx) = mpsc::channel::<Envelope>(CHANNEL_CAPACITY);
        let handler = Arc::new(handler);

        tokio::spawn(async move {
            while let Some((request, reply)) = rx.recv().await {
                tracing::debug!(request_id = %request.id, "Bridge request received");
                let response = handler.handle(request).await;
                // The caller may have gone away; nothing to do then
                let _ = reply.send(response);
            }
            tracing::debug!("Bridge channel closed, task exiting");
        });

        BridgeHandle { tx }
    }
}

/// Cloneable handle for sending requests to the bridge
#[derive(Clone)]
pub struct BridgeHandle {
    tx: mpsc::Sender<Envelope>,
}

impl BridgeHandle {
    /// Issue an operation and await its single resolution
    pub async fn call(&self, op: BridgeOp) -> BridgeResponse {
        let request = BridgeRequest::new(op);
        let request_id = request.id.clone();

        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send((request, reply_tx)).await.is_err() {
            tracing::warn!(%request_id, "Bridge unavailable: channel closed");
            return BridgeResponse::failure(request_id, "Bridge unavailable");
        }

        match reply_rx.await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(%request_id, "Bridge dropped request without responding");
                BridgeResponse::failure(request_id, "Bridge unavailable")
            }
        }
    }
}
