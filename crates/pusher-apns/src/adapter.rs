//! The push adapter: sequential dispatch, outcome bookkeeping, feedback polling.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::ApnsConfig;
use crate::connection::ConnectionManager;
use crate::error::AdapterError;
use crate::gateway::{GatewayConnector, GatewayResponse, Purpose};
use crate::message::{Device, PushRequest};
use crate::notification::compose;

/// One per-device delivery record. Appended in dispatch order, never mutated.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    /// Token of the device this send targeted.
    pub token: String,
    /// Structured gateway response.
    pub response: GatewayResponse,
    /// Whether the gateway accepted the send.
    pub accepted: bool,
}

/// Push adapter over a pluggable gateway client.
///
/// Owns one lazily-opened connection per purpose (push, feedback). Methods
/// take `&mut self`: one adapter instance serves one caller at a time, and
/// devices within a dispatch call are processed strictly in order.
pub struct ApnsAdapter {
    bundle_id: String,
    connections: ConnectionManager,
    responses: Vec<DeliveryOutcome>,
}

impl std::fmt::Debug for ApnsAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApnsAdapter")
            .field("bundle_id", &self.bundle_id)
            .field("responses", &self.responses)
            .finish_non_exhaustive()
    }
}

impl ApnsAdapter {
    /// Create an adapter from its configuration and a gateway connector.
    ///
    /// The certificate path is checked eagerly: a missing file fails with
    /// [`AdapterError::CertificateMissing`] before any connection attempt.
    pub fn new(
        config: ApnsConfig,
        connector: Arc<dyn GatewayConnector>,
    ) -> Result<Self, AdapterError> {
        if !config.certificate.exists() {
            return Err(AdapterError::CertificateMissing {
                path: config.certificate.display().to_string(),
            });
        }

        Ok(Self {
            bundle_id: config.bundle_id.clone(),
            connections: ConnectionManager::new(connector, config),
            responses: Vec::new(),
        })
    }

    /// Dispatch one push request, device by device, in request order.
    ///
    /// Returns the devices whose sends the gateway accepted. A rejected send
    /// is recorded in the outcome log, forces the push connection to be
    /// reopened before the next device, and dispatch continues. A transport
    /// failure aborts the whole call; the failed device is not retried.
    pub async fn push(&mut self, request: &PushRequest) -> Result<Vec<Device>, AdapterError> {
        let mut pushed = Vec::new();

        for device in &request.devices {
            let notification = compose(&self.bundle_id, device, &request.message);

            let client = self.connections.get(Purpose::Push).await?;
            let response = client.send(&notification).await?;

            let accepted = response.code.is_ok();
            if accepted {
                info!(
                    token = token_prefix(&device.token),
                    id = %response.id,
                    "notification accepted"
                );
                pushed.push(device.clone());
            } else {
                warn!(
                    token = token_prefix(&device.token),
                    code = ?response.code,
                    "notification rejected, resetting push connection"
                );
                self.connections.invalidate(Purpose::Push).await;
            }

            self.responses.push(DeliveryOutcome {
                token: device.token.clone(),
                response,
                accepted,
            });
        }

        Ok(pushed)
    }

    /// Poll the feedback channel once.
    ///
    /// Reads one bounded batch and returns invalidated tokens mapped to their
    /// invalidation time. When a token appears more than once in the batch,
    /// the last entry wins. Device-registry cleanup is the caller's concern.
    pub async fn feedback(&mut self) -> Result<HashMap<String, DateTime<Utc>>, AdapterError> {
        let client = self.connections.get(Purpose::Feedback).await?;
        let records = client.feedback().await?;

        let mut invalidated = HashMap::with_capacity(records.len());
        for record in records {
            let timestamp =
                DateTime::from_timestamp(i64::from(record.timestamp), 0).unwrap_or_default();
            let _ = invalidated.insert(record.token, timestamp);
        }
        Ok(invalidated)
    }

    /// Whether this adapter can handle `token`: non-empty and composed
    /// entirely of hexadecimal characters.
    pub fn supports(&self, token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Per-device outcomes recorded so far, in dispatch order.
    pub fn responses(&self) -> &[DeliveryOutcome] {
        &self.responses
    }
}

/// Leading slice of a token for log lines. Tokens are opaque; full values
/// stay out of the logs.
fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}
