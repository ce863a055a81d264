//! Outbound collaborator contract: the wire-protocol client seam.
//!
//! The adapter does not implement the binary push protocol. It drives any
//! client satisfying [`GatewayClient`], obtained through a
//! [`GatewayConnector`] that owns endpoint selection and TLS authentication.
//! A scriptable in-memory implementation ([`MockConnector`]) ships alongside
//! the traits for tests and offline use.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ApnsConfig;
use crate::notification::Notification;

/// Which endpoint a connection serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Message gateway.
    Push,
    /// Invalidated-token feedback channel.
    Feedback,
}

/// Gateway result codes, from the binary protocol's error-response frame.
///
/// `0` is the only accepted outcome; every other code classifies the
/// rejection reason for one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultCode {
    /// 0 — accepted.
    Ok,
    /// 1 — processing error.
    ProcessingError,
    /// 2 — missing device token.
    MissingDeviceToken,
    /// 3 — missing topic.
    MissingTopic,
    /// 4 — missing payload.
    MissingPayload,
    /// 5 — invalid token size.
    InvalidTokenSize,
    /// 6 — invalid topic size.
    InvalidTopicSize,
    /// 7 — invalid payload size.
    InvalidPayloadSize,
    /// 8 — invalid token.
    InvalidToken,
    /// 10 — gateway is shutting down.
    Shutdown,
    /// 255 — unknown error.
    Unknown,
}

impl ResultCode {
    /// Whether this code classifies the send as accepted.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Decode a raw status byte. Unrecognized bytes map to [`Self::Unknown`].
    pub fn from_status(status: u8) -> Self {
        match status {
            0 => Self::Ok,
            1 => Self::ProcessingError,
            2 => Self::MissingDeviceToken,
            3 => Self::MissingTopic,
            4 => Self::MissingPayload,
            5 => Self::InvalidTokenSize,
            6 => Self::InvalidTopicSize,
            7 => Self::InvalidPayloadSize,
            8 => Self::InvalidToken,
            10 => Self::Shutdown,
            _ => Self::Unknown,
        }
    }

    /// Raw status byte for this code.
    pub fn as_status(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::ProcessingError => 1,
            Self::MissingDeviceToken => 2,
            Self::MissingTopic => 3,
            Self::MissingPayload => 4,
            Self::InvalidTokenSize => 5,
            Self::InvalidTopicSize => 6,
            Self::InvalidPayloadSize => 7,
            Self::InvalidToken => 8,
            Self::Shutdown => 10,
            Self::Unknown => 255,
        }
    }
}

/// Structured per-send response from the gateway client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// Identifier echoed back by the gateway (the composed notification id).
    pub id: String,
    /// Result code for this send.
    pub code: ResultCode,
}

/// One invalidated-token notice from the feedback channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    /// Device token reported invalid.
    pub token: String,
    /// Invalidation time, seconds since the Unix epoch.
    pub timestamp: u32,
}

/// Transport-level failure raised by a gateway client.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Connecting or authenticating to the endpoint failed.
    #[error("connect to {uri} failed: {reason}")]
    Connect {
        /// Endpoint that refused the connection.
        uri: String,
        /// Error description.
        reason: String,
    },

    /// The connection broke mid-operation.
    #[error("transport failure: {reason}")]
    Transport {
        /// Error description.
        reason: String,
    },
}

/// One open, authenticated session to a gateway endpoint.
///
/// Implementations own the socket and the binary framing. Methods take
/// `&mut self`: a client serves one adapter instance, never concurrent calls.
#[async_trait]
pub trait GatewayClient: Send {
    /// Send one composed notification and return the gateway's response.
    async fn send(
        &mut self,
        notification: &Notification,
    ) -> Result<GatewayResponse, GatewayError>;

    /// Read one bounded batch of invalidated-token records.
    async fn feedback(&mut self) -> Result<Vec<FeedbackRecord>, GatewayError>;

    /// Close the underlying connection.
    async fn close(&mut self);
}

/// Factory for gateway clients, one per connection purpose.
///
/// Implementations select the production or sandbox endpoint from the config
/// and authenticate with its certificate and passphrase.
#[async_trait]
pub trait GatewayConnector: Send + Sync {
    /// Open an authenticated connection for the given purpose.
    async fn open(
        &self,
        purpose: Purpose,
        config: &ApnsConfig,
    ) -> Result<Box<dyn GatewayClient>, GatewayError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Scriptable mock
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MockState {
    codes: Mutex<VecDeque<ResultCode>>,
    feedback: Mutex<Vec<FeedbackRecord>>,
    sent: Mutex<Vec<Notification>>,
    fail_send_at: Mutex<Option<usize>>,
    send_count: AtomicUsize,
    opened_push: AtomicUsize,
    opened_feedback: AtomicUsize,
    closed: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scriptable in-memory connector for tests.
///
/// Clients it opens pop result codes from a script (an exhausted script keeps
/// answering [`ResultCode::Ok`]), return a fixed feedback batch, and count
/// opens and closes so connection lifecycle can be asserted.
#[derive(Default)]
pub struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    /// Create a connector with an empty script (every send accepted).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue result codes returned by successive sends, in order.
    pub fn script_codes(&self, codes: impl IntoIterator<Item = ResultCode>) {
        lock(&self.state.codes).extend(codes);
    }

    /// Set the batch returned by feedback reads.
    pub fn set_feedback(&self, records: Vec<FeedbackRecord>) {
        *lock(&self.state.feedback) = records;
    }

    /// Fail the `index`-th send (0-based, counted across reconnects) with a
    /// transport error.
    pub fn fail_send_at(&self, index: usize) {
        *lock(&self.state.fail_send_at) = Some(index);
    }

    /// Number of connections opened for `purpose`.
    pub fn opened(&self, purpose: Purpose) -> usize {
        match purpose {
            Purpose::Push => self.state.opened_push.load(Ordering::SeqCst),
            Purpose::Feedback => self.state.opened_feedback.load(Ordering::SeqCst),
        }
    }

    /// Number of clients closed so far.
    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Notifications sent so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        lock(&self.state.sent).clone()
    }
}

#[async_trait]
impl GatewayConnector for MockConnector {
    async fn open(
        &self,
        purpose: Purpose,
        _config: &ApnsConfig,
    ) -> Result<Box<dyn GatewayClient>, GatewayError> {
        let counter = match purpose {
            Purpose::Push => &self.state.opened_push,
            Purpose::Feedback => &self.state.opened_feedback,
        };
        let _ = counter.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockClient {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockClient {
    state: Arc<MockState>,
}

#[async_trait]
impl GatewayClient for MockClient {
    async fn send(
        &mut self,
        notification: &Notification,
    ) -> Result<GatewayResponse, GatewayError> {
        let index = self.state.send_count.fetch_add(1, Ordering::SeqCst);
        if *lock(&self.state.fail_send_at) == Some(index) {
            return Err(GatewayError::Transport {
                reason: "scripted transport failure".to_string(),
            });
        }

        lock(&self.state.sent).push(notification.clone());
        let code = lock(&self.state.codes)
            .pop_front()
            .unwrap_or(ResultCode::Ok);
        Ok(GatewayResponse {
            id: notification.id.clone(),
            code,
        })
    }

    async fn feedback(&mut self) -> Result<Vec<FeedbackRecord>, GatewayError> {
        Ok(lock(&self.state.feedback).clone())
    }

    async fn close(&mut self) {
        let _ = self.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_code_round_trips_known_statuses() {
        for status in [0u8, 1, 2, 3, 4, 5, 6, 7, 8, 10, 255] {
            assert_eq!(ResultCode::from_status(status).as_status(), status);
        }
    }

    #[test]
    fn unrecognized_status_maps_to_unknown() {
        assert_eq!(ResultCode::from_status(9), ResultCode::Unknown);
        assert_eq!(ResultCode::from_status(42), ResultCode::Unknown);
    }

    #[test]
    fn only_zero_is_ok() {
        assert!(ResultCode::Ok.is_ok());
        assert!(!ResultCode::ProcessingError.is_ok());
        assert!(!ResultCode::InvalidToken.is_ok());
        assert!(!ResultCode::Unknown.is_ok());
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::Connect {
            uri: "gateway.sandbox.push.apple.com:2195".to_string(),
            reason: "handshake failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "connect to gateway.sandbox.push.apple.com:2195 failed: handshake failed"
        );

        let err = GatewayError::Transport {
            reason: "broken pipe".to_string(),
        };
        assert_eq!(err.to_string(), "transport failure: broken pipe");
    }

    #[test]
    fn connector_is_object_safe() {
        fn assert_object_safe(_: &dyn GatewayConnector) {}
        let _ = assert_object_safe;
    }

    #[tokio::test]
    async fn mock_client_follows_script_then_accepts() {
        use crate::message::{Device, Message};
        use crate::notification::compose;
        use std::path::PathBuf;

        let connector = MockConnector::new();
        connector.script_codes([ResultCode::InvalidToken]);
        let config = ApnsConfig {
            certificate: PathBuf::from("/certs/push.pem"),
            bundle_id: "com.example.App".to_string(),
            pass_phrase: None,
            environment: crate::config::Environment::Sandbox,
        };

        let mut client = connector.open(Purpose::Push, &config).await.unwrap();
        let n = compose("com.example.App", &Device::new("af03"), &Message::new("hi"));

        let first = client.send(&n).await.unwrap();
        assert_eq!(first.code, ResultCode::InvalidToken);
        assert_eq!(first.id, n.id);

        let second = client.send(&n).await.unwrap();
        assert_eq!(second.code, ResultCode::Ok);
        assert_eq!(connector.sent().len(), 2);
    }
}
