//! Adapter error taxonomy.
//!
//! Delivery rejections (non-zero gateway result codes) are not errors: they
//! are recorded in the outcome log and dispatch continues.

use crate::gateway::GatewayError;

/// Errors surfaced by the adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The configured certificate path does not exist. Raised once at
    /// construction, before any connection attempt. Fatal.
    #[error("certificate {path} does not exist")]
    CertificateMissing {
        /// Configured certificate path.
        path: String,
    },

    /// The gateway transport failed. Aborts the current dispatch call; the
    /// failed device is not retried.
    #[error("push failed: {0}")]
    Push(#[from] GatewayError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certificate_missing_display() {
        let err = AdapterError::CertificateMissing {
            path: "/certs/missing.pem".to_string(),
        };
        assert_eq!(err.to_string(), "certificate /certs/missing.pem does not exist");
    }

    #[test]
    fn push_wraps_gateway_error() {
        let err = AdapterError::from(GatewayError::Transport {
            reason: "broken pipe".to_string(),
        });
        assert_eq!(err.to_string(), "push failed: transport failure: broken pipe");
        assert!(matches!(err, AdapterError::Push(_)));
    }
}
