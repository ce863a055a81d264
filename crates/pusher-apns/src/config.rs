//! Adapter configuration and gateway endpoint selection.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::gateway::Purpose;

/// Gateway environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live gateway.
    Production,
    /// Development gateway.
    #[default]
    Sandbox,
}

impl Environment {
    /// Push gateway endpoint for this environment.
    pub fn gateway_uri(self) -> &'static str {
        match self {
            Self::Production => "gateway.push.apple.com:2195",
            Self::Sandbox => "gateway.sandbox.push.apple.com:2195",
        }
    }

    /// Feedback channel endpoint for this environment.
    pub fn feedback_uri(self) -> &'static str {
        match self {
            Self::Production => "feedback.push.apple.com:2196",
            Self::Sandbox => "feedback.sandbox.push.apple.com:2196",
        }
    }
}

/// Construction-time adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApnsConfig {
    /// Path to the PEM certificate used to authenticate to the gateway.
    pub certificate: PathBuf,
    /// App bundle identifier carried on every composed notification.
    pub bundle_id: String,
    /// Optional certificate passphrase.
    #[serde(default)]
    pub pass_phrase: Option<String>,
    /// Gateway environment. Defaults to sandbox.
    #[serde(default)]
    pub environment: Environment,
}

impl ApnsConfig {
    /// Endpoint URI for the given connection purpose in this environment.
    pub fn uri_for(&self, purpose: Purpose) -> &'static str {
        match purpose {
            Purpose::Push => self.environment.gateway_uri(),
            Purpose::Feedback => self.environment.feedback_uri(),
        }
    }
}
