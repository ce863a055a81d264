//! Inbound data model: messages, devices, push requests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-message options, each one explicitly optional.
///
/// An absent field means "do not set this on the wire" — the composer never
/// substitutes a defaulted zero value for a field the caller did not set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOptions {
    /// Badge count, before any per-device offset is applied.
    pub badge: Option<u32>,
    /// Sound name (e.g. `"default"`).
    pub sound: Option<String>,
    /// Silent-wake flag.
    pub content_available: Option<bool>,
    /// Allow a notification service extension to rewrite the payload.
    pub mutable_content: Option<bool>,
    /// Notification category for actionable notifications.
    pub category: Option<String>,
    /// URL arguments for Safari push.
    pub url_args: Option<Vec<String>>,
    /// Expiration, seconds the gateway may hold the notification.
    pub expire: Option<u32>,
    /// Alert title.
    pub title: Option<String>,
    /// Localization key for the action button.
    pub action_loc_key: Option<String>,
    /// Localization key for the alert body.
    pub loc_key: Option<String>,
    /// Arguments substituted into the localized body.
    pub loc_args: Option<Vec<String>>,
    /// Launch image filename.
    pub launch_image: Option<String>,
    /// Localization key for the title.
    pub title_loc_key: Option<String>,
    /// Arguments substituted into the localized title.
    pub title_loc_args: Option<Vec<String>>,
    /// Custom payload keys, hoisted to the payload root beside `aps`.
    #[serde(default)]
    pub custom: HashMap<String, serde_json::Value>,
}

/// An application-level push message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Alert text.
    pub text: String,
    /// Delivery and presentation options.
    #[serde(default)]
    pub options: MessageOptions,
}

impl Message {
    /// Create a message with no options set.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: MessageOptions::default(),
        }
    }
}

/// A target device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Opaque hex device token.
    pub token: String,
    /// Offset added to the message badge for this device.
    #[serde(default)]
    pub badge_offset: u32,
}

impl Device {
    /// Create a device with no badge offset.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            badge_offset: 0,
        }
    }
}

/// A message plus its ordered target devices.
///
/// Consumed by reference; the caller keeps ownership.
#[derive(Debug, Clone)]
pub struct PushRequest {
    /// The message to deliver.
    pub message: Message,
    /// Target devices, processed in this order.
    pub devices: Vec<Device>,
}
