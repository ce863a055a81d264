//! Message composition: one gateway-ready notification per (device, message).

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::message::{Device, Message};

/// Alert portion of a composed notification.
///
/// Serializes with the gateway's kebab-case keys (`loc-key`, `launch-image`,
/// ...). Absent fields are omitted, never emitted as null.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Alert {
    /// Alert body text.
    pub body: String,
    /// Alert title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Localization key for the action button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_loc_key: Option<String>,
    /// Localization key for the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc_key: Option<String>,
    /// Arguments substituted into the localized body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc_args: Option<Vec<String>>,
    /// Launch image filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_image: Option<String>,
    /// Localization key for the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_key: Option<String>,
    /// Arguments substituted into the localized title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_args: Option<Vec<String>>,
}

/// A composed, wire-ready notification for one device.
///
/// Built fresh per (device, message) pair. It embeds the device token and a
/// content-derived identifier, so it is never reused across devices.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Deterministic identifier, hex digest of token ++ text.
    pub id: String,
    /// App bundle identifier from the adapter configuration.
    pub bundle_id: String,
    /// Target device token.
    pub token: String,
    /// Alert content.
    pub alert: Alert,
    /// Badge count including the per-device offset; `None` means omit.
    pub badge: Option<u32>,
    /// Sound name.
    pub sound: Option<String>,
    /// Silent-wake flag.
    pub content_available: Option<bool>,
    /// Mutable-content flag.
    pub mutable_content: Option<bool>,
    /// Notification category.
    pub category: Option<String>,
    /// URL arguments for Safari push.
    pub url_args: Option<Vec<String>>,
    /// Expiration in seconds; frame metadata, not part of the JSON payload.
    pub expire: Option<u32>,
    /// Custom payload keys.
    pub custom: HashMap<String, serde_json::Value>,
}

impl Notification {
    /// Render the JSON payload for this notification.
    ///
    /// Absent optional fields are omitted entirely. Boolean flags serialize
    /// as `1` when set. Custom keys sit at the payload root beside `aps`.
    pub fn payload(&self) -> serde_json::Value {
        let mut aps = serde_json::json!({ "alert": self.alert });
        if let Some(badge) = self.badge {
            aps["badge"] = serde_json::json!(badge);
        }
        if let Some(ref sound) = self.sound {
            aps["sound"] = serde_json::json!(sound);
        }
        if self.content_available == Some(true) {
            aps["content-available"] = serde_json::json!(1);
        }
        if self.mutable_content == Some(true) {
            aps["mutable-content"] = serde_json::json!(1);
        }
        if let Some(ref category) = self.category {
            aps["category"] = serde_json::json!(category);
        }
        if let Some(ref url_args) = self.url_args {
            aps["url-args"] = serde_json::json!(url_args);
        }

        let mut payload = serde_json::json!({ "aps": aps });
        if let Some(obj) = payload.as_object_mut() {
            for (key, value) in &self.custom {
                let _ = obj.insert(key.clone(), value.clone());
            }
        }
        payload
    }
}

/// Compose a notification for one device.
///
/// Inputs are assumed pre-validated by the caller; composition cannot fail.
/// The badge is the message badge plus the device offset when the message
/// declares one, and omitted entirely otherwise — omitted is distinct from
/// zero.
pub fn compose(bundle_id: &str, device: &Device, message: &Message) -> Notification {
    let opts = &message.options;

    Notification {
        id: notification_id(&device.token, &message.text),
        bundle_id: bundle_id.to_string(),
        token: device.token.clone(),
        alert: Alert {
            body: message.text.clone(),
            title: opts.title.clone(),
            action_loc_key: opts.action_loc_key.clone(),
            loc_key: opts.loc_key.clone(),
            loc_args: opts.loc_args.clone(),
            launch_image: opts.launch_image.clone(),
            title_loc_key: opts.title_loc_key.clone(),
            title_loc_args: opts.title_loc_args.clone(),
        },
        badge: opts.badge.map(|badge| badge + device.badge_offset),
        sound: opts.sound.clone(),
        content_available: opts.content_available,
        mutable_content: opts.mutable_content,
        category: opts.category.clone(),
        url_args: opts.url_args.clone(),
        expire: opts.expire,
        custom: opts.custom.clone(),
    }
}

/// Deterministic identifier for a (token, text) pair.
///
/// Equal pairs always yield equal identifiers, so a resend of the same text
/// to the same device carries the same id for dedup and debugging downstream.
pub fn notification_id(token: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.update(text.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
