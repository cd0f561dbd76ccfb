use crate::{DecodeError, RelayError, RelayResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NotificationRequest {
    pub device_token: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    #[builder(default)]
    pub idempotency_key: Option<String>,
}

// The API publishes `user_id` as an integer and the nested object with
// capitalised keys, so both spellings are accepted.
#[derive(Debug, Deserialize)]
struct RawNotificationRequest {
    #[serde(default)]
    device: Option<String>,
    #[serde(default)]
    user_id: Option<RawUserId>,
    #[serde(default, alias = "Data")]
    data: Option<RawNotificationData>,
    #[serde(default)]
    idempotency_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Default, Deserialize)]
struct RawNotificationData {
    #[serde(default, alias = "Title")]
    title: Option<String>,
    #[serde(default, alias = "Content")]
    content: Option<String>,
}

impl NotificationRequest {
    /// Decodes a base64 payload carrying a UTF-8 JSON notification request.
    pub fn decode(data: &str) -> RelayResult<Self> {
        let bytes = STANDARD.decode(data.trim()).map_err(DecodeError::from)?;
        let text = String::from_utf8(bytes).map_err(DecodeError::from)?;
        let value = serde_json::from_str::<Value>(&text).map_err(DecodeError::from)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> RelayResult<Self> {
        let raw = serde_json::from_value::<RawNotificationRequest>(value)
            .map_err(|e| RelayError::ValidationError(format!("malformed notification request: {}", e)))?;
        let data = raw.data.unwrap_or_default();
        let user_id = raw.user_id.map(|id| match id {
            RawUserId::Text(text) => text,
            RawUserId::Number(number) => number.to_string(),
        });

        let device = required(raw.device);
        let user_id = required(user_id);
        let title = required(data.title);
        let content = required(data.content);
        let mut missing = vec![];
        if device.is_none() {
            missing.push("device");
        }
        if user_id.is_none() {
            missing.push("user_id");
        }
        if title.is_none() {
            missing.push("data.title");
        }
        if content.is_none() {
            missing.push("data.content");
        }

        match (device, user_id, title, content) {
            (Some(device_token), Some(user_id), Some(title), Some(content)) => Ok(Self {
                device_token,
                user_id,
                title,
                content,
                idempotency_key: raw.idempotency_key.filter(|key| !key.trim().is_empty()),
            }),
            _ => Err(RelayError::ValidationError(format!(
                "missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
