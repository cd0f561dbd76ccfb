use crate::{Notification, PushMessage};
use async_trait::async_trait;
use log::debug;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use typed_builder::TypedBuilder;

const FCM_SEND_PATH: &str = "/fcm/send";

#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct FcmConfig {
    #[serde(default)]
    #[builder(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    #[builder(default = default_base_url())]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    #[builder(default = default_timeout_secs())]
    pub timeout_secs: u64,

    #[serde(default = "default_priority")]
    #[builder(default = default_priority())]
    pub priority: String,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Error)]
pub enum FcmNotificationError {
    #[error("api key not configure error")]
    ApiKeyNotConfigureError,
    #[error("server response error {0}: {1}")]
    ResponseError(u16, String),
    #[error("delivery rejected error {0}")]
    RejectedError(String),
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize)]
struct FcmSendRequest<'a> {
    to: &'a str,
    priority: &'a str,
    notification: FcmNotificationPayload<'a>,
}

#[derive(Debug, Clone, Serialize)]
struct FcmNotificationPayload<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FcmSendResponse {
    #[serde(default)]
    pub multicast_id: Option<i64>,
    #[serde(default)]
    pub success: u32,
    #[serde(default)]
    pub failure: u32,
    #[serde(default)]
    pub canonical_ids: u32,
    #[serde(default)]
    pub results: Vec<FcmSendResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FcmSendResult {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub registration_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Single-device delivery through the FCM HTTP API.
#[derive(Debug, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct FcmNotification {
    api_key: String,
    #[builder(default = default_base_url())]
    base_url: String,
    #[builder(default = default_priority())]
    priority: String,
    #[builder(default)]
    client: reqwest::Client,
}

#[async_trait]
impl Notification<PushMessage> for FcmNotification {
    type Receipt = FcmSendResponse;
    type Error = FcmNotificationError;

    async fn push(&self, message: PushMessage) -> Result<Self::Receipt, Self::Error> {
        let request = FcmSendRequest {
            to: &message.device_token,
            priority: &self.priority,
            notification: FcmNotificationPayload {
                title: &message.title,
                body: &message.body,
            },
        };
        let response = self
            .client
            .post(self.send_url())
            .header(AUTHORIZATION, format!("key={}", self.api_key))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FcmNotificationError::ResponseError(status.as_u16(), body));
        }

        let result = response.json::<FcmSendResponse>().await?;
        debug!(
            "fcm send finished multicast_id={:?} success={} failure={}",
            result.multicast_id, result.success, result.failure
        );
        if result.failure > 0 {
            let reason = result
                .results
                .iter()
                .find_map(|r| r.error.clone())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(FcmNotificationError::RejectedError(reason));
        }
        Ok(result)
    }
}

impl FcmNotification {
    pub fn from_config(config: &FcmConfig) -> Result<Self, FcmNotificationError> {
        let api_key = config
            .api_key
            .as_ref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(FcmNotificationError::ApiKeyNotConfigureError)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::builder()
            .api_key(api_key.clone())
            .base_url(config.base_url.clone())
            .priority(config.priority.clone())
            .client(client)
            .build())
    }

    fn send_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), FCM_SEND_PATH)
    }
}

fn default_base_url() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_priority() -> String {
    "high".to_string()
}
