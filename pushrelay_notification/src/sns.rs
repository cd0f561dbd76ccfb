use crate::{Notification, PushMessage};
use async_trait::async_trait;
use rusoto_core::{Region, RusotoError};
use rusoto_sns::{PublishError, PublishInput, Sns, SnsClient};
use serde_json::json;
use thiserror::Error;
use typed_builder::TypedBuilder;

const SNS_MESSAGE_STRUCTURE: &str = "json";

/// Delivery through an SNS mobile-push platform endpoint. The device token
/// of the message is the endpoint ARN.
#[derive(Debug, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct SnsNotification<S: Sns = SnsClient> {
    client: S,
}

#[derive(Debug, Error)]
pub enum SnsNotificationError {
    #[error(transparent)]
    PushError(#[from] RusotoError<PublishError>),
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

#[async_trait]
impl<S> Notification<PushMessage> for SnsNotification<S>
where
    S: Sns + Send + Sync,
{
    type Receipt = Option<String>;
    type Error = SnsNotificationError;

    async fn push(&self, message: PushMessage) -> Result<Self::Receipt, Self::Error> {
        let gcm = json!({
            "notification": {
                "title": message.title,
                "body": message.body,
            }
        });
        let payload = json!({
            "default": message.body,
            "GCM": serde_json::to_string(&gcm)?,
        });
        let input = PublishInput {
            message: serde_json::to_string(&payload)?,
            message_structure: Some(SNS_MESSAGE_STRUCTURE.to_string()),
            subject: Some(message.title),
            target_arn: Some(message.device_token),
            ..Default::default()
        };
        let response = self.client.publish(input).await?;
        Ok(response.message_id)
    }
}

impl SnsNotification<SnsClient> {
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }

    pub fn from_region<R>(region: R) -> Self
    where
        R: Into<Region>,
    {
        Self::new(SnsClient::new(region.into()))
    }
}
