use crate::{
    DeliveryError, HandlerConfig, InboundEvent, InvocationContext, NotificationRequest, RelayConfig, RelayError,
    RelayResult, StorageError,
};
use log::{error, info, warn};
use pushrelay_audit::{create_audit_store, AuditRecord, AuditStore, DeliveryStatus};
use pushrelay_notification::{FcmNotification, FcmNotificationError, Notification, PushMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub receipt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct InvocationReport {
    #[builder(default)]
    pub status: Option<DeliveryStatus>,
    #[builder(default)]
    pub record_id: Option<String>,
    #[builder(default)]
    pub delivery_error: Option<DeliveryError>,
    #[builder(default)]
    pub storage_error: Option<StorageError>,
    #[builder(default = false)]
    pub duplicate: bool,
}

/// Relays one notification request per invocation: decode, push, audit.
///
/// Only malformed input and missing credentials fail an invocation. A failed
/// push is recorded with `failed` status and a failed audit write is logged;
/// both still report success so the broker does not redeliver over an outage.
#[derive(TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct RelayHandler<N: Notification<PushMessage>, S: AuditStore = Box<dyn AuditStore>> {
    #[builder(default)]
    notification: Option<N>,
    store: Arc<S>,
    #[builder(default)]
    config: HandlerConfig,
}

impl RelayHandler<FcmNotification> {
    pub fn from_config(config: &RelayConfig) -> anyhow::Result<Self> {
        let notification = match FcmNotification::from_config(&config.fcm) {
            Ok(notification) => Some(notification),
            Err(FcmNotificationError::ApiKeyNotConfigureError) => {
                warn!("FIREBASE_API_KEY is not configured, every invocation will be rejected");
                None
            }
            Err(e) => return Err(e.into()),
        };
        let store = create_audit_store(&config.audit)?;
        Ok(Self::builder()
            .notification(notification)
            .store(store)
            .config(config.handler.clone())
            .build())
    }
}

impl<N, S> RelayHandler<N, S>
where
    N: Notification<PushMessage>,
    S: AuditStore,
{
    pub async fn handle(&self, event: &InboundEvent, context: &InvocationContext) -> RelayResult<InvocationReport> {
        let request = NotificationRequest::decode(&event.data)?;
        let notification = self
            .notification
            .as_ref()
            .ok_or_else(|| RelayError::ConfigError("FIREBASE_API_KEY is not configured".to_string()))?;

        if let Some(key) = &request.idempotency_key {
            if self.already_recorded(key).await {
                info!(
                    "skipping duplicate notification event_id={:?} idempotency_key={}",
                    context.event_id, key
                );
                return Ok(InvocationReport::builder().duplicate(true).build());
            }
        }

        let delivery = self.deliver(notification, &request).await;
        let status = match &delivery {
            Ok(_) => DeliveryStatus::Sent,
            Err(_) => DeliveryStatus::Failed,
        };
        match &delivery {
            Ok(outcome) => info!(
                "notification sent event_id={:?} user_id={} receipt={}",
                context.event_id, request.user_id, outcome.receipt
            ),
            Err(e) => warn!(
                "notification failed event_id={:?} user_id={}: {}",
                context.event_id, request.user_id, e
            ),
        }

        let record = AuditRecord::builder()
            .device_target(request.device_token)
            .user_id(request.user_id)
            .title(request.title)
            .content(request.content)
            .status(status)
            .idempotency_key(request.idempotency_key)
            .created_at(context.timestamp)
            .build();
        let stored = self.record(record).await;
        if let Err(e) = &stored {
            error!("audit record not written event_id={:?}: {}", context.event_id, e);
        }

        let (record_id, storage_error) = match stored {
            Ok(id) => (Some(id), None),
            Err(e) => (None, Some(e)),
        };
        Ok(InvocationReport::builder()
            .status(Some(status))
            .record_id(record_id)
            .delivery_error(delivery.err())
            .storage_error(storage_error)
            .build())
    }

    async fn deliver(&self, notification: &N, request: &NotificationRequest) -> Result<DeliveryOutcome, DeliveryError> {
        let message = PushMessage::builder()
            .device_token(request.device_token.clone())
            .title(request.title.clone())
            .body(request.content.clone())
            .build();
        let secs = self.config.delivery_timeout_secs;
        match timeout(Duration::from_secs(secs), notification.push(message)).await {
            Ok(Ok(receipt)) => Ok(DeliveryOutcome {
                receipt: format!("{:?}", receipt),
            }),
            Ok(Err(e)) => Err(DeliveryError::PushError(e.to_string())),
            Err(_) => Err(DeliveryError::TimeoutError(secs)),
        }
    }

    async fn record(&self, record: AuditRecord) -> Result<String, StorageError> {
        let secs = self.config.storage_timeout_secs;
        match timeout(Duration::from_secs(secs), self.store.insert(record.into())).await {
            Ok(Ok(response)) => Ok(response.id),
            Ok(Err(e)) => Err(StorageError::InsertError(format!("{:#}", e))),
            Err(_) => Err(StorageError::TimeoutError(secs)),
        }
    }

    async fn already_recorded(&self, key: &str) -> bool {
        let secs = self.config.storage_timeout_secs;
        match timeout(Duration::from_secs(secs), self.store.exists(key.into())).await {
            Ok(Ok(response)) => response.exists,
            Ok(Err(e)) => {
                warn!("idempotency lookup failed for {}: {:#}", key, e);
                false
            }
            Err(_) => {
                warn!("idempotency lookup for {} timed out after {}s", key, secs);
                false
            }
        }
    }
}
