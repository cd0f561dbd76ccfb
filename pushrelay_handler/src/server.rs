use crate::{InboundEvent, InvocationContext, RelayError, RelayHandler};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, error, warn};
use pushrelay_audit::AuditStore;
use pushrelay_notification::{Notification, PushMessage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of a Pub/Sub push delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PushEnvelope {
    pub message: InboundEvent,
    #[serde(default)]
    pub subscription: Option<String>,
}

pub fn router<N, S>(handler: Arc<RelayHandler<N, S>>) -> Router
where
    N: Notification<PushMessage> + 'static,
    S: AuditStore + 'static,
{
    Router::new()
        .route("/", post(receive::<N, S>))
        .route("/healthz", get(healthz))
        .with_state(handler)
}

/// Maps an invocation failure to the status returned to the broker.
pub fn status_code(error: &RelayError) -> StatusCode {
    match error {
        RelayError::DecodeError(_) | RelayError::ValidationError(_) => StatusCode::BAD_REQUEST,
        RelayError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn receive<N, S>(State(handler): State<Arc<RelayHandler<N, S>>>, Json(envelope): Json<PushEnvelope>) -> StatusCode
where
    N: Notification<PushMessage> + 'static,
    S: AuditStore + 'static,
{
    let context = InvocationContext::from_event(&envelope.message);
    match handler.handle(&envelope.message, &context).await {
        Ok(report) => {
            debug!(
                "handled event_id={:?} subscription={:?} report={:?}",
                context.event_id, envelope.subscription, report
            );
            StatusCode::NO_CONTENT
        }
        Err(e) => {
            match &e {
                RelayError::ConfigError(_) => error!("rejected event_id={:?}: {}", context.event_id, e),
                _ => warn!("rejected event_id={:?}: {}", context.event_id, e),
            }
            status_code(&e)
        }
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
