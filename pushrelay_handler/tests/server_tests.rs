use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pushrelay_audit::{DeliveryStatus, MemoryAuditStore};
use pushrelay_handler::server::{router, status_code, PushEnvelope};
use pushrelay_handler::{DecodeError, RelayError, RelayHandler};
use pushrelay_notification::{Notification, PushMessage};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestPushError(String);

struct StaticNotification {
    fail: bool,
}

#[async_trait]
impl Notification<PushMessage> for StaticNotification {
    type Receipt = String;
    type Error = TestPushError;

    async fn push(&self, _message: PushMessage) -> Result<String, TestPushError> {
        if self.fail {
            Err(TestPushError("NotRegistered".to_string()))
        } else {
            Ok("1:08".to_string())
        }
    }
}

fn push_body(payload: &str) -> Body {
    Body::from(
        json!({
            "message": {
                "data": payload,
                "messageId": "2070443601311540",
                "message_id": "2070443601311540",
                "publishTime": "2026-10-16T12:00:00.000Z",
                "publish_time": "2026-10-16T12:00:00.000Z",
                "attributes": {"origin": "api"}
            },
            "subscription": "projects/relay/subscriptions/send-push-notification"
        })
        .to_string(),
    )
}

fn valid_payload() -> String {
    STANDARD.encode(
        json!({
            "device": "tok123",
            "user_id": "u1",
            "data": {"title": "Hi", "content": "Hello there"}
        })
        .to_string(),
    )
}

fn post(body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

fn app(notification: Option<StaticNotification>, store: Arc<MemoryAuditStore>) -> axum::Router {
    let handler = RelayHandler::<StaticNotification, MemoryAuditStore>::builder()
        .notification(notification)
        .store(store)
        .build();
    router(Arc::new(handler))
}

#[tokio::test]
async fn test_push_delivered() {
    let store = Arc::new(MemoryAuditStore::new());
    let response = app(Some(StaticNotification { fail: false }), store.clone())
        .oneshot(post(push_body(&valid_payload())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.records().await[0].status, DeliveryStatus::Sent);
}

#[tokio::test]
async fn test_push_delivery_failed_is_acknowledged() {
    let store = Arc::new(MemoryAuditStore::new());
    let response = app(Some(StaticNotification { fail: true }), store.clone())
        .oneshot(post(push_body(&valid_payload())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.records().await[0].status, DeliveryStatus::Failed);
}

#[tokio::test]
async fn test_push_malformed_payload() {
    let store = Arc::new(MemoryAuditStore::new());
    let response = app(Some(StaticNotification { fail: false }), store.clone())
        .oneshot(post(push_body("not base64!!")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let payload = STANDARD.encode(json!({"device": "tok123"}).to_string());
    let response = app(Some(StaticNotification { fail: false }), store.clone())
        .oneshot(post(push_body(&payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn test_push_missing_credentials() {
    let store = Arc::new(MemoryAuditStore::new());
    let response = app(None, store.clone())
        .oneshot(post(push_body(&valid_payload())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn test_healthz() {
    let response = app(None, Arc::new(MemoryAuditStore::new()))
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn test_status_code() {
    let err = RelayError::ValidationError("missing".to_string());
    assert_eq!(status_code(&err), StatusCode::BAD_REQUEST);
    let err = RelayError::ConfigError("missing".to_string());
    assert_eq!(status_code(&err), StatusCode::INTERNAL_SERVER_ERROR);
    let err = RelayError::DecodeError(DecodeError::Utf8Error(String::from_utf8(vec![0xff]).unwrap_err()));
    assert_eq!(status_code(&err), StatusCode::BAD_REQUEST);
}

#[test]
fn test_envelope_deserialize() {
    let envelope: PushEnvelope = serde_json::from_str(
        &json!({
            "message": {
                "data": "e30=",
                "messageId": "m-1",
                "message_id": "m-1",
                "attributes": {"origin": "api"}
            },
            "subscription": "projects/relay/subscriptions/send-push-notification"
        })
        .to_string(),
    )
    .unwrap();
    assert_eq!(envelope.message.data, "e30=");
    assert_eq!(envelope.message.message_id.as_deref(), Some("m-1"));
    assert_eq!(envelope.message.attributes.get("origin").map(String::as_str), Some("api"));
    assert!(envelope.message.publish_time.is_none());
}
