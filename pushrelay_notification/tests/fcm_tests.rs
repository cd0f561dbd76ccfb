use mockito::Matcher;
use pushrelay_notification::{FcmConfig, FcmNotification, FcmNotificationError, Notification, PushMessage};
use serde_json::json;

fn message() -> PushMessage {
    PushMessage::builder()
        .device_token("tok123")
        .title("Hi")
        .body("Hello there")
        .build()
}

fn notification(base_url: String) -> FcmNotification {
    let config = FcmConfig::builder()
        .api_key(Some("test-api-key".to_string()))
        .base_url(base_url)
        .timeout_secs(5_u64)
        .build();
    FcmNotification::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_push() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/fcm/send")
        .match_header("authorization", "key=test-api-key")
        .match_body(Matcher::PartialJson(json!({
            "to": "tok123",
            "priority": "high",
            "notification": {"title": "Hi", "body": "Hello there"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "multicast_id": 108,
                "success": 1,
                "failure": 0,
                "canonical_ids": 0,
                "results": [{"message_id": "1:08"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let receipt = notification(server.url()).push(message()).await.unwrap();
    assert_eq!(receipt.success, 1);
    assert_eq!(receipt.multicast_id, Some(108));
    assert_eq!(receipt.results[0].message_id.as_deref(), Some("1:08"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_push_rejected() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/fcm/send")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "multicast_id": 109,
                "success": 0,
                "failure": 1,
                "canonical_ids": 0,
                "results": [{"error": "InvalidRegistration"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = notification(server.url()).push(message()).await.unwrap_err();
    match err {
        FcmNotificationError::RejectedError(reason) => assert_eq!(reason, "InvalidRegistration"),
        other => panic!("unexpected error {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_push_server_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/fcm/send")
        .with_status(401)
        .with_body("Unauthorized")
        .create_async()
        .await;

    let err = notification(server.url()).push(message()).await.unwrap_err();
    match err {
        FcmNotificationError::ResponseError(status, body) => {
            assert_eq!(status, 401);
            assert_eq!(body, "Unauthorized");
        }
        other => panic!("unexpected error {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_from_config_without_api_key() {
    let result = FcmNotification::from_config(&FcmConfig::default());
    assert!(matches!(result, Err(FcmNotificationError::ApiKeyNotConfigureError)));

    let config = FcmConfig::builder().api_key(Some("  ".to_string())).build();
    let result = FcmNotification::from_config(&config);
    assert!(matches!(result, Err(FcmNotificationError::ApiKeyNotConfigureError)));
}

#[test]
fn test_default_config() {
    let config = FcmConfig::default();
    assert_eq!(config.base_url, "https://fcm.googleapis.com");
    assert_eq!(config.priority, "high");
    assert_eq!(config.timeout_secs, 10);
    assert!(config.api_key.is_none());
}
