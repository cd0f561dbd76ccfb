use pushrelay_audit::AuditStoreType;
use pushrelay_handler::RelayConfig;
use std::env;
use std::path::PathBuf;

#[test]
fn test_read_config() {
    for name in [
        "FIREBASE_API_KEY",
        "PORT",
        "DATASTORE_PROJECT_ID",
        "GOOGLE_CLOUD_PROJECT",
        "GCP_PROJECT",
        "PUSHRELAY.HANDLER.DELIVERY_TIMEOUT_SECS",
    ] {
        env::remove_var(name);
    }

    let cfg = RelayConfig::new(None).unwrap();
    assert!(cfg.fcm.api_key.is_none());
    assert_eq!(cfg.fcm.base_url, "https://fcm.googleapis.com");
    assert_eq!(cfg.handler.delivery_timeout_secs, 15);
    assert_eq!(cfg.handler.storage_timeout_secs, 15);
    assert_eq!(cfg.audit.store_type, AuditStoreType::Datastore);
    assert_eq!(cfg.audit.datastore.kind, "NotificationLogs");
    assert_eq!(cfg.server.address(), "0.0.0.0:8080");

    let cfg = RelayConfig::new(Some(PathBuf::from("tests/files/missing"))).unwrap();
    assert_eq!(cfg, RelayConfig::new(None).unwrap());

    env::set_var("FIREBASE_API_KEY", "env-api-key");
    env::set_var("GCP_PROJECT", "relay-env");
    let cfg = RelayConfig::new(None).unwrap();
    assert_eq!(cfg.fcm.api_key.as_deref(), Some("env-api-key"));
    assert_eq!(cfg.audit.datastore.project_id.as_deref(), Some("relay-env"));

    let cfg = RelayConfig::new(Some(PathBuf::from("tests/files/config"))).unwrap();
    assert_eq!(cfg.fcm.api_key.as_deref(), Some("file-api-key"));
    assert_eq!(cfg.fcm.timeout_secs, 3);
    assert_eq!(cfg.audit.store_type, AuditStoreType::Memory);
    assert_eq!(cfg.audit.datastore.project_id.as_deref(), Some("relay-file"));
    assert_eq!(cfg.handler.delivery_timeout_secs, 7);
    assert_eq!(cfg.handler.storage_timeout_secs, 15);
    assert_eq!(cfg.server.port, 9090);

    env::set_var("PUSHRELAY.HANDLER.DELIVERY_TIMEOUT_SECS", "2");
    env::set_var("PORT", "7000");
    let cfg = RelayConfig::new(Some(PathBuf::from("tests/files/config"))).unwrap();
    assert_eq!(cfg.handler.delivery_timeout_secs, 2);
    assert_eq!(cfg.server.port, 7000);

    env::remove_var("PUSHRELAY.HANDLER.DELIVERY_TIMEOUT_SECS");
    let cfg = RelayConfig::new(Some(PathBuf::from("tests/files/invalid")));
    assert!(cfg.is_err());

    env::set_var("PORT", "not-a-port");
    assert!(RelayConfig::new(None).is_err());

    for name in ["FIREBASE_API_KEY", "PORT", "GCP_PROJECT"] {
        env::remove_var(name);
    }
}
