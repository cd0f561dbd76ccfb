use config::{Config, Environment, File};
use pushrelay_audit::AuditStoreConfig;
use pushrelay_notification::FcmConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use typed_builder::TypedBuilder;

const RELAY_ENV_CONFIG_PREFIX: &str = "PUSHRELAY";
const RELAY_CONFIG_FILE: &str = "relay";
const FIREBASE_API_KEY_ENV: &str = "FIREBASE_API_KEY";
const PORT_ENV: &str = "PORT";
const PROJECT_ID_ENVS: [&str; 3] = ["DATASTORE_PROJECT_ID", "GOOGLE_CLOUD_PROJECT", "GCP_PROJECT"];

#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct HandlerConfig {
    #[serde(default = "default_delivery_timeout_secs")]
    #[builder(default = default_delivery_timeout_secs())]
    pub delivery_timeout_secs: u64,

    #[serde(default = "default_storage_timeout_secs")]
    #[builder(default = default_storage_timeout_secs())]
    pub storage_timeout_secs: u64,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    #[builder(default = default_host())]
    pub host: String,

    #[serde(default = "default_port")]
    #[builder(default = default_port())]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct RelayConfig {
    #[serde(default)]
    #[builder(default)]
    pub fcm: FcmConfig,

    #[serde(default)]
    #[builder(default)]
    pub audit: AuditStoreConfig,

    #[serde(default)]
    #[builder(default)]
    pub handler: HandlerConfig,

    #[serde(default)]
    #[builder(default)]
    pub server: ServerConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RelayConfig {
    /// Loads `relay.json` from `config_path` when present, then applies
    /// `PUSHRELAY.*` environment overrides and the platform variables
    /// (`FIREBASE_API_KEY`, project id, `PORT`).
    pub fn new(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            if path.join(format!("{}.json", RELAY_CONFIG_FILE)).exists() {
                let file = path.join(RELAY_CONFIG_FILE);
                builder = builder.add_source(File::with_name(&file.to_string_lossy()));
            }
        }
        builder = builder.add_source(Environment::with_prefix(RELAY_ENV_CONFIG_PREFIX).separator("."));

        let mut config = builder.build()?.try_deserialize::<Self>()?;
        if config.fcm.api_key.is_none() {
            config.fcm.api_key = env_value(FIREBASE_API_KEY_ENV);
        }
        if config.audit.datastore.project_id.is_none() {
            config.audit.datastore.project_id = PROJECT_ID_ENVS.iter().find_map(|name| env_value(name));
        }
        if let Some(port) = env_value(PORT_ENV) {
            config.server.port = port.parse()?;
        }
        Ok(config)
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn default_delivery_timeout_secs() -> u64 {
    15
}

fn default_storage_timeout_secs() -> u64 {
    15
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}
