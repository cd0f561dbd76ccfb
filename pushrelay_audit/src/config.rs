use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStoreType {
    Datastore,
    Memory,
}

impl Default for AuditStoreType {
    fn default() -> Self {
        Self::Datastore
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct AuditStoreConfig {
    #[builder(default)]
    #[serde(default)]
    pub store_type: AuditStoreType,
    #[builder(default)]
    #[serde(default)]
    pub datastore: DatastoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct DatastoreConfig {
    #[builder(default)]
    #[serde(default)]
    pub project_id: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub namespace: Option<String>,
    #[builder(default = default_kind())]
    #[serde(default = "default_kind")]
    pub kind: String,
    #[builder(default = default_base_url())]
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[builder(default)]
    #[serde(default)]
    pub access_token: Option<String>,
    #[builder(default = default_use_metadata_server())]
    #[serde(default = "default_use_metadata_server")]
    pub use_metadata_server: bool,
    #[builder(default = default_metadata_url())]
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,
    #[builder(default = default_unindexed_fields())]
    #[serde(default = "default_unindexed_fields")]
    pub unindexed_fields: Vec<String>,
    #[builder(default = default_timeout_secs())]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AuditStoreConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_kind() -> String {
    String::from("NotificationLogs")
}

fn default_base_url() -> String {
    String::from("https://datastore.googleapis.com")
}

fn default_use_metadata_server() -> bool {
    true
}

fn default_metadata_url() -> String {
    String::from("http://metadata.google.internal")
}

fn default_unindexed_fields() -> Vec<String> {
    vec![String::from("title"), String::from("content")]
}

fn default_timeout_secs() -> u64 {
    10
}
