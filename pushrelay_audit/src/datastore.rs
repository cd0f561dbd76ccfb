use crate::{
    AccessTokenSource, AuditRecord, AuditStore, DatastoreConfig, ExistsRecordRequest, ExistsRecordResponse,
    InsertRecordRequest, InsertRecordResponse, MetadataTokenSource,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;
use typed_builder::TypedBuilder;

#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("project id not configure error")]
    ProjectIdNotConfigureError,
    #[error("server response error {0}: {1}")]
    ResponseError(u16, String),
    #[error("missing mutation result error")]
    MissingMutationResultError,
}

/// Audit store backed by the Cloud Datastore REST API. Every insert is a
/// single non-transactional commit.
#[derive(Debug, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct DatastoreAuditStore {
    project_id: String,
    #[builder(default)]
    namespace: Option<String>,
    #[builder(default = String::from("NotificationLogs"))]
    kind: String,
    #[builder(default = String::from("https://datastore.googleapis.com"))]
    base_url: String,
    #[builder(default)]
    unindexed_fields: Vec<String>,
    #[builder(default = AccessTokenSource::Anonymous)]
    token: AccessTokenSource,
    #[builder(default)]
    client: reqwest::Client,
}

#[async_trait]
impl AuditStore for DatastoreAuditStore {
    async fn insert(&self, request: InsertRecordRequest) -> Result<InsertRecordResponse> {
        let record = &request.record;
        let body = json!({
            "mode": "NON_TRANSACTIONAL",
            "mutations": [{
                "insert": {
                    "key": self.key(record.idempotency_key.as_deref()),
                    "properties": self.properties(record),
                }
            }]
        });
        let response = self.call("commit", &body).await?;
        // Datastore only echoes keys it allocated; named inserts return a bare version.
        let id = match &record.idempotency_key {
            Some(name) => name.clone(),
            None => response
                .pointer("/mutationResults/0/key/path")
                .and_then(Value::as_array)
                .and_then(|path| path.last())
                .and_then(|element| element.get("id"))
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or(DatastoreError::MissingMutationResultError)?,
        };
        debug!("inserted {} entity {}", self.kind, id);
        Ok(InsertRecordResponse::builder().id(id).build())
    }

    async fn exists(&self, request: ExistsRecordRequest) -> Result<ExistsRecordResponse> {
        let body = json!({ "keys": [self.key(Some(&request.key))] });
        let response = self.call("lookup", &body).await?;
        let exists = response
            .get("found")
            .and_then(Value::as_array)
            .map(|found| !found.is_empty())
            .unwrap_or(false);
        Ok(ExistsRecordResponse::builder().exists(exists).build())
    }
}

impl DatastoreAuditStore {
    pub fn from_config(config: &DatastoreConfig) -> Result<Self> {
        let project_id = config
            .project_id
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(DatastoreError::ProjectIdNotConfigureError)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let token = if let Some(access_token) = &config.access_token {
            AccessTokenSource::Static(access_token.clone())
        } else if config.use_metadata_server {
            AccessTokenSource::Metadata(
                MetadataTokenSource::builder()
                    .metadata_url(config.metadata_url.clone())
                    .client(client.clone())
                    .build(),
            )
        } else {
            AccessTokenSource::Anonymous
        };
        Ok(Self::builder()
            .project_id(project_id)
            .namespace(config.namespace.clone())
            .kind(config.kind.clone())
            .base_url(config.base_url.clone())
            .unindexed_fields(config.unindexed_fields.clone())
            .token(token)
            .client(client)
            .build())
    }

    fn key(&self, name: Option<&str>) -> Value {
        let mut partition = Map::new();
        partition.insert("projectId".to_string(), json!(self.project_id));
        if let Some(namespace) = &self.namespace {
            partition.insert("namespaceId".to_string(), json!(namespace));
        }
        let mut element = Map::new();
        element.insert("kind".to_string(), json!(self.kind));
        if let Some(name) = name {
            element.insert("name".to_string(), json!(name));
        }
        json!({ "partitionId": partition, "path": [element] })
    }

    fn properties(&self, record: &AuditRecord) -> Value {
        let mut properties = Map::new();
        properties.insert("device_target".to_string(), self.string_value("device_target", &record.device_target));
        properties.insert("user_id".to_string(), self.string_value("user_id", &record.user_id));
        properties.insert("title".to_string(), self.string_value("title", &record.title));
        properties.insert("content".to_string(), self.string_value("content", &record.content));
        properties.insert("status".to_string(), self.string_value("status", record.status.as_str()));
        properties.insert("created_at".to_string(), timestamp_value(&record.created_at));
        properties.insert("updated_at".to_string(), timestamp_value(&record.updated_at));
        Value::Object(properties)
    }

    fn string_value(&self, field: &str, value: &str) -> Value {
        if self.unindexed_fields.iter().any(|f| f == field) {
            json!({ "stringValue": value, "excludeFromIndexes": true })
        } else {
            json!({ "stringValue": value })
        }
    }

    async fn call(&self, method: &str, body: &Value) -> Result<Value> {
        let url = format!(
            "{}/v1/projects/{}:{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            method
        );
        let mut request = self.client.post(url).json(body);
        if let Some(token) = self.token.token().await? {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DatastoreError::ResponseError(status.as_u16(), text).into());
        }
        Ok(response.json::<Value>().await?)
    }
}

fn timestamp_value(time: &DateTime<Utc>) -> Value {
    json!({ "timestampValue": time.to_rfc3339_opts(SecondsFormat::Micros, true) })
}
