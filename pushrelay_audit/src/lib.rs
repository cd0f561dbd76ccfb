mod config;
mod datastore;
mod memory;
mod record;
mod token;

pub use config::*;
pub use datastore::*;
pub use memory::*;
pub use record::*;
pub use token::*;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct InsertRecordRequest {
    pub record: AuditRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct InsertRecordResponse {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct ExistsRecordRequest {
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct ExistsRecordResponse {
    #[builder(default = false)]
    pub exists: bool,
}

/// Write-only sink for audit records. Implementations must be safe to share
/// between concurrent invocations.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert(&self, request: InsertRecordRequest) -> Result<InsertRecordResponse>;

    async fn exists(&self, request: ExistsRecordRequest) -> Result<ExistsRecordResponse>;
}

#[async_trait]
impl AuditStore for Box<dyn AuditStore> {
    async fn insert(&self, request: InsertRecordRequest) -> Result<InsertRecordResponse> {
        self.as_ref().insert(request).await
    }

    async fn exists(&self, request: ExistsRecordRequest) -> Result<ExistsRecordResponse> {
        self.as_ref().exists(request).await
    }
}

pub fn create_audit_store(config: &AuditStoreConfig) -> Result<Box<dyn AuditStore>> {
    match config.store_type {
        AuditStoreType::Datastore => {
            let store = DatastoreAuditStore::from_config(&config.datastore)?;
            info!("using datastore audit store kind={}", config.datastore.kind);
            Ok(Box::new(store))
        }
        AuditStoreType::Memory => {
            info!("using in-memory audit store");
            Ok(Box::new(MemoryAuditStore::new()))
        }
    }
}

impl From<AuditRecord> for InsertRecordRequest {
    fn from(record: AuditRecord) -> Self {
        Self::builder().record(record).build()
    }
}

impl From<String> for ExistsRecordRequest {
    fn from(key: String) -> Self {
        Self::builder().key(key).build()
    }
}

impl From<&str> for ExistsRecordRequest {
    fn from(key: &str) -> Self {
        Self::builder().key(key).build()
    }
}
