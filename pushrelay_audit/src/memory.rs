use crate::{AuditRecord, AuditStore, ExistsRecordRequest, ExistsRecordResponse, InsertRecordRequest, InsertRecordResponse};
use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    records: Vec<(String, AuditRecord)>,
}

/// Process-local audit store for local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    state: RwLock<MemoryState>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<AuditRecord> {
        self.state
            .read()
            .await
            .records
            .iter()
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<AuditRecord> {
        self.state
            .read()
            .await
            .records
            .iter()
            .find(|(record_id, _)| record_id == id)
            .map(|(_, record)| record.clone())
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn insert(&self, request: InsertRecordRequest) -> Result<InsertRecordResponse> {
        let mut state = self.state.write().await;
        let id = match &request.record.idempotency_key {
            Some(key) => {
                if state.records.iter().any(|(id, _)| id == key) {
                    bail!("record {} already exists", key);
                }
                key.clone()
            }
            None => loop {
                state.next_id += 1;
                let id = state.next_id.to_string();
                if !state.records.iter().any(|(record_id, _)| record_id == &id) {
                    break id;
                }
            },
        };
        state.records.push((id.clone(), request.record));
        Ok(InsertRecordResponse::builder().id(id).build())
    }

    async fn exists(&self, request: ExistsRecordRequest) -> Result<ExistsRecordResponse> {
        let state = self.state.read().await;
        let exists = state.records.iter().any(|(id, _)| id == &request.key);
        Ok(ExistsRecordResponse::builder().exists(exists).build())
    }
}
