//! Scripted repository for exercising the CLI paths without a service.

use async_trait::async_trait;
use client_core::{EntityKind, Repository, RepositoryError};
use shared::error::ErrorCode;
use tokio::sync::Mutex;

pub struct StubRepository<K: EntityKind> {
    records: Mutex<Vec<K::Entity>>,
    next_created: Mutex<Option<K::Entity>>,
    list_fails: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl<K: EntityKind> StubRepository<K> {
    pub fn with_records(records: Vec<K::Entity>) -> Self {
        Self {
            records: Mutex::new(records),
            next_created: Mutex::new(None),
            list_fails: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable_list() -> Self {
        Self {
            list_fails: true,
            ..Self::with_records(Vec::new())
        }
    }

    pub async fn will_create(&self, entity: K::Entity) {
        *self.next_created.lock().await = Some(entity);
    }

    pub async fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: &'static str) {
        self.calls.lock().await.push(call);
    }
}

fn failure(status: u16, message: &str) -> RepositoryError {
    RepositoryError::Status {
        status,
        code: ErrorCode::from_status(status),
        message: message.into(),
    }
}

#[async_trait]
impl<K: EntityKind> Repository<K> for StubRepository<K> {
    async fn list(&self) -> Result<Vec<K::Entity>, RepositoryError> {
        self.record("list").await;
        if self.list_fails {
            return Err(failure(503, "service unavailable"));
        }
        Ok(self.records.lock().await.clone())
    }

    async fn get_by_id(&self, id: K::Id) -> Result<Option<K::Entity>, RepositoryError> {
        self.record("get_by_id").await;
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| K::id(record) == Some(id))
            .cloned())
    }

    async fn create(&self, _draft: &K::Draft) -> Result<K::Entity, RepositoryError> {
        self.record("create").await;
        let created = self
            .next_created
            .lock()
            .await
            .take()
            .ok_or_else(|| failure(500, "nothing scripted"))?;
        self.records.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update_by_id(
        &self,
        _id: K::Id,
        _patch: &K::Patch,
    ) -> Result<K::Entity, RepositoryError> {
        self.record("update_by_id").await;
        Err(failure(500, "not scripted"))
    }

    async fn delete_by_id(&self, id: K::Id) -> Result<(), RepositoryError> {
        self.record("delete_by_id").await;
        self.records
            .lock()
            .await
            .retain(|record| K::id(record) != Some(id));
        Ok(())
    }
}
