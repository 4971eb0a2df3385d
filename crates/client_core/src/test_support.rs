//! In-memory repository with a call log, shared by the unit tests.

use async_trait::async_trait;
use shared::{
    domain::{Brand, BrandId, Model, ModelId, Product, ProductId},
    error::ErrorCode,
};
use tokio::sync::Mutex;

use crate::{error::RepositoryError, kind::EntityKind, repository::Repository};

pub struct FakeRepository<K: EntityKind> {
    records: Mutex<Vec<K::Entity>>,
    next_created: Mutex<Option<K::Entity>>,
    failing: Mutex<Vec<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
}

impl<K: EntityKind> FakeRepository<K> {
    pub fn with_records(records: Vec<K::Entity>) -> Self {
        Self {
            records: Mutex::new(records),
            next_created: Mutex::new(None),
            failing: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The record `create` hands back and appends to the collection.
    pub async fn will_create(&self, entity: K::Entity) {
        *self.next_created.lock().await = Some(entity);
    }

    pub async fn fail(&self, operation: &'static str) {
        self.failing.lock().await.push(operation);
    }

    pub async fn recover(&self) {
        self.failing.lock().await.clear();
    }

    pub async fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    async fn enter(&self, operation: &'static str) -> Result<(), RepositoryError> {
        self.calls.lock().await.push(operation);
        if self.failing.lock().await.contains(&operation) {
            return Err(RepositoryError::Status {
                status: 500,
                code: ErrorCode::Internal,
                message: format!("{operation} exploded"),
            });
        }
        Ok(())
    }
}

fn not_found() -> RepositoryError {
    RepositoryError::Status {
        status: 404,
        code: ErrorCode::NotFound,
        message: "Not Found".into(),
    }
}

#[async_trait]
impl<K: EntityKind> Repository<K> for FakeRepository<K> {
    async fn list(&self) -> Result<Vec<K::Entity>, RepositoryError> {
        self.enter("list").await?;
        Ok(self.records.lock().await.clone())
    }

    async fn get_by_id(&self, id: K::Id) -> Result<Option<K::Entity>, RepositoryError> {
        self.enter("get_by_id").await?;
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| K::id(record) == Some(id))
            .cloned())
    }

    async fn create(&self, _draft: &K::Draft) -> Result<K::Entity, RepositoryError> {
        self.enter("create").await?;
        let created = self
            .next_created
            .lock()
            .await
            .take()
            .expect("test did not script a created record");
        self.records.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update_by_id(
        &self,
        id: K::Id,
        _patch: &K::Patch,
    ) -> Result<K::Entity, RepositoryError> {
        self.enter("update_by_id").await?;
        self.records
            .lock()
            .await
            .iter()
            .find(|record| K::id(record) == Some(id))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn delete_by_id(&self, id: K::Id) -> Result<(), RepositoryError> {
        self.enter("delete_by_id").await?;
        self.records
            .lock()
            .await
            .retain(|record| K::id(record) != Some(id));
        Ok(())
    }
}

pub fn brand(id: i64, name: &str) -> Brand {
    Brand {
        brand_id: Some(BrandId(id)),
        brand_name: name.into(),
    }
}

pub fn model(id: i64, name: &str) -> Model {
    Model {
        model_id: Some(ModelId(id)),
        model_name: name.into(),
    }
}

pub fn product(id: i64, name: &str, brand_id: i64, model_id: i64) -> Product {
    Product {
        product_id: ProductId(id),
        name: name.into(),
        current_price: 499.0,
        stock_quantity: 2,
        brand: brand(brand_id, "Ashley"),
        model: model(model_id, "Corner"),
    }
}
