//! Remote collection access, one repository per entity kind.

use std::{marker::PhantomData, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::ListEnvelope,
};
use tracing::debug;
use url::Url;

use crate::{error::RepositoryError, kind::EntityKind};

#[async_trait]
pub trait Repository<K: EntityKind>: Send + Sync {
    async fn list(&self) -> Result<Vec<K::Entity>, RepositoryError>;
    /// `Ok(None)` when the service has no such record.
    async fn get_by_id(&self, id: K::Id) -> Result<Option<K::Entity>, RepositoryError>;
    async fn create(&self, draft: &K::Draft) -> Result<K::Entity, RepositoryError>;
    async fn update_by_id(&self, id: K::Id, patch: &K::Patch)
        -> Result<K::Entity, RepositoryError>;
    async fn delete_by_id(&self, id: K::Id) -> Result<(), RepositoryError>;
}

pub fn build_http_client(timeout: Option<Duration>) -> Result<Client, RepositoryError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

pub struct HttpRepository<K> {
    http: Client,
    collection_url: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> HttpRepository<K> {
    pub fn new(http: Client, collection_url: &str) -> Result<Self, RepositoryError> {
        let parsed = Url::parse(collection_url).map_err(|e| RepositoryError::InvalidUrl {
            url: collection_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RepositoryError::InvalidUrl {
                url: collection_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            http,
            collection_url: collection_url.trim_end_matches('/').to_string(),
            _kind: PhantomData,
        })
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn record_url(&self, id: K::Id) -> String {
        format!("{}/{id}", self.collection_url)
    }
}

#[async_trait]
impl<K: EntityKind> Repository<K> for HttpRepository<K> {
    async fn list(&self) -> Result<Vec<K::Entity>, RepositoryError> {
        debug!(kind = K::NAME, url = %self.collection_url, "GET collection");
        let response = self.http.get(&self.collection_url).send().await?;
        let envelope: ListEnvelope<K::Entity> = decode(ensure_success(response).await?).await?;
        Ok(envelope.into_inner())
    }

    async fn get_by_id(&self, id: K::Id) -> Result<Option<K::Entity>, RepositoryError> {
        let url = self.record_url(id);
        debug!(kind = K::NAME, %url, "GET record");
        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = ensure_success(response).await?.bytes().await?;
        let trimmed = body.trim_ascii();
        if trimmed.is_empty() || trimmed == b"null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(trimmed)?))
    }

    async fn create(&self, draft: &K::Draft) -> Result<K::Entity, RepositoryError> {
        debug!(kind = K::NAME, url = %self.collection_url, "POST record");
        let response = self
            .http
            .post(&self.collection_url)
            .json(draft)
            .send()
            .await?;
        decode(ensure_success(response).await?).await
    }

    async fn update_by_id(
        &self,
        id: K::Id,
        patch: &K::Patch,
    ) -> Result<K::Entity, RepositoryError> {
        let url = self.record_url(id);
        debug!(kind = K::NAME, %url, "PATCH record");
        let response = self.http.patch(&url).json(patch).send().await?;
        decode(ensure_success(response).await?).await
    }

    async fn delete_by_id(&self, id: K::Id) -> Result<(), RepositoryError> {
        let url = self.record_url(id);
        debug!(kind = K::NAME, %url, "DELETE record");
        let response = self.http.delete(&url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, RepositoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .ok()
        .and_then(|api_error| api_error.summary())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "request failed".to_string());

    Err(RepositoryError::Status {
        status: status.as_u16(),
        code: ErrorCode::from_status(status.as_u16()),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RepositoryError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
#[path = "tests/repository_tests.rs"]
mod tests;
