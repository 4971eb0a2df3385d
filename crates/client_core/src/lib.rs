use std::{sync::Arc, time::Duration};

use reqwest::Client;
use tracing::info;

pub mod controller;
pub mod error;
pub mod kind;
pub mod repository;

#[cfg(test)]
mod test_support;

pub use controller::{CommandStatus, ControllerSnapshot, FormState, ListController};
pub use error::{Command, CommandError, ErrorCategory, RepositoryError};
pub use kind::{BrandKind, EntityKind, ModelKind, ProductKind};
pub use repository::{build_http_client, HttpRepository, Repository};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

pub type BrandController = ListController<BrandKind>;
pub type ModelController = ListController<ModelKind>;
pub type ProductController = ListController<ProductKind>;

/// Collection URLs for the three kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    pub brands: String,
    pub models: String,
    pub products: String,
}

impl CatalogEndpoints {
    pub fn from_base(api_base_url: &str) -> Self {
        let base = api_base_url.trim_end_matches('/');
        Self {
            brands: format!("{base}/{}", BrandKind::COLLECTION),
            models: format!("{base}/{}", ModelKind::COLLECTION),
            products: format!("{base}/{}", ProductKind::COLLECTION),
        }
    }
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self::from_base(DEFAULT_API_BASE_URL)
    }
}

/// One controller per entity kind.
pub struct Catalog {
    pub brands: BrandController,
    pub models: ModelController,
    pub products: ProductController,
}

impl Catalog {
    pub fn connect(
        endpoints: &CatalogEndpoints,
        timeout: Option<Duration>,
    ) -> Result<Self, RepositoryError> {
        let http = build_http_client(timeout)?;
        Self::with_client(http, endpoints)
    }

    pub fn with_client(http: Client, endpoints: &CatalogEndpoints) -> Result<Self, RepositoryError> {
        let brands = HttpRepository::<BrandKind>::new(http.clone(), &endpoints.brands)?;
        let models = HttpRepository::<ModelKind>::new(http.clone(), &endpoints.models)?;
        let products = HttpRepository::<ProductKind>::new(http, &endpoints.products)?;
        info!(
            brands = brands.collection_url(),
            models = models.collection_url(),
            products = products.collection_url(),
            "catalog endpoints configured"
        );
        Ok(Self::from_repositories(
            Arc::new(brands),
            Arc::new(models),
            Arc::new(products),
        ))
    }

    pub fn from_repositories(
        brands: Arc<dyn Repository<BrandKind>>,
        models: Arc<dyn Repository<ModelKind>>,
        products: Arc<dyn Repository<ProductKind>>,
    ) -> Self {
        Self {
            brands: ListController::new(brands),
            models: ListController::new(models),
            products: ListController::new(products),
        }
    }

    /// Initial load: refreshes all three lists concurrently.
    pub async fn load_all(&self) -> [CommandStatus; 3] {
        let (products, models, brands) = futures::join!(
            self.products.refresh(),
            self.models.refresh(),
            self.brands.refresh()
        );
        [products, models, brands]
    }

    /// Dismisses the pending error on every list.
    pub async fn clear_errors(&self) {
        futures::join!(
            self.products.clear_error(),
            self.models.clear_error(),
            self.brands.clear_error()
        );
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
