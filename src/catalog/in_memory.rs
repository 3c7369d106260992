use super::{seed, ProductCatalog, ProductQuery, QueryPage};
use crate::errors::ServiceError;
use crate::models::Product;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

/// Process-local catalog backed by an ordered vector. Products are fixed at
/// construction.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<Vec<Product>>,
}

impl InMemoryCatalog {
    /// Builds a catalog, rejecting products that violate the price or rating bounds.
    pub fn new(products: Vec<Product>) -> Result<Self, ServiceError> {
        for product in &products {
            product.validate().map_err(|e| {
                ServiceError::ValidationError(format!("Invalid product {}: {}", product.id, e))
            })?;
        }

        Ok(Self {
            products: Arc::new(products),
        })
    }

    /// Catalog pre-populated with the demo storefront inventory.
    pub fn with_seed_data() -> Result<Self, ServiceError> {
        let catalog = Self::new(seed::demo_products())?;
        info!("Seeded demo catalog");
        Ok(catalog)
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn find(&self, id: &str) -> Result<Option<Product>, ServiceError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn query(&self, query: &ProductQuery) -> Result<QueryPage, ServiceError> {
        let page = query.apply(self.products.iter());
        debug!(?query, matched = page.total, returned = page.items.len(), "catalog query");
        Ok(page)
    }
}
