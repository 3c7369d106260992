use crate::catalog::{ProductCatalog, ProductQuery};
use crate::errors::ServiceError;
use crate::models::{Product, ProductCategory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Listing filters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearch {
    /// Category name, case-insensitive. `all` disables the filter.
    pub category: Option<String>,
    /// Substring of name, description or category.
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: usize,
    pub has_more: bool,
}

/// Read-only product endpoints on top of a [`ProductCatalog`].
#[derive(Clone)]
pub struct ProductService {
    catalog: Arc<dyn ProductCatalog>,
}

impl ProductService {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> Arc<dyn ProductCatalog> {
        self.catalog.clone()
    }

    /// Lists products in catalog order. Filters are conjunctive; an unknown
    /// category matches nothing.
    #[instrument(skip(self))]
    pub async fn list_products(&self, search: ProductSearch) -> Result<ProductPage, ServiceError> {
        let limit = search
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let offset = search.offset.unwrap_or(0);

        let query = build_query(&search).offset(offset).limit(limit);
        let page = self.catalog.query(&query).await?;

        Ok(ProductPage {
            has_more: offset.saturating_add(limit) < page.total,
            products: page.items,
            total: page.total,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<Product, ServiceError> {
        self.catalog
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }
}

fn build_query(search: &ProductSearch) -> ProductQuery {
    let mut query = ProductQuery::new();

    if let Some(category) = search
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    {
        query = match ProductCategory::from_str(category) {
            Ok(category) => query.filter(move |p| p.category == category),
            Err(_) => query.filter(|_| false),
        };
    }

    if let Some(term) = search.search.as_deref().filter(|t| !t.is_empty()) {
        let term = term.to_lowercase();
        query = query.filter(move |p| p.matches_search(&term));
    }

    if let Some(min) = search.min_price {
        query = query.filter(move |p| p.price >= min);
    }
    if let Some(max) = search.max_price {
        query = query.filter(move |p| p.price <= max);
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn service() -> ProductService {
        ProductService::new(Arc::new(InMemoryCatalog::with_seed_data().unwrap()))
    }

    #[tokio::test]
    async fn default_listing_returns_first_page() {
        let page = service().list_products(ProductSearch::default()).await.unwrap();
        assert_eq!(page.total, 20);
        assert_eq!(page.products.len(), 20);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn pagination_reports_has_more() {
        let page = service()
            .list_products(ProductSearch {
                limit: Some(5),
                offset: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.products.len(), 5);
        assert_eq!(page.products[0].id, "6");
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn category_filter_is_case_insensitive_and_all_disables_it() {
        let books = service()
            .list_products(ProductSearch {
                category: Some("BOOKS".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(books.products.iter().all(|p| p.category == ProductCategory::Books));
        assert_eq!(books.total, 4);

        let garden = service()
            .list_products(ProductSearch {
                category: Some("home & garden".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(garden.total, 3);

        let all = service()
            .list_products(ProductSearch {
                category: Some("all".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.total, 20);
    }

    #[tokio::test]
    async fn unknown_category_matches_nothing() {
        let page = service()
            .list_products(ProductSearch {
                category: Some("toys".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.products.is_empty());
    }

    #[tokio::test]
    async fn price_bounds_are_inclusive() {
        let page = service()
            .list_products(ProductSearch {
                min_price: Some(dec!(12.99)),
                max_price: Some(dec!(24.99)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.total >= 3);
        assert!(page
            .products
            .iter()
            .all(|p| p.price >= dec!(12.99) && p.price <= dec!(24.99)));
    }

    #[tokio::test]
    async fn search_matches_name_description_and_category() {
        let page = service()
            .list_products(ProductSearch {
                search: Some("LAPTOP".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.total >= 3);
        assert!(page.products.iter().all(|p| p.matches_search("laptop")));
    }

    #[tokio::test]
    async fn limit_is_capped() {
        let page = service()
            .list_products(ProductSearch {
                limit: Some(10_000),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.products.len(), 20);
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        assert_eq!(service().get_product("3").await.unwrap().id, "3");
        assert_matches!(
            service().get_product("999").await,
            Err(ServiceError::NotFound(_))
        );
    }
}
