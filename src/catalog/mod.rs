//! Read-only product catalog.
//!
//! The catalog is consumed through [`ProductCatalog`], a small query surface
//! (find by id, filter/sort/slice via [`ProductQuery`]). The assistant and the
//! listing endpoints only ever read from it.

mod in_memory;
pub mod seed;

pub use in_memory::InMemoryCatalog;

use crate::errors::ServiceError;
use crate::models::Product;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::fmt;

pub type ProductPredicate = Box<dyn Fn(&Product) -> bool + Send + Sync>;
pub type ProductComparator = Box<dyn Fn(&Product, &Product) -> Ordering + Send + Sync>;

/// Filter, ordering and window applied to the catalog.
///
/// Without a comparator the catalog order is preserved. Sorting is stable, so
/// products that compare equal also keep catalog order.
#[derive(Default)]
pub struct ProductQuery {
    predicates: Vec<ProductPredicate>,
    comparator: Option<ProductComparator>,
    offset: usize,
    limit: Option<usize>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate; all predicates must hold.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Product) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn sort_by<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&Product, &Product) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Box::new(comparator));
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.predicates.iter().all(|predicate| predicate(product))
    }

    /// Evaluates the query over `products`, which must be in catalog order.
    pub fn apply<'a, I>(&self, products: I) -> QueryPage
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut matched: Vec<Product> = products
            .into_iter()
            .filter(|product| self.matches(product))
            .cloned()
            .collect();
        let total = matched.len();

        if let Some(comparator) = &self.comparator {
            matched.sort_by(|a, b| comparator(a, b));
        }

        let items = matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        QueryPage { items, total }
    }
}

impl fmt::Debug for ProductQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductQuery")
            .field("predicates", &self.predicates.len())
            .field("sorted", &self.comparator.is_some())
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish()
    }
}

/// One window of query results plus the number of products that matched.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub items: Vec<Product>,
    pub total: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find(&self, id: &str) -> Result<Option<Product>, ServiceError>;

    async fn query(&self, query: &ProductQuery) -> Result<QueryPage, ServiceError>;
}
