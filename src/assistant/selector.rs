use super::intent::IntentTag;
use super::random::RandomSource;
use crate::catalog::{ProductCatalog, ProductQuery};
use crate::errors::ServiceError;
use crate::models::Product;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

const LAPTOP_TERMS: &[&str] = &["laptop", "computer"];
const PHONE_TERMS: &[&str] = &["phone"];

/// Thresholds and sizes used when choosing recommendations.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorPolicy {
    pub limit: usize,
    /// Budget picks are strictly cheaper than this.
    pub budget_threshold: Decimal,
    /// Premium picks are strictly dearer than this.
    pub premium_threshold: Decimal,
    /// Minimum rating for the popular-products fallback.
    pub popular_rating_threshold: f64,
}

impl Default for SelectorPolicy {
    fn default() -> Self {
        Self {
            limit: 3,
            budget_threshold: Decimal::from(100),
            premium_threshold: Decimal::from(500),
            popular_rating_threshold: 4.5,
        }
    }
}

/// Picks the products to show alongside a reply.
#[derive(Clone)]
pub struct RecommendationSelector {
    policy: SelectorPolicy,
    random: Arc<dyn RandomSource>,
}

impl std::fmt::Debug for RecommendationSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationSelector")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RecommendationSelector {
    pub fn new(policy: SelectorPolicy, random: Arc<dyn RandomSource>) -> Self {
        Self { policy, random }
    }

    /// Builds the catalog query for `intent`, or `None` when the intent
    /// carries no products.
    ///
    /// The fallback query is unlimited; truncation happens after shuffling.
    pub fn query_for(&self, intent: IntentTag) -> Option<ProductQuery> {
        let limit = self.policy.limit;
        let query = match intent {
            IntentTag::Greeting | IntentTag::Help => return None,
            IntentTag::Laptop => ProductQuery::new()
                .filter(|p| p.name_contains_any(LAPTOP_TERMS))
                .limit(limit),
            IntentTag::Phone => ProductQuery::new()
                .filter(|p| p.name_contains_any(PHONE_TERMS))
                .limit(limit),
            IntentTag::Book => category_query(crate::models::ProductCategory::Books).limit(limit),
            IntentTag::Clothing => {
                category_query(crate::models::ProductCategory::Clothing).limit(limit)
            }
            IntentTag::Budget => {
                let threshold = self.policy.budget_threshold;
                ProductQuery::new()
                    .filter(move |p| p.price < threshold)
                    .sort_by(|a, b| a.price.cmp(&b.price))
                    .limit(limit)
            }
            IntentTag::Premium => {
                let threshold = self.policy.premium_threshold;
                ProductQuery::new()
                    .filter(move |p| p.price > threshold)
                    .sort_by(|a, b| b.price.cmp(&a.price))
                    .limit(limit)
            }
            IntentTag::Fallback => {
                let threshold = self.policy.popular_rating_threshold;
                ProductQuery::new().filter(move |p| p.rating >= threshold)
            }
        };
        Some(query)
    }

    #[instrument(skip(self, catalog), fields(limit = self.policy.limit))]
    pub async fn select(
        &self,
        intent: IntentTag,
        catalog: &dyn ProductCatalog,
    ) -> Result<Vec<Product>, ServiceError> {
        let Some(query) = self.query_for(intent) else {
            return Ok(Vec::new());
        };

        let page = catalog.query(&query).await.map_err(|err| {
            tracing::error!(error = %err, %intent, "catalog query failed");
            match err {
                ServiceError::InternalError(_) => err,
                other => ServiceError::InternalError(format!("catalog query failed: {other}")),
            }
        })?;

        let mut products = page.items;
        if intent == IntentTag::Fallback {
            self.random.shuffle(&mut products);
            products.truncate(self.policy.limit);
        }
        Ok(products)
    }
}

fn category_query(category: crate::models::ProductCategory) -> ProductQuery {
    ProductQuery::new().filter(move |p| p.category == category)
}
