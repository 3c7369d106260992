use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use validator::{Validate, ValidationError};

/// Department a product is listed under
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ProductCategory {
    Electronics,
    Books,
    Clothing,
    #[serde(rename = "Home & Garden")]
    #[strum(serialize = "Home & Garden")]
    HomeAndGarden,
    Sports,
}

fn validate_decimal_min_zero(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("decimal_min_zero"));
    }
    Ok(())
}

/// A catalog entry. Prices are decimals but travel as JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom = "validate_decimal_min_zero")]
    pub price: Decimal,
    pub category: ProductCategory,
    pub image: String,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    pub reviews: u32,
    pub in_stock: bool,
    pub features: Vec<String>,
}

impl Product {
    /// Case-insensitive check against the product name.
    pub fn name_contains_any(&self, needles: &[&str]) -> bool {
        let name = self.name.to_lowercase();
        needles.iter().any(|needle| name.contains(needle))
    }

    /// Case-insensitive match against name, description or category.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self.category.as_ref().to_lowercase().contains(&term)
    }
}
