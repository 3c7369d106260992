//! Rule-based shopping assistant.
//!
//! A turn runs three stages: [`IntentClassifier`] maps the message to an
//! [`IntentTag`], [`RecommendationSelector`] pulls products from the catalog,
//! and [`composer::compose`] pairs them with the fixed reply text.

pub mod composer;
pub mod intent;
pub mod random;
pub mod selector;

pub use composer::{compose, Reply};
pub use intent::{IntentClassifier, IntentRule, IntentTag, INTENT_RULES};
pub use random::{NoShuffle, RandomSource, SeededRandom, ThreadRandom};
pub use selector::{RecommendationSelector, SelectorPolicy};

use crate::catalog::ProductCatalog;
use crate::errors::ServiceError;
use std::sync::Arc;

/// Classifier, selector and composer wired together.
#[derive(Debug, Clone)]
pub struct ShoppingAssistant {
    classifier: IntentClassifier,
    selector: RecommendationSelector,
}

impl ShoppingAssistant {
    pub fn new(classifier: IntentClassifier, selector: RecommendationSelector) -> Self {
        Self {
            classifier,
            selector,
        }
    }

    pub fn with_policy(policy: SelectorPolicy, random: Arc<dyn RandomSource>) -> Self {
        Self::new(
            IntentClassifier::default(),
            RecommendationSelector::new(policy, random),
        )
    }

    pub fn classify(&self, message: &str) -> IntentTag {
        self.classifier.classify(message)
    }

    /// Produces the reply for one user message.
    pub async fn respond(
        &self,
        message: &str,
        catalog: &dyn ProductCatalog,
    ) -> Result<(IntentTag, Reply), ServiceError> {
        let intent = self.classify(message);
        let products = self.selector.select(intent, catalog).await?;
        tracing::debug!(%intent, products = products.len(), "assistant reply composed");
        Ok((intent, compose(intent, products)))
    }
}

impl Default for ShoppingAssistant {
    fn default() -> Self {
        Self::with_policy(SelectorPolicy::default(), Arc::new(ThreadRandom))
    }
}
