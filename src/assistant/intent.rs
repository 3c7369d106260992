use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// What the shopper appears to be asking for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntentTag {
    Greeting,
    Laptop,
    Phone,
    Book,
    Clothing,
    Budget,
    Premium,
    Help,
    Fallback,
}

/// A keyword set mapped to an intent. A rule fires when any keyword is a
/// substring of the lower-cased message.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub tag: IntentTag,
    pub keywords: &'static [&'static str],
}

impl IntentRule {
    pub const fn new(tag: IntentTag, keywords: &'static [&'static str]) -> Self {
        Self { tag, keywords }
    }

    /// `lowered` must already be lower-cased.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

/// Rules in priority order. The first match wins, so an earlier rule shadows
/// any later rule that also matches.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule::new(IntentTag::Greeting, &["hello", "hi", "hey"]),
    IntentRule::new(IntentTag::Laptop, &["laptop", "computer"]),
    IntentRule::new(IntentTag::Phone, &["phone", "smartphone"]),
    IntentRule::new(IntentTag::Book, &["book"]),
    IntentRule::new(IntentTag::Clothing, &["clothing", "shirt", "jeans"]),
    IntentRule::new(IntentTag::Budget, &["cheap", "affordable", "budget"]),
    IntentRule::new(IntentTag::Premium, &["expensive", "premium", "luxury"]),
    IntentRule::new(IntentTag::Help, &["help", "what can you do"]),
];

/// First-match-wins keyword classifier.
#[derive(Debug, Clone, Copy)]
pub struct IntentClassifier {
    rules: &'static [IntentRule],
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self {
            rules: INTENT_RULES,
        }
    }
}

impl IntentClassifier {
    pub fn with_rules(rules: &'static [IntentRule]) -> Self {
        Self { rules }
    }

    pub fn classify(&self, message: &str) -> IntentTag {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.tag)
            .unwrap_or(IntentTag::Fallback)
    }
}
