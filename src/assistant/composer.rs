use super::intent::IntentTag;
use crate::models::Product;

pub const GREETING_REPLY: &str = "Hello! Welcome to our store! I'm here to help you find the perfect products. You can ask me about electronics, books, clothing, home & garden items, or sports equipment. What are you looking for today?";
pub const LAPTOP_REPLY: &str =
    "I found some great laptops for you! Here are our top recommendations:";
pub const PHONE_REPLY: &str = "Here are some excellent smartphones I'd recommend:";
pub const BOOK_REPLY: &str = "Great choice! Here are some popular books:";
pub const CLOTHING_REPLY: &str = "Here are some fashionable clothing items:";
pub const BUDGET_REPLY: &str = "Here are some great budget-friendly options:";
pub const PREMIUM_REPLY: &str = "Here are our premium products:";
pub const HELP_REPLY: &str = "I can help you with:\n\u{2022} Finding products by category (electronics, books, clothing, etc.)\n\u{2022} Searching for specific items\n\u{2022} Getting price comparisons\n\u{2022} Product recommendations\n\u{2022} Answering questions about features\n\nJust tell me what you're looking for!";
pub const FALLBACK_REPLY: &str = "I'd be happy to help you find what you're looking for! Here are some of our most popular products. You can also try asking about specific categories like electronics, books, clothing, or tell me your budget range.";

/// Assistant reply before it is stored as a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub products: Vec<Product>,
}

pub fn template(intent: IntentTag) -> &'static str {
    match intent {
        IntentTag::Greeting => GREETING_REPLY,
        IntentTag::Laptop => LAPTOP_REPLY,
        IntentTag::Phone => PHONE_REPLY,
        IntentTag::Book => BOOK_REPLY,
        IntentTag::Clothing => CLOTHING_REPLY,
        IntentTag::Budget => BUDGET_REPLY,
        IntentTag::Premium => PREMIUM_REPLY,
        IntentTag::Help => HELP_REPLY,
        IntentTag::Fallback => FALLBACK_REPLY,
    }
}

/// Pairs the fixed template for `intent` with the selected products. The
/// text does not depend on how many products were found.
pub fn compose(intent: IntentTag, products: Vec<Product>) -> Reply {
    Reply {
        text: template(intent).to_string(),
        products,
    }
}
