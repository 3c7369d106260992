pub mod conversation;
pub mod product;
pub mod user;

pub use conversation::{Conversation, Message, MessageRole};
pub use product::{Product, ProductCategory};
pub use user::{User, UserProfile};
