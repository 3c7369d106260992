//! Per-user conversation persistence.

mod store;

pub use store::{ConversationStore, InMemoryConversationStore};
