//! Application services sitting between the HTTP handlers and the stores.

pub mod catalog;
pub mod chat;

pub use catalog::{ProductPage, ProductSearch, ProductService};
pub use chat::{ChatService, ChatSettings, ChatTurn};
