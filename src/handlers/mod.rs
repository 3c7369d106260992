use std::sync::Arc;

use crate::auth::AuthService;
use crate::services::{ChatService, ProductService};

pub mod auth;
pub mod chat;
pub mod common;
pub mod conversations;
pub mod health;
pub mod products;

/// Services shared by all HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub products: ProductService,
    pub chat: ChatService,
}

impl AppServices {
    pub fn new(auth: Arc<AuthService>, products: ProductService, chat: ChatService) -> Self {
        Self {
            auth,
            products,
            chat,
        }
    }
}
