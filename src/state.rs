use std::sync::Arc;

use crate::{config::AuthConfig, repository::ShopStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ShopStore>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn ShopStore>, auth: AuthConfig) -> Self {
        Self { store, auth }
    }
}
