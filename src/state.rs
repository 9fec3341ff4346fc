//! Shared application state for all backend routes.

use crate::store::BookmarkStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookmarkStore>,
}

impl AppState {
    pub fn new(store: impl BookmarkStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
