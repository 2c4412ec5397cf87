//! Application state shared across handlers and resolvers

use std::sync::Arc;

use crate::db::Store;
use crate::integrations::IntegrationRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    integrations: IntegrationRegistry,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, integrations: IntegrationRegistry) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                integrations,
            }),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    pub fn integrations(&self) -> &IntegrationRegistry {
        &self.inner.integrations
    }
}
