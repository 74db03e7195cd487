use std::sync::Arc;

use super::{config::Config, registry::TableRegistry, store::DataStore};

/// Shared, read-only application state. Tables themselves are rebuilt per
/// request; only the record store and the registry live here.
pub struct State {
    pub config: Config,
    pub store: DataStore,
    pub registry: TableRegistry,
}

impl State {
    pub fn new() -> Arc<Self> {
        Self::with_store(DataStore::seed())
    }

    pub fn with_store(store: DataStore) -> Arc<Self> {
        Arc::new(Self {
            config: Config::load(),
            store,
            registry: TableRegistry::new(),
        })
    }
}
