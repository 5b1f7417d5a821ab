use std::sync::Arc;

use shared_config::AppConfig;
use shared_utils::clock::SharedClock;

use crate::services::CatalogService;
use crate::store::CatalogStore;

#[derive(Clone)]
pub struct CatalogState {
    pub config: Arc<AppConfig>,
    pub catalog: CatalogService,
}

impl CatalogState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn CatalogStore>, clock: SharedClock) -> Self {
        Self {
            config,
            catalog: CatalogService::new(store, clock),
        }
    }
}
