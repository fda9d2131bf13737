use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::countdown::{Clock, SystemClock};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Store, config: AppConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Store, config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            config: Arc::new(config),
            clock,
        }
    }
}
