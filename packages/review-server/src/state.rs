use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::services::SessionRegistry;
use crate::store::{MemoryProgressStore, ProgressStore};

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ProgressStore>,
    sessions: Arc<SessionRegistry>,
    config: Arc<Config>,
    started_at: Instant,
    started_at_system: SystemTime,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ProgressStore>) -> Self {
        Self {
            store,
            sessions: Arc::new(SessionRegistry::with_retention(config.session_retention)),
            config: Arc::new(config),
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
        }
    }

    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Arc::new(MemoryProgressStore::new()))
    }

    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        self.sessions.as_ref()
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }
}
