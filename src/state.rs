use std::sync::Arc;

use crate::config::AppConfig;
use crate::service::FileService;
use crate::storage::{self, ObjectStore};

/// Shared per-process state / 全局共享状态
///
/// Holds only the long-lived store handle (through the service); requests
/// carry their own tenant key.
pub struct AppState {
    pub files: FileService,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            files: FileService::new(store),
        }
    }

    /// Build state from configuration / 根据配置创建
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store = storage::create_store(&config.storage)?;
        Ok(Self::new(store))
    }
}
