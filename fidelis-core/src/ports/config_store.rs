// fidelis-core/src/ports/config_store.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::config::ColumnConfig;
use crate::domain::dimension::DimensionKey;
use crate::error::FidelisError;

/// Store key: configuration is scoped to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigKey {
    pub dataset_id: String,
    pub dimension: DimensionKey,
    pub column: String,
}

impl ConfigKey {
    pub fn new(dataset_id: &str, dimension: DimensionKey, column: &str) -> Self {
        Self {
            dataset_id: dataset_id.to_string(),
            dimension,
            column: column.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub config: ColumnConfig,
    /// True only when the configuration validated as complete.
    pub is_configured: bool,
    pub updated_at: DateTime<Utc>,
}

/// Keyed get/put persistence. Implementations serialise writes; last writer wins.
pub trait ConfigurationStore: Send + Sync {
    fn get(&self, key: &ConfigKey) -> Result<Option<StoredConfig>, FidelisError>;

    fn put(&self, key: ConfigKey, stored: StoredConfig) -> Result<(), FidelisError>;

    /// Returns whether an entry was removed.
    fn remove(&self, key: &ConfigKey) -> Result<bool, FidelisError>;

    /// Entries of one dataset, ordered by key.
    fn list(&self, dataset_id: &str) -> Result<Vec<(ConfigKey, StoredConfig)>, FidelisError>;
}
