// fidelis-core/src/infrastructure/store/yaml.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::domain::config::ColumnConfig;
use crate::domain::dimension::DimensionKey;
use crate::error::FidelisError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::config_store::{ConfigKey, ConfigurationStore, StoredConfig};

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    dataset_id: String,
    dimension: DimensionKey,
    column: String,
    is_configured: bool,
    updated_at: DateTime<Utc>,
    config: ColumnConfig,
}

impl Entry {
    fn key(&self) -> ConfigKey {
        ConfigKey::new(&self.dataset_id, self.dimension.clone(), &self.column)
    }

    fn stored(&self) -> StoredConfig {
        StoredConfig {
            config: self.config.clone(),
            is_configured: self.is_configured,
            updated_at: self.updated_at,
        }
    }

    fn is(&self, key: &ConfigKey) -> bool {
        self.dataset_id == key.dataset_id && self.dimension == key.dimension && self.column == key.column
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    configurations: Vec<Entry>,
}

/// Column configurations persisted in a single YAML file.
///
/// Every call re-reads the file so that separate processes observe each
/// other's writes. Mutations hold the store lock for the whole
/// read-modify-write cycle.
pub struct YamlConfigStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl YamlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<ConfigFile, InfrastructureError> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn write(&self, file: &ConfigFile) -> Result<(), InfrastructureError> {
        let content = serde_yaml::to_string(file)?;
        atomic_write(&self.path, content)?;
        debug!(path = ?self.path, entries = file.configurations.len(), "Configuration store written");
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut ConfigFile) -> T) -> Result<T, FidelisError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| FidelisError::poisoned("config store"))?;
        let mut file = self.read()?;
        let out = f(&mut file);
        self.write(&file)?;
        Ok(out)
    }
}

impl ConfigurationStore for YamlConfigStore {
    fn get(&self, key: &ConfigKey) -> Result<Option<StoredConfig>, FidelisError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| FidelisError::poisoned("config store"))?;
        let file = self.read()?;
        Ok(file
            .configurations
            .iter()
            .find(|e| e.is(key))
            .map(Entry::stored))
    }

    fn put(&self, key: ConfigKey, stored: StoredConfig) -> Result<(), FidelisError> {
        self.modify(|file| {
            let entry = Entry {
                dataset_id: key.dataset_id.clone(),
                dimension: key.dimension.clone(),
                column: key.column.clone(),
                is_configured: stored.is_configured,
                updated_at: stored.updated_at,
                config: stored.config,
            };
            match file.configurations.iter_mut().find(|e| e.is(&key)) {
                Some(existing) => *existing = entry,
                None => file.configurations.push(entry),
            }
        })
    }

    fn remove(&self, key: &ConfigKey) -> Result<bool, FidelisError> {
        self.modify(|file| {
            let before = file.configurations.len();
            file.configurations.retain(|e| !e.is(key));
            file.configurations.len() != before
        })
    }

    fn list(&self, dataset_id: &str) -> Result<Vec<(ConfigKey, StoredConfig)>, FidelisError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| FidelisError::poisoned("config store"))?;
        let file = self.read()?;
        let mut entries: Vec<_> = file
            .configurations
            .iter()
            .filter(|e| e.dataset_id == dataset_id)
            .map(|e| (e.key(), e.stored()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
