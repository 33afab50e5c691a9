// fidelis-core/src/infrastructure/store/memory.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::domain::template::Template;
use crate::error::FidelisError;
use crate::ports::config_store::{ConfigKey, ConfigurationStore, StoredConfig};
use crate::ports::template_repository::TemplateRepository;

#[derive(Default)]
pub struct InMemoryConfigStore {
    entries: RwLock<BTreeMap<ConfigKey, StoredConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigurationStore for InMemoryConfigStore {
    fn get(&self, key: &ConfigKey) -> Result<Option<StoredConfig>, FidelisError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| FidelisError::poisoned("config store"))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: ConfigKey, stored: StoredConfig) -> Result<(), FidelisError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| FidelisError::poisoned("config store"))?;
        entries.insert(key, stored);
        Ok(())
    }

    fn remove(&self, key: &ConfigKey) -> Result<bool, FidelisError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| FidelisError::poisoned("config store"))?;
        Ok(entries.remove(key).is_some())
    }

    fn list(&self, dataset_id: &str) -> Result<Vec<(ConfigKey, StoredConfig)>, FidelisError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| FidelisError::poisoned("config store"))?;
        Ok(entries
            .iter()
            .filter(|(key, _)| key.dataset_id == dataset_id)
            .map(|(key, stored)| (key.clone(), stored.clone()))
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryTemplateRepository {
    templates: RwLock<HashMap<String, Template>>,
}

impl InMemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateRepository for InMemoryTemplateRepository {
    fn save(&self, template: &Template) -> Result<(), FidelisError> {
        let mut templates = self
            .templates
            .write()
            .map_err(|_| FidelisError::poisoned("template repository"))?;
        templates.insert(template.id.clone(), template.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Template>, FidelisError> {
        let templates = self
            .templates
            .read()
            .map_err(|_| FidelisError::poisoned("template repository"))?;
        Ok(templates.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Template>, FidelisError> {
        let templates = self
            .templates
            .read()
            .map_err(|_| FidelisError::poisoned("template repository"))?;
        Ok(templates.values().cloned().collect())
    }
}
