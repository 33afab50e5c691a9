// fidelis-core/src/application/templates.rs

use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::DomainError;
use crate::domain::config::WorkingState;
use crate::domain::template::Template;
use crate::error::FidelisError;
use crate::ports::config_store::ConfigurationStore;
use crate::ports::template_repository::TemplateRepository;

pub struct TemplateManager {
    repository: Arc<dyn TemplateRepository>,
    store: Arc<dyn ConfigurationStore>,
}

impl TemplateManager {
    pub fn new(repository: Arc<dyn TemplateRepository>, store: Arc<dyn ConfigurationStore>) -> Self {
        Self { repository, store }
    }

    /// Snapshots `state` under `name`. When `dataset_id` is given, the
    /// configurations stored for that dataset are embedded so the template
    /// stays usable on other datasets.
    #[instrument(skip(self, state, description))]
    pub fn save(
        &self,
        name: &str,
        description: Option<String>,
        dataset_id: Option<&str>,
        state: &WorkingState,
    ) -> Result<Template, FidelisError> {
        let mut snapshot = state.clone();
        if let Some(dataset_id) = dataset_id {
            for (key, stored) in self.store.list(dataset_id)? {
                if snapshot.dimension_of(&key.column) != Some(&key.dimension) {
                    continue;
                }
                snapshot
                    .column_configs
                    .insert(key.column.clone(), stored.config);
                if stored.is_configured {
                    snapshot.mark_configured(key.dimension, &key.column);
                } else {
                    snapshot.unmark_configured(&key.dimension, &key.column);
                }
            }
        }

        let template = Template::snapshot(
            name,
            description,
            dataset_id.map(str::to_string),
            snapshot,
        )?;
        self.repository.save(&template)?;
        info!(id = %template.id, columns = template.column_count(), "Template saved");
        Ok(template)
    }

    /// Working state captured by template `id`, replacing the caller's.
    pub fn load(&self, id: &str) -> Result<WorkingState, FidelisError> {
        let template = self
            .repository
            .get(id)?
            .ok_or_else(|| DomainError::TemplateNotFound(id.to_string()))?;
        Ok(template.working_state())
    }

    /// Templates bound to `dataset_id` plus dataset-agnostic ones, newest first.
    pub fn list(&self, dataset_id: Option<&str>) -> Result<Vec<Template>, FidelisError> {
        let mut templates: Vec<Template> = self
            .repository
            .list()?
            .into_iter()
            .filter(|t| dataset_id.is_none_or(|d| t.applies_to(d)))
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }
}
