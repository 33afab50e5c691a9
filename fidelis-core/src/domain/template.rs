// fidelis-core/src/domain/template.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::config::WorkingState;
use crate::domain::error::DomainError;

/// Named snapshot of assignments and column configurations.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    state: WorkingState,
}

impl Template {
    /// Captures `state`. Only configured assignments are worth reusing, so a
    /// state without any is rejected.
    pub fn snapshot(
        name: &str,
        description: Option<String>,
        dataset_id: Option<String>,
        state: WorkingState,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidTemplate(
                "template name must not be blank".to_string(),
            ));
        }
        if !state.has_configured_columns() {
            return Err(DomainError::EmptyTemplate(name.to_string()));
        }
        state.validate()?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            dataset_id,
            created_at: Utc::now(),
            state,
        })
    }

    pub fn state(&self) -> &WorkingState {
        &self.state
    }

    /// A fresh copy of the captured state, meant to replace the caller's.
    pub fn working_state(&self) -> WorkingState {
        self.state.clone()
    }

    pub fn column_count(&self) -> usize {
        self.state.assignments().len()
    }

    /// Templates without a dataset apply to any dataset.
    pub fn applies_to(&self, dataset_id: &str) -> bool {
        self.dataset_id.as_deref().is_none_or(|d| d == dataset_id)
    }
}
