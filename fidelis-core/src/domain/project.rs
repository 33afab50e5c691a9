// fidelis-core/src/domain/project.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::domain::dimension::{DimensionDefinition, DimensionRegistry};

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
#[validate(schema(function = "validate_unique_dataset_names", skip_on_field_errors = false))]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    /// DuckDB database file, or `:memory:`.
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(rename = "config-store", default = "default_config_store")]
    pub config_store: String,

    #[serde(rename = "template-dir", default = "default_template_dir")]
    pub template_dir: String,

    /// Working state (assignments + configs) used by `run`.
    #[serde(rename = "checks-path", default = "default_checks_path")]
    pub checks_path: String,

    #[serde(rename = "config-paths", default)]
    pub config_paths: Vec<String>,

    #[validate(nested)]
    #[serde(default)]
    pub datasets: Vec<DatasetSource>,

    #[validate(nested)]
    #[serde(default)]
    pub reference: ReferenceSettings,

    #[validate(custom(function = "validate_dimension_weights"))]
    #[serde(default)]
    pub dimensions: Vec<DimensionDefinition>,
}

/// CSV file exposed to the engine under `name`.
#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct DatasetSource {
    #[validate(length(min = 1, message = "Dataset name cannot be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Dataset path cannot be empty"))]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct ReferenceSettings {
    #[validate(range(min = 1, message = "Reference row limit must be positive"))]
    #[serde(rename = "row-limit", default = "default_row_limit")]
    pub row_limit: usize,

    #[validate(range(min = 1, message = "Reference timeout must be at least one second"))]
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            row_limit: default_row_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ReferenceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ProjectConfig {
    /// Built-in registry extended (or overridden) by the project's dimensions.
    pub fn registry(&self) -> DimensionRegistry {
        let mut registry = DimensionRegistry::builtin();
        for definition in &self.dimensions {
            registry.register(definition.clone());
        }
        registry
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetSource> {
        self.datasets.iter().find(|d| d.name == name)
    }
}

fn validate_unique_dataset_names(config: &ProjectConfig) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for dataset in &config.datasets {
        if !seen.insert(dataset.name.as_str()) {
            let mut err = ValidationError::new("duplicate_dataset");
            err.message = Some(format!("Dataset '{}' is declared twice", dataset.name).into());
            return Err(err);
        }
    }
    Ok(())
}

fn validate_dimension_weights(dimensions: &[DimensionDefinition]) -> Result<(), ValidationError> {
    match dimensions
        .iter()
        .find(|d| !d.weight.is_finite() || d.weight < 0.0)
    {
        Some(d) => {
            let mut err = ValidationError::new("dimension_weight");
            err.message = Some(format!("Dimension '{}' has an invalid weight", d.key).into());
            Err(err)
        }
        None => Ok(()),
    }
}

fn default_version() -> String {
    "1.0".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}
fn default_database() -> String {
    ":memory:".to_string()
}
fn default_config_store() -> String {
    ".fidelis/configurations.yaml".to_string()
}
fn default_template_dir() -> String {
    ".fidelis/templates".to_string()
}
fn default_checks_path() -> String {
    "checks.yaml".to_string()
}
fn default_row_limit() -> usize {
    100_000
}
fn default_timeout_secs() -> u64 {
    30
}
