// fidelis-core/src/ports/mod.rs

pub mod config_store;
pub mod dataset;
pub mod template_repository;

pub use config_store::{ConfigKey, ConfigurationStore, StoredConfig};
pub use dataset::{ColumnSchema, DatasetAccessor};
pub use template_repository::TemplateRepository;
