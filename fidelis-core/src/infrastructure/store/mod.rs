// fidelis-core/src/infrastructure/store/mod.rs

pub mod memory;
pub mod templates;
pub mod yaml;

pub use memory::{InMemoryConfigStore, InMemoryTemplateRepository};
pub use templates::JsonTemplateRepository;
pub use yaml::YamlConfigStore;
