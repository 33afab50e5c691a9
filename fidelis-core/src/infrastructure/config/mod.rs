// fidelis-core/src/infrastructure/config/mod.rs

pub mod checks;
pub mod project;

pub use crate::domain::project::ProjectConfig;
pub use checks::{load_working_state, save_working_state};
pub use project::{load_project_config, load_project_config_with};
