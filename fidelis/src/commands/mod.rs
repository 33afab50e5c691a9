// fidelis/src/commands/mod.rs

pub mod assign;
pub mod config;
pub mod dimensions;
pub mod inspect;
pub mod run;
pub mod template;

use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use fidelis_core::application::{ConfigurationService, ReferenceResolver, TemplateManager};
use fidelis_core::infrastructure::adapters::DuckDBAccessor;
use fidelis_core::infrastructure::config::{ProjectConfig, load_project_config};
use fidelis_core::infrastructure::store::{JsonTemplateRepository, YamlConfigStore};

/// Everything a command needs once `fidelis.yaml` has been read:
/// the DuckDB accessor with every declared dataset registered, and the
/// file-backed stores.
pub struct ProjectContext {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub accessor: Arc<DuckDBAccessor>,
    pub store: Arc<YamlConfigStore>,
    pub templates: Arc<JsonTemplateRepository>,
}

impl ProjectContext {
    pub fn load(project_dir: &Path) -> anyhow::Result<Self> {
        let config = load_project_config(project_dir).with_context(|| {
            format!(
                "Failed to load project configuration from {:?}",
                project_dir
            )
        })?;

        let database = if config.database == ":memory:" {
            config.database.clone()
        } else {
            resolve(project_dir, &config.database)
                .to_string_lossy()
                .into_owned()
        };
        let accessor = DuckDBAccessor::new(&database)
            .with_context(|| format!("Failed to initialize DuckDB at {}", database))?;

        for source in &config.datasets {
            let path = resolve(project_dir, &source.path);
            accessor
                .register_source(&source.name, &path.to_string_lossy())
                .with_context(|| {
                    format!("Failed to register dataset '{}' from {:?}", source.name, path)
                })?;
        }
        debug!(
            datasets = config.datasets.len(),
            database = %database,
            "Project context ready"
        );

        Ok(Self {
            store: Arc::new(YamlConfigStore::new(resolve(
                project_dir,
                &config.config_store,
            ))),
            templates: Arc::new(JsonTemplateRepository::new(resolve(
                project_dir,
                &config.template_dir,
            ))),
            accessor: Arc::new(accessor),
            root: project_dir.to_path_buf(),
            config,
        })
    }

    pub fn checks_path(&self) -> PathBuf {
        resolve(&self.root, &self.config.checks_path)
    }

    pub fn target_dir(&self) -> PathBuf {
        resolve(&self.root, &self.config.target_path)
    }

    /// Fails early with the list of declared datasets.
    pub fn ensure_dataset(&self, name: &str) -> anyhow::Result<()> {
        if self.config.dataset(name).is_some() {
            return Ok(());
        }
        let declared: Vec<&str> = self
            .config
            .datasets
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        anyhow::bail!(
            "❌ Dataset '{}' is not declared in the project.\n👉 Declared datasets: [{}]",
            name,
            declared.join(", ")
        )
    }

    pub fn resolver(&self) -> ReferenceResolver {
        ReferenceResolver::new(self.accessor.clone(), self.config.reference.clone())
    }

    pub fn configuration_service(&self) -> ConfigurationService {
        ConfigurationService::new(self.store.clone(), self.resolver())
    }

    pub fn template_manager(&self) -> TemplateManager {
        TemplateManager::new(self.templates.clone(), self.store.clone())
    }
}

/// Project-relative paths are anchored at the project directory.
fn resolve(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(
            resolve(Path::new("/project"), "target"),
            PathBuf::from("/project/target")
        );
        assert_eq!(
            resolve(Path::new("/project"), "/var/out"),
            PathBuf::from("/var/out")
        );
    }
}
