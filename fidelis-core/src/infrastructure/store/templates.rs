// fidelis-core/src/infrastructure/store/templates.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::template::Template;
use crate::error::FidelisError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::template_repository::TemplateRepository;

/// One pretty-printed JSON file per template, named after its id.
pub struct JsonTemplateRepository {
    dir: PathBuf,
}

impl JsonTemplateRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids become file names: only `[A-Za-z0-9_-]` is accepted.
    fn path_for(&self, id: &str) -> Result<PathBuf, FidelisError> {
        let safe = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(FidelisError::UnsafePath(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }

    fn read(path: &Path) -> Result<Template, InfrastructureError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl TemplateRepository for JsonTemplateRepository {
    fn save(&self, template: &Template) -> Result<(), FidelisError> {
        let path = self.path_for(&template.id)?;
        let content = serde_json::to_string_pretty(template).map_err(InfrastructureError::from)?;
        atomic_write(&path, content)?;
        debug!(path = ?path, "Template saved");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Template>, FidelisError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::read(&path)?))
    }

    fn list(&self) -> Result<Vec<Template>, FidelisError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match Self::read(path) {
                Ok(template) => templates.push(template),
                Err(e) => warn!(path = ?path, error = %e, "Skipping unreadable template"),
            }
        }
        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::WorkingState;
    use crate::domain::dimension::DimensionKey;
    use anyhow::Result;
    use tempfile::tempdir;

    fn template(name: &str) -> Result<Template> {
        let mut state = WorkingState::new();
        state.assign(DimensionKey::Completeness, "id")?;
        state.mark_configured(DimensionKey::Completeness, "id");
        Ok(Template::snapshot(name, None, None, state)?)
    }

    #[test]
    fn test_save_get_list() -> Result<()> {
        let dir = tempdir()?;
        let repo = JsonTemplateRepository::new(dir.path().join("templates"));
        assert!(repo.list()?.is_empty());

        let first = template("first")?;
        repo.save(&first)?;
        repo.save(&template("second")?)?;
        fs::write(repo.dir().join("notes.txt"), "ignored")?;
        fs::write(repo.dir().join("broken.json"), "{")?;

        assert_eq!(repo.get(&first.id)?, Some(first.clone()));
        assert!(repo.get("0000")?.is_none());
        assert_eq!(repo.list()?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_rejects_path_traversal() -> Result<()> {
        let dir = tempdir()?;
        let repo = JsonTemplateRepository::new(dir.path());
        assert!(matches!(
            repo.get("../../etc/passwd"),
            Err(FidelisError::UnsafePath(_))
        ));
        assert!(matches!(repo.get(""), Err(FidelisError::UnsafePath(_))));
        Ok(())
    }
}
