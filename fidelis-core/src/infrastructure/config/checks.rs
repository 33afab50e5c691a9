// fidelis-core/src/infrastructure/config/checks.rs

use std::fs;
use std::path::Path;
use tracing::info;

use crate::domain::config::WorkingState;
use crate::error::FidelisError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

/// Reads a working state file. A missing file is an empty state.
pub fn load_working_state(path: &Path) -> Result<WorkingState, FidelisError> {
    if !path.exists() {
        return Ok(WorkingState::default());
    }
    let content = fs::read_to_string(path)?;
    let state: WorkingState = serde_yaml::from_str(&content).map_err(InfrastructureError::from)?;
    state.validate()?;
    info!(path = ?path, assignments = state.assignments().len(), "Working state loaded");
    Ok(state)
}

pub fn save_working_state(path: &Path, state: &WorkingState) -> Result<(), FidelisError> {
    let content = serde_yaml::to_string(state).map_err(InfrastructureError::from)?;
    atomic_write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::domain::config::{ColumnConfig, ValidityConfig, ValidityRule};
    use crate::domain::dimension::DimensionKey;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("checks.yaml");
        assert_eq!(load_working_state(&path)?, WorkingState::default());

        let mut state = WorkingState::new();
        state.assign(DimensionKey::Completeness, "email")?;
        state.set_config(
            "code",
            ColumnConfig::Validity(ValidityConfig {
                rule: Some(ValidityRule::Pattern {
                    pattern: "^[A-Z]{3}$".into(),
                }),
            }),
        )?;
        save_working_state(&path, &state)?;

        assert_eq!(load_working_state(&path)?, state);
        Ok(())
    }

    #[test]
    fn test_rejects_mismatched_config() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("checks.yaml");
        fs::write(
            &path,
            r#"
dimension_rules:
  completeness: [amount]
column_configs:
  amount:
    dimension: validity
"#,
        )?;
        assert!(matches!(
            load_working_state(&path),
            Err(FidelisError::Domain(DomainError::InvalidConfig { .. }))
        ));
        Ok(())
    }
}
