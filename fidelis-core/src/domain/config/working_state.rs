// fidelis-core/src/domain/config/working_state.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::config::column::{ColumnConfig, ConfigStatus};
use crate::domain::dimension::DimensionKey;
use crate::domain::error::DomainError;

/// A (dimension, column) pair selected for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnAssignment {
    pub dimension: DimensionKey,
    pub column: String,
}

/// Editable set of assignments and per-column configurations.
///
/// A column belongs to at most one dimension at a time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkingState {
    #[serde(default)]
    pub dimension_rules: BTreeMap<DimensionKey, Vec<String>>,
    #[serde(default)]
    pub configured_columns: BTreeMap<DimensionKey, BTreeSet<String>>,
    #[serde(default)]
    pub column_configs: BTreeMap<String, ColumnConfig>,
}

impl WorkingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension_of(&self, column: &str) -> Option<&DimensionKey> {
        self.dimension_rules
            .iter()
            .find(|(_, columns)| columns.iter().any(|c| c == column))
            .map(|(dimension, _)| dimension)
    }

    /// Assigns `column` to `dimension`. Re-assigning to the same dimension is a no-op.
    pub fn assign(&mut self, dimension: DimensionKey, column: &str) -> Result<(), DomainError> {
        match self.dimension_of(column) {
            Some(current) if current == &dimension => return Ok(()),
            Some(current) => {
                return Err(DomainError::ColumnAlreadyAssigned {
                    column: column.to_string(),
                    dimension: current.to_string(),
                });
            }
            None => {}
        }
        self.dimension_rules
            .entry(dimension)
            .or_default()
            .push(column.to_string());
        Ok(())
    }

    /// Returns the column to the available pool, dropping its configuration.
    pub fn unassign(&mut self, column: &str) -> Option<DimensionKey> {
        let dimension = self.dimension_of(column)?.clone();
        if let Some(columns) = self.dimension_rules.get_mut(&dimension) {
            columns.retain(|c| c != column);
            if columns.is_empty() {
                self.dimension_rules.remove(&dimension);
            }
        }
        if let Some(configured) = self.configured_columns.get_mut(&dimension) {
            configured.remove(column);
            if configured.is_empty() {
                self.configured_columns.remove(&dimension);
            }
        }
        self.column_configs.remove(column);
        Some(dimension)
    }

    /// Columns of `all_columns` not yet assigned to any dimension, in input order.
    pub fn available_columns<'a>(&self, all_columns: &'a [String]) -> Vec<&'a str> {
        all_columns
            .iter()
            .filter(|c| self.dimension_of(c).is_none())
            .map(String::as_str)
            .collect()
    }

    /// Stores a configuration for `column`, assigning it to the config's
    /// dimension if needed. The column counts as configured only when the
    /// configuration is complete.
    pub fn set_config(
        &mut self,
        column: &str,
        config: ColumnConfig,
    ) -> Result<ConfigStatus, DomainError> {
        let dimension = config.dimension();
        let status = config
            .validate()
            .map_err(|reason| DomainError::InvalidConfig {
                dimension: dimension.to_string(),
                column: column.to_string(),
                reason,
            })?;

        self.assign(dimension.clone(), column)?;
        self.column_configs.insert(column.to_string(), config);
        match status {
            ConfigStatus::Configured => self.mark_configured(dimension, column),
            ConfigStatus::Pending => self.unmark_configured(&dimension, column),
        }
        Ok(status)
    }

    /// Flags an assignment as ready (self-sufficient dimensions need no config).
    pub fn mark_configured(&mut self, dimension: DimensionKey, column: &str) {
        self.configured_columns
            .entry(dimension)
            .or_default()
            .insert(column.to_string());
    }

    /// Clears the ready flag, e.g. when a stored configuration became pending again.
    pub fn unmark_configured(&mut self, dimension: &DimensionKey, column: &str) {
        if let Some(set) = self.configured_columns.get_mut(dimension) {
            set.remove(column);
            if set.is_empty() {
                self.configured_columns.remove(dimension);
            }
        }
    }

    /// Flagged as ready, or assigned to a dimension that runs without configuration.
    pub fn is_configured(&self, dimension: &DimensionKey, column: &str) -> bool {
        let flagged = self
            .configured_columns
            .get(dimension)
            .is_some_and(|set| set.contains(column));
        flagged
            || (matches!(dimension, DimensionKey::Completeness | DimensionKey::Uniqueness)
                && self.dimension_of(column) == Some(dimension))
    }

    pub fn config_for(&self, column: &str) -> Option<&ColumnConfig> {
        self.column_configs.get(column)
    }

    /// Every assignment, grouped by dimension, columns in assignment order.
    pub fn assignments(&self) -> Vec<ColumnAssignment> {
        self.dimension_rules
            .iter()
            .flat_map(|(dimension, columns)| {
                columns.iter().map(move |column| ColumnAssignment {
                    dimension: dimension.clone(),
                    column: column.clone(),
                })
            })
            .collect()
    }

    pub fn has_configured_columns(&self) -> bool {
        self.assignments()
            .iter()
            .any(|a| self.is_configured(&a.dimension, &a.column))
    }

    pub fn is_empty(&self) -> bool {
        self.dimension_rules.values().all(Vec::is_empty)
    }

    /// Structural checks for a state read from disk: single assignment per
    /// column, and configurations matching the assigned dimension.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen: HashMap<&str, &DimensionKey> = HashMap::new();
        for (dimension, columns) in &self.dimension_rules {
            for column in columns {
                if let Some(previous) = seen.insert(column.as_str(), dimension) {
                    return Err(DomainError::ColumnAlreadyAssigned {
                        column: column.clone(),
                        dimension: previous.to_string(),
                    });
                }
            }
        }

        for (column, config) in &self.column_configs {
            let expected = config.dimension();
            match seen.get(column.as_str()) {
                Some(assigned) if **assigned == expected => {}
                Some(assigned) => {
                    return Err(DomainError::InvalidConfig {
                        dimension: assigned.to_string(),
                        column: column.clone(),
                        reason: format!("configuration is for the '{}' dimension", expected),
                    });
                }
                None => {
                    return Err(DomainError::InvalidConfig {
                        dimension: expected.to_string(),
                        column: column.clone(),
                        reason: "column is configured but not assigned".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::column::{
        ConsistencyConfig, ReferenceSource, ValidityConfig, ValidityRule,
    };
    use anyhow::Result;

    fn columns() -> Vec<String> {
        ["id", "email", "currency", "amount"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_column_assigned_once() -> Result<()> {
        let mut state = WorkingState::new();
        state.assign(DimensionKey::Completeness, "id")?;
        state.assign(DimensionKey::Completeness, "id")?;

        let err = state.assign(DimensionKey::Uniqueness, "id");
        assert!(matches!(
            err,
            Err(DomainError::ColumnAlreadyAssigned { ref dimension, .. }) if dimension == "completeness"
        ));

        let all = columns();
        assert_eq!(
            state.available_columns(&all),
            vec!["email", "currency", "amount"]
        );

        assert_eq!(state.unassign("id"), Some(DimensionKey::Completeness));
        state.assign(DimensionKey::Uniqueness, "id")?;
        assert_eq!(state.dimension_of("id"), Some(&DimensionKey::Uniqueness));
        Ok(())
    }

    #[test]
    fn test_set_config_tracks_status() -> Result<()> {
        let mut state = WorkingState::new();
        let status = state.set_config(
            "amount",
            ColumnConfig::Validity(ValidityConfig {
                rule: Some(ValidityRule::Range {
                    min: 0.0,
                    max: 10.0,
                }),
            }),
        )?;
        assert_eq!(status, ConfigStatus::Configured);
        assert!(state.is_configured(&DimensionKey::Validity, "amount"));

        let status = state.set_config(
            "currency",
            ColumnConfig::Consistency(ConsistencyConfig {
                reference: ReferenceSource::List { values: vec![] },
            }),
        )?;
        assert_eq!(status, ConfigStatus::Pending);
        assert!(!state.is_configured(&DimensionKey::Consistency, "currency"));
        assert_eq!(
            state.dimension_of("currency"),
            Some(&DimensionKey::Consistency)
        );
        Ok(())
    }

    #[test]
    fn test_self_sufficient_assignments_count_as_configured() -> Result<()> {
        let mut state = WorkingState::new();
        state.assign(DimensionKey::Validity, "amount")?;
        assert!(!state.has_configured_columns());

        state.assign(DimensionKey::Completeness, "email")?;
        state.assign(DimensionKey::Uniqueness, "id")?;
        assert!(state.is_configured(&DimensionKey::Completeness, "email"));
        assert!(state.is_configured(&DimensionKey::Uniqueness, "id"));
        assert!(!state.is_configured(&DimensionKey::Completeness, "id"));
        assert!(!state.is_configured(&DimensionKey::Validity, "amount"));
        assert!(state.has_configured_columns());
        Ok(())
    }

    #[test]
    fn test_unmark_configured() -> Result<()> {
        let mut state = WorkingState::new();
        state.set_config(
            "amount",
            ColumnConfig::Validity(ValidityConfig::default()),
        )?;
        assert!(state.is_configured(&DimensionKey::Validity, "amount"));

        state.unmark_configured(&DimensionKey::Validity, "amount");
        assert!(!state.is_configured(&DimensionKey::Validity, "amount"));
        assert!(state.configured_columns.is_empty());
        assert_eq!(state.dimension_of("amount"), Some(&DimensionKey::Validity));
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut state = WorkingState::new();
        let result = state.set_config(
            "code",
            ColumnConfig::Validity(ValidityConfig {
                rule: Some(ValidityRule::Pattern {
                    pattern: "(".into(),
                }),
            }),
        );
        assert!(matches!(result, Err(DomainError::InvalidConfig { .. })));
        assert!(state.is_empty());
    }

    #[test]
    fn test_unassign_drops_config() -> Result<()> {
        let mut state = WorkingState::new();
        state.set_config(
            "amount",
            ColumnConfig::Validity(ValidityConfig::default()),
        )?;
        state.unassign("amount");
        assert!(state.config_for("amount").is_none());
        assert!(!state.has_configured_columns());
        assert!(state.configured_columns.is_empty());
        Ok(())
    }

    #[test]
    fn test_validate_detects_duplicates_from_yaml() -> Result<()> {
        let yaml = r#"
dimension_rules:
  completeness: [id]
  uniqueness: [id]
"#;
        let state: WorkingState = serde_yaml::from_str(yaml)?;
        assert!(matches!(
            state.validate(),
            Err(DomainError::ColumnAlreadyAssigned { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_assignment_order() -> Result<()> {
        let mut state = WorkingState::new();
        state.assign(DimensionKey::Validity, "b")?;
        state.assign(DimensionKey::Completeness, "z")?;
        state.assign(DimensionKey::Completeness, "a")?;
        let pairs: Vec<_> = state
            .assignments()
            .into_iter()
            .map(|a| format!("{}:{}", a.dimension, a.column))
            .collect();
        assert_eq!(pairs, vec!["completeness:z", "completeness:a", "validity:b"]);
        Ok(())
    }
}
