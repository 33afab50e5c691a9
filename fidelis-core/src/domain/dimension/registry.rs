// fidelis-core/src/domain/dimension/registry.rs

use serde::{Deserialize, Serialize};

use crate::domain::dimension::key::DimensionKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDefinition {
    pub key: DimensionKey,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

impl DimensionDefinition {
    pub fn new(key: DimensionKey, name: &str, description: &str) -> Self {
        Self {
            key,
            name: name.to_string(),
            description: description.to_string(),
            enabled: true,
            weight: 1.0,
        }
    }
}

/// Row of `list_active_dimensions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveDimension {
    pub key: DimensionKey,
    pub name: String,
    pub is_self_sufficient: bool,
}

/// Ordered catalog of dimensions. The order is the presentation order used
/// when grouping results.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionRegistry {
    dimensions: Vec<DimensionDefinition>,
}

impl Default for DimensionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DimensionRegistry {
    pub fn builtin() -> Self {
        use DimensionKey::*;
        Self {
            dimensions: vec![
                DimensionDefinition::new(
                    Completeness,
                    "Completeness",
                    "Values are present (not null, not blank).",
                ),
                DimensionDefinition::new(
                    Uniqueness,
                    "Uniqueness",
                    "Values (or column combinations) appear only once.",
                ),
                DimensionDefinition::new(
                    Validity,
                    "Validity",
                    "Values conform to a pattern, range, list, data type or sign.",
                ),
                DimensionDefinition::new(
                    Consistency,
                    "Consistency",
                    "Values exist in a reference data set.",
                ),
                DimensionDefinition::new(
                    Accuracy,
                    "Accuracy",
                    "Values agree with a trusted source within a threshold.",
                ),
                DimensionDefinition::new(
                    Timeliness,
                    "Timeliness",
                    "Data is refreshed within the expected age and frequency.",
                ),
            ],
        }
    }

    /// Adds a dimension, or overrides an existing one in place (position is kept).
    pub fn register(&mut self, definition: DimensionDefinition) -> &mut Self {
        match self.dimensions.iter_mut().find(|d| d.key == definition.key) {
            Some(existing) => *existing = definition,
            None => self.dimensions.push(definition),
        }
        self
    }

    pub fn list_active_dimensions(&self) -> Vec<ActiveDimension> {
        self.dimensions
            .iter()
            .filter(|d| d.enabled)
            .map(|d| ActiveDimension {
                key: d.key.clone(),
                name: d.name.clone(),
                is_self_sufficient: self.is_self_sufficient(&d.key),
            })
            .collect()
    }

    /// Completeness and uniqueness run without any configuration.
    pub fn is_self_sufficient(&self, key: &DimensionKey) -> bool {
        matches!(key, DimensionKey::Completeness | DimensionKey::Uniqueness)
    }

    pub fn get(&self, key: &DimensionKey) -> Option<&DimensionDefinition> {
        self.dimensions.iter().find(|d| &d.key == key)
    }

    /// Unregistered keys count as enabled; only an explicit `enabled: false` turns one off.
    pub fn is_enabled(&self, key: &DimensionKey) -> bool {
        self.get(key).is_none_or(|d| d.enabled)
    }

    pub fn is_registered(&self, key: &DimensionKey) -> bool {
        self.get(key).is_some()
    }

    pub fn position(&self, key: &DimensionKey) -> Option<usize> {
        self.dimensions.iter().position(|d| &d.key == key)
    }

    pub fn definitions(&self) -> &[DimensionDefinition] {
        &self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(registry: &DimensionRegistry) -> String {
        registry
            .list_active_dimensions()
            .iter()
            .map(|d| {
                format!(
                    "{} | {} | {}",
                    d.key,
                    d.name,
                    if d.is_self_sufficient {
                        "self-sufficient"
                    } else {
                        "needs config"
                    }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_builtin_listing() {
        insta::assert_snapshot!(render(&DimensionRegistry::builtin()), @r"
        completeness | Completeness | self-sufficient
        uniqueness | Uniqueness | self-sufficient
        validity | Validity | needs config
        consistency | Consistency | needs config
        accuracy | Accuracy | needs config
        timeliness | Timeliness | needs config
        ");
    }

    #[test]
    fn test_register_custom_and_override() {
        let mut registry = DimensionRegistry::builtin();
        registry.register(DimensionDefinition::new(
            DimensionKey::Custom("freshness".into()),
            "Freshness",
            "Custom dimension",
        ));
        let mut timeliness =
            DimensionDefinition::new(DimensionKey::Timeliness, "Timeliness", "disabled");
        timeliness.enabled = false;
        registry.register(timeliness);

        let active = registry.list_active_dimensions();
        assert_eq!(active.len(), 6);
        assert_eq!(active[5].key, DimensionKey::Custom("freshness".into()));
        assert!(!active[5].is_self_sufficient);
        assert!(!active.iter().any(|d| d.key == DimensionKey::Timeliness));
        // Overriding keeps the original slot
        assert_eq!(registry.position(&DimensionKey::Timeliness), Some(5));
        assert!(!registry.is_enabled(&DimensionKey::Timeliness));
        assert!(registry.is_enabled(&DimensionKey::Completeness));
        assert!(registry.is_enabled(&DimensionKey::Custom("unlisted".into())));
    }

    #[test]
    fn test_self_sufficiency() {
        let registry = DimensionRegistry::builtin();
        assert!(registry.is_self_sufficient(&DimensionKey::Completeness));
        assert!(registry.is_self_sufficient(&DimensionKey::Uniqueness));
        assert!(!registry.is_self_sufficient(&DimensionKey::Validity));
        assert!(!registry.is_self_sufficient(&DimensionKey::Custom("x".into())));
    }
}
