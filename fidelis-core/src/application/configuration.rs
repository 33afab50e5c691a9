// fidelis-core/src/application/configuration.rs

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::application::resolver::ReferenceResolver;
use crate::domain::DomainError;
use crate::domain::config::{ColumnConfig, ConfigStatus, ConsistencyConfig, ReferenceSource};
use crate::domain::dimension::DimensionKey;
use crate::domain::reference::{ReferenceError, parse_reference_csv};
use crate::error::FidelisError;
use crate::ports::config_store::{ConfigKey, ConfigurationStore, StoredConfig};

/// Validating front of the configuration store.
pub struct ConfigurationService {
    store: Arc<dyn ConfigurationStore>,
    resolver: ReferenceResolver,
}

impl ConfigurationService {
    pub fn new(store: Arc<dyn ConfigurationStore>, resolver: ReferenceResolver) -> Self {
        Self { store, resolver }
    }

    pub fn get(
        &self,
        dataset_id: &str,
        dimension: &DimensionKey,
        column: &str,
    ) -> Result<Option<StoredConfig>, FidelisError> {
        self.store
            .get(&ConfigKey::new(dataset_id, dimension.clone(), column))
    }

    /// Validates and stores `config`. Incomplete configurations are kept with
    /// `is_configured = false`; malformed ones are rejected.
    #[instrument(skip(self, config))]
    pub async fn upsert(
        &self,
        dataset_id: &str,
        dimension: &DimensionKey,
        column: &str,
        config: ColumnConfig,
    ) -> Result<StoredConfig, FidelisError> {
        let invalid = |reason: String| DomainError::InvalidConfig {
            dimension: dimension.to_string(),
            column: column.to_string(),
            reason,
        };

        if &config.dimension() != dimension {
            return Err(invalid(format!(
                "configuration is for the '{}' dimension",
                config.dimension()
            ))
            .into());
        }
        let status = config.validate().map_err(invalid)?;

        if let Some(ReferenceSource::Database {
            dataset_ref,
            ref_column,
        }) = config.reference()
        {
            self.resolver
                .verify_source(dataset_ref, ref_column)
                .await
                .map_err(|e| DomainError::ReferenceResolutionFailed {
                    dataset: dataset_ref.clone(),
                    reason: e.to_string(),
                })?;
        }

        let stored = StoredConfig {
            config,
            is_configured: status == ConfigStatus::Configured,
            updated_at: Utc::now(),
        };
        self.store.put(
            ConfigKey::new(dataset_id, dimension.clone(), column),
            stored.clone(),
        )?;
        info!(status = ?status, "Column configuration stored");
        Ok(stored)
    }

    pub fn remove(
        &self,
        dataset_id: &str,
        dimension: &DimensionKey,
        column: &str,
    ) -> Result<bool, FidelisError> {
        self.store
            .remove(&ConfigKey::new(dataset_id, dimension.clone(), column))
    }

    pub fn list(&self, dataset_id: &str) -> Result<Vec<(ConfigKey, StoredConfig)>, FidelisError> {
        self.store.list(dataset_id)
    }
}

/// Consistency configuration built from an uploaded reference file.
pub fn consistency_from_upload(
    blob: &str,
    match_column: &str,
    file_name: Option<String>,
) -> Result<ColumnConfig, ReferenceError> {
    let reference_values = parse_reference_csv(blob, match_column)?;
    Ok(ColumnConfig::Consistency(ConsistencyConfig {
        reference: ReferenceSource::Csv {
            match_column: match_column.to_string(),
            reference_values,
            file_name,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{
        UniquenessConfig, UniquenessMode, ValidityConfig, ValidityRule,
    };
    use crate::domain::dataset::Dataset;
    use crate::domain::project::ReferenceSettings;
    use crate::infrastructure::adapters::memory::InMemoryDatasets;
    use crate::infrastructure::store::memory::InMemoryConfigStore;
    use anyhow::Result;

    fn service() -> Result<ConfigurationService> {
        let datasets = InMemoryDatasets::new();
        datasets.insert(Dataset::from_records(
            "currencies",
            &["code"],
            vec![vec!["USD".into()]],
        ))?;
        let resolver = ReferenceResolver::new(Arc::new(datasets), ReferenceSettings::default());
        Ok(ConfigurationService::new(
            Arc::new(InMemoryConfigStore::new()),
            resolver,
        ))
    }

    #[tokio::test]
    async fn test_upsert_is_keyed_replace() -> Result<()> {
        let service = service()?;
        let config = ColumnConfig::Validity(ValidityConfig {
            rule: Some(ValidityRule::Range {
                min: 0.0,
                max: 5.0,
            }),
        });

        let first = service
            .upsert("orders", &DimensionKey::Validity, "qty", config.clone())
            .await?;
        let second = service
            .upsert("orders", &DimensionKey::Validity, "qty", config.clone())
            .await?;
        assert!(first.is_configured);
        assert_eq!(first.config, second.config);
        assert_eq!(service.list("orders")?.len(), 1);

        let found = service.get("orders", &DimensionKey::Validity, "qty")?;
        assert_eq!(found.map(|s| s.config), Some(config));
        assert!(service.get("customers", &DimensionKey::Validity, "qty")?.is_none());

        assert!(service.remove("orders", &DimensionKey::Validity, "qty")?);
        assert!(service.list("orders")?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid() -> Result<()> {
        let service = service()?;

        let empty_pattern = ColumnConfig::Validity(ValidityConfig {
            rule: Some(ValidityRule::Pattern {
                pattern: String::new(),
            }),
        });
        let err = service
            .upsert("orders", &DimensionKey::Validity, "code", empty_pattern)
            .await;
        assert!(matches!(
            err,
            Err(FidelisError::Domain(DomainError::InvalidConfig { .. }))
        ));

        let wrong_dimension = ColumnConfig::Uniqueness(UniquenessConfig {
            mode: UniquenessMode::Single,
            companion_columns: vec![],
        });
        let err = service
            .upsert("orders", &DimensionKey::Validity, "code", wrong_dimension)
            .await;
        assert!(matches!(
            err,
            Err(FidelisError::Domain(DomainError::InvalidConfig { .. }))
        ));
        assert!(service.list("orders")?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_checks_database_reference() -> Result<()> {
        let service = service()?;
        let reference = |dataset_ref: &str| {
            ColumnConfig::Consistency(ConsistencyConfig {
                reference: ReferenceSource::Database {
                    dataset_ref: dataset_ref.into(),
                    ref_column: "code".into(),
                },
            })
        };

        let ok = service
            .upsert(
                "orders",
                &DimensionKey::Consistency,
                "currency",
                reference("currencies"),
            )
            .await?;
        assert!(ok.is_configured);

        let err = service
            .upsert(
                "orders",
                &DimensionKey::Consistency,
                "currency",
                reference("fx_rates"),
            )
            .await;
        assert!(matches!(
            err,
            Err(FidelisError::Domain(DomainError::ReferenceResolutionFailed { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_upload_is_stored_unconfigured() -> Result<()> {
        let service = service()?;
        let config = consistency_from_upload("code,label\n", "code", None)?;
        let stored = service
            .upsert("orders", &DimensionKey::Consistency, "currency", config)
            .await?;
        assert!(!stored.is_configured);

        let config = consistency_from_upload(
            "code,label\nUSD,Dollar\n",
            "code",
            Some("currencies.csv".into()),
        )?;
        let stored = service
            .upsert("orders", &DimensionKey::Consistency, "currency", config)
            .await?;
        assert!(stored.is_configured);
        Ok(())
    }
}
