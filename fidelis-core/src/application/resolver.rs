// fidelis-core/src/application/resolver.rs

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::domain::config::{ColumnConfig, ConfigStatus, ReferenceSource};
use crate::domain::project::ReferenceSettings;
use crate::domain::reference::{ReferenceError, ReferenceSet, ReferenceState};
use crate::ports::dataset::DatasetAccessor;

/// Turns a `ReferenceSource` into a normalised `ReferenceSet`.
/// Database sources go through the dataset accessor, bounded by the
/// configured row limit and timeout.
#[derive(Clone)]
pub struct ReferenceResolver {
    accessor: Arc<dyn DatasetAccessor>,
    settings: ReferenceSettings,
}

impl ReferenceResolver {
    pub fn new(accessor: Arc<dyn DatasetAccessor>, settings: ReferenceSettings) -> Self {
        Self { accessor, settings }
    }

    pub fn settings(&self) -> &ReferenceSettings {
        &self.settings
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, source: &ReferenceSource) -> Result<ReferenceSet, ReferenceError> {
        if let Some(values) = source.inline_values() {
            return Ok(ReferenceSet::from_values(values));
        }
        let ReferenceSource::Database {
            dataset_ref,
            ref_column,
        } = source
        else {
            return Ok(ReferenceSet::default());
        };

        let timeout = self.settings.timeout();
        let fetch =
            self.accessor
                .fetch_column_values(dataset_ref, ref_column, self.settings.row_limit);
        let cells = match tokio::time::timeout(timeout, fetch).await {
            Ok(Ok(cells)) => cells,
            Ok(Err(e)) => return Err(ReferenceError::FetchFailed(e.to_string())),
            Err(_) => return Err(ReferenceError::Timeout(timeout)),
        };

        let set = ReferenceSet::from_values(cells.iter().map(|c| c.to_text()));
        debug!(dataset = %dataset_ref, column = %ref_column, values = set.len(), "Reference resolved");
        Ok(set)
    }

    /// Checks that a database reference is reachable and exposes its column.
    pub async fn verify_source(&self, dataset_ref: &str, ref_column: &str) -> Result<(), ReferenceError> {
        let timeout = self.settings.timeout();
        let columns = match tokio::time::timeout(timeout, self.accessor.fetch_columns(dataset_ref))
            .await
        {
            Ok(Ok(columns)) => columns,
            Ok(Err(e)) => return Err(ReferenceError::FetchFailed(e.to_string())),
            Err(_) => return Err(ReferenceError::Timeout(timeout)),
        };
        if columns.iter().any(|c| c.name == ref_column) {
            Ok(())
        } else {
            Err(ReferenceError::FetchFailed(format!(
                "column '{}' not found in '{}'",
                ref_column, dataset_ref
            )))
        }
    }

    /// Reference state the evaluator should see for `config`.
    ///
    /// Checks without reference data, or whose reference values are not
    /// supplied yet, are not configured. Anything that fails to resolve is
    /// `Failed`.
    pub async fn state_for(&self, config: Option<&ColumnConfig>) -> ReferenceState {
        let Some((config, source)) = config.and_then(|c| c.reference().map(|s| (c, s))) else {
            return ReferenceState::NotConfigured;
        };
        match config.validate() {
            Ok(ConfigStatus::Pending) => ReferenceState::NotConfigured,
            Err(reason) => ReferenceState::Failed(reason),
            Ok(ConfigStatus::Configured) => {
                let result = self.resolve(source).await;
                if let Err(e) = &result {
                    warn!(error = %e, "Reference resolution failed");
                }
                ReferenceState::from_result(result)
            }
        }
    }
}

/// Memoises resolution for the duration of one evaluation run.
pub struct ReferenceCache<'r> {
    resolver: &'r ReferenceResolver,
    entries: HashMap<ReferenceSource, ReferenceState>,
}

impl<'r> ReferenceCache<'r> {
    pub fn new(resolver: &'r ReferenceResolver) -> Self {
        Self {
            resolver,
            entries: HashMap::new(),
        }
    }

    pub async fn state_for(&mut self, config: Option<&ColumnConfig>) -> ReferenceState {
        let Some(source) = config.and_then(ColumnConfig::reference) else {
            return ReferenceState::NotConfigured;
        };
        if let Some(state) = self.entries.get(source) {
            return state.clone();
        }
        let state = self.resolver.state_for(config).await;
        self.entries.insert(source.clone(), state.clone());
        state
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::ConsistencyConfig;
    use crate::domain::dataset::{CellValue, Dataset};
    use crate::error::FidelisError;
    use crate::infrastructure::adapters::memory::InMemoryDatasets;
    use crate::ports::dataset::ColumnSchema;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn accessor() -> Result<Arc<InMemoryDatasets>> {
        let datasets = InMemoryDatasets::new();
        datasets.insert(Dataset::from_records(
            "currencies",
            &["code"],
            vec![
                vec![CellValue::from("USD")],
                vec![CellValue::from(" eur ")],
                vec![CellValue::Null],
            ],
        ))?;
        Ok(Arc::new(datasets))
    }

    fn database(dataset_ref: &str, ref_column: &str) -> ColumnConfig {
        ColumnConfig::Consistency(ConsistencyConfig {
            reference: ReferenceSource::Database {
                dataset_ref: dataset_ref.into(),
                ref_column: ref_column.into(),
            },
        })
    }

    #[tokio::test]
    async fn test_database_reference() -> Result<()> {
        let resolver = ReferenceResolver::new(accessor()?, ReferenceSettings::default());
        let state = resolver.state_for(Some(&database("currencies", "code"))).await;
        let ReferenceState::Resolved(set) = &state else {
            anyhow::bail!("expected a resolved reference, got {:?}", state);
        };
        assert_eq!(set.len(), 2);
        assert!(set.contains("EUR"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_reference_fails() -> Result<()> {
        let resolver = ReferenceResolver::new(accessor()?, ReferenceSettings::default());
        let missing_dataset = resolver.state_for(Some(&database("rates", "code"))).await;
        assert!(matches!(missing_dataset, ReferenceState::Failed(_)));
        let missing_column = resolver
            .state_for(Some(&database("currencies", "iso")))
            .await;
        assert!(matches!(missing_column, ReferenceState::Failed(_)));
        assert!(resolver.verify_source("currencies", "code").await.is_ok());
        assert!(resolver.verify_source("currencies", "iso").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_reference_is_not_configured() -> Result<()> {
        let resolver = ReferenceResolver::new(accessor()?, ReferenceSettings::default());
        let pending = ColumnConfig::Consistency(ConsistencyConfig {
            reference: ReferenceSource::Csv {
                match_column: "code".into(),
                reference_values: vec![],
                file_name: None,
            },
        });
        assert_eq!(
            resolver.state_for(Some(&pending)).await,
            ReferenceState::NotConfigured
        );
        assert_eq!(resolver.state_for(None).await, ReferenceState::NotConfigured);
        Ok(())
    }

    struct SlowAccessor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DatasetAccessor for SlowAccessor {
        async fn fetch_columns(&self, _: &str) -> Result<Vec<ColumnSchema>, FidelisError> {
            Ok(vec![])
        }

        async fn load_dataset(&self, id: &str, _: Option<usize>) -> Result<Dataset, FidelisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Dataset::new(id, vec![]))
        }

        fn engine_name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_timeout_and_cache() -> Result<()> {
        let slow = Arc::new(SlowAccessor {
            calls: AtomicUsize::new(0),
        });
        let settings = ReferenceSettings {
            row_limit: 10,
            timeout_secs: 1,
        };
        let resolver = ReferenceResolver::new(slow.clone(), settings);
        let config = database("remote", "code");

        let mut cache = ReferenceCache::new(&resolver);
        let first = cache.state_for(Some(&config)).await;
        let second = cache.state_for(Some(&config)).await;

        assert!(matches!(&first, ReferenceState::Failed(msg) if msg.contains("timed out")));
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
        Ok(())
    }
}
