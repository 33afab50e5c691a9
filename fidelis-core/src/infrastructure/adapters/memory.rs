// fidelis-core/src/infrastructure/adapters/memory.rs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::DomainError;
use crate::domain::dataset::Dataset;
use crate::error::FidelisError;
use crate::ports::dataset::{ColumnSchema, DatasetAccessor};

/// Datasets held in memory, keyed by id. Also used as the test double.
#[derive(Default)]
pub struct InMemoryDatasets {
    datasets: RwLock<HashMap<String, Dataset>>,
}

impl InMemoryDatasets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, dataset: Dataset) -> Result<(), FidelisError> {
        let mut datasets = self
            .datasets
            .write()
            .map_err(|_| FidelisError::poisoned("dataset map"))?;
        datasets.insert(dataset.id().to_string(), dataset);
        Ok(())
    }

    fn with_dataset<T>(
        &self,
        dataset_id: &str,
        f: impl FnOnce(&Dataset) -> T,
    ) -> Result<T, FidelisError> {
        let datasets = self
            .datasets
            .read()
            .map_err(|_| FidelisError::poisoned("dataset map"))?;
        datasets
            .get(dataset_id)
            .map(f)
            .ok_or_else(|| DomainError::DatasetNotFound(dataset_id.to_string()).into())
    }
}

#[async_trait]
impl DatasetAccessor for InMemoryDatasets {
    async fn fetch_columns(&self, dataset_id: &str) -> Result<Vec<ColumnSchema>, FidelisError> {
        self.with_dataset(dataset_id, |ds| {
            ds.columns()
                .iter()
                .map(|name| ColumnSchema {
                    name: name.clone(),
                    data_type: "ANY".to_string(),
                    is_nullable: true,
                })
                .collect()
        })
    }

    async fn load_dataset(
        &self,
        dataset_id: &str,
        limit: Option<usize>,
    ) -> Result<Dataset, FidelisError> {
        self.with_dataset(dataset_id, |ds| match limit {
            Some(limit) if limit < ds.len() => Dataset::with_rows(
                ds.id(),
                ds.columns().to_vec(),
                ds.rows()[..limit].to_vec(),
            ),
            _ => ds.clone(),
        })
    }

    fn engine_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::CellValue;
    use anyhow::Result;

    #[tokio::test]
    async fn test_default_column_values() -> Result<()> {
        let store = InMemoryDatasets::new();
        store.insert(Dataset::from_records(
            "currencies",
            &["code"],
            vec![vec!["USD".into()], vec!["EUR".into()], vec!["JPY".into()]],
        ))?;

        let values = store.fetch_column_values("currencies", "code", 2).await?;
        assert_eq!(values, vec![CellValue::from("USD"), CellValue::from("EUR")]);

        assert!(matches!(
            store.fetch_column_values("currencies", "label", 2).await,
            Err(FidelisError::Domain(DomainError::ColumnNotFound { .. }))
        ));
        assert!(matches!(
            store.load_dataset("missing", None).await,
            Err(FidelisError::Domain(DomainError::DatasetNotFound(_)))
        ));
        Ok(())
    }
}
