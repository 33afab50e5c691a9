// fidelis-core/src/ports/dataset.rs

// What the engine needs from whoever stores the tabular data.
// The engine never parses source files itself.

use crate::domain::DomainError;
use crate::domain::dataset::{CellValue, Dataset};
use crate::error::FidelisError;
use async_trait::async_trait;

/// Storage-independent description of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

#[async_trait]
pub trait DatasetAccessor: Send + Sync {
    /// Ordered column schema. Unknown datasets are `DatasetNotFound`.
    async fn fetch_columns(&self, dataset_id: &str) -> Result<Vec<ColumnSchema>, FidelisError>;

    /// Ordered rows, optionally capped to the first `limit` rows.
    async fn load_dataset(
        &self,
        dataset_id: &str,
        limit: Option<usize>,
    ) -> Result<Dataset, FidelisError>;

    /// Values of one column, in row order.
    async fn fetch_column_values(
        &self,
        dataset_id: &str,
        column: &str,
        limit: usize,
    ) -> Result<Vec<CellValue>, FidelisError> {
        let dataset = self.load_dataset(dataset_id, Some(limit)).await?;
        if !dataset.has_column(column) {
            return Err(DomainError::ColumnNotFound {
                dataset: dataset_id.to_string(),
                column: column.to_string(),
            }
            .into());
        }
        Ok(dataset.column_values(column).cloned().collect())
    }

    fn engine_name(&self) -> &str;
}
