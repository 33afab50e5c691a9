// fidelis-core/src/application/profile.rs

use serde::Serialize;
use std::collections::HashSet;

use crate::domain::dataset::Dataset;
use crate::error::FidelisError;
use crate::ports::dataset::DatasetAccessor;

const SAMPLE_SIZE: usize = 5;

/// Per-column summary shown when a dataset is inspected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub data_type: String,
    pub null_count: usize,
    pub unique_count: usize,
    pub sample_values: Vec<String>,
}

fn profile_column(dataset: &Dataset, name: &str, data_type: &str) -> ColumnProfile {
    let mut null_count = 0;
    let mut distinct = HashSet::new();
    let mut sample_values = Vec::new();
    for cell in dataset.column_values(name) {
        if cell.is_blank() {
            null_count += 1;
            continue;
        }
        let text = cell.to_text().into_owned();
        if distinct.insert(text.clone()) && sample_values.len() < SAMPLE_SIZE {
            sample_values.push(text);
        }
    }
    ColumnProfile {
        name: name.to_string(),
        data_type: data_type.to_string(),
        null_count,
        unique_count: distinct.len(),
        sample_values,
    }
}

/// Loads up to `limit` rows and profiles every column.
pub async fn profile_dataset(
    accessor: &dyn DatasetAccessor,
    dataset_id: &str,
    limit: Option<usize>,
) -> Result<(Vec<ColumnProfile>, Dataset), FidelisError> {
    let schema = accessor.fetch_columns(dataset_id).await?;
    let dataset = accessor.load_dataset(dataset_id, limit).await?;
    let profiles = schema
        .iter()
        .map(|c| profile_column(&dataset, &c.name, &c.data_type))
        .collect();
    Ok((profiles, dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::CellValue;
    use crate::infrastructure::adapters::memory::InMemoryDatasets;
    use anyhow::Result;

    #[tokio::test]
    async fn test_profile() -> Result<()> {
        let datasets = InMemoryDatasets::new();
        datasets.insert(Dataset::from_records(
            "orders",
            &["currency"],
            vec![
                vec![CellValue::from("USD")],
                vec![CellValue::from("USD")],
                vec![CellValue::Null],
                vec![CellValue::from(" ")],
                vec![CellValue::from("EUR")],
            ],
        ))?;

        let (profiles, dataset) = profile_dataset(&datasets, "orders", None).await?;
        assert_eq!(dataset.len(), 5);
        assert_eq!(
            profiles,
            vec![ColumnProfile {
                name: "currency".into(),
                data_type: "ANY".into(),
                null_count: 2,
                unique_count: 2,
                sample_values: vec!["USD".into(), "EUR".into()],
            }]
        );
        Ok(())
    }
}
