// fidelis-core/src/application/report.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::application::evaluation::{EvaluationFailure, EvaluationRun};
use crate::domain::aggregate::{DimensionSummary, ResultAggregator};
use crate::domain::dimension::DimensionRegistry;
use crate::error::FidelisError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

pub const REPORT_FILE: &str = "quality_report.json";

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub generated_at: DateTime<Utc>,
    pub dataset_id: String,
    pub total_rows: usize,
    /// Unweighted mean of the column scores.
    pub overall_score: f64,
    /// Dimension scores weighted by the registry weights.
    pub weighted_score: f64,
    pub dimensions: Vec<DimensionSummary>,
    pub failures: Vec<EvaluationFailure>,
}

impl QualityReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn weighted_score(dimensions: &[DimensionSummary], registry: &DimensionRegistry) -> f64 {
    let (sum, weights) = dimensions.iter().fold((0.0, 0.0), |(sum, weights), d| {
        let weight = registry.get(&d.dimension).map_or(1.0, |def| def.weight);
        (sum + d.score * weight, weights + weight)
    });
    if weights > 0.0 { sum / weights } else { 0.0 }
}

pub fn build_report(run: EvaluationRun, registry: &DimensionRegistry) -> QualityReport {
    let aggregated = ResultAggregator::new(registry).aggregate(run.results);
    QualityReport {
        generated_at: Utc::now(),
        weighted_score: weighted_score(&aggregated.by_dimension, registry),
        dataset_id: run.dataset_id,
        total_rows: run.total_rows,
        overall_score: aggregated.overall_score,
        dimensions: aggregated.by_dimension,
        failures: run.failures,
    }
}

/// Writes `<target_dir>/quality_report.json` and returns its path.
pub fn save_report(report: &QualityReport, target_dir: &Path) -> Result<PathBuf, FidelisError> {
    let path = target_dir.join(REPORT_FILE);
    let content = serde_json::to_string_pretty(report).map_err(InfrastructureError::from)?;
    atomic_write(&path, content)?;
    info!(path = ?path, "Quality report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{CellValue, Dataset};
    use crate::domain::dimension::{DimensionDefinition, DimensionKey};
    use crate::domain::evaluation::{EvaluationOptions, EvaluationRequest, RuleEvaluator};
    use crate::domain::reference::ReferenceState;
    use anyhow::Result;
    use tempfile::tempdir;

    fn run() -> EvaluationRun {
        let ds = Dataset::from_records(
            "orders",
            &["id"],
            vec![
                vec![CellValue::from("a")],
                vec![CellValue::from("a")],
                vec![CellValue::Null],
                vec![CellValue::from("b")],
            ],
        );
        let evaluate = |dimension: DimensionKey| {
            RuleEvaluator::new().evaluate(
                &EvaluationRequest {
                    dimension: &dimension,
                    column: "id",
                    dataset: &ds,
                    config: None,
                    reference: &ReferenceState::NotConfigured,
                },
                EvaluationOptions::default(),
            )
        };
        EvaluationRun {
            dataset_id: "orders".into(),
            total_rows: ds.len(),
            // 75 and 50
            results: vec![
                evaluate(DimensionKey::Completeness),
                evaluate(DimensionKey::Uniqueness),
            ],
            failures: vec![],
        }
    }

    #[test]
    fn test_weighted_score_uses_registry() {
        let mut registry = DimensionRegistry::builtin();
        let mut heavy = DimensionDefinition::new(DimensionKey::Completeness, "Completeness", "");
        heavy.weight = 3.0;
        registry.register(heavy);

        let report = build_report(run(), &registry);
        assert_eq!(report.overall_score, 62.5);
        assert_eq!(report.weighted_score, (75.0 * 3.0 + 50.0) / 4.0);
        assert!(report.success());
    }

    #[test]
    fn test_save_report() -> Result<()> {
        let dir = tempdir()?;
        let report = build_report(run(), &DimensionRegistry::builtin());
        let path = save_report(&report, &dir.path().join("target"))?;

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        assert_eq!(json["dataset_id"], "orders");
        assert_eq!(json["dimensions"][0]["dimension"], "completeness");
        assert_eq!(json["dimensions"][1]["results"][0]["id"], "uniqueness:id");
        assert!(json["generated_at"].is_string());
        Ok(())
    }
}
