// fidelis-core/src/application/evaluation.rs

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::application::resolver::{ReferenceCache, ReferenceResolver};
use crate::domain::DomainError;
use crate::domain::config::{ColumnConfig, WorkingState};
use crate::domain::dataset::Dataset;
use crate::domain::dimension::{DimensionKey, DimensionRegistry};
use crate::domain::evaluation::{
    EvaluationOptions, EvaluationRequest, QualityCheckResult, RuleEvaluator,
};
use crate::domain::project::ReferenceSettings;
use crate::domain::reference::ReferenceState;
use crate::error::FidelisError;
use crate::ports::config_store::{ConfigKey, ConfigurationStore};
use crate::ports::dataset::DatasetAccessor;

/// A (dimension, column) pair that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationFailure {
    pub dimension: DimensionKey,
    pub column: String,
    pub error: String,
}

/// Outcome of `evaluate_all`: results in assignment order, plus the pairs that failed.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRun {
    pub dataset_id: String,
    pub total_rows: usize,
    pub results: Vec<QualityCheckResult>,
    pub failures: Vec<EvaluationFailure>,
}

impl EvaluationRun {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Job {
    dimension: DimensionKey,
    column: String,
    config: Option<ColumnConfig>,
    reference: ReferenceState,
}

/// Orchestrates dataset loading, reference resolution and rule evaluation.
pub struct QualityRunner {
    accessor: Arc<dyn DatasetAccessor>,
    store: Arc<dyn ConfigurationStore>,
    resolver: ReferenceResolver,
    evaluator: RuleEvaluator,
    options: EvaluationOptions,
    registry: DimensionRegistry,
}

impl QualityRunner {
    pub fn new(
        accessor: Arc<dyn DatasetAccessor>,
        store: Arc<dyn ConfigurationStore>,
        settings: ReferenceSettings,
    ) -> Self {
        Self {
            resolver: ReferenceResolver::new(accessor.clone(), settings),
            accessor,
            store,
            evaluator: RuleEvaluator::new(),
            options: EvaluationOptions::default(),
            registry: DimensionRegistry::builtin(),
        }
    }

    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.options = options;
        self
    }

    /// Assignments to dimensions disabled in `registry` are skipped by `evaluate_all`.
    pub fn with_registry(mut self, registry: DimensionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Stored configuration first, then the working state's own.
    fn effective_config(
        &self,
        dataset_id: &str,
        dimension: &DimensionKey,
        column: &str,
        state: Option<&WorkingState>,
    ) -> Result<Option<ColumnConfig>, FidelisError> {
        let key = ConfigKey::new(dataset_id, dimension.clone(), column);
        if let Some(stored) = self.store.get(&key)? {
            return Ok(Some(stored.config));
        }
        Ok(state
            .and_then(|s| s.config_for(column))
            .filter(|c| &c.dimension() == dimension)
            .cloned())
    }

    fn ensure_column(dataset: &Dataset, column: &str) -> Result<(), DomainError> {
        if dataset.has_column(column) {
            Ok(())
        } else {
            Err(DomainError::ColumnNotFound {
                dataset: dataset.id().to_string(),
                column: column.to_string(),
            })
        }
    }

    /// Companion and comparison columns must exist as well.
    fn ensure_related_columns(
        dataset: &Dataset,
        config: Option<&ColumnConfig>,
    ) -> Result<(), DomainError> {
        config
            .map(ColumnConfig::related_columns)
            .unwrap_or_default()
            .into_iter()
            .try_for_each(|column| Self::ensure_column(dataset, column))
    }

    /// Evaluates one (dimension, column) pair with its stored configuration.
    #[instrument(skip(self))]
    pub async fn evaluate(
        &self,
        dataset_id: &str,
        dimension: &DimensionKey,
        column: &str,
    ) -> Result<QualityCheckResult, FidelisError> {
        let dataset = self.accessor.load_dataset(dataset_id, None).await?;
        Self::ensure_column(&dataset, column)?;

        let config = self.effective_config(dataset_id, dimension, column, None)?;
        Self::ensure_related_columns(&dataset, config.as_ref())?;
        let reference = self.resolver.state_for(config.as_ref()).await;

        Ok(self.evaluator.evaluate(
            &EvaluationRequest {
                dimension,
                column,
                dataset: &dataset,
                config: config.as_ref(),
                reference: &reference,
            },
            self.options,
        ))
    }

    /// Evaluates every assignment of `state` against one load of the dataset.
    /// A failing pair is recorded in `failures` and never stops its siblings.
    #[instrument(skip(self, state), fields(assignments = state.assignments().len()))]
    pub async fn evaluate_all(
        &self,
        dataset_id: &str,
        state: &WorkingState,
    ) -> Result<EvaluationRun, FidelisError> {
        let dataset = Arc::new(self.accessor.load_dataset(dataset_id, None).await?);
        info!(rows = dataset.len(), "Dataset loaded for evaluation");

        let mut failures = Vec::new();
        let mut jobs = Vec::new();
        let mut cache = ReferenceCache::new(&self.resolver);

        // 1. Sequential preparation (store lookups, reference I/O)
        for assignment in state.assignments() {
            if !self.registry.is_enabled(&assignment.dimension) {
                warn!(
                    dimension = %assignment.dimension,
                    column = %assignment.column,
                    "Dimension is disabled, assignment skipped"
                );
                continue;
            }
            let prepared = Self::ensure_column(&dataset, &assignment.column)
                .map_err(FidelisError::from)
                .and_then(|()| {
                    self.effective_config(
                        dataset_id,
                        &assignment.dimension,
                        &assignment.column,
                        Some(state),
                    )
                })
                .and_then(|config| {
                    Self::ensure_related_columns(&dataset, config.as_ref())?;
                    Ok(config)
                });
            match prepared {
                Ok(config) => {
                    let reference = cache.state_for(config.as_ref()).await;
                    jobs.push(Job {
                        dimension: assignment.dimension,
                        column: assignment.column,
                        config,
                        reference,
                    });
                }
                Err(e) => {
                    warn!(column = %assignment.column, error = %e, "Skipping assignment");
                    failures.push(EvaluationFailure {
                        dimension: assignment.dimension,
                        column: assignment.column,
                        error: e.to_string(),
                    });
                }
            }
        }

        // 2. Pure evaluations fanned out on the blocking pool
        let handles = jobs.into_iter().map(|job| {
            let dataset = Arc::clone(&dataset);
            let evaluator = self.evaluator;
            let options = self.options;
            let pair = (job.dimension.clone(), job.column.clone());
            let handle = tokio::task::spawn_blocking(move || {
                evaluator.evaluate(
                    &EvaluationRequest {
                        dimension: &job.dimension,
                        column: &job.column,
                        dataset: &dataset,
                        config: job.config.as_ref(),
                        reference: &job.reference,
                    },
                    options,
                )
            });
            async move { (pair, handle.await) }
        });

        let mut results = Vec::new();
        for ((dimension, column), outcome) in join_all(handles).await {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(column = %column, error = %e, "Evaluation task failed");
                    failures.push(EvaluationFailure {
                        dimension,
                        column,
                        error: format!("evaluation task failed: {}", e),
                    });
                }
            }
        }

        info!(
            evaluated = results.len(),
            failed = failures.len(),
            "Evaluation run finished"
        );

        Ok(EvaluationRun {
            dataset_id: dataset_id.to_string(),
            total_rows: dataset.len(),
            results,
            failures,
        })
    }
}
