// fidelis-core/src/domain/evaluation/evaluator.rs

use crate::domain::config::ColumnConfig;
use crate::domain::dataset::Dataset;
use crate::domain::dimension::DimensionKey;
use crate::domain::evaluation::result::{QualityCheckResult, RowDetail};
use crate::domain::evaluation::rules::Judge;
use crate::domain::reference::ReferenceState;

#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationOptions {
    pub include_row_details: bool,
}

/// Everything one (dimension, column) evaluation needs.
/// Reference data must already be resolved.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub dimension: &'a DimensionKey,
    pub column: &'a str,
    pub dataset: &'a Dataset,
    pub config: Option<&'a ColumnConfig>,
    pub reference: &'a ReferenceState,
}

/// Lazy row-by-row verdicts, in row order.
pub struct RowJudgments<'a> {
    judge: Judge<'a>,
    dataset: &'a Dataset,
    column: &'a str,
    row: usize,
}

impl Iterator for RowJudgments<'_> {
    type Item = RowDetail;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.dataset.len() {
            return None;
        }
        let row_index = self.row;
        self.row += 1;

        let verdict = self.judge.judge(self.dataset, row_index, self.column);
        Some(RowDetail {
            row_index,
            value: self.dataset.cell(row_index, self.column).to_text().into_owned(),
            passed: verdict.is_ok(),
            reason: verdict.err(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dataset.len().saturating_sub(self.row);
        (remaining, Some(remaining))
    }
}

/// The single rule evaluator. Stateless: every call is a pure function of its request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator;

impl RuleEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn judgments<'a>(&self, request: &EvaluationRequest<'a>) -> RowJudgments<'a> {
        RowJudgments {
            judge: Judge::compile(request.dimension, request.config, request.reference),
            dataset: request.dataset,
            column: request.column,
            row: 0,
        }
    }

    pub fn evaluate(
        &self,
        request: &EvaluationRequest<'_>,
        options: EvaluationOptions,
    ) -> QualityCheckResult {
        let (passed, failed, details) = self.judgments(request).fold(
            (0usize, 0usize, Vec::new()),
            |(passed, failed, mut details), detail| {
                let counts = if detail.passed {
                    (passed + 1, failed)
                } else {
                    (passed, failed + 1)
                };
                if options.include_row_details {
                    details.push(detail);
                }
                (counts.0, counts.1, details)
            },
        );

        let result = QualityCheckResult::new(
            request.dimension.clone(),
            request.column,
            passed,
            failed,
            details,
        );
        match request.config {
            Some(ColumnConfig::Accuracy(cfg)) => result.with_threshold(cfg.threshold_percent),
            _ => result,
        }
    }
}
