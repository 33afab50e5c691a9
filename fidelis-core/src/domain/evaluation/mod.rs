// fidelis-core/src/domain/evaluation/mod.rs

pub mod evaluator;
pub mod result;
mod rules;

pub use evaluator::{EvaluationOptions, EvaluationRequest, RowJudgments, RuleEvaluator};
pub use result::{FailureReason, QualityCheckResult, RowDetail};
