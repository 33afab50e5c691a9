// fidelis-core/src/domain/evaluation/result.rs

use serde::{Serialize, Serializer};
use std::fmt;

use crate::domain::config::{Bound, DataType};
use crate::domain::dimension::DimensionKey;

/// Why a row failed its check. Serialised as the human readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    MissingValue,
    DuplicateValue,
    PatternMismatch,
    InvalidPattern,
    NotANumber,
    OutOfRange,
    NotInAllowedList,
    InvalidDatatype(DataType),
    NotPositive,
    NotNegative,
    ThresholdNotMet(Bound),
    ComparisonFailed { bound: Bound, column: String },
    ComparisonNotANumber(String),
    NotInReference,
    ReferenceFetchFailed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue => write!(f, "missing value"),
            Self::DuplicateValue => write!(f, "duplicate value"),
            Self::PatternMismatch => write!(f, "value does not match pattern"),
            Self::InvalidPattern => write!(f, "invalid pattern"),
            Self::NotANumber => write!(f, "not a valid number"),
            Self::OutOfRange => write!(f, "value out of range"),
            Self::NotInAllowedList => write!(f, "value not in allowed list"),
            Self::InvalidDatatype(datatype) => write!(f, "not a valid {}", datatype),
            Self::NotPositive => write!(f, "value is not positive"),
            Self::NotNegative => write!(f, "value is not negative"),
            Self::ThresholdNotMet(bound) => write!(f, "value is not {} threshold", bound),
            Self::ComparisonFailed { bound, column } => {
                write!(f, "value is not {} column '{}'", bound, column)
            }
            Self::ComparisonNotANumber(column) => {
                write!(f, "column '{}' is not a valid number", column)
            }
            Self::NotInReference => write!(f, "value not found in reference data"),
            Self::ReferenceFetchFailed => write!(f, "reference data fetch failed"),
        }
    }
}

impl Serialize for FailureReason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDetail {
    pub row_index: usize,
    pub value: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

/// Outcome of one (dimension, column) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityCheckResult {
    id: String,
    column: String,
    dimension: DimensionKey,
    passed: usize,
    failed: usize,
    total: usize,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold_met: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    row_details: Vec<RowDetail>,
}

impl QualityCheckResult {
    pub(crate) fn new(
        dimension: DimensionKey,
        column: &str,
        passed: usize,
        failed: usize,
        row_details: Vec<RowDetail>,
    ) -> Self {
        let total = passed + failed;
        let score = if total > 0 {
            passed as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            id: format!("{}:{}", dimension, column),
            column: column.to_string(),
            dimension,
            passed,
            failed,
            total,
            score,
            threshold_met: None,
            row_details,
        }
    }

    pub(crate) fn with_threshold(mut self, threshold_percent: f64) -> Self {
        self.threshold_met = Some(self.score >= threshold_percent);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn dimension(&self) -> &DimensionKey {
        &self.dimension
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn threshold_met(&self) -> Option<bool> {
        self.threshold_met
    }

    pub fn row_details(&self) -> &[RowDetail] {
        &self.row_details
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowDetail> {
        self.row_details.iter().filter(|d| !d.passed)
    }
}
