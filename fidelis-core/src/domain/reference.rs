// fidelis-core/src/domain/reference.rs

use miette::Diagnostic;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Canonical form used for reference lookups.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalised set of allowed reference values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceSet(HashSet<String>);

impl ReferenceSet {
    /// Normalises every value, skipping blanks.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            values
                .into_iter()
                .map(|v| normalize(v.as_ref()))
                .filter(|v| !v.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(&normalize(value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reference data as seen by the evaluator.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReferenceState {
    /// No reference data configured for the check.
    #[default]
    NotConfigured,
    Resolved(ReferenceSet),
    /// Resolution was attempted and failed.
    Failed(String),
}

impl ReferenceState {
    pub fn from_result(result: Result<ReferenceSet, ReferenceError>) -> Self {
        match result {
            Ok(set) => ReferenceState::Resolved(set),
            Err(e) => ReferenceState::Failed(e.to_string()),
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("Match column '{0}' not found in reference file header")]
    #[diagnostic(
        code(fidelis::domain::reference::match_column),
        help("The match column must be spelled exactly as in the header row.")
    )]
    MatchColumnMissing(String),

    #[error("Reference file is empty")]
    #[diagnostic(code(fidelis::domain::reference::empty_file))]
    EmptyFile,

    #[error("Reference file is not valid CSV: {0}")]
    #[diagnostic(code(fidelis::domain::reference::malformed))]
    Malformed(String),

    #[error("Reference data fetch failed: {0}")]
    #[diagnostic(code(fidelis::domain::reference::fetch))]
    FetchFailed(String),

    #[error("Reference data fetch timed out after {0:?}")]
    #[diagnostic(
        code(fidelis::domain::reference::timeout),
        help("Raise `reference.timeout-secs` in the project file.")
    )]
    Timeout(Duration),
}

/// Extracts the non-empty cells of `match_column` from a comma separated
/// upload whose first row is the header. Quoted fields may contain commas.
pub fn parse_reference_csv(blob: &str, match_column: &str) -> Result<Vec<String>, ReferenceError> {
    let blob = blob.strip_prefix('\u{feff}').unwrap_or(blob).trim_start();
    if blob.is_empty() {
        return Err(ReferenceError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(blob.as_bytes());

    let index = reader
        .headers()
        .map_err(|e| ReferenceError::Malformed(e.to_string()))?
        .iter()
        .position(|h| h == match_column)
        .ok_or_else(|| ReferenceError::MatchColumnMissing(match_column.to_string()))?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReferenceError::Malformed(e.to_string()))?;
        if let Some(cell) = record.get(index).filter(|cell| !cell.is_empty()) {
            values.push(cell.to_string());
        }
    }
    Ok(values)
}
