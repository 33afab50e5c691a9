// fidelis-core/src/domain/evaluation/rules.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::domain::config::{
    AccuracyMethod, Bound, ColumnConfig, DataType, Sign, UniquenessMode, ValidityRule,
};
use crate::domain::dataset::{CellValue, Dataset};
use crate::domain::dimension::DimensionKey;
use crate::domain::evaluation::result::FailureReason;
use crate::domain::reference::{ReferenceSet, ReferenceState};

const KEY_SEPARATOR: char = '\u{1f}';

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%Y%m%d",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

fn re_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|_| {
            // Hardcoded pattern, cannot fail
            Regex::new("$^").unwrap_or_else(|_| unreachable!())
        })
    })
}

/// A configuration compiled into a per-row judgment.
pub(crate) enum Judge<'a> {
    PassAll,
    FailAll(FailureReason),
    Completeness,
    Unique {
        companions: &'a [String],
        seen: HashSet<String>,
    },
    Pattern(Regex),
    Range {
        min: f64,
        max: f64,
    },
    List(&'a [String]),
    Datatype(&'a DataType),
    Sign(Sign),
    Threshold {
        bound: Bound,
        threshold: f64,
    },
    Compare {
        bound: Bound,
        column: &'a str,
    },
    Reference(&'a ReferenceSet),
}

impl<'a> Judge<'a> {
    pub(crate) fn compile(
        dimension: &DimensionKey,
        config: Option<&'a ColumnConfig>,
        reference: &'a ReferenceState,
    ) -> Self {
        match dimension {
            DimensionKey::Completeness => Judge::Completeness,
            DimensionKey::Uniqueness => {
                let companions = match config {
                    Some(ColumnConfig::Uniqueness(cfg)) if cfg.mode == UniquenessMode::Multi => {
                        cfg.companion_columns.as_slice()
                    }
                    _ => &[],
                };
                Judge::Unique {
                    companions,
                    seen: HashSet::new(),
                }
            }
            DimensionKey::Validity => match config {
                Some(ColumnConfig::Validity(cfg)) => match &cfg.rule {
                    Some(rule) => Self::compile_rule(rule),
                    None => Judge::PassAll,
                },
                _ => Judge::PassAll,
            },
            DimensionKey::Consistency => Self::against(reference),
            DimensionKey::Accuracy => match config {
                Some(ColumnConfig::Accuracy(cfg)) if cfg.method == AccuracyMethod::Reference => {
                    Self::against(reference)
                }
                _ => Judge::PassAll,
            },
            // Timeliness is recorded, not judged per row. Custom keys are permissive.
            DimensionKey::Timeliness | DimensionKey::Custom(_) => Judge::PassAll,
        }
    }

    fn compile_rule(rule: &'a ValidityRule) -> Self {
        match rule {
            ValidityRule::Pattern { pattern } => match Regex::new(pattern) {
                Ok(re) if !pattern.is_empty() => Judge::Pattern(re),
                _ => Judge::FailAll(FailureReason::InvalidPattern),
            },
            ValidityRule::Range { min, max } => Judge::Range {
                min: *min,
                max: *max,
            },
            ValidityRule::List { values } => Judge::List(values),
            ValidityRule::Datatype { datatype } => Judge::Datatype(datatype),
            ValidityRule::Sign { sign } => Judge::Sign(*sign),
            ValidityRule::Threshold { bound, threshold } => Judge::Threshold {
                bound: *bound,
                threshold: *threshold,
            },
            ValidityRule::CompareColumn { bound, compare_to } => Judge::Compare {
                bound: *bound,
                column: compare_to,
            },
        }
    }

    fn against(reference: &'a ReferenceState) -> Self {
        match reference {
            ReferenceState::NotConfigured => Judge::PassAll,
            ReferenceState::Failed(_) => Judge::FailAll(FailureReason::ReferenceFetchFailed),
            ReferenceState::Resolved(set) => Judge::Reference(set),
        }
    }

    /// Judges one row. Must be called in row order (uniqueness keeps state).
    pub(crate) fn judge(
        &mut self,
        dataset: &Dataset,
        row: usize,
        column: &str,
    ) -> Result<(), FailureReason> {
        let cell = dataset.cell(row, column);
        match self {
            Judge::PassAll => Ok(()),
            Judge::FailAll(reason) => Err(reason.clone()),
            Judge::Completeness => present(cell),
            Judge::Unique { companions, seen } => {
                present(cell)?;
                let mut key = cell.to_text().into_owned();
                for companion in companions.iter() {
                    key.push(KEY_SEPARATOR);
                    key.push_str(&dataset.cell(row, companion).to_text());
                }
                if seen.insert(key) {
                    Ok(())
                } else {
                    Err(FailureReason::DuplicateValue)
                }
            }
            Judge::Pattern(re) => {
                if re.is_match(&cell.to_text()) {
                    Ok(())
                } else {
                    Err(FailureReason::PatternMismatch)
                }
            }
            Judge::Range { min, max } => {
                let value = number(cell)?;
                if *min <= value && value <= *max {
                    Ok(())
                } else {
                    Err(FailureReason::OutOfRange)
                }
            }
            Judge::List(values) => {
                let text = cell.to_text();
                let text = text.trim();
                if values.iter().any(|v| v.trim() == text) {
                    Ok(())
                } else {
                    Err(FailureReason::NotInAllowedList)
                }
            }
            Judge::Datatype(datatype) => {
                if matches_datatype(cell, datatype) {
                    Ok(())
                } else {
                    Err(FailureReason::InvalidDatatype((**datatype).clone()))
                }
            }
            Judge::Sign(sign) => {
                let value = number(cell)?;
                match sign {
                    Sign::Positive if value >= 0.0 => Ok(()),
                    Sign::Positive => Err(FailureReason::NotPositive),
                    Sign::Negative if value < 0.0 => Ok(()),
                    Sign::Negative => Err(FailureReason::NotNegative),
                }
            }
            Judge::Threshold { bound, threshold } => {
                let value = number(cell)?;
                if bound.holds(value, *threshold) {
                    Ok(())
                } else {
                    Err(FailureReason::ThresholdNotMet(*bound))
                }
            }
            Judge::Compare { bound, column: other } => {
                let value = number(cell)?;
                let limit = dataset
                    .cell(row, other)
                    .as_number()
                    .ok_or_else(|| FailureReason::ComparisonNotANumber(other.to_string()))?;
                if bound.holds(value, limit) {
                    Ok(())
                } else {
                    Err(FailureReason::ComparisonFailed {
                        bound: *bound,
                        column: other.to_string(),
                    })
                }
            }
            Judge::Reference(set) => {
                present(cell)?;
                if set.contains(&cell.to_text()) {
                    Ok(())
                } else {
                    Err(FailureReason::NotInReference)
                }
            }
        }
    }
}

fn present(cell: &CellValue) -> Result<(), FailureReason> {
    if cell.is_blank() {
        Err(FailureReason::MissingValue)
    } else {
        Ok(())
    }
}

fn number(cell: &CellValue) -> Result<f64, FailureReason> {
    cell.as_number().ok_or(FailureReason::NotANumber)
}

fn matches_datatype(cell: &CellValue, datatype: &DataType) -> bool {
    if cell.is_blank() {
        return false;
    }
    let text = cell.to_text();
    let text = text.trim();
    match datatype {
        DataType::Number => cell.as_number().is_some(),
        DataType::Email => re_email().is_match(text),
        DataType::Url => text.starts_with("http://") || text.starts_with("https://"),
        DataType::Date => is_date(text),
        DataType::String | DataType::Other(_) => true,
    }
}

fn is_date(text: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(text, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(text, fmt).is_ok())
        || DateTime::parse_from_rfc3339(text).is_ok()
}
