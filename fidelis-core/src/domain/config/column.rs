// fidelis-core/src/domain/config/column.rs

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::domain::dimension::DimensionKey;

/// Per-column configuration, one variant per configurable dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dimension", rename_all = "snake_case")]
pub enum ColumnConfig {
    Uniqueness(UniquenessConfig),
    Validity(ValidityConfig),
    Consistency(ConsistencyConfig),
    Accuracy(AccuracyConfig),
    Timeliness(TimelinessConfig),
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigStatus {
    /// Usable by the evaluator.
    Configured,
    /// Well formed, but the data it needs (e.g. reference values) is not supplied yet.
    Pending,
}

// --- UNIQUENESS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniquenessMode {
    #[default]
    Single,
    Multi,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UniquenessConfig {
    #[serde(default)]
    pub mode: UniquenessMode,
    #[serde(default)]
    pub companion_columns: Vec<String>,
}

// --- VALIDITY ---

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<ValidityRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "validation_type", rename_all = "snake_case")]
pub enum ValidityRule {
    Pattern { pattern: String },
    Range { min: f64, max: f64 },
    List { values: Vec<String> },
    Datatype { datatype: DataType },
    Sign { sign: Sign },
    Threshold { bound: Bound, threshold: f64 },
    CompareColumn { bound: Bound, compare_to: String },
}

impl ValidityRule {
    /// Allowed-value list from the comma separated form typed by users.
    pub fn list_from_csv(values: &str) -> Self {
        ValidityRule::List {
            values: values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Number,
    Date,
    Email,
    Url,
    Other(String),
}

impl DataType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Email => "email",
            Self::Url => "url",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "string" | "text" => Self::String,
            "number" | "numeric" => Self::Number,
            "date" => Self::Date,
            "email" => Self::Email,
            "url" => Self::Url,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for DataType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DataType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Above,
    Below,
}

impl Bound {
    pub fn holds(self, value: f64, limit: f64) -> bool {
        match self {
            Bound::Above => value > limit,
            Bound::Below => value < limit,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Above => write!(f, "above"),
            Bound::Below => write!(f, "below"),
        }
    }
}

// --- CONSISTENCY / REFERENCE DATA ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    pub reference: ReferenceSource,
}

/// Where the allowed values of a consistency (or accuracy) check come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ReferenceSource {
    /// Values extracted from an uploaded reference file.
    Csv {
        match_column: String,
        #[serde(default)]
        reference_values: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
    },
    /// Another stored dataset, read through the dataset accessor.
    Database {
        dataset_ref: String,
        ref_column: String,
    },
    /// Literal values typed in the configuration.
    List { values: Vec<String> },
}

impl ReferenceSource {
    /// Values carried by the configuration itself (`None` for database sources).
    pub fn inline_values(&self) -> Option<&[String]> {
        match self {
            ReferenceSource::Csv {
                reference_values, ..
            } => Some(reference_values),
            ReferenceSource::List { values } => Some(values),
            ReferenceSource::Database { .. } => None,
        }
    }

    fn validate(&self) -> Result<ConfigStatus, String> {
        match self {
            ReferenceSource::Csv {
                match_column,
                reference_values,
                ..
            } => {
                if reference_values.is_empty() {
                    Ok(ConfigStatus::Pending)
                } else if match_column.trim().is_empty() {
                    Err("csv reference values need a match column".to_string())
                } else {
                    Ok(ConfigStatus::Configured)
                }
            }
            ReferenceSource::Database {
                dataset_ref,
                ref_column,
            } => {
                if dataset_ref.trim().is_empty() {
                    Err("database reference needs a dataset".to_string())
                } else if ref_column.trim().is_empty() {
                    Err("database reference needs a reference column".to_string())
                } else {
                    Ok(ConfigStatus::Configured)
                }
            }
            ReferenceSource::List { values } => {
                if values.iter().all(|v| v.trim().is_empty()) {
                    Ok(ConfigStatus::Pending)
                } else {
                    Ok(ConfigStatus::Configured)
                }
            }
        }
    }
}

// --- ACCURACY ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyMethod {
    Reference,
    Calculation,
    Threshold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyConfig {
    pub method: AccuracyMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_column: Option<String>,
    #[serde(default)]
    pub threshold_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceSource>,
}

// --- TIMELINESS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateFrequency {
    Realtime,
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinessConfig {
    pub max_age_days: u32,
    #[serde(default)]
    pub update_frequency: UpdateFrequency,
}

// --- VALIDATION ---

impl ColumnConfig {
    pub fn dimension(&self) -> DimensionKey {
        match self {
            ColumnConfig::Uniqueness(_) => DimensionKey::Uniqueness,
            ColumnConfig::Validity(_) => DimensionKey::Validity,
            ColumnConfig::Consistency(_) => DimensionKey::Consistency,
            ColumnConfig::Accuracy(_) => DimensionKey::Accuracy,
            ColumnConfig::Timeliness(_) => DimensionKey::Timeliness,
        }
    }

    /// Reference data the check needs resolved before evaluation, if any.
    pub fn reference(&self) -> Option<&ReferenceSource> {
        match self {
            ColumnConfig::Consistency(cfg) => Some(&cfg.reference),
            ColumnConfig::Accuracy(cfg) if cfg.method == AccuracyMethod::Reference => {
                cfg.reference.as_ref()
            }
            _ => None,
        }
    }

    /// Other dataset columns the check reads besides its own.
    pub fn related_columns(&self) -> Vec<&str> {
        match self {
            ColumnConfig::Uniqueness(cfg) if cfg.mode == UniquenessMode::Multi => cfg
                .companion_columns
                .iter()
                .map(String::as_str)
                .collect(),
            ColumnConfig::Validity(ValidityConfig {
                rule: Some(ValidityRule::CompareColumn { compare_to, .. }),
            }) => vec![compare_to.as_str()],
            _ => Vec::new(),
        }
    }

    /// Checks the dimension-specific required fields.
    /// `Err` carries a human readable reason.
    pub fn validate(&self) -> Result<ConfigStatus, String> {
        match self {
            ColumnConfig::Uniqueness(cfg) => {
                if cfg.companion_columns.iter().any(|c| c.trim().is_empty()) {
                    return Err("companion column names must not be blank".to_string());
                }
                if cfg.mode == UniquenessMode::Multi && cfg.companion_columns.is_empty() {
                    return Err(
                        "multi-column uniqueness requires at least one companion column"
                            .to_string(),
                    );
                }
                Ok(ConfigStatus::Configured)
            }
            ColumnConfig::Validity(cfg) => match &cfg.rule {
                None => Ok(ConfigStatus::Configured),
                Some(rule) => validate_rule(rule).map(|_| ConfigStatus::Configured),
            },
            ColumnConfig::Consistency(cfg) => cfg.reference.validate(),
            ColumnConfig::Accuracy(cfg) => {
                if !(0.0..=100.0).contains(&cfg.threshold_percent) {
                    return Err(format!(
                        "threshold percent must be within 0..=100 (got {})",
                        cfg.threshold_percent
                    ));
                }
                match (cfg.method, &cfg.reference) {
                    (AccuracyMethod::Reference, None) => Ok(ConfigStatus::Pending),
                    (AccuracyMethod::Reference, Some(reference)) => reference.validate(),
                    _ => Ok(ConfigStatus::Configured),
                }
            }
            ColumnConfig::Timeliness(cfg) => {
                if cfg.max_age_days == 0 {
                    Err("max age must be at least one day".to_string())
                } else {
                    Ok(ConfigStatus::Configured)
                }
            }
        }
    }
}

fn validate_rule(rule: &ValidityRule) -> Result<(), String> {
    match rule {
        ValidityRule::Pattern { pattern } => {
            if pattern.is_empty() {
                return Err("pattern must not be empty".to_string());
            }
            Regex::new(pattern).map_err(|e| format!("invalid pattern: {}", e))?;
            Ok(())
        }
        ValidityRule::Range { min, max } => {
            if !min.is_finite() || !max.is_finite() {
                Err("range bounds must be finite numbers".to_string())
            } else if min > max {
                Err(format!("range minimum {} is greater than maximum {}", min, max))
            } else {
                Ok(())
            }
        }
        ValidityRule::List { values } => {
            if values.iter().all(|v| v.trim().is_empty()) {
                Err("allowed value list must not be empty".to_string())
            } else {
                Ok(())
            }
        }
        ValidityRule::Datatype { .. } | ValidityRule::Sign { .. } => Ok(()),
        ValidityRule::Threshold { threshold, .. } => {
            if threshold.is_finite() {
                Ok(())
            } else {
                Err("threshold must be a finite number".to_string())
            }
        }
        ValidityRule::CompareColumn { compare_to, .. } => {
            if compare_to.trim().is_empty() {
                Err("comparison column must not be blank".to_string())
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_yaml_layout() -> Result<()> {
        let yaml = r#"
dimension: validity
rule:
  validation_type: range
  min: 1
  max: 1000
"#;
        let config: ColumnConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(
            config,
            ColumnConfig::Validity(ValidityConfig {
                rule: Some(ValidityRule::Range {
                    min: 1.0,
                    max: 1000.0
                })
            })
        );
        assert_eq!(config.dimension(), DimensionKey::Validity);

        let yaml = r#"
dimension: consistency
reference:
  source: database
  dataset_ref: currencies
  ref_column: code
"#;
        let config: ColumnConfig = serde_yaml::from_str(yaml)?;
        assert!(matches!(
            config.reference(),
            Some(ReferenceSource::Database { dataset_ref, .. }) if dataset_ref == "currencies"
        ));
        Ok(())
    }

    #[test]
    fn test_unknown_datatype_is_kept() -> Result<()> {
        let rule: ValidityRule =
            serde_json::from_str(r#"{"validation_type":"datatype","datatype":"uuid"}"#)?;
        assert_eq!(
            rule,
            ValidityRule::Datatype {
                datatype: DataType::Other("uuid".into())
            }
        );
        Ok(())
    }

    #[test]
    fn test_invalid_configs() {
        let empty_pattern = ColumnConfig::Validity(ValidityConfig {
            rule: Some(ValidityRule::Pattern {
                pattern: String::new(),
            }),
        });
        assert!(empty_pattern.validate().is_err());

        let bad_regex = ColumnConfig::Validity(ValidityConfig {
            rule: Some(ValidityRule::Pattern {
                pattern: "([a-z".into(),
            }),
        });
        assert!(bad_regex.validate().is_err());

        let inverted = ColumnConfig::Validity(ValidityConfig {
            rule: Some(ValidityRule::Range {
                min: 10.0,
                max: 1.0,
            }),
        });
        assert!(inverted.validate().is_err());

        let lonely_multi = ColumnConfig::Uniqueness(UniquenessConfig {
            mode: UniquenessMode::Multi,
            companion_columns: vec![],
        });
        assert!(lonely_multi.validate().is_err());

        let stale = ColumnConfig::Timeliness(TimelinessConfig {
            max_age_days: 0,
            update_frequency: UpdateFrequency::Daily,
        });
        assert!(stale.validate().is_err());
    }

    #[test]
    fn test_pending_vs_configured_reference() {
        let pending = ColumnConfig::Consistency(ConsistencyConfig {
            reference: ReferenceSource::Csv {
                match_column: "code".into(),
                reference_values: vec![],
                file_name: None,
            },
        });
        assert_eq!(pending.validate(), Ok(ConfigStatus::Pending));

        let configured = ColumnConfig::Consistency(ConsistencyConfig {
            reference: ReferenceSource::Csv {
                match_column: "code".into(),
                reference_values: vec!["USD".into()],
                file_name: Some("currencies.csv".into()),
            },
        });
        assert_eq!(configured.validate(), Ok(ConfigStatus::Configured));

        let orphan_values = ColumnConfig::Consistency(ConsistencyConfig {
            reference: ReferenceSource::Csv {
                match_column: " ".into(),
                reference_values: vec!["USD".into()],
                file_name: None,
            },
        });
        assert!(orphan_values.validate().is_err());
    }

    #[test]
    fn test_validity_without_rule_is_executable() {
        let neutral = ColumnConfig::Validity(ValidityConfig::default());
        assert_eq!(neutral.validate(), Ok(ConfigStatus::Configured));
    }

    #[test]
    fn test_related_columns() {
        let multi = ColumnConfig::Uniqueness(UniquenessConfig {
            mode: UniquenessMode::Multi,
            companion_columns: vec!["region".into(), "day".into()],
        });
        assert_eq!(multi.related_columns(), vec!["region", "day"]);

        let single = ColumnConfig::Uniqueness(UniquenessConfig {
            mode: UniquenessMode::Single,
            companion_columns: vec!["region".into()],
        });
        assert!(single.related_columns().is_empty());

        let compare = ColumnConfig::Validity(ValidityConfig {
            rule: Some(ValidityRule::CompareColumn {
                bound: Bound::Below,
                compare_to: "cap".into(),
            }),
        });
        assert_eq!(compare.related_columns(), vec!["cap"]);
    }

    #[test]
    fn test_list_from_csv() {
        assert_eq!(
            ValidityRule::list_from_csv("bbl/d, bpd ,,"),
            ValidityRule::List {
                values: vec!["bbl/d".into(), "bpd".into()]
            }
        );
    }
}
