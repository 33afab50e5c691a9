// fidelis-core/src/domain/dimension/key.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Identifier of a data quality dimension.
///
/// The six built-in keys have dedicated evaluators. Any other key is a
/// user-registered dimension and is evaluated permissively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DimensionKey {
    Completeness,
    Uniqueness,
    Validity,
    Consistency,
    Accuracy,
    Timeliness,
    Custom(String),
}

impl DimensionKey {
    pub const BUILT_IN: [DimensionKey; 6] = [
        DimensionKey::Completeness,
        DimensionKey::Uniqueness,
        DimensionKey::Validity,
        DimensionKey::Consistency,
        DimensionKey::Accuracy,
        DimensionKey::Timeliness,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Completeness => "completeness",
            Self::Uniqueness => "uniqueness",
            Self::Validity => "validity",
            Self::Consistency => "consistency",
            Self::Accuracy => "accuracy",
            Self::Timeliness => "timeliness",
            Self::Custom(key) => key,
        }
    }

    pub fn is_built_in(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl FromStr for DimensionKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidDimensionKey(s.to_string()));
        }
        Ok(match trimmed.to_lowercase().as_str() {
            "completeness" => Self::Completeness,
            "uniqueness" => Self::Uniqueness,
            "validity" => Self::Validity,
            "consistency" => Self::Consistency,
            "accuracy" => Self::Accuracy,
            "timeliness" => Self::Timeliness,
            _ => Self::Custom(trimmed.to_string()),
        })
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for DimensionKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DimensionKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DimensionKey::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::BTreeMap;

    #[test]
    fn test_parse_built_in_and_custom() -> Result<()> {
        assert_eq!(" Validity ".parse::<DimensionKey>()?, DimensionKey::Validity);
        assert_eq!(
            "freshness_v2".parse::<DimensionKey>()?,
            DimensionKey::Custom("freshness_v2".into())
        );
        assert!(matches!(
            "  ".parse::<DimensionKey>(),
            Err(DomainError::InvalidDimensionKey(_))
        ));
        Ok(())
    }

    #[test]
    fn test_usable_as_map_key() -> Result<()> {
        let mut map = BTreeMap::new();
        map.insert(DimensionKey::Uniqueness, vec!["id".to_string()]);
        map.insert(DimensionKey::Custom("freshness".into()), vec![]);

        let json = serde_json::to_string(&map)?;
        assert_eq!(json, r#"{"uniqueness":["id"],"freshness":[]}"#);

        let back: BTreeMap<DimensionKey, Vec<String>> = serde_json::from_str(&json)?;
        assert_eq!(back, map);
        Ok(())
    }
}
