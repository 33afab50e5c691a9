// fidelis-core/src/domain/dataset.rs

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// A single scalar cell of a tabular dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    /// Exact integer, as read from integer-typed columns.
    Integer(i64),
    Number(f64),
    Text(String),
}

static NULL_CELL: CellValue = CellValue::Null;

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text form of the cell. Null reads as an empty string and integral
    /// numbers print without a fractional part.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            CellValue::Integer(i) => Cow::Owned(i.to_string()),
            CellValue::Number(n) => Cow::Owned(format_number(*n)),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Null, or text that is empty once trimmed.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Bool(_) | CellValue::Integer(_) | CellValue::Number(_) => false,
        }
    }

    /// Numeric reading of the cell. Booleans, blanks and non-finite values are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

pub type Row = HashMap<String, CellValue>;

/// Rectangular dataset: ordered column names and ordered rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    id: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(id: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            id: id.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(id: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            id: id.into(),
            columns,
            rows,
        }
    }

    /// Builds a dataset from positional records (cell `i` belongs to `columns[i]`).
    /// Extra cells beyond the header are dropped, missing ones read as null.
    pub fn from_records<C, R>(id: impl Into<String>, columns: &[C], records: R) -> Self
    where
        C: AsRef<str>,
        R: IntoIterator<Item = Vec<CellValue>>,
    {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let rows = records
            .into_iter()
            .map(|record| columns.iter().cloned().zip(record).collect::<Row>())
            .collect();
        Self {
            id: id.into(),
            columns,
            rows,
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Cell at `(row, column)`; out-of-range rows and absent columns read as null.
    pub fn cell(&self, row: usize, column: &str) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL_CELL)
    }

    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&NULL_CELL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_form() {
        assert_eq!(CellValue::Null.to_text(), "");
        assert_eq!(CellValue::Number(42.0).to_text(), "42");
        assert_eq!(CellValue::Number(2.5).to_text(), "2.5");
        assert_eq!(CellValue::Bool(true).to_text(), "true");
        assert_eq!(
            CellValue::Integer(1_234_567_890_123_456_789).to_text(),
            "1234567890123456789"
        );
    }

    #[test]
    fn test_numeric_reading() {
        assert_eq!(CellValue::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(CellValue::from("").as_number(), None);
        assert_eq!(CellValue::from("abc").as_number(), None);
        assert_eq!(CellValue::from("NaN").as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert_eq!(CellValue::Number(-3.0).as_number(), Some(-3.0));
        assert_eq!(CellValue::Integer(7).as_number(), Some(7.0));
        assert!(!CellValue::Integer(0).is_blank());
    }

    #[test]
    fn test_untagged_json() -> anyhow::Result<()> {
        let cells: Vec<CellValue> = serde_json::from_str(r#"[null, true, 3, 3.5, "x"]"#)?;
        assert_eq!(
            cells,
            vec![
                CellValue::Null,
                CellValue::Bool(true),
                CellValue::Integer(3),
                CellValue::Number(3.5),
                CellValue::Text("x".into())
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_cells_read_as_null() {
        let ds = Dataset::from_records("t", &["a", "b"], vec![vec![CellValue::from("1")]]);
        assert_eq!(ds.cell(0, "a"), &CellValue::from("1"));
        assert!(ds.cell(0, "b").is_null());
        assert!(ds.cell(5, "a").is_null());
        assert!(ds.cell(0, "zzz").is_null());
    }
}
