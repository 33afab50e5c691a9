// fidelis-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::{Config, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument};

use crate::domain::DomainError;
use crate::domain::dataset::{CellValue, Dataset};
use crate::error::FidelisError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::dataset::{ColumnSchema, DatasetAccessor};

/// How a column is read back into a `CellValue`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ReadAs {
    Integer,
    Number,
    Boolean,
    Text,
}

impl ReadAs {
    fn for_type(data_type: &str) -> Self {
        let upper = data_type.to_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();
        // Wider integers and decimals come back as text so they stay exact
        match base {
            "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "UTINYINT" | "USMALLINT"
            | "UINTEGER" | "INT" | "INT2" | "INT4" | "INT8" => ReadAs::Integer,
            "FLOAT" | "REAL" | "DOUBLE" => ReadAs::Number,
            "BOOLEAN" | "BOOL" => ReadAs::Boolean,
            _ => ReadAs::Text,
        }
    }

    fn select_expr(self, column: &str) -> String {
        let ident = quote_ident(column);
        match self {
            ReadAs::Integer => format!("CAST({} AS BIGINT)", ident),
            ReadAs::Number => format!("CAST({} AS DOUBLE)", ident),
            ReadAs::Boolean => ident,
            ReadAs::Text => format!("CAST({} AS VARCHAR)", ident),
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Dataset accessor backed by a DuckDB connection. CSV files are exposed as views.
pub struct DuckDBAccessor {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBAccessor {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();
        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, FidelisError> {
        self.conn.lock().map_err(|_| FidelisError::poisoned("DuckDB connection"))
    }

    pub fn execute(&self, sql: &str) -> Result<(), FidelisError> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Exposes a CSV file as dataset `name`.
    #[instrument(skip(self))]
    pub fn register_source(&self, name: &str, path: &str) -> Result<(), FidelisError> {
        let sql = format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM read_csv_auto({})",
            quote_ident(name),
            quote_literal(path)
        );
        self.execute(&sql)?;
        debug!(dataset = name, "Source registered");
        Ok(())
    }

    fn exists(conn: &Connection, dataset_id: &str) -> Result<bool, FidelisError> {
        let mut stmt =
            conn.prepare("SELECT count(*) FROM information_schema.tables WHERE table_name = ?")?;
        let count: i64 = stmt.query_row([dataset_id], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn columns_of(conn: &Connection, dataset_id: &str) -> Result<Vec<ColumnSchema>, FidelisError> {
        if !Self::exists(conn, dataset_id)? {
            return Err(DomainError::DatasetNotFound(dataset_id.to_string()).into());
        }

        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_literal(dataset_id)))?;
        let rows = stmt.query_map([], |row| {
            Ok(ColumnSchema {
                name: row.get("name")?,
                data_type: row.get("type")?,
                is_nullable: !row.get::<_, bool>("notnull")?,
            })
        })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        Ok(columns)
    }

    fn read_dataset(
        conn: &Connection,
        dataset_id: &str,
        limit: Option<usize>,
    ) -> Result<Dataset, FidelisError> {
        let schema = Self::columns_of(conn, dataset_id)?;
        let kinds: Vec<ReadAs> = schema.iter().map(|c| ReadAs::for_type(&c.data_type)).collect();
        let names: Vec<String> = schema.into_iter().map(|c| c.name).collect();

        if names.is_empty() {
            return Ok(Dataset::new(dataset_id, names));
        }

        let projection = names
            .iter()
            .zip(&kinds)
            .map(|(name, kind)| kind.select_expr(name))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {} FROM {}", projection, quote_ident(dataset_id));
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(kinds.len());
            for (i, kind) in kinds.iter().enumerate() {
                let cell = match kind {
                    ReadAs::Integer => CellValue::from(row.get::<_, Option<i64>>(i)?),
                    ReadAs::Number => CellValue::from(row.get::<_, Option<f64>>(i)?),
                    ReadAs::Boolean => CellValue::from(row.get::<_, Option<bool>>(i)?),
                    ReadAs::Text => CellValue::from(row.get::<_, Option<String>>(i)?),
                };
                record.push(cell);
            }
            records.push(record);
        }

        debug!(dataset = dataset_id, rows = records.len(), "Dataset loaded");
        Ok(Dataset::from_records(dataset_id, &names, records))
    }
}

#[async_trait]
impl DatasetAccessor for DuckDBAccessor {
    async fn fetch_columns(&self, dataset_id: &str) -> Result<Vec<ColumnSchema>, FidelisError> {
        let conn = self.lock()?;
        Self::columns_of(&conn, dataset_id)
    }

    async fn load_dataset(
        &self,
        dataset_id: &str,
        limit: Option<usize>,
    ) -> Result<Dataset, FidelisError> {
        let conn = self.lock()?;
        Self::read_dataset(&conn, dataset_id, limit)
    }

    async fn fetch_column_values(
        &self,
        dataset_id: &str,
        column: &str,
        limit: usize,
    ) -> Result<Vec<CellValue>, FidelisError> {
        let conn = self.lock()?;
        let schema = Self::columns_of(&conn, dataset_id)?;
        if !schema.iter().any(|c| c.name == column) {
            return Err(DomainError::ColumnNotFound {
                dataset: dataset_id.to_string(),
                column: column.to_string(),
            }
            .into());
        }

        let sql = format!(
            "SELECT {} FROM {} LIMIT {}",
            ReadAs::Text.select_expr(column),
            quote_ident(dataset_id),
            limit
        );
        let mut stmt = conn.prepare(&sql)?;
        let values = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;

        let mut cells = Vec::new();
        for value in values {
            cells.push(CellValue::from(value?));
        }
        Ok(cells)
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_dataset_reads_typed_cells() -> Result<()> {
        let accessor = DuckDBAccessor::new(":memory:")?;
        accessor.execute(
            "CREATE TABLE orders (id INTEGER, amount DECIMAL(10,2), paid BOOLEAN, code VARCHAR, rate DOUBLE);
             INSERT INTO orders VALUES (1, 12.50, true, 'USD', 0.25), (2, NULL, false, NULL, NULL);",
        )?;

        let columns = accessor.fetch_columns("orders").await?;
        assert_eq!(columns.len(), 5);
        assert_eq!(columns[0].name, "id");

        let ds = accessor.load_dataset("orders", None).await?;
        assert_eq!(ds.columns(), &["id", "amount", "paid", "code", "rate"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.cell(0, "id"), &CellValue::Integer(1));
        assert_eq!(ds.cell(0, "amount"), &CellValue::from("12.50"));
        assert_eq!(ds.cell(0, "amount").as_number(), Some(12.5));
        assert_eq!(ds.cell(0, "rate"), &CellValue::Number(0.25));
        assert_eq!(ds.cell(0, "paid"), &CellValue::Bool(true));
        assert_eq!(ds.cell(0, "code"), &CellValue::from("USD"));
        assert!(ds.cell(1, "amount").is_null());
        assert!(ds.cell(1, "code").is_null());

        let capped = accessor.load_dataset("orders", Some(1)).await?;
        assert_eq!(capped.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_large_integers_stay_exact() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "account_id,label")?;
        writeln!(file, "1234567890123456789,a")?;
        writeln!(file, "1234567890123456788,b")?;
        file.flush()?;

        let accessor = DuckDBAccessor::new(":memory:")?;
        accessor.register_source("accounts", &file.path().to_string_lossy())?;
        accessor.execute(
            "CREATE TABLE wide (big UBIGINT, huge HUGEINT);
             INSERT INTO wide VALUES (18446744073709551615, 12345678901234567890123456789);",
        )?;

        let ds = accessor.load_dataset("accounts", None).await?;
        assert_eq!(
            ds.cell(0, "account_id"),
            &CellValue::Integer(1_234_567_890_123_456_789)
        );
        assert_eq!(ds.cell(1, "account_id").to_text(), "1234567890123456788");
        assert_ne!(
            ds.cell(0, "account_id").to_text(),
            ds.cell(1, "account_id").to_text()
        );

        let wide = accessor.load_dataset("wide", None).await?;
        assert_eq!(wide.cell(0, "big"), &CellValue::from("18446744073709551615"));
        assert_eq!(
            wide.cell(0, "huge"),
            &CellValue::from("12345678901234567890123456789")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_register_csv_source() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "code,label")?;
        writeln!(file, "USD,Dollar")?;
        writeln!(file, "EUR,Euro")?;
        file.flush()?;

        let accessor = DuckDBAccessor::new(":memory:")?;
        let path = file.path().to_string_lossy().to_string();
        accessor.register_source("currencies", &path)?;

        let values = accessor
            .fetch_column_values("currencies", "code", 100)
            .await?;
        assert_eq!(values, vec![CellValue::from("USD"), CellValue::from("EUR")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_dataset_and_column() -> Result<()> {
        let accessor = DuckDBAccessor::new(":memory:")?;
        accessor.execute("CREATE TABLE t (a VARCHAR)")?;

        let missing = accessor.load_dataset("nope", None).await;
        assert!(matches!(
            missing,
            Err(FidelisError::Domain(DomainError::DatasetNotFound(_)))
        ));

        let missing_column = accessor.fetch_column_values("t", "b", 10).await;
        assert!(matches!(
            missing_column,
            Err(FidelisError::Domain(DomainError::ColumnNotFound { .. }))
        ));
        Ok(())
    }
}
