// fidelis-core/src/infrastructure/adapters/mod.rs

pub mod duckdb;
pub mod memory;

pub use self::duckdb::DuckDBAccessor;
pub use memory::InMemoryDatasets;
