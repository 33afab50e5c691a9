// fidelis-core/src/lib.rs

// 1. Documentation
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts with the outside world: dataset access, configuration and template stores.
pub mod ports;

// 2. Domain (business core)
// Dimensions, column configurations, rule evaluation, aggregation, templates.
// Depends on nothing else (neither infra nor app).
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB, YAML/JSON stores, project configuration files.
pub mod infrastructure;

// 4. Application (Use Cases)
// Configuration service, quality runner, template manager, reports.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::FidelisError;
