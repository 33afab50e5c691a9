pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod dimension;
pub mod error;
pub mod evaluation;
pub mod project;
pub mod reference;
pub mod template;

// Handy re-exports to simplify imports elsewhere
pub use error::DomainError;
