// fidelis-core/src/domain/dimension/mod.rs

pub mod key;
pub mod registry;

// Re-exports
pub use key::DimensionKey;
pub use registry::{ActiveDimension, DimensionDefinition, DimensionRegistry};
