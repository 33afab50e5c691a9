// fidelis-core/src/domain/config/mod.rs

pub mod column;
pub mod working_state;

pub use column::{
    AccuracyConfig, AccuracyMethod, Bound, ColumnConfig, ConfigStatus, ConsistencyConfig,
    DataType, ReferenceSource, Sign, TimelinessConfig, UniquenessConfig, UniquenessMode,
    UpdateFrequency, ValidityConfig, ValidityRule,
};
pub use working_state::{ColumnAssignment, WorkingState};
