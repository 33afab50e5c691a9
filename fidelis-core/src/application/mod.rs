// fidelis-core/src/application/mod.rs

pub mod configuration;
pub mod evaluation;
pub mod profile;
pub mod report;
pub mod resolver;
pub mod templates;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI write `use fidelis_core::application::{QualityRunner, build_report};`

pub use configuration::{ConfigurationService, consistency_from_upload};
pub use evaluation::{EvaluationFailure, EvaluationRun, QualityRunner};
pub use profile::{ColumnProfile, profile_dataset};
pub use report::{QualityReport, build_report, save_report};
pub use resolver::{ReferenceCache, ReferenceResolver};
pub use templates::TemplateManager;
