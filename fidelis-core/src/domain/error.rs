// fidelis-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid configuration for {dimension} on column '{column}': {reason}")]
    #[diagnostic(
        code(fidelis::domain::invalid_config),
        help("Fill in the required fields for the '{dimension}' dimension before running checks.")
    )]
    InvalidConfig {
        dimension: String,
        column: String,
        reason: String,
    },

    #[error("Reference data could not be resolved from '{dataset}': {reason}")]
    #[diagnostic(
        code(fidelis::domain::reference),
        help("Check that the reference dataset is registered and exposes the reference column.")
    )]
    ReferenceResolutionFailed { dataset: String, reason: String },

    #[error("Template '{0}' has no configured column assignment")]
    #[diagnostic(
        code(fidelis::domain::empty_template),
        help("Assign and configure at least one column before saving a template.")
    )]
    EmptyTemplate(String),

    #[error("Invalid template: {0}")]
    #[diagnostic(code(fidelis::domain::template))]
    InvalidTemplate(String),

    #[error("Template '{0}' not found")]
    #[diagnostic(code(fidelis::domain::template_not_found))]
    TemplateNotFound(String),

    #[error("Column '{column}' is already assigned to the '{dimension}' dimension")]
    #[diagnostic(
        code(fidelis::domain::assignment),
        help("A column can only be checked by one dimension at a time. Unassign it first.")
    )]
    ColumnAlreadyAssigned { column: String, dimension: String },

    #[error("Invalid dimension key: '{0}'")]
    #[diagnostic(code(fidelis::domain::dimension))]
    InvalidDimensionKey(String),

    #[error("Dataset '{0}' not found")]
    #[diagnostic(code(fidelis::domain::dataset_not_found))]
    DatasetNotFound(String),

    #[error("Column '{column}' not found in dataset '{dataset}'")]
    #[diagnostic(code(fidelis::domain::column_not_found))]
    ColumnNotFound { dataset: String, column: String },
}
