// fidelis/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use fidelis_core::domain::dimension::DimensionKey;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fidelis")]
#[command(about = "Data quality dimensions engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Evaluates every assigned (dimension, column) pair on a dataset
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Dataset to evaluate (as declared in fidelis.yaml)
        #[arg(long, short)]
        dataset: String,

        /// Working state file (default: `checks-path` from the project)
        #[arg(long)]
        checks: Option<PathBuf>,

        /// Evaluate the assignments of a saved template instead
        #[arg(long, conflicts_with = "checks")]
        template: Option<String>,

        /// Show failing rows
        #[arg(long)]
        details: bool,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Exit with error if the overall score is below this percentage
        #[arg(long)]
        fail_under: Option<f64>,
    },

    /// 📌 Assigns a column to a dimension in the working state
    Assign {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long)]
        dimension: DimensionKey,

        #[arg(long, short)]
        column: String,

        /// Check that the column exists in this dataset first
        #[arg(long, short)]
        dataset: Option<String>,
    },

    /// ⚙️  Manages stored column configurations
    Config {
        #[arg(long, default_value = ".", global = true)]
        project_dir: PathBuf,

        #[command(subcommand)]
        action: ConfigAction,
    },

    /// 📦 Saves and restores rule templates
    Template {
        #[arg(long, default_value = ".", global = true)]
        project_dir: PathBuf,

        #[command(subcommand)]
        action: TemplateAction,
    },

    /// 📐 Lists the dimension registry
    Dimensions {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🔍 Profiles a dataset (columns, nulls, distinct values, sample rows)
    Inspect {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, short)]
        dataset: String,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Prints the configuration stored for a column
    Show {
        #[arg(long, short)]
        dataset: String,
        #[arg(long)]
        dimension: DimensionKey,
        #[arg(long, short)]
        column: String,
    },

    /// Stores a configuration and assigns the column in the working state
    Set {
        #[arg(long, short)]
        dataset: String,
        #[arg(long)]
        dimension: DimensionKey,
        #[arg(long, short)]
        column: String,

        /// Configuration as YAML or JSON
        #[arg(long, required_unless_present = "reference_file")]
        value: Option<String>,

        /// Reference CSV for a consistency check
        #[arg(long, conflicts_with = "value", requires = "match_column")]
        reference_file: Option<PathBuf>,

        /// Column of the reference CSV holding the valid values
        #[arg(long)]
        match_column: Option<String>,
    },

    /// Deletes a stored configuration
    Remove {
        #[arg(long, short)]
        dataset: String,
        #[arg(long)]
        dimension: DimensionKey,
        #[arg(long, short)]
        column: String,
    },

    /// Lists the configurations stored for a dataset
    List {
        #[arg(long, short)]
        dataset: String,
    },
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Snapshots the working state as a template
    Save {
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Embed the configurations stored for this dataset
        #[arg(long, short)]
        dataset: Option<String>,
    },

    /// Lists templates, newest first
    List {
        /// Only templates usable on this dataset
        #[arg(long, short)]
        dataset: Option<String>,
    },

    /// Replaces the working state with a template's
    Load { id: String },
}
