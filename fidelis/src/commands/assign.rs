// fidelis/src/commands/assign.rs
//
// USE CASE: Put a column under a dimension without storing any configuration.

use std::path::PathBuf;

use fidelis_core::domain::dimension::DimensionKey;
use fidelis_core::infrastructure::config::{load_working_state, save_working_state};
use fidelis_core::ports::dataset::DatasetAccessor;

use super::ProjectContext;

pub async fn execute(
    project_dir: PathBuf,
    dimension: DimensionKey,
    column: String,
    dataset: Option<String>,
) -> anyhow::Result<()> {
    let ctx = ProjectContext::load(&project_dir)?;

    if !ctx.config.registry().is_registered(&dimension) {
        anyhow::bail!(
            "❌ Dimension '{}' is not registered.\n👉 Run 'fidelis dimensions' to list them.",
            dimension
        );
    }

    if let Some(dataset) = &dataset {
        ctx.ensure_dataset(dataset)?;
        let columns = ctx.accessor.fetch_columns(dataset).await?;
        if !columns.iter().any(|c| c.name == column) {
            anyhow::bail!("❌ Column '{}' not found in dataset '{}'", column, dataset);
        }
    }

    let checks_path = ctx.checks_path();
    let mut state = load_working_state(&checks_path)?;
    state.assign(dimension.clone(), &column)?;
    save_working_state(&checks_path, &state)?;

    if state.is_configured(&dimension, &column) {
        println!("✅ {} assigned to {} (ready)", column, dimension);
    } else {
        println!(
            "📌 {} assigned to {} (pending)\n👉 Use 'fidelis config set --dimension {} -c {}' to configure it.",
            column, dimension, dimension, column
        );
    }
    Ok(())
}
