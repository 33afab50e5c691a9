// fidelis/src/commands/inspect.rs
//
// USE CASE: Profile a dataset (schema, nulls, distinct values) and show sample rows.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use std::path::PathBuf;

use fidelis_core::application::profile_dataset;
use fidelis_core::ports::dataset::DatasetAccessor;

use super::ProjectContext;

pub async fn execute(project_dir: PathBuf, dataset: String, limit: usize) -> anyhow::Result<()> {
    let ctx = ProjectContext::load(&project_dir)?;
    ctx.ensure_dataset(&dataset)?;

    println!(
        "\n🔍 Inspecting dataset: '{}' ({})",
        dataset,
        ctx.accessor.engine_name()
    );
    let (profiles, data) = profile_dataset(ctx.accessor.as_ref(), &dataset, None).await?;
    println!("   Rows: {}", data.len());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
        Cell::new("Nulls").add_attribute(Attribute::Bold),
        Cell::new("Distinct").add_attribute(Attribute::Bold),
        Cell::new("Samples").add_attribute(Attribute::Bold),
    ]);
    for profile in &profiles {
        table.add_row(vec![
            Cell::new(&profile.name),
            Cell::new(&profile.data_type),
            Cell::new(profile.null_count).set_alignment(CellAlignment::Right),
            Cell::new(profile.unique_count).set_alignment(CellAlignment::Right),
            Cell::new(profile.sample_values.join(", ")),
        ]);
    }
    println!("{}", table);

    println!("   --- Rows (Limit {}) ---", limit);
    for row in 0..data.len().min(limit) {
        let values: Vec<String> = data
            .columns()
            .iter()
            .map(|column| data.cell(row, column).to_text().into_owned())
            .collect();
        println!("   ➜ {}", values.join(" | "));
    }

    Ok(())
}
