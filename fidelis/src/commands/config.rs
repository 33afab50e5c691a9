// fidelis/src/commands/config.rs
//
// USE CASE: Manage stored column configurations.

use anyhow::Context;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, Table};
use std::fs;
use std::path::{Path, PathBuf};

use fidelis_core::application::consistency_from_upload;
use fidelis_core::domain::config::ColumnConfig;
use fidelis_core::infrastructure::config::{load_working_state, save_working_state};

use super::ProjectContext;
use crate::cli::ConfigAction;

pub async fn execute(project_dir: PathBuf, action: ConfigAction) -> anyhow::Result<()> {
    let ctx = ProjectContext::load(&project_dir)?;
    let service = ctx.configuration_service();

    match action {
        ConfigAction::Show {
            dataset,
            dimension,
            column,
        } => match service.get(&dataset, &dimension, &column)? {
            Some(stored) => {
                println!(
                    "🔧 {}:{} on '{}' ({})",
                    dimension,
                    column,
                    dataset,
                    status_label(stored.is_configured)
                );
                print!("{}", serde_yaml::to_string(&stored.config)?);
            }
            None => println!(
                "ℹ️  No configuration stored for {}:{} on '{}'",
                dimension, column, dataset
            ),
        },

        ConfigAction::Set {
            dataset,
            dimension,
            column,
            value,
            reference_file,
            match_column,
        } => {
            ctx.ensure_dataset(&dataset)?;
            let config = match (value, reference_file, match_column) {
                (Some(value), _, _) => serde_yaml::from_str::<ColumnConfig>(&value)
                    .context("Configuration is not valid YAML/JSON for a column check")?,
                (None, Some(file), Some(match_column)) => read_upload(&file, &match_column)?,
                _ => anyhow::bail!("❌ Provide --value or --reference-file with --match-column"),
            };

            // The column must be free (or already ours) before anything is stored
            let checks_path = ctx.checks_path();
            let mut state = load_working_state(&checks_path)?;
            state.assign(dimension.clone(), &column)?;

            let stored = service
                .upsert(&dataset, &dimension, &column, config)
                .await?;
            if stored.is_configured {
                state.mark_configured(dimension.clone(), &column);
            } else {
                state.unmark_configured(&dimension, &column);
            }
            save_working_state(&checks_path, &state)?;

            println!(
                "✅ {}:{} stored for '{}' ({})",
                dimension,
                column,
                dataset,
                status_label(stored.is_configured)
            );
        }

        ConfigAction::Remove {
            dataset,
            dimension,
            column,
        } => {
            let removed = service.remove(&dataset, &dimension, &column)?;

            // The column goes back to the available pool
            let checks_path = ctx.checks_path();
            let mut state = load_working_state(&checks_path)?;
            let unassigned = state.dimension_of(&column) == Some(&dimension);
            if unassigned {
                state.unassign(&column);
                save_working_state(&checks_path, &state)?;
            }

            if removed || unassigned {
                println!("🗑️  Removed {}:{} from '{}'", dimension, column, dataset);
            } else {
                println!(
                    "ℹ️  Nothing stored for {}:{} on '{}'",
                    dimension, column, dataset
                );
            }
        }

        ConfigAction::List { dataset } => {
            let entries = service.list(&dataset)?;
            if entries.is_empty() {
                println!("ℹ️  No configuration stored for '{}'", dataset);
                return Ok(());
            }
            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED).set_header(vec![
                Cell::new("Dimension").add_attribute(Attribute::Bold),
                Cell::new("Column").add_attribute(Attribute::Bold),
                Cell::new("Status").add_attribute(Attribute::Bold),
                Cell::new("Updated").add_attribute(Attribute::Bold),
            ]);
            for (key, stored) in &entries {
                table.add_row(vec![
                    Cell::new(&key.dimension),
                    Cell::new(&key.column),
                    Cell::new(status_label(stored.is_configured)).fg(if stored.is_configured {
                        Color::Green
                    } else {
                        Color::Yellow
                    }),
                    Cell::new(stored.updated_at.format("%Y-%m-%d %H:%M")),
                ]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}

fn status_label(is_configured: bool) -> &'static str {
    if is_configured { "configured" } else { "pending" }
}

fn read_upload(file: &Path, match_column: &str) -> anyhow::Result<ColumnConfig> {
    let blob =
        fs::read_to_string(file).with_context(|| format!("Failed to read {:?}", file))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let config = consistency_from_upload(&blob, match_column, file_name)
        .with_context(|| format!("Invalid reference file {:?}", file))?;
    Ok(config)
}

