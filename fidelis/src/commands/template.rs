// fidelis/src/commands/template.rs
//
// USE CASE: Save, list and restore rule templates.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use std::path::PathBuf;

use fidelis_core::infrastructure::config::{load_working_state, save_working_state};

use super::ProjectContext;
use crate::cli::TemplateAction;

pub fn execute(project_dir: PathBuf, action: TemplateAction) -> anyhow::Result<()> {
    let ctx = ProjectContext::load(&project_dir)?;
    let manager = ctx.template_manager();
    let checks_path = ctx.checks_path();

    match action {
        TemplateAction::Save {
            name,
            description,
            dataset,
        } => {
            if let Some(dataset) = &dataset {
                ctx.ensure_dataset(dataset)?;
            }
            let state = load_working_state(&checks_path)?;
            let template = manager.save(&name, description, dataset.as_deref(), &state)?;
            println!(
                "📦 Template '{}' saved ({} columns)\n   Id: {}",
                template.name,
                template.column_count(),
                template.id
            );
        }

        TemplateAction::List { dataset } => {
            let templates = manager.list(dataset.as_deref())?;
            if templates.is_empty() {
                println!("ℹ️  No templates found in {}", ctx.templates.dir().display());
                return Ok(());
            }
            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED).set_header(vec![
                Cell::new("Id").add_attribute(Attribute::Bold),
                Cell::new("Name").add_attribute(Attribute::Bold),
                Cell::new("Dataset").add_attribute(Attribute::Bold),
                Cell::new("Columns").add_attribute(Attribute::Bold),
                Cell::new("Created").add_attribute(Attribute::Bold),
            ]);
            for template in &templates {
                table.add_row(vec![
                    Cell::new(&template.id),
                    Cell::new(&template.name),
                    Cell::new(template.dataset_id.as_deref().unwrap_or("-")),
                    Cell::new(template.column_count()).set_alignment(CellAlignment::Right),
                    Cell::new(template.created_at.format("%Y-%m-%d %H:%M")),
                ]);
            }
            println!("{}", table);
        }

        TemplateAction::Load { id } => {
            let state = manager.load(&id)?;
            save_working_state(&checks_path, &state)?;
            println!(
                "✅ Template {} loaded into {} ({} assignments)",
                id,
                checks_path.display(),
                state.assignments().len()
            );
        }
    }

    Ok(())
}
