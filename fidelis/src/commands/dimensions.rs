// fidelis/src/commands/dimensions.rs
//
// USE CASE: List the dimension registry (built-ins + project dimensions).

use anyhow::Context;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use std::path::PathBuf;

use fidelis_core::domain::dimension::DimensionRegistry;
use fidelis_core::infrastructure::config::load_project_config;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    let registry = config.registry();

    println!("📐 Dimensions of '{}'", config.name);
    println!("{}", render_registry(&registry));
    Ok(())
}

pub fn render_registry(registry: &DimensionRegistry) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(vec![
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Weight").add_attribute(Attribute::Bold),
        Cell::new("Enabled").add_attribute(Attribute::Bold),
        Cell::new("Needs config").add_attribute(Attribute::Bold),
    ]);
    for definition in registry.definitions() {
        table.add_row(vec![
            Cell::new(&definition.key),
            Cell::new(&definition.name),
            Cell::new(definition.weight).set_alignment(CellAlignment::Right),
            Cell::new(if definition.enabled { "yes" } else { "no" }),
            Cell::new(if registry.is_self_sufficient(&definition.key) {
                "no"
            } else {
                "yes"
            }),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use fidelis_core::domain::dimension::{DimensionDefinition, DimensionKey};

    #[test]
    fn test_render_registry_lists_custom_dimensions() {
        let mut registry = DimensionRegistry::builtin();
        registry.register(DimensionDefinition::new(
            DimensionKey::Custom("freshness_v2".into()),
            "Freshness",
            "",
        ));
        let rendered = render_registry(&registry).to_string();
        assert!(rendered.contains("completeness"));
        assert!(rendered.contains("freshness_v2"));
        assert_eq!(rendered.matches("Needs config").count(), 1);
    }
}
