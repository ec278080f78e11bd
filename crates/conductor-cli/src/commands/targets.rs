//! `conductor targets` -- list a project's targets.

use std::path::Path;

use comfy_table::Table;

use conductor_types::target::TargetSpecifier;

/// Print the targets a project declares, with their builder identifiers.
pub async fn targets(workspace: &Path, project: &str) -> anyhow::Result<()> {
    let conductor = super::conductor(workspace).await?;
    let names = conductor.list_project_targets(project)?;

    let mut table = Table::new();
    table.set_header(vec!["TARGET", "BUILDER"]);
    for name in names {
        let config = conductor.builder_configuration(&TargetSpecifier::new(project, &name))?;
        table.add_row(vec![name, config.builder]);
    }
    println!("{table}");
    Ok(())
}
