// fidelis/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::run::RunArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr: stdout carries tables and `--format json` output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            dataset,
            checks,
            template,
            details,
            format,
            fail_under,
        } => {
            commands::run::execute(RunArgs {
                project_dir,
                dataset,
                checks,
                template,
                details,
                format,
                fail_under,
            })
            .await?
        }
        Commands::Assign {
            project_dir,
            dimension,
            column,
            dataset,
        } => commands::assign::execute(project_dir, dimension, column, dataset).await?,
        Commands::Config {
            project_dir,
            action,
        } => commands::config::execute(project_dir, action).await?,
        Commands::Template {
            project_dir,
            action,
        } => commands::template::execute(project_dir, action)?,
        Commands::Dimensions { project_dir } => commands::dimensions::execute(project_dir)?,
        Commands::Inspect {
            project_dir,
            dataset,
            limit,
        } => commands::inspect::execute(project_dir, dataset, limit).await?,
    }

    Ok(())
}
