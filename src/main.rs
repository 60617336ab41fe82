//! Batch Renamer CLI
//!
//! A command-line tool for renaming and converting files in bulk, with undo.

use batch_renamer::cli::{
    args::{Cli, Commands},
    batch::history_path,
    commands::{execute, history, preview, rename, undo},
};
use batch_renamer::models::config;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let settings = config::load_config();
    let history_file = history_path(cli.history.as_deref(), &settings);
    let max_undo_depth = settings.max_undo_depth;

    match cli.command {
        Commands::Preview { dir, batch, output } => {
            preview::preview(dir.as_deref(), &batch, output.as_deref(), settings).await?;
        }

        Commands::Rename { dir, batch, remember } => {
            rename::rename(dir.as_deref(), &batch, remember, &history_file, settings).await?;
        }

        Commands::Execute { plan_file } => {
            execute::execute_plan(&plan_file, &history_file, max_undo_depth).await?;
        }

        Commands::Undo => {
            undo::undo(&history_file, max_undo_depth).await?;
        }

        Commands::History { clear } => {
            history::history(&history_file, clear).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("batch_renamer=debug")
    } else {
        EnvFilter::new("batch_renamer=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
