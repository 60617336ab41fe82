//! Rename command implementation.
//!
//! Plans a batch, executes it and records it in the undo history.

use crate::cli::args::BatchArgs;
use crate::cli::batch;
use crate::cli::commands::undo::{open_history, record_batch};
use crate::core::executor::Executor;
use crate::models::config::{self, Settings};
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Plan and execute a batch.
pub async fn rename(
    dir: Option<&Path>,
    args: &BatchArgs,
    remember: bool,
    history: &Path,
    mut settings: Settings,
) -> Result<()> {
    println!("{}", "[RENAME] Renaming files...".bold().cyan());
    println!();

    let options = batch::resolve_options(dir, args, &mut settings)?;
    let mut history_stack = open_history(history, settings.max_undo_depth)?;
    let mut plan = batch::build_plan(&options)?;

    if plan.actionable() == 0 {
        batch::print_plan(&plan);
        println!();
        println!("{}", "[INFO] Nothing to do".yellow());
        return Ok(());
    }

    if options.planner.conversion.as_ref().is_some_and(|c| !c.keep_original) {
        println!(
            "{}",
            "[WARNING] Converted files replace their originals; undo restores names only."
                .bold()
                .yellow()
        );
    }
    if args.overwrite {
        println!(
            "{}",
            "[WARNING] Existing files will be overwritten and cannot be recovered!"
                .bold()
                .yellow()
        );
    }

    let report = Executor::new().execute(&mut plan).await?;
    batch::print_plan(&plan);
    println!();
    report.print_summary();

    if let Some(record) = report.undo_record {
        record_batch(&mut history_stack, record, history)?;
        println!();
        println!(
            "  To undo this batch: {}",
            "batch-renamer undo".cyan()
        );
    }

    if remember {
        let path = config::config_file_path();
        config::save_config(&settings, &path)?;
        println!("{} {}", "[OK] Settings saved to:".bold().green(), path.display());
    }

    if !report.summary.is_success() {
        return Err(crate::Error::other(format!(
            "{} file(s) failed",
            report.summary.failed
        )));
    }

    Ok(())
}
