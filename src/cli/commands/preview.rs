//! Preview command implementation.
//!
//! Plans a batch and prints it. Nothing on disk is renamed; the plan can be
//! saved and executed later.

use crate::cli::args::BatchArgs;
use crate::cli::batch;
use crate::core::planner;
use crate::models::config::Settings;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Plan a batch and print what it would do.
pub async fn preview(
    dir: Option<&Path>,
    args: &BatchArgs,
    output: Option<&Path>,
    mut settings: Settings,
) -> Result<()> {
    println!("{}", "[PREVIEW] Planning batch...".bold().cyan());
    println!();

    let options = batch::resolve_options(dir, args, &mut settings)?;
    let plan = batch::build_plan(&options)?;
    batch::print_plan(&plan);

    if let Some(output) = output {
        planner::save_plan(&plan, output)?;
        println!();
        println!("{} {}", "[OK] Plan saved to:".bold().green(), output.display());

        println!();
        println!("{}", "[Next Steps]".bold().yellow());
        println!(
            "  Execute the plan: {}",
            format!("batch-renamer execute {}", output.display()).cyan()
        );
    }

    Ok(())
}
