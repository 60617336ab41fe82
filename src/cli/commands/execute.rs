//! Execute command implementation.
//!
//! Reads a saved plan file and executes it, recording the batch in the undo
//! history.

use crate::cli::batch;
use crate::cli::commands::undo::{open_history, record_batch};
use crate::core::executor::Executor;
use crate::core::planner;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Execute a plan file.
pub async fn execute_plan(plan_file: &Path, history: &Path, max_undo_depth: usize) -> Result<()> {
    println!("{}", "[EXEC] Executing plan...".bold().cyan());
    println!();

    if !plan_file.exists() {
        return Err(crate::Error::PathNotFound(plan_file.display().to_string()));
    }

    println!("[INFO] Loading plan: {}", plan_file.display());
    let mut plan = planner::load_plan(plan_file)?;
    let mut history_stack = open_history(history, max_undo_depth)?;

    println!("  {} {}", "Template:".bold(), plan.template);
    println!("  {} {}", "Created:".bold(), plan.created_at);
    println!("  {} {}", "Items:".bold(), plan.items.len());
    if let Some(conversion) = &plan.conversion {
        println!("  {} {}", "Convert to:".bold(), conversion.format);
    }
    println!();

    let report = Executor::new().execute(&mut plan).await?;
    batch::print_plan(&plan);
    println!();
    report.print_summary();

    let success = report.is_success();
    if let Some(record) = report.undo_record {
        record_batch(&mut history_stack, record, history)?;
    }

    if !success {
        return Err(crate::Error::other(format!(
            "{} file(s) failed",
            report.summary.failed
        )));
    }

    Ok(())
}
