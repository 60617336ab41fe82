//! Undo command implementation.
//!
//! Reverses the most recent batch stored in the undo history.

use crate::core::undo::UndoManager;
use crate::models::undo::UndoRecord;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Undo the most recent batch.
pub async fn undo(history: &Path, max_undo_depth: usize) -> Result<()> {
    println!("{}", "[UNDO] Undoing last batch".bold().cyan());
    println!();

    let mut manager = open_history(history, max_undo_depth)?;

    let Some(record) = manager.peek() else {
        println!("{}", "[INFO] Nothing to undo".yellow());
        return Ok(());
    };
    println!("  {} {}", "Batch:".bold(), record.description);
    println!("  {} {}", "Executed at:".bold(), record.executed_at);
    println!("  {} {}", "Entries:".bold(), record.entries.len());
    println!();

    let report = manager.undo_last()?;
    manager.save(history)?;

    report.print_summary();
    println!();

    if report.is_success() {
        println!("{}", "[OK] Undo completed".green());
    } else {
        println!(
            "{}",
            "[WARNING] Some files could not be restored. Check the errors above.".yellow()
        );
    }

    Ok(())
}

/// Load the undo history before a batch touches any file.
///
/// An unreadable history aborts the command, so a batch never runs without
/// a place to record it.
pub fn open_history(history: &Path, max_undo_depth: usize) -> Result<UndoManager> {
    let mut manager = UndoManager::load(history).map_err(|e| {
        crate::Error::other(format!(
            "cannot read undo history {}: {}",
            history.display(),
            e
        ))
    })?;
    manager.set_max_depth(max_undo_depth);
    Ok(manager)
}

/// Push a finished batch onto the undo history and persist it.
pub fn record_batch(manager: &mut UndoManager, record: UndoRecord, history: &Path) -> Result<()> {
    manager.push(record);
    manager.save(history)
}
