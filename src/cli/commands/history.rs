//! History command implementation.

use crate::core::undo::UndoManager;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// List the undo history, most recent first.
pub async fn history(history: &Path, clear: bool) -> Result<()> {
    let mut manager = UndoManager::load(history)?;

    if clear {
        let count = manager.len();
        manager.clear();
        manager.save(history)?;
        println!("{} {} batch(es) removed", "[OK]".green(), count);
        return Ok(());
    }

    println!("{}", "[History]".bold().cyan());
    println!("  {} {}", "File:".bold(), history.display());
    println!();

    if manager.is_empty() {
        println!("  No batches to undo");
        return Ok(());
    }

    for (idx, record) in manager.records().iter().rev().enumerate() {
        let marker = if idx == 0 { "(next)".green() } else { "".normal() };
        println!(
            "  {}. {} {} {}",
            idx + 1,
            record.executed_at.dimmed(),
            record.description,
            marker
        );
        let name_only = record.name_only_count();
        if name_only > 0 {
            println!(
                "     {} {} entries restore names only",
                "[NOTE]".yellow(),
                name_only
            );
        }
    }

    Ok(())
}
