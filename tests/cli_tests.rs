//! Integration tests for the CLI commands and their undo history handling.

use batch_renamer::cli::args::BatchArgs;
use batch_renamer::cli::commands::{execute, rename, undo};
use batch_renamer::core::planner::{self, Planner};
use batch_renamer::core::undo::UndoManager;
use batch_renamer::models::config::Settings;
use batch_renamer::models::file::SourceFile;
use std::fs;
use tempfile::TempDir;

fn args(template: &str) -> BatchArgs {
    BatchArgs {
        template: Some(template.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_rename_then_undo_through_history() {
    let files = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let history = state.path().join("history.json");
    fs::write(files.path().join("a.txt"), "a").unwrap();

    rename::rename(
        Some(files.path()),
        &args("file_{n:03d}"),
        false,
        &history,
        Settings::default(),
    )
    .await
    .unwrap();

    assert!(files.path().join("file_001.txt").exists());
    assert_eq!(UndoManager::load(&history).unwrap().len(), 1);

    undo::undo(&history, 50).await.unwrap();

    assert!(files.path().join("a.txt").exists());
    assert!(!files.path().join("file_001.txt").exists());
    assert!(UndoManager::load(&history).unwrap().is_empty());
}

#[tokio::test]
async fn test_rename_with_corrupt_history_touches_nothing() {
    let files = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let history = state.path().join("history.json");
    fs::write(&history, "{ truncated").unwrap();
    fs::write(files.path().join("a.txt"), "a").unwrap();

    let result = rename::rename(
        Some(files.path()),
        &args("file_{n:03d}"),
        false,
        &history,
        Settings::default(),
    )
    .await;

    assert!(result.is_err());
    assert!(files.path().join("a.txt").exists());
    assert!(!files.path().join("file_001.txt").exists());
    assert_eq!(fs::read_to_string(&history).unwrap(), "{ truncated");
}

#[tokio::test]
async fn test_execute_with_corrupt_history_touches_nothing() {
    let files = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let history = state.path().join("history.json");
    fs::write(&history, "not json").unwrap();

    let source = files.path().join("a.txt");
    fs::write(&source, "a").unwrap();
    let plan = Planner::new("renamed")
        .unwrap()
        .plan(&[SourceFile::snapshot(&source).unwrap()])
        .unwrap();
    let plan_path = state.path().join("plan.json");
    planner::save_plan(&plan, &plan_path).unwrap();

    let result = execute::execute_plan(&plan_path, &history, 50).await;

    assert!(result.is_err());
    assert!(source.exists());
    assert!(!files.path().join("renamed.txt").exists());
}

#[tokio::test]
async fn test_execute_records_partial_batch() {
    let files = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    let history = state.path().join("history.json");

    let a = files.path().join("a.txt");
    let b = files.path().join("b.txt");
    fs::write(&a, "a").unwrap();
    fs::write(&b, "b").unwrap();
    let sources = vec![
        SourceFile::snapshot(&a).unwrap(),
        SourceFile::snapshot(&b).unwrap(),
    ];
    let plan = Planner::new("file_{n}").unwrap().plan(&sources).unwrap();
    let plan_path = state.path().join("plan.json");
    planner::save_plan(&plan, &plan_path).unwrap();

    // The second rename fails because its source is gone.
    fs::remove_file(&b).unwrap();

    let result = execute::execute_plan(&plan_path, &history, 50).await;

    assert!(result.is_err());
    let manager = UndoManager::load(&history).unwrap();
    assert_eq!(manager.peek().unwrap().entries.len(), 1);
    assert!(files.path().join("file_1.txt").exists());
}
