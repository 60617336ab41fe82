//! Core business logic modules.

pub mod conflict;
pub mod converter;
pub mod executor;
pub mod planner;
pub mod scanner;
pub mod undo;
