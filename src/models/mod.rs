//! Data models.

pub mod config;
pub mod conversion;
pub mod file;
pub mod plan;
pub mod undo;
