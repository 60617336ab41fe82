//! CLI command implementations.

pub mod execute;
pub mod history;
pub mod preview;
pub mod rename;
pub mod undo;
