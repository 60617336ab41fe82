//! Command line interface.

pub mod args;
pub mod batch;
pub mod commands;
