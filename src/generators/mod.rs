//! Name generation.

pub mod filename;
