//! Batch Renamer Library
//!
//! Plans, executes and undoes batch renames of files, with optional image
//! format conversion.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod utils;

pub use error::{ConversionError, Error, Result, TemplateError};
