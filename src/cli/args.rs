//! Command line argument definitions.

use crate::models::conversion::TargetFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Batch Renamer - Rename and convert files in bulk, with undo
#[derive(Parser, Debug)]
#[command(name = "batch-renamer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Undo history file (overrides the configured one)
    #[arg(long, global = true, value_name = "FILE")]
    pub history: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what a batch would do without touching any file
    Preview {
        /// Directory containing the files
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,

        #[command(flatten)]
        batch: BatchArgs,

        /// Save the plan to a JSON file
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Rename (and optionally convert) the files of a directory
    Rename {
        /// Directory containing the files
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,

        #[command(flatten)]
        batch: BatchArgs,

        /// Store the options used as the new defaults
        #[arg(long)]
        remember: bool,
    },

    /// Execute a saved plan file
    Execute {
        /// Path to the plan JSON file
        #[arg(value_name = "PLAN_FILE")]
        plan_file: PathBuf,
    },

    /// Undo the most recent batch
    Undo,

    /// List the batches that can be undone
    History {
        /// Remove every entry from the history
        #[arg(long)]
        clear: bool,
    },
}

/// Options shared by the commands that build a batch.
#[derive(Args, Debug, Default, Clone)]
pub struct BatchArgs {
    /// Naming template, e.g. "photo_{n:03d}"
    #[arg(short, long, value_name = "TEMPLATE", conflicts_with = "template_preset")]
    pub template: Option<String>,

    /// Built-in template: sequential, date-sequential, original-number, timestamp
    #[arg(long, value_name = "NAME")]
    pub template_preset: Option<String>,

    /// First sequence number
    #[arg(short, long, value_name = "N")]
    pub start: Option<u64>,

    /// Comma-separated glob patterns, e.g. "*.jpg, *.png"
    #[arg(short, long, value_name = "GLOBS", conflicts_with = "preset")]
    pub pattern: Option<String>,

    /// File type preset: images, documents, audio, video, code, archives, all
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Only scan the top-level directory
    #[arg(long, conflicts_with = "recursive")]
    pub no_recursive: bool,

    /// Scan subdirectories
    #[arg(long)]
    pub recursive: bool,

    /// Only include files whose name contains this text
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Match --search case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Convert images to this format (jpeg, png, gif, bmp, webp)
    #[arg(long, value_name = "FORMAT", num_args = 0..=1)]
    pub convert: Option<Option<TargetFormat>>,

    /// Encoder quality for JPEG (1-100)
    #[arg(long, value_name = "Q", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// PNG compression level (0-9)
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=9))]
    pub png_compression: Option<u8>,

    /// Resize converted images to fit WIDTHxHEIGHT
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_dimensions)]
    pub resize: Option<(u32, u32)>,

    /// Stretch to the exact --resize dimensions instead of keeping the aspect ratio
    #[arg(long, requires = "resize")]
    pub stretch: bool,

    /// Keep the original next to the converted copy
    #[arg(long)]
    pub keep_original: bool,

    /// Replace existing files instead of skipping them (cannot be fully undone)
    #[arg(long)]
    pub overwrite: bool,
}

/// Parse a `WIDTHxHEIGHT` pair.
pub fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .to_lowercase()
        .split_once('x')
        .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;

    let width: u32 = width
        .parse()
        .map_err(|_| format!("invalid width '{}'", width))?;
    let height: u32 = height
        .parse()
        .map_err(|_| format!("invalid height '{}'", height))?;

    if width == 0 || height == 0 {
        return Err("dimensions must be positive".to_string());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("800x600"), Ok((800, 600)));
        assert_eq!(parse_dimensions("1920X1080"), Ok((1920, 1080)));
        assert!(parse_dimensions("800").is_err());
        assert!(parse_dimensions("0x600").is_err());
        assert!(parse_dimensions("ax600").is_err());
    }

    #[test]
    fn test_convert_flag_without_value() {
        let cli = Cli::try_parse_from(["batch-renamer", "preview", "/tmp", "--convert"]).unwrap();
        match cli.command {
            Commands::Preview { batch, .. } => assert_eq!(batch.convert, Some(None)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_convert_flag_with_format() {
        let cli = Cli::try_parse_from([
            "batch-renamer",
            "rename",
            "/tmp",
            "--convert",
            "webp",
            "--resize",
            "64x64",
        ])
        .unwrap();
        match cli.command {
            Commands::Rename { batch, .. } => {
                assert_eq!(batch.convert, Some(Some(TargetFormat::Webp)));
                assert_eq!(batch.resize, Some((64, 64)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_template_and_preset_conflict() {
        let result = Cli::try_parse_from([
            "batch-renamer",
            "preview",
            "-t",
            "a_{n}",
            "--template-preset",
            "sequential",
        ]);
        assert!(result.is_err());
    }
}
