//! Batch construction shared by the `preview` and `rename` commands.
//!
//! Merges command line options over the stored settings, scans the
//! directory and builds the plan.

use crate::cli::args::BatchArgs;
use crate::core::planner::{Planner, PlannerConfig};
use crate::core::scanner::{self, ScanConfig};
use crate::generators::filename::preset_template;
use crate::models::config::Settings;
use crate::models::conversion::ConversionSettings;
use crate::models::plan::{ConflictPolicy, Decision, Outcome, Plan};
use crate::utils::fs::format_size;
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Everything needed to plan one batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub directory: PathBuf,
    pub template: String,
    pub scan: ScanConfig,
    pub planner: PlannerConfig,
}

impl BatchArgs {
    /// Write the persistent options given on the command line into `settings`.
    pub fn apply_to(&self, settings: &mut Settings) -> Result<()> {
        if let Some(name) = &self.template_preset {
            let template = preset_template(name)
                .ok_or_else(|| crate::Error::other(format!("unknown template preset '{}'", name)))?;
            settings.rename_template = template.to_string();
        }
        if let Some(template) = &self.template {
            settings.rename_template = template.clone();
        }
        if let Some(start) = self.start {
            settings.start_number = start;
        }
        if let Some(preset) = &self.preset {
            settings.preset = preset.clone();
            settings.pattern.clear();
        }
        if let Some(pattern) = &self.pattern {
            settings.pattern = pattern.clone();
        }
        if self.recursive {
            settings.recursive = true;
        }
        if self.no_recursive {
            settings.recursive = false;
        }
        if self.case_sensitive {
            settings.case_sensitive = true;
        }
        if let Some(Some(format)) = self.convert {
            settings.convert_format = format;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        Ok(())
    }

    /// Conversion settings, if `--convert` was given.
    pub fn conversion(&self, settings: &Settings) -> Option<ConversionSettings> {
        if self.convert.is_none() {
            return None;
        }

        let mut conversion = ConversionSettings::new(settings.convert_format);
        conversion.quality = settings.quality;
        if let Some(level) = self.png_compression {
            conversion.png_compression = level;
        }
        if let Some((width, height)) = self.resize {
            conversion.resize = true;
            conversion.width = width;
            conversion.height = height;
            conversion.keep_aspect = !self.stretch;
        }
        conversion.keep_original = self.keep_original;
        Some(conversion)
    }
}

/// Resolve the options of a batch; `settings` receives the command line overrides.
pub fn resolve_options(
    dir: Option<&Path>,
    args: &BatchArgs,
    settings: &mut Settings,
) -> Result<BatchOptions> {
    args.apply_to(settings)?;

    let directory = dir
        .map(Path::to_path_buf)
        .or_else(|| settings.directory.clone())
        .ok_or_else(|| crate::Error::other("no directory given and none remembered"))?;
    settings.directory = Some(directory.clone());

    let mut scan = if settings.pattern.trim().is_empty() {
        ScanConfig::from_preset(&settings.preset).ok_or_else(|| {
            crate::Error::other(format!("unknown file type preset '{}'", settings.preset))
        })?
    } else {
        ScanConfig::from_pattern_list(&settings.pattern)
    };
    scan.recursive = settings.recursive;
    scan.search = args.search.clone();
    scan.case_sensitive = settings.case_sensitive;

    let planner = PlannerConfig {
        start_number: settings.start_number,
        conversion: args.conversion(settings),
        conflict_policy: if args.overwrite {
            ConflictPolicy::Overwrite
        } else {
            ConflictPolicy::Skip
        },
    };

    Ok(BatchOptions {
        directory,
        template: settings.rename_template.clone(),
        scan,
        planner,
    })
}

/// Scan the directory and plan the batch.
pub fn build_plan(options: &BatchOptions) -> Result<Plan> {
    println!("  {} {}", "Directory:".bold(), options.directory.display());
    println!("  {} {}", "Template:".bold(), options.template);
    println!("  {} {}", "Patterns:".bold(), options.scan.patterns.join(", "));
    if let Some(conversion) = &options.planner.conversion {
        println!("  {} {}", "Convert to:".bold(), conversion.format);
    }
    println!();

    let scan = scanner::scan_directory(&options.directory, &options.scan)?;
    let total_size: u64 = scan.files.iter().map(|f| f.size).sum();
    println!(
        "[INFO] Found {} matching files ({}) out of {} scanned",
        scan.files.len(),
        format_size(total_size),
        scan.total_files_scanned
    );

    let planner = Planner::with_config(&options.template, options.planner.clone())?;
    planner.plan(&scan.files)
}

/// Print every item of a plan with its decision or outcome.
pub fn print_plan(plan: &Plan) {
    println!();
    println!("{}", "[Plan]".bold().cyan());
    for item in &plan.items {
        let status = match (&item.outcome, item.decision) {
            (Outcome::Pending, Decision::Proceed) => "ready".green(),
            (Outcome::Pending, Decision::Overwrite) => "overwrite".yellow(),
            (Outcome::Pending, Decision::SkipExists) => "skip: exists".yellow(),
            (Outcome::Pending, Decision::NoChange) => "no change".dimmed(),
            (Outcome::Succeeded, _) => "done".green(),
            (Outcome::Failed(reason), _) => format!("failed: {}", reason).red(),
            (Outcome::Skipped(reason), _) => reason.as_str().yellow(),
            (Outcome::NoChange, _) => "no change".dimmed(),
        };
        println!(
            "  {:>4}. {} -> {} [{}] {}",
            item.position,
            item.original_name(),
            item.new_name().bold(),
            item.kind,
            status
        );
    }
    println!();
    println!(
        "  {} {} of {} items",
        "Actionable:".bold(),
        plan.actionable(),
        plan.items.len()
    );
}

/// History file to use: the command line override or the configured one.
pub fn history_path(cli_override: Option<&Path>, settings: &Settings) -> PathBuf {
    cli_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.history_file.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversion::TargetFormat;

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::default();
        let args = BatchArgs {
            template: Some("img_{n}".to_string()),
            start: Some(5),
            pattern: Some("*.png".to_string()),
            no_recursive: true,
            convert: Some(Some(TargetFormat::Webp)),
            quality: Some(70),
            ..Default::default()
        };
        args.apply_to(&mut settings).unwrap();

        assert_eq!(settings.rename_template, "img_{n}");
        assert_eq!(settings.start_number, 5);
        assert_eq!(settings.pattern, "*.png");
        assert!(!settings.recursive);
        assert_eq!(settings.convert_format, TargetFormat::Webp);
        assert_eq!(settings.quality, 70);
    }

    #[test]
    fn test_template_preset_lookup() {
        let mut settings = Settings::default();
        let args = BatchArgs {
            template_preset: Some("date-sequential".to_string()),
            ..Default::default()
        };
        args.apply_to(&mut settings).unwrap();
        assert_eq!(settings.rename_template, "{date}_{n:03d}");

        let args = BatchArgs {
            template_preset: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(args.apply_to(&mut settings).is_err());
    }

    #[test]
    fn test_conversion_uses_settings_format() {
        let mut settings = Settings::default();
        settings.convert_format = TargetFormat::Png;

        let args = BatchArgs {
            convert: Some(None),
            resize: Some((10, 20)),
            stretch: true,
            ..Default::default()
        };
        let conversion = args.conversion(&settings).unwrap();
        assert_eq!(conversion.format, TargetFormat::Png);
        assert!(conversion.resize);
        assert!(!conversion.keep_aspect);

        assert!(BatchArgs::default().conversion(&settings).is_none());
    }

    #[test]
    fn test_resolve_requires_directory() {
        let mut settings = Settings::default();
        let result = resolve_options(None, &BatchArgs::default(), &mut settings);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_remembers_directory() {
        let mut settings = Settings::default();
        let options =
            resolve_options(Some(Path::new("/data")), &BatchArgs::default(), &mut settings).unwrap();
        assert_eq!(options.directory, PathBuf::from("/data"));
        assert_eq!(settings.directory, Some(PathBuf::from("/data")));
        assert_eq!(options.scan.patterns, vec!["*"]);
        assert_eq!(options.planner.conflict_policy, ConflictPolicy::Skip);
    }
}
