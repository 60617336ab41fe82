//! Plan generation module.
//!
//! Turns an ordered list of source files and a naming template into an
//! ordered plan. Nothing on disk is modified; the only filesystem access is
//! listing the source directories to seed the conflict set.

use crate::core::conflict::ConflictResolver;
use crate::generators::filename::{NameTemplate, TemplateContext};
use crate::models::conversion::{is_image_file, ConversionSettings};
use crate::models::file::SourceFile;
use crate::models::plan::{ConflictPolicy, OperationKind, Outcome, Plan, PlannedOperation};
use crate::Result;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Current plan format version.
pub const PLAN_VERSION: &str = "1.0";

/// Planner configuration.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// First sequence number.
    pub start_number: u64,
    /// Image conversion, if enabled.
    pub conversion: Option<ConversionSettings>,
    /// How to treat targets that already exist on disk.
    pub conflict_policy: ConflictPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            start_number: 1,
            conversion: None,
            conflict_policy: ConflictPolicy::Skip,
        }
    }
}

/// Plan generator.
#[derive(Debug, Clone)]
pub struct Planner {
    template: NameTemplate,
    config: PlannerConfig,
}

impl Planner {
    /// Create a planner with default configuration.
    ///
    /// Fails if the template is malformed.
    pub fn new(template: &str) -> Result<Self> {
        Self::with_config(template, PlannerConfig::default())
    }

    /// Create a planner with custom configuration.
    pub fn with_config(template: &str, config: PlannerConfig) -> Result<Self> {
        Ok(Self {
            template: NameTemplate::parse(template)?,
            config,
        })
    }

    /// Planner configuration in use.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan using the current local time for date placeholders.
    pub fn plan(&self, sources: &[SourceFile]) -> Result<Plan> {
        self.plan_at(sources, Local::now().naive_local())
    }

    /// Plan with a fixed batch time.
    pub fn plan_at(&self, sources: &[SourceFile], now: NaiveDateTime) -> Result<Plan> {
        let resolver = ConflictResolver::from_disk(self.config.conflict_policy, sources)?;
        self.plan_with_resolver(sources, now, resolver)
    }

    /// Plan against an explicit resolver.
    pub fn plan_with_resolver(
        &self,
        sources: &[SourceFile],
        now: NaiveDateTime,
        mut resolver: ConflictResolver,
    ) -> Result<Plan> {
        tracing::info!(
            "Planning {} files with template '{}'",
            sources.len(),
            self.template.as_str()
        );

        let start = self.config.start_number;
        let last_offset = sources.len().saturating_sub(1) as u64;
        if start.checked_add(last_offset).is_none() {
            return Err(crate::Error::other(format!(
                "start number {} overflows for {} files",
                start,
                sources.len()
            )));
        }

        let mut items = Vec::with_capacity(sources.len());

        for (idx, source) in sources.iter().enumerate() {
            let position = idx + 1;
            // Bounded by the check above.
            let sequence = start + idx as u64;

            let conversion = self
                .config
                .conversion
                .as_ref()
                .filter(|_| is_image_file(&source.path));
            let kind = if conversion.is_some() {
                OperationKind::Convert
            } else {
                OperationKind::Rename
            };

            let ctx = TemplateContext::for_file(source, sequence, position, now);
            let name = self
                .template
                .render(&ctx, source, conversion.map(|c| c.format))?;
            let target = source.parent_dir().join(name);
            let decision = resolver.resolve(&target, &source.path);

            tracing::debug!(
                "Plan [{}]: {} -> {} ({}, {:?})",
                position,
                source.path.display(),
                target.display(),
                kind,
                decision
            );

            items.push(PlannedOperation {
                position,
                sequence,
                source: source.clone(),
                target,
                kind,
                decision,
                outcome: Outcome::Pending,
            });
        }

        let plan = Plan {
            version: PLAN_VERSION.to_string(),
            created_at: Local::now().to_rfc3339(),
            template: self.template.as_str().to_string(),
            start_number: self.config.start_number,
            conversion: self.config.conversion.clone(),
            conflict_policy: self.config.conflict_policy,
            items,
        };

        tracing::info!(
            "Plan ready: {} items, {} actionable",
            plan.items.len(),
            plan.actionable()
        );
        Ok(plan)
    }
}

/// Generate a plan (convenience function).
pub fn generate_plan(
    sources: &[SourceFile],
    template: &str,
    conversion: Option<ConversionSettings>,
) -> Result<Plan> {
    let config = PlannerConfig {
        conversion,
        ..PlannerConfig::default()
    };
    Planner::with_config(template, config)?.plan(sources)
}

/// Save a plan to a JSON file.
pub fn save_plan(plan: &Plan, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;

    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(json.as_bytes())?;

    tracing::info!("Plan saved to {:?}", path);
    Ok(())
}

/// Load a plan from a JSON file.
pub fn load_plan(path: &Path) -> Result<Plan> {
    let content = fs::read_to_string(path)?;
    let plan: Plan = serde_json::from_str(&content)
        .map_err(|e| crate::Error::InvalidPlanFile(format!("{}: {}", path.display(), e)))?;

    if plan.version != PLAN_VERSION {
        return Err(crate::Error::InvalidPlanFile(format!(
            "{}: unsupported version '{}'",
            path.display(),
            plan.version
        )));
    }
    Ok(plan)
}

/// Get the default plan output path inside `dir`.
pub fn default_plan_path(dir: &Path) -> PathBuf {
    let filename = format!("plan_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    dir.join(filename)
}
