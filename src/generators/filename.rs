//! Filename generator.
//!
//! Parses naming templates such as `{date}_{n:03d}` and expands them per file.
//!
//! Placeholders:
//! - `{n}` sequence counter, `{i}` 1-based position
//! - `{name}` original stem, `{ext}` original extension (no dot)
//! - `{date}` `YYYYMMDD`, `{time}` `HHMMSS`, `{year}` `{month}` `{day}`
//! - `{file_date}` `{file_year}` `{file_month}` `{file_day}` from the modified time
//! - `{size}` bytes, `{parent}` parent directory name
//!
//! A field may carry a format spec `[0][width][d]`, e.g. `{n:03d}`. `{{` and `}}` are literal braces.

use crate::error::TemplateError;
use crate::models::conversion::TargetFormat;
use crate::models::file::SourceFile;
use chrono::{Datelike, Local, NaiveDateTime};

/// Longest width a field may request.
const MAX_WIDTH: usize = 255;

/// Built-in templates, by preset name.
pub const TEMPLATE_PRESETS: &[(&str, &str)] = &[
    ("sequential", "file_{n:03d}"),
    ("date-sequential", "{date}_{n:03d}"),
    ("original-number", "{name}_{n:02d}"),
    ("timestamp", "{date}_{time}_{n:02d}"),
];

/// Look up a built-in template by preset name.
pub fn preset_template(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    TEMPLATE_PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, template)| *template)
}

/// Substitution values for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    /// Sequence counter value.
    pub sequence: u64,
    /// 1-based position in the plan.
    pub position: usize,
    /// Original stem.
    pub stem: String,
    /// Original extension without the dot.
    pub extension: String,
    /// Parent directory name.
    pub parent: String,
    /// Size in bytes.
    pub size: u64,
    /// Modified time, local.
    pub modified: NaiveDateTime,
    /// Batch time, local.
    pub now: NaiveDateTime,
}

impl TemplateContext {
    /// Build the context for `file` at the given batch position.
    pub fn for_file(file: &SourceFile, sequence: u64, position: usize, now: NaiveDateTime) -> Self {
        Self {
            sequence,
            position,
            stem: file.stem(),
            extension: file.extension(),
            parent: file.parent_name(),
            size: file.size,
            modified: file.modified.with_timezone(&Local).naive_local(),
            now,
        }
    }
}

/// Placeholder keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Sequence,
    Position,
    Name,
    Ext,
    Date,
    Time,
    Year,
    Month,
    Day,
    FileDate,
    FileYear,
    FileMonth,
    FileDay,
    Size,
    Parent,
}

impl Key {
    fn parse(s: &str) -> Option<Self> {
        let key = match s {
            "n" => Key::Sequence,
            "i" => Key::Position,
            "name" => Key::Name,
            "ext" => Key::Ext,
            "date" => Key::Date,
            "time" => Key::Time,
            "year" => Key::Year,
            "month" => Key::Month,
            "day" => Key::Day,
            "file_date" => Key::FileDate,
            "file_year" => Key::FileYear,
            "file_month" => Key::FileMonth,
            "file_day" => Key::FileDay,
            "size" => Key::Size,
            "parent" => Key::Parent,
            _ => return None,
        };
        Some(key)
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            Key::Sequence
                | Key::Position
                | Key::Year
                | Key::Month
                | Key::Day
                | Key::FileYear
                | Key::FileMonth
                | Key::FileDay
                | Key::Size
        )
    }

    fn value(self, ctx: &TemplateContext) -> Value {
        match self {
            Key::Sequence => Value::Int(ctx.sequence),
            Key::Position => Value::Int(ctx.position as u64),
            Key::Name => Value::Text(ctx.stem.clone()),
            Key::Ext => Value::Text(ctx.extension.clone()),
            Key::Date => Value::Text(ctx.now.format("%Y%m%d").to_string()),
            Key::Time => Value::Text(ctx.now.format("%H%M%S").to_string()),
            Key::Year => Value::Int(ctx.now.year().max(0) as u64),
            Key::Month => Value::Int(ctx.now.month() as u64),
            Key::Day => Value::Int(ctx.now.day() as u64),
            Key::FileDate => Value::Text(ctx.modified.format("%Y%m%d").to_string()),
            Key::FileYear => Value::Int(ctx.modified.year().max(0) as u64),
            Key::FileMonth => Value::Int(ctx.modified.month() as u64),
            Key::FileDay => Value::Int(ctx.modified.day() as u64),
            Key::Size => Value::Int(ctx.size),
            Key::Parent => Value::Text(ctx.parent.clone()),
        }
    }
}

enum Value {
    Int(u64),
    Text(String),
}

/// Parsed `[0][width][d]` spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Spec {
    zero: bool,
    width: usize,
}

impl Spec {
    fn parse(key_name: &str, key: Key, raw: &str) -> Result<Self, TemplateError> {
        let invalid = || TemplateError::InvalidSpec {
            key: key_name.to_string(),
            spec: raw.to_string(),
        };

        let (body, numeric) = match raw.strip_suffix('d') {
            Some(body) => (body, true),
            None => (raw, false),
        };
        if numeric && !key.is_numeric() {
            return Err(TemplateError::NumericSpecOnText {
                key: key_name.to_string(),
            });
        }

        let (zero, digits) = match body.strip_prefix('0') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let width = if digits.is_empty() {
            0
        } else {
            digits.parse::<usize>().map_err(|_| invalid())?
        };
        if width > MAX_WIDTH {
            return Err(invalid());
        }

        Ok(Self { zero, width })
    }

    fn apply(self, value: Value) -> String {
        let fill = if self.zero { '0' } else { ' ' };
        match value {
            Value::Int(n) => {
                let digits = n.to_string();
                let pad = self.width.saturating_sub(digits.len());
                let mut out: String = std::iter::repeat(fill).take(pad).collect();
                out.push_str(&digits);
                out
            }
            Value::Text(s) => {
                let pad = self.width.saturating_sub(s.chars().count());
                let mut out = s;
                out.extend(std::iter::repeat(fill).take(pad));
                out
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { key: Key, spec: Spec },
}

/// A parsed naming template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl NameTemplate {
    /// Parse a template, rejecting unknown keys and malformed fields.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if template.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|&(_, next)| next) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut field = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => break,
                            _ => field.push(inner),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::UnbalancedBrace { brace: '{', position });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_field(&field)?);
                }
                '}' if chars.peek().map(|&(_, next)| next) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::UnbalancedBrace { brace: '}', position }),
                '/' | '\\' => return Err(TemplateError::PathSeparator(c)),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Expand for one file. Deterministic for a given context.
    pub fn expand(&self, ctx: &TemplateContext) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { key, spec } => out.push_str(&spec.apply(key.value(ctx))),
            }
        }
        out
    }

    /// Expand and apply the extension policy, producing the final file name.
    pub fn render(
        &self,
        ctx: &TemplateContext,
        file: &SourceFile,
        convert_to: Option<TargetFormat>,
    ) -> Result<String, TemplateError> {
        let name = apply_extension(self.expand(ctx), &file.suffix(), convert_to);
        if name.is_empty() || name == "." || name == ".." {
            return Err(TemplateError::EmptyName(file.file_name()));
        }
        Ok(name)
    }
}

fn parse_field(field: &str) -> Result<Segment, TemplateError> {
    let (name, raw_spec) = match field.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (field, None),
    };
    let key = Key::parse(name).ok_or_else(|| TemplateError::UnknownKey(name.to_string()))?;
    let spec = match raw_spec {
        Some(raw) => Spec::parse(name, key, raw)?,
        None => Spec::default(),
    };
    Ok(Segment::Field { key, spec })
}

/// Parse and expand in one step.
pub fn expand(template: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
    Ok(NameTemplate::parse(template)?.expand(ctx))
}

/// Make sure the name ends with exactly one extension.
///
/// `original_suffix` includes the dot (e.g. `.png`) or is empty.
/// Plain renames keep the original extension; conversions swap it for the target's.
pub fn apply_extension(
    mut name: String,
    original_suffix: &str,
    convert_to: Option<TargetFormat>,
) -> String {
    match convert_to {
        Some(format) => {
            let target_suffix = format!(".{}", format.extension());
            if !name.ends_with(&target_suffix) {
                if !original_suffix.is_empty() && name.ends_with(original_suffix) {
                    name.truncate(name.len() - original_suffix.len());
                }
                name.push_str(&target_suffix);
            }
            name
        }
        None => {
            if !name.ends_with(original_suffix) {
                name.push_str(original_suffix);
            }
            name
        }
    }
}
