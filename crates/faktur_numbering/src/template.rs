//! Template grammar: scanning, validation, and rendering.

use thiserror::Error;
use time::{Date, OffsetDateTime};

/// Padding widths must stay within this range.
const MIN_WIDTH: u32 = 1;
const MAX_WIDTH: u32 = 10;

/// Error raised when a template fails validation at a save gate.
#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    /// The template failed validation.
    #[error("invalid template: {}", errors.join("; "))]
    Invalid {
        /// The individual validation errors.
        errors: Vec<String>,
    },
}

/// A recognized placeholder variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    /// Configured document prefix.
    Prefix,
    /// Four-digit calendar year.
    Year,
    /// Two-digit year (`YEAR mod 100`).
    Yy,
    /// Calendar month, 1-12, unpadded unless a width is given.
    Month,
    /// Calendar day, 1-31.
    Day,
    /// Monotonic all-time counter.
    Number,
    /// Counter that resets each calendar year.
    NumberYear,
}

impl Variable {
    /// All recognized variables, in documentation order.
    pub const ALL: [Variable; 7] = [
        Variable::Prefix,
        Variable::Year,
        Variable::Yy,
        Variable::Month,
        Variable::Day,
        Variable::Number,
        Variable::NumberYear,
    ];

    /// Resolves a placeholder name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PREFIX" => Some(Self::Prefix),
            "YEAR" => Some(Self::Year),
            "YY" => Some(Self::Yy),
            "MONTH" => Some(Self::Month),
            "DAY" => Some(Self::Day),
            "NUMBER" => Some(Self::Number),
            "NUMBER_YEAR" => Some(Self::NumberYear),
            _ => None,
        }
    }

    /// The placeholder name as it appears in templates.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Prefix => "PREFIX",
            Self::Year => "YEAR",
            Self::Yy => "YY",
            Self::Month => "MONTH",
            Self::Day => "DAY",
            Self::Number => "NUMBER",
            Self::NumberYear => "NUMBER_YEAR",
        }
    }

    /// Whether this variable guarantees uniqueness across documents.
    #[must_use]
    pub fn is_counter(self) -> bool {
        matches!(self, Self::Number | Self::NumberYear)
    }
}

/// The value set a template is rendered against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variables {
    /// Configured prefix, e.g. `"INV"`.
    pub prefix: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u8,
    /// Calendar day, 1-31.
    pub day: u8,
    /// All-time counter value.
    pub number: u64,
    /// Per-year counter value.
    pub number_year: u64,
}

impl Variables {
    /// Derives the full variable set from a prefix, the two counters, and a
    /// reference date. When `date` is `None` the current local date is used
    /// (UTC if the local offset cannot be determined).
    #[must_use]
    pub fn build(prefix: &str, global_counter: u64, year_counter: u64, date: Option<Date>) -> Self {
        let date = date.unwrap_or_else(|| {
            OffsetDateTime::now_local()
                .unwrap_or_else(|_| OffsetDateTime::now_utc())
                .date()
        });
        Self {
            prefix: prefix.to_string(),
            year: date.year(),
            month: u8::from(date.month()),
            day: date.day(),
            number: global_counter,
            number_year: year_counter,
        }
    }

    /// The textual value for a variable, before any width padding.
    fn value_of(&self, var: Variable) -> String {
        match var {
            Variable::Prefix => self.prefix.clone(),
            Variable::Year => format!("{:04}", self.year),
            Variable::Yy => format!("{:02}", self.year.rem_euclid(100)),
            Variable::Month => self.month.to_string(),
            Variable::Day => self.day.to_string(),
            Variable::Number => self.number.to_string(),
            Variable::NumberYear => self.number_year.to_string(),
        }
    }
}

/// Validation report for a template.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    /// True when no errors were found.
    pub valid: bool,
    /// Problems that make the template unusable.
    pub errors: Vec<String>,
    /// Non-fatal advisories, e.g. a missing counter variable.
    pub warnings: Vec<String>,
    /// Recognized variables, in order of first appearance.
    pub variables: Vec<Variable>,
}

/// One scanned piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Literal text copied through unchanged.
    Literal(String),
    /// A `{...}` placeholder. `raw` keeps the original text including
    /// braces so render can pass unrecognized placeholders through
    /// verbatim.
    Placeholder {
        name: String,
        width: Option<String>,
        raw: String,
    },
}

/// Splits a template into literal and placeholder segments.
///
/// An opening brace with no closing brace is treated as literal text; the
/// scanner never fails.
fn scan(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        match after_open.find('}') {
            Some(close) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let inner = &after_open[..close];
                let (name, width) = match inner.split_once(':') {
                    Some((n, w)) => (n.to_string(), Some(w.to_string())),
                    None => (inner.to_string(), None),
                };
                segments.push(Segment::Placeholder {
                    name,
                    width,
                    raw: format!("{{{inner}}}"),
                });
                rest = &after_open[close + 1..];
            }
            None => {
                // Unterminated placeholder, keep the rest as literal text.
                literal.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Validates a template and reports errors, warnings, and the variables it
/// uses.
#[must_use]
pub fn validate(template: &str) -> Validation {
    let mut report = Validation::default();

    if template.is_empty() {
        report.errors.push("template is empty".to_string());
        return report;
    }

    let mut placeholder_count = 0usize;
    for segment in scan(template) {
        let Segment::Placeholder { name, width, .. } = segment else {
            continue;
        };
        placeholder_count += 1;

        match Variable::from_name(&name) {
            Some(var) => {
                if !report.variables.contains(&var) {
                    report.variables.push(var);
                }
            }
            None => {
                let valid_names: Vec<&str> = Variable::ALL.iter().map(|v| v.name()).collect();
                report.errors.push(format!(
                    "unknown variable {{{name}}}, valid variables are: {}",
                    valid_names.join(", ")
                ));
            }
        }

        if let Some(width) = width {
            match width.parse::<u32>() {
                Ok(w) if (MIN_WIDTH..=MAX_WIDTH).contains(&w) => {}
                Ok(w) => report.errors.push(format!(
                    "padding width {w} for {{{name}}} is out of range, must be between {MIN_WIDTH} and {MAX_WIDTH}"
                )),
                Err(_) => report
                    .errors
                    .push(format!("padding width {width:?} for {{{name}}} is not a number")),
            }
        }
    }

    if placeholder_count == 0 {
        report
            .errors
            .push("template contains no variables".to_string());
    }

    if !report.variables.iter().any(|v| v.is_counter()) && placeholder_count > 0 {
        report.warnings.push(
            "template has no counter variable (NUMBER or NUMBER_YEAR), generated numbers \
             are not guaranteed to be unique"
                .to_string(),
        );
    }

    report.valid = report.errors.is_empty();
    report
}

/// Validates a template, returning an error suitable for a save gate.
pub fn ensure_valid(template: &str) -> Result<(), TemplateError> {
    let report = validate(template);
    if report.valid {
        Ok(())
    } else {
        Err(TemplateError::Invalid {
            errors: report.errors,
        })
    }
}

/// Renders a template against a variable set.
///
/// Render is total: recognized placeholders are substituted and, when a
/// numeric width is given, left-padded with `'0'` (a longer value is never
/// truncated); anything unrecognized or malformed stays in the output
/// verbatim. Validation is the gate for bad templates, not render.
#[must_use]
pub fn render(template: &str, vars: &Variables) -> String {
    let mut out = String::with_capacity(template.len());
    for segment in scan(template) {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Placeholder { name, width, raw } => {
                let Some(var) = Variable::from_name(&name) else {
                    out.push_str(&raw);
                    continue;
                };
                let value = vars.value_of(var);
                match width.as_deref().map(str::parse::<u32>) {
                    None => out.push_str(&value),
                    Some(Ok(w)) => {
                        let w = w as usize;
                        for _ in value.chars().count()..w {
                            out.push('0');
                        }
                        out.push_str(&value);
                    }
                    Some(Err(_)) => out.push_str(&raw),
                }
            }
        }
    }
    out
}
