use crate::engine::{EditorOptions, FormatMode, MergeStrategy};
use crate::format::{FormattingOptions, IndentStyle, DEFAULT_INDENT_WIDTH};
use serde::Deserialize;
use std::fmt;
use std::ops::RangeInclusive;

/// Accepted values for `format.indent_width`.
pub const INDENT_WIDTH_RANGE: RangeInclusive<usize> = 1..=16;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    #[serde(default)]
    pub format: FormatSection,
    #[serde(default)]
    pub merge: MergeSection,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FormatSection {
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
    #[serde(default)]
    pub use_tabs: bool,
    #[serde(default)]
    pub trailing_newline: bool,
    #[serde(default)]
    pub mode: FormatMode,
}

impl Default for FormatSection {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            use_tabs: false,
            trailing_newline: false,
            mode: FormatMode::default(),
        }
    }
}

fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MergeSection {
    #[serde(default)]
    pub strategy: MergeStrategy,
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if !INDENT_WIDTH_RANGE.contains(&self.format.indent_width) {
            issues.push(ValidationIssue::OutOfRange {
                field: "format.indent_width",
                value: self.format.indent_width,
                range: INDENT_WIDTH_RANGE,
            });
        }

        if self.format.use_tabs && self.format.indent_width != DEFAULT_INDENT_WIDTH {
            issues.push(ValidationIssue::InvalidCombo {
                message: "indent_width has no effect when use_tabs is true".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Engine options described by this config.
    pub fn to_options(&self) -> EditorOptions {
        let indent = if self.format.use_tabs {
            IndentStyle::Tabs
        } else {
            IndentStyle::Spaces(self.format.indent_width)
        };
        EditorOptions {
            formatting: FormattingOptions {
                indent,
                trailing_newline: self.format.trailing_newline,
            },
            mode: self.format.mode,
            merge: self.merge.strategy,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    OutOfRange {
        field: &'static str,
        value: usize,
        range: RangeInclusive<usize>,
    },
    InvalidCombo {
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::OutOfRange {
                field,
                value,
                range,
            } => write!(
                f,
                "'{field}' is {value}, expected {}..={}",
                range.start(),
                range.end()
            ),
            ValidationIssue::InvalidCombo { message } => {
                write!(f, "invalid editor configuration: {message}")
            }
        }
    }
}
