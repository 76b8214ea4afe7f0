//! Canonical JSON text synthesis.
//!
//! Non-empty containers put one member or element per line, empty ones stay
//! compact (`{}` / `[]`), and object keys are written in insertion order.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

pub const DEFAULT_INDENT_WIDTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(width) => " ".repeat(*width),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Spaces(DEFAULT_INDENT_WIDTH)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormattingOptions {
    pub indent: IndentStyle,
    /// Append `\n` after a re-formatted document
    pub trailing_newline: bool,
}

impl FormattingOptions {
    pub fn spaces(width: usize) -> Self {
        Self {
            indent: IndentStyle::Spaces(width),
            ..Self::default()
        }
    }

    pub fn tabs() -> Self {
        Self {
            indent: IndentStyle::Tabs,
            ..Self::default()
        }
    }
}

/// Serialize `value` with the configured indentation.
pub fn to_pretty_string(
    value: &Value,
    options: &FormattingOptions,
) -> Result<String, serde_json::Error> {
    let unit = options.indent.unit();
    let mut buf = Vec::with_capacity(128);
    let formatter = PrettyFormatter::with_indent(unit.as_bytes());
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|err| {
        serde_json::Error::io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}

/// Serialize a whole document, honouring `trailing_newline`.
pub fn to_document_string(
    value: &Value,
    options: &FormattingOptions,
) -> Result<String, serde_json::Error> {
    let mut text = to_pretty_string(value, options)?;
    if options.trailing_newline {
        text.push('\n');
    }
    Ok(text)
}

/// Line ending used by `source`: `\r\n` if any line ends that way, else `\n`.
pub fn line_ending(source: &str) -> &'static str {
    if source.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Prefix every line after the first with `base`, joining lines with `newline`.
///
/// Used when a pretty-printed value is spliced into a line that is already
/// indented, so nested lines line up with the surrounding text.
pub fn reindent(text: &str, base: &str, newline: &str) -> String {
    if !text.contains('\n') || (base.is_empty() && newline == "\n") {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + (base.len() + newline.len()) * 8);
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push_str(newline);
            out.push_str(base);
        }
        out.push_str(line);
    }
    out
}
