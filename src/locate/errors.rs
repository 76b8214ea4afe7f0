use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("malformed JSON at line {line}, column {column}: {message}")]
    Malformed {
        message: String,
        offset: usize,
        line: usize,
        column: usize,
    },

    #[error("path not found: {path} ({reason})")]
    NotFound {
        path: String,
        reason: String,
        suggestion: Option<String>,
    },
}

impl LocateError {
    /// Build a `Malformed` error, deriving 1-based line and column from `offset`.
    pub fn malformed(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        LocateError::Malformed {
            message: message.into(),
            offset,
            line,
            column,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, LocateError::Malformed { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LocateError::NotFound { .. })
    }
}
