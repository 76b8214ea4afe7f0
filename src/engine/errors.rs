use crate::edit::EditError;
use crate::locate::LocateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("malformed document at line {line}, column {column}: {message}")]
    Malformed {
        message: String,
        offset: usize,
        line: usize,
        column: usize,
    },

    #[error("path not found: {path} ({reason})")]
    PathNotFound {
        path: String,
        reason: String,
        suggestion: Option<String>,
    },

    /// Writing the value at this path would exceed the nesting limit.
    #[error("value at {path} would nest {depth} levels deep (limit {limit})")]
    TooDeep {
        path: String,
        depth: usize,
        limit: usize,
    },

    /// The engine produced text that does not re-parse to the expected tree.
    #[error("internal consistency error: {message}")]
    InternalConsistency { message: String },

    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<LocateError> for EngineError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::Malformed {
                message,
                offset,
                line,
                column,
            } => EngineError::Malformed {
                message,
                offset,
                line,
                column,
            },
            LocateError::NotFound {
                path,
                reason,
                suggestion,
            } => EngineError::PathNotFound {
                path,
                reason,
                suggestion,
            },
        }
    }
}

impl EngineError {
    pub(crate) fn consistency(message: impl Into<String>) -> Self {
        EngineError::InternalConsistency {
            message: message.into(),
        }
    }

    pub fn is_path_not_found(&self) -> bool {
        matches!(self, EngineError::PathNotFound { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, EngineError::Malformed { .. })
    }
}
