use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("key segment at position {position} is empty")]
    EmptyKey { position: usize },

    #[error("invalid path '{input}': {message}")]
    InvalidJson { input: String, message: String },
}
