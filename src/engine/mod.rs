//! Single-node updates: resolve the caller's text, decide between merge and
//! replacement, synthesize the new value's text and splice it in.
//!
//! The pipeline for one call is
//!
//! 1. [`Candidate::resolve`] the raw replacement text,
//! 2. locate the authoritative node, [`decide`] the effective value and check
//!    that writing it stays within [`MAX_DEPTH`](crate::locate::MAX_DEPTH),
//! 3. pretty-print it and build an [`Edit`](crate::edit::Edit) over the node,
//! 4. splice, then either re-format the whole document ([`FormatMode::Canonical`])
//!    or keep the minimal patch ([`FormatMode::Preserve`]),
//! 5. re-parse the output and check the node holds the effective value.

pub mod candidate;
pub mod editor;
pub mod errors;
pub mod merge;

pub use candidate::Candidate;
pub use editor::{apply, EditorOptions, FormatMode, JsonNodeEditor, NodePlan, NodeUpdate};
pub use errors::EngineError;
pub use merge::{decide, merge_shallow, MergeDecision, MergeStrategy};
