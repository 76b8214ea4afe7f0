//! JSON Node Patcher: targeted single-node updates inside JSON text
//!
//! Locate a node by path, replace it (merging objects one level deep), and
//! get back the complete updated document.
//!
//! # Architecture
//!
//! All updates compile down to a single primitive: [`Edit`], a verified
//! byte-span replacement. Intelligence lives in span acquisition (the
//! span-annotated scan in [`locate`]), not in the application logic.
//!
//! # Guarantees
//!
//! - Malformed documents are rejected before any edit is built
//! - Every edit verifies its expected before-text
//! - The output is re-parsed and checked to hold the written value
//! - Object updates never drop keys the caller did not mention
//!
//! # Example
//!
//! ```
//! use json_node_patcher::{apply, JsonPath};
//!
//! let doc = r#"{"user": {"name": "Ada", "age": 36}}"#;
//! let path = JsonPath::from_json_array(r#"["user"]"#).unwrap();
//! let out = apply(doc, &path, r#"{"age": 37}"#).unwrap();
//! assert_eq!(out, "{\n  \"user\": {\n    \"name\": \"Ada\",\n    \"age\": 37\n  }\n}");
//! ```

pub mod config;
pub mod edit;
pub mod engine;
pub mod format;
pub mod locate;
pub mod path;

// Re-exports
pub use config::{load_from_path, load_from_str, load_or_default, ConfigError, EditorConfig};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use engine::{
    apply, merge_shallow, Candidate, EditorOptions, EngineError, FormatMode, JsonNodeEditor,
    MergeStrategy, NodePlan, NodeUpdate,
};
pub use format::{FormattingOptions, IndentStyle};
pub use locate::{locate, LocateError, Located, NodeKind, ParsedDocument};
pub use path::{render, JsonPath, PathError, Segment};
