//! Span-based node location inside JSON text.
//!
//! The document is scanned once into a tree of [`SpannedNode`]s that keep the
//! byte range of every value and member key. Paths are then resolved against
//! that tree without touching the text again, so a located range can be
//! replaced without re-serializing anything outside it.

pub mod errors;
pub mod locator;
pub mod scanner;

pub use errors::LocateError;
pub use locator::{locate, Located, ParsedDocument};
pub use scanner::{Member, NodeBody, NodeKind, SpannedNode, MAX_DEPTH};
