use crate::engine::candidate::Candidate;
use crate::locate::NodeKind;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// How an object candidate combines with an existing object node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Overlay candidate keys onto the old object, one level deep
    #[default]
    Shallow,
    /// Always replace the node wholesale
    Replace,
}

/// The value that will actually be written at the path.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeDecision {
    pub value: Value,
    pub merged: bool,
}

/// Overlay `overlay` onto a copy of `base`.
///
/// Keys already in `base` keep their position and take the overlay's value;
/// new keys are appended in overlay order. Nested objects are not merged.
pub fn merge_shallow(
    base: &Map<String, Value>,
    overlay: Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key, value);
    }
    merged
}

/// Decide the effective value for a node of `old_kind` holding `old_value`.
///
/// `old_value` must be the authoritative node from the document, never a
/// partial view, so keys the caller did not surface survive the merge.
pub fn decide(
    old_kind: NodeKind,
    old_value: &Value,
    candidate: Candidate,
    strategy: MergeStrategy,
) -> MergeDecision {
    match (strategy, old_kind, old_value, candidate) {
        (
            MergeStrategy::Shallow,
            NodeKind::Object,
            Value::Object(base),
            Candidate::Structured(Value::Object(overlay)),
        ) => {
            debug!(
                existing = base.len(),
                overlay = overlay.len(),
                "merging object candidate into existing object"
            );
            MergeDecision {
                value: Value::Object(merge_shallow(base, overlay)),
                merged: true,
            }
        }
        (_, _, _, candidate) => MergeDecision {
            value: candidate.into_value(),
            merged: false,
        },
    }
}
