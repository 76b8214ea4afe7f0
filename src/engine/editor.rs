use crate::edit::Edit;
use crate::engine::candidate::Candidate;
use crate::engine::errors::EngineError;
use crate::engine::merge::{decide, MergeStrategy};
use crate::format::{
    line_ending, reindent, to_document_string, to_pretty_string, FormattingOptions,
};
use crate::locate::{Located, ParsedDocument, SpannedNode, MAX_DEPTH};
use crate::path::JsonPath;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// What happens to the text outside the edited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatMode {
    /// Re-serialize the whole updated document in canonical form
    #[default]
    Canonical,
    /// Keep every byte outside the node's span
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorOptions {
    pub formatting: FormattingOptions,
    pub mode: FormatMode,
    pub merge: MergeStrategy,
}

/// A fully computed, not yet applied, single-node update.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePlan {
    /// Splice against the original document covering the node's value
    pub edit: Edit,
    /// The node as it was before the update
    pub located: Located,
    /// The value that will be written
    pub effective: Value,
    /// Whether the candidate was merged into an existing object
    pub merged: bool,
}

impl NodePlan {
    /// True when the effective value equals the current value.
    pub fn is_noop(&self) -> bool {
        self.effective == self.located.value
    }
}

/// Outcome of a successful update.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeUpdate {
    /// The complete updated document text
    pub document: String,
    pub merged: bool,
    /// False when the node already held the effective value
    pub value_changed: bool,
}

/// Stateless single-node JSON editor.
///
/// Each call takes an immutable document snapshot and returns new text; the
/// editor holds only its options and can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct JsonNodeEditor {
    options: EditorOptions,
}

impl JsonNodeEditor {
    pub fn new(options: EditorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn locate(&self, document: &str, path: &JsonPath) -> Result<Located, EngineError> {
        Ok(ParsedDocument::parse(document)?.locate(path)?)
    }

    /// Compute the update for `raw` without applying it.
    pub fn plan(
        &self,
        document: &str,
        path: &JsonPath,
        raw: &str,
    ) -> Result<NodePlan, EngineError> {
        self.plan_candidate(document, path, Candidate::resolve(raw))
    }

    /// Compute the update for an already resolved candidate.
    pub fn plan_candidate(
        &self,
        document: &str,
        path: &JsonPath,
        candidate: Candidate,
    ) -> Result<NodePlan, EngineError> {
        // Always merge against the node as it exists in the document.
        let located = self.locate(document, path)?;
        let literal = candidate.is_literal();
        let decision = decide(located.kind, &located.value, candidate, self.options.merge);

        // Each path segment is one enclosing container.
        let depth = path.len() + nesting_depth(&decision.value);
        if depth > MAX_DEPTH {
            return Err(EngineError::TooDeep {
                path: path.render(),
                depth,
                limit: MAX_DEPTH,
            });
        }

        let mut text = to_pretty_string(&decision.value, &self.options.formatting)?;
        if self.options.mode == FormatMode::Preserve {
            text = reindent(&text, located.line_indent(document), line_ending(document));
        }

        debug!(
            path = %path,
            merged = decision.merged,
            literal,
            bytes = text.len(),
            "planned node update"
        );

        let edit = Edit::new(
            located.byte_start,
            located.byte_end,
            text,
            located.text(document),
        );

        Ok(NodePlan {
            edit,
            located,
            effective: decision.value,
            merged: decision.merged,
        })
    }

    /// Replace the node at `path` and return the full updated document.
    pub fn apply(
        &self,
        document: &str,
        path: &JsonPath,
        raw: &str,
    ) -> Result<String, EngineError> {
        Ok(self.update(document, path, raw)?.document)
    }

    pub fn update(
        &self,
        document: &str,
        path: &JsonPath,
        raw: &str,
    ) -> Result<NodeUpdate, EngineError> {
        let plan = self.plan(document, path, raw)?;
        self.apply_plan(document, path, &plan)
    }

    /// Apply a plan computed from `document`.
    ///
    /// The plan's edit verifies the before-text, so applying it to a document
    /// that changed underneath the node fails with [`EngineError::Edit`].
    pub fn apply_plan(
        &self,
        document: &str,
        path: &JsonPath,
        plan: &NodePlan,
    ) -> Result<NodeUpdate, EngineError> {
        let spliced = plan.edit.apply_to_string(document)?;

        let output = match self.options.mode {
            FormatMode::Preserve => spliced,
            FormatMode::Canonical => {
                let tree = SpannedNode::parse(&spliced)
                    .map_err(|err| err.to_string())
                    .and_then(|root| root.to_value(&spliced).map_err(|err| err.to_string()))
                    .map_err(|err| {
                        warn!(path = %path, error = %err, "spliced document does not re-parse");
                        EngineError::consistency(format!(
                            "spliced document does not re-parse: {err}"
                        ))
                    })?;
                to_document_string(&tree, &self.options.formatting)?
            }
        };

        self.verify(&output, path, &plan.effective)?;

        Ok(NodeUpdate {
            document: output,
            merged: plan.merged,
            value_changed: !plan.is_noop(),
        })
    }

    /// Re-parse the output and check the node holds the effective value.
    fn verify(&self, output: &str, path: &JsonPath, expected: &Value) -> Result<(), EngineError> {
        let parsed = ParsedDocument::parse(output).map_err(|err| {
            warn!(path = %path, error = %err, "updated document is not valid JSON");
            EngineError::consistency(format!("updated document is not valid JSON: {err}"))
        })?;
        let located = parsed.locate(path).map_err(|err| {
            warn!(path = %path, error = %err, "updated node cannot be located");
            EngineError::consistency(format!("updated node cannot be located: {err}"))
        })?;
        if located.value != *expected {
            warn!(path = %path, "updated node does not hold the written value");
            return Err(EngineError::consistency(format!(
                "node at {path} does not hold the written value"
            )));
        }
        Ok(())
    }
}

/// Number of container levels in `value`; zero for primitives.
fn nesting_depth(value: &Value) -> usize {
    let children = match value {
        Value::Object(map) => map.values().map(nesting_depth).max(),
        Value::Array(items) => items.iter().map(nesting_depth).max(),
        _ => return 0,
    };
    1 + children.unwrap_or(0)
}

/// Update the node at `path` with default options.
///
/// `raw` is parsed as JSON when possible and otherwise written as a string.
pub fn apply(document: &str, path: &JsonPath, raw: &str) -> Result<String, EngineError> {
    JsonNodeEditor::default().apply(document, path, raw)
}
