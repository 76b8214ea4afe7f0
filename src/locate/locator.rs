use crate::locate::errors::LocateError;
use crate::locate::scanner::{NodeBody, NodeKind, SpannedNode};
use crate::path::{render, JsonPath, Segment};
use serde_json::Value;
use std::ops::Range;
use tracing::{debug, trace};

/// Minimum Jaro-Winkler similarity for a sibling key to be offered as a
/// "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Result of resolving a path against a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    /// The resolved path
    pub path: JsonPath,
    /// Starting byte offset of the node's value (inclusive)
    pub byte_start: usize,
    /// Ending byte offset of the node's value (exclusive)
    pub byte_end: usize,
    pub kind: NodeKind,
    /// Decoded snapshot of the node, used for merge decisions
    pub value: Value,
}

impl Located {
    pub fn span(&self) -> Range<usize> {
        self.byte_start..self.byte_end
    }

    /// The node's original text.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span()]
    }

    /// The node's range in characters rather than bytes.
    pub fn char_range(&self, source: &str) -> Range<usize> {
        let start = source[..self.byte_start].chars().count();
        let len = source[self.span()].chars().count();
        start..start + len
    }

    /// Leading whitespace of the line on which the node starts.
    pub fn line_indent<'a>(&self, source: &'a str) -> &'a str {
        let line_start = source[..self.byte_start]
            .rfind('\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let line = &source[line_start..self.byte_start];
        let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
        &line[..indent_len]
    }
}

/// A document scanned once, ready for any number of lookups.
#[derive(Debug, Clone)]
pub struct ParsedDocument<'a> {
    source: &'a str,
    root: SpannedNode,
}

impl<'a> ParsedDocument<'a> {
    pub fn parse(source: &'a str) -> Result<Self, LocateError> {
        let root = SpannedNode::parse(source)?;
        trace!(bytes = source.len(), "scanned document");
        Ok(Self { source, root })
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn root(&self) -> &SpannedNode {
        &self.root
    }

    /// Walk `path` from the root and return the target node's span and value.
    pub fn locate(&self, path: &JsonPath) -> Result<Located, LocateError> {
        let node = self.resolve(path)?;
        let span = node.span.clone();
        let value = node
            .to_value(self.source)
            .map_err(|err| LocateError::malformed(self.source, span.start, err.to_string()))?;

        debug!(
            path = %path,
            byte_start = span.start,
            byte_end = span.end,
            kind = node.kind().as_str(),
            "located node"
        );

        Ok(Located {
            path: path.clone(),
            byte_start: span.start,
            byte_end: span.end,
            kind: node.kind(),
            value,
        })
    }

    fn resolve(&self, path: &JsonPath) -> Result<&SpannedNode, LocateError> {
        let mut current = &self.root;

        for (depth, segment) in path.iter().enumerate() {
            let here = || render(&path.segments()[..depth]);
            current = match (segment, &current.body) {
                (Segment::Key(key), NodeBody::Object(members)) => {
                    match members.iter().find(|member| member.key == *key) {
                        Some(member) => &member.value,
                        None => {
                            let siblings = members.iter().map(|member| member.key.as_str());
                            return Err(LocateError::NotFound {
                                path: path.render(),
                                reason: format!("key {key:?} does not exist at {}", here()),
                                suggestion: suggest_key(key, siblings),
                            });
                        }
                    }
                }
                (Segment::Index(index), NodeBody::Array(elements)) => match elements.get(*index) {
                    Some(element) => element,
                    None => {
                        return Err(LocateError::NotFound {
                            path: path.render(),
                            reason: format!(
                                "index {index} out of range at {} (length {})",
                                here(),
                                elements.len()
                            ),
                            suggestion: None,
                        });
                    }
                },
                (Segment::Key(key), _) => {
                    return Err(LocateError::NotFound {
                        path: path.render(),
                        reason: format!(
                            "key {key:?} requires an object at {}, found {}",
                            here(),
                            current.kind().as_str()
                        ),
                        suggestion: None,
                    });
                }
                (Segment::Index(index), _) => {
                    return Err(LocateError::NotFound {
                        path: path.render(),
                        reason: format!(
                            "index {index} requires an array at {}, found {}",
                            here(),
                            current.kind().as_str()
                        ),
                        suggestion: None,
                    });
                }
            };
        }

        Ok(current)
    }
}

/// Locate the node at `path` inside `document`.
///
/// Fails with [`LocateError::Malformed`] when the document is not valid JSON
/// and [`LocateError::NotFound`] when the path does not resolve.
pub fn locate(document: &str, path: &JsonPath) -> Result<Located, LocateError> {
    ParsedDocument::parse(document)?.locate(path)
}

fn suggest_key<'k>(missing: &str, candidates: impl Iterator<Item = &'k str>) -> Option<String> {
    candidates
        .map(|candidate| (candidate, strsim::jaro_winkler(missing, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate.to_string())
}
