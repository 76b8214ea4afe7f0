use crate::path::errors::PathError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// A single navigation step: an object member or an array element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    /// Object member access by exact key
    Key(String),
    /// Zero-based array element access
    Index(usize),
}

impl Segment {
    pub fn key(key: impl Into<String>) -> Self {
        Segment::Key(key.into())
    }

    pub fn index(index: usize) -> Self {
        Segment::Index(index)
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            Segment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Key(_) => None,
            Segment::Index(index) => Some(*index),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => {
                let quoted = serde_json::to_string(key).map_err(|_| fmt::Error)?;
                write!(f, "[{quoted}]")
            }
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// An immutable path from the document root to one node.
///
/// Key segments are never empty. Equality is segment-by-segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// The empty path, addressing the document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<Segment>) -> Result<Self, PathError> {
        if let Some(position) = segments
            .iter()
            .position(|segment| matches!(segment, Segment::Key(key) if key.is_empty()))
        {
            return Err(PathError::EmptyKey { position });
        }
        Ok(Self { segments })
    }

    /// Parse the array form used by callers, e.g. `["customer", 0, "name"]`.
    pub fn from_json_array(input: &str) -> Result<Self, PathError> {
        let segments: Vec<Segment> =
            serde_json::from_str(input).map_err(|err| PathError::InvalidJson {
                input: input.to_string(),
                message: err.to_string(),
            })?;
        Self::new(segments)
    }

    /// Return a new path extended by one segment.
    pub fn child(&self, segment: impl Into<Segment>) -> Result<Self, PathError> {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self::new(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `prefix` addresses this node or one of its ancestors.
    pub fn starts_with(&self, prefix: &JsonPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Canonical display form, see [`render`].
    pub fn render(&self) -> String {
        render(&self.segments)
    }
}

impl TryFrom<Vec<Segment>> for JsonPath {
    type Error = PathError;

    fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<JsonPath> for Vec<Segment> {
    fn from(path: JsonPath) -> Self {
        path.segments
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_array(s)
    }
}

impl<'a> IntoIterator for &'a JsonPath {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('$')?;
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Render segments as `$` followed by `["key"]` / `[index]` brackets.
///
/// Display only; the output is not a query language.
pub fn render(segments: &[Segment]) -> String {
    let mut out = String::from("$");
    for segment in segments {
        // Writing into a String cannot fail.
        let _ = write!(out, "{segment}");
    }
    out
}
