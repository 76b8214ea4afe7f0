use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The text-replacement primitive: a verified byte-span splice.
///
/// Every node update compiles down to one `Edit` against the original
/// document text. Offsets are byte offsets into UTF-8 text and must fall on
/// character boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until apply() is called"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to insert at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (cheaper to hold for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("before-text verification failed at byte {byte_start}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range: [{byte_start}, {byte_end}) in text of length {text_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        text_len: usize,
    },

    #[error("byte offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("edits overlap: [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    Overlapping {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },
}

/// Result of applying an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult carries the edited text"]
pub enum EditResult {
    /// Edit was applied, producing new text
    Applied { text: String, bytes_changed: usize },
    /// The span already holds `new_text`
    AlreadyApplied,
}

impl Edit {
    /// Create a new edit with automatic verification generation.
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl AsRef<str>,
    ) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before.as_ref()),
        }
    }

    /// Validate the edit against `content`.
    ///
    /// Returns the current text at [byte_start, byte_end) if validation succeeds.
    fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                text_len: content.len(),
            });
        }

        for offset in [self.byte_start, self.byte_end] {
            if !content.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        let current = &content[self.byte_start..self.byte_end];

        // Already applied
        if current == self.new_text {
            return Ok(current);
        }

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }

        Ok(current)
    }

    /// Apply this edit to `content`, returning the new text.
    pub fn apply(&self, content: &str) -> Result<EditResult, EditError> {
        let current = self.validate(content)?;
        if current == self.new_text {
            return Ok(EditResult::AlreadyApplied);
        }

        Ok(EditResult::Applied {
            text: splice(content, self.byte_start, self.byte_end, &self.new_text),
            bytes_changed: self.new_text.len(),
        })
    }

    /// Apply this edit, returning `content` unchanged if it was already applied.
    pub fn apply_to_string(&self, content: &str) -> Result<String, EditError> {
        match self.apply(content)? {
            EditResult::Applied { text, .. } => Ok(text),
            EditResult::AlreadyApplied => Ok(content.to_string()),
        }
    }

    /// Apply several non-overlapping edits to the same text.
    ///
    /// Edits are sorted by byte_start descending and applied bottom-to-top
    /// so earlier offsets stay valid.
    pub fn apply_batch(content: &str, mut edits: Vec<Edit>) -> Result<String, EditError> {
        edits.sort_by(|a, b| b.byte_start.cmp(&a.byte_start));

        for edit in &edits {
            edit.validate(content)?;
        }

        // Sorted descending: each later-in-text edit must start at or after
        // the end of the edit that precedes it in the text.
        for window in edits.windows(2) {
            let (later, earlier) = (&window[0], &window[1]);
            if earlier.byte_end > later.byte_start {
                return Err(EditError::Overlapping {
                    first_start: earlier.byte_start,
                    first_end: earlier.byte_end,
                    second_start: later.byte_start,
                    second_end: later.byte_end,
                });
            }
        }

        let mut text = content.to_string();
        for edit in &edits {
            text.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
        }
        Ok(text)
    }
}

fn splice(content: &str, byte_start: usize, byte_end: usize, replacement: &str) -> String {
    let mut out =
        String::with_capacity(content.len() + replacement.len() - (byte_end - byte_start));
    out.push_str(&content[..byte_start]);
    out.push_str(replacement);
    out.push_str(&content[byte_end..]);
    out
}
