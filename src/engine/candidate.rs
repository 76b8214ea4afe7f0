use serde_json::Value;
use tracing::debug;

/// Caller-supplied replacement text, resolved once.
///
/// Text that parses as JSON becomes [`Candidate::Structured`]; anything else
/// is kept verbatim as [`Candidate::Literal`] and written as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Structured(Value),
    Literal(String),
}

impl Candidate {
    pub fn resolve(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Candidate::Structured(value),
            Err(err) => {
                debug!(error = %err, "replacement is not JSON, using it as a string literal");
                Candidate::Literal(raw.to_string())
            }
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Candidate::Literal(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            Candidate::Structured(value) => value,
            Candidate::Literal(text) => Value::String(text),
        }
    }
}

impl From<Value> for Candidate {
    fn from(value: Value) -> Self {
        Candidate::Structured(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_text_is_structured() {
        assert_eq!(Candidate::resolve("42"), Candidate::Structured(json!(42)));
        assert_eq!(
            Candidate::resolve(" {\"a\": [1]} "),
            Candidate::Structured(json!({"a": [1]}))
        );
        assert_eq!(Candidate::resolve("\"quoted\""), Candidate::Structured(json!("quoted")));
        assert_eq!(Candidate::resolve("null"), Candidate::Structured(Value::Null));
    }

    #[test]
    fn invalid_json_falls_back_to_literal() {
        let candidate = Candidate::resolve("not json");
        assert!(candidate.is_literal());
        assert_eq!(candidate.into_value(), json!("not json"));
    }

    #[test]
    fn empty_text_is_empty_string() {
        assert_eq!(Candidate::resolve("").into_value(), json!(""));
    }

    #[test]
    fn literal_keeps_text_verbatim() {
        let raw = "  {broken: true ";
        assert_eq!(Candidate::resolve(raw).into_value(), Value::String(raw.to_string()));
    }
}
