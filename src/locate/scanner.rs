use crate::locate::errors::LocateError;
use serde_json::{Map, Value};
use std::ops::Range;

/// Maximum container nesting accepted by the scanner.
///
/// Matches the recursion limit of `serde_json`, so every document the scanner
/// accepts can also be decoded into a `serde_json::Value`.
pub const MAX_DEPTH: usize = 127;

/// Structural kind of a node, as used for merge decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Array,
    Primitive,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::Primitive => "primitive",
        }
    }
}

/// A JSON value annotated with its byte range in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedNode {
    pub span: Range<usize>,
    pub body: NodeBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    /// Members in source order, duplicates included
    Object(Vec<Member>),
    Array(Vec<SpannedNode>),
    Primitive,
}

/// One `"key": value` pair of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Unescaped key text
    pub key: String,
    /// Range of the quoted key, quotes included
    pub key_span: Range<usize>,
    pub value: SpannedNode,
}

impl SpannedNode {
    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Object(_) => NodeKind::Object,
            NodeBody::Array(_) => NodeKind::Array,
            NodeBody::Primitive => NodeKind::Primitive,
        }
    }

    /// First member with exactly this key.
    pub fn member(&self, key: &str) -> Option<&Member> {
        match &self.body {
            NodeBody::Object(members) => members.iter().find(|member| member.key == key),
            _ => None,
        }
    }

    pub fn element(&self, index: usize) -> Option<&SpannedNode> {
        match &self.body {
            NodeBody::Array(elements) => elements.get(index),
            _ => None,
        }
    }

    /// Decode this node into a `Value`.
    ///
    /// Duplicate keys resolve to their first occurrence, the same member path
    /// lookups land on. Key positions follow source order.
    pub fn to_value(&self, source: &str) -> Result<Value, serde_json::Error> {
        match &self.body {
            NodeBody::Object(members) => {
                let mut map = Map::with_capacity(members.len());
                for member in members {
                    if !map.contains_key(&member.key) {
                        map.insert(member.key.clone(), member.value.to_value(source)?);
                    }
                }
                Ok(Value::Object(map))
            }
            NodeBody::Array(elements) => elements
                .iter()
                .map(|element| element.to_value(source))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            NodeBody::Primitive => serde_json::from_str(&source[self.span.clone()]),
        }
    }

    /// Parse a complete document: one value surrounded by optional whitespace.
    pub fn parse(source: &str) -> Result<SpannedNode, LocateError> {
        let mut scanner = Scanner::new(source);
        scanner.skip_whitespace();
        let root = scanner.scan_value(0)?;
        scanner.skip_whitespace();
        if scanner.offset < scanner.bytes.len() {
            return Err(scanner.error("trailing characters after JSON value"));
        }
        Ok(root)
    }
}

struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            offset: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    fn error(&self, message: impl Into<String>) -> LocateError {
        LocateError::malformed(self.source, self.offset, message)
    }

    fn unexpected(&self, expected: &str) -> LocateError {
        match self.source.get(self.offset..).and_then(|rest| rest.chars().next()) {
            Some(found) => self.error(format!("expected {expected}, found {found:?}")),
            None => self.error(format!("expected {expected}, found end of input")),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.offset += 1;
        }
    }

    fn expect_byte(&mut self, byte: u8, expected: &str) -> Result<(), LocateError> {
        if self.peek() == Some(byte) {
            self.offset += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn scan_value(&mut self, depth: usize) -> Result<SpannedNode, LocateError> {
        match self.peek() {
            Some(b'{') => self.scan_object(depth + 1),
            Some(b'[') => self.scan_array(depth + 1),
            Some(b'"') => {
                let start = self.offset;
                self.scan_string(false)?;
                Ok(self.primitive(start))
            }
            Some(b't') => self.scan_literal("true"),
            Some(b'f') => self.scan_literal("false"),
            Some(b'n') => self.scan_literal("null"),
            Some(b'-' | b'0'..=b'9') => self.scan_number(),
            _ => Err(self.unexpected("a JSON value")),
        }
    }

    fn primitive(&self, start: usize) -> SpannedNode {
        SpannedNode {
            span: start..self.offset,
            body: NodeBody::Primitive,
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), LocateError> {
        if depth > MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {MAX_DEPTH} levels")));
        }
        Ok(())
    }

    fn scan_object(&mut self, depth: usize) -> Result<SpannedNode, LocateError> {
        self.check_depth(depth)?;
        let start = self.offset;
        self.expect_byte(b'{', "'{'")?;
        self.skip_whitespace();

        let mut members = Vec::new();
        if self.peek() == Some(b'}') {
            self.offset += 1;
            return Ok(SpannedNode {
                span: start..self.offset,
                body: NodeBody::Object(members),
            });
        }

        loop {
            if self.peek() != Some(b'"') {
                return Err(self.unexpected("an object key"));
            }
            let key_start = self.offset;
            let key = self.scan_string(true)?.unwrap_or_default();
            let key_span = key_start..self.offset;

            self.skip_whitespace();
            self.expect_byte(b':', "':'")?;
            self.skip_whitespace();
            let value = self.scan_value(depth)?;
            members.push(Member {
                key,
                key_span,
                value,
            });

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.offset += 1;
                    self.skip_whitespace();
                }
                Some(b'}') => {
                    self.offset += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }

        Ok(SpannedNode {
            span: start..self.offset,
            body: NodeBody::Object(members),
        })
    }

    fn scan_array(&mut self, depth: usize) -> Result<SpannedNode, LocateError> {
        self.check_depth(depth)?;
        let start = self.offset;
        self.expect_byte(b'[', "'['")?;
        self.skip_whitespace();

        let mut elements = Vec::new();
        if self.peek() == Some(b']') {
            self.offset += 1;
            return Ok(SpannedNode {
                span: start..self.offset,
                body: NodeBody::Array(elements),
            });
        }

        loop {
            elements.push(self.scan_value(depth)?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.offset += 1;
                    self.skip_whitespace();
                }
                Some(b']') => {
                    self.offset += 1;
                    break;
                }
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }

        Ok(SpannedNode {
            span: start..self.offset,
            body: NodeBody::Array(elements),
        })
    }

    fn scan_literal(&mut self, literal: &'static str) -> Result<SpannedNode, LocateError> {
        let start = self.offset;
        if self.bytes[start..].starts_with(literal.as_bytes()) {
            self.offset += literal.len();
            Ok(self.primitive(start))
        } else {
            Err(self.unexpected(literal))
        }
    }

    fn scan_number(&mut self) -> Result<SpannedNode, LocateError> {
        let start = self.offset;
        if self.peek() == Some(b'-') {
            self.offset += 1;
        }

        match self.peek() {
            Some(b'0') => {
                self.offset += 1;
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(self.error("leading zeros are not allowed in numbers"));
                }
            }
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.unexpected("a digit")),
        }

        if self.peek() == Some(b'.') {
            self.offset += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.unexpected("a digit after '.'"));
            }
            self.skip_digits();
        }

        if let Some(b'e' | b'E') = self.peek() {
            self.offset += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.offset += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.unexpected("a digit in exponent"));
            }
            self.skip_digits();
        }

        // Grammar-valid numbers can still overflow f64, which serde_json rejects.
        let finite = self.source[start..self.offset]
            .parse::<f64>()
            .is_ok_and(f64::is_finite);
        if !finite {
            return Err(LocateError::malformed(self.source, start, "number out of range"));
        }

        Ok(self.primitive(start))
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.offset += 1;
        }
    }

    /// Scan a quoted string starting at the opening quote.
    ///
    /// Returns the unescaped contents when `decode` is set.
    fn scan_string(&mut self, decode: bool) -> Result<Option<String>, LocateError> {
        self.expect_byte(b'"', "'\"'")?;
        let mut decoded = decode.then(String::new);
        let mut run_start = self.offset;

        loop {
            let Some(byte) = self.peek() else {
                return Err(self.error("unterminated string"));
            };
            match byte {
                b'"' => {
                    if let Some(out) = decoded.as_mut() {
                        out.push_str(&self.source[run_start..self.offset]);
                    }
                    self.offset += 1;
                    return Ok(decoded);
                }
                b'\\' => {
                    if let Some(out) = decoded.as_mut() {
                        out.push_str(&self.source[run_start..self.offset]);
                    }
                    self.offset += 1;
                    let ch = self.scan_escape()?;
                    if let Some(out) = decoded.as_mut() {
                        out.push(ch);
                    }
                    run_start = self.offset;
                }
                0x00..=0x1F => {
                    return Err(self.error("control character in string must be escaped"));
                }
                _ => self.offset += 1,
            }
        }
    }

    fn scan_escape(&mut self) -> Result<char, LocateError> {
        let Some(byte) = self.peek() else {
            return Err(self.error("unterminated escape sequence"));
        };
        self.offset += 1;
        let ch = match byte {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{08}',
            b'f' => '\u{0C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.scan_unicode_escape(),
            _ => {
                self.offset -= 1;
                return Err(self.error("invalid escape sequence"));
            }
        };
        Ok(ch)
    }

    fn scan_unicode_escape(&mut self) -> Result<char, LocateError> {
        let first = self.scan_hex4()?;
        match first {
            0xD800..=0xDBFF => {
                if !self.bytes[self.offset..].starts_with(b"\\u") {
                    return Err(self.error("unpaired high surrogate in \\u escape"));
                }
                self.offset += 2;
                let second = self.scan_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&second) {
                    return Err(self.error("invalid low surrogate in \\u escape"));
                }
                let code = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"))
            }
            0xDC00..=0xDFFF => Err(self.error("unpaired low surrogate in \\u escape")),
            code => char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape")),
        }
    }

    fn scan_hex4(&mut self) -> Result<u32, LocateError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .peek()
                .and_then(|byte| (byte as char).to_digit(16))
                .ok_or_else(|| self.unexpected("a hex digit"))?;
            code = code * 16 + digit;
            self.offset += 1;
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SpannedNode {
        SpannedNode::parse(source).unwrap()
    }

    fn malformed(source: &str) -> LocateError {
        let err = SpannedNode::parse(source).unwrap_err();
        assert!(err.is_malformed(), "expected malformed for {source:?}");
        err
    }

    #[test]
    fn spans_cover_values_not_keys() {
        let source = r#"{ "a" : [1, true], "b": "x" }"#;
        let root = parse(source);
        assert_eq!(root.span, 0..source.len());

        let a = root.member("a").unwrap();
        assert_eq!(&source[a.key_span.clone()], "\"a\"");
        assert_eq!(&source[a.value.span.clone()], "[1, true]");
        assert_eq!(a.value.kind(), NodeKind::Array);

        let second = a.value.element(1).unwrap();
        assert_eq!(&source[second.span.clone()], "true");

        let b = root.member("b").unwrap();
        assert_eq!(&source[b.value.span.clone()], "\"x\"");
    }

    #[test]
    fn keys_are_unescaped() {
        let root = parse(r#"{"a\"b": 1, "été": 2, "😀": 3}"#);
        assert!(root.member("a\"b").is_some());
        assert!(root.member("été").is_some());
        assert!(root.member("😀").is_some());
    }

    #[test]
    fn duplicate_keys_first_wins() {
        let source = r#"{"k": 1, "k": 2}"#;
        let root = parse(source);
        let member = root.member("k").unwrap();
        assert_eq!(&source[member.value.span.clone()], "1");
    }

    #[test]
    fn to_value_keeps_first_duplicate_and_order() {
        let source = r#"{"z": [1, {"k": "a", "k": "b"}], "a": null}"#;
        let value = parse(source).to_value(source).unwrap();
        assert_eq!(value, serde_json::json!({"z": [1, {"k": "a"}], "a": null}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn surrounding_whitespace_allowed() {
        let source = " \r\n\t42 \n";
        let root = parse(source);
        assert_eq!(&source[root.span.clone()], "42");
        assert_eq!(root.kind(), NodeKind::Primitive);
    }

    #[test]
    fn number_grammar() {
        for ok in ["0", "-0", "12", "1.5", "-0.25e+10", "3E7"] {
            parse(ok);
        }
        for bad in ["01", "-", "1.", ".5", "1e", "+1", "0x10"] {
            malformed(bad);
        }
    }

    #[test]
    fn out_of_range_numbers_are_malformed_at_the_number() {
        let source = "{\n  \"a\": 1,\n  \"big\": -1e400\n}";
        match malformed(source) {
            LocateError::Malformed {
                message,
                offset,
                line,
                column,
            } => {
                assert_eq!(message, "number out of range");
                assert_eq!(offset, source.find("-1e400").unwrap());
                assert_eq!((line, column), (3, 10));
            }
            other => panic!("unexpected {other:?}"),
        }

        malformed(&"9".repeat(400));
        // Underflow decodes to zero
        let tiny = "1e-400";
        assert_eq!(parse(tiny).to_value(tiny).unwrap(), serde_json::json!(0.0));
    }

    #[test]
    fn rejects_structural_errors() {
        for bad in [
            "{invalid",
            "",
            "{\"a\" 1}",
            "[1,]",
            "{\"a\":1,}",
            "[1 2]",
            "tru",
            "nul",
            "{\"a\":1} x",
            "{'a': 1}",
        ] {
            malformed(bad);
        }
    }

    #[test]
    fn rejects_bad_strings() {
        malformed("\"abc");
        malformed("\"a\tb\"");
        malformed(r#""\x""#);
        malformed(r#""\u12G4""#);
        malformed(r#""\ud800""#);
        malformed(r#""\udc00""#);
    }

    #[test]
    fn reports_line_and_column() {
        let err = malformed("{\n  \"a\": ,\n}");
        match err {
            LocateError::Malformed { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 8);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn depth_limit() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        malformed(&deep);

        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        parse(&ok);
    }

    #[test]
    fn non_ascii_values_keep_byte_spans() {
        let source = r#"{"name": "Zoë", "n": 1}"#;
        let root = parse(source);
        let name = root.member("name").unwrap();
        assert_eq!(&source[name.value.span.clone()], "\"Zoë\"");
        let n = root.member("n").unwrap();
        assert_eq!(&source[n.value.span.clone()], "1");
    }
}
