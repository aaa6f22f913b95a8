//! Literal classification for constants written without a type annotation.
//!
//! This is deliberately flat: only top-level property values are looked at,
//! and anything that is not an obvious literal is [`Inferred::Unknown`].

use std::collections::BTreeSet;
use std::fmt;

use crate::lexer::{find_top_level, strip_trailing_comment, tokenize, TokenKind};

/// The kind inferred for a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Inferred {
    String,
    Boolean,
    Number,
    Unknown,
}

impl Inferred {
    /// The type keyword emitted for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            Inferred::String => "string",
            Inferred::Boolean => "boolean",
            Inferred::Number => "number",
            Inferred::Unknown => "any",
        }
    }

    /// `{ [key: string]: <kind> }`
    pub fn index_signature(self) -> String {
        format!("{{ [key: string]: {} }}", self.keyword())
    }
}

impl fmt::Display for Inferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A property of an object literal, split at its first top-level colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> Property<'a> {
    /// Split `line` into key and value. Colons inside strings, nested
    /// brackets and parameter lists do not count.
    pub fn split(line: &'a str) -> Option<Self> {
        let tokens = tokenize(line);
        let colon = find_top_level(&tokens, 0, |k| *k == TokenKind::Colon)?;
        let start = tokens[colon].start;
        let key = line[..start].trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key,
            value: line[tokens[colon].end..].trim(),
        })
    }

    pub fn kind(&self) -> Inferred {
        classify_value(self.value)
    }
}

/// Classify a value fragment such as `'value',` or `1000`.
pub fn classify_value(value: &str) -> Inferred {
    let value = value.trim().trim_end_matches([',', ';']).trim_end();
    if value.starts_with('\'') || value.starts_with('"') || value.starts_with('`') {
        Inferred::String
    } else if value == "true" || value == "false" {
        Inferred::Boolean
    } else if is_numeric(value) {
        Inferred::Number
    } else {
        Inferred::Unknown
    }
}

fn is_numeric(value: &str) -> bool {
    let digits = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    if digits == "Infinity" {
        return true;
    }

    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| digits.strip_prefix(prefix).map(|rest| (rest, radix)));
    if let Some((rest, radix)) = radix {
        return !rest.is_empty() && rest.chars().all(|c| c == '_' || c.is_digit(radix));
    }

    // Reject the spellings `f64::from_str` accepts but a TS literal cannot be.
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        || !digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-' | '_'))
    {
        return false;
    }
    digits.replace('_', "").parse::<f64>().is_ok()
}

/// Synthesize an index-signature type for the given object body lines.
///
/// Only lines at the top nesting level of the object are classified; lines
/// inside nested objects and arrays are skipped, and the property that opens
/// them counts as unknown. A body with no classifiable property, or with
/// more than one kind, falls back to `any`.
pub fn infer_index_signature<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    let mut kinds = BTreeSet::new();
    let mut depth = 0i32;

    for line in lines {
        let line = line.trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        let line = strip_trailing_comment(line);
        if depth == 0 {
            let kind = Property::split(line)
                .map(|prop| prop.kind())
                .unwrap_or(Inferred::Unknown);
            kinds.insert(kind);
        }
        depth += tokenize(line)
            .iter()
            .map(|t| match t.kind {
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => 1,
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => -1,
                _ => 0,
            })
            .sum::<i32>();
    }

    let kind = match kinds.len() {
        1 => kinds.into_iter().next().unwrap_or(Inferred::Unknown),
        _ => Inferred::Unknown,
    };
    kind.index_signature()
}

pub(crate) fn is_comment_line(line: &str) -> bool {
    line.starts_with("/*") || line.starts_with('*') || line.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_literals() {
        assert_eq!(classify_value("'value',"), Inferred::String);
        assert_eq!(classify_value("\"value\""), Inferred::String);
        assert_eq!(classify_value("`tpl ${x}`"), Inferred::String);
        assert_eq!(classify_value("true,"), Inferred::Boolean);
        assert_eq!(classify_value("false"), Inferred::Boolean);
        assert_eq!(classify_value("1000,"), Inferred::Number);
        assert_eq!(classify_value("-1.5e3"), Inferred::Number);
        assert_eq!(classify_value("0xff"), Inferred::Number);
        assert_eq!(classify_value("1_000"), Inferred::Number);
        assert_eq!(classify_value("Infinity"), Inferred::Number);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_value("someFn(),"), Inferred::Unknown);
        assert_eq!(classify_value("{"), Inferred::Unknown);
        assert_eq!(classify_value("[1, 2]"), Inferred::Unknown);
        assert_eq!(classify_value("inf"), Inferred::Unknown);
        assert_eq!(classify_value("NaN"), Inferred::Unknown);
        assert_eq!(classify_value(""), Inferred::Unknown);
        assert_eq!(classify_value("0x"), Inferred::Unknown);
    }

    #[test]
    fn test_property_split_ignores_colons_in_strings() {
        let prop = Property::split("'a:b': 'c:d',").unwrap();
        assert_eq!(prop.key, "'a:b'");
        assert_eq!(prop.value, "'c:d',");
        assert_eq!(prop.kind(), Inferred::String);
    }

    #[test]
    fn test_property_split_without_colon() {
        assert!(Property::split("},").is_none());
        assert!(Property::split("...rest,").is_none());
        assert!(Property::split("onError(error: Error) {").is_none());
    }

    #[test]
    fn test_single_kind_signature() {
        let sig = infer_index_signature(["a: 'x',", "b: \"y\",", "c: `z`"]);
        assert_eq!(sig, "{ [key: string]: string }");
    }

    #[test]
    fn test_mixed_kinds_fall_back_to_any() {
        let sig = infer_index_signature(["a: 'x',", "b: 1,"]);
        assert_eq!(sig, "{ [key: string]: any }");
    }

    #[test]
    fn test_empty_body_is_any() {
        assert_eq!(infer_index_signature(Vec::<&str>::new()), "{ [key: string]: any }");
    }

    #[test]
    fn test_nested_values_are_not_recursed() {
        let sig = infer_index_signature(["inner: {", "  a: 1,", "  b: 2,", "},"]);
        assert_eq!(sig, "{ [key: string]: any }");

        let sig = infer_index_signature(["a: 1,", "b: [", "  'x',", "],", "c: 3"]);
        assert_eq!(sig, "{ [key: string]: any }");

        let sig = infer_index_signature(["a: true, // first", "// note: ignored", "b: false"]);
        assert_eq!(sig, "{ [key: string]: boolean }");
    }
}
