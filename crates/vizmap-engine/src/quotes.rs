//! Quote lexing for reference matching.
//!
//! A delimiter only opens a reference when it opens a string literal. Patterns
//! alone cannot tell an opening quote from the closing quote of the previous
//! literal, so every pass lexes the text once and checks each match against
//! the recorded openers.
//!
//! Three string levels are recognized: JSON string literals, expression
//! strings written as `\"...\"` inside a JSON string, and single-quoted
//! expression strings. Escapes are honoured at both the JSON and the
//! expression level.

use std::ops::Range;

/// Positions where string literals open, plus the literal contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteMap {
    strings: Vec<usize>,
    escaped: Vec<usize>,
    single: Vec<usize>,
    literals: Vec<Range<usize>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Expr {
    Code,
    Double,
    Single,
}

impl QuoteMap {
    pub fn lex(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut map = Self::default();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'"' => {
                    map.strings.push(i);
                    let end = map.lex_json_string(bytes, i + 1);
                    map.literals.push(i + 1..end);
                    i = end + 1;
                }
                b'\'' => {
                    map.single.push(i);
                    let end = skip_single(bytes, i + 1);
                    map.literals.push(i + 1..end);
                    i = end + 1;
                }
                _ => i += 1,
            }
        }
        map
    }

    /// Whether a JSON string literal opens at `pos`.
    pub fn opens_string(&self, pos: usize) -> bool {
        self.strings.binary_search(&pos).is_ok()
    }

    /// Whether an escaped expression string (`\"`) opens at `pos`.
    pub fn opens_escaped(&self, pos: usize) -> bool {
        self.escaped.binary_search(&pos).is_ok()
    }

    /// Whether a single-quoted string opens at `pos`.
    pub fn opens_single(&self, pos: usize) -> bool {
        self.single.binary_search(&pos).is_ok()
    }

    /// Whether `pos` lies inside the contents of a top-level literal.
    pub fn in_literal(&self, pos: usize) -> bool {
        let idx = self.literals.partition_point(|range| range.start <= pos);
        idx > 0 && self.literals[idx - 1].contains(&pos)
    }

    /// Lexes a JSON string body starting at `start`; returns the index of the
    /// closing quote, or the text length when unterminated.
    fn lex_json_string(&mut self, bytes: &[u8], start: usize) -> usize {
        let mut expr = Expr::Code;
        let mut escaping = false;
        let mut i = start;
        while i < bytes.len() {
            let (unit, width) = match bytes[i] {
                b'"' => return i,
                b'\\' => match bytes.get(i + 1) {
                    Some(b'"') => (b'"', 2),
                    Some(b'\\') => (b'\\', 2),
                    Some(_) => (0, 2),
                    None => (0, 1),
                },
                other => (other, 1),
            };
            if escaping {
                escaping = false;
            } else {
                match (expr, unit) {
                    (Expr::Code, b'\'') => {
                        self.single.push(i);
                        expr = Expr::Single;
                    }
                    (Expr::Code, b'"') => {
                        self.escaped.push(i);
                        expr = Expr::Double;
                    }
                    (Expr::Single | Expr::Double, b'\\') => escaping = true,
                    (Expr::Single, b'\'') | (Expr::Double, b'"') => expr = Expr::Code,
                    _ => {}
                }
            }
            i += width;
        }
        bytes.len()
    }
}

fn skip_single(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\'' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_quotes_do_not_open() {
        let text = r#"{"x":["a","b"]}"#;
        let map = QuoteMap::lex(text);
        assert!(map.opens_string(1));
        assert!(map.opens_string(6));
        assert!(!map.opens_string(8));
        assert!(map.opens_string(10));
    }

    #[test]
    fn expression_strings_inside_json_strings() {
        let text = r#"{"e":"datum[\"a\"] + 'b' + 'it\\'s'"}"#;
        let map = QuoteMap::lex(text);
        let escaped = text.find(r#"\"a"#).unwrap();
        assert!(map.opens_escaped(escaped));
        assert!(!map.opens_escaped(escaped + 3));
        let single = text.find("'b").unwrap();
        assert!(map.opens_single(single));
        assert!(!map.opens_single(single + 2));
        let apostrophe = text.find(r"\\'s").unwrap() + 2;
        assert!(!map.opens_single(apostrophe));
    }

    #[test]
    fn literal_contents_exclude_structure() {
        let text = r#"{"e":"datum.a"}[1]"#;
        let map = QuoteMap::lex(text);
        assert!(map.in_literal(text.find('.').unwrap()));
        assert!(!map.in_literal(text.find('[').unwrap()));
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        let map = QuoteMap::lex(r#"{"a":"b"#);
        assert!(map.opens_string(5));
        assert!(map.in_literal(6));
    }
}
