//! Span arbitration and splicing shared by the tracker, tokenizer and remapper.
//!
//! Every pass first collects candidate spans from all of its patterns and then
//! resolves overlaps in one place, so a given stretch of text is attributed to
//! exactly one field no matter how the patterns were ordered.

use std::cmp::Reverse;
use std::ops::Range;

/// A matched name span carrying pass-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate<T> {
    pub span: Range<usize>,
    /// Lower wins when two candidates cover the same span.
    pub priority: u8,
    pub value: T,
}

impl<T> Candidate<T> {
    pub fn new(span: Range<usize>, priority: u8, value: T) -> Self {
        Self {
            span,
            priority,
            value,
        }
    }
}

/// Keeps a deterministic, non-overlapping subset of `candidates`.
///
/// Earliest start wins, then the longest span, then the lowest priority,
/// then collection order.
pub(crate) fn arbitrate<T>(mut candidates: Vec<Candidate<T>>) -> Vec<Candidate<T>> {
    candidates.sort_by_key(|c| (c.span.start, Reverse(c.span.end), c.priority));
    let mut accepted: Vec<Candidate<T>> = Vec::with_capacity(candidates.len());
    let mut covered_until = 0;
    for candidate in candidates {
        if candidate.span.start < covered_until {
            continue;
        }
        covered_until = candidate.span.end;
        accepted.push(candidate);
    }
    accepted
}

/// Rebuilds `text` with each accepted span replaced.
///
/// `replacements` must be sorted and non-overlapping, as returned by
/// [`arbitrate`].
pub(crate) fn splice(text: &str, replacements: &[(Range<usize>, String)]) -> String {
    if replacements.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (span, replacement) in replacements {
        out.push_str(&text[cursor..span.start]);
        out.push_str(replacement);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_span_wins_at_same_start() {
        let accepted = arbitrate(vec![
            Candidate::new(0..5, 0, "short"),
            Candidate::new(0..9, 1, "long"),
            Candidate::new(3..7, 0, "inner"),
            Candidate::new(10..12, 0, "next"),
        ]);
        let values: Vec<&str> = accepted.iter().map(|c| c.value).collect();
        assert_eq!(values, vec!["long", "next"]);
    }

    #[test]
    fn priority_breaks_exact_ties() {
        let accepted = arbitrate(vec![
            Candidate::new(2..6, 1, "synthetic"),
            Candidate::new(2..6, 0, "literal"),
        ]);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].value, "literal");
    }

    #[test]
    fn splices_in_order() {
        let text = r#"{"a":"x","b":"x"}"#;
        let out = splice(text, &[(6..7, "y1".to_string()), (14..15, "y2".to_string())]);
        assert_eq!(out, r#"{"a":"y1","b":"y2"}"#);
    }
}
