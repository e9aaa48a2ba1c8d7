//! Rewrites placeholder tokens into the field names chosen for a new dataset.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vizmap_model::{Placeholder, TrackedFields, UsermetaDatasetField};

use crate::patterns::{SupplementaryPatternSpec, literal_pattern, supplementary_pattern_specs};
use crate::quotes::QuoteMap;
use crate::scan::{Candidate, arbitrate, splice};

const LITERAL_PRIORITY: u8 = 0;
const SYNTHETIC_PRIORITY: u8 = 1;

/// Input of a remapping pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemappingRequest {
    pub tokenized_spec_text: String,
    pub remap_fields: Vec<UsermetaDatasetField>,
    #[serde(default)]
    pub tracked_fields: TrackedFields,
    /// Suffix conventions whose token-prefixed names follow their base slot.
    #[serde(default = "supplementary_pattern_specs")]
    pub supplementary_replacers: Vec<SupplementaryPatternSpec>,
}

impl RemappingRequest {
    pub fn new(
        tokenized_spec_text: impl Into<String>,
        remap_fields: Vec<UsermetaDatasetField>,
    ) -> Self {
        Self {
            tokenized_spec_text: tokenized_spec_text.into(),
            remap_fields,
            tracked_fields: TrackedFields::new(),
            supplementary_replacers: supplementary_pattern_specs(),
        }
    }

    #[must_use]
    pub fn with_tracked_fields(mut self, tracked_fields: TrackedFields) -> Self {
        self.tracked_fields = tracked_fields;
        self
    }

    #[must_use]
    pub fn with_replacers(mut self, replacers: Vec<SupplementaryPatternSpec>) -> Self {
        self.supplementary_replacers = replacers;
        self
    }
}

/// Replaces every bounded occurrence of an assigned slot's token.
///
/// Slots without a `supplied_object_name` keep their token. Token-prefixed
/// synthetic names (`__0____highlight`) follow their base slot. The supplied
/// name is escaped for the context of each reference; an accessor
/// (`datum.__0__`) whose new name is not an identifier becomes a quoted
/// bracket accessor.
pub fn remap(request: &RemappingRequest) -> String {
    let text = request.tokenized_spec_text.as_str();
    if text.is_empty() {
        return String::new();
    }

    let suffixes: Vec<&str> = request
        .supplementary_replacers
        .iter()
        .filter_map(SupplementaryPatternSpec::suffix)
        .collect();

    let quotes = QuoteMap::lex(text);
    let mut candidates = Vec::new();
    let mut unassigned = 0usize;
    for field in &request.remap_fields {
        let Some(supplied) = field.supplied_object_name.as_deref() else {
            unassigned += 1;
            continue;
        };
        let token = resolve_token(field, &request.tracked_fields);
        if let Some(pattern) = literal_pattern(token, &field.key) {
            for reference in pattern.find_references(text, &quotes) {
                candidates.push(Candidate::new(
                    reference.span.clone(),
                    LITERAL_PRIORITY,
                    (reference, supplied.to_string()),
                ));
            }
        }
        for suffix in &suffixes {
            let Some(pattern) = literal_pattern(&format!("{token}{suffix}"), &field.key) else {
                continue;
            };
            let replacement = format!("{supplied}{suffix}");
            for reference in pattern.find_references(text, &quotes) {
                candidates.push(Candidate::new(
                    reference.span.clone(),
                    SYNTHETIC_PRIORITY,
                    (reference, replacement.clone()),
                ));
            }
        }
    }

    let replacements: Vec<_> = arbitrate(candidates)
        .into_iter()
        .map(|candidate| {
            let (reference, name) = candidate.value;
            reference.rewrite(&name)
        })
        .collect();
    debug!(
        replaced = replacements.len(),
        unassigned,
        "remapped specification"
    );
    splice(text, &replacements)
}

/// Token a slot occupies in the text.
///
/// Slots normally carry their placeholder as `key`; a slot keyed by a
/// tracked field's key resolves to that field's placeholder instead.
fn resolve_token<'a>(field: &'a UsermetaDatasetField, tracked: &'a TrackedFields) -> &'a str {
    tracked
        .get(&field.key)
        .and_then(|entry| entry.placeholder.as_ref())
        .map_or(field.key.as_str(), Placeholder::as_str)
}

#[cfg(test)]
mod tests {
    use vizmap_model::{DataType, FieldRole, TrackedFieldEntry, UsageKind};

    use super::*;

    fn slot(key: &str, supplied: Option<&str>) -> UsermetaDatasetField {
        let mut field = UsermetaDatasetField::new(key, "Sales", DataType::Numeric, FieldRole::Measure);
        if let Some(name) = supplied {
            field.assign(format!("Sum({name})"), name);
        }
        field
    }

    #[test]
    fn replaces_assigned_tokens() {
        let text = r#"{"y":{"field":"__0__"},"expr":"datum.__0__ + datum.__1__"}"#;
        let out = remap(&RemappingRequest::new(
            text,
            vec![slot("__0__", Some("Revenue")), slot("__1__", None)],
        ));
        assert_eq!(out, r#"{"y":{"field":"Revenue"},"expr":"datum.Revenue + datum.__1__"}"#);
    }

    #[test]
    fn tokens_do_not_match_longer_tokens() {
        let text = r#"{"a":"__1__","b":"__10__"}"#;
        let out = remap(&RemappingRequest::new(text, vec![slot("__1__", Some("X"))]));
        assert_eq!(out, r#"{"a":"X","b":"__10__"}"#);
    }

    #[test]
    fn synthetic_variants_follow_their_base() {
        let text = r#"{"a":"__0____highlight","b":"__0____highlightStatus"}"#;
        let out = remap(&RemappingRequest::new(text, vec![slot("__0__", Some("Revenue"))]));
        assert_eq!(out, r#"{"a":"Revenue__highlight","b":"Revenue__highlightStatus"}"#);
    }

    #[test]
    fn supplied_names_are_json_escaped() {
        let text = r#"{"a":"__0__"}"#;
        let out = remap(&RemappingRequest::new(text, vec![slot("__0__", Some("say \"hi\""))]));
        assert_eq!(out, r#"{"a":"say \"hi\""}"#);
    }

    #[test]
    fn names_are_escaped_for_their_context() {
        let text = r#"{"y":"__0__","e":"datum.__0__ * 2 + datum['__0__'] + datum[\"__0__\"]"}"#;
        let out = remap(&RemappingRequest::new(text, vec![slot("__0__", Some("Bob's \"Sales\""))]));
        assert_eq!(
            out,
            r#"{"y":"Bob's \"Sales\"","e":"datum['Bob\\'s \"Sales\"'] * 2 + datum['Bob\\'s \"Sales\"'] + datum[\"Bob's \\\"Sales\\\"\"]"}"#
        );
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
    }

    #[test]
    fn accessor_becomes_bracket_for_non_identifiers() {
        let text = r#"{"e":"datum.__0__ * 2"}"#;
        let out = remap(&RemappingRequest::new(text, vec![slot("__0__", Some("Total Sales"))]));
        assert_eq!(out, r#"{"e":"datum['Total Sales'] * 2"}"#);
    }

    #[test]
    fn custom_replacers_are_honoured() {
        let text = r#"{"a":"__0____tint"}"#;
        let custom = vec![SupplementaryPatternSpec::Suffix {
            suffix: "__tint".to_string(),
            kind: crate::patterns::SyntheticKind::HighlightValue,
        }];
        let request = RemappingRequest::new(text, vec![slot("__0__", Some("Revenue"))]);
        assert_eq!(remap(&request), text);
        assert_eq!(
            remap(&request.with_replacers(custom)),
            r#"{"a":"Revenue__tint"}"#
        );
    }

    #[test]
    fn slots_keyed_by_field_resolve_through_registry() {
        let mut entry = TrackedFieldEntry::new("Sum(Sales)", "Sales")
            .with_placeholder(Placeholder::from_index(3));
        entry.record(UsageKind::Direct);
        let tracked: TrackedFields = std::iter::once(entry).collect();
        let text = r#"{"a":"__3__"}"#;
        let out = remap(
            &RemappingRequest::new(text, vec![slot("Sum(Sales)", Some("Revenue"))])
                .with_tracked_fields(tracked),
        );
        assert_eq!(out, r#"{"a":"Revenue"}"#);
    }
}
