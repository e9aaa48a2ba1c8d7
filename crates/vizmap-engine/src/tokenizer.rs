//! Replaces tracked field names with their placeholder tokens.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vizmap_model::{Placeholder, TrackedFields};

use crate::patterns::{SupplementaryPatternSpec, literal_pattern, supplementary_pattern_specs};
use crate::quotes::QuoteMap;
use crate::scan::{Candidate, arbitrate, splice};

const LITERAL_PRIORITY: u8 = 0;
const SYNTHETIC_PRIORITY: u8 = 1;

/// Input of a tokenization pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizationRequest {
    pub spec_text: String,
    pub tracked_fields: TrackedFields,
    #[serde(default = "supplementary_pattern_specs")]
    pub supplementary_replacers: Vec<SupplementaryPatternSpec>,
    /// Also retarget synthetic names derived from a tracked field
    /// (`Sales__highlight`). Set by the remap stage and by template export.
    #[serde(default)]
    pub is_remap: bool,
}

impl TokenizationRequest {
    pub fn new(spec_text: impl Into<String>, tracked_fields: TrackedFields) -> Self {
        Self {
            spec_text: spec_text.into(),
            tracked_fields,
            supplementary_replacers: supplementary_pattern_specs(),
            is_remap: false,
        }
    }

    #[must_use]
    pub fn for_remap(mut self) -> Self {
        self.is_remap = true;
        self
    }
}

/// Tokenizes `request.spec_text`.
///
/// Only the field name inside each matched reference changes; quotes,
/// escapes and accessor dots are kept byte for byte. Text that no pattern can
/// bound safely, such as an unterminated string, is left as it is.
pub fn tokenize(request: &TokenizationRequest) -> String {
    let text = request.spec_text.as_str();
    if text.is_empty() {
        return String::new();
    }

    let quotes = QuoteMap::lex(text);
    let mut candidates = Vec::new();
    for entry in request.tracked_fields.by_placeholder() {
        let Some(token) = entry.placeholder.as_ref() else {
            continue;
        };
        if let Some(pattern) = literal_pattern(&entry.name, &entry.field_key) {
            for reference in pattern.find_references(text, &quotes) {
                candidates.push(Candidate::new(
                    reference.span.clone(),
                    LITERAL_PRIORITY,
                    (reference, token.as_str().to_string()),
                ));
            }
        }
        if !request.is_remap {
            continue;
        }
        for replacer in &request.supplementary_replacers {
            let (Some(derived), Some(suffix)) = (replacer.derive_name(&entry.name), replacer.suffix())
            else {
                continue;
            };
            let Some(pattern) = literal_pattern(&derived, &entry.field_key) else {
                continue;
            };
            let replacement = format!("{token}{suffix}");
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
        fields = request.tracked_fields.len(),
        is_remap = request.is_remap,
        "tokenized specification"
    );
    splice(text, &replacements)
}

/// Placeholders of tokenizable entries that do not occur in `text`.
///
/// Callers use this after tokenizing to detect regions the tokenizer left
/// untouched.
pub fn missing_tokens(text: &str, tracked_fields: &TrackedFields) -> Vec<Placeholder> {
    let quotes = QuoteMap::lex(text);
    tracked_fields
        .by_placeholder()
        .into_iter()
        .filter_map(|entry| entry.placeholder.clone())
        .filter(|token| {
            literal_pattern(token.as_str(), token.as_str())
                .is_none_or(|pattern| pattern.find_references(text, &quotes).is_empty())
        })
        .collect()
}
