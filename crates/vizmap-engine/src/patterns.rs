//! Token pattern library.
//!
//! Builds the match patterns used by every pass. A literal pattern matches a
//! field name only where it forms a complete reference:
//!
//! - a JSON string literal: `"Sales"`
//! - an escaped string inside a JSON string: `\"Sales\"`
//! - a single-quoted expression string: `'Sales'`
//! - a bare bracket accessor: `datum[Sales]`
//! - a property accessor segment: `datum.Sales` (identifier names only)
//!
//! so `amount` never matches inside `total_amount`. Quoted forms only match
//! where the quote opens a literal (see [`crate::quotes`]), and the name is
//! escaped the way each form writes it. Supplementary patterns
//! cover reserved field names and the cross-highlight naming convention, which
//! derives synthetic names from a base measure by suffix.

use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;
use vizmap_model::{DatasetField, UsageKind};

use crate::quotes::QuoteMap;
use crate::utils::{encode_name, is_identifier};

/// Reserved row identifier field.
pub const ROW_IDENTIFIER_FIELD: &str = "__identity__";
/// Reserved selection status field.
pub const SELECTION_STATUS_FIELD: &str = "__selected__";
/// Reserved drill hierarchy field.
pub const DRILLDOWN_FIELD: &str = "__drilldown__";
/// Reserved flattened drill hierarchy field.
pub const DRILLDOWN_FLAT_FIELD: &str = "__drilldown_flat__";

pub const HIGHLIGHT_SUFFIX: &str = "__highlight";
pub const HIGHLIGHT_COMPARATOR_SUFFIX: &str = "__highlightComparator";
pub const HIGHLIGHT_STATUS_SUFFIX: &str = "__highlightStatus";

/// Kind of synthetic (non-dataset) field a supplementary pattern recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyntheticKind {
    HighlightValue,
    HighlightComparator,
    HighlightStatus,
    SelectionStatus,
    RowIdentifier,
    Drilldown,
    DrilldownFlat,
}

impl SyntheticKind {
    /// Usage recorded against a tracked field, `None` for drill fields which
    /// are reported through the drilldown properties instead.
    pub fn usage_kind(&self) -> Option<UsageKind> {
        match self {
            SyntheticKind::HighlightValue => Some(UsageKind::CrossHighlightValue),
            SyntheticKind::HighlightComparator => Some(UsageKind::CrossHighlightComparator),
            SyntheticKind::HighlightStatus => Some(UsageKind::CrossHighlightStatus),
            SyntheticKind::SelectionStatus => Some(UsageKind::SelectionStatus),
            SyntheticKind::RowIdentifier => Some(UsageKind::RowIdentifier),
            SyntheticKind::Drilldown | SyntheticKind::DrilldownFlat => None,
        }
    }

    pub fn is_drilldown(&self) -> bool {
        matches!(self, SyntheticKind::Drilldown | SyntheticKind::DrilldownFlat)
    }
}

/// Serializable description of a supplementary pattern.
///
/// Descriptors cross the worker boundary; the worker compiles them with
/// [`compile_supplementary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "camelCase")]
pub enum SupplementaryPatternSpec {
    /// A fixed reserved field name.
    Reserved { name: String, kind: SyntheticKind },
    /// A name derived from any base field by appending `suffix`.
    Suffix { suffix: String, kind: SyntheticKind },
}

impl SupplementaryPatternSpec {
    pub fn kind(&self) -> SyntheticKind {
        match self {
            Self::Reserved { kind, .. } | Self::Suffix { kind, .. } => *kind,
        }
    }

    /// Concrete synthetic name for `base`; only suffix descriptors derive names.
    pub fn derive_name(&self, base: &str) -> Option<String> {
        match self {
            Self::Suffix { suffix, .. } => Some(format!("{base}{suffix}")),
            Self::Reserved { .. } => None,
        }
    }

    pub fn suffix(&self) -> Option<&str> {
        match self {
            Self::Suffix { suffix, .. } => Some(suffix),
            Self::Reserved { .. } => None,
        }
    }

    pub fn compile(&self) -> Option<TokenPattern> {
        let (key, built) = match self {
            Self::Reserved { name, .. } => (name.clone(), literal_regex(name)),
            Self::Suffix { suffix, .. } => {
                let escaped = regex::escape(&encode_name(suffix));
                let quoted = format!(r#"[^"'\\\r\n.\[\]]+?{escaped}"#);
                let forms = FormPatterns {
                    string: quoted.clone(),
                    escaped: quoted.clone(),
                    single: quoted.clone(),
                    bracket: Some(quoted),
                    accessor: Some(format!(r"[\p{{L}}_$][\w$]*?{escaped}")),
                };
                (suffix.clone(), forms.compile())
            }
        };
        match built {
            Ok(regex) => Some(TokenPattern {
                regex,
                field_key: key,
                kind: PatternKind::Supplementary(self.kind()),
            }),
            Err(error) => {
                warn!(pattern = ?self, %error, "skipping supplementary pattern");
                None
            }
        }
    }
}

/// Discriminates literal dataset field patterns from synthetic ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Literal,
    Supplementary(SyntheticKind),
}

/// A compiled match pattern paired with the field it belongs to.
#[derive(Debug, Clone)]
pub struct TokenPattern {
    regex: Regex,
    field_key: String,
    kind: PatternKind,
}

impl TokenPattern {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Field key for literal patterns; the reserved name or suffix for
    /// supplementary ones.
    pub fn field_key(&self) -> &str {
        &self.field_key
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Byte ranges of the matched names, excluding the delimiters.
    pub fn find_spans(&self, text: &str) -> Vec<Range<usize>> {
        self.find_references(text, &QuoteMap::lex(text))
            .into_iter()
            .map(|reference| reference.span)
            .collect()
    }

    /// References to this pattern's name in `text`, lexed as `quotes`.
    ///
    /// A quoted match counts only when its opening delimiter opens a string
    /// literal; bracket and accessor matches only inside a literal.
    pub fn find_references(&self, text: &str, quotes: &QuoteMap) -> Vec<Reference> {
        let mut references = Vec::new();
        let mut at = 0;
        while at < text.len() {
            let Some(caps) = self.regex.captures_at(text, at) else {
                break;
            };
            let Some((form, name)) = ReferenceForm::ALL
                .iter()
                .find_map(|form| caps.name(form.group()).map(|name| (*form, name)))
            else {
                break;
            };
            if form.is_bounded(name.start(), quotes) {
                references.push(Reference {
                    span: name.range(),
                    form,
                });
                at = name.end();
            } else {
                at = caps.get(0).map_or(name.start(), |whole| whole.start()) + 1;
            }
        }
        references
    }

    pub fn is_match(&self, text: &str) -> bool {
        !self.find_spans(text).is_empty()
    }
}

/// Syntactic position a reference was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceForm {
    /// A JSON string literal: `"Sales"`.
    String,
    /// An expression string inside a JSON string: `\"Sales\"`.
    EscapedString,
    /// A single-quoted expression string: `'Sales'`.
    SingleQuoted,
    /// A bare bracket accessor: `datum[Sales]`.
    Bracket,
    /// A property accessor segment: `datum.Sales`.
    Accessor,
}

impl ReferenceForm {
    const ALL: [ReferenceForm; 5] = [
        ReferenceForm::EscapedString,
        ReferenceForm::String,
        ReferenceForm::SingleQuoted,
        ReferenceForm::Bracket,
        ReferenceForm::Accessor,
    ];

    fn group(self) -> &'static str {
        match self {
            ReferenceForm::String => "string",
            ReferenceForm::EscapedString => "escaped",
            ReferenceForm::SingleQuoted => "single",
            ReferenceForm::Bracket => "bracket",
            ReferenceForm::Accessor => "accessor",
        }
    }

    /// Checks the delimiter in front of a name starting at `start`.
    fn is_bounded(self, start: usize, quotes: &QuoteMap) -> bool {
        match self {
            ReferenceForm::String => start.checked_sub(1).is_some_and(|at| quotes.opens_string(at)),
            ReferenceForm::EscapedString => {
                start.checked_sub(2).is_some_and(|at| quotes.opens_escaped(at))
            }
            ReferenceForm::SingleQuoted => {
                start.checked_sub(1).is_some_and(|at| quotes.opens_single(at))
            }
            ReferenceForm::Bracket | ReferenceForm::Accessor => {
                start.checked_sub(1).is_some_and(|at| quotes.in_literal(at))
            }
        }
    }
}

/// A matched name and the form it was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Byte range of the name, excluding delimiters.
    pub span: Range<usize>,
    pub form: ReferenceForm,
}

impl Reference {
    /// Replacement that makes this reference point at `name`.
    ///
    /// The name is escaped for the quoting context. An accessor or bare
    /// bracket that cannot hold `name` as written becomes a quoted bracket
    /// accessor, so the returned range may include the leading `.`.
    pub fn rewrite(&self, name: &str) -> (Range<usize>, String) {
        let span = self.span.clone();
        match self.form {
            ReferenceForm::String => (span, encode_name(name)),
            ReferenceForm::EscapedString => (span, encode_name(&encode_name(name))),
            ReferenceForm::SingleQuoted => (span, encode_name(&escape_single(name))),
            ReferenceForm::Bracket if is_bare_key(name) => (span, encode_name(name)),
            ReferenceForm::Bracket => (span, quoted_key(name)),
            ReferenceForm::Accessor if is_identifier(name) => (span, name.to_string()),
            ReferenceForm::Accessor => (
                span.start.saturating_sub(1)..span.end,
                format!("[{}]", quoted_key(name)),
            ),
        }
    }
}

/// Descriptors for every reserved name and cross-highlight suffix.
pub fn supplementary_pattern_specs() -> Vec<SupplementaryPatternSpec> {
    let reserved = [
        (ROW_IDENTIFIER_FIELD, SyntheticKind::RowIdentifier),
        (SELECTION_STATUS_FIELD, SyntheticKind::SelectionStatus),
        (DRILLDOWN_FIELD, SyntheticKind::Drilldown),
        (DRILLDOWN_FLAT_FIELD, SyntheticKind::DrilldownFlat),
    ];
    let suffixes = [
        (HIGHLIGHT_SUFFIX, SyntheticKind::HighlightValue),
        (HIGHLIGHT_COMPARATOR_SUFFIX, SyntheticKind::HighlightComparator),
        (HIGHLIGHT_STATUS_SUFFIX, SyntheticKind::HighlightStatus),
    ];
    reserved
        .into_iter()
        .map(|(name, kind)| SupplementaryPatternSpec::Reserved {
            name: name.to_string(),
            kind,
        })
        .chain(
            suffixes
                .into_iter()
                .map(|(suffix, kind)| SupplementaryPatternSpec::Suffix {
                    suffix: suffix.to_string(),
                    kind,
                }),
        )
        .collect()
}

/// Compiled supplementary patterns for the default descriptors.
pub fn supplementary_patterns() -> Vec<TokenPattern> {
    compile_supplementary(&supplementary_pattern_specs())
}

pub fn compile_supplementary(specs: &[SupplementaryPatternSpec]) -> Vec<TokenPattern> {
    specs.iter().filter_map(SupplementaryPatternSpec::compile).collect()
}

/// Literal patterns for dataset fields.
///
/// Highlight components are skipped: their usage is attributed to the base
/// measure through the supplementary suffix patterns.
pub fn literal_patterns<'a>(fields: impl IntoIterator<Item = &'a DatasetField>) -> Vec<TokenPattern> {
    fields
        .into_iter()
        .filter(|field| !field.is_highlight_component)
        .filter_map(|field| literal_pattern(&field.name, &field.key))
        .collect()
}

/// Literal pattern for a single name. Returns `None` for an empty name or a
/// pattern the regex engine rejects (logged, never a panic).
pub fn literal_pattern(name: &str, field_key: &str) -> Option<TokenPattern> {
    if name.is_empty() {
        return None;
    }
    match literal_regex(name) {
        Ok(regex) => Some(TokenPattern {
            regex,
            field_key: field_key.to_string(),
            kind: PatternKind::Literal,
        }),
        Err(error) => {
            warn!(field_key, %error, "skipping literal pattern");
            None
        }
    }
}

/// Synthetic names generated from a base field name.
pub fn synthetic_names(base: &str) -> Vec<(SyntheticKind, String)> {
    supplementary_pattern_specs()
        .iter()
        .filter_map(|spec| spec.derive_name(base).map(|name| (spec.kind(), name)))
        .collect()
}

/// The reserved kind for `name`, if it is one of the reserved field names.
pub fn reserved_kind(name: &str) -> Option<SyntheticKind> {
    supplementary_pattern_specs()
        .into_iter()
        .find_map(|spec| match spec {
            SupplementaryPatternSpec::Reserved { name: reserved, kind } if reserved == name => {
                Some(kind)
            }
            _ => None,
        })
}

fn literal_regex(name: &str) -> Result<Regex, regex::Error> {
    let string = regex::escape(&encode_name(name));
    FormPatterns {
        escaped: regex::escape(&encode_name(&encode_name(name))),
        single: regex::escape(&encode_name(&escape_single(name))),
        bracket: is_bare_key(name).then(|| string.clone()),
        accessor: is_identifier(name).then(|| regex::escape(name)),
        string,
    }
    .compile()
}

/// Regex fragments for the name as written in each reference form.
struct FormPatterns {
    string: String,
    escaped: String,
    single: String,
    bracket: Option<String>,
    accessor: Option<String>,
}

impl FormPatterns {
    fn compile(&self) -> Result<Regex, regex::Error> {
        let mut pattern = format!(
            r#"\\"(?P<escaped>{})\\"|"(?P<string>{})"|'(?P<single>{})'"#,
            self.escaped, self.string, self.single
        );
        if let Some(bracket) = &self.bracket {
            pattern.push_str(&format!(r"|\[(?P<bracket>{bracket})\]"));
        }
        if let Some(accessor) = &self.accessor {
            pattern.push_str(&format!(r"|\.(?P<accessor>{accessor})(?:[^\w$]|$)"));
        }
        Regex::new(&pattern)
    }
}

/// Escapes `name` for a single-quoted expression string.
fn escape_single(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Whether `name` can stand unquoted between brackets.
fn is_bare_key(name: &str) -> bool {
    !name.contains(['[', ']', '\'', '"', '\\'])
}

/// `'name'` escaped for use inside a JSON string.
fn quoted_key(name: &str) -> String {
    encode_name(&format!("'{}'", escape_single(name)))
}
