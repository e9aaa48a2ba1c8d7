//! Registry of dataset fields referenced by a specification.
//!
//! Entries are produced by the tracker pass. A field that is not referenced
//! has no entry at all; the registry never holds a zero match count.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::Placeholder;

/// How a field is referenced in specification text.
///
/// Ordered so that `Direct` sorts first; the first present kind is the
/// entry's primary usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageKind {
    /// The field's literal name.
    Direct,
    /// `<base>__highlight`
    CrossHighlightValue,
    /// `<base>__highlightComparator`
    CrossHighlightComparator,
    /// `<base>__highlightStatus`
    CrossHighlightStatus,
    /// The reserved selection status field.
    SelectionStatus,
    /// The reserved row identifier field.
    RowIdentifier,
}

impl UsageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageKind::Direct => "direct",
            UsageKind::CrossHighlightValue => "crossHighlightValue",
            UsageKind::CrossHighlightComparator => "crossHighlightComparator",
            UsageKind::CrossHighlightStatus => "crossHighlightStatus",
            UsageKind::SelectionStatus => "selectionStatus",
            UsageKind::RowIdentifier => "rowIdentifier",
        }
    }

    /// True for usages derived from a base field rather than its literal name.
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, UsageKind::Direct)
    }

    /// True for reserved fields that stay literal in portable templates.
    pub fn is_reserved(&self) -> bool {
        matches!(self, UsageKind::SelectionStatus | UsageKind::RowIdentifier)
    }
}

/// One referenced dataset field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedFieldEntry {
    pub field_key: String,
    /// Display name as it appears in the specification.
    pub name: String,
    /// Token used when the field is tokenized. Reserved fields have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Placeholder>,
    pub match_count: usize,
    #[serde(default)]
    pub usages: BTreeMap<UsageKind, usize>,
}

impl TrackedFieldEntry {
    pub fn new(field_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field_key: field_key.into(),
            name: name.into(),
            placeholder: None,
            match_count: 0,
            usages: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Counts one occurrence of the given usage.
    pub fn record(&mut self, kind: UsageKind) {
        *self.usages.entry(kind).or_insert(0) += 1;
        self.match_count += 1;
    }

    /// Primary usage kind, `None` when the entry has no matches.
    pub fn usage_kind(&self) -> Option<UsageKind> {
        self.usages.keys().next().copied()
    }

    pub fn count_for(&self, kind: UsageKind) -> usize {
        self.usages.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_tokenizable(&self) -> bool {
        self.placeholder.is_some()
    }
}

/// Registry of tracked fields keyed by field key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, TrackedFieldEntry>",
    into = "BTreeMap<String, TrackedFieldEntry>"
)]
pub struct TrackedFields {
    entries: BTreeMap<String, TrackedFieldEntry>,
}

impl TrackedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any previous entry for the same key.
    ///
    /// Returns false (and stores nothing) when the entry has no matches.
    pub fn insert(&mut self, entry: TrackedFieldEntry) -> bool {
        if entry.match_count == 0 {
            return false;
        }
        self.entries.insert(entry.field_key.clone(), entry);
        true
    }

    pub fn get(&self, field_key: &str) -> Option<&TrackedFieldEntry> {
        self.entries.get(field_key)
    }

    pub fn contains(&self, field_key: &str) -> bool {
        self.entries.contains_key(field_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedFieldEntry> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Placeholders currently assigned to entries.
    pub fn placeholders(&self) -> BTreeSet<Placeholder> {
        self.entries
            .values()
            .filter_map(|entry| entry.placeholder.clone())
            .collect()
    }

    pub fn find_by_placeholder(&self, placeholder: &str) -> Option<&TrackedFieldEntry> {
        self.entries.values().find(|entry| {
            entry
                .placeholder
                .as_ref()
                .is_some_and(|token| token.as_str() == placeholder)
        })
    }

    /// Tokenizable entries ordered by placeholder index.
    pub fn by_placeholder(&self) -> Vec<&TrackedFieldEntry> {
        let mut entries: Vec<&TrackedFieldEntry> = self
            .entries
            .values()
            .filter(|entry| entry.is_tokenizable())
            .collect();
        entries.sort_by(|a, b| a.placeholder.cmp(&b.placeholder));
        entries
    }
}

impl From<BTreeMap<String, TrackedFieldEntry>> for TrackedFields {
    fn from(entries: BTreeMap<String, TrackedFieldEntry>) -> Self {
        entries.into_values().collect()
    }
}

impl From<TrackedFields> for BTreeMap<String, TrackedFieldEntry> {
    fn from(value: TrackedFields) -> Self {
        value.entries
    }
}

impl FromIterator<TrackedFieldEntry> for TrackedFields {
    fn from_iter<I: IntoIterator<Item = TrackedFieldEntry>>(iter: I) -> Self {
        let mut fields = Self::new();
        for entry in iter {
            fields.insert(entry);
        }
        fields
    }
}

impl<'a> IntoIterator for &'a TrackedFields {
    type Item = &'a TrackedFieldEntry;
    type IntoIter = std::collections::btree_map::Values<'a, String, TrackedFieldEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// Drill field usage reported alongside the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedDrilldown {
    /// The specification references a drill field.
    pub is_current: bool,
    /// The drill field is referenced but the dataset has no drill hierarchy
    /// bound, so the remap dialog has to ask for one.
    pub is_mapping_required: bool,
}

impl TrackedDrilldown {
    pub fn evaluate(is_current: bool, has_drilldown: bool) -> Self {
        Self {
            is_current,
            is_mapping_required: is_current && !has_drilldown,
        }
    }
}
