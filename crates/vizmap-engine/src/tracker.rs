//! Field reference scanner.
//!
//! Every call rescans the full specification text. The previous registry is
//! only consulted for placeholder continuity; match counts always come from
//! the current text.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vizmap_model::{
    DatasetField, Placeholder, TrackedDrilldown, TrackedFieldEntry, TrackedFields, UsageKind,
};

use crate::patterns::{
    SupplementaryPatternSpec, SyntheticKind, literal_pattern, supplementary_pattern_specs,
};
use crate::quotes::QuoteMap;
use crate::scan::{Candidate, arbitrate};

const LITERAL_PRIORITY: u8 = 0;
const SYNTHETIC_PRIORITY: u8 = 1;

/// Input of a tracking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    pub spec_text: String,
    pub known_fields: Vec<DatasetField>,
    #[serde(default)]
    pub previous_tracked_fields: TrackedFields,
    #[serde(default)]
    pub has_drilldown: bool,
    #[serde(default = "supplementary_pattern_specs")]
    pub supplementary_patterns: Vec<SupplementaryPatternSpec>,
    /// Discard `previous_tracked_fields` and allocate placeholders afresh.
    #[serde(default)]
    pub reset: bool,
}

impl TrackingRequest {
    pub fn new(spec_text: impl Into<String>, known_fields: Vec<DatasetField>) -> Self {
        Self {
            spec_text: spec_text.into(),
            known_fields,
            previous_tracked_fields: TrackedFields::new(),
            has_drilldown: false,
            supplementary_patterns: supplementary_pattern_specs(),
            reset: false,
        }
    }

    #[must_use]
    pub fn with_previous(mut self, previous: TrackedFields) -> Self {
        self.previous_tracked_fields = previous;
        self
    }

    #[must_use]
    pub fn with_drilldown(mut self, has_drilldown: bool) -> Self {
        self.has_drilldown = has_drilldown;
        self
    }

    #[must_use]
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResponse {
    pub tracked_fields: TrackedFields,
    pub tracked_drilldown: TrackedDrilldown,
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    field: usize,
    usage: UsageKind,
}

/// Scans `request.spec_text` for references to the known fields.
pub fn track(request: &TrackingRequest) -> TrackingResponse {
    let text = request.spec_text.as_str();
    let tracked_drilldown = TrackedDrilldown::evaluate(
        references_drilldown(text, &request.supplementary_patterns),
        request.has_drilldown,
    );

    if text.trim().is_empty() || request.known_fields.is_empty() {
        debug!(reset = request.reset, "nothing to track");
        return TrackingResponse {
            tracked_fields: TrackedFields::new(),
            tracked_drilldown,
        };
    }

    let hits = collect_hits(text, &request.known_fields, &request.supplementary_patterns);
    let match_count = hits.len();
    let mut entries: Vec<Option<TrackedFieldEntry>> = vec![None; request.known_fields.len()];
    for hit in hits {
        let field = &request.known_fields[hit.field];
        entries[hit.field]
            .get_or_insert_with(|| TrackedFieldEntry::new(&field.key, &field.name))
            .record(hit.usage);
    }

    let previous = (!request.reset).then_some(&request.previous_tracked_fields);
    assign_placeholders(&mut entries, previous, &request.known_fields, text);

    let tracked_fields: TrackedFields = entries.into_iter().flatten().collect();
    debug!(
        fields = tracked_fields.len(),
        matches = match_count,
        reset = request.reset,
        drilldown = tracked_drilldown.is_current,
        "tracked field usage"
    );
    TrackingResponse {
        tracked_fields,
        tracked_drilldown,
    }
}

fn collect_hits(
    text: &str,
    fields: &[DatasetField],
    specs: &[SupplementaryPatternSpec],
) -> Vec<Hit> {
    let quotes = QuoteMap::lex(text);
    let mut candidates = Vec::new();
    for (idx, field) in fields.iter().enumerate() {
        if field.is_highlight_component {
            continue;
        }
        let reserved = reserved_kind_in(&field.name, specs);
        if reserved.is_some_and(|kind| kind.is_drilldown()) {
            continue;
        }
        let usage = reserved
            .and_then(|kind| kind.usage_kind())
            .unwrap_or(UsageKind::Direct);

        if let Some(pattern) = literal_pattern(&field.name, &field.key) {
            for reference in pattern.find_references(text, &quotes) {
                candidates.push(Candidate::new(
                    reference.span,
                    LITERAL_PRIORITY,
                    Hit { field: idx, usage },
                ));
            }
        }
        if usage != UsageKind::Direct {
            continue;
        }
        for spec in specs {
            let (Some(derived), Some(usage)) = (spec.derive_name(&field.name), spec.kind().usage_kind())
            else {
                continue;
            };
            let Some(pattern) = literal_pattern(&derived, &field.key) else {
                continue;
            };
            for reference in pattern.find_references(text, &quotes) {
                candidates.push(Candidate::new(
                    reference.span,
                    SYNTHETIC_PRIORITY,
                    Hit { field: idx, usage },
                ));
            }
        }
    }
    arbitrate(candidates)
        .into_iter()
        .map(|candidate| candidate.value)
        .collect()
}

fn reserved_kind_in(name: &str, specs: &[SupplementaryPatternSpec]) -> Option<SyntheticKind> {
    specs.iter().find_map(|spec| match spec {
        SupplementaryPatternSpec::Reserved {
            name: reserved,
            kind,
        } if reserved == name => Some(*kind),
        _ => None,
    })
}

fn references_drilldown(text: &str, specs: &[SupplementaryPatternSpec]) -> bool {
    let quotes = QuoteMap::lex(text);
    specs
        .iter()
        .filter(|spec| spec.kind().is_drilldown())
        .filter_map(SupplementaryPatternSpec::compile)
        .any(|pattern| !pattern.find_references(text, &quotes).is_empty())
}

fn assign_placeholders(
    entries: &mut [Option<TrackedFieldEntry>],
    previous: Option<&TrackedFields>,
    fields: &[DatasetField],
    text: &str,
) {
    let mut allocator = PlaceholderAllocator::new(text, fields);
    if let Some(previous) = previous {
        for entry in entries.iter_mut().flatten() {
            if !needs_placeholder(entry) {
                continue;
            }
            let Some(token) = previous
                .get(&entry.field_key)
                .and_then(|prior| prior.placeholder.clone())
            else {
                continue;
            };
            if allocator.reserve(&token) {
                entry.placeholder = Some(token);
            } else {
                debug!(
                    field = %entry.field_key,
                    %token,
                    "previous placeholder collides, reallocating"
                );
            }
        }
    }

    for entry in entries.iter_mut().flatten() {
        if entry.placeholder.is_none() && needs_placeholder(entry) {
            entry.placeholder = Some(allocator.allocate());
        }
    }
}

fn needs_placeholder(entry: &TrackedFieldEntry) -> bool {
    !entry.usage_kind().is_some_and(|kind| kind.is_reserved())
}

/// Hands out the lowest free placeholder that cannot be confused with text
/// already present in the specification or with a dataset field name.
struct PlaceholderAllocator<'a> {
    taken: BTreeSet<usize>,
    next: usize,
    text: &'a str,
    blocked: BTreeSet<&'a str>,
}

impl<'a> PlaceholderAllocator<'a> {
    fn new(text: &'a str, fields: &'a [DatasetField]) -> Self {
        Self {
            taken: BTreeSet::new(),
            next: 0,
            text,
            blocked: fields.iter().map(|field| field.name.as_str()).collect(),
        }
    }

    /// Claims `token` unless it is taken or collides with existing content.
    fn reserve(&mut self, token: &Placeholder) -> bool {
        if self.taken.contains(&token.index()) || self.collides(token) {
            return false;
        }
        self.taken.insert(token.index());
        true
    }

    fn allocate(&mut self) -> Placeholder {
        loop {
            let index = self.next;
            self.next += 1;
            if self.taken.contains(&index) {
                continue;
            }
            let token = Placeholder::from_index(index);
            if self.collides(&token) {
                continue;
            }
            self.taken.insert(index);
            return token;
        }
    }

    fn collides(&self, token: &Placeholder) -> bool {
        self.blocked.contains(token.as_str()) || self.text.contains(token.as_str())
    }
}
