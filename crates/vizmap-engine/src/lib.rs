//! Field usage tracking, tokenization and remapping over visualization
//! specification text.
//!
//! Every operation is a pure function of its request: the text is scanned
//! with bounded regex patterns rather than parsed, so comments, formatting and
//! unrelated content survive byte for byte.

pub mod completeness;
pub mod fingerprint;
pub mod patterns;
pub mod quotes;
pub mod remapper;
pub(crate) mod scan;
pub mod suggest;
pub mod tokenizer;
pub mod tracker;
pub mod usermeta;
pub mod utils;

pub use completeness::{RemapCompleteness, unassigned_keys};
pub use fingerprint::{SpecFingerprint, sha256_hex};
pub use patterns::{
    PatternKind, Reference, ReferenceForm, SupplementaryPatternSpec, SyntheticKind, TokenPattern,
    literal_pattern, literal_patterns, supplementary_pattern_specs, supplementary_patterns,
    synthetic_names,
};
pub use quotes::QuoteMap;
pub use remapper::{RemappingRequest, remap};
pub use suggest::{AssignmentEngine, AssignmentResult, AssignmentSuggestion, suggest_assignments};
pub use tokenizer::{TokenizationRequest, missing_tokens, tokenize};
pub use tracker::{TrackingRequest, TrackingResponse, track};
pub use usermeta::{TemplateExport, assign_from_tracked, build_usermeta_dataset, export_template};
