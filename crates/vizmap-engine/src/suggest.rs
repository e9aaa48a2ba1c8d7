//! Assignment suggestions for template slots.
//!
//! Slots are matched against the fields of the dataset a template is being
//! applied to. A slot only accepts fields of its own data type; names are
//! compared after normalization, exact matches first and Jaro-Winkler
//! similarity otherwise.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rapidfuzz::distance::jaro_winkler::similarity as jaro_similarity;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vizmap_model::{DatasetField, TemplateUsermeta, UsermetaDatasetField};

use crate::utils::normalize_text;

/// Score multiplier when a measure slot is offered a column (or the reverse).
const ROLE_MISMATCH_PENALTY: f64 = 0.85;

/// Default minimum confidence for a suggestion to be kept.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.75;

/// One proposed binding of a slot to a dataset field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSuggestion {
    pub slot_key: String,
    pub object_key: String,
    pub object_name: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    pub suggestions: Vec<AssignmentSuggestion>,
    /// Slots left without a suggestion above the threshold.
    pub unassigned_slots: Vec<String>,
}

impl AssignmentResult {
    /// Writes every suggestion into the matching slot.
    ///
    /// Slots that already carry an assignment are left alone.
    pub fn apply(&self, slots: &mut [UsermetaDatasetField]) -> usize {
        let mut applied = 0;
        for suggestion in &self.suggestions {
            if let Some(slot) = slots
                .iter_mut()
                .find(|slot| slot.key == suggestion.slot_key && !slot.is_assigned())
            {
                slot.assign(&suggestion.object_key, &suggestion.object_name);
                applied += 1;
            }
        }
        applied
    }

    pub fn min_confidence(&self) -> Option<f32> {
        self.suggestions
            .iter()
            .map(|s| s.confidence)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }
}

/// Proposes fields for the unassigned slots of a template.
pub fn suggest_assignments(
    usermeta: &TemplateUsermeta,
    dataset_fields: &[DatasetField],
    min_confidence: f32,
) -> AssignmentResult {
    AssignmentEngine::new(min_confidence).suggest(&usermeta.dataset, dataset_fields)
}

/// Suggests one-to-one assignments for template slots.
pub struct AssignmentEngine {
    min_confidence: f32,
}

struct Candidate<'a> {
    slot: &'a str,
    field: &'a DatasetField,
    confidence: f32,
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONFIDENCE)
    }
}

impl AssignmentEngine {
    pub fn new(min_confidence: f32) -> Self {
        Self { min_confidence }
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Proposes a field for each unassigned slot.
    ///
    /// Each slot and each dataset field is used at most once; candidates are
    /// taken highest confidence first, ties broken by slot then field order.
    pub fn suggest(
        &self,
        slots: &[UsermetaDatasetField],
        dataset_fields: &[DatasetField],
    ) -> AssignmentResult {
        let mut taken_fields: BTreeSet<&str> = slots
            .iter()
            .filter_map(|slot| slot.supplied_object_key.as_deref())
            .collect();

        let mut candidates = Vec::new();
        for slot in slots.iter().filter(|slot| !slot.is_assigned()) {
            for field in dataset_fields {
                if field.is_highlight_component || field.data_type != slot.data_type {
                    continue;
                }
                let confidence = score(slot, field);
                if confidence >= self.min_confidence {
                    candidates.push(Candidate {
                        slot: &slot.key,
                        field,
                        confidence,
                    });
                }
            }
        }
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });

        let mut assigned_slots = BTreeSet::new();
        let mut suggestions = Vec::new();
        for candidate in candidates {
            if assigned_slots.contains(candidate.slot)
                || taken_fields.contains(candidate.field.key.as_str())
            {
                continue;
            }
            assigned_slots.insert(candidate.slot);
            taken_fields.insert(&candidate.field.key);
            suggestions.push(AssignmentSuggestion {
                slot_key: candidate.slot.to_string(),
                object_key: candidate.field.key.clone(),
                object_name: candidate.field.name.clone(),
                confidence: candidate.confidence,
            });
        }

        let unassigned_slots: Vec<String> = slots
            .iter()
            .filter(|slot| !slot.is_assigned() && !assigned_slots.contains(slot.key.as_str()))
            .map(|slot| slot.key.clone())
            .collect();
        debug!(
            suggested = suggestions.len(),
            unassigned = unassigned_slots.len(),
            min_confidence = self.min_confidence,
            "suggested slot assignments"
        );
        AssignmentResult {
            suggestions,
            unassigned_slots,
        }
    }
}

fn score(slot: &UsermetaDatasetField, field: &DatasetField) -> f32 {
    let slot_name = normalize_text(&slot.name);
    let field_name = normalize_text(&field.name);
    let mut confidence = if slot_name == field_name {
        1.0
    } else {
        jaro_similarity(slot_name.chars(), field_name.chars())
    };
    if slot.kind != field.role {
        confidence *= ROLE_MISMATCH_PENALTY;
    }
    confidence as f32
}

#[cfg(test)]
mod tests {
    use vizmap_model::{DataType, FieldRole};

    use super::*;

    fn slots() -> Vec<UsermetaDatasetField> {
        vec![
            UsermetaDatasetField::new("__0__", "Category", DataType::Text, FieldRole::Column),
            UsermetaDatasetField::new("__1__", "Sales", DataType::Numeric, FieldRole::Measure),
        ]
    }

    #[test]
    fn exact_names_win() {
        let fields = vec![
            DatasetField::column("t.Category", "category", DataType::Text),
            DatasetField::measure("Sum(t.Sales)", "Sales", DataType::Numeric),
            DatasetField::measure("Sum(t.Sale)", "Sale", DataType::Numeric),
        ];
        let result = AssignmentEngine::default().suggest(&slots(), &fields);
        assert_eq!(result.suggestions.len(), 2);
        let sales = result
            .suggestions
            .iter()
            .find(|s| s.slot_key == "__1__")
            .unwrap();
        assert_eq!(sales.object_key, "Sum(t.Sales)");
        assert!((sales.confidence - 1.0).abs() < f32::EPSILON);
        assert!(result.unassigned_slots.is_empty());
    }

    #[test]
    fn data_type_must_match() {
        let fields = vec![DatasetField::column("t.Sales", "Sales", DataType::Text)];
        let result = AssignmentEngine::default().suggest(&slots(), &fields);
        assert!(result.suggestions.iter().all(|s| s.slot_key != "__1__"));
        assert!(result.unassigned_slots.contains(&"__1__".to_string()));
    }

    #[test]
    fn each_field_is_used_once() {
        let slots = vec![
            UsermetaDatasetField::new("__0__", "Sales", DataType::Numeric, FieldRole::Measure),
            UsermetaDatasetField::new("__1__", "Sales", DataType::Numeric, FieldRole::Measure),
        ];
        let fields = vec![DatasetField::measure("Sum(Sales)", "Sales", DataType::Numeric)];
        let result = AssignmentEngine::default().suggest(&slots, &fields);
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].slot_key, "__0__");
        assert_eq!(result.unassigned_slots, vec!["__1__".to_string()]);
    }

    #[test]
    fn apply_fills_slots() {
        let mut slots = slots();
        let fields = vec![
            DatasetField::column("t.Category", "Category", DataType::Text),
            DatasetField::measure("Sum(t.Sales)", "Sales", DataType::Numeric),
        ];
        let result = AssignmentEngine::default().suggest(&slots, &fields);
        assert_eq!(result.apply(&mut slots), 2);
        assert!(slots.iter().all(UsermetaDatasetField::is_assigned));
        assert_eq!(slots[1].supplied_object_name.as_deref(), Some("Sales"));
    }
}
