//! Remap completeness flags.

use serde::{Deserialize, Serialize};
use vizmap_model::{TrackedDrilldown, UsermetaDatasetField};

/// Whether a remap can run without leaving tokens behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemapCompleteness {
    /// Every template slot has a supplied field.
    pub remap_all_fields_assigned: bool,
    /// No drill hierarchy is required, or one is bound.
    pub remap_drilldown_assigned: bool,
    pub remap_all_dependencies_assigned: bool,
}

impl RemapCompleteness {
    pub fn evaluate(remap_fields: &[UsermetaDatasetField], drilldown: &TrackedDrilldown) -> Self {
        let remap_all_fields_assigned = remap_fields.iter().all(UsermetaDatasetField::is_assigned);
        let remap_drilldown_assigned = !drilldown.is_mapping_required;
        Self {
            remap_all_fields_assigned,
            remap_drilldown_assigned,
            remap_all_dependencies_assigned: remap_all_fields_assigned && remap_drilldown_assigned,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.remap_all_dependencies_assigned
    }
}

/// Keys of slots still waiting for an assignment.
pub fn unassigned_keys(remap_fields: &[UsermetaDatasetField]) -> Vec<&str> {
    remap_fields
        .iter()
        .filter(|field| !field.is_assigned())
        .map(|field| field.key.as_str())
        .collect()
}
