//! Portable template metadata describing field slots.

use serde::{Deserialize, Serialize};

use crate::{DataType, FieldRole};

/// A template field slot.
///
/// `key` is the placeholder token the slot occupies in tokenized text. The
/// `supplied_object_*` pair is filled in while the user assigns a dataset
/// field to the slot and is `None` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsermetaDatasetField {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub name_placeholder: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub kind: FieldRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplied_object_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplied_object_name: Option<String>,
}

impl UsermetaDatasetField {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        data_type: DataType,
        kind: FieldRole,
    ) -> Self {
        let name = name.into();
        Self {
            key: key.into(),
            name_placeholder: name.clone(),
            name,
            description: String::new(),
            data_type,
            kind,
            supplied_object_key: None,
            supplied_object_name: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Assigns a dataset field to this slot.
    pub fn assign(&mut self, object_key: impl Into<String>, object_name: impl Into<String>) {
        self.supplied_object_key = Some(object_key.into());
        self.supplied_object_name = Some(object_name.into());
    }

    pub fn clear_assignment(&mut self) {
        self.supplied_object_key = None;
        self.supplied_object_name = None;
    }

    pub fn is_assigned(&self) -> bool {
        self.supplied_object_name.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInformation {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

/// The usermeta block a template carries next to its tokenized spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUsermeta {
    pub information: TemplateInformation,
    #[serde(default)]
    pub dataset: Vec<UsermetaDatasetField>,
}

impl TemplateUsermeta {
    pub fn unassigned(&self) -> impl Iterator<Item = &UsermetaDatasetField> {
        self.dataset.iter().filter(|field| !field.is_assigned())
    }

    pub fn field(&self, key: &str) -> Option<&UsermetaDatasetField> {
        self.dataset.iter().find(|field| field.key == key)
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut UsermetaDatasetField> {
        self.dataset.iter_mut().find(|field| field.key == key)
    }
}
