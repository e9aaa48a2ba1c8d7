//! Dataset field metadata supplied by the host data binding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Value type of a dataset field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Bool,
    Text,
    Numeric,
    DateTime,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Text => "text",
            DataType::Numeric => "numeric",
            DataType::DateTime => "dateTime",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(DataType::Bool),
            "text" | "string" => Ok(DataType::Text),
            "numeric" | "number" => Ok(DataType::Numeric),
            "datetime" | "date" => Ok(DataType::DateTime),
            _ => Err(ModelError::InvalidDataType(s.to_string())),
        }
    }
}

/// Whether a field is a grouping column or an aggregated measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldRole {
    Column,
    Measure,
}

impl FieldRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRole::Column => "column",
            FieldRole::Measure => "measure",
        }
    }
}

/// A field available from the bound data source.
///
/// `key` is the host's stable identity for the field; `name` is the display
/// name that a specification refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetField {
    pub key: String,
    pub name: String,
    pub data_type: DataType,
    pub role: FieldRole,
    /// Set for synthetic cross-highlight columns the host adds next to a
    /// measure. These are attributed to their base measure when tracked.
    #[serde(default)]
    pub is_highlight_component: bool,
}

impl DatasetField {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        data_type: DataType,
        role: FieldRole,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            data_type,
            role,
            is_highlight_component: false,
        }
    }

    pub fn column(key: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(key, name, data_type, FieldRole::Column)
    }

    pub fn measure(key: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(key, name, data_type, FieldRole::Measure)
    }

    #[must_use]
    pub fn with_highlight_component(mut self, enable: bool) -> Self {
        self.is_highlight_component = enable;
        self
    }

    pub fn is_measure(&self) -> bool {
        self.role == FieldRole::Measure
    }

    pub fn is_column(&self) -> bool {
        self.role == FieldRole::Column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_type_aliases() {
        assert_eq!("Number".parse::<DataType>().unwrap(), DataType::Numeric);
        assert_eq!("dateTime".parse::<DataType>().unwrap(), DataType::DateTime);
        assert!("blob".parse::<DataType>().is_err());
    }

    #[test]
    fn highlight_component_defaults_to_false() {
        let json = r#"{"key":"k","name":"Sales","dataType":"numeric","role":"measure"}"#;
        let field: DatasetField = serde_json::from_str(json).unwrap();
        assert!(!field.is_highlight_component);
        assert!(field.is_measure());
    }
}
