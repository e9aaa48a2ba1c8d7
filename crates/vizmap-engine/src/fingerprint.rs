//! Content fingerprint of a specification and the fields it was scanned with.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::Digest;
use vizmap_model::DatasetField;

/// SHA-256 of the spec text and the sorted field keys and names.
///
/// Callers compare the fingerprint a job was issued for with the current one
/// to discard responses that arrive after the input changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecFingerprint(String);

impl SpecFingerprint {
    pub fn compute(spec_text: &str, fields: &[DatasetField]) -> Self {
        let mut pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|field| (field.key.as_str(), field.name.as_str()))
            .collect();
        pairs.sort_unstable();

        let mut hasher = sha2::Sha256::new();
        hasher.update(spec_text.as_bytes());
        for (key, name) in pairs {
            hasher.update([0u8]);
            hasher.update(key.as_bytes());
            hasher.update([0x1f]);
            hasher.update(name.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    pub fn matches(&self, spec_text: &str, fields: &[DatasetField]) -> bool {
        *self == Self::compute(spec_text, fields)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpecFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha2::Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use vizmap_model::DataType;

    use super::*;

    #[test]
    fn field_order_does_not_matter() {
        let a = DatasetField::column("a", "A", DataType::Text);
        let b = DatasetField::column("b", "B", DataType::Text);
        let first = SpecFingerprint::compute("{}", &[a.clone(), b.clone()]);
        let second = SpecFingerprint::compute("{}", &[b, a.clone()]);
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
        assert!(!first.matches("{ }", &[a]));
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
