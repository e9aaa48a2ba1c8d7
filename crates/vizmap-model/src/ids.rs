#![deny(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

const DELIMITER: &str = "__";

/// A placeholder token substituted for a field name in a portable template.
///
/// Tokens render as `__N__`. Ordering follows the numeric index, so `__2__`
/// sorts before `__10__`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Placeholder(String);

impl Placeholder {
    pub fn from_index(index: usize) -> Self {
        Self(format!("{DELIMITER}{index}{DELIMITER}"))
    }

    pub fn parse(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        match parse_index(&value) {
            Some(_) => Ok(Self(value)),
            None => Err(ModelError::InvalidPlaceholder(value)),
        }
    }

    pub fn index(&self) -> usize {
        parse_index(&self.0).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if `value` has the shape of a placeholder token.
    pub fn is_placeholder(value: &str) -> bool {
        parse_index(value).is_some()
    }
}

fn parse_index(value: &str) -> Option<usize> {
    let inner = value
        .strip_prefix(DELIMITER)?
        .strip_suffix(DELIMITER)?;
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    inner.parse().ok()
}

impl PartialOrd for Placeholder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Placeholder {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index()
            .cmp(&other.index())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl TryFrom<String> for Placeholder {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Placeholder> for String {
    fn from(value: Placeholder) -> Self {
        value.0
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_and_parses_index() {
        let token = Placeholder::from_index(12);
        assert_eq!(token.as_str(), "__12__");
        assert_eq!(Placeholder::parse("__12__").unwrap(), token);
        assert_eq!(token.index(), 12);
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        assert!(Placeholder::parse("__x__").is_err());
        assert!(Placeholder::parse("____").is_err());
        assert!(Placeholder::parse("__1_").is_err());
        assert!(!Placeholder::is_placeholder("__selected__"));
    }

    #[test]
    fn orders_numerically() {
        let mut tokens = vec![
            Placeholder::from_index(10),
            Placeholder::from_index(2),
            Placeholder::from_index(0),
        ];
        tokens.sort();
        let rendered: Vec<&str> = tokens.iter().map(Placeholder::as_str).collect();
        assert_eq!(rendered, vec!["__0__", "__2__", "__10__"]);
    }
}
