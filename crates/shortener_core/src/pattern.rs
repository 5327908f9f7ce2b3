use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::FieldError;

/// A compiled regular expression that matches by search, not full match.
///
/// Serialises as its source text so options can live in configuration files.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, FieldError> {
        Regex::new(source).map(Pattern).map_err(|err| {
            FieldError::Configuration(format!("invalid pattern {source:?}: {err}"))
        })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern(regex)
    }
}

impl TryFrom<String> for Pattern {
    type Error = FieldError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Pattern::new(&source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.as_str().to_string()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_searches_anywhere_in_value() {
        let pattern = Pattern::new(r"bit\.ly").unwrap();
        assert!(pattern.is_match("see http://bit.ly/abc please"));
        assert!(!pattern.is_match("http://bitly.example.com"));
    }

    #[test]
    fn invalid_source_is_a_configuration_error() {
        let err = Pattern::new("(unclosed").unwrap_err();
        assert!(matches!(err, FieldError::Configuration(_)));
    }

    #[test]
    fn equality_follows_source_text() {
        assert_eq!(Pattern::new("a+").unwrap(), Pattern::new("a+").unwrap());
        assert_ne!(Pattern::new("a+").unwrap(), Pattern::new("a*").unwrap());
    }
}
