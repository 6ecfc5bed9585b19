/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ParseError {
    #[error("empty string")]
    Empty,
    #[error("invalid character {1:?} at offset {0}")]
    InvalidCharacter(usize, char),
}

/// A name usable both as a registry key and as a metrics node,
/// restricted to `[0-9a-zA-Z._-]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct NodeName(String);

impl NodeName {
    #[inline]
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for NodeName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        for (i, c) in s.char_indices() {
            if !matches!(c, '0'..='9' | 'a'..='z' | 'A'..='Z' | '.' | '_' | '-') {
                return Err(ParseError::InvalidCharacter(i, c));
            }
        }
        Ok(NodeName(s.to_string()))
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok() {
        let name = NodeName::from_str("web-api.prod_1").unwrap();
        assert_eq!(name.as_str(), "web-api.prod_1");
        assert!(!name.is_empty());
    }

    #[test]
    fn parse_err() {
        assert_eq!(NodeName::from_str(""), Err(ParseError::Empty));
        assert_eq!(
            NodeName::from_str("a b"),
            Err(ParseError::InvalidCharacter(1, ' '))
        );
        assert!(NodeName::from_str("a/b").is_err());
    }

    #[test]
    fn default_is_empty() {
        assert!(NodeName::default().is_empty());
    }
}
