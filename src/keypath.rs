//! Dotted key paths like `env.global`.

use std::fmt;
use std::str::FromStr;

use crate::error::EncfigError;

/// A parsed dotted key. Always holds at least one segment, and no segment is
/// empty, so [`Display`](fmt::Display) reproduces the parsed input exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Split `dotted` on `.`.
    pub fn parse(dotted: &str) -> Result<Self, EncfigError> {
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(EncfigError::InvalidKeyPath(dotted.into()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The key the value is finally stored under.
    pub fn terminal(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Every segment before the terminal one.
    pub fn ancestors(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }
}

impl FromStr for KeyPath {
    type Err = EncfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
