//! Object paths and property names
//!
//! Paths use JSON pointer syntax (`/variables/quote/0/amount`). The leading
//! slash is optional, and `~1` / `~0` escape `/` and `~` inside a segment.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Message reported when a property name fails validation
pub const INVALID_PROPERTY_NAME_MESSAGE: &str =
    "Object property key must have a valid property name";

/// Parsed object path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectPath {
    segments: Vec<String>,
}

impl ObjectPath {
    /// Parse a pointer-style path; empty segments are ignored
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect();
        Self { segments }
    }

    pub fn from_segments(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment and the remainder
    pub fn split_first(&self) -> Option<(&str, &[String])> {
        self.segments
            .split_first()
            .map(|(first, rest)| (first.as_str(), rest))
    }

    /// Append a segment
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

impl From<&str> for ObjectPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

fn property_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // lowercase or underscore first, then identifier characters
    REGEX.get_or_init(|| Regex::new(r"^[a-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Check a property name against the variable/object key grammar
pub fn is_valid_property_name(name: &str) -> bool {
    property_name_regex().is_match(name)
}
