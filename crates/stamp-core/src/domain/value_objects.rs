//! Small immutable values shared by every part of the engine.
//!
//! - [`ParamPath`]: a dotted path into a parameter store (`AndroidApiVersion.b`)
//! - [`Span`]: a half-open byte range inside a template body
//! - [`ValueKind`]: the declared type of a parameter

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::DomainError;

// ============================================================================
// ParamPath
// ============================================================================

/// An ordered, non-empty sequence of identifier segments.
///
/// Invariant: every segment matches `[A-Za-z_][A-Za-z0-9_]*`. Enforced at
/// construction, so holders never need to re-check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamPath(Vec<String>);

impl ParamPath {
    /// Parse a dotted path such as `AndroidApiVersion.a`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let mut segments = Vec::new();
        for segment in s.split('.') {
            check_segment(segment).map_err(|fault| DomainError::InvalidPath {
                path: s.to_string(),
                reason: fault.to_string(),
            })?;
            segments.push(segment.to_string());
        }
        Ok(Self(segments))
    }

    /// A single-segment path. Unlike [`ParamPath::parse`], dots are illegal.
    pub fn segment(key: &str) -> Result<Self, DomainError> {
        check_segment(key).map_err(|fault| DomainError::InvalidPath {
            path: key.to_string(),
            reason: fault.to_string(),
        })?;
        Ok(Self(vec![key.to_string()]))
    }

    /// Build a path from segments already checked with [`check_segment`].
    pub(crate) fn from_checked(segments: Vec<String>) -> Self {
        debug_assert!(!segments.is_empty());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments (always >= 1).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The first `n` segments. `n` is clamped to `1..=depth`.
    pub fn prefix(&self, n: usize) -> ParamPath {
        let n = n.clamp(1, self.0.len());
        Self(self.0[..n].to_vec())
    }

    /// Path of the enclosing record, or `None` for a top-level key.
    pub fn parent(&self) -> Option<ParamPath> {
        if self.0.len() > 1 {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    /// Extend the path with one more segment.
    pub fn child(&self, segment: &str) -> Result<ParamPath, DomainError> {
        check_segment(segment).map_err(|fault| DomainError::InvalidPath {
            path: format!("{}.{}", self, segment),
            reason: fault.to_string(),
        })?;
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Ok(Self(segments))
    }

    /// Deepest record that encloses every path, if they share one.
    ///
    /// `[AndroidApiVersion.a, AndroidApiVersion.b]` -> `AndroidApiVersion`.
    pub fn common_parent(paths: &[ParamPath]) -> Option<ParamPath> {
        let mut parents = paths.iter().map(ParamPath::parent);
        let mut common = parents.next()??.0;

        for parent in parents {
            let parent = parent?;
            let shared = common
                .iter()
                .zip(parent.0.iter())
                .take_while(|(a, b)| a == b)
                .count();
            common.truncate(shared);
            if common.is_empty() {
                return None;
            }
        }

        Some(Self(common))
    }
}

impl fmt::Display for ParamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for ParamPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ParamPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParamPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Why a single path segment was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentFault {
    Empty,
    /// `index` is the byte offset of `ch` inside the segment.
    Illegal { index: usize, ch: char },
}

impl fmt::Display for SegmentFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty segment"),
            Self::Illegal { index: 0, ch } if ch.is_ascii_digit() => {
                write!(f, "segment cannot start with digit {ch:?}")
            }
            Self::Illegal { ch, .. } => write!(f, "illegal character {ch:?}"),
        }
    }
}

/// Check one segment against `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn check_segment(segment: &str) -> Result<(), SegmentFault> {
    let mut chars = segment.char_indices();
    match chars.next() {
        None => return Err(SegmentFault::Empty),
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        Some((index, ch)) => return Err(SegmentFault::Illegal { index, ch }),
    }
    for (index, ch) in chars {
        if !(ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(SegmentFault::Illegal { index, ch });
        }
    }
    Ok(())
}

// ============================================================================
// Span
// ============================================================================

/// Half-open byte range `[start, end)` inside a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ============================================================================
// ValueKind
// ============================================================================

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Integer,
    Boolean,
    Record,
}

impl ValueKind {
    pub fn is_scalar(self) -> bool {
        !matches!(self, Self::Record)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Record => write!(f, "record"),
        }
    }
}

impl FromStr for ValueKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "str" => Ok(Self::String),
            "integer" | "int" => Ok(Self::Integer),
            "boolean" | "bool" => Ok(Self::Boolean),
            "record" | "table" => Ok(Self::Record),
            _ => Err(DomainError::UnknownValueKind(s.to_string())),
        }
    }
}
