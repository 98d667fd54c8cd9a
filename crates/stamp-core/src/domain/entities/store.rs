//! Parameter store: the typed tree every placeholder resolves against.
//!
//! A store maps identifiers to either a scalar ([`Value::String`],
//! [`Value::Integer`], [`Value::Boolean`]) or a nested [`ParameterStore`].
//! Lookups go through [`ParameterStore::resolve`], which walks a
//! [`ParamPath`] one segment at a time and fails closed: an unknown segment
//! is `PathNotFound`, a scalar where a record was needed (or the reverse) is
//! `TypeMismatch`.
//!
//! The store accepts any well-typed tree. Policy (which fields are required,
//! which ranges are legal) lives in rules and runs as a separate pass.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    error::DomainError,
    value_objects::{ParamPath, ValueKind},
};

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
    Record(ParameterStore),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Integer(_) => ValueKind::Integer,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Record(_) => ValueKind::Record,
        }
    }

    /// Borrow the value as a scalar, or `None` for records.
    pub fn as_scalar(&self) -> Option<ScalarRef<'_>> {
        match self {
            Self::String(s) => Some(ScalarRef::String(s)),
            Self::Integer(i) => Some(ScalarRef::Integer(*i)),
            Self::Boolean(b) => Some(ScalarRef::Boolean(*b)),
            Self::Record(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&ParameterStore> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<ParameterStore> for Value {
    fn from(store: ParameterStore) -> Self {
        Self::Record(store)
    }
}

/// A borrowed scalar, the only thing a placeholder can be substituted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarRef<'a> {
    String(&'a str),
    Integer(i64),
    Boolean(bool),
}

impl fmt::Display for ScalarRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// What a lookup expected to find at a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    /// A nested record (a non-terminal segment).
    Record,
    /// A string, integer or boolean (the terminal segment).
    Scalar,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record => write!(f, "record"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

/// Store lookup failure.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolveError {
    /// `missing` is the shortest prefix of `path` that does not exist.
    #[error("path '{path}' not found: no entry '{missing}'")]
    PathNotFound { path: ParamPath, missing: ParamPath },

    /// `at` is the prefix of `path` whose value had the wrong shape.
    #[error("type mismatch at '{at}' resolving '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: ParamPath,
        at: ParamPath,
        expected: Expected,
        found: ValueKind,
    },
}

impl ResolveError {
    pub fn path(&self) -> &ParamPath {
        match self {
            Self::PathNotFound { path, .. } | Self::TypeMismatch { path, .. } => path,
        }
    }
}

/// A tree of named parameters.
///
/// Keys are kept sorted so iteration, serialisation and diagnostics are
/// deterministic regardless of how the store was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStore {
    entries: BTreeMap<String, Value>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct children, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve `path` to whatever value it names (scalar or record).
    pub fn resolve(&self, path: &ParamPath) -> Result<&Value, ResolveError> {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            return Err(ResolveError::PathNotFound {
                path: path.clone(),
                missing: path.clone(),
            });
        };

        let mut node = self;
        for (depth, segment) in parents.iter().enumerate() {
            let value = node
                .entries
                .get(segment)
                .ok_or_else(|| ResolveError::PathNotFound {
                    path: path.clone(),
                    missing: path.prefix(depth + 1),
                })?;
            node = match value {
                Value::Record(inner) => inner,
                other => {
                    return Err(ResolveError::TypeMismatch {
                        path: path.clone(),
                        at: path.prefix(depth + 1),
                        expected: Expected::Record,
                        found: other.kind(),
                    });
                }
            };
        }

        node.entries
            .get(last)
            .ok_or_else(|| ResolveError::PathNotFound {
                path: path.clone(),
                missing: path.clone(),
            })
    }

    /// Resolve `path` to a scalar. A record at the terminal segment is a
    /// `TypeMismatch`.
    pub fn resolve_scalar(&self, path: &ParamPath) -> Result<ScalarRef<'_>, ResolveError> {
        let value = self.resolve(path)?;
        value.as_scalar().ok_or_else(|| ResolveError::TypeMismatch {
            path: path.clone(),
            at: path.clone(),
            expected: Expected::Scalar,
            found: value.kind(),
        })
    }

    /// Whether `path` resolves to anything.
    pub fn contains(&self, path: &ParamPath) -> bool {
        self.resolve(path).is_ok()
    }

    /// Insert `value` at `path`, creating intermediate records as needed.
    /// Returns the previous value, if any.
    pub fn insert(
        &mut self,
        path: &ParamPath,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, ResolveError> {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            return Err(ResolveError::PathNotFound {
                path: path.clone(),
                missing: path.clone(),
            });
        };

        let mut node = self;
        for (depth, segment) in parents.iter().enumerate() {
            let slot = node
                .entries
                .entry(segment.clone())
                .or_insert_with(|| Value::Record(ParameterStore::new()));
            node = match slot {
                Value::Record(inner) => inner,
                other => {
                    return Err(ResolveError::TypeMismatch {
                        path: path.clone(),
                        at: path.prefix(depth + 1),
                        expected: Expected::Record,
                        found: other.kind(),
                    });
                }
            };
        }

        Ok(node.entries.insert(last.clone(), value.into()))
    }

    /// Builder-style insert from a dotted string.
    ///
    /// ```rust
    /// use stamp_core::domain::ParameterStore;
    ///
    /// let store = ParameterStore::new()
    ///     .with("ApplicationId", "com.example.app")?
    ///     .with("AndroidApiVersion.a", 24)?;
    /// # Ok::<(), stamp_core::domain::DomainError>(())
    /// ```
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Result<Self, DomainError> {
        let path = ParamPath::parse(path)?;
        self.insert(&path, value)?;
        Ok(self)
    }

    /// Every scalar leaf with its full path, in sorted order.
    pub fn leaves(&self) -> Vec<(ParamPath, ScalarRef<'_>)> {
        let mut out = Vec::new();
        collect_leaves(self, &mut Vec::new(), &mut out);
        out
    }

    /// Build a store from the JSON interchange form produced by loaders.
    ///
    /// Objects become records; strings, booleans and integers become
    /// scalars. Floats, arrays and nulls are rejected, as are keys that are
    /// not identifiers.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, DomainError> {
        match value {
            serde_json::Value::Object(map) => record_from_json(map, None),
            other => Err(DomainError::UnsupportedValue {
                path: "<root>".into(),
                found: format!("{} (the top level must be a table)", json_type(other)),
            }),
        }
    }

    /// JSON view of the store (records become objects).
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|(k, v)| {
                let json = match v {
                    Value::String(s) => serde_json::Value::String(s.clone()),
                    Value::Integer(i) => serde_json::Value::from(*i),
                    Value::Boolean(b) => serde_json::Value::Bool(*b),
                    Value::Record(r) => r.to_json(),
                };
                (k.clone(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

fn collect_leaves<'a>(
    store: &'a ParameterStore,
    prefix: &mut Vec<String>,
    out: &mut Vec<(ParamPath, ScalarRef<'a>)>,
) {
    for (key, value) in &store.entries {
        prefix.push(key.clone());
        match value {
            Value::Record(inner) => collect_leaves(inner, prefix, out),
            scalar => {
                if let Some(s) = scalar.as_scalar() {
                    out.push((ParamPath::from_checked(prefix.clone()), s));
                }
            }
        }
        prefix.pop();
    }
}

fn record_from_json(
    map: &serde_json::Map<String, serde_json::Value>,
    at: Option<&ParamPath>,
) -> Result<ParameterStore, DomainError> {
    let mut store = ParameterStore::new();

    for (key, json) in map {
        let path = match at {
            Some(parent) => parent.child(key)?,
            None => ParamPath::segment(key)?,
        };

        let value = match json {
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => {
                    return Err(DomainError::UnsupportedValue {
                        path: path.to_string(),
                        found: if n.is_f64() {
                            format!("float {n}")
                        } else {
                            format!("integer {n} out of range")
                        },
                    });
                }
            },
            serde_json::Value::Object(inner) => Value::Record(record_from_json(inner, Some(&path))?),
            other => {
                return Err(DomainError::UnsupportedValue {
                    path: path.to_string(),
                    found: json_type(other).into(),
                });
            }
        };

        store.entries.insert(key.clone(), value);
    }

    Ok(store)
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> ParamPath {
        ParamPath::parse(s).unwrap()
    }

    fn android() -> ParameterStore {
        ParameterStore::new()
            .with("ApplicationId", "com.example.app")
            .unwrap()
            .with("AndroidApiVersion.a", 24)
            .unwrap()
            .with("AndroidApiVersion.b", 34)
            .unwrap()
            .with("Debuggable", false)
            .unwrap()
    }

    #[test]
    fn resolves_nested_scalar() {
        let store = android();
        assert_eq!(
            store.resolve_scalar(&path("AndroidApiVersion.b")).unwrap(),
            ScalarRef::Integer(34)
        );
        assert_eq!(
            store.resolve(&path("ApplicationId")).unwrap().as_str(),
            Some("com.example.app")
        );
    }

    #[test]
    fn unknown_segment_is_path_not_found() {
        let store = android();
        let err = store.resolve(&path("AndroidApiVersion.c")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::PathNotFound {
                path: path("AndroidApiVersion.c"),
                missing: path("AndroidApiVersion.c"),
            }
        );

        let err = store.resolve(&path("Missing.deep.path")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::PathNotFound { ref missing, .. } if *missing == path("Missing")
        ));
    }

    #[test]
    fn record_used_as_scalar_is_type_mismatch() {
        let store = android();
        let err = store.resolve_scalar(&path("AndroidApiVersion")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::TypeMismatch {
                path: path("AndroidApiVersion"),
                at: path("AndroidApiVersion"),
                expected: Expected::Scalar,
                found: ValueKind::Record,
            }
        );
    }

    #[test]
    fn scalar_used_as_record_is_type_mismatch() {
        let store = android();
        let err = store.resolve(&path("ApplicationId.length")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::TypeMismatch {
                expected: Expected::Record,
                found: ValueKind::String,
                ..
            }
        ));
    }

    #[test]
    fn insert_through_scalar_fails() {
        let mut store = android();
        let err = store.insert(&path("ApplicationId.x"), 1).unwrap_err();
        assert!(matches!(err, ResolveError::TypeMismatch { .. }));
    }

    #[test]
    fn insert_returns_previous_value() {
        let mut store = android();
        let previous = store.insert(&path("AndroidApiVersion.a"), 26).unwrap();
        assert_eq!(previous, Some(Value::Integer(24)));
    }

    #[test]
    fn leaves_are_sorted_and_flattened() {
        let leaves: Vec<String> = android()
            .leaves()
            .into_iter()
            .map(|(p, v)| format!("{p}={v}"))
            .collect();
        assert_eq!(
            leaves,
            [
                "AndroidApiVersion.a=24",
                "AndroidApiVersion.b=34",
                "ApplicationId=com.example.app",
                "Debuggable=false",
            ]
        );
    }

    #[test]
    fn from_json_builds_tree() {
        let store = ParameterStore::from_json(&json!({
            "ApplicationId": "com.example.app",
            "AndroidApiVersion": { "a": 24, "b": 34 },
            "Debuggable": true
        }))
        .unwrap();
        assert_eq!(store, android().with("Debuggable", true).unwrap());
        assert_eq!(store.to_json()["AndroidApiVersion"]["b"], json!(34));
    }

    #[test]
    fn from_json_rejects_floats_arrays_and_nulls() {
        for (bad, needle) in [
            (json!({"v": 1.5}), "float"),
            (json!({"v": [1, 2]}), "array"),
            (json!({"nested": {"v": null}}), "null"),
        ] {
            let err = ParameterStore::from_json(&bad).unwrap_err();
            assert!(err.to_string().contains(needle), "{err}");
        }
    }

    #[test]
    fn from_json_reports_full_path() {
        let err = ParameterStore::from_json(&json!({"a": {"b": {"c": 0.5}}})).unwrap_err();
        assert!(matches!(
            err,
            DomainError::UnsupportedValue { ref path, .. } if path == "a.b.c"
        ));
    }

    #[test]
    fn from_json_rejects_non_identifier_keys() {
        let err = ParameterStore::from_json(&json!({"app-id": "x"})).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPath { .. }));
    }

    #[test]
    fn from_json_rejects_dotted_keys() {
        let err = ParameterStore::from_json(&json!({"a.b": 1})).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPath { .. }));
    }

    #[test]
    fn from_json_rejects_non_object_root() {
        assert!(ParameterStore::from_json(&json!([1])).is_err());
    }
}
