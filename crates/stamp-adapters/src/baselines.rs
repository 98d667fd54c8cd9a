//! [`BaselineProvider`] adapters.
//!
//! A baseline file is a JSON object of previously released integers, keyed
//! either by dotted path or by nesting:
//!
//! ```json
//! { "AppVersionCode": 41, "Sdk": { "build": 7 } }
//! ```

use std::{collections::HashMap, path::Path};

use tracing::{debug, instrument};

use stamp_core::{
    domain::{BaselineProvider, ParamPath},
    error::StampResult,
};

use crate::parameter_loader::{parse_error, read_to_string};

/// Baselines held in memory, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBaselines {
    values: HashMap<ParamPath, i64>,
}

impl InMemoryBaselines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: ParamPath, value: i64) -> Option<i64> {
        self.values.insert(path, value)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, path: ParamPath, value: i64) -> Self {
        self.values.insert(path, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl BaselineProvider for InMemoryBaselines {
    fn baseline(&self, path: &ParamPath) -> Option<i64> {
        self.values.get(path).copied()
    }
}

/// Baselines read once from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct JsonFileBaselines {
    inner: InMemoryBaselines,
}

impl JsonFileBaselines {
    /// # Errors
    ///
    /// `ApplicationError::Load` if the file cannot be read;
    /// `ApplicationError::Parse` if it is not a JSON object of integers.
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> StampResult<Self> {
        let path = path.as_ref();
        let text = read_to_string(path)?;
        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| parse_error(path, e))?;

        let serde_json::Value::Object(map) = json else {
            return Err(parse_error(path, "baseline file must be a JSON object"));
        };

        let mut inner = InMemoryBaselines::new();
        collect(&map, "", &mut inner).map_err(|reason| parse_error(path, reason))?;
        debug!(count = inner.len(), "loaded baselines");
        Ok(Self { inner })
    }
}

impl BaselineProvider for JsonFileBaselines {
    fn baseline(&self, path: &ParamPath) -> Option<i64> {
        self.inner.baseline(path)
    }
}

fn collect(
    map: &serde_json::Map<String, serde_json::Value>,
    prefix: &str,
    out: &mut InMemoryBaselines,
) -> Result<(), String> {
    for (key, value) in map {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            serde_json::Value::Object(inner) => collect(inner, &dotted, out)?,
            serde_json::Value::Number(n) => {
                let value = n
                    .as_i64()
                    .ok_or_else(|| format!("baseline '{dotted}' must be an integer, found {n}"))?;
                let path = ParamPath::parse(&dotted).map_err(|e| e.to_string())?;
                out.insert(path, value);
            }
            other => {
                return Err(format!(
                    "baseline '{dotted}' must be an integer, found {other}"
                ));
            }
        }
    }
    Ok(())
}
