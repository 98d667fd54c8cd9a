//! Parameter file loader.
//!
//! Reads a TOML or JSON document into a [`ParameterStore`]. Both formats go
//! through the same `serde_json::Value` interchange form, so the type rules
//! (tables become records; floats, arrays and nulls are rejected) live in one
//! place: [`ParameterStore::from_json`].

use std::{fs, path::Path};

use tracing::{debug, instrument};

use stamp_core::{
    application::ApplicationError,
    domain::{DomainError, ParameterStore},
    error::{StampError, StampResult},
};

/// Document formats accepted by the loaders in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Toml,
    Json,
}

impl Format {
    /// Picks the format from the file extension; anything other than `.json`
    /// is read as TOML.
    pub(crate) fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Load a parameter store from `path`.
///
/// # Errors
///
/// - [`ApplicationError::Load`] if the file cannot be read.
/// - [`ApplicationError::Parse`] if it is not valid TOML/JSON, or holds a
///   value the store cannot represent.
#[instrument(fields(path = %path.as_ref().display()))]
pub fn load_parameters(path: impl AsRef<Path>) -> StampResult<ParameterStore> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    let json = parse_document(path, &text)?;

    let store = ParameterStore::from_json(&json).map_err(|e| parse_error(path, e))?;
    debug!(leaves = store.leaves().len(), "loaded parameters");
    Ok(store)
}

pub(crate) fn read_to_string(path: &Path) -> StampResult<String> {
    fs::read_to_string(path).map_err(|e| {
        ApplicationError::Load {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Parse `text` into the JSON interchange form, choosing the format from
/// the path's extension.
pub(crate) fn parse_document(path: &Path, text: &str) -> StampResult<serde_json::Value> {
    match Format::of(path) {
        Format::Json => serde_json::from_str(text).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Table = toml::from_str(text).map_err(|e| parse_error(path, e))?;
            toml_to_json(toml::Value::Table(table), "").map_err(|e| parse_error(path, e))
        }
    }
}

pub(crate) fn parse_error(path: &Path, reason: impl std::fmt::Display) -> StampError {
    ApplicationError::Parse {
        source_name: path.display().to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// TOML datetimes have no JSON counterpart; everything else maps directly.
fn toml_to_json(value: toml::Value, at: &str) -> Result<serde_json::Value, DomainError> {
    Ok(match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::from(i),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| DomainError::UnsupportedValue {
                path: at.to_string(),
                found: format!("float {f}"),
            })?,
        toml::Value::Array(items) => serde_json::Value::Array(
            items
                .into_iter()
                .map(|v| toml_to_json(v, at))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => {
            let mut map = serde_json::Map::new();
            for (key, value) in table {
                let child = if at.is_empty() {
                    key.clone()
                } else {
                    format!("{at}.{key}")
                };
                map.insert(key, toml_to_json(value, &child)?);
            }
            serde_json::Value::Object(map)
        }
        toml::Value::Datetime(dt) => {
            return Err(DomainError::UnsupportedValue {
                path: at.to_string(),
                found: format!("datetime {dt}"),
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stamp_core::domain::ParamPath;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn integer(store: &ParameterStore, path: &str) -> Option<i64> {
        store
            .resolve(&ParamPath::parse(path).unwrap())
            .ok()
            .and_then(|v| v.as_integer())
    }

    #[test]
    fn toml_tables_become_records() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "params.toml",
            r#"
ApplicationId = "com.example.app"
AppVersionCode = 42

[AndroidApiVersion]
a = 24
b = 34
"#,
        );

        let store = load_parameters(&path).unwrap();
        assert_eq!(integer(&store, "AndroidApiVersion.a"), Some(24));
        assert_eq!(integer(&store, "AndroidApiVersion.b"), Some(34));
        assert_eq!(integer(&store, "AppVersionCode"), Some(42));
    }

    #[test]
    fn json_is_picked_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "params.json",
            r#"{"AndroidApiVersion": {"a": 24, "b": 34}}"#,
        );
        let store = load_parameters(&path).unwrap();
        assert_eq!(integer(&store, "AndroidApiVersion.b"), Some(34));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let err = load_parameters(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(
            err,
            StampError::Application(ApplicationError::Load { .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.toml", "a = [");
        let err = load_parameters(&path).unwrap_err();
        assert!(matches!(
            err,
            StampError::Application(ApplicationError::Parse { .. })
        ));
    }

    #[test]
    fn floats_are_rejected_with_their_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "p.toml", "[Sdk]\nratio = 1.5\n");
        let err = load_parameters(&path).unwrap_err();
        assert!(err.to_string().contains("Sdk.ratio"), "{err}");
    }

    #[test]
    fn datetimes_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "p.toml", "Released = 2024-01-01\n");
        let err = load_parameters(&path).unwrap_err();
        assert!(err.to_string().contains("datetime"), "{err}");
    }

    #[test]
    fn format_defaults_to_toml() {
        assert_eq!(Format::of(Path::new("params")), Format::Toml);
        assert_eq!(Format::of(Path::new("params.JSON")), Format::Json);
    }
}
