//! Rule manifest loader.
//!
//! A manifest declares typed fields and named rules:
//!
//! ```toml
//! [[fields]]
//! path = "AppVersionCode"
//! type = "integer"
//!
//! [[rules]]
//! name = "min-le-target"
//! kind = "ordering"
//! paths = ["AndroidApiVersion.a", "AndroidApiVersion.b"]
//! direction = "ascending"
//!
//! [[rules]]
//! name = "version-code-range"
//! kind = "range"
//! path = "AppVersionCode"
//! min = 1
//! max = 2100000000
//! message = "{path} must be between {min} and {max}, got {value}"
//! ```
//!
//! Declared fields expand to their `<path>:kind` checks first, then the
//! rules follow in file order. JSON manifests use the same shape.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use stamp_core::{
    domain::{Order, ParamPath, Rule, Schema, ValueKind},
    error::StampResult,
};

use crate::parameter_loader::{Format, parse_error, read_to_string};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    fields: Vec<FieldEntry>,
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldEntry {
    path: String,
    #[serde(rename = "type")]
    kind: ValueKind,
}

#[derive(Debug, Deserialize)]
struct RuleEntry {
    name: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    body: RuleBody,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RuleBody {
    Required {
        path: String,
    },
    Range {
        path: String,
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    Ordering {
        paths: Vec<String>,
        #[serde(default)]
        direction: Order,
    },
    Monotonic {
        path: String,
    },
    IdentifierFormat {
        path: String,
    },
    SemanticVersion {
        path: String,
    },
}

impl RuleEntry {
    fn into_rule(self) -> Result<Rule, stamp_core::domain::DomainError> {
        let name = self.name.as_str();
        let rule = match &self.body {
            RuleBody::Required { path } => Rule::required(name, path),
            RuleBody::Range { path, min, max } => Rule::range(name, path, *min, *max),
            RuleBody::Ordering { paths, direction } => {
                let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
                Rule::ordering(name, &paths, *direction)
            }
            RuleBody::Monotonic { path } => Rule::monotonic(name, path),
            RuleBody::IdentifierFormat { path } => Rule::identifier_format(name, path),
            RuleBody::SemanticVersion { path } => Rule::semantic_version(name, path),
        }?;
        Ok(match self.message {
            Some(message) => rule.with_message(message),
            None => rule,
        })
    }
}

/// Load the rules declared in a manifest file.
///
/// # Errors
///
/// `ApplicationError::Load` if the file cannot be read and
/// `ApplicationError::Parse` for malformed documents, unknown rule kinds,
/// bad paths, inverted ranges and duplicate field declarations.
#[instrument(fields(path = %path.as_ref().display()))]
pub fn load_rules(path: impl AsRef<Path>) -> StampResult<Vec<Rule>> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    parse_rules(path, &text)
}

/// Parse manifest text; `source` names it in errors and picks the format.
pub fn parse_rules(source: &Path, text: &str) -> StampResult<Vec<Rule>> {
    let manifest: Manifest = match Format::of(source) {
        Format::Json => serde_json::from_str(text).map_err(|e| parse_error(source, e))?,
        Format::Toml => toml::from_str(text).map_err(|e| parse_error(source, e))?,
    };

    let mut schema = Schema::new();
    for field in manifest.fields {
        let path = ParamPath::parse(&field.path).map_err(|e| parse_error(source, e))?;
        schema
            .declare(path, field.kind, Vec::new())
            .map_err(|e| parse_error(source, e))?;
    }

    let mut rules = schema.rules();
    for entry in manifest.rules {
        rules.push(entry.into_rule().map_err(|e| parse_error(source, e))?);
    }

    debug!(count = rules.len(), "loaded rules");
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stamp_core::{
        application::ApplicationError,
        domain::Constraint,
        error::StampError,
    };

    fn toml(text: &str) -> StampResult<Vec<Rule>> {
        parse_rules(Path::new("rules.toml"), text)
    }

    #[test]
    fn parses_every_rule_kind() {
        let rules = toml(
            r#"
[[rules]]
name = "id-present"
kind = "required"
path = "ApplicationId"

[[rules]]
name = "id-format"
kind = "identifier_format"
path = "ApplicationId"

[[rules]]
name = "sdk-order"
kind = "ordering"
paths = ["AndroidApiVersion.a", "AndroidApiVersion.b"]

[[rules]]
name = "code-range"
kind = "range"
path = "AppVersionCode"
min = 1

[[rules]]
name = "code-monotonic"
kind = "monotonic"
path = "AppVersionCode"

[[rules]]
name = "name-semver"
kind = "semantic_version"
path = "AppVersionName"
"#,
        )
        .unwrap();

        assert_eq!(rules.len(), 6);
        assert!(matches!(
            rules[2].constraint(),
            Constraint::Ordering {
                order: Order::Ascending,
                ..
            }
        ));
        assert!(matches!(
            rules[3].constraint(),
            Constraint::Range {
                min: Some(1),
                max: None,
                ..
            }
        ));
        assert!(matches!(
            rules[5].constraint(),
            Constraint::SemanticVersion { .. }
        ));
    }

    #[test]
    fn fields_expand_before_rules() {
        let rules = toml(
            r#"
[[fields]]
path = "AppVersionCode"
type = "integer"

[[rules]]
name = "code-range"
kind = "range"
path = "AppVersionCode"
min = 1
max = 10
message = "{path} out of range"
"#,
        )
        .unwrap();

        let names: Vec<_> = rules.iter().map(Rule::name).collect();
        assert_eq!(names, ["AppVersionCode:kind", "code-range"]);
        assert_eq!(rules[1].message_template(), Some("{path} out of range"));
    }

    #[test]
    fn json_manifest_is_accepted() {
        let rules = parse_rules(
            Path::new("rules.json"),
            r#"{"rules": [{"name": "order", "kind": "ordering",
                "paths": ["A.a", "A.b"], "direction": "descending"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            rules[0].constraint(),
            Constraint::Ordering {
                order: Order::Descending,
                ..
            }
        ));
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let err = toml("[[rules]]\nname = \"x\"\nkind = \"regex\"\npath = \"A\"\n").unwrap_err();
        assert!(matches!(
            err,
            StampError::Application(ApplicationError::Parse { .. })
        ));
    }

    #[test]
    fn inverted_range_is_a_parse_error() {
        let err = toml(
            "[[rules]]\nname = \"r\"\nkind = \"range\"\npath = \"A\"\nmin = 5\nmax = 1\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("rules.toml"), "{err}");
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = toml(
            "[[fields]]\npath = \"A\"\ntype = \"string\"\n[[fields]]\npath = \"A\"\ntype = \"integer\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err}");
    }

    #[test]
    fn empty_manifest_has_no_rules() {
        assert!(toml("").unwrap().is_empty());
    }
}
