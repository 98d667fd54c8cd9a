//! Validation rules.
//!
//! A [`Rule`] pairs a name and an optional message template with a
//! [`Constraint`], the pure predicate the validator evaluates. Rules are
//! independent of each other and never mutate the store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value_objects::{ParamPath, ValueKind};

/// Supplies the previously released value for monotonic rules.
///
/// Implemented by:
/// - [`NoBaselines`] (nothing recorded; every monotonic rule passes)
/// - `stamp_adapters::baselines::InMemoryBaselines`
/// - `stamp_adapters::baselines::JsonFileBaselines`
pub trait BaselineProvider: Send + Sync {
    fn baseline(&self, path: &ParamPath) -> Option<i64>;
}

/// A provider with no recorded baselines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBaselines;

impl BaselineProvider for NoBaselines {
    fn baseline(&self, _path: &ParamPath) -> Option<i64> {
        None
    }
}

/// Direction of an ordering rule. Both directions are non-strict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// `a <= b <= ...`
    #[default]
    Ascending,
    /// `a >= b >= ...`
    Descending,
}

impl Order {
    pub fn holds(self, left: i64, right: i64) -> bool {
        match self {
            Self::Ascending => left <= right,
            Self::Descending => left >= right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Ascending => "<=",
            Self::Descending => ">=",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

/// The predicate a rule checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// The path resolves to something.
    Required { path: ParamPath },
    /// The path resolves to a value of the given kind.
    Kind { path: ParamPath, kind: ValueKind },
    /// Integer within `[min, max]`, either bound optional.
    Range {
        path: ParamPath,
        min: Option<i64>,
        max: Option<i64>,
    },
    /// Integers in non-strict order.
    Ordering { paths: Vec<ParamPath>, order: Order },
    /// Integer not below the recorded baseline.
    Monotonic { path: ParamPath },
    /// Reverse-DNS style identifier (`com.example.app`).
    IdentifierFormat { path: ParamPath },
    /// `MAJOR.MINOR.PATCH`.
    SemanticVersion { path: ParamPath },
}

impl Constraint {
    /// Every path the constraint reads, in declaration order.
    pub fn paths(&self) -> &[ParamPath] {
        match self {
            Self::Ordering { paths, .. } => paths,
            Self::Required { path }
            | Self::Kind { path, .. }
            | Self::Range { path, .. }
            | Self::Monotonic { path }
            | Self::IdentifierFormat { path }
            | Self::SemanticVersion { path } => std::slice::from_ref(path),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Required { .. } => "required",
            Self::Kind { .. } => "kind",
            Self::Range { .. } => "range",
            Self::Ordering { .. } => "ordering",
            Self::Monotonic { .. } => "monotonic",
            Self::IdentifierFormat { .. } => "identifier_format",
            Self::SemanticVersion { .. } => "semantic_version",
        }
    }

    /// Message used when the rule carries no template of its own.
    pub fn default_message(&self) -> String {
        match self {
            Self::Required { .. } => "{path} is required".into(),
            Self::Kind { kind, .. } => format!("{{path}} must be of kind {kind}, found {{value}}"),
            Self::Range {
                min: Some(_),
                max: Some(_),
                ..
            } => "{path} must be between {min} and {max}, got {value}".into(),
            Self::Range { min: Some(_), .. } => "{path} must be at least {min}, got {value}".into(),
            Self::Range { max: Some(_), .. } => "{path} must be at most {max}, got {value}".into(),
            Self::Range { .. } => "{path} must be an integer".into(),
            Self::Ordering { order, .. } => {
                format!("{{path}} must be {order}: {{value}}")
            }
            Self::Monotonic { .. } => {
                "{path} must not decrease: got {value}, last released {baseline}".into()
            }
            Self::IdentifierFormat { .. } => {
                "{path} must be a dotted identifier such as com.example.app, got \"{value}\"".into()
            }
            Self::SemanticVersion { .. } => {
                "{path} must be a MAJOR.MINOR.PATCH version, got \"{value}\"".into()
            }
        }
    }
}

/// A named constraint with an optional message template.
///
/// Message templates use single-brace slots: `{path}`, `{value}`, `{min}`,
/// `{max}`, `{baseline}`, `{rule}`. Slots with nothing to fill stay as
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    constraint: Constraint,
    message: Option<String>,
}

impl Rule {
    /// Build a rule, checking that the constraint is well formed.
    pub fn try_new(name: impl Into<String>, constraint: Constraint) -> Result<Self, DomainError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(DomainError::InvalidRule {
                rule: name,
                reason: "rule name cannot be empty".into(),
            });
        }

        match &constraint {
            Constraint::Range {
                min: Some(min),
                max: Some(max),
                ..
            } if min > max => {
                return Err(DomainError::InvalidRule {
                    rule: name,
                    reason: format!("min {min} is greater than max {max}"),
                });
            }
            Constraint::Ordering { paths, .. } if paths.len() < 2 => {
                return Err(DomainError::InvalidRule {
                    rule: name,
                    reason: "ordering needs at least two paths".into(),
                });
            }
            _ => {}
        }

        Ok(Self {
            name,
            constraint,
            message: None,
        })
    }

    pub fn required(name: &str, path: &str) -> Result<Self, DomainError> {
        Self::try_new(
            name,
            Constraint::Required {
                path: ParamPath::parse(path)?,
            },
        )
    }

    pub fn kind(name: &str, path: &str, kind: ValueKind) -> Result<Self, DomainError> {
        Self::try_new(
            name,
            Constraint::Kind {
                path: ParamPath::parse(path)?,
                kind,
            },
        )
    }

    pub fn range(
        name: &str,
        path: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Self, DomainError> {
        Self::try_new(
            name,
            Constraint::Range {
                path: ParamPath::parse(path)?,
                min,
                max,
            },
        )
    }

    pub fn ordering(name: &str, paths: &[&str], order: Order) -> Result<Self, DomainError> {
        let paths = paths
            .iter()
            .map(|p| ParamPath::parse(p))
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_new(name, Constraint::Ordering { paths, order })
    }

    pub fn monotonic(name: &str, path: &str) -> Result<Self, DomainError> {
        Self::try_new(
            name,
            Constraint::Monotonic {
                path: ParamPath::parse(path)?,
            },
        )
    }

    pub fn identifier_format(name: &str, path: &str) -> Result<Self, DomainError> {
        Self::try_new(
            name,
            Constraint::IdentifierFormat {
                path: ParamPath::parse(path)?,
            },
        )
    }

    pub fn semantic_version(name: &str, path: &str) -> Result<Self, DomainError> {
        Self::try_new(
            name,
            Constraint::SemanticVersion {
                path: ParamPath::parse(path)?,
            },
        )
    }

    /// Replace the default message with a template.
    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.message = Some(template.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn message_template(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Render the failure message for one violation.
    pub(crate) fn message(&self, slots: &MessageSlots<'_>) -> String {
        let template = match &self.message {
            Some(custom) => custom.clone(),
            None => self.constraint.default_message(),
        };
        slots.fill(&template, &self.name)
    }
}

/// Values available to a message template.
#[derive(Debug, Default)]
pub(crate) struct MessageSlots<'a> {
    pub path: Option<&'a ParamPath>,
    pub value: Option<String>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub baseline: Option<i64>,
}

impl MessageSlots<'_> {
    fn fill(&self, template: &str, rule: &str) -> String {
        let mut out = template.replace("{rule}", rule);
        if let Some(path) = self.path {
            out = out.replace("{path}", &path.to_string());
        }
        if let Some(value) = &self.value {
            out = out.replace("{value}", value);
        }
        if let Some(min) = self.min {
            out = out.replace("{min}", &min.to_string());
        }
        if let Some(max) = self.max {
            out = out.replace("{max}", &max.to_string());
        }
        if let Some(baseline) = self.baseline {
            out = out.replace("{baseline}", &baseline.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        let err = Rule::required("  ", "ApplicationId").unwrap_err();
        assert!(matches!(err, DomainError::InvalidRule { .. }));
    }

    #[test]
    fn rejects_inverted_range() {
        let err = Rule::range("r", "AppVersionCode", Some(10), Some(1)).unwrap_err();
        assert!(err.to_string().contains("greater than max"));
    }

    #[test]
    fn rejects_single_path_ordering() {
        assert!(Rule::ordering("o", &["AndroidApiVersion.a"], Order::Ascending).is_err());
    }

    #[test]
    fn rejects_malformed_paths() {
        assert!(Rule::monotonic("m", "App Version").is_err());
    }

    #[test]
    fn order_is_non_strict() {
        assert!(Order::Ascending.holds(24, 24));
        assert!(Order::Ascending.holds(24, 34));
        assert!(!Order::Ascending.holds(34, 24));
        assert!(Order::Descending.holds(34, 24));
    }

    #[test]
    fn fills_message_slots() {
        let rule = Rule::range("code-range", "AppVersionCode", Some(1), Some(10))
            .unwrap()
            .with_message("{rule}: {path}={value} not in [{min}, {max}] ({baseline})");
        let path = ParamPath::parse("AppVersionCode").unwrap();
        let msg = rule.message(&MessageSlots {
            path: Some(&path),
            value: Some("42".into()),
            min: Some(1),
            max: Some(10),
            baseline: None,
        });
        assert_eq!(msg, "code-range: AppVersionCode=42 not in [1, 10] ({baseline})");
    }

    #[test]
    fn default_message_mentions_bounds() {
        let rule = Rule::range("r", "AndroidApiVersion.a", Some(1), Some(99)).unwrap();
        let path = ParamPath::parse("AndroidApiVersion.a").unwrap();
        let msg = rule.message(&MessageSlots {
            path: Some(&path),
            value: Some("120".into()),
            min: Some(1),
            max: Some(99),
            baseline: None,
        });
        assert_eq!(msg, "AndroidApiVersion.a must be between 1 and 99, got 120");
    }

    #[test]
    fn constraint_lists_its_paths() {
        let rule = Rule::ordering(
            "o",
            &["AndroidApiVersion.a", "AndroidApiVersion.b"],
            Order::Ascending,
        )
        .unwrap();
        assert_eq!(rule.constraint().paths().len(), 2);
        assert_eq!(rule.constraint().kind_name(), "ordering");
    }
}
