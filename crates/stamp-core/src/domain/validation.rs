use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, instrument, trace};

use crate::domain::entities::{
    BaselineProvider, Constraint, NoBaselines, Order, ParameterStore, ResolveError, Rule,
    ScalarRef, Value, Violation, ViolationKind,
};
use crate::domain::entities::rule::MessageSlots;
use crate::domain::value_objects::{ParamPath, ValueKind};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)+$").expect("identifier pattern")
});

static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)$").expect("semver pattern")
});

/// Runs rules against a parameter store.
///
/// Every rule is evaluated, in declaration order, and every failure is
/// reported. The store is never modified. Monotonic rules ask the injected
/// [`BaselineProvider`] for the last released value.
#[derive(Clone)]
pub struct Validator {
    baselines: Arc<dyn BaselineProvider>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Arc::new(NoBaselines))
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").finish_non_exhaustive()
    }
}

impl Validator {
    pub fn new(baselines: Arc<dyn BaselineProvider>) -> Self {
        Self { baselines }
    }

    #[instrument(skip_all, fields(rules = rules.len()))]
    pub fn validate(&self, store: &ParameterStore, rules: &[Rule]) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in rules {
            let before = violations.len();
            self.check(rule, store, &mut violations);
            trace!(
                rule = rule.name(),
                failed = violations.len() > before,
                "rule evaluated"
            );
        }

        let violations = dedup_lookup_failures(violations);
        for v in &violations {
            debug!(rule = %v.rule, kind = %v.kind, path = %v.path, "violation");
        }
        violations
    }

    fn check(&self, rule: &Rule, store: &ParameterStore, out: &mut Vec<Violation>) {
        match rule.constraint() {
            Constraint::Required { path } => {
                if let Err(err) = store.resolve(path) {
                    out.push(lookup_failure(rule, path, &err));
                }
            }

            Constraint::Kind { path, kind } => match store.resolve(path) {
                Ok(value) if value.kind() != *kind => out.push(violation(
                    rule,
                    ViolationKind::TypeMismatch,
                    path,
                    MessageSlots {
                        path: Some(path),
                        value: Some(value.kind().to_string()),
                        ..Default::default()
                    },
                )),
                Ok(_) => {}
                Err(err) => out.push(lookup_failure(rule, path, &err)),
            },

            Constraint::Range { path, min, max } => {
                let Some(value) = integer(rule, store, path, out) else {
                    return;
                };
                let below = min.is_some_and(|min| value < min);
                let above = max.is_some_and(|max| value > max);
                if below || above {
                    out.push(violation(
                        rule,
                        ViolationKind::RangeViolation,
                        path,
                        MessageSlots {
                            path: Some(path),
                            value: Some(value.to_string()),
                            min: *min,
                            max: *max,
                            baseline: None,
                        },
                    ));
                }
            }

            Constraint::Ordering { paths, order } => self.check_ordering(rule, store, paths, *order, out),

            Constraint::Monotonic { path } => {
                let Some(value) = integer(rule, store, path, out) else {
                    return;
                };
                match self.baselines.baseline(path) {
                    Some(baseline) if value < baseline => out.push(violation(
                        rule,
                        ViolationKind::MonotonicViolation,
                        path,
                        MessageSlots {
                            path: Some(path),
                            value: Some(value.to_string()),
                            baseline: Some(baseline),
                            ..Default::default()
                        },
                    )),
                    Some(_) => {}
                    None => debug!(%path, "no baseline recorded, monotonic rule passes"),
                }
            }

            Constraint::IdentifierFormat { path } => {
                check_format(rule, store, path, &IDENTIFIER, out);
            }

            Constraint::SemanticVersion { path } => {
                check_format(rule, store, path, &SEMVER, out);
            }
        }
    }

    fn check_ordering(
        &self,
        rule: &Rule,
        store: &ParameterStore,
        paths: &[ParamPath],
        order: Order,
        out: &mut Vec<Violation>,
    ) {
        let values: Vec<Option<i64>> = paths
            .iter()
            .map(|path| integer(rule, store, path, out))
            .collect();

        // Any unresolved member has already been reported on its own path.
        let Some(values) = values.into_iter().collect::<Option<Vec<i64>>>() else {
            return;
        };

        let target = ParamPath::common_parent(paths).unwrap_or_else(|| paths[0].clone());

        for (i, pair) in values.windows(2).enumerate() {
            let (left, right) = (pair[0], pair[1]);
            if order.holds(left, right) {
                continue;
            }
            let detail = format!(
                "{}={} {} {}={} does not hold",
                paths[i],
                left,
                order.symbol(),
                paths[i + 1],
                right
            );
            out.push(violation(
                rule,
                ViolationKind::OrderingViolation,
                &target,
                MessageSlots {
                    path: Some(&target),
                    value: Some(detail),
                    ..Default::default()
                },
            ));
        }
    }
}

fn violation(
    rule: &Rule,
    kind: ViolationKind,
    path: &ParamPath,
    slots: MessageSlots<'_>,
) -> Violation {
    Violation {
        rule: rule.name().to_string(),
        kind,
        path: path.clone(),
        message: rule.message(&slots),
    }
}

/// A rule could not read its path at all.
fn lookup_failure(rule: &Rule, path: &ParamPath, err: &ResolveError) -> Violation {
    let (kind, message) = match err {
        ResolveError::PathNotFound { missing, .. } if missing == path => (
            ViolationKind::MissingRequiredField,
            format!("{path} is required"),
        ),
        ResolveError::PathNotFound { missing, .. } => (
            ViolationKind::MissingRequiredField,
            format!("{path} is required (no entry '{missing}')"),
        ),
        ResolveError::TypeMismatch { .. } => (ViolationKind::TypeMismatch, err.to_string()),
    };

    // A custom template on a presence rule is the user's wording for "missing".
    let message = match (rule.constraint(), rule.message_template()) {
        (Constraint::Required { .. }, Some(_)) => rule.message(&MessageSlots {
            path: Some(path),
            ..Default::default()
        }),
        _ => message,
    };

    Violation {
        rule: rule.name().to_string(),
        kind,
        path: path.clone(),
        message,
    }
}

fn wrong_kind(rule: &Rule, path: &ParamPath, expected: ValueKind, found: ScalarRef<'_>) -> Violation {
    let found = match found {
        ScalarRef::String(_) => ValueKind::String,
        ScalarRef::Integer(_) => ValueKind::Integer,
        ScalarRef::Boolean(_) => ValueKind::Boolean,
    };
    Violation {
        rule: rule.name().to_string(),
        kind: ViolationKind::TypeMismatch,
        path: path.clone(),
        message: format!("{path} must be {expected} for rule '{}', found {found}", rule.name()),
    }
}

fn integer(
    rule: &Rule,
    store: &ParameterStore,
    path: &ParamPath,
    out: &mut Vec<Violation>,
) -> Option<i64> {
    match store.resolve_scalar(path) {
        Ok(ScalarRef::Integer(i)) => Some(i),
        Ok(other) => {
            out.push(wrong_kind(rule, path, ValueKind::Integer, other));
            None
        }
        Err(err) => {
            out.push(lookup_failure(rule, path, &err));
            None
        }
    }
}

fn string<'s>(
    rule: &Rule,
    store: &'s ParameterStore,
    path: &ParamPath,
    out: &mut Vec<Violation>,
) -> Option<&'s str> {
    match store.resolve(path) {
        Ok(Value::String(s)) => Some(s),
        Ok(other) => match other.as_scalar() {
            Some(scalar) => {
                out.push(wrong_kind(rule, path, ValueKind::String, scalar));
                None
            }
            None => {
                out.push(Violation {
                    rule: rule.name().to_string(),
                    kind: ViolationKind::TypeMismatch,
                    path: path.clone(),
                    message: format!("{path} must be string, found record"),
                });
                None
            }
        },
        Err(err) => {
            out.push(lookup_failure(rule, path, &err));
            None
        }
    }
}

fn check_format(
    rule: &Rule,
    store: &ParameterStore,
    path: &ParamPath,
    pattern: &Regex,
    out: &mut Vec<Violation>,
) {
    let Some(value) = string(rule, store, path, out) else {
        return;
    };
    if !pattern.is_match(value) {
        out.push(violation(
            rule,
            ViolationKind::FormatViolation,
            path,
            MessageSlots {
                path: Some(path),
                value: Some(value.to_string()),
                ..Default::default()
            },
        ));
    }
}

/// Several rules over one absent path would each report it; keep the first.
fn dedup_lookup_failures(violations: Vec<Violation>) -> Vec<Violation> {
    let mut seen = HashSet::new();
    violations
        .into_iter()
        .filter(|v| match v.kind {
            ViolationKind::MissingRequiredField | ViolationKind::TypeMismatch => {
                seen.insert((v.kind, v.path.clone()))
            }
            _ => true,
        })
        .collect()
}
