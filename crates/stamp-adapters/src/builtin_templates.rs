//! Built-in presets.
//!
//! A [`Preset`] bundles the templates and the rule set for one target
//! platform. Both are compiled into the binary, so a preset works without
//! any template directory on disk.
//!
//! | Preset    | Templates                | Rules                           |
//! |-----------|--------------------------|---------------------------------|
//! | `android` | `app/build.gradle.kts`   | `templates/android/rules.toml`  |

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use stamp_core::{
    domain::{Rule, Template},
    error::{StampError, StampResult},
};

use crate::rules_loader::parse_rules;

/// A bundled (templates, rules) pair for a target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Android,
}

impl Preset {
    pub const ALL: &'static [Preset] = &[Preset::Android];

    pub fn name(self) -> &'static str {
        match self {
            Self::Android => "android",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Android => "Android application module (app/build.gradle.kts)",
        }
    }

    /// The preset's templates, sorted by name.
    #[instrument]
    pub fn templates(self) -> StampResult<Vec<Template>> {
        let sources: &[(&str, &str)] = match self {
            Self::Android => android::TEMPLATES,
        };

        let templates = sources
            .iter()
            .map(|(name, body)| Template::new(*name, *body).map_err(StampError::from))
            .collect::<StampResult<Vec<_>>>()?;
        debug!(count = templates.len(), "loaded preset templates");
        Ok(templates)
    }

    /// The preset's rules: declared field kinds first, then value rules.
    #[instrument]
    pub fn rules(self) -> StampResult<Vec<Rule>> {
        let (source, text) = match self {
            Self::Android => ("android/rules.toml", android::RULES),
        };
        parse_rules(Path::new(source), text)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = StampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StampError::Configuration {
                message: format!(
                    "unknown preset '{s}' (available: {})",
                    Self::ALL
                        .iter()
                        .map(|p| p.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

/// Android application module.
pub mod android {
    /// `(name, body)` pairs; the name is the output path.
    pub const TEMPLATES: &[(&str, &str)] = &[(
        "app/build.gradle.kts",
        include_str!("../templates/android/app.build.gradle.kts"),
    )];

    pub const RULES: &str = include_str!("../templates/android/rules.toml");
}

#[cfg(test)]
mod tests {
    use super::*;
    use stamp_core::{
        domain::{ParamPath, ParameterStore, ViolationKind},
        prelude::{ScaffoldFailure, ScaffoldService},
    };
    use std::sync::Arc;

    use crate::{baselines::InMemoryBaselines, stringifier::KotlinStringifier};

    fn store(a: i64, b: i64) -> ParameterStore {
        ParameterStore::new()
            .with("ApplicationId", "com.example.app")
            .unwrap()
            .with("AndroidApiVersion.a", a)
            .unwrap()
            .with("AndroidApiVersion.b", b)
            .unwrap()
            .with("AppVersionCode", 42)
            .unwrap()
            .with("AppVersionName", "1.2.0")
            .unwrap()
    }

    #[test]
    fn android_preset_parses() {
        let templates = Preset::Android.templates().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name().as_str(), "app/build.gradle.kts");
        assert!(templates[0].scan().is_clean());

        let rules = Preset::Android.rules().unwrap();
        assert!(rules.iter().any(|r| r.name() == "min-sdk-le-target-sdk"));
        assert!(rules.iter().any(|r| r.name() == "ApplicationId:kind"));
    }

    #[test]
    fn android_template_uses_exactly_the_declared_fields() {
        let templates = Preset::Android.templates().unwrap();
        let mut paths: Vec<String> = templates[0]
            .scan()
            .required_paths()
            .into_iter()
            .map(|p| p.to_string())
            .collect();
        paths.sort();
        assert_eq!(
            paths,
            [
                "AndroidApiVersion.a",
                "AndroidApiVersion.b",
                "AppVersionCode",
                "AppVersionName",
                "ApplicationId",
            ]
        );
    }

    #[test]
    fn android_preset_materializes() {
        let scaffold = ScaffoldService::default()
            .materialize(
                &Preset::Android.templates().unwrap(),
                &store(24, 34),
                &Preset::Android.rules().unwrap(),
            )
            .unwrap();
        let body = scaffold.get("app/build.gradle.kts").unwrap();
        assert!(body.contains("minSdk = 24"));
        assert!(body.contains("targetSdk = 34"));
        assert!(body.ends_with("dependencies {}"));
    }

    #[test]
    fn android_preset_rejects_inverted_sdks() {
        let failure = ScaffoldService::default()
            .materialize(
                &Preset::Android.templates().unwrap(),
                &store(34, 24),
                &Preset::Android.rules().unwrap(),
            )
            .unwrap_err();
        let ScaffoldFailure::Validation { violations } = failure else {
            panic!("expected validation failure");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::OrderingViolation);
        assert!(violations[0].message.contains("minSdk must not exceed targetSdk"));
    }

    #[test]
    fn android_preset_enforces_the_baseline() {
        let baselines =
            InMemoryBaselines::new().with(ParamPath::parse("AppVersionCode").unwrap(), 43);
        let service = ScaffoldService::new(Arc::new(KotlinStringifier), Arc::new(baselines));
        let failure = service
            .materialize(
                &Preset::Android.templates().unwrap(),
                &store(24, 34),
                &Preset::Android.rules().unwrap(),
            )
            .unwrap_err();
        let ScaffoldFailure::Validation { violations } = failure else {
            panic!("expected validation failure");
        };
        assert_eq!(violations[0].kind, ViolationKind::MonotonicViolation);
    }

    #[test]
    fn preset_names_parse() {
        assert_eq!("Android".parse::<Preset>().unwrap(), Preset::Android);
        let err = "ios".parse::<Preset>().unwrap_err();
        assert!(err.to_string().contains("android"));
    }
}
