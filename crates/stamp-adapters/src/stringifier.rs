//! Destination-aware [`Stringifier`]s.

use std::{borrow::Cow, fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use stamp_core::{
    domain::{ParamPath, PlainStringifier, ScalarRef, Stringifier},
    error::StampError,
};

/// Escapes string values for a Kotlin string literal.
///
/// `\`, `"`, `$` and line breaks are escaped so a value spliced between
/// quotes in a `.kts` file stays one literal. Integers and booleans are
/// written as the plain stringifier writes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct KotlinStringifier;

impl Stringifier for KotlinStringifier {
    fn stringify<'v>(&self, path: &ParamPath, value: ScalarRef<'v>) -> Cow<'v, str> {
        match value {
            ScalarRef::String(s) if s.contains(['\\', '"', '$', '\n', '\r', '\t']) => {
                Cow::Owned(escape_kotlin(s))
            }
            other => PlainStringifier.stringify(path, other),
        }
    }
}

fn escape_kotlin(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Escaping mode selectable from the command line and configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escape {
    #[default]
    Plain,
    Kotlin,
}

impl fmt::Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Kotlin => write!(f, "kotlin"),
        }
    }
}

impl FromStr for Escape {
    type Err = StampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "none" => Ok(Self::Plain),
            "kotlin" | "kts" => Ok(Self::Kotlin),
            other => Err(StampError::Configuration {
                message: format!("unknown escape mode '{other}' (expected plain or kotlin)"),
            }),
        }
    }
}

pub fn stringifier_for(escape: Escape) -> Arc<dyn Stringifier> {
    match escape {
        Escape::Plain => Arc::new(PlainStringifier),
        Escape::Kotlin => Arc::new(KotlinStringifier),
    }
}
