//! Template aggregate.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  Template                                     │
//! │  ├── TemplateName   logical name / output path│
//! │  └── body: Arc<str> immutable text            │
//! │       └── {{Dotted.path}} tokens              │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! The body is shared behind an `Arc<str>` so a template set can be handed
//! to parallel render workers without copying bodies. Names are opaque to
//! the core; the scaffold writer treats them as relative output paths.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::scanner::{Scan, ScanReport, scan};

/// Logical name of a template, e.g. `app/build.gradle.kts`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TemplateName(String);

impl TemplateName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidTemplate(
                "template name cannot be empty".into(),
            ));
        }
        if name.contains('\0') {
            return Err(DomainError::InvalidTemplate(format!(
                "template name {name:?} contains a NUL byte"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TemplateName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A named, immutable template body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: TemplateName,
    body: Arc<str>,
}

impl Template {
    pub fn new(name: impl Into<String>, body: impl Into<Arc<str>>) -> Result<Self, DomainError> {
        Ok(Self {
            name: TemplateName::new(name)?,
            body: body.into(),
        })
    }

    pub fn name(&self) -> &TemplateName {
        &self.name
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Lazily scan the body for tokens.
    pub fn tokens(&self) -> Scan<'_> {
        scan(&self.body)
    }

    /// Scan the whole body at once.
    pub fn scan(&self) -> ScanReport {
        ScanReport::collect(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_names() {
        assert!(Template::new("", "body").is_err());
        assert!(Template::new("   ", "body").is_err());
        assert!(Template::new("a\0b", "body").is_err());
    }

    #[test]
    fn clones_share_the_body() {
        let t = Template::new("app/build.gradle.kts", "x = {{X}}").unwrap();
        let copy = t.clone();
        assert!(Arc::ptr_eq(&t.body, &copy.body));
    }

    #[test]
    fn scans_its_body() {
        let t = Template::new("t", "{{ApplicationId}} {{AppVersionCode}}").unwrap();
        let report = t.scan();
        assert_eq!(report.tokens.len(), 2);
        assert_eq!(t.tokens().count(), 2);
    }
}
