use crate::domain::error::DomainError;
use crate::domain::value_objects::{ParamPath, ValueKind};

use super::rule::{Constraint, Rule};

/// A declared parameter: its path, its kind, and the rules attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub path: ParamPath,
    pub kind: ValueKind,
    pub rules: Vec<Rule>,
}

/// Ordered field declarations plus cross-field rules.
///
/// The schema is metadata for the validator. The store itself accepts any
/// well-typed tree; [`Schema::rules`] is what turns declarations into
/// checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDecl>,
    cross_field: Vec<Rule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. Each path may be declared once.
    pub fn declare(
        &mut self,
        path: ParamPath,
        kind: ValueKind,
        rules: Vec<Rule>,
    ) -> Result<&mut Self, DomainError> {
        if self.fields.iter().any(|f| f.path == path) {
            return Err(DomainError::DuplicateDeclaration {
                path: path.to_string(),
            });
        }
        self.fields.push(FieldDecl { path, kind, rules });
        Ok(self)
    }

    /// Add a rule that spans several fields.
    pub fn cross_field(&mut self, rule: Rule) -> &mut Self {
        self.cross_field.push(rule);
        self
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn field(&self, path: &ParamPath) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| &f.path == path)
    }

    /// Flatten into the rule list the validator runs.
    ///
    /// For each field, in declaration order: a presence-and-kind check named
    /// `<path>:kind`, then the field's own rules. Cross-field rules follow.
    pub fn rules(&self) -> Vec<Rule> {
        let mut out = Vec::new();
        for field in &self.fields {
            let kind_check = Rule::try_new(
                format!("{}:kind", field.path),
                Constraint::Kind {
                    path: field.path.clone(),
                    kind: field.kind,
                },
            );
            // The generated name is never empty and the constraint has no bounds.
            if let Ok(rule) = kind_check {
                out.push(rule);
            }
            out.extend(field.rules.iter().cloned());
        }
        out.extend(self.cross_field.iter().cloned());
        out
    }
}
