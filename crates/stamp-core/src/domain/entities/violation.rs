use std::fmt;

use serde::Serialize;

use crate::domain::value_objects::ParamPath;

/// Category of a failed validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    MissingRequiredField,
    TypeMismatch,
    RangeViolation,
    OrderingViolation,
    MonotonicViolation,
    FormatViolation,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingRequiredField => "MissingRequiredField",
            Self::TypeMismatch => "TypeMismatch",
            Self::RangeViolation => "RangeViolation",
            Self::OrderingViolation => "OrderingViolation",
            Self::MonotonicViolation => "MonotonicViolation",
            Self::FormatViolation => "FormatViolation",
        };
        f.write_str(name)
    }
}

/// One failed rule against one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Name of the rule that produced this violation.
    pub rule: String,
    pub kind: ViolationKind,
    pub path: ParamPath,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({}): {}", self.kind, self.path, self.rule, self.message)
    }
}
