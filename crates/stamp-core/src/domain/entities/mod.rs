pub mod rule;
pub mod schema;
pub mod store;
pub mod template;
pub mod violation;

pub use rule::{BaselineProvider, Constraint, NoBaselines, Order, Rule};
pub use schema::{FieldDecl, Schema};
pub use store::{Expected, ParameterStore, ResolveError, ScalarRef, Value};
pub use template::{Template, TemplateName};
pub use violation::{Violation, ViolationKind};
