//! Token substitution.
//!
//! [`Renderer::render`] walks a template's tokens once, resolving each path
//! against the store and splicing the stringified value in place of the
//! token. Bytes outside tokens are copied through untouched. A template
//! with any scan error or unresolved token produces no output at all, only
//! a [`RenderFailure`] listing every problem.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::entities::{ParameterStore, ResolveError, ScalarRef, Template, TemplateName};
use crate::domain::scanner::ScanError;
use crate::domain::value_objects::{ParamPath, Span};

/// Turns a resolved scalar into the text spliced into a template.
///
/// Destination-specific escaping lives behind this trait so the token
/// grammar stays language-neutral.
pub trait Stringifier: Send + Sync {
    fn stringify<'v>(&self, path: &ParamPath, value: ScalarRef<'v>) -> Cow<'v, str>;
}

/// Integers in decimal, booleans as `true`/`false`, strings verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStringifier;

impl Stringifier for PlainStringifier {
    fn stringify<'v>(&self, _path: &ParamPath, value: ScalarRef<'v>) -> Cow<'v, str> {
        match value {
            ScalarRef::String(s) => Cow::Borrowed(s),
            ScalarRef::Integer(i) => Cow::Owned(i.to_string()),
            ScalarRef::Boolean(true) => Cow::Borrowed("true"),
            ScalarRef::Boolean(false) => Cow::Borrowed("false"),
        }
    }
}

/// A token that could not be substituted.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenError {
    #[error(transparent)]
    Scan(ScanError),

    #[error("unresolved token '{{{{{path}}}}}' at bytes {span}: {cause}")]
    Unresolved {
        path: ParamPath,
        span: Span,
        cause: ResolveError,
    },
}

impl TokenError {
    pub fn span(&self) -> Span {
        match self {
            Self::Scan(e) => e.span(),
            Self::Unresolved { span, .. } => *span,
        }
    }
}

/// A fully substituted template body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTemplate {
    pub name: TemplateName,
    pub body: String,
}

/// Every reason one template could not be rendered, in body order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderFailure {
    pub name: TemplateName,
    pub errors: Vec<TokenError>,
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} unresolved token(s)", self.name, self.errors.len())
    }
}

pub type RenderResult = Result<RenderedTemplate, RenderFailure>;

/// Substitutes tokens using an injected [`Stringifier`].
#[derive(Clone)]
pub struct Renderer {
    stringifier: Arc<dyn Stringifier>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Arc::new(PlainStringifier))
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(stringifier: Arc<dyn Stringifier>) -> Self {
        Self { stringifier }
    }

    #[instrument(skip_all, fields(template = %template.name()))]
    pub fn render(&self, template: &Template, store: &ParameterStore) -> RenderResult {
        let body = template.body();
        let mut out = String::with_capacity(body.len());
        let mut errors = Vec::new();
        let mut copied = 0;

        for item in template.tokens() {
            let token = match item {
                Ok(token) => token,
                Err(err) => {
                    errors.push(TokenError::Scan(err));
                    continue;
                }
            };

            match store.resolve_scalar(token.path()) {
                Ok(value) => {
                    let span = token.span();
                    out.push_str(&body[copied..span.start]);
                    out.push_str(&self.stringifier.stringify(token.path(), value));
                    copied = span.end;
                }
                Err(cause) => errors.push(TokenError::Unresolved {
                    path: token.path().clone(),
                    span: token.span(),
                    cause,
                }),
            }
        }

        if !errors.is_empty() {
            debug!(errors = errors.len(), "render failed");
            return Err(RenderFailure {
                name: template.name().clone(),
                errors,
            });
        }

        out.push_str(&body[copied..]);
        Ok(RenderedTemplate {
            name: template.name().clone(),
            body: out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(body: &str, store: &ParameterStore) -> RenderResult {
        let template = Template::new("t", body).unwrap();
        Renderer::default().render(&template, store)
    }

    #[test]
    fn substitutes_application_id() {
        let store = ParameterStore::new()
            .with("ApplicationId", "com.example.app")
            .unwrap();
        let out = render("applicationId = \"{{ApplicationId}}\"", &store).unwrap();
        assert_eq!(out.body, "applicationId = \"com.example.app\"");
    }

    #[test]
    fn substitutes_nested_integers() {
        let store = ParameterStore::new()
            .with("AndroidApiVersion.a", 24)
            .unwrap()
            .with("AndroidApiVersion.b", 34)
            .unwrap();
        let out = render(
            "minSdk = {{AndroidApiVersion.a}}\ntargetSdk = {{AndroidApiVersion.b}}",
            &store,
        )
        .unwrap();
        assert_eq!(out.body, "minSdk = 24\ntargetSdk = 34");
    }

    #[test]
    fn stringifies_booleans_and_negatives() {
        let store = ParameterStore::new()
            .with("flag", true)
            .unwrap()
            .with("offset", -3)
            .unwrap();
        let out = render("{{flag}}/{{offset}}", &store).unwrap();
        assert_eq!(out.body, "true/-3");
    }

    #[test]
    fn zero_token_body_is_unchanged() {
        let body = "plugins {\n    alias(libs.plugins.android.application)\n}\n";
        let out = render(body, &ParameterStore::new()).unwrap();
        assert_eq!(out.body, body);
    }

    #[test]
    fn missing_value_fails_without_output() {
        let store = ParameterStore::new().with("a", 1).unwrap();
        let failure = render("{{a}} {{b}} {{c.d}}", &store).unwrap_err();
        assert_eq!(failure.errors.len(), 2);
        assert!(matches!(
            &failure.errors[0],
            TokenError::Unresolved { cause: ResolveError::PathNotFound { .. }, .. }
        ));
        assert_eq!(failure.errors[0].span(), Span::new(6, 11));
    }

    #[test]
    fn record_as_scalar_is_type_mismatch() {
        let store = ParameterStore::new()
            .with("AndroidApiVersion.a", 24)
            .unwrap();
        let failure = render("{{AndroidApiVersion}}", &store).unwrap_err();
        assert!(matches!(
            &failure.errors[0],
            TokenError::Unresolved { cause: ResolveError::TypeMismatch { .. }, .. }
        ));
    }

    #[test]
    fn scan_errors_are_render_failures() {
        let store = ParameterStore::new().with("a", 1).unwrap();
        let failure = render("{{a}} {{ a }}", &store).unwrap_err();
        assert!(matches!(failure.errors[0], TokenError::Scan(_)));
    }

    #[test]
    fn unresolved_token_message_shows_token() {
        let failure = render("x {{Missing}}", &ParameterStore::new()).unwrap_err();
        let msg = failure.errors[0].to_string();
        assert!(msg.starts_with("unresolved token '{{Missing}}' at bytes 2..13"), "{msg}");
    }

    #[test]
    fn rendering_is_idempotent() {
        let store = ParameterStore::new().with("a", "{{a}}").unwrap();
        let template = Template::new("t", "<{{a}}>").unwrap();
        let renderer = Renderer::default();
        let first = renderer.render(&template, &store).unwrap();
        let second = renderer.render(&template, &store).unwrap();
        assert_eq!(first, second);
        // Substituted text is not rescanned.
        assert_eq!(first.body, "<{{a}}>");
    }

    struct Upper;

    impl Stringifier for Upper {
        fn stringify<'v>(&self, _path: &ParamPath, value: ScalarRef<'v>) -> Cow<'v, str> {
            Cow::Owned(value.to_string().to_uppercase())
        }
    }

    #[test]
    fn uses_injected_stringifier() {
        let store = ParameterStore::new().with("name", "app").unwrap();
        let template = Template::new("t", "{{name}}").unwrap();
        let out = Renderer::new(Arc::new(Upper))
            .render(&template, &store)
            .unwrap();
        assert_eq!(out.body, "APP");
    }
}
