//! Property tests for scanning and rendering.

use proptest::prelude::*;
use stamp_core::domain::{ParameterStore, Renderer, ScanReport, Template};

/// Text that can never contain a `{{` opener.
fn plain_text() -> impl Strategy<Value = String> {
    "[^{]{0,200}"
}

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,8}"
}

/// A token path and a scalar to bind it to.
fn binding() -> impl Strategy<Value = (Vec<String>, i64)> {
    (prop::collection::vec(segment(), 1..3), any::<i64>())
}

proptest! {
    #[test]
    fn zero_token_bodies_render_unchanged(body in plain_text()) {
        let template = Template::new("t", body.as_str()).unwrap();
        let rendered = Renderer::default()
            .render(&template, &ParameterStore::new())
            .unwrap();
        prop_assert_eq!(rendered.body, body);
    }

    #[test]
    fn rendering_twice_is_identical(
        prefix in plain_text(),
        suffix in plain_text(),
        (path, value) in binding(),
    ) {
        let dotted = path.join(".");
        let store = ParameterStore::new().with(&dotted, value).unwrap();
        let body = format!("{prefix}{{{{{dotted}}}}}{suffix}");
        let template = Template::new("t", body).unwrap();

        let renderer = Renderer::default();
        let first = renderer.render(&template, &store);
        let second = renderer.render(&template, &store);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn non_token_bytes_are_preserved(
        prefix in plain_text(),
        suffix in plain_text(),
        (path, value) in binding(),
    ) {
        let dotted = path.join(".");
        let store = ParameterStore::new().with(&dotted, value).unwrap();
        let body = format!("{prefix}{{{{{dotted}}}}}{suffix}");
        let template = Template::new("t", body).unwrap();

        let rendered = Renderer::default().render(&template, &store).unwrap();
        prop_assert_eq!(rendered.body, format!("{prefix}{value}{suffix}"));
    }

    #[test]
    fn token_spans_cover_exactly_the_token(
        prefix in plain_text(),
        (path, _value) in binding(),
    ) {
        let dotted = path.join(".");
        let body = format!("{prefix}{{{{{dotted}}}}}");
        let report = ScanReport::collect(&body);

        prop_assert!(report.is_clean());
        prop_assert_eq!(report.tokens.len(), 1);
        let span = report.tokens[0].span();
        prop_assert_eq!(&body[span.range()], format!("{{{{{dotted}}}}}"));
    }

    #[test]
    fn scanning_never_panics(body in ".{0,200}") {
        let report = ScanReport::collect(&body);
        for token in &report.tokens {
            prop_assert!(token.span().end <= body.len());
        }
        for error in &report.errors {
            prop_assert!(error.offset() < body.len());
        }
    }
}
