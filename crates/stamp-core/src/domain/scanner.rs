//! Placeholder token scanner.
//!
//! Token grammar (bit-exact):
//!
//! ```text
//! token   := "{{" segment ("." segment)* "}}"
//! segment := [A-Za-z_][A-Za-z0-9_]*
//! ```
//!
//! No whitespace is allowed inside the delimiters and segment names are
//! case-sensitive. Tokens do not nest: the first `}}` after a `{{` closes
//! the token, whatever sits between them.
//!
//! The scanner never aborts on a malformed token. [`scan`] yields one item
//! per `{{ ... }}` pair, either a [`PlaceholderToken`] or a [`ScanError`],
//! and carries on after the closing marker so a single pass reports every
//! problem in the body.

use serde::Serialize;
use thiserror::Error;

use crate::domain::value_objects::{ParamPath, SegmentFault, Span, check_segment};

pub const OPEN: &str = "{{";
pub const CLOSE: &str = "}}";

/// A placeholder found in a template body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlaceholderToken {
    path: ParamPath,
    span: Span,
}

impl PlaceholderToken {
    pub fn path(&self) -> &ParamPath {
        &self.path
    }

    /// Byte range of the whole token, delimiters included.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// Malformed placeholder syntax.
///
/// `offset` is the byte that made the token invalid; `span` covers the
/// whole offending token.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanError {
    #[error("empty placeholder at byte {offset}")]
    EmptyToken { offset: usize, span: Span },

    #[error("empty path segment at byte {offset}")]
    EmptySegment { offset: usize, span: Span },

    #[error("illegal character {ch:?} at byte {offset}")]
    IllegalCharacter { ch: char, offset: usize, span: Span },

    #[error("unterminated placeholder opened at byte {offset}")]
    Unterminated { offset: usize, span: Span },
}

impl ScanError {
    pub fn offset(&self) -> usize {
        match self {
            Self::EmptyToken { offset, .. }
            | Self::EmptySegment { offset, .. }
            | Self::IllegalCharacter { offset, .. }
            | Self::Unterminated { offset, .. } => *offset,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::EmptyToken { span, .. }
            | Self::EmptySegment { span, .. }
            | Self::IllegalCharacter { span, .. }
            | Self::Unterminated { span, .. } => *span,
        }
    }
}

/// Scan `body` for placeholders, left to right.
///
/// The returned iterator is lazy and `Clone`; scanning the same body twice
/// yields the same sequence.
pub fn scan(body: &str) -> Scan<'_> {
    Scan {
        body,
        cursor: 0,
        finished: false,
    }
}

/// Iterator returned by [`scan`].
#[derive(Debug, Clone)]
pub struct Scan<'a> {
    body: &'a str,
    cursor: usize,
    finished: bool,
}

impl Iterator for Scan<'_> {
    type Item = Result<PlaceholderToken, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let Some(found) = self.body[self.cursor..].find(OPEN) else {
            self.finished = true;
            return None;
        };
        let open = self.cursor + found;
        let inner_start = open + OPEN.len();

        let Some(found) = self.body[inner_start..].find(CLOSE) else {
            // Nothing after an unmatched opener can be a token.
            self.finished = true;
            return Some(Err(ScanError::Unterminated {
                offset: open,
                span: Span::new(open, self.body.len()),
            }));
        };
        let inner_end = inner_start + found;
        let end = inner_end + CLOSE.len();
        self.cursor = end;

        Some(parse_token(
            &self.body[inner_start..inner_end],
            inner_start,
            Span::new(open, end),
        ))
    }
}

fn parse_token(inner: &str, base: usize, span: Span) -> Result<PlaceholderToken, ScanError> {
    if inner.is_empty() {
        return Err(ScanError::EmptyToken { offset: base, span });
    }

    let mut segments = Vec::new();
    let mut offset = base;
    for segment in inner.split('.') {
        check_segment(segment).map_err(|fault| match fault {
            SegmentFault::Empty => ScanError::EmptySegment { offset, span },
            SegmentFault::Illegal { index, ch } => ScanError::IllegalCharacter {
                ch,
                offset: offset + index,
                span,
            },
        })?;
        segments.push(segment.to_string());
        offset += segment.len() + 1;
    }

    Ok(PlaceholderToken {
        path: ParamPath::from_checked(segments),
        span,
    })
}

/// A fully collected scan: valid tokens and errors, each in body order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub tokens: Vec<PlaceholderToken>,
    pub errors: Vec<ScanError>,
}

impl ScanReport {
    pub fn collect(body: &str) -> Self {
        let mut report = Self::default();
        for item in scan(body) {
            match item {
                Ok(token) => report.tokens.push(token),
                Err(error) => report.errors.push(error),
            }
        }
        report
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Distinct paths referenced by the body, in order of first use.
    pub fn required_paths(&self) -> Vec<&ParamPath> {
        let mut seen = std::collections::HashSet::new();
        self.tokens
            .iter()
            .map(PlaceholderToken::path)
            .filter(|p| seen.insert(*p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(body: &str) -> Vec<String> {
        ScanReport::collect(body)
            .tokens
            .iter()
            .map(|t| t.path().to_string())
            .collect()
    }

    #[test]
    fn finds_tokens_in_order_with_spans() {
        let body = "minSdk = {{AndroidApiVersion.a}}\ntargetSdk = {{AndroidApiVersion.b}}";
        let report = ScanReport::collect(body);
        assert!(report.is_clean());
        assert_eq!(report.tokens.len(), 2);

        let first = &report.tokens[0];
        assert_eq!(first.path().segments(), ["AndroidApiVersion", "a"]);
        assert_eq!(&body[first.span().range()], "{{AndroidApiVersion.a}}");

        let second = &report.tokens[1];
        assert_eq!(&body[second.span().range()], "{{AndroidApiVersion.b}}");
        assert!(first.span().end <= second.span().start);
    }

    #[test]
    fn body_without_tokens_is_empty() {
        let report = ScanReport::collect("plugins { id(\"x\") }");
        assert!(report.tokens.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn single_braces_are_plain_text() {
        assert!(paths("android { namespace = \"x\" }").is_empty());
    }

    #[test]
    fn empty_token_is_an_error() {
        let report = ScanReport::collect("a {{}} b");
        assert_eq!(
            report.errors,
            [ScanError::EmptyToken {
                offset: 4,
                span: Span::new(2, 6)
            }]
        );
    }

    #[test]
    fn empty_segment_reports_its_offset() {
        let report = ScanReport::collect("{{a..b}}");
        assert_eq!(
            report.errors,
            [ScanError::EmptySegment {
                offset: 4,
                span: Span::new(0, 8)
            }]
        );
    }

    #[test]
    fn whitespace_inside_token_is_illegal() {
        let report = ScanReport::collect("x = {{ ApplicationId }}");
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            report.errors[0],
            ScanError::IllegalCharacter { ch: ' ', offset: 6, .. }
        ));
    }

    #[test]
    fn leading_digit_is_illegal() {
        let report = ScanReport::collect("{{Api.2b}}");
        assert!(matches!(
            report.errors[0],
            ScanError::IllegalCharacter { ch: '2', offset: 6, .. }
        ));
    }

    #[test]
    fn errors_do_not_stop_the_scan() {
        let report = ScanReport::collect("{{ok}} {{bad-name}} {{also.ok}} {{}}");
        assert_eq!(
            report.tokens.iter().map(|t| t.path().to_string()).collect::<Vec<_>>(),
            ["ok", "also.ok"]
        );
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].offset() < report.errors[1].offset());
    }

    #[test]
    fn unterminated_token_ends_scan() {
        let report = ScanReport::collect("{{ok}} then {{broken");
        assert_eq!(report.tokens.len(), 1);
        assert_eq!(
            report.errors,
            [ScanError::Unterminated {
                offset: 12,
                span: Span::new(12, 20)
            }]
        );
    }

    #[test]
    fn first_close_marker_ends_token() {
        // `{{{a}}}` scans `{a` as the inner content.
        let report = ScanReport::collect("{{{a}}}");
        assert!(matches!(
            report.errors[0],
            ScanError::IllegalCharacter { ch: '{', offset: 2, .. }
        ));
    }

    #[test]
    fn adjacent_tokens() {
        assert_eq!(paths("{{a}}{{b}}"), ["a", "b"]);
    }

    #[test]
    fn multibyte_text_keeps_byte_offsets() {
        let body = "é {{name}}";
        let report = ScanReport::collect(body);
        assert_eq!(report.tokens[0].span(), Span::new(3, 11));
    }

    #[test]
    fn scan_is_restartable() {
        let body = "{{a}} {{b.c}} {{}}";
        let first: Vec<_> = scan(body).collect();
        let second: Vec<_> = scan(body).collect();
        assert_eq!(first, second);

        let iter = scan(body);
        let cloned: Vec<_> = iter.clone().collect();
        assert_eq!(cloned, iter.collect::<Vec<_>>());
    }

    #[test]
    fn required_paths_are_deduplicated_in_first_use_order() {
        let report = ScanReport::collect("{{b}} {{a}} {{b}} {{a.x}}");
        let required: Vec<String> = report
            .required_paths()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(required, ["b", "a", "a.x"]);
    }

    #[test]
    fn segment_names_are_case_sensitive() {
        assert_eq!(paths("{{ApplicationId}} {{applicationid}}").len(), 2);
    }
}
