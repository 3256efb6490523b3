//! Error types for document and shorthand parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::constraint::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A layout document that cannot be read at all
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Malformed JSON at {span:?}: {message}")]
    Json { span: Span, message: String },

    #[error("Malformed XML at {span:?}: {message}")]
    Xml { span: Span, message: String },

    /// Readable text with the wrong overall structure
    #[error("Unexpected document shape: {message}")]
    Shape { message: String },
}

impl DocumentError {
    pub fn shape(message: impl Into<String>) -> Self {
        DocumentError::Shape {
            message: message.into(),
        }
    }

    /// Build a JSON error, turning serde's line/column into a byte span
    pub fn from_json(err: &serde_json::Error, source: &str) -> Self {
        let offset = line_column_offset(source, err.line(), err.column());
        DocumentError::Json {
            span: offset..(offset + 1).min(source.len()),
            message: err.to_string(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            DocumentError::Json { span, .. } | DocumentError::Xml { span, .. } => {
                Some(span.clone())
            }
            DocumentError::Shape { .. } => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span().unwrap_or(0..0);
        let message = match self {
            DocumentError::Json { message, .. }
            | DocumentError::Xml { message, .. }
            | DocumentError::Shape { message } => message.clone(),
        };
        render(filename, source, span, &message, &[])
    }
}

/// One shorthand argument that does not match the grammar
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShorthandError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ShorthandError {
    pub fn invalid_character(source: &str, span: Span) -> Self {
        let found = source.get(span.clone()).unwrap_or_default();
        ShorthandError::Syntax {
            span,
            message: format!("Unexpected character '{}'", found),
            expected: Vec::new(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ShorthandError::Syntax {
                span,
                message,
                expected,
            } => render(filename, source, span.clone(), message, expected),
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ShorthandError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => format!("Unexpected {}", &**tok),
                None => "Unexpected end of argument".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some((**tok).to_string()),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of argument".to_string()),
                RichPattern::Identifier(s) => Some(format!("'{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        ShorthandError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

fn render(filename: &str, source: &str, span: Span, message: &str, expected: &[String]) -> String {
    let expected_str = if expected.is_empty() {
        String::new()
    } else {
        format!("\nExpected: {}", expected.join(", "))
    };

    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span))
                .with_message(format!("{}{}", message, expected_str))
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);

    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{}{}", message, expected_str),
    }
}

/// Byte offset of a 1-based line and column
fn line_column_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column_offset() {
        let source = "{\n  \"a\": 1,\n  oops\n}";
        assert_eq!(line_column_offset(source, 1, 1), 0);
        assert_eq!(line_column_offset(source, 3, 3), 14);
    }

    #[test]
    fn test_json_error_span_points_into_source() {
        let source = "{\"root\": }";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let doc_err = DocumentError::from_json(&err, source);
        let span = doc_err.span().unwrap();
        assert!(span.start < source.len());
    }

    #[test]
    fn test_format_includes_message() {
        let err = ShorthandError::invalid_character("+1#0", 2..3);
        let rendered = err.format("+1#0", "constraint");
        assert!(rendered.contains("Unexpected character '#'"));
    }

    #[test]
    fn test_shape_error_formats_without_span() {
        let err = DocumentError::shape("root must be an object");
        assert!(err.format("[]", "layout.json").contains("root must be an object"));
    }
}
