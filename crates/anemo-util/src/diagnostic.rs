//! Compiler diagnostics.
//!
//! The Anemo pipeline is fail-fast: the first violation anywhere aborts
//! the compilation. Every stage therefore returns `Result<_, Diagnostic>`
//! and the driver prints the diagnostic to stderr and exits with code 1.
//!
//! The rendered format is a stable contract:
//!
//! ```text
//! <file>:<line>:<col>: error: <message>       user-source errors
//! <internal>:<line>:<col>: error: <message>   compiler bugs with a position
//! error: <message>                            position-free fatals
//! ```

use std::error::Error;
use std::fmt;

use crate::span::Span;

/// Where a diagnostic points to.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Origin {
    /// An error in the user's source file.
    Source(String),
    /// An inconsistency inside the compiler itself.
    Internal,
}

/// A single fatal compiler diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    origin: Origin,
    span: Option<Span>,
    message: String,
}

impl Diagnostic {
    /// An error at a position in the user's source.
    pub fn at(file: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self {
            origin: Origin::Source(file.into()),
            span: Some(span),
            message: message.into(),
        }
    }

    /// An internal inconsistency with a source position. These indicate
    /// a compiler bug: the offending construct already passed the stage
    /// that should have rejected it.
    pub fn internal(span: Span, message: impl Into<String>) -> Self {
        Self {
            origin: Origin::Internal,
            span: Some(span),
            message: message.into(),
        }
    }

    /// A fatal error with no useful source position.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            origin: Origin::Internal,
            span: None,
            message: message.into(),
        }
    }

    /// The human-readable message, without the location prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The source position, if the diagnostic has one.
    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.origin, self.span) {
            (Origin::Source(file), Some(span)) => write!(
                f,
                "{}:{}:{}: error: {}",
                file, span.line, span.column, self.message
            ),
            (Origin::Internal, Some(span)) => write!(
                f,
                "<internal>:{}:{}: error: {}",
                span.line, span.column, self.message
            ),
            (_, None) => write!(f, "error: {}", self.message),
        }
    }
}

impl Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_diagnostic_format() {
        let d = Diagnostic::at("demo.anm", Span::new(4, 7), "unknown symbol 'x'");
        assert_eq!(d.to_string(), "demo.anm:4:7: error: unknown symbol 'x'");
    }

    #[test]
    fn test_internal_diagnostic_format() {
        let d = Diagnostic::internal(Span::new(2, 1), "unknown var in IR gen: y");
        assert_eq!(d.to_string(), "<internal>:2:1: error: unknown var in IR gen: y");
    }

    #[test]
    fn test_fatal_format() {
        let d = Diagnostic::fatal("program must define glyph main");
        assert_eq!(d.to_string(), "error: program must define glyph main");
    }

    #[test]
    fn test_accessors() {
        let d = Diagnostic::at("a.anm", Span::new(1, 2), "boom");
        assert_eq!(d.message(), "boom");
        assert_eq!(d.span(), Some(Span::new(1, 2)));
        assert_eq!(Diagnostic::fatal("x").span(), None);
    }
}
