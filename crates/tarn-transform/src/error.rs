//! Errors raised while transforming the AST.
//!
//! None of them is recoverable: the first error aborts the compilation unit.
//! The user-facing ones carry the span of the offending call site or yield;
//! [`InlineError::InternalInvariantViolation`] means an earlier pass handed us
//! a malformed tree.

use std::fmt;

use tarn_common::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineError {
    /// A `foreach` whose source is not a call to an iterator signature.
    NotAnIterator { span: Span },
    /// An instantiated iterator body with more than one reachable yield.
    /// `span` is the second yield found, `first` the one found before it.
    MultipleYields { span: Span, first: Span },
    /// An instantiated iterator body without any reachable yield.
    /// `span` is the call site.
    NoYield { span: Span },
    /// The tree broke an invariant an earlier pass guarantees.
    InternalInvariantViolation { message: String, span: Option<Span> },
}

impl InlineError {
    pub(crate) fn internal(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::InternalInvariantViolation {
            message: message.into(),
            span,
        }
    }

    /// Primary location of the error, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::NotAnIterator { span } | Self::MultipleYields { span, .. } | Self::NoYield { span } => {
                Some(*span)
            }
            Self::InternalInvariantViolation { span, .. } => *span,
        }
    }

    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAnIterator { .. } => "I0001",
            Self::MultipleYields { .. } => "I0002",
            Self::NoYield { .. } => "I0003",
            Self::InternalInvariantViolation { .. } => "ICE",
        }
    }

    /// Whether this is a compiler bug rather than a problem in the program.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InternalInvariantViolation { .. })
    }
}

impl fmt::Display for InlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnIterator { .. } => write!(f, "expecting call to iterator here"),
            Self::MultipleYields { .. } => {
                write!(f, "only one yield statement per iterator is currently supported")
            }
            Self::NoYield { .. } => write!(f, "no yield statement found in iterator"),
            Self::InternalInvariantViolation { message, .. } => {
                write!(f, "internal compiler error: {message}")
            }
        }
    }
}

impl std::error::Error for InlineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let span = Span::new(4, 9);
        assert_eq!(
            InlineError::NotAnIterator { span }.to_string(),
            "expecting call to iterator here"
        );
        assert_eq!(
            InlineError::MultipleYields { span, first: Span::new(0, 1) }.to_string(),
            "only one yield statement per iterator is currently supported"
        );
        assert_eq!(
            InlineError::NoYield { span }.to_string(),
            "no yield statement found in iterator"
        );
        assert_eq!(
            InlineError::internal("could not find instantiated case statement", None).to_string(),
            "internal compiler error: could not find instantiated case statement"
        );
    }

    #[test]
    fn only_invariant_violations_are_internal() {
        let span = Span::new(0, 3);
        assert!(!InlineError::NoYield { span }.is_internal());
        assert!(InlineError::internal("bad tree", Some(span)).is_internal());
        assert_eq!(InlineError::internal("bad tree", Some(span)).span(), Some(span));
        assert_eq!(InlineError::NotAnIterator { span }.code(), "I0001");
    }
}
