//! Error types for the filter parser.

use thiserror::Error;

/// A specialized Result type for filter parsing operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur during filter parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The filter expression is empty.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// An unexpected token was encountered during parsing.
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The unexpected token as written.
        token: String,
        /// Byte offset of the token in the query.
        position: usize,
    },

    /// An unexpected end of input was encountered.
    #[error("unexpected end of expression")]
    UnexpectedEndOfInput,

    /// A field name was not followed by `:` or a comparison operator.
    #[error("expected ':' or a comparison operator after '{field}'")]
    MissingComparator {
        /// The field name that was read.
        field: String,
    },

    /// An unclosed parenthesis was found.
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,

    /// The field name is not known to the evaluator.
    #[error("{}", unknown_field_message(.field, .suggestion))]
    UnknownField {
        /// The unrecognized field.
        field: String,
        /// The closest known field, if any is close enough.
        suggestion: Option<String>,
    },
}

fn unknown_field_message(field: &str, suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!("unknown filter field '{field}'. Did you mean '{s}'?"),
        None => format!("unknown filter field '{field}'"),
    }
}

impl FilterError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>, position: usize) -> Self {
        FilterError::UnexpectedToken {
            token: token.into(),
            position,
        }
    }

    /// Creates a missing comparator error.
    pub fn missing_comparator(field: impl Into<String>) -> Self {
        FilterError::MissingComparator {
            field: field.into(),
        }
    }

    /// Creates an unknown field error.
    pub fn unknown_field(field: impl Into<String>, suggestion: Option<String>) -> Self {
        FilterError::UnknownField {
            field: field.into(),
            suggestion,
        }
    }
}
