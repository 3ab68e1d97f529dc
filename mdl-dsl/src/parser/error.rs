//! Syntax and tree-builder faults

use crate::lexer::Token;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed MDL source, located at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Syntax error at line {line}, column {column}: {message} (found {found})")]
pub struct SyntaxError {
    pub message: String,
    pub found: String,
    pub line: usize,
    pub column: usize,
}

impl SyntaxError {
    /// Build an error pointing at `token`.
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            found: token.kind.to_string(),
            line: token.span.line,
            column: token.span.column,
        }
    }
}

/// Everything that can stop a document from turning into a tree.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The grammar handed the builder a shape it has no rule for.
    #[error("unreachable builder state in {rule}: {detail}")]
    Unreachable { rule: String, detail: String },
}

impl ParseError {
    /// The syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            ParseError::Syntax(err) => Some(err),
            ParseError::Unreachable { .. } => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, ParseError::Unreachable { .. })
    }
}

/// Result type for parsing.
pub type ParseResult<T> = Result<T, ParseError>;
