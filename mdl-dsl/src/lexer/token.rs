//! Lexer token types

use std::fmt;

// ============================================================================
// LEXER TYPES
// ============================================================================

/// Token kinds for MDL.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Command verbs
    Create,
    Recreate,
    Drop,
    Rename,
    Alter,
    Add,
    Modify,

    // Other keywords
    To,
    If,
    Exists,
    Not,

    // Boolean literals
    True,
    False,

    // Delimiters
    LParen,
    RParen,
    Comma,
    Semicolon,

    // Literals
    /// Digits with an optional leading `-`, kept as source text.
    Int(String),
    /// Digits, a dot, digits; kept as source text.
    Decimal(String),
    /// A single-quoted literal split at raw line breaks.
    Str(Vec<String>),
    Identifier(String),

    // Special
    Eof,
    Error(String),
}

impl TokenKind {
    /// Look up the keyword spelled exactly as `ident`.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "CREATE" => TokenKind::Create,
            "RECREATE" => TokenKind::Recreate,
            "DROP" => TokenKind::Drop,
            "RENAME" => TokenKind::Rename,
            "ALTER" => TokenKind::Alter,
            "ADD" => TokenKind::Add,
            "MODIFY" => TokenKind::Modify,
            "TO" => TokenKind::To,
            "IF" => TokenKind::If,
            "EXISTS" => TokenKind::Exists,
            "NOT" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this token starts a command.
    pub fn is_verb(&self) -> bool {
        matches!(
            self,
            TokenKind::Create
                | TokenKind::Recreate
                | TokenKind::Drop
                | TokenKind::Rename
                | TokenKind::Alter
                | TokenKind::Add
                | TokenKind::Modify
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Create => write!(f, "CREATE"),
            TokenKind::Recreate => write!(f, "RECREATE"),
            TokenKind::Drop => write!(f, "DROP"),
            TokenKind::Rename => write!(f, "RENAME"),
            TokenKind::Alter => write!(f, "ALTER"),
            TokenKind::Add => write!(f, "ADD"),
            TokenKind::Modify => write!(f, "MODIFY"),
            TokenKind::To => write!(f, "TO"),
            TokenKind::If => write!(f, "IF"),
            TokenKind::Exists => write!(f, "EXISTS"),
            TokenKind::Not => write!(f, "NOT"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Int(text) | TokenKind::Decimal(text) => write!(f, "{}", text),
            TokenKind::Str(fragments) => write!(f, "'{}'", fragments.join("\n")),
            TokenKind::Identifier(name) => write!(f, "{}", name),
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Error(msg) => write!(f, "{}", msg),
        }
    }
}

/// Source location span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
