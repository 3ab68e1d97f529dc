//! Lexer implementation

use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;

// ============================================================================
// LEXER IMPLEMENTATION
// ============================================================================

/// Lexer for MDL source text.
///
/// Whitespace, newlines included, only matters inside quoted strings. The
/// lexer never fails: malformed input yields [`TokenKind::Error`] tokens and
/// the stream always ends with [`TokenKind::Eof`].
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Get the next token from the source.
    fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => match c {
                '(' => {
                    self.advance();
                    TokenKind::LParen
                }
                ')' => {
                    self.advance();
                    TokenKind::RParen
                }
                ',' => {
                    self.advance();
                    TokenKind::Comma
                }
                ';' => {
                    self.advance();
                    TokenKind::Semicolon
                }

                '-' => {
                    self.advance();
                    if self.peek_char().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                        self.scan_number_from_pos(start_pos)
                    } else {
                        TokenKind::Error("Unexpected character: -".to_string())
                    }
                }

                '\'' => self.scan_string(),

                c if c.is_ascii_digit() => self.scan_number_from_pos(start_pos),

                c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),

                c => {
                    self.advance();
                    TokenKind::Error(format!("Unexpected character: {}", c))
                }
            },
        };

        Token {
            kind,
            span: Span {
                start: start_pos,
                end: self.pos,
                line: start_line,
                column: start_col,
            },
        }
    }

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let ident = &self.source[start..self.pos];
        TokenKind::keyword(ident).unwrap_or_else(|| TokenKind::Identifier(ident.to_string()))
    }

    /// Scan a single-quoted string literal.
    ///
    /// A raw line break inside the quotes closes the current fragment and
    /// opens the next one; the tree builder joins them back together.
    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // consume opening quote
        let mut fragments = Vec::new();
        let mut current = String::new();

        loop {
            match self.peek_char() {
                None => return TokenKind::Error("Unterminated string".to_string()),
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\n') => {
                    self.advance();
                    fragments.push(std::mem::take(&mut current));
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('\'') => {
                            self.advance();
                            current.push('\'');
                        }
                        Some('\\') => {
                            self.advance();
                            current.push('\\');
                        }
                        _ => current.push('\\'),
                    }
                }
                Some(c) => {
                    self.advance();
                    current.push(c);
                }
            }
        }

        fragments.push(current);
        TokenKind::Str(fragments)
    }

    /// Scan an integer or decimal literal starting at `start` (which may
    /// point at an already consumed `-`).
    fn scan_number_from_pos(&mut self, start: usize) -> TokenKind {
        self.consume_digits();

        if self.peek_char() == Some('.')
            && self.peek_next_char().map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            self.advance(); // .
            self.consume_digits();
            return TokenKind::Decimal(self.source[start..self.pos].to_string());
        }

        TokenKind::Int(self.source[start..self.pos].to_string())
    }

    fn consume_digits(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip whitespace.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].char_indices();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((i, c)) = self.chars.next() {
            self.pos = i + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }
}
