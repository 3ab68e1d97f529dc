//! Fuzz test for the MDL Lexer
//!
//! Feeds arbitrary UTF-8 to the lexer to find panics, infinite loops and
//! inconsistent spans.
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use mdl_dsl::{Lexer, TokenKind};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let tokens = Lexer::new(input).tokenize();

        assert_eq!(
            tokens.last().map(|t| &t.kind),
            Some(&TokenKind::Eof),
            "Last token should always be Eof"
        );

        for token in &tokens {
            assert!(token.span.start <= token.span.end, "Span start should be <= end");
            assert!(token.span.end <= input.len(), "Span should stay inside the input");
            assert!(token.span.line >= 1, "Line numbers should be >= 1");
            assert!(token.span.column >= 1, "Column numbers should be >= 1");
        }
    }
});
