//! Fuzz test for the MDL Parser
//!
//! Parses arbitrary UTF-8 from every entry point. Parsing must never panic,
//! failures must carry a position, and anything that parses must survive a
//! serialize → parse round trip unchanged.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use mdl_dsl::{parse_entry, serialize_parsed, EntryPoint, ParseError};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        for entry in EntryPoint::ALL {
            match parse_entry(entry, input) {
                Ok(parsed) => {
                    let printed = serialize_parsed(&parsed);
                    assert_eq!(
                        parse_entry(entry, &printed).as_ref(),
                        Ok(&parsed),
                        "Canonical output should parse to the same tree"
                    );
                }
                Err(ParseError::Syntax(err)) => {
                    assert!(err.line >= 1, "Error line should be >= 1");
                    assert!(err.column >= 1, "Error column should be >= 1");
                    assert!(!err.message.is_empty(), "Error message should not be empty");
                }
                Err(err @ ParseError::Unreachable { .. }) => {
                    panic!("Grammar accepted a shape the builder rejects: {}", err);
                }
            }
        }
    }
});
