//! MDL DSL - Metadata Definition Language Parser, Serializer & Validator
//!
//! This crate parses MDL command text into a typed tree, renders trees back
//! to canonical MDL text, and validates trees against a JSON component schema
//! whose attribute types are free-text descriptors.
//!
//! Architecture:
//! ```text
//! MDL Source
//!     ↓
//! Lexer (tokens + spans)
//!     ↓
//! Parser (grammar entry points)
//!     ↓
//! Builder (Attribute / Component / Command tree)
//!     ↓                        ↓
//! Serializer (canonical)    Validator ← SchemaModel (JSON)
//!                               ↑
//!                          TypeDescriptor (descriptor text)
//! ```

pub mod config;
pub mod descriptor;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod serializer;
pub mod validator;

// Re-export key types for convenience
pub use config::{ConfigError, MdlConfig, ValidationMode};
pub use descriptor::{DescriptorCache, DescriptorError, Multiplicity, Primitive, TypeDescriptor, Violation};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::*;
pub use schema::{AttributeSchema, SchemaError, SchemaModel, SchemaNode, SchemaResult};
pub use serializer::*;
pub use validator::*;

/// Parse `source` at `entry` and render it canonically.
///
/// The output of a successful call parses again at the same entry point into
/// an equal tree.
pub fn round_trip(entry: EntryPoint, source: &str) -> ParseResult<String> {
    let parsed = parse_entry(entry, source)?;
    Ok(serialize_parsed(&parsed))
}
