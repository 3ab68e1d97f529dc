//! Lexer module for MDL

pub mod token;
pub mod scanner;

pub use token::*;
pub use scanner::*;
