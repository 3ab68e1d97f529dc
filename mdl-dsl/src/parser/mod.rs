//! Parser module for MDL

pub mod ast;
pub mod builder;
pub mod error;
pub mod parser;

pub use ast::*;
pub use error::*;
pub use parser::*;
