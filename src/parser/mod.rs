//! Parser module for batch scripts
//!
//! This module contains the lexer primitives and the recursive descent
//! parser for batch scripts.

pub mod types;
pub mod lexer;
pub mod conditional_parser;
pub mod compound_parser;
pub mod command_parser;
pub mod parser;

// Re-exports
pub use types::{ParseError, ParserOptions, MAX_INPUT_SIZE, MAX_PARSER_DEPTH};
pub use lexer::Lexer;
pub use parser::{parse, parse_with_options, Parser};
