//! batch-parser - A parser for Windows batch scripts
//!
//! This library parses batch scripts into an AST that can be inspected,
//! rendered as a debug tree, or serialized as JSON.
//!
//! ```
//! use batch_parser::{parse, render_document};
//!
//! let document = parse("set i=1").unwrap();
//! assert_eq!(render_document(&document, 0), "<setvariable name={i} value={1}>\n");
//! ```

pub mod ast;
pub mod parser;

pub use ast::render::{render, render_document};
pub use ast::types::*;
pub use parser::{parse, parse_with_options, ParseError, Parser, ParserOptions};
