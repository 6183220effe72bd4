//! Abstract Syntax Tree (AST) Types for Batch Scripts
//!
//! This module defines the tree produced by the parser and its debug
//! projection.
//!
//! Architecture:
//!   Input → Lexer primitives → Parser → AST → render

pub mod render;
pub mod types;
