//! Parser Types and Constants
//!
//! Shared types, limits, and options used across parser modules.

use serde::Serialize;
use thiserror::Error;

use crate::ast::types::Position;

// Parser limits to prevent resource exhaustion
pub const MAX_INPUT_SIZE: usize = 1_000_000; // 1MB max input
pub const MAX_PARSER_DEPTH: usize = 200; // Max nesting of IF / FOR bodies

/// Single failure kind: where the parse stopped and what was tried there.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Parse error at {position}: expected {}", describe_expected(.expected))]
pub struct ParseError {
    pub position: Position,
    /// Rule names attempted at `position`, in attempt order
    pub expected: Vec<String>,
}

impl ParseError {
    pub fn new(position: Position, expected: Vec<String>) -> Self {
        Self { position, expected }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }
}

fn describe_expected(expected: &[String]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// Limits applied to a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum source length in bytes
    pub max_input_size: usize,
    /// Maximum nesting of IF / FOR bodies
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_input_size: MAX_INPUT_SIZE,
            max_depth: MAX_PARSER_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_alternatives() {
        let err = ParseError::new(
            Position::new(3, 7, 20),
            vec!["IF".into(), "FOR".into(), "ECHO".into()],
        );
        assert_eq!(err.to_string(), "Parse error at 3:7: expected IF, FOR or ECHO");
        assert_eq!(err.line(), 3);
        assert_eq!(err.column(), 7);
    }

    #[test]
    fn test_display_single_alternative() {
        let err = ParseError::new(Position::start(), vec!["')'".into()]);
        assert_eq!(err.to_string(), "Parse error at 1:1: expected ')'");
    }

    #[test]
    fn test_default_options() {
        let options = ParserOptions::default();
        assert_eq!(options.max_input_size, MAX_INPUT_SIZE);
        assert_eq!(options.max_depth, MAX_PARSER_DEPTH);
    }
}
