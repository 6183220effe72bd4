//! Conditional Expression Parser
//!
//! Parses the condition of an IF statement:
//! - `EXIST path`
//! - `left OP right` with OP one of EQU, NEQ, GTR, LSS, LEQ, GEQ
//! - `left==right`
//! - `NOT` before any of the above (one level)

use crate::ast::types::{Condition, AST};
use crate::parser::lexer::is_line_terminator;
use crate::parser::parser::Parser;

/// Relational operator keywords, matched in any case
const RELATIONAL_OPERATORS: &[&str] = &["EQU", "NEQ", "GTR", "LSS", "LEQ", "GEQ"];

impl Parser {
    pub(super) fn parse_condition(&mut self) -> Option<Condition> {
        self.parse_negated_condition()
            .or_else(|| self.parse_simple_condition())
    }

    fn parse_negated_condition(&mut self) -> Option<Condition> {
        self.attempt(|p| {
            p.keyword("NOT")?;
            p.spaces()?;
            p.parse_simple_condition().map(AST::negated)
        })
    }

    fn parse_simple_condition(&mut self) -> Option<Condition> {
        self.parse_exists()
            .or_else(|| self.parse_relational())
            .or_else(|| self.parse_string_comparison())
    }

    fn parse_exists(&mut self) -> Option<Condition> {
        self.attempt(|p| {
            p.keyword("EXIST")?;
            p.spaces()?;
            let Some(path) = p.lexer.quoted_value().or_else(|| p.lexer.literal_value()) else {
                p.expected("path");
                return None;
            };
            Some(AST::exists(path))
        })
    }

    fn parse_relational(&mut self) -> Option<Condition> {
        self.attempt(|p| {
            let left = p.operand()?;
            p.spaces()?;
            let operator = p.relational_operator()?;
            p.spaces()?;
            let right = p.operand()?;
            Some(AST::comparison(left, operator, right))
        })
    }

    /// Keyword operator followed by whitespace, kept in source spelling.
    fn relational_operator(&mut self) -> Option<String> {
        for op in RELATIONAL_OPERATORS {
            let followed_by_space = self.lexer.peek(op.len()).is_some_and(char::is_whitespace);
            if self.lexer.at_keyword(op) && followed_by_space {
                return Some((0..op.len()).filter_map(|_| self.lexer.advance()).collect());
            }
        }
        for op in RELATIONAL_OPERATORS {
            self.expected(op);
        }
        None
    }

    /// `left==right`. The left side is everything before the first `==` on
    /// the line, trimmed.
    fn parse_string_comparison(&mut self) -> Option<Condition> {
        self.attempt(|p| {
            let mut left = String::new();
            while !p.lexer.starts_with("==") {
                match p.lexer.current() {
                    Some(c) if !is_line_terminator(c) => {
                        left.push(c);
                        p.lexer.advance();
                    }
                    _ => {
                        p.expected("'=='");
                        return None;
                    }
                }
            }

            let left = left.trim();
            if left.is_empty() {
                p.expected("operand");
                return None;
            }

            p.lexer.eat_str("==");
            p.lexer.skip_spaces();
            let right = p.operand()?;
            Some(AST::comparison(left, "==", right))
        })
    }

    /// A run of non-whitespace. Quotes are part of the operand.
    fn operand(&mut self) -> Option<String> {
        let value = self.lexer.literal_value();
        if value.is_none() {
            self.expected("operand");
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::types::{Condition, Statement, AST};
    use crate::parser::parser::parse;

    fn condition_of(input: &str) -> Condition {
        let document = parse(input).unwrap();
        match document.statements.into_iter().next() {
            Some(Statement::Branch(branch)) => branch.condition,
            other => panic!("expected a branch, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_exists() {
        assert_eq!(
            condition_of("IF EXIST \"C:\\my file.txt\" goto FOUND"),
            AST::exists("C:\\my file.txt")
        );
        assert_eq!(
            condition_of("if exist %TEMP%\\lock goto WAIT"),
            AST::exists("%TEMP%\\lock")
        );
    }

    #[test]
    fn test_parse_relational_keeps_operator_spelling() {
        assert_eq!(
            condition_of("if %TEST% equ 123 set flag=true"),
            AST::comparison("%TEST%", "equ", "123")
        );
        assert_eq!(
            condition_of("if %N% GEQ 10 goto BIG"),
            AST::comparison("%N%", "GEQ", "10")
        );
    }

    #[test]
    fn test_parse_every_relational_operator() {
        for op in ["EQU", "NEQ", "GTR", "LSS", "LEQ", "GEQ"] {
            let input = format!("if a {op} b goto X");
            assert_eq!(condition_of(&input), AST::comparison("a", op, "b"));
        }
    }

    #[test]
    fn test_parse_string_comparison() {
        assert_eq!(
            condition_of("if \"%TEST%\"==\"1\" set flag=true"),
            AST::comparison("\"%TEST%\"", "==", "\"1\"")
        );
        assert_eq!(
            condition_of("if {=%TEST%=}=={=1=} goto X"),
            AST::comparison("{=%TEST%=}", "==", "{=1=}")
        );
        assert_eq!(
            condition_of("if %a% == b goto X"),
            AST::comparison("%a%", "==", "b")
        );
    }

    #[test]
    fn test_parse_string_comparison_needs_left_operand() {
        assert!(parse("if ==b goto X").is_err());
    }

    #[test]
    fn test_parse_string_comparison_stays_on_line() {
        assert!(parse("if a\n==b goto X").is_err());
    }

    #[test]
    fn test_parse_negated() {
        assert_eq!(
            condition_of("if not exist out.log goto END"),
            AST::negated(AST::exists("out.log"))
        );
        assert_eq!(
            condition_of("IF NOT %x% LSS 3 goto END"),
            AST::negated(AST::comparison("%x%", "LSS", "3"))
        );
    }

    #[test]
    fn test_keyword_prefix_is_an_operand() {
        assert_eq!(
            condition_of("if NOTHING==x goto END"),
            AST::comparison("NOTHING", "==", "x")
        );
        assert_eq!(
            condition_of("if EXISTING==x goto END"),
            AST::comparison("EXISTING", "==", "x")
        );
    }

    #[test]
    fn test_double_negation_is_rejected() {
        assert!(parse("if not not exist a goto X").is_err());
    }
}
