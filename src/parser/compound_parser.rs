//! Compound Statement Parser
//!
//! Handles IF/ELSE and FOR /F, and the bodies they share: a single
//! statement or a parenthesized block of statements.

use crate::ast::types::{Statement, AST};
use crate::parser::lexer::is_line_terminator;
use crate::parser::parser::Parser;
use crate::parser::types::ParseError;

/// Loop header: option string, loop variable and raw source expression
type LoopHeader = (Option<String>, char, String);

impl Parser {
    // ===========================================================================
    // IF STATEMENT
    // ===========================================================================

    pub(super) fn parse_branch(&mut self) -> Result<Option<Statement>, ParseError> {
        self.try_rule(|p| {
            if p.keyword("IF").is_none() || p.spaces().is_none() {
                return Ok(None);
            }
            let Some(condition) = p.parse_condition() else {
                return Ok(None);
            };
            p.lexer.skip_whitespace();

            let Some(then_body) = p.parse_body()? else {
                return Ok(None);
            };
            let else_body = p.parse_else()?;

            Ok(Some(AST::branch(condition, then_body, else_body)))
        })
    }

    fn parse_else(&mut self) -> Result<Option<Vec<Statement>>, ParseError> {
        self.try_rule(|p| {
            p.lexer.skip_whitespace();
            if p.keyword("ELSE").is_none() {
                return Ok(None);
            }
            if !p.lexer.current().is_some_and(|c| c.is_whitespace() || c == '(') {
                p.expected("whitespace");
                return Ok(None);
            }
            p.lexer.skip_whitespace();
            p.parse_body()
        })
    }

    // ===========================================================================
    // FOR /F STATEMENT
    // ===========================================================================

    pub(super) fn parse_loop(&mut self) -> Result<Option<Statement>, ParseError> {
        self.try_rule(|p| {
            let Some((option, loop_var, source_expr)) = p.parse_loop_header() else {
                return Ok(None);
            };
            let Some(body) = p.parse_body()? else {
                return Ok(None);
            };
            Ok(Some(AST::for_loop(option, loop_var, source_expr, body)))
        })
    }

    /// `FOR /F ["opts"] %%v IN (source) DO`, leaving the cursor on the body.
    fn parse_loop_header(&mut self) -> Option<LoopHeader> {
        self.keyword("FOR")?;
        self.spaces()?;
        self.keyword("/F")?;
        self.spaces()?;

        let option = self.attempt(|p| {
            let option = p.lexer.quoted_value()?;
            p.spaces()?;
            Some(option)
        });

        if !self.lexer.eat_str("%%") {
            self.expected("'%%'");
            return None;
        }
        let Some(loop_var) = self.lexer.current().filter(|c| c.is_alphabetic()) else {
            self.expected("loop variable");
            return None;
        };
        self.lexer.advance();

        self.spaces()?;
        self.keyword("IN")?;
        self.lexer.skip_spaces();
        self.symbol('(')?;
        let source_expr = self.loop_source()?;

        self.lexer.skip_spaces();
        self.keyword("DO")?;
        if !self.lexer.current().is_some_and(|c| c.is_whitespace() || c == '(') {
            self.expected("whitespace");
            return None;
        }
        self.lexer.skip_whitespace();

        Some((option, loop_var, source_expr))
    }

    /// Raw text up to the `)` matching the already consumed `(`.
    ///
    /// Nested parentheses must balance. Text inside `'`, `"` or `` ` `` is
    /// skipped over; a quote left open closes at the end of its line.
    fn loop_source(&mut self) -> Option<String> {
        let mut source = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        loop {
            let Some(c) = self.lexer.current() else {
                self.expected("')'");
                return None;
            };

            match quote {
                Some(q) if c == q || is_line_terminator(c) => quote = None,
                Some(_) => {}
                None => match c {
                    '\'' | '"' | '`' => quote = Some(c),
                    '(' => depth += 1,
                    ')' if depth == 0 => {
                        self.lexer.advance();
                        return Some(source);
                    }
                    ')' => depth -= 1,
                    _ => {}
                },
            }

            source.push(c);
            self.lexer.advance();
        }
    }

    // ===========================================================================
    // BODIES
    // ===========================================================================

    /// A single statement or a parenthesized block.
    pub(super) fn parse_body(&mut self) -> Result<Option<Vec<Statement>>, ParseError> {
        self.enter_body()?;
        let body = match self.parse_statement()? {
            Some(stmt) => Some(vec![stmt]),
            None => self.parse_block()?,
        };
        self.leave_body();
        Ok(body)
    }

    fn parse_block(&mut self) -> Result<Option<Vec<Statement>>, ParseError> {
        self.try_rule(|p| {
            if p.symbol('(').is_none() {
                return Ok(None);
            }
            p.block_depth += 1;
            let statements = p.parse_block_statements();
            p.block_depth -= 1;
            statements
        })
    }

    fn parse_block_statements(&mut self) -> Result<Option<Vec<Statement>>, ParseError> {
        let mut statements = Vec::new();

        loop {
            self.lexer.skip_whitespace();
            if self.lexer.eat(')') {
                return Ok(Some(statements));
            }
            match self.parse_statement()? {
                Some(stmt) => statements.push(stmt),
                None => {
                    self.expected("')'");
                    return Ok(None);
                }
            }
        }
    }
}
