//! Leaf Statement Parser
//!
//! Handles the statements that can appear as chain operands:
//! - Comments (REM, consecutive lines folded into one node)
//! - Variable assignment (SET)
//! - Output (ECHO) with redirections
//! - Jumps (GOTO) and script invocation (CALL)
//!
//! Labels are parsed here too but are only reachable as control statements.

use crate::ast::types::{RedirectionNode, Statement, AST};
use crate::parser::lexer::{
    is_chain_char, is_handle_digit, is_line_terminator, is_redirect_char, is_space,
};
use crate::parser::parser::Parser;

/// Redirection modes, longest match first
const REDIRECT_MODES: &[&str] = &[">>", ">&", ">", "<&", "<"];

impl Parser {
    /// Try each leaf statement in order: comments, SET, ECHO, GOTO, CALL.
    pub(super) fn parse_leaf_statement(&mut self) -> Option<Statement> {
        self.parse_comments()
            .or_else(|| self.parse_assignment())
            .or_else(|| self.parse_emit())
            .or_else(|| self.parse_goto())
            .or_else(|| self.parse_invoke())
    }

    // ===========================================================================
    // COMMENTS AND LABELS
    // ===========================================================================

    /// One or more REM lines; their texts are joined with `\n`.
    fn parse_comments(&mut self) -> Option<Statement> {
        let mut lines = vec![self.parse_comment_line()?];

        loop {
            let before = self.lexer.mark();
            if !self.lexer.eat_line_terminator() {
                break;
            }
            self.lexer.skip_spaces();
            self.lexer.eat('@');
            match self.parse_comment_line() {
                Some(text) => lines.push(text),
                None => {
                    self.lexer.reset(before);
                    break;
                }
            }
        }

        Some(AST::comment(lines.join("\n")))
    }

    fn parse_comment_line(&mut self) -> Option<String> {
        self.attempt(|p| {
            p.keyword("REM")?;
            if p.lexer.at_line_end() {
                return Some(String::new());
            }
            if !p.lexer.current().is_some_and(is_space) {
                p.expected("whitespace");
                return None;
            }
            p.lexer.advance();
            Some(p.lexer.rest_of_line())
        })
    }

    pub(super) fn parse_label(&mut self) -> Option<Statement> {
        self.attempt(|p| {
            p.symbol(':')?;
            let name = p.identifier()?;
            Some(AST::label(name))
        })
    }

    // ===========================================================================
    // SET / GOTO / CALL
    // ===========================================================================

    fn parse_assignment(&mut self) -> Option<Statement> {
        self.attempt(|p| {
            p.keyword("SET")?;
            p.spaces()?;
            let name = p.identifier()?;
            p.symbol('=')?;
            let value = p.free_text();
            Some(AST::assignment(name, value))
        })
    }

    fn parse_goto(&mut self) -> Option<Statement> {
        self.attempt(|p| {
            p.keyword("GOTO")?;
            p.spaces()?;
            // `GOTO :EOF` style targets
            p.lexer.eat(':');
            let target = p.identifier()?;
            Some(AST::goto(target))
        })
    }

    fn parse_invoke(&mut self) -> Option<Statement> {
        self.attempt(|p| {
            p.keyword("CALL")?;
            p.spaces()?;
            let Some(target) = p.invoke_token() else {
                p.expected("call target");
                return None;
            };

            let mut arguments = Vec::new();
            loop {
                let before = p.lexer.mark();
                p.lexer.skip_spaces();
                match p.invoke_token() {
                    Some(argument) => arguments.push(argument),
                    None => {
                        p.lexer.reset(before);
                        break;
                    }
                }
            }

            Some(AST::invoke(target, arguments))
        })
    }

    /// A quoted value, or a run of chars up to whitespace or a chain operator.
    fn invoke_token(&mut self) -> Option<String> {
        if let Some(value) = self.lexer.quoted_value() {
            return Some(value);
        }
        let in_block = self.block_depth > 0;
        self.lexer
            .word(|c| !c.is_whitespace() && !is_chain_char(c) && !(in_block && c == ')'))
    }

    /// Rest of the line, cut short by a `)` closing the enclosing block.
    fn free_text(&mut self) -> String {
        let in_block = self.block_depth > 0;
        self.lexer
            .take_while(|c| !is_line_terminator(c) && !(in_block && c == ')'))
    }

    // ===========================================================================
    // ECHO AND REDIRECTIONS
    // ===========================================================================

    fn parse_emit(&mut self) -> Option<Statement> {
        self.attempt(|p| {
            p.keyword("ECHO")?;
            let escape_mode = if p.lexer.eat(':') {
                true
            } else if p.lexer.eat('.') {
                false
            } else {
                p.spaces()?;
                false
            };

            let message = p.emit_message();
            let redirections = p.parse_redirections();
            Some(AST::emit(message, escape_mode, redirections))
        })
    }

    /// Message text up to a redirection, chain operator or line end.
    fn emit_message(&mut self) -> String {
        let mut message = String::new();

        while let Some(c) = self.lexer.current() {
            if is_line_terminator(c) || is_redirect_char(c) || is_chain_char(c) || self.closes_block(c)
            {
                break;
            }
            // `1>` starts a redirection, a lone `1` is text
            if is_handle_digit(c) && self.lexer.peek(1).is_some_and(is_redirect_char) {
                break;
            }
            message.push(c);
            self.lexer.advance();
        }

        message
    }

    fn parse_redirections(&mut self) -> Vec<RedirectionNode> {
        let mut redirections = Vec::new();

        loop {
            let before = self.lexer.mark();
            self.lexer.skip_spaces();
            match self.parse_redirection() {
                Some(redirection) => redirections.push(redirection),
                None => {
                    self.lexer.reset(before);
                    break;
                }
            }
        }

        redirections
    }

    pub(super) fn parse_redirection(&mut self) -> Option<RedirectionNode> {
        self.attempt(|p| {
            let mut mode = String::new();
            if let (Some(handle), Some(next)) = (p.lexer.current(), p.lexer.peek(1)) {
                if is_handle_digit(handle) && is_redirect_char(next) {
                    p.lexer.advance();
                    mode.push(handle);
                }
            }

            let Some(op) = REDIRECT_MODES.iter().find(|op| p.lexer.starts_with(op)) else {
                p.expected("redirection");
                return None;
            };
            p.lexer.eat_str(op);
            mode.push_str(op);

            p.lexer.skip_spaces();
            let destination = p.redirect_destination()?;
            Some(AST::redirection(mode, destination))
        })
    }

    /// A bare number (a stream handle), a quoted value or a file name.
    fn redirect_destination(&mut self) -> Option<String> {
        let before = self.lexer.mark();
        let digits = self.lexer.take_while(|c| c.is_ascii_digit());
        if !digits.is_empty()
            && self.lexer.current().map_or(true, |c| {
                c.is_whitespace() || is_chain_char(c) || is_redirect_char(c) || self.closes_block(c)
            })
        {
            return Some(digits);
        }
        self.lexer.reset(before);

        if let Some(value) = self.lexer.quoted_value() {
            return Some(value);
        }
        let in_block = self.block_depth > 0;
        let name = self
            .lexer
            .word(|c| !c.is_whitespace() && !is_chain_char(c) && !(in_block && c == ')'));
        if name.is_none() {
            self.expected("redirection target");
        }
        name
    }
}
