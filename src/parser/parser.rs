//! Recursive Descent Parser for Batch Scripts
//!
//! The parser drives the lexer cursor directly and produces an AST.
//! Alternatives are tried in a fixed order; a rule that does not match
//! restores the cursor and the next alternative is tried.
//!
//! Grammar (simplified):
//!   document   ::= statement*
//!   statement  ::= [@] (control | chain)
//!   control    ::= label | if | for
//!   chain      ::= leaf (('&&' | '||' | '&' | '|') [@] leaf)*
//!   leaf       ::= rem+ | set | echo | goto | call
//!   body       ::= statement | '(' statement* ')'

use tracing::{debug, trace};

use crate::ast::types::{ChainOperator, Document, Position, Statement, AST};
use crate::parser::lexer::Lexer;
use crate::parser::types::{ParseError, ParserOptions};

/// Chain operators, longest match first
const CHAIN_OPERATORS: &[(&str, ChainOperator)] = &[
    ("&&", ChainOperator::OnSuccess),
    ("||", ChainOperator::OnFailure),
    ("&", ChainOperator::Sequence),
    ("|", ChainOperator::Pipe),
];

/// Main parser struct
pub struct Parser {
    pub(super) lexer: Lexer,
    options: ParserOptions,
    /// Current nesting of IF / FOR bodies
    depth: usize,
    /// Current nesting of parenthesized blocks
    pub(super) block_depth: usize,
    /// Furthest position any alternative reached
    furthest: Position,
    /// Rule names that failed at `furthest`
    expected: Vec<String>,
}

impl Parser {
    /// Create a new parser instance
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Parser {
            lexer: Lexer::new(""),
            options,
            depth: 0,
            block_depth: 0,
            furthest: Position::start(),
            expected: Vec::new(),
        }
    }

    /// Parse a batch script string
    pub fn parse(&mut self, input: &str) -> Result<Document, ParseError> {
        if input.len() > self.options.max_input_size {
            return Err(ParseError::new(
                Position::start(),
                vec![format!("input of at most {} bytes", self.options.max_input_size)],
            ));
        }

        self.lexer = Lexer::new(input);
        self.depth = 0;
        self.block_depth = 0;
        self.furthest = Position::start();
        self.expected = Vec::new();

        debug!(bytes = input.len(), "parsing batch script");
        let document = self.parse_document()?;
        debug!(statements = document.statements.len(), "parsed batch script");
        Ok(document)
    }

    // ===========================================================================
    // HELPER METHODS
    // ===========================================================================

    /// Record that `rule` was tried at the current position and did not match.
    pub(super) fn expected(&mut self, rule: &str) {
        let position = self.lexer.position();
        if position.offset > self.furthest.offset {
            self.furthest = position;
            self.expected.clear();
        }
        if position.offset == self.furthest.offset && !self.expected.iter().any(|r| r == rule) {
            self.expected.push(rule.to_string());
        }
    }

    fn error(&self) -> ParseError {
        if self.expected.is_empty() {
            return ParseError::new(self.lexer.position(), vec!["statement".to_string()]);
        }
        ParseError::new(self.furthest, self.expected.clone())
    }

    /// Run `rule`; if it does not match, rewind to where it started.
    pub(super) fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let start = self.lexer.mark();
        let result = rule(self);
        if result.is_none() {
            self.lexer.reset(start);
        }
        result
    }

    /// Like `attempt`, for rules that can abort the whole parse.
    pub(super) fn try_rule<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<Option<T>, ParseError>,
    ) -> Result<Option<T>, ParseError> {
        let start = self.lexer.mark();
        let result = rule(self)?;
        if result.is_none() {
            self.lexer.reset(start);
        }
        Ok(result)
    }

    pub(super) fn keyword(&mut self, keyword: &str) -> Option<()> {
        if self.lexer.eat_keyword(keyword) {
            Some(())
        } else {
            self.expected(keyword);
            None
        }
    }

    pub(super) fn symbol(&mut self, c: char) -> Option<()> {
        if self.lexer.eat(c) {
            Some(())
        } else {
            self.expected(&format!("'{}'", c));
            None
        }
    }

    /// At least one same-line whitespace char.
    pub(super) fn spaces(&mut self) -> Option<()> {
        if self.lexer.skip_spaces() > 0 {
            Some(())
        } else {
            self.expected("whitespace");
            None
        }
    }

    pub(super) fn identifier(&mut self) -> Option<String> {
        let name = self.lexer.identifier();
        if name.is_none() {
            self.expected("identifier");
        }
        name
    }

    /// Check if `c` closes the enclosing parenthesized block.
    pub(super) fn closes_block(&self, c: char) -> bool {
        self.block_depth > 0 && c == ')'
    }

    pub(super) fn enter_body(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(ParseError::new(
                self.lexer.position(),
                vec![format!("at most {} nested bodies", self.options.max_depth)],
            ));
        }
        Ok(())
    }

    pub(super) fn leave_body(&mut self) {
        self.depth -= 1;
    }

    // ===========================================================================
    // DOCUMENT PARSING
    // ===========================================================================

    fn parse_document(&mut self) -> Result<Document, ParseError> {
        let mut statements = Vec::new();

        loop {
            self.lexer.skip_whitespace();
            if self.lexer.is_eof() {
                break;
            }

            let line = self.lexer.position().line;
            let Some(stmt) = self.parse_statement()? else {
                return Err(self.error());
            };
            trace!(kind = stmt.kind_name(), line, "parsed statement");
            statements.push(stmt);
        }

        Ok(AST::document(statements))
    }

    // ===========================================================================
    // STATEMENT PARSING
    // ===========================================================================

    /// Parse one statement: control statements first, then a chain of leaves.
    pub fn parse_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let start = self.lexer.mark();

        // echo-suppression marker, no effect on the tree
        self.lexer.eat('@');

        if let Some(stmt) = self.parse_control_statement()? {
            return Ok(Some(stmt));
        }
        if let Some(stmt) = self.parse_chain() {
            return Ok(Some(stmt));
        }

        self.lexer.reset(start);
        Ok(None)
    }

    fn parse_control_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        if let Some(label) = self.parse_label() {
            return Ok(Some(label));
        }
        if let Some(branch) = self.parse_branch()? {
            return Ok(Some(branch));
        }
        self.parse_loop()
    }

    // ===========================================================================
    // CHAIN PARSING
    // ===========================================================================

    /// Fold `leaf (op leaf)*` into a left-leaning chain.
    fn parse_chain(&mut self) -> Option<Statement> {
        let mut chain = self.parse_leaf_statement()?;

        loop {
            let before = self.lexer.mark();
            self.lexer.skip_spaces();

            let Some(operator) = self.parse_chain_operator() else {
                self.lexer.reset(before);
                break;
            };

            self.lexer.skip_whitespace();
            self.lexer.eat('@');
            match self.parse_leaf_statement() {
                Some(right) => {
                    debug_assert!(right.is_leaf());
                    chain = AST::chain(chain, operator, right);
                }
                None => {
                    self.lexer.reset(before);
                    break;
                }
            }
        }

        Some(chain)
    }

    fn parse_chain_operator(&mut self) -> Option<ChainOperator> {
        for (text, operator) in CHAIN_OPERATORS {
            if self.lexer.eat_str(text) {
                return Some(*operator);
            }
        }
        for (text, _) in CHAIN_OPERATORS {
            self.expected(&format!("'{}'", text));
        }
        None
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to parse a batch script
pub fn parse(input: &str) -> Result<Document, ParseError> {
    let mut parser = Parser::new();
    parser.parse(input)
}

/// Parse with explicit limits
pub fn parse_with_options(input: &str, options: ParserOptions) -> Result<Document, ParseError> {
    let mut parser = Parser::with_options(options);
    parser.parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Statement {
        let document = parse(input).unwrap();
        assert_eq!(document.statements.len(), 1, "input: {input:?}");
        document.statements.into_iter().next().unwrap()
    }

    #[test]
    fn test_parse_empty() {
        let document = parse("").unwrap();
        assert!(document.statements.is_empty());

        let document = parse("  \r\n\n\t\n").unwrap();
        assert!(document.statements.is_empty());
    }

    #[test]
    fn test_parse_chain_on_success() {
        assert_eq!(
            parse_one("echo 123 && echo 456"),
            AST::chain(
                AST::emit("123 ", false, vec![]),
                ChainOperator::OnSuccess,
                AST::emit("456", false, vec![]),
            )
        );
    }

    #[test]
    fn test_parse_chain_on_failure() {
        assert_eq!(
            parse_one("echo 123 || echo 456"),
            AST::chain(
                AST::emit("123 ", false, vec![]),
                ChainOperator::OnFailure,
                AST::emit("456", false, vec![]),
            )
        );
    }

    #[test]
    fn test_parse_chain_is_left_associative() {
        assert_eq!(
            parse_one("echo 123 && echo 456 || echo 789"),
            AST::chain(
                AST::chain(
                    AST::emit("123 ", false, vec![]),
                    ChainOperator::OnSuccess,
                    AST::emit("456 ", false, vec![]),
                ),
                ChainOperator::OnFailure,
                AST::emit("789", false, vec![]),
            )
        );
    }

    #[test]
    fn test_parse_chain_single_operators() {
        assert_eq!(
            parse_one("goto A&goto B|goto C"),
            AST::chain(
                AST::chain(AST::goto("A"), ChainOperator::Sequence, AST::goto("B")),
                ChainOperator::Pipe,
                AST::goto("C"),
            )
        );
    }

    #[test]
    fn test_parse_chain_mixed_leaves() {
        assert_eq!(
            parse_one("call build.cmd release && @echo ok"),
            AST::chain(
                AST::invoke("build.cmd", vec!["release".into()]),
                ChainOperator::OnSuccess,
                AST::emit("ok", false, vec![]),
            )
        );
    }

    #[test]
    fn test_parse_chain_continues_after_operator_line_break() {
        assert_eq!(
            parse_one("goto A &&\n  goto B"),
            AST::chain(AST::goto("A"), ChainOperator::OnSuccess, AST::goto("B"))
        );
    }

    #[test]
    fn test_parse_chain_does_not_cross_line_before_operator() {
        let err = parse("goto A\n&& goto B").unwrap_err();
        assert_eq!(err.position.line, 2);
        assert_eq!(err.position.column, 1);
    }

    #[test]
    fn test_parse_chain_rejects_control_operand() {
        let err = parse("echo a && if a==b goto X").unwrap_err();
        assert_eq!(err.position.offset, "echo a && ".len());
        assert!(err.expected.contains(&"ECHO".to_string()));
    }

    #[test]
    fn test_parse_at_marker_is_discarded() {
        let document = parse("@rem test\n@set a=1").unwrap();
        assert_eq!(
            document.statements,
            vec![AST::comment("test"), AST::assignment("a", "1")]
        );
    }

    #[test]
    fn test_parse_multiple_statements() {
        let document = parse(":START\r\nset i=1\r\n\r\ngoto START\r\n").unwrap();
        assert_eq!(
            document.statements,
            vec![AST::label("START"), AST::assignment("i", "1"), AST::goto("START")]
        );
    }

    #[test]
    fn test_parse_error_reports_attempted_rules() {
        let err = parse("set a=1\nfrobnicate now").unwrap_err();
        assert_eq!(err.position, Position::new(2, 1, 8));
        for rule in ["':'", "IF", "FOR", "REM", "SET", "ECHO", "GOTO", "CALL"] {
            assert!(err.expected.contains(&rule.to_string()), "missing {rule}: {err}");
        }
    }

    #[test]
    fn test_parse_error_line_in_cr_only_source() {
        let err = parse("set a=1\rgoto A\r???").unwrap_err();
        assert_eq!(err.position, Position::new(3, 1, 15));
    }

    #[test]
    fn test_parse_error_after_dangling_operator() {
        let err = parse("echo a &&").unwrap_err();
        assert_eq!(err.position.offset, 9);
        assert!(err.expected.contains(&"CALL".to_string()));
    }

    #[test]
    fn test_parse_error_has_no_partial_result() {
        assert!(parse("set a=1\nset b=2\n???").is_err());
    }

    #[test]
    fn test_input_size_limit() {
        let options = ParserOptions {
            max_input_size: 8,
            ..ParserOptions::default()
        };
        let err = parse_with_options("set abc=12345", options).unwrap_err();
        assert_eq!(err.expected, vec!["input of at most 8 bytes".to_string()]);
        assert!(parse_with_options("set a=1", options).is_ok());
    }

    #[test]
    fn test_parser_is_reusable() {
        let mut parser = Parser::new();
        assert!(parser.parse("???").is_err());
        let document = parser.parse("goto END").unwrap();
        assert_eq!(document.statements, vec![AST::goto("END")]);
    }
}
