//! Lexer for Batch Scripts
//!
//! Batch syntax has no context-free token stream: whether `1` is text or a
//! redirection handle, or whether `(` opens a block, depends on the rule
//! being tried. The parser therefore drives this cursor directly and asks for
//! one lexical primitive at a time. It handles:
//! - Same-line whitespace vs. line terminators
//! - Identifiers
//! - Quoted and unquoted values
//! - Case-insensitive keywords
//!
//! Every primitive either consumes exactly what it matched or leaves the
//! cursor where it was.

use crate::ast::types::Position;

/// Saved cursor state, restored when an alternative fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

/// Check if a character ends a line
pub fn is_line_terminator(c: char) -> bool {
    c == '\r' || c == '\n'
}

/// Check if a character is whitespace that keeps us on the same line
pub fn is_space(c: char) -> bool {
    c.is_whitespace() && !is_line_terminator(c)
}

/// Check if a character can be a stream handle before a redirection
pub fn is_handle_digit(c: char) -> bool {
    matches!(c, '0' | '1' | '2')
}

/// Check if a character starts a redirection mode
pub fn is_redirect_char(c: char) -> bool {
    c == '<' || c == '>'
}

/// Check if a character starts a chain operator
pub fn is_chain_char(c: char) -> bool {
    c == '&' || c == '|'
}

/// Char cursor over the source
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    pub fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += 1;
        // a lone `\r` ends a line too; in `\r\n` the `\n` does
        if c == '\n' || (c == '\r' && self.current() != Some('\n')) {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column, self.pos)
    }

    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
    }

    /// Skip whitespace on the current line. Returns how many chars were skipped.
    pub fn skip_spaces(&mut self) -> usize {
        let mut count = 0;
        while self.current().is_some_and(is_space) {
            self.advance();
            count += 1;
        }
        count
    }

    /// Skip all whitespace, line terminators included.
    pub fn skip_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Consume `c` if it is the current char.
    pub fn eat(&mut self, c: char) -> bool {
        if self.current() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Check, without consuming, whether the input continues with `s`.
    pub fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    /// Consume `s` if the input continues with it exactly.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if !self.starts_with(s) {
            return false;
        }
        for _ in s.chars() {
            self.advance();
        }
        true
    }

    /// Check, without consuming, for `keyword` in any ASCII case.
    pub fn at_keyword(&self, keyword: &str) -> bool {
        keyword
            .chars()
            .enumerate()
            .all(|(i, k)| self.peek(i).is_some_and(|c| c.eq_ignore_ascii_case(&k)))
    }

    /// Consume `keyword` in any ASCII case.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if !self.at_keyword(keyword) {
            return false;
        }
        for _ in keyword.chars() {
            self.advance();
        }
        true
    }

    /// Check for the end of the current line (or of the input).
    pub fn at_line_end(&self) -> bool {
        self.current().map_or(true, is_line_terminator)
    }

    /// Consume `\r\n`, `\n` or `\r`.
    pub fn eat_line_terminator(&mut self) -> bool {
        if self.eat_str("\r\n") {
            return true;
        }
        self.eat('\n') || self.eat('\r')
    }

    /// Consume chars while `pred` holds and return them.
    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.current() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.advance();
        }
        out
    }

    /// Everything up to, not including, the line terminator.
    pub fn rest_of_line(&mut self) -> String {
        self.take_while(|c| !is_line_terminator(c))
    }

    /// A letter followed by letters, digits or underscores.
    pub fn identifier(&mut self) -> Option<String> {
        if !self.current().is_some_and(char::is_alphabetic) {
            return None;
        }
        Some(self.take_while(|c| c.is_alphanumeric() || c == '_'))
    }

    /// `"..."` with the quotes stripped. No escapes: the first `"` closes.
    pub fn quoted_value(&mut self) -> Option<String> {
        if self.current() != Some('"') {
            return None;
        }
        let close = self.input[self.pos + 1..].iter().position(|&c| c == '"')?;
        self.advance();
        let content: String = (0..close).filter_map(|_| self.advance()).collect();
        self.advance();
        Some(content)
    }

    /// One or more non-whitespace chars.
    pub fn literal_value(&mut self) -> Option<String> {
        self.word(|c| !c.is_whitespace())
    }

    /// One or more chars accepted by `pred`.
    pub fn word(&mut self, pred: impl Fn(char) -> bool) -> Option<String> {
        let value = self.take_while(pred);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        let mut lexer = Lexer::new("Label_test123 rest");
        assert_eq!(lexer.identifier().as_deref(), Some("Label_test123"));
        assert_eq!(lexer.current(), Some(' '));
    }

    #[test]
    fn test_identifier_requires_letter() {
        let mut lexer = Lexer::new("_name");
        assert_eq!(lexer.identifier(), None);
        assert_eq!(lexer.position(), Position::start());

        let mut lexer = Lexer::new("1abc");
        assert_eq!(lexer.identifier(), None);
    }

    #[test]
    fn test_quoted_value_strips_quotes() {
        let mut lexer = Lexer::new("\"C:\\my custom file.txt\" tail");
        assert_eq!(lexer.quoted_value().as_deref(), Some("C:\\my custom file.txt"));
        assert_eq!(lexer.rest_of_line(), " tail");
    }

    #[test]
    fn test_quoted_value_has_no_escapes() {
        // a doubled quote closes the first value and opens the next
        let mut lexer = Lexer::new("\"a\"\"b\"");
        assert_eq!(lexer.quoted_value().as_deref(), Some("a"));
        assert_eq!(lexer.quoted_value().as_deref(), Some("b"));
        assert!(lexer.is_eof());
    }

    #[test]
    fn test_unterminated_quote_consumes_nothing() {
        let mut lexer = Lexer::new("\"open");
        assert_eq!(lexer.quoted_value(), None);
        assert_eq!(lexer.current(), Some('"'));
    }

    #[test]
    fn test_literal_value() {
        let mut lexer = Lexer::new("%BIN%\\run.cmd  next");
        assert_eq!(lexer.literal_value().as_deref(), Some("%BIN%\\run.cmd"));
        assert_eq!(lexer.skip_spaces(), 2);
        assert_eq!(lexer.literal_value().as_deref(), Some("next"));
        assert_eq!(lexer.literal_value(), None);
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let mut lexer = Lexer::new("eChO hi");
        assert!(!lexer.eat_keyword("ECHOX"));
        assert!(lexer.eat_keyword("ECHO"));
        assert_eq!(lexer.current(), Some(' '));
    }

    #[test]
    fn test_skip_spaces_stops_at_line_terminator() {
        let mut lexer = Lexer::new(" \t\r\n  x");
        assert_eq!(lexer.skip_spaces(), 2);
        assert!(lexer.at_line_end());
        assert!(lexer.eat_line_terminator());
        assert!(!lexer.at_line_end());
        lexer.skip_whitespace();
        assert_eq!(lexer.current(), Some('x'));
    }

    #[test]
    fn test_position_tracking() {
        let mut lexer = Lexer::new("ab\ncd");
        lexer.advance();
        lexer.advance();
        lexer.advance();
        lexer.advance();
        assert_eq!(lexer.position(), Position::new(2, 2, 4));
    }

    #[test]
    fn test_position_tracking_line_endings() {
        let mut lexer = Lexer::new("a\rb\r\nc");
        lexer.advance();
        lexer.advance();
        assert_eq!(lexer.position(), Position::new(2, 1, 2));
        lexer.advance();
        lexer.advance();
        assert_eq!(lexer.position(), Position::new(2, 3, 4));
        lexer.advance();
        assert_eq!(lexer.position(), Position::new(3, 1, 5));
    }

    #[test]
    fn test_mark_and_reset() {
        let mut lexer = Lexer::new("one\ntwo");
        let mark = lexer.mark();
        lexer.rest_of_line();
        lexer.eat_line_terminator();
        assert_eq!(lexer.position().line, 2);
        lexer.reset(mark);
        assert_eq!(lexer.position(), Position::start());
    }

    #[test]
    fn test_char_classes() {
        assert!(is_space('\t'));
        assert!(!is_space('\n'));
        assert!(is_handle_digit('2'));
        assert!(!is_handle_digit('3'));
        assert!(is_redirect_char('<'));
        assert!(is_chain_char('|'));
    }
}
