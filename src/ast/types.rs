//! Abstract Syntax Tree (AST) Types for Batch Scripts
//!
//! This module defines the complete AST structure for batch scripts.
//! Statements and conditions are closed sum types; every node is built once
//! by the parser and never mutated afterwards.

use serde::Serialize;
use std::fmt;

// =============================================================================
// BASE TYPES
// =============================================================================

/// Position information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in chars
    pub column: usize,
    /// 0-based char offset into the source
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Position of the first char of a source.
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// =============================================================================
// DOCUMENT & STATEMENTS
// =============================================================================

/// Root node: a complete batch file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Document {
    pub statements: Vec<Statement>,
}

/// Union of all statement types
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    Comment(CommentNode),
    Label(LabelNode),
    Assignment(AssignmentNode),
    Goto(GotoNode),
    Invoke(InvokeNode),
    Emit(EmitNode),
    Branch(BranchNode),
    Loop(LoopNode),
    Chain(ChainNode),
}

impl Statement {
    /// Short lowercase name of the variant, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Comment(_) => "comment",
            Self::Label(_) => "label",
            Self::Assignment(_) => "assignment",
            Self::Goto(_) => "goto",
            Self::Invoke(_) => "invoke",
            Self::Emit(_) => "emit",
            Self::Branch(_) => "branch",
            Self::Loop(_) => "loop",
            Self::Chain(_) => "chain",
        }
    }

    /// Whether this statement may appear as a chain operand.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Comment(_) | Self::Assignment(_) | Self::Goto(_) | Self::Invoke(_) | Self::Emit(_)
        )
    }
}

// =============================================================================
// LEAF STATEMENTS
// =============================================================================

/// REM comment; consecutive comment lines are folded with '\n'
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    pub text: String,
}

/// :LABEL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelNode {
    pub name: String,
}

/// SET NAME=value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentNode {
    pub name: String,
    /// Remainder of the line, verbatim
    pub value: String,
}

/// GOTO LABEL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GotoNode {
    pub target: String,
}

/// CALL target args...
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvokeNode {
    /// Script path or `:label` reference
    pub target: String,
    pub arguments: Vec<String>,
}

/// ECHO message with optional redirections
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmitNode {
    pub message: String,
    /// `ECHO:` form
    pub escape_mode: bool,
    pub redirections: Vec<RedirectionNode>,
}

/// Stream redirection: `>> file`, `2>&1`, `< input.txt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectionNode {
    /// `>>`, `>&`, `>`, `<&` or `<`, optionally prefixed with a handle digit
    pub mode: String,
    /// Handle number for the duplicate form, filename otherwise
    pub destination: String,
}

impl fmt::Display for RedirectionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<redirection mode={{{}}} destination={{{}}}>", self.mode, self.destination)
    }
}

// =============================================================================
// CONTROL FLOW
// =============================================================================

/// IF condition body [ELSE body]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchNode {
    pub condition: Condition,
    pub then_body: Vec<Statement>,
    pub else_body: Option<Vec<Statement>>,
}

/// FOR /F ["options"] %%v IN (source) DO body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopNode {
    pub option: Option<String>,
    pub loop_var: char,
    /// Text between the parentheses, not re-parsed
    pub source_expr: String,
    pub body: Vec<Statement>,
}

// =============================================================================
// CHAINS
// =============================================================================

/// Left-leaning chain: `a && b || c` is `Chain(Chain(a, &&, b), ||, c)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainNode {
    pub left: Box<Statement>,
    pub operator: ChainOperator,
    pub right: Box<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChainOperator {
    #[serde(rename = "&")]
    Sequence, // &
    #[serde(rename = "&&")]
    OnSuccess, // &&
    #[serde(rename = "||")]
    OnFailure, // ||
    #[serde(rename = "|")]
    Pipe, // |
}

impl ChainOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequence => "&",
            Self::OnSuccess => "&&",
            Self::OnFailure => "||",
            Self::Pipe => "|",
        }
    }
}

impl fmt::Display for ChainOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CONDITIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Comparison(ComparisonNode),
    Exists(ExistsNode),
    Negated(NegatedNode),
}

/// `left == right` or `left EQU right` (and NEQ, GTR, LSS, LEQ, GEQ)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonNode {
    pub left: String,
    /// Operator as spelled in the source
    pub operator: String,
    pub right: String,
}

/// EXIST path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExistsNode {
    pub path: String,
}

/// NOT condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NegatedNode {
    pub inner: Box<Condition>,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison(c) => write!(
                f,
                "<comparison left={{{}}} ope={{{}}} right={{{}}}>",
                c.left, c.operator, c.right
            ),
            Self::Exists(e) => write!(f, "<exists path={{{}}}>", e.path),
            Self::Negated(n) => write!(f, "<not {{{}}}>", n.inner),
        }
    }
}

// =============================================================================
// FACTORY FUNCTIONS (AST builders)
// =============================================================================

/// AST factory for building nodes
pub struct AST;

impl AST {
    pub fn document(statements: Vec<Statement>) -> Document {
        Document { statements }
    }

    pub fn comment(text: impl Into<String>) -> Statement {
        Statement::Comment(CommentNode { text: text.into() })
    }

    pub fn label(name: impl Into<String>) -> Statement {
        Statement::Label(LabelNode { name: name.into() })
    }

    pub fn assignment(name: impl Into<String>, value: impl Into<String>) -> Statement {
        Statement::Assignment(AssignmentNode {
            name: name.into(),
            value: value.into(),
        })
    }

    pub fn goto(target: impl Into<String>) -> Statement {
        Statement::Goto(GotoNode { target: target.into() })
    }

    pub fn invoke(target: impl Into<String>, arguments: Vec<String>) -> Statement {
        Statement::Invoke(InvokeNode {
            target: target.into(),
            arguments,
        })
    }

    pub fn emit(
        message: impl Into<String>,
        escape_mode: bool,
        redirections: Vec<RedirectionNode>,
    ) -> Statement {
        Statement::Emit(EmitNode {
            message: message.into(),
            escape_mode,
            redirections,
        })
    }

    pub fn redirection(mode: impl Into<String>, destination: impl Into<String>) -> RedirectionNode {
        RedirectionNode {
            mode: mode.into(),
            destination: destination.into(),
        }
    }

    pub fn branch(
        condition: Condition,
        then_body: Vec<Statement>,
        else_body: Option<Vec<Statement>>,
    ) -> Statement {
        Statement::Branch(BranchNode {
            condition,
            then_body,
            else_body,
        })
    }

    pub fn for_loop(
        option: Option<String>,
        loop_var: char,
        source_expr: impl Into<String>,
        body: Vec<Statement>,
    ) -> Statement {
        Statement::Loop(LoopNode {
            option,
            loop_var,
            source_expr: source_expr.into(),
            body,
        })
    }

    pub fn chain(left: Statement, operator: ChainOperator, right: Statement) -> Statement {
        Statement::Chain(ChainNode {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn comparison(
        left: impl Into<String>,
        operator: impl Into<String>,
        right: impl Into<String>,
    ) -> Condition {
        Condition::Comparison(ComparisonNode {
            left: left.into(),
            operator: operator.into(),
            right: right.into(),
        })
    }

    pub fn exists(path: impl Into<String>) -> Condition {
        Condition::Exists(ExistsNode { path: path.into() })
    }

    pub fn negated(inner: Condition) -> Condition {
        Condition::Negated(NegatedNode {
            inner: Box::new(inner),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_category() {
        assert!(AST::comment("x").is_leaf());
        assert!(AST::goto("END").is_leaf());
        assert!(!AST::label("END").is_leaf());

        let branch = AST::branch(AST::exists("a.txt"), vec![AST::goto("END")], None);
        assert!(!branch.is_leaf());
        assert_eq!(branch.kind_name(), "branch");
    }

    #[test]
    fn test_condition_display() {
        let cond = AST::negated(AST::comparison("%A%", "EQU", "1"));
        assert_eq!(cond.to_string(), "<not {<comparison left={%A%} ope={EQU} right={1}>}>");
    }

    #[test]
    fn test_serialize_tags() {
        let stmt = AST::chain(AST::goto("A"), ChainOperator::OnFailure, AST::goto("B"));
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["type"], "chain");
        assert_eq!(json["operator"], "||");
        assert_eq!(json["left"]["type"], "goto");
        assert_eq!(json["left"]["target"], "A");
    }
}
