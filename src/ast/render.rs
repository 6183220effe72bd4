//! Debug projection of the AST
//!
//! Renders nodes into a bracketed, tagged text form. Nested bodies and chain
//! operands are indented one level deeper than their parent. The output is
//! meant for tests and the CLI, it is not valid batch source.

use std::fmt;

use crate::ast::types::{Document, EmitNode, Statement};

/// One indentation level
pub const INDENT: &str = "    ";

/// Render a statement, every line prefixed with `indent` levels.
///
/// Text captured from free-form regions (comment lines folded with `\n`)
/// is written verbatim, without re-indenting its embedded lines.
pub fn render(statement: &Statement, indent: usize) -> String {
    let pad = INDENT.repeat(indent);
    match statement {
        Statement::Comment(node) => format!("{pad}<rem text={{{}}}>", node.text),
        Statement::Label(node) => format!("{pad}<label name={{{}}}>", node.name),
        Statement::Assignment(node) => {
            format!("{pad}<setvariable name={{{}}} value={{{}}}>", node.name, node.value)
        }
        Statement::Goto(node) => format!("{pad}<goto name={{{}}}>", node.target),
        Statement::Invoke(node) => format!(
            "{pad}<callfile name={{{}}} parameters={{{}}}>",
            node.target,
            node.arguments.join(",")
        ),
        Statement::Emit(node) => format!("{pad}{}", render_emit(node)),
        Statement::Branch(node) => {
            let mut out = format!("{pad}<if condition={{{}}} whenTrue={{\n", node.condition);
            push_body(&mut out, &node.then_body, indent + 1);
            out.push_str(&pad);
            out.push('}');
            if let Some(else_body) = &node.else_body {
                out.push_str(" whenFalse={\n");
                push_body(&mut out, else_body, indent + 1);
                out.push_str(&pad);
                out.push('}');
            }
            out.push('>');
            out
        }
        Statement::Loop(node) => {
            let mut out = format!(
                "{pad}<for option={{{}}} parameter={{{}}} set={{{}}} statements={{\n",
                node.option.as_deref().unwrap_or(""),
                node.loop_var,
                node.source_expr
            );
            push_body(&mut out, &node.body, indent + 1);
            out.push_str(&pad);
            out.push_str("}>");
            out
        }
        Statement::Chain(node) => {
            let mut out = format!("{pad}<pipeline ope={{{}}} left={{\n", node.operator);
            out.push_str(&render(&node.left, indent + 1));
            out.push('\n');
            out.push_str(&pad);
            out.push_str("} right={\n");
            out.push_str(&render(&node.right, indent + 1));
            out.push('\n');
            out.push_str(&pad);
            out.push_str("}>");
            out
        }
    }
}

/// Render every top-level statement, one per line.
pub fn render_document(document: &Document, indent: usize) -> String {
    let mut out = String::new();
    push_body(&mut out, &document.statements, indent);
    out
}

fn render_emit(node: &EmitNode) -> String {
    let mut out = format!("<echo message={{{}}}", node.message);
    if node.escape_mode {
        out.push_str(" escape={true}");
    }
    if !node.redirections.is_empty() {
        let redirects: Vec<String> = node.redirections.iter().map(|r| r.to_string()).collect();
        out.push_str(" redirect={");
        out.push_str(&redirects.join(" "));
        out.push('}');
    }
    out.push('>');
    out
}

fn push_body(out: &mut String, statements: &[Statement], indent: usize) {
    for statement in statements {
        out.push_str(&render(statement, indent));
        out.push('\n');
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, 0))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_document(self, 0))
    }
}
