//! Indented text dumps of blocks, used by tests and `tarnc`.
//!
//! ```text
//! start = 3
//! while start < 10
//!   x = start
//!   print x
//! ```
//!
//! Statements that are not instantiated get a trailing `(uninstantiated)`.

use std::fmt::Write;

use crate::{Ast, BlockId, ExpressionId, ExpressionKind, StatementId, StatementKind};

impl Ast {
    pub fn dump_block(&self, block: BlockId) -> String {
        let mut out = String::new();
        self.write_block(&mut out, block, 0);
        out
    }

    /// Dump every signature body, each under a `sig name` header.
    pub fn dump_signatures(&self) -> String {
        let mut out = String::new();
        for id in self.signature_ids() {
            let signature = self.signature(id);
            let function = self.function(signature.function);
            let params: Vec<&str> = self
                .parameters(signature.body)
                .iter()
                .map(|&v| self.variable(v).name.as_str())
                .collect();
            let marker = if signature.instantiated { "" } else { " (uninstantiated)" };
            let _ = writeln!(out, "{} {}({}){}", id, function.name, params.join(", "), marker);
            self.write_block(&mut out, signature.body, 1);
        }
        out
    }

    pub fn render_statement(&self, statement: StatementId) -> String {
        let node = self.statement(statement);
        let keyword = node.kind.keyword();
        let expression = node.expression;
        let mut line = match (node.kind, expression) {
            (StatementKind::Assign | StatementKind::Call, Some(e)) => self.render_expression(e),
            (StatementKind::Foreach, Some(e)) if self.children(e).len() == 2 => format!(
                "foreach {} in {}",
                self.render_expression(self.children(e)[0]),
                self.render_expression(self.children(e)[1]),
            ),
            (_, Some(e)) => format!("{keyword} {}", self.render_expression(e)),
            (_, None) => keyword.to_string(),
        };
        if !node.instantiated {
            line.push_str(" (uninstantiated)");
        }
        line
    }

    pub fn render_expression(&self, expression: ExpressionId) -> String {
        let node = self.expression(expression);
        let child = |i: usize| {
            node.children
                .get(i)
                .map(|&c| self.render_expression(c))
                .unwrap_or_default()
        };
        match &node.kind {
            ExpressionKind::Ident(name) | ExpressionKind::TypeName(name) => name.clone(),
            ExpressionKind::Integer(value) => value.to_string(),
            ExpressionKind::String(value) => format!("{value:?}"),
            ExpressionKind::Bool(value) => value.to_string(),
            ExpressionKind::Call => format!("{}({})", child(0), child(1)),
            ExpressionKind::Dot => format!("{}.{}", child(0), child(1)),
            ExpressionKind::List => node
                .children
                .iter()
                .map(|&c| self.render_expression(c))
                .collect::<Vec<_>>()
                .join(", "),
            ExpressionKind::TypeOf => format!("typeof({})", child(0)),
            kind => {
                let op = kind.binary_operator().unwrap_or("?");
                let assignment = matches!(kind, ExpressionKind::Equals);
                let operand = |i: usize| match node.children.get(i) {
                    Some(&c) if !assignment && self.is_nested_binary(c) => {
                        format!("({})", self.render_expression(c))
                    }
                    Some(&c) => self.render_expression(c),
                    None => String::new(),
                };
                format!("{} {op} {}", operand(0), operand(1))
            }
        }
    }

    fn is_nested_binary(&self, expression: ExpressionId) -> bool {
        self.expression(expression).kind.binary_operator().is_some()
    }

    fn write_block(&self, out: &mut String, block: BlockId, depth: usize) {
        for statement in self.block_statements(block) {
            let _ = writeln!(out, "{:indent$}{}", "", self.render_statement(statement), indent = depth * 2);
            if let Some(sub_block) = self.statement(statement).sub_block {
                self.write_block(out, sub_block, depth + 1);
            }
        }
    }
}
