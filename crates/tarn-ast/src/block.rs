//! Blocks and the variables they declare.

use serde::{Deserialize, Serialize};

use crate::{Ast, BlockId, ExpressionId, ExpressionParent, FunctionId, SignatureId, Span};
use crate::{StatementId, VariableId};

/// Who holds a block. Navigation only: the owner does not keep the block alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockOwner {
    /// Not attached to anything, e.g. a loop body lifted off its foreach.
    Detached,
    Statement(StatementId),
    Function(FunctionId),
    Signature(SignatureId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Parameter,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub owner: BlockOwner,
    pub first: Option<StatementId>,
    pub last: Option<StatementId>,
    /// Parameters first, then locals, each group in declaration order.
    pub variables: Vec<VariableId>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    pub block: BlockId,
    /// Declared default value; only meaningful for parameters.
    pub default: Option<ExpressionId>,
    pub span: Span,
}

impl Ast {
    /// Create an empty, detached block.
    pub fn create_block(&mut self, span: Span) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Some(Block {
            owner: BlockOwner::Detached,
            first: None,
            last: None,
            variables: Vec::new(),
            span,
        }));
        id
    }

    /// Declare a variable in `block`.
    ///
    /// Parameters are placed after the existing parameters and before any
    /// local, so the variable list always reads parameters-then-locals.
    pub fn add_variable(
        &mut self,
        block: BlockId,
        name: impl Into<String>,
        kind: VariableKind,
        default: Option<ExpressionId>,
        span: Span,
    ) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(Some(Variable {
            name: name.into(),
            kind,
            block,
            default,
            span,
        }));
        if let Some(value) = default {
            self.expression_mut(value).parent = ExpressionParent::Variable(id);
        }
        let position = match kind {
            VariableKind::Parameter => self.parameter_count(block),
            VariableKind::Local => self.block(block).variables.len(),
        };
        self.block_mut(block).variables.insert(position, id);
        id
    }

    pub fn parameter_count(&self, block: BlockId) -> usize {
        self.block(block)
            .variables
            .iter()
            .take_while(|&&v| self.variable(v).kind == VariableKind::Parameter)
            .count()
    }

    /// The parameters of `block`, in declaration order.
    pub fn parameters(&self, block: BlockId) -> &[VariableId] {
        let count = self.parameter_count(block);
        &self.block(block).variables[..count]
    }

    pub fn find_variable(&self, block: BlockId, name: &str) -> Option<VariableId> {
        self.block(block)
            .variables
            .iter()
            .copied()
            .find(|&v| self.variable(v).name == name)
    }

    pub fn rename_variable(&mut self, variable: VariableId, name: impl Into<String>) {
        self.variable_mut(variable).name = name.into();
    }

    pub fn first_statement(&self, block: BlockId) -> Option<StatementId> {
        self.block(block).first
    }

    pub fn last_statement(&self, block: BlockId) -> Option<StatementId> {
        self.block(block).last
    }

    /// Snapshot of the statements of `block`, in order.
    ///
    /// Safe to iterate while the block is being edited, as long as the caller
    /// checks [`Ast::statement_exists`] for entries it may have destroyed.
    pub fn block_statements(&self, block: BlockId) -> Vec<StatementId> {
        let mut out = Vec::new();
        let mut cursor = self.block(block).first;
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.statement(id).next;
        }
        out
    }

    /// Statements from `first` up to, but not including, `last` (`None` = block end).
    pub fn statement_range(
        &self,
        first: Option<StatementId>,
        last: Option<StatementId>,
    ) -> Vec<StatementId> {
        let mut out = Vec::new();
        let mut cursor = first;
        while let Some(id) = cursor {
            if Some(id) == last {
                break;
            }
            out.push(id);
            cursor = self.statement(id).next;
        }
        out
    }

    /// Move every statement of `source` to just after `anchor`, keeping order.
    ///
    /// Returns the last moved statement, or `None` if `source` was empty. The
    /// source block is left empty but alive.
    pub fn move_block_statements_after(
        &mut self,
        source: BlockId,
        anchor: StatementId,
    ) -> Option<StatementId> {
        let mut anchor = anchor;
        let mut moved = None;
        while let Some(statement) = self.block(source).first {
            self.unlink_statement(statement);
            self.link_statement_after(anchor, statement);
            anchor = statement;
            moved = Some(statement);
        }
        moved
    }

    /// Destroy a block with all of its statements and variables.
    pub fn destroy_block(&mut self, block: BlockId) {
        while let Some(statement) = self.block(block).first {
            self.destroy_statement(statement);
        }
        let variables = std::mem::take(&mut self.block_mut(block).variables);
        for variable in variables {
            if let Some(default) = self.variable(variable).default {
                self.destroy_expression(default);
            }
            self.variables[variable.index()] = None;
        }
        if let BlockOwner::Statement(owner) = self.block(block).owner {
            if self.statement_exists(owner) && self.statement(owner).sub_block == Some(block) {
                self.statement_mut(owner).sub_block = None;
            }
        }
        self.blocks[block.index()] = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpressionKind, StatementKind};

    #[test]
    fn parameters_stay_ahead_of_locals() {
        let mut ast = Ast::new();
        let block = ast.create_block(Span::default());
        let local = ast.add_variable(block, "i", VariableKind::Local, None, Span::default());
        let first = ast.add_variable(block, "start", VariableKind::Parameter, None, Span::default());
        let one = ast.create_expression(ExpressionKind::Integer(1), Span::default());
        let second = ast.add_variable(block, "step", VariableKind::Parameter, Some(one), Span::default());

        assert_eq!(ast.block(block).variables, vec![first, second, local]);
        assert_eq!(ast.parameters(block), &[first, second]);
        assert_eq!(ast.expression(one).parent, ExpressionParent::Variable(second));
        assert_eq!(ast.find_variable(block, "i"), Some(local));
        assert_eq!(ast.find_variable(block, "missing"), None);
    }

    #[test]
    fn move_statements_keeps_order_and_relinks_block() {
        let mut ast = Ast::new();
        let target = ast.create_block(Span::default());
        let head = ast.create_statement(target, StatementKind::Print, Span::default());
        let tail = ast.create_statement(target, StatementKind::Return, Span::default());

        let source = ast.create_block(Span::default());
        let a = ast.create_statement(source, StatementKind::Call, Span::default());
        let b = ast.create_statement(source, StatementKind::Call, Span::default());

        assert_eq!(ast.move_block_statements_after(source, head), Some(b));
        assert_eq!(ast.block_statements(target), vec![head, a, b, tail]);
        assert_eq!(ast.statement(a).block, target);
        assert_eq!(ast.statement(tail).prev, Some(b));
        assert!(ast.block_statements(source).is_empty());
        assert_eq!(ast.move_block_statements_after(source, tail), None);
    }

    #[test]
    fn destroy_block_frees_contents() {
        let mut ast = Ast::new();
        let block = ast.create_block(Span::default());
        let statement = ast.create_statement(block, StatementKind::Print, Span::default());
        let value = ast.ident("x", Span::default());
        ast.attach_expression(statement, value);

        ast.destroy_block(block);
        assert!(!ast.block_exists(block));
        assert!(!ast.statement_exists(statement));
        assert!(!ast.expression_exists(value));
    }

    #[test]
    fn statement_range_stops_before_last() {
        let mut ast = Ast::new();
        let block = ast.create_block(Span::default());
        let a = ast.create_statement(block, StatementKind::Print, Span::default());
        let b = ast.create_statement(block, StatementKind::Print, Span::default());
        let c = ast.create_statement(block, StatementKind::Print, Span::default());
        assert_eq!(ast.statement_range(Some(a), Some(c)), vec![a, b]);
        assert_eq!(ast.statement_range(Some(b), None), vec![b, c]);
        assert!(ast.statement_range(Some(c), Some(c)).is_empty());
    }
}
