//! Statements and the doubly linked lists that hold them.

use serde::{Deserialize, Serialize};

use crate::{Ast, BlockId, BlockOwner, ExpressionId, ExpressionParent, Span, StatementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// `target = value`; the expression is an `Equals` pair.
    Assign,
    /// A call evaluated for its effect.
    Call,
    Print,
    Return,
    If,
    Else,
    While,
    /// `foreach access in call`; the expression is an `Equals[access, call]` pair.
    Foreach,
    Yield,
    Switch,
    Case,
    Default,
}

impl StatementKind {
    pub fn keyword(self) -> &'static str {
        match self {
            StatementKind::Assign => "assign",
            StatementKind::Call => "call",
            StatementKind::Print => "print",
            StatementKind::Return => "return",
            StatementKind::If => "if",
            StatementKind::Else => "else",
            StatementKind::While => "while",
            StatementKind::Foreach => "foreach",
            StatementKind::Yield => "yield",
            StatementKind::Switch => "switch",
            StatementKind::Case => "case",
            StatementKind::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
    pub block: BlockId,
    pub prev: Option<StatementId>,
    pub next: Option<StatementId>,
    pub expression: Option<ExpressionId>,
    pub sub_block: Option<BlockId>,
    /// Survived type specialization and belongs to the compiled program.
    pub instantiated: bool,
    /// Spliced in by a transformation and waiting to be confirmed by binding.
    pub queued: bool,
}

impl Ast {
    /// Create a statement at the end of `block`.
    ///
    /// New statements start out instantiated: everything the middle-end
    /// materializes is part of the compiled program.
    pub fn create_statement(&mut self, block: BlockId, kind: StatementKind, span: Span) -> StatementId {
        let id = self.alloc_statement(block, kind, span);
        self.append_statement(block, id);
        id
    }

    /// Create a statement directly after `anchor`, in the anchor's block.
    pub fn insert_statement_after(
        &mut self,
        anchor: StatementId,
        kind: StatementKind,
        span: Span,
    ) -> StatementId {
        let block = self.statement(anchor).block;
        let id = self.alloc_statement(block, kind, span);
        self.link_statement_after(anchor, id);
        id
    }

    pub(crate) fn alloc_statement(&mut self, block: BlockId, kind: StatementKind, span: Span) -> StatementId {
        let id = StatementId(self.statements.len() as u32);
        self.statements.push(Some(Statement {
            kind,
            span,
            block,
            prev: None,
            next: None,
            expression: None,
            sub_block: None,
            instantiated: true,
            queued: false,
        }));
        id
    }

    pub fn next_statement(&self, id: StatementId) -> Option<StatementId> {
        self.statement(id).next
    }

    pub fn prev_statement(&self, id: StatementId) -> Option<StatementId> {
        self.statement(id).prev
    }

    pub fn set_statement_kind(&mut self, id: StatementId, kind: StatementKind) {
        self.statement_mut(id).kind = kind;
    }

    pub fn set_instantiated(&mut self, id: StatementId, instantiated: bool) {
        self.statement_mut(id).instantiated = instantiated;
    }

    pub fn set_queued(&mut self, id: StatementId, queued: bool) {
        self.statement_mut(id).queued = queued;
    }

    /// Append an unlinked statement to the end of `block`.
    pub(crate) fn append_statement(&mut self, block: BlockId, id: StatementId) {
        let last = self.block(block).last;
        {
            let statement = self.statement_mut(id);
            statement.block = block;
            statement.prev = last;
            statement.next = None;
        }
        match last {
            Some(last) => self.statement_mut(last).next = Some(id),
            None => self.block_mut(block).first = Some(id),
        }
        self.block_mut(block).last = Some(id);
    }

    /// Link an unlinked statement directly after `anchor`.
    pub(crate) fn link_statement_after(&mut self, anchor: StatementId, id: StatementId) {
        let block = self.statement(anchor).block;
        let next = self.statement(anchor).next;
        {
            let statement = self.statement_mut(id);
            statement.block = block;
            statement.prev = Some(anchor);
            statement.next = next;
        }
        self.statement_mut(anchor).next = Some(id);
        match next {
            Some(next) => self.statement_mut(next).prev = Some(id),
            None => self.block_mut(block).last = Some(id),
        }
    }

    /// Remove a statement from its block's list. Its `block` field keeps
    /// pointing at the old block until it is linked somewhere else.
    pub(crate) fn unlink_statement(&mut self, id: StatementId) {
        let (block, prev, next) = {
            let statement = self.statement(id);
            (statement.block, statement.prev, statement.next)
        };
        match prev {
            Some(prev) => self.statement_mut(prev).next = next,
            None => self.block_mut(block).first = next,
        }
        match next {
            Some(next) => self.statement_mut(next).prev = prev,
            None => self.block_mut(block).last = prev,
        }
        let statement = self.statement_mut(id);
        statement.prev = None;
        statement.next = None;
    }

    /// Give a statement its expression. The statement must not have one yet.
    pub fn attach_expression(&mut self, statement: StatementId, expression: ExpressionId) {
        debug_assert!(
            self.statement(statement).expression.is_none(),
            "{statement} already has an expression"
        );
        self.detach_expression(expression);
        self.statement_mut(statement).expression = Some(expression);
        self.expression_mut(expression).parent = ExpressionParent::Statement(statement);
    }

    /// Take a statement's expression away, leaving it parentless but alive.
    pub fn take_expression(&mut self, statement: StatementId) -> Option<ExpressionId> {
        let expression = self.statement_mut(statement).expression.take()?;
        self.expression_mut(expression).parent = ExpressionParent::None;
        Some(expression)
    }

    /// Hand ownership of `block` to `statement`. The statement must not own one yet.
    pub fn attach_sub_block(&mut self, statement: StatementId, block: BlockId) {
        debug_assert!(
            self.statement(statement).sub_block.is_none(),
            "{statement} already has a sub-block"
        );
        self.statement_mut(statement).sub_block = Some(block);
        self.block_mut(block).owner = BlockOwner::Statement(statement);
    }

    /// Lift a statement's sub-block off it; the block survives, detached.
    pub fn take_sub_block(&mut self, statement: StatementId) -> Option<BlockId> {
        let block = self.statement_mut(statement).sub_block.take()?;
        self.block_mut(block).owner = BlockOwner::Detached;
        Some(block)
    }

    /// Unlink and destroy a statement with its expression tree and sub-block.
    pub fn destroy_statement(&mut self, id: StatementId) {
        self.unlink_statement(id);
        if let Some(expression) = self.take_expression(id) {
            self.destroy_expression(expression);
        }
        if let Some(block) = self.take_sub_block(id) {
            self.destroy_block(block);
        }
        self.statements[id.index()] = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_with(ast: &mut Ast, count: usize) -> (BlockId, Vec<StatementId>) {
        let block = ast.create_block(Span::default());
        let ids = (0..count)
            .map(|_| ast.create_statement(block, StatementKind::Print, Span::default()))
            .collect();
        (block, ids)
    }

    #[test]
    fn insert_after_last_moves_block_tail() {
        let mut ast = Ast::new();
        let (block, ids) = block_with(&mut ast, 2);
        let added = ast.insert_statement_after(ids[1], StatementKind::Return, Span::default());
        assert_eq!(ast.last_statement(block), Some(added));
        assert_eq!(ast.prev_statement(added), Some(ids[1]));
        assert_eq!(ast.block_statements(block), vec![ids[0], ids[1], added]);
    }

    #[test]
    fn destroy_first_and_last_keep_links_consistent() {
        let mut ast = Ast::new();
        let (block, ids) = block_with(&mut ast, 3);
        ast.destroy_statement(ids[0]);
        assert_eq!(ast.first_statement(block), Some(ids[1]));
        assert_eq!(ast.prev_statement(ids[1]), None);
        ast.destroy_statement(ids[2]);
        assert_eq!(ast.last_statement(block), Some(ids[1]));
        assert_eq!(ast.next_statement(ids[1]), None);
        ast.destroy_statement(ids[1]);
        assert_eq!(ast.first_statement(block), None);
        assert_eq!(ast.last_statement(block), None);
    }

    #[test]
    fn take_sub_block_detaches_without_destroying() {
        let mut ast = Ast::new();
        let (_, ids) = block_with(&mut ast, 1);
        let body = ast.create_block(Span::default());
        ast.attach_sub_block(ids[0], body);
        assert_eq!(ast.block(body).owner, BlockOwner::Statement(ids[0]));

        assert_eq!(ast.take_sub_block(ids[0]), Some(body));
        assert_eq!(ast.block(body).owner, BlockOwner::Detached);
        ast.destroy_statement(ids[0]);
        assert!(ast.block_exists(body));
    }

    #[test]
    #[should_panic(expected = "use of destroyed or unknown stmt#0")]
    fn destroyed_handle_panics() {
        let mut ast = Ast::new();
        let (_, ids) = block_with(&mut ast, 1);
        ast.destroy_statement(ids[0]);
        let _ = ast.statement(ids[0]);
    }
}
