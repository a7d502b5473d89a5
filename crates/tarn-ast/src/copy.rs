//! Deep copies.
//!
//! Copies preserve spans, `instantiated` flags and call signatures, so a
//! copied iterator body is as specialized as the template it came from.

use crate::{Ast, BlockId, ExpressionId, StatementId};

impl Ast {
    /// Copy an expression tree. The copy has no parent.
    pub fn copy_expression(&mut self, expression: ExpressionId) -> ExpressionId {
        let source = self.expression(expression).clone();
        let copy = self.create_expression(source.kind, source.span);
        self.expression_mut(copy).signature = source.signature;
        for child in source.children {
            let child_copy = self.copy_expression(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Copy a block with its variables and statements into a new detached block.
    pub fn copy_block(&mut self, block: BlockId) -> BlockId {
        let source = self.block(block).clone();
        let copy = self.create_block(source.span);
        for variable in source.variables {
            let variable = self.variable(variable).clone();
            let default = variable.default.map(|d| self.copy_expression(d));
            self.add_variable(copy, variable.name, variable.kind, default, variable.span);
        }
        let mut cursor = source.first;
        while let Some(statement) = cursor {
            let statement_copy = self.copy_statement_detached(statement, copy);
            self.append_statement(copy, statement_copy);
            cursor = self.statement(statement).next;
        }
        copy
    }

    /// Copy `statement` (with its expression and sub-block) to just after `anchor`.
    pub fn copy_statement_after(&mut self, statement: StatementId, anchor: StatementId) -> StatementId {
        let block = self.statement(anchor).block;
        let copy = self.copy_statement_detached(statement, block);
        self.link_statement_after(anchor, copy);
        copy
    }

    /// Copy every statement of `source` to just after `anchor`, in order.
    ///
    /// Returns the last copy, or `None` when `source` has no statements.
    /// Variables of `source` are not copied; the copies are plain statements
    /// of the destination block.
    pub fn copy_block_statements_after(
        &mut self,
        source: BlockId,
        anchor: StatementId,
    ) -> Option<StatementId> {
        let mut anchor = anchor;
        let mut last = None;
        for statement in self.block_statements(source) {
            anchor = self.copy_statement_after(statement, anchor);
            last = Some(anchor);
        }
        last
    }

    fn copy_statement_detached(&mut self, statement: StatementId, block: BlockId) -> StatementId {
        let source = self.statement(statement).clone();
        let copy = self.alloc_statement(block, source.kind, source.span);
        {
            let node = self.statement_mut(copy);
            node.instantiated = source.instantiated;
            node.queued = source.queued;
        }
        if let Some(expression) = source.expression {
            let expression_copy = self.copy_expression(expression);
            self.attach_expression(copy, expression_copy);
        }
        if let Some(sub_block) = source.sub_block {
            let sub_block_copy = self.copy_block(sub_block);
            self.attach_sub_block(copy, sub_block_copy);
        }
        copy
    }
}
