//! Handle checks for programs that did not come out of this crate's builders.
//!
//! Lookups panic on dangling handles, so a deserialized [`Ast`] is checked
//! once up front and rejected with a [`DanglingHandle`] instead.

use std::fmt;

use crate::{
    Ast, BlockId, BlockOwner, ExpressionId, ExpressionParent, FunctionId, SignatureId, StatementId,
    VariableId,
};

/// A live node that refers to a destroyed or out-of-range node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingHandle {
    /// The node holding the reference, e.g. `stmt#3`.
    pub holder: String,
    /// The missing node, e.g. `block#9`.
    pub target: String,
}

impl fmt::Display for DanglingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} refers to missing {}", self.holder, self.target)
    }
}

impl std::error::Error for DanglingHandle {}

fn dangling(holder: impl fmt::Display, target: impl fmt::Display) -> DanglingHandle {
    DanglingHandle {
        holder: holder.to_string(),
        target: target.to_string(),
    }
}

impl Ast {
    /// Check that every handle held by a live node names a live node, and
    /// that every block's statement list ends.
    pub fn validate(&self) -> Result<(), DanglingHandle> {
        for (index, block) in self.blocks.iter().enumerate() {
            let Some(block) = block else { continue };
            let id = BlockId(index as u32);
            match block.owner {
                BlockOwner::Detached => {}
                BlockOwner::Statement(s) => self.check_statement(id, s)?,
                BlockOwner::Function(f) => self.check_function(id, f)?,
                BlockOwner::Signature(s) => self.check_signature(id, s)?,
            }
            for statement in block.first.iter().chain(block.last.iter()) {
                self.check_statement(id, *statement)?;
            }
            for &variable in &block.variables {
                self.check_variable(id, variable)?;
            }
            self.check_list_ends(id)?;
        }

        for (index, statement) in self.statements.iter().enumerate() {
            let Some(statement) = statement else { continue };
            let id = StatementId(index as u32);
            self.check_block(id, statement.block)?;
            for neighbour in statement.prev.iter().chain(statement.next.iter()) {
                self.check_statement(id, *neighbour)?;
            }
            if let Some(expression) = statement.expression {
                self.check_expression(id, expression)?;
            }
            if let Some(block) = statement.sub_block {
                self.check_block(id, block)?;
            }
        }

        for (index, expression) in self.expressions.iter().enumerate() {
            let Some(expression) = expression else { continue };
            let id = ExpressionId(index as u32);
            for &child in &expression.children {
                self.check_expression(id, child)?;
            }
            match expression.parent {
                ExpressionParent::None => {}
                ExpressionParent::Statement(s) => self.check_statement(id, s)?,
                ExpressionParent::Expression(e) => self.check_expression(id, e)?,
                ExpressionParent::Variable(v) => self.check_variable(id, v)?,
            }
            if let Some(signature) = expression.signature {
                self.check_signature(id, signature)?;
            }
        }

        for (index, variable) in self.variables.iter().enumerate() {
            let Some(variable) = variable else { continue };
            let id = VariableId(index as u32);
            self.check_block(id, variable.block)?;
            if let Some(default) = variable.default {
                self.check_expression(id, default)?;
            }
        }

        for (index, function) in self.functions.iter().enumerate() {
            let id = FunctionId(index as u32);
            for &signature in &function.signatures {
                self.check_signature(id, signature)?;
            }
        }

        for (index, signature) in self.signatures.iter().enumerate() {
            let id = SignatureId(index as u32);
            self.check_function(id, signature.function)?;
            self.check_block(id, signature.body)?;
        }
        Ok(())
    }

    fn check_block(&self, holder: impl fmt::Display, id: BlockId) -> Result<(), DanglingHandle> {
        if self.block_exists(id) {
            Ok(())
        } else {
            Err(dangling(holder, id))
        }
    }

    fn check_statement(&self, holder: impl fmt::Display, id: StatementId) -> Result<(), DanglingHandle> {
        if self.statement_exists(id) {
            Ok(())
        } else {
            Err(dangling(holder, id))
        }
    }

    fn check_expression(&self, holder: impl fmt::Display, id: ExpressionId) -> Result<(), DanglingHandle> {
        if self.expression_exists(id) {
            Ok(())
        } else {
            Err(dangling(holder, id))
        }
    }

    fn check_variable(&self, holder: impl fmt::Display, id: VariableId) -> Result<(), DanglingHandle> {
        match self.variables.get(id.index()) {
            Some(Some(_)) => Ok(()),
            _ => Err(dangling(holder, id)),
        }
    }

    fn check_function(&self, holder: impl fmt::Display, id: FunctionId) -> Result<(), DanglingHandle> {
        if id.index() < self.functions.len() {
            Ok(())
        } else {
            Err(dangling(holder, id))
        }
    }

    fn check_signature(&self, holder: impl fmt::Display, id: SignatureId) -> Result<(), DanglingHandle> {
        if id.index() < self.signatures.len() {
            Ok(())
        } else {
            Err(dangling(holder, id))
        }
    }

    /// Walk `block`'s list from its checked head; more steps than there are
    /// statements means a cycle.
    fn check_list_ends(&self, block: BlockId) -> Result<(), DanglingHandle> {
        let mut cursor = self.block(block).first;
        let mut steps = 0;
        while let Some(statement) = cursor {
            if steps > self.statements.len() {
                return Err(dangling(block, "end of statement list"));
            }
            let next = self.statement(statement).next;
            if let Some(next) = next {
                self.check_statement(statement, next)?;
            }
            cursor = next;
            steps += 1;
        }
        Ok(())
    }
}
