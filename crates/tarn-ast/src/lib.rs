//! Arena-backed AST model for the Tarn middle-end.
//!
//! Blocks, statements, expressions and variables refer to each other in every
//! direction (a statement knows its block, a block knows the statement that
//! owns it, expressions know their parents). All of them live in a single
//! [`Ast`] arena and are addressed through `Copy` handles from [`ids`], so a
//! splice or a destroy can never leave a dangling Rust reference behind.
//!
//! # Architecture
//!
//! - [`ids`]: handle newtypes
//! - [`block`]: blocks, variables, statement-list splicing
//! - [`statement`]: statement creation, linking and destruction
//! - [`expression`]: expression trees
//! - [`function`]: function templates and their signatures
//! - [`copy`]: deep copies of expressions, statements and blocks
//! - [`scope`]: renaming of colliding variable names and their restoration
//! - [`pretty`]: indented text dumps of blocks
//! - [`validate`]: handle checks for deserialized programs

pub mod block;
pub mod copy;
pub mod expression;
pub mod function;
pub mod ids;
pub mod pretty;
pub mod scope;
pub mod statement;
pub mod validate;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub use block::{Block, BlockOwner, Variable, VariableKind};
pub use expression::{Expression, ExpressionKind, ExpressionParent};
pub use function::{Function, FunctionKind, Signature};
pub use ids::{BlockId, ExpressionId, FunctionId, SignatureId, StatementId, VariableId};
pub use scope::Renames;
pub use statement::{Statement, StatementKind};
pub use validate::DanglingHandle;
pub use tarn_common::Span;

/// The whole program: every node of every function, in one arena.
///
/// Destroyed nodes leave an empty slot behind; their handles are never reused.
/// Looking up a destroyed or unknown handle is a compiler bug and panics with
/// the handle in the message.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Ast {
    pub(crate) blocks: Vec<Option<Block>>,
    pub(crate) statements: Vec<Option<Statement>>,
    pub(crate) expressions: Vec<Option<Expression>>,
    pub(crate) variables: Vec<Option<Variable>>,
    pub(crate) functions: Vec<Function>,
    pub(crate) signatures: Vec<Signature>,
}

fn live<'a, T>(slots: &'a [Option<T>], index: usize, id: impl Display) -> &'a T {
    match slots.get(index) {
        Some(Some(node)) => node,
        _ => panic!("use of destroyed or unknown {id}"),
    }
}

fn live_mut<T>(slots: &mut [Option<T>], index: usize, id: impl Display) -> &mut T {
    match slots.get_mut(index) {
        Some(Some(node)) => node,
        _ => panic!("use of destroyed or unknown {id}"),
    }
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&self, id: BlockId) -> &Block {
        live(&self.blocks, id.index(), id)
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block {
        live_mut(&mut self.blocks, id.index(), id)
    }

    pub fn statement(&self, id: StatementId) -> &Statement {
        live(&self.statements, id.index(), id)
    }

    pub(crate) fn statement_mut(&mut self, id: StatementId) -> &mut Statement {
        live_mut(&mut self.statements, id.index(), id)
    }

    pub fn expression(&self, id: ExpressionId) -> &Expression {
        live(&self.expressions, id.index(), id)
    }

    pub(crate) fn expression_mut(&mut self, id: ExpressionId) -> &mut Expression {
        live_mut(&mut self.expressions, id.index(), id)
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        live(&self.variables, id.index(), id)
    }

    pub(crate) fn variable_mut(&mut self, id: VariableId) -> &mut Variable {
        live_mut(&mut self.variables, id.index(), id)
    }

    /// Whether `id` still names a live statement.
    pub fn statement_exists(&self, id: StatementId) -> bool {
        matches!(self.statements.get(id.index()), Some(Some(_)))
    }

    pub fn expression_exists(&self, id: ExpressionId) -> bool {
        matches!(self.expressions.get(id.index()), Some(Some(_)))
    }

    pub fn block_exists(&self, id: BlockId) -> bool {
        matches!(self.blocks.get(id.index()), Some(Some(_)))
    }

    /// Number of live statements in the whole arena.
    pub fn live_statement_count(&self) -> usize {
        self.statements.iter().filter(|s| s.is_some()).count()
    }

    /// Number of live expressions in the whole arena.
    pub fn live_expression_count(&self) -> usize {
        self.expressions.iter().filter(|e| e.is_some()).count()
    }
}
