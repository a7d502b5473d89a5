//! The seam between transformations and signature binding.
//!
//! Statements spliced in by a transformation are *queued*: they exist in the
//! tree but their names and call targets have not been resolved against the
//! enclosing signature yet. The driver hands exactly that range to a
//! [`Rebind`] implementation and waits for it before touching the code again.

use tarn_ast::{
    Ast, BlockId, ExpressionId, ExpressionKind, SignatureId, StatementId, StatementKind, VariableKind,
};
use tracing::trace;

use crate::error::InlineError;

/// One synchronous binding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    /// The signature the statements now belong to.
    pub signature: Option<SignatureId>,
    /// The newly spliced top-level statements, in block order. Nested
    /// statements are reached through their sub-blocks.
    pub statements: Vec<StatementId>,
    pub in_iterator: bool,
}

/// Binds freshly spliced statements.
///
/// Implementations must only look at `request.statements` (and what is
/// nested in them), and must clear their `queued` flag once confirmed.
pub trait Rebind {
    fn rebind(&mut self, ast: &mut Ast, request: &BindRequest) -> Result<(), InlineError>;
}

impl<R: Rebind + ?Sized> Rebind for &mut R {
    fn rebind(&mut self, ast: &mut Ast, request: &BindRequest) -> Result<(), InlineError> {
        (**self).rebind(ast, request)
    }
}

/// Minimal binder for programs whose types are already fully specialized.
///
/// Declares assignment targets and loop variables that are not yet variables
/// of the signature body, resolves unbound calls by function name, and
/// confirms every statement it visits.
#[derive(Debug, Default)]
pub struct SignatureBinder {
    confirmed: usize,
    requests: usize,
}

impl SignatureBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements confirmed so far, nested ones included.
    pub fn confirmed(&self) -> usize {
        self.confirmed
    }

    pub fn requests(&self) -> usize {
        self.requests
    }

    fn bind_statement(&mut self, ast: &mut Ast, scope: Option<BlockId>, statement: StatementId) {
        let node = ast.statement(statement);
        let (kind, expression, sub_block) = (node.kind, node.expression, node.sub_block);

        if let (Some(scope), Some(expression)) = (scope, expression) {
            if matches!(kind, StatementKind::Assign | StatementKind::Foreach) {
                declare_target(ast, scope, expression);
            }
        }
        if let Some(expression) = expression {
            resolve_calls(ast, expression);
        }
        ast.set_queued(statement, false);
        self.confirmed += 1;

        if let Some(sub_block) = sub_block {
            for nested in ast.block_statements(sub_block) {
                self.bind_statement(ast, scope, nested);
            }
        }
    }
}

impl Rebind for SignatureBinder {
    fn rebind(&mut self, ast: &mut Ast, request: &BindRequest) -> Result<(), InlineError> {
        self.requests += 1;
        let scope = request.signature.map(|s| ast.signature(s).body);
        for &statement in &request.statements {
            if !ast.statement_exists(statement) {
                return Err(InlineError::internal(
                    format!("{statement} was queued for binding but no longer exists"),
                    None,
                ));
            }
            self.bind_statement(ast, scope, statement);
        }
        trace!(
            target: "inline",
            signature = ?request.signature,
            statements = request.statements.len(),
            "rebound spliced statements"
        );
        Ok(())
    }
}

/// Declare the identifier on the left of an `Equals` pair as a local of `scope`.
fn declare_target(ast: &mut Ast, scope: BlockId, pair: ExpressionId) {
    let Some(target) = ast.child(pair, 0) else {
        return;
    };
    let span = ast.expression(target).span;
    if let ExpressionKind::Ident(name) = &ast.expression(target).kind {
        if ast.find_variable(scope, name).is_none() {
            let name = name.clone();
            ast.add_variable(scope, name, VariableKind::Local, None, span);
        }
    }
}

/// Bind calls without a signature to the first instantiated signature of the
/// function they name.
fn resolve_calls(ast: &mut Ast, expression: ExpressionId) {
    for id in ast.expression_tree(expression) {
        let node = ast.expression(id);
        if node.kind != ExpressionKind::Call || node.signature.is_some() {
            continue;
        }
        let Some(access) = ast.child(id, 0) else {
            continue;
        };
        let callee = if ast.is_method_access(access) {
            ast.child(access, 1)
        } else {
            Some(access)
        };
        let name = match callee.map(|c| ast.expression(c)) {
            Some(callee) => match &callee.kind {
                ExpressionKind::Ident(name) => name.clone(),
                _ => continue,
            },
            None => continue,
        };
        let signature = ast.find_function(&name).and_then(|f| {
            ast.function(f)
                .signatures
                .iter()
                .copied()
                .find(|&s| ast.signature(s).instantiated)
        });
        ast.set_signature(id, signature);
    }
}
