//! Binding of iterator call arguments to the iterator's parameters.

use tarn_ast::{Ast, BlockId, ExpressionId, ExpressionKind, StatementId, StatementKind, VariableId};

use crate::error::InlineError;

/// Emit `param = value` for every parameter of `iterator_block`, in
/// declaration order, directly after `anchor`. Returns the last assignment,
/// or `anchor` itself when the iterator has no parameters.
///
/// Arguments bind positionally to the leading parameters; trailing
/// parameters without an argument get a copy of their default. When
/// `receiver` is given (a method-style call), the first parameter is the
/// receiver and binds to it instead of consuming an argument.
pub(crate) fn bind_parameters(
    ast: &mut Ast,
    anchor: StatementId,
    iterator_block: BlockId,
    arguments: ExpressionId,
    receiver: Option<ExpressionId>,
) -> Result<StatementId, InlineError> {
    let parameters = ast.parameters(iterator_block).to_vec();
    let (receiver_param, formals) = match (receiver, parameters.split_first()) {
        (_, None) => return Ok(anchor),
        (Some(receiver), Some((&self_param, rest))) => (Some((self_param, receiver)), rest),
        (None, Some(_)) => (None, parameters.as_slice()),
    };
    let actuals = ast.children(arguments).to_vec();
    let span = ast.statement(anchor).span;
    if actuals.len() > formals.len() {
        return Err(InlineError::internal(
            format!(
                "iterator called with {} argument(s) but declares {} parameter(s)",
                actuals.len(),
                formals.len()
            ),
            Some(span),
        ));
    }

    let mut anchor = anchor;
    if let Some((self_param, receiver)) = receiver_param {
        anchor = assign_variable(ast, anchor, self_param, receiver);
    }
    for (position, &formal) in formals.iter().enumerate() {
        let value = match actuals.get(position) {
            Some(&argument) => argument,
            None => ast.variable(formal).default.ok_or_else(|| {
                InlineError::internal(
                    format!(
                        "parameter `{}` has no argument and no default value",
                        ast.variable(formal).name
                    ),
                    Some(span),
                )
            })?,
        };
        anchor = assign_variable(ast, anchor, formal, value);
    }
    Ok(anchor)
}

/// Insert `variable = copy(value)` after `anchor`, at the anchor's location.
fn assign_variable(
    ast: &mut Ast,
    anchor: StatementId,
    variable: VariableId,
    value: ExpressionId,
) -> StatementId {
    let span = ast.statement(anchor).span;
    let value = ast.copy_expression(value);
    let target = ast.ident(ast.variable(variable).name.clone(), span);
    let pair = ast.binary(ExpressionKind::Equals, target, value, span);
    let assignment = ast.insert_statement_after(anchor, StatementKind::Assign, span);
    ast.attach_expression(assignment, pair);
    assignment
}
