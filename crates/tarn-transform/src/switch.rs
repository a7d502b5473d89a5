//! Flattening of compile-time type switches.
//!
//! A `switch` on a type value is resolved during specialization: exactly one
//! of its cases is instantiated. Here the switch is replaced by the body of
//! that case, spliced in place, so later passes never see type dispatch.

use tarn_ast::{Ast, BlockId, StatementId, StatementKind};
use tracing::trace;

use crate::error::InlineError;

/// Flatten every instantiated type switch from `first` up to (not including)
/// `last`, and inside the sub-blocks of the statements in that range.
///
/// Returns how many switches were flattened. `first` may be destroyed by the
/// call; re-derive the start of the range from a surviving neighbour.
pub fn flatten_switches(
    ast: &mut Ast,
    first: Option<StatementId>,
    last: Option<StatementId>,
) -> Result<usize, InlineError> {
    let mut flattened = 0;
    let mut cursor = first;
    while let Some(statement) = cursor {
        if Some(statement) == last {
            break;
        }
        let next = ast.next_statement(statement);
        if is_type_switch(ast, statement) {
            flattened += flatten_switch(ast, statement, next)?;
        } else {
            let node = ast.statement(statement);
            if let (true, Some(sub_block)) = (node.instantiated, node.sub_block) {
                flattened += flatten_block_switches(ast, sub_block)?;
            }
        }
        cursor = next;
    }
    Ok(flattened)
}

/// Flatten every instantiated type switch anywhere in `block`.
pub fn flatten_block_switches(ast: &mut Ast, block: BlockId) -> Result<usize, InlineError> {
    let first = ast.first_statement(block);
    flatten_switches(ast, first, None)
}

fn is_type_switch(ast: &Ast, statement: StatementId) -> bool {
    let node = ast.statement(statement);
    node.kind == StatementKind::Switch
        && node.instantiated
        && node.expression.is_some_and(|e| ast.is_type_expression(e))
}

/// Replace `switch` with its selected case's body, then flatten what was
/// spliced in (it may hold nested type switches). `next` is the statement
/// that followed the switch.
fn flatten_switch(
    ast: &mut Ast,
    switch: StatementId,
    next: Option<StatementId>,
) -> Result<usize, InlineError> {
    let selected = find_selected_case(ast, switch)?;
    let body = ast.statement(selected).sub_block;
    trace!(
        target: "inline",
        switch = %switch,
        case = %ast.render_statement(selected),
        "flattening type switch"
    );
    match body {
        Some(body) if ast.first_statement(body).is_some() => {
            ast.move_block_statements_after(body, switch);
            let spliced = ast.next_statement(switch);
            ast.destroy_statement(switch);
            Ok(1 + flatten_switches(ast, spliced, next)?)
        }
        _ => {
            ast.destroy_statement(switch);
            Ok(1)
        }
    }
}

fn find_selected_case(ast: &Ast, switch: StatementId) -> Result<StatementId, InlineError> {
    let node = ast.statement(switch);
    node.sub_block
        .and_then(|cases| {
            ast.block_statements(cases)
                .into_iter()
                .find(|&case| ast.statement(case).instantiated)
        })
        .ok_or_else(|| {
            InlineError::internal("could not find instantiated case statement", Some(node.span))
        })
}
