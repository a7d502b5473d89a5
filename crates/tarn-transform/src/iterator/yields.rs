//! Locating the single yield of a spliced iterator body and turning it into
//! the loop variable assignment.

use tarn_ast::{Ast, ExpressionId, ExpressionKind, Span, StatementId, StatementKind};

use crate::error::InlineError;

/// Find the one instantiated yield in `[first, last)`, searching nested
/// blocks of instantiated statements. `call_site` locates the error when
/// there is no yield at all.
pub(crate) fn find_yield(
    ast: &Ast,
    first: Option<StatementId>,
    last: Option<StatementId>,
    call_site: Span,
) -> Result<StatementId, InlineError> {
    let mut found = None;
    for statement in ast.statement_range(first, last) {
        search_statement(ast, statement, &mut found)?;
    }
    found.ok_or(InlineError::NoYield { span: call_site })
}

fn search_statement(
    ast: &Ast,
    statement: StatementId,
    found: &mut Option<StatementId>,
) -> Result<(), InlineError> {
    let node = ast.statement(statement);
    if !node.instantiated {
        return Ok(());
    }
    if node.kind == StatementKind::Yield {
        if let Some(first) = *found {
            return Err(InlineError::MultipleYields {
                span: node.span,
                first: ast.statement(first).span,
            });
        }
        *found = Some(statement);
        return Ok(());
    }
    if let Some(sub_block) = node.sub_block {
        for nested in ast.block_statements(sub_block) {
            search_statement(ast, nested, found)?;
        }
    }
    Ok(())
}

/// Turn `yield value` into `access = value`, consuming the foreach header
/// `Equals[access, call]`: the access is reused, the call and the header
/// itself are destroyed.
pub(crate) fn rewrite_yield(
    ast: &mut Ast,
    yield_statement: StatementId,
    header: ExpressionId,
) -> Result<(), InlineError> {
    let span = ast.statement(yield_statement).span;
    let access = ast
        .child(header, 0)
        .ok_or_else(|| InlineError::internal("foreach without a loop variable", Some(span)))?;
    let value = ast
        .take_expression(yield_statement)
        .ok_or_else(|| InlineError::internal("yield without a value", Some(span)))?;
    ast.detach_expression(access);
    ast.destroy_expression(header);

    let assignment = ast.binary(ExpressionKind::Equals, access, value, span);
    ast.set_statement_kind(yield_statement, StatementKind::Assign);
    ast.attach_expression(yield_statement, assignment);
    Ok(())
}
