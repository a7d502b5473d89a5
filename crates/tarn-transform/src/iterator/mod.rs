//! Iterator inlining.
//!
//! `foreach x in iter(args)` over an instantiated iterator signature becomes:
//!
//! ```text
//! param_1 = arg_1          <- one per parameter, defaults filled in
//! ...
//! <iterator body>          <- deep copy; its single `yield v` is now `x = v`
//!                             followed by the original loop body
//! ```
//!
//! The iterator template itself is never modified: colliding local names are
//! renamed until the spliced code has been rebound, then restored.

mod params;
mod yields;

use tarn_ast::{
    Ast, BlockId, ExpressionId, ExpressionKind, FunctionKind, SignatureId, Span, StatementId,
    StatementKind,
};
use tracing::{debug, info};

use crate::context::InlineContext;
use crate::error::InlineError;
use crate::rebind::{BindRequest, Rebind};
use crate::switch::flatten_switches;

use params::bind_parameters;
use yields::{find_yield, rewrite_yield};

/// Counters collected over one run of the inliner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStats {
    /// `foreach` statements replaced by an iterator body.
    pub call_sites: usize,
    /// Type switches flattened inside spliced code.
    pub switches_flattened: usize,
    /// Top-level statements handed to the rebinder.
    pub statements_rebound: usize,
    /// Signature bodies swept.
    pub signatures: usize,
}

/// Drives iterator inlining over an [`Ast`], handing every spliced range to
/// a [`Rebind`] implementation.
pub struct IteratorInliner<'a, R: Rebind + ?Sized> {
    ast: &'a mut Ast,
    rebinder: &'a mut R,
    ctx: InlineContext,
    stats: InlineStats,
}

impl<'a, R: Rebind + ?Sized> IteratorInliner<'a, R> {
    pub fn new(ast: &'a mut Ast, rebinder: &'a mut R) -> Self {
        Self::with_context(ast, rebinder, InlineContext::default())
    }

    pub fn with_context(ast: &'a mut Ast, rebinder: &'a mut R, ctx: InlineContext) -> Self {
        Self {
            ast,
            rebinder,
            ctx,
            stats: InlineStats::default(),
        }
    }

    pub fn context(&self) -> InlineContext {
        self.ctx
    }

    pub fn stats(&self) -> InlineStats {
        self.stats
    }

    /// Sweep the body of every instantiated signature.
    pub fn run(&mut self) -> Result<InlineStats, InlineError> {
        let signatures: Vec<SignatureId> = self
            .ast
            .signature_ids()
            .filter(|&s| self.ast.signature(s).instantiated)
            .collect();
        for signature in signatures {
            self.ctx = InlineContext::for_signature(signature);
            let body = self.ast.signature(signature).body;
            let before = self.stats.call_sites;
            self.inline_block_iterators(body, body)?;
            self.stats.signatures += 1;
            debug!(
                target: "inline",
                signature = %signature,
                call_sites = self.stats.call_sites - before,
                "swept signature"
            );
        }
        info!(
            target: "inline",
            call_sites = self.stats.call_sites,
            switches = self.stats.switches_flattened,
            rebound = self.stats.statements_rebound,
            signatures = self.stats.signatures,
            "iterator inlining finished"
        );
        Ok(self.stats)
    }

    /// Inline every instantiated `foreach` in `block` until none is left,
    /// then do the same inside every sub-block. Names are checked for
    /// collisions against the variables of `scope`.
    pub fn inline_block_iterators(&mut self, scope: BlockId, block: BlockId) -> Result<(), InlineError> {
        let mut cursor = self.ast.first_statement(block);
        while let Some(statement) = cursor {
            let node = self.ast.statement(statement);
            cursor = if node.kind == StatementKind::Foreach && node.instantiated {
                // Spliced code starts at the resume point and may itself
                // contain foreach loops, so scanning continues from there.
                self.inline_iterator(scope, statement)?
            } else {
                node.next
            };
        }
        for statement in self.ast.block_statements(block) {
            if let Some(sub_block) = self.ast.statement(statement).sub_block {
                self.inline_block_iterators(scope, sub_block)?;
            }
        }
        Ok(())
    }

    /// Inline a single `foreach` statement.
    ///
    /// Returns where a traversal of the foreach's block should continue: the
    /// first spliced statement, or whatever followed the foreach if nothing
    /// was spliced (`None` at the end of the block). The foreach handle is
    /// dead afterwards.
    pub fn inline_iterator(
        &mut self,
        scope: BlockId,
        foreach: StatementId,
    ) -> Result<Option<StatementId>, InlineError> {
        let saved = self.ctx.in_iterator;
        self.ctx.in_iterator = true;
        let result = self.splice_iterator(scope, foreach);
        self.ctx.in_iterator = saved;
        result
    }

    fn splice_iterator(
        &mut self,
        scope: BlockId,
        foreach: StatementId,
    ) -> Result<Option<StatementId>, InlineError> {
        let node = self.ast.statement(foreach);
        let (span, block, prev, next) = (node.span, node.block, node.prev, node.next);
        let header = node
            .expression
            .ok_or_else(|| InlineError::internal("foreach without a header", Some(span)))?;
        let call = foreach_call(self.ast, header, span)?;
        let call_span = self.ast.expression(call).span;
        let signature = iterator_signature(self.ast, call)
            .ok_or(InlineError::NotAnIterator { span: call_span })?;
        let iterator_block = self.ast.signature(signature).body;

        debug!(
            target: "inline",
            foreach = %foreach,
            signature = %signature,
            call = %self.ast.render_expression(call),
            "inlining iterator"
        );

        // The loop variable is declared by the rebind after splicing, so it
        // does not show up among the scope's variables yet.
        let loop_variable = loop_variable_name(self.ast, header);
        let reserved: Vec<&str> = loop_variable.as_deref().into_iter().collect();
        let renames = self.ast.resolve_name_conflicts(iterator_block, scope, &reserved);
        if !renames.is_empty() {
            debug!(target: "inline", renamed = renames.len(), "renamed colliding iterator locals");
        }
        let result = self
            .splice_renamed(foreach, header, call, iterator_block, next)
            .and_then(|()| self.settle_range(block, prev, next));
        self.ast.restore_names(iterator_block, renames);
        let (start, flattened) = result?;

        self.stats.call_sites += 1;
        self.stats.switches_flattened += flattened;
        Ok(start)
    }

    /// Flatten the spliced range `(prev, next)` of `block` and hand it to the
    /// rebinder. Returns the range's new first statement and the number of
    /// switches flattened.
    fn settle_range(
        &mut self,
        block: BlockId,
        prev: Option<StatementId>,
        next: Option<StatementId>,
    ) -> Result<(Option<StatementId>, usize), InlineError> {
        let start = match prev {
            Some(prev) => self.ast.next_statement(prev),
            None => self.ast.first_statement(block),
        };
        let flattened = flatten_switches(self.ast, start, next)?;

        // Flattening may have destroyed `start`; `prev` always survives.
        let start = match prev {
            Some(prev) => self.ast.next_statement(prev),
            None => self.ast.first_statement(block),
        };
        let statements = self.ast.statement_range(start, next);
        for &statement in &statements {
            mark_queued(self.ast, statement);
        }
        if !statements.is_empty() {
            let request = BindRequest {
                signature: self.ctx.signature,
                statements,
                in_iterator: self.ctx.in_iterator,
            };
            self.rebinder.rebind(self.ast, &request)?;
            self.stats.statements_rebound += request.statements.len();
        }
        Ok((start, flattened))
    }

    /// Steps run while the iterator's colliding names are renamed: bind the
    /// parameters, copy the body, drop the foreach and turn the yield into
    /// the loop variable assignment.
    fn splice_renamed(
        &mut self,
        foreach: StatementId,
        header: ExpressionId,
        call: ExpressionId,
        iterator_block: BlockId,
        next: Option<StatementId>,
    ) -> Result<(), InlineError> {
        let ast = &mut *self.ast;
        let call_span = ast.expression(call).span;
        let (access, arguments) = match (ast.child(call, 0), ast.child(call, 1)) {
            (Some(access), Some(arguments)) => (access, arguments),
            _ => {
                return Err(InlineError::internal(
                    "iterator call without access or argument list",
                    Some(call_span),
                ))
            }
        };
        let receiver = if ast.is_method_access(access) {
            ast.child(access, 0)
        } else {
            None
        };

        let anchor = bind_parameters(ast, foreach, iterator_block, arguments, receiver)?;
        ast.copy_block_statements_after(iterator_block, anchor);

        let first = ast.next_statement(foreach);
        let body = ast.take_sub_block(foreach);
        // The header outlives the foreach; the yield rewrite consumes it.
        ast.take_expression(foreach);
        ast.destroy_statement(foreach);

        let found = find_yield(ast, first, next, call_span);
        let yielded = match found {
            Ok(yielded) => yielded,
            Err(err) => {
                ast.destroy_expression(header);
                if let Some(body) = body {
                    ast.destroy_block(body);
                }
                return Err(err);
            }
        };
        rewrite_yield(ast, yielded, header)?;
        if let Some(body) = body {
            ast.move_block_statements_after(body, yielded);
            ast.destroy_block(body);
        }
        Ok(())
    }
}

/// Inline every instantiated `foreach` in the program.
pub fn inline_iterators<R: Rebind + ?Sized>(
    ast: &mut Ast,
    rebinder: &mut R,
) -> Result<InlineStats, InlineError> {
    IteratorInliner::new(ast, rebinder).run()
}

/// Inline one `foreach` found outside a full sweep. See
/// [`IteratorInliner::inline_iterator`] for the returned resume point.
pub fn inline_iterator<R: Rebind + ?Sized>(
    ctx: InlineContext,
    ast: &mut Ast,
    rebinder: &mut R,
    scope: BlockId,
    foreach: StatementId,
) -> Result<Option<StatementId>, InlineError> {
    IteratorInliner::with_context(ast, rebinder, ctx).inline_iterator(scope, foreach)
}

/// The call of a foreach header `Equals[access, call]`.
fn foreach_call(ast: &Ast, header: ExpressionId, span: Span) -> Result<ExpressionId, InlineError> {
    match (&ast.expression(header).kind, ast.child(header, 0), ast.child(header, 1)) {
        (ExpressionKind::Equals, Some(_), Some(call)) => Ok(call),
        _ => Err(InlineError::internal(
            "foreach header is not `variable in call`",
            Some(span),
        )),
    }
}

/// Name of the loop variable in a `var = call` header.
fn loop_variable_name(ast: &Ast, header: ExpressionId) -> Option<String> {
    let access = ast.child(header, 0)?;
    match &ast.expression(access).kind {
        ExpressionKind::Ident(name) => Some(name.clone()),
        _ => None,
    }
}

fn iterator_signature(ast: &Ast, call: ExpressionId) -> Option<SignatureId> {
    let node = ast.expression(call);
    if node.kind != ExpressionKind::Call {
        return None;
    }
    let signature = node.signature?;
    let function = ast.signature(signature).function;
    (ast.function(function).kind == FunctionKind::Iterator).then_some(signature)
}

fn mark_queued(ast: &mut Ast, statement: StatementId) {
    ast.set_queued(statement, true);
    if let Some(sub_block) = ast.statement(statement).sub_block {
        for nested in ast.block_statements(sub_block) {
            mark_queued(ast, nested);
        }
    }
}
