//! Program builder shared by the integration tests.
//!
//! Every node gets its own span so that error locations can be told apart.

#![allow(dead_code)]

use tarn_ast::{
    Ast, BlockId, ExpressionId, ExpressionKind, FunctionKind, SignatureId, Span, StatementId,
    StatementKind, VariableKind,
};

pub struct Fixture {
    pub ast: Ast,
    offset: u32,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            ast: Ast::new(),
            offset: 0,
        }
    }

    pub fn span(&mut self) -> Span {
        let span = Span::new(self.offset, self.offset + 4);
        self.offset += 5;
        span
    }

    /// An instantiated iterator signature with the given parameters.
    pub fn iterator(&mut self, name: &str, params: &[(&str, Option<i64>)]) -> (SignatureId, BlockId) {
        self.signature(name, FunctionKind::Iterator, params)
    }

    /// An instantiated plain function signature without parameters.
    pub fn function(&mut self, name: &str) -> (SignatureId, BlockId) {
        self.signature(name, FunctionKind::Plain, &[])
    }

    fn signature(
        &mut self,
        name: &str,
        kind: FunctionKind,
        params: &[(&str, Option<i64>)],
    ) -> (SignatureId, BlockId) {
        let span = self.span();
        let function = self.ast.add_function(name, kind, span);
        let signature = self.ast.add_signature(function, true, span);
        let body = self.ast.signature(signature).body;
        for &(param, default) in params {
            let default = default.map(|v| self.int(v));
            let span = self.span();
            self.ast
                .add_variable(body, param, VariableKind::Parameter, default, span);
        }
        (signature, body)
    }

    pub fn local(&mut self, block: BlockId, name: &str) {
        let span = self.span();
        self.ast.add_variable(block, name, VariableKind::Local, None, span);
    }

    // ── Expressions ────────────────────────────────────────────────────

    pub fn ident(&mut self, name: &str) -> ExpressionId {
        let span = self.span();
        self.ast.ident(name, span)
    }

    pub fn int(&mut self, value: i64) -> ExpressionId {
        let span = self.span();
        self.ast.create_expression(ExpressionKind::Integer(value), span)
    }

    pub fn string(&mut self, value: &str) -> ExpressionId {
        let span = self.span();
        self.ast
            .create_expression(ExpressionKind::String(value.into()), span)
    }

    pub fn binary(&mut self, kind: ExpressionKind, lhs: ExpressionId, rhs: ExpressionId) -> ExpressionId {
        let span = self.span();
        self.ast.binary(kind, lhs, rhs, span)
    }

    pub fn call(&mut self, name: &str, args: &[ExpressionId], signature: Option<SignatureId>) -> ExpressionId {
        let access = self.ident(name);
        let span = self.span();
        self.ast.call(access, args, signature, span)
    }

    /// `receiver.member(args)`.
    pub fn method_call(
        &mut self,
        receiver: &str,
        member: &str,
        args: &[ExpressionId],
        signature: Option<SignatureId>,
    ) -> ExpressionId {
        let receiver = self.ident(receiver);
        let member = self.ident(member);
        let span = self.span();
        let access = self.ast.compound(ExpressionKind::Dot, &[receiver, member], span);
        self.ast.call(access, args, signature, span)
    }

    // ── Statements ─────────────────────────────────────────────────────

    pub fn statement(
        &mut self,
        block: BlockId,
        kind: StatementKind,
        expression: Option<ExpressionId>,
    ) -> StatementId {
        let span = self.span();
        let statement = self.ast.create_statement(block, kind, span);
        if let Some(expression) = expression {
            self.ast.attach_expression(statement, expression);
        }
        statement
    }

    pub fn print(&mut self, block: BlockId, name: &str) -> StatementId {
        let value = self.ident(name);
        self.statement(block, StatementKind::Print, Some(value))
    }

    pub fn yield_value(&mut self, block: BlockId, value: ExpressionId) -> StatementId {
        self.statement(block, StatementKind::Yield, Some(value))
    }

    pub fn assign(&mut self, block: BlockId, target: &str, value: ExpressionId) -> StatementId {
        let target = self.ident(target);
        let pair = self.binary(ExpressionKind::Equals, target, value);
        self.statement(block, StatementKind::Assign, Some(pair))
    }

    /// A statement of `kind` owning a fresh sub-block, which is returned too.
    pub fn nested(
        &mut self,
        block: BlockId,
        kind: StatementKind,
        expression: Option<ExpressionId>,
    ) -> (StatementId, BlockId) {
        let statement = self.statement(block, kind, expression);
        let span = self.span();
        let sub_block = self.ast.create_block(span);
        self.ast.attach_sub_block(statement, sub_block);
        (statement, sub_block)
    }

    /// `foreach variable in call { }`; the loop body is returned empty.
    pub fn foreach(&mut self, block: BlockId, variable: &str, call: ExpressionId) -> (StatementId, BlockId) {
        let variable = self.ident(variable);
        let header = self.binary(ExpressionKind::Equals, variable, call);
        self.nested(block, StatementKind::Foreach, Some(header))
    }

    /// `switch typeof(T)` with one case per `(type, instantiated)`; returns
    /// the case bodies in order.
    pub fn type_switch(&mut self, block: BlockId, cases: &[(&str, bool)]) -> (StatementId, Vec<BlockId>) {
        let t = self.ident("T");
        let span = self.span();
        let discriminant = self.ast.compound(ExpressionKind::TypeOf, &[t], span);
        let (switch, cases_block) = self.nested(block, StatementKind::Switch, Some(discriminant));
        let mut bodies = Vec::new();
        for &(type_name, instantiated) in cases {
            let span = self.span();
            let label = self
                .ast
                .create_expression(ExpressionKind::TypeName(type_name.into()), span);
            let (case, body) = self.nested(cases_block, StatementKind::Case, Some(label));
            self.ast.set_instantiated(case, instantiated);
            bodies.push(body);
        }
        (switch, bodies)
    }
}
