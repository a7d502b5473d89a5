//! Expression trees.

use serde::{Deserialize, Serialize};

use crate::{Ast, ExpressionId, SignatureId, Span, StatementId, VariableId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Ident(String),
    Integer(i64),
    String(String),
    Bool(bool),
    /// `[access, List(arguments)]`.
    Call,
    /// `[receiver, Ident(member)]`; a call whose access is a `Dot` is a method call.
    Dot,
    List,
    /// `[target, value]`: assignments and foreach headers.
    Equals,
    Add,
    Sub,
    Mul,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    /// A type used as a value, e.g. a switch case label.
    TypeName(String),
    /// `typeof(child)`.
    TypeOf,
}

impl ExpressionKind {
    pub fn binary_operator(&self) -> Option<&'static str> {
        Some(match self {
            ExpressionKind::Equals => "=",
            ExpressionKind::Add => "+",
            ExpressionKind::Sub => "-",
            ExpressionKind::Mul => "*",
            ExpressionKind::Lt => "<",
            ExpressionKind::Gt => ">",
            ExpressionKind::Le => "<=",
            ExpressionKind::Ge => ">=",
            ExpressionKind::Eq => "==",
            ExpressionKind::Ne => "!=",
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionParent {
    None,
    Statement(StatementId),
    Expression(ExpressionId),
    /// Default value of a parameter.
    Variable(VariableId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
    pub parent: ExpressionParent,
    pub children: Vec<ExpressionId>,
    /// Signature a `Call` was bound to.
    pub signature: Option<SignatureId>,
}

impl Ast {
    pub fn create_expression(&mut self, kind: ExpressionKind, span: Span) -> ExpressionId {
        let id = ExpressionId(self.expressions.len() as u32);
        self.expressions.push(Some(Expression {
            kind,
            span,
            parent: ExpressionParent::None,
            children: Vec::new(),
            signature: None,
        }));
        id
    }

    pub fn ident(&mut self, name: impl Into<String>, span: Span) -> ExpressionId {
        self.create_expression(ExpressionKind::Ident(name.into()), span)
    }

    /// A node of `kind` whose children are `children`, in order.
    pub fn compound(
        &mut self,
        kind: ExpressionKind,
        children: &[ExpressionId],
        span: Span,
    ) -> ExpressionId {
        let id = self.create_expression(kind, span);
        for &child in children {
            self.append_child(id, child);
        }
        id
    }

    pub fn binary(
        &mut self,
        kind: ExpressionKind,
        lhs: ExpressionId,
        rhs: ExpressionId,
        span: Span,
    ) -> ExpressionId {
        debug_assert!(kind.binary_operator().is_some(), "{kind:?} is not binary");
        self.compound(kind, &[lhs, rhs], span)
    }

    /// `access(arguments...)`, optionally already bound to `signature`.
    pub fn call(
        &mut self,
        access: ExpressionId,
        arguments: &[ExpressionId],
        signature: Option<SignatureId>,
        span: Span,
    ) -> ExpressionId {
        let list = self.compound(ExpressionKind::List, arguments, span);
        let call = self.compound(ExpressionKind::Call, &[access, list], span);
        self.expression_mut(call).signature = signature;
        call
    }

    pub fn set_signature(&mut self, expression: ExpressionId, signature: Option<SignatureId>) {
        self.expression_mut(expression).signature = signature;
    }

    pub fn children(&self, expression: ExpressionId) -> &[ExpressionId] {
        &self.expression(expression).children
    }

    pub fn child(&self, expression: ExpressionId, index: usize) -> Option<ExpressionId> {
        self.expression(expression).children.get(index).copied()
    }

    /// Whether the expression denotes a type rather than a runtime value.
    pub fn is_type_expression(&self, expression: ExpressionId) -> bool {
        matches!(
            self.expression(expression).kind,
            ExpressionKind::TypeName(_) | ExpressionKind::TypeOf
        )
    }

    /// Whether `access` (the first child of a call) names a method on a receiver.
    pub fn is_method_access(&self, access: ExpressionId) -> bool {
        self.expression(access).kind == ExpressionKind::Dot
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous owner first.
    pub fn append_child(&mut self, parent: ExpressionId, child: ExpressionId) {
        self.detach_expression(child);
        self.expression_mut(parent).children.push(child);
        self.expression_mut(child).parent = ExpressionParent::Expression(parent);
    }

    /// Cut an expression loose from whatever holds it. It stays alive.
    pub fn detach_expression(&mut self, expression: ExpressionId) {
        match self.expression(expression).parent {
            ExpressionParent::None => return,
            ExpressionParent::Statement(statement) => {
                self.statement_mut(statement).expression = None;
            }
            ExpressionParent::Expression(parent) => {
                self.expression_mut(parent).children.retain(|&c| c != expression);
            }
            ExpressionParent::Variable(variable) => {
                self.variable_mut(variable).default = None;
            }
        }
        self.expression_mut(expression).parent = ExpressionParent::None;
    }

    /// Detach and destroy an expression with all of its descendants.
    pub fn destroy_expression(&mut self, expression: ExpressionId) {
        self.detach_expression(expression);
        let mut pending = vec![expression];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.expressions[id.index()].take() {
                pending.extend(node.children);
            }
        }
    }

    /// Every expression reachable from `expression`, itself included, preorder.
    pub fn expression_tree(&self, expression: ExpressionId) -> Vec<ExpressionId> {
        let mut out = Vec::new();
        let mut pending = vec![expression];
        while let Some(id) = pending.pop() {
            out.push(id);
            pending.extend(self.expression(id).children.iter().rev().copied());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatementKind;

    #[test]
    fn call_wraps_arguments_in_list() {
        let mut ast = Ast::new();
        let access = ast.ident("range", Span::default());
        let arg = ast.create_expression(ExpressionKind::Integer(3), Span::default());
        let call = ast.call(access, &[arg], Some(SignatureId(0)), Span::default());

        let list = ast.child(call, 1).unwrap();
        assert_eq!(ast.children(call), &[access, list]);
        assert_eq!(ast.children(list), &[arg]);
        assert_eq!(ast.expression(arg).parent, ExpressionParent::Expression(list));
        assert_eq!(ast.expression(call).signature, Some(SignatureId(0)));
        assert!(!ast.is_method_access(access));
    }

    #[test]
    fn destroy_removes_subtree_and_parent_link() {
        let mut ast = Ast::new();
        let lhs = ast.ident("a", Span::default());
        let rhs = ast.ident("b", Span::default());
        let sum = ast.binary(ExpressionKind::Add, lhs, rhs, Span::default());
        let block = ast.create_block(Span::default());
        let statement = ast.create_statement(block, StatementKind::Print, Span::default());
        ast.attach_expression(statement, sum);

        ast.destroy_expression(sum);
        assert_eq!(ast.statement(statement).expression, None);
        assert!(!ast.expression_exists(lhs));
        assert!(!ast.expression_exists(rhs));
    }

    #[test]
    fn append_child_moves_between_parents() {
        let mut ast = Ast::new();
        let first = ast.create_expression(ExpressionKind::List, Span::default());
        let second = ast.create_expression(ExpressionKind::List, Span::default());
        let item = ast.ident("x", Span::default());
        ast.append_child(first, item);
        ast.append_child(second, item);
        assert!(ast.children(first).is_empty());
        assert_eq!(ast.children(second), &[item]);
    }

    #[test]
    fn expression_tree_is_preorder() {
        let mut ast = Ast::new();
        let lhs = ast.ident("a", Span::default());
        let rhs = ast.ident("b", Span::default());
        let sum = ast.binary(ExpressionKind::Add, lhs, rhs, Span::default());
        assert_eq!(ast.expression_tree(sum), vec![sum, lhs, rhs]);
    }

    #[test]
    fn type_expressions_are_recognised() {
        let mut ast = Ast::new();
        let name = ast.create_expression(ExpressionKind::TypeName("int".into()), Span::default());
        let value = ast.ident("T", Span::default());
        let of = ast.compound(ExpressionKind::TypeOf, &[value], Span::default());
        assert!(ast.is_type_expression(name));
        assert!(ast.is_type_expression(of));
        assert!(!ast.is_type_expression(value));
    }
}
