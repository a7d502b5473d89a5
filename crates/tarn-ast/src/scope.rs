//! Temporary renaming of variables that would collide when one block's
//! statements are copied into another scope.
//!
//! [`Ast::resolve_name_conflicts`] renames, [`Ast::restore_names`] undoes the
//! renames. Callers bracket a copy with the pair so the renamed names only
//! ever show up in the copy, never in the template afterwards.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Ast, BlockId, ExpressionId, ExpressionKind, VariableId};

/// Renames applied to one block, in the order they were made.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[must_use = "renamed variables must be restored with `Ast::restore_names`"]
pub struct Renames {
    entries: Vec<Rename>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rename {
    variable: VariableId,
    original: String,
    renamed: String,
}

impl Renames {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(original, renamed)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|r| (r.original.as_str(), r.renamed.as_str()))
    }
}

impl Ast {
    /// Rename every variable of `block` whose name is declared in `scope` or
    /// listed in `reserved`.
    ///
    /// `reserved` holds names that will be live at the destination without
    /// being declared there yet, such as a loop variable. The new name is
    /// `name_N` for the smallest `N >= 1` not used by any variable of either
    /// block, any reserved name or any identifier inside `block`. Identifiers
    /// and parameter defaults inside `block` are rewritten to match.
    pub fn resolve_name_conflicts(&mut self, block: BlockId, scope: BlockId, reserved: &[&str]) -> Renames {
        let mut scope_names: FxHashSet<String> = self
            .block(scope)
            .variables
            .iter()
            .map(|&v| self.variable(v).name.clone())
            .collect();
        scope_names.extend(reserved.iter().map(|name| name.to_string()));
        let mut taken: FxHashSet<String> = scope_names.clone();
        taken.extend(
            self.block(block)
                .variables
                .iter()
                .map(|&v| self.variable(v).name.clone()),
        );
        let expressions = self.block_expressions(block);
        taken.extend(expressions.iter().filter_map(|&e| match &self.expression(e).kind {
            ExpressionKind::Ident(name) => Some(name.clone()),
            _ => None,
        }));

        let mut renames = Renames::default();
        for variable in self.block(block).variables.clone() {
            let original = self.variable(variable).name.clone();
            if !scope_names.contains(&original) {
                continue;
            }
            let renamed = (1u32..)
                .map(|n| format!("{original}_{n}"))
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or_default();
            taken.insert(renamed.clone());
            self.rename_variable(variable, renamed.clone());
            renames.entries.push(Rename {
                variable,
                original,
                renamed,
            });
        }

        let map: FxHashMap<&str, &str> = renames.pairs().collect();
        self.rewrite_identifiers(&expressions, &map);
        renames
    }

    /// Undo the renames made by [`Ast::resolve_name_conflicts`] on `block`.
    pub fn restore_names(&mut self, block: BlockId, renames: Renames) {
        if renames.is_empty() {
            return;
        }
        let expressions = self.block_expressions(block);
        let map: FxHashMap<&str, &str> = renames
            .pairs()
            .map(|(original, renamed)| (renamed, original))
            .collect();
        self.rewrite_identifiers(&expressions, &map);
        for rename in &renames.entries {
            self.rename_variable(rename.variable, rename.original.clone());
        }
    }

    /// Every expression inside `block`: statement expressions, nested blocks
    /// and variable defaults.
    pub fn block_expressions(&self, block: BlockId) -> Vec<ExpressionId> {
        let mut out = Vec::new();
        let mut blocks = vec![block];
        while let Some(current) = blocks.pop() {
            for &variable in &self.block(current).variables {
                if let Some(default) = self.variable(variable).default {
                    out.extend(self.expression_tree(default));
                }
            }
            for statement in self.block_statements(current) {
                let node = self.statement(statement);
                if let Some(expression) = node.expression {
                    out.extend(self.expression_tree(expression));
                }
                blocks.extend(node.sub_block);
            }
        }
        out
    }

    fn rewrite_identifiers(&mut self, expressions: &[ExpressionId], map: &FxHashMap<&str, &str>) {
        if map.is_empty() {
            return;
        }
        for &expression in expressions {
            let replacement = match &self.expression(expression).kind {
                ExpressionKind::Ident(name) => map.get(name.as_str()).map(|n| n.to_string()),
                _ => None,
            };
            if let Some(name) = replacement {
                self.expression_mut(expression).kind = ExpressionKind::Ident(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Ast, BlockId, ExpressionKind, Span, StatementKind, VariableKind};

    fn print_ident(ast: &mut Ast, block: BlockId, name: &str) {
        let statement = ast.create_statement(block, StatementKind::Print, Span::default());
        let value = ast.ident(name, Span::default());
        ast.attach_expression(statement, value);
    }

    #[test]
    fn colliding_names_are_renamed_and_restored() {
        let mut ast = Ast::new();
        let scope = ast.create_block(Span::default());
        ast.add_variable(scope, "i", VariableKind::Local, None, Span::default());
        ast.add_variable(scope, "i_1", VariableKind::Local, None, Span::default());

        let iterator = ast.create_block(Span::default());
        let i = ast.add_variable(iterator, "i", VariableKind::Parameter, None, Span::default());
        let n = ast.add_variable(iterator, "n", VariableKind::Parameter, None, Span::default());
        print_ident(&mut ast, iterator, "i");
        print_ident(&mut ast, iterator, "n");

        let renames = ast.resolve_name_conflicts(iterator, scope, &[]);
        assert_eq!(renames.pairs().collect::<Vec<_>>(), vec![("i", "i_2")]);
        assert_eq!(ast.variable(i).name, "i_2");
        assert_eq!(ast.variable(n).name, "n");
        let printed = ast.block_expressions(iterator);
        assert_eq!(ast.expression(printed[0]).kind, ExpressionKind::Ident("i_2".into()));
        assert_eq!(ast.expression(printed[1]).kind, ExpressionKind::Ident("n".into()));

        ast.restore_names(iterator, renames);
        assert_eq!(ast.variable(i).name, "i");
        assert_eq!(ast.expression(printed[0]).kind, ExpressionKind::Ident("i".into()));
    }

    #[test]
    fn defaults_referencing_renamed_parameters_follow_the_rename() {
        let mut ast = Ast::new();
        let scope = ast.create_block(Span::default());
        ast.add_variable(scope, "start", VariableKind::Local, None, Span::default());

        let iterator = ast.create_block(Span::default());
        ast.add_variable(iterator, "start", VariableKind::Parameter, None, Span::default());
        let start = ast.ident("start", Span::default());
        let ten = ast.create_expression(ExpressionKind::Integer(10), Span::default());
        let default = ast.binary(ExpressionKind::Add, start, ten, Span::default());
        ast.add_variable(iterator, "end", VariableKind::Parameter, Some(default), Span::default());

        let renames = ast.resolve_name_conflicts(iterator, scope, &[]);
        assert_eq!(ast.expression(start).kind, ExpressionKind::Ident("start_1".into()));
        ast.restore_names(iterator, renames);
        assert_eq!(ast.expression(start).kind, ExpressionKind::Ident("start".into()));
    }

    #[test]
    fn reserved_names_count_as_collisions() {
        let mut ast = Ast::new();
        let scope = ast.create_block(Span::default());
        let iterator = ast.create_block(Span::default());
        let i = ast.add_variable(iterator, "i", VariableKind::Local, None, Span::default());
        print_ident(&mut ast, iterator, "i");

        let renames = ast.resolve_name_conflicts(iterator, scope, &["i", "i_1"]);
        assert_eq!(renames.pairs().collect::<Vec<_>>(), vec![("i", "i_2")]);
        assert_eq!(ast.variable(i).name, "i_2");
        ast.restore_names(iterator, renames);
        assert_eq!(ast.variable(i).name, "i");
    }

    #[test]
    fn no_collision_means_no_renames() {
        let mut ast = Ast::new();
        let scope = ast.create_block(Span::default());
        let iterator = ast.create_block(Span::default());
        ast.add_variable(iterator, "x", VariableKind::Local, None, Span::default());
        let renames = ast.resolve_name_conflicts(iterator, scope, &[]);
        assert!(renames.is_empty());
        ast.restore_names(iterator, renames);
    }
}
