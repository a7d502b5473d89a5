//! Arena-level behaviour through the public API: serialization and list
//! consistency after splicing.

use tarn_ast::{Ast, BlockId, ExpressionKind, FunctionKind, Span, StatementKind, VariableKind};

/// Walk `block` forwards and backwards and check both directions agree.
fn assert_links_consistent(ast: &Ast, block: BlockId) {
    let forward = ast.block_statements(block);
    let mut backward = Vec::new();
    let mut cursor = ast.last_statement(block);
    while let Some(id) = cursor {
        assert_eq!(ast.statement(id).block, block, "{id} points at the wrong block");
        backward.push(id);
        cursor = ast.prev_statement(id);
    }
    backward.reverse();
    assert_eq!(forward, backward);
}

fn sample() -> (Ast, BlockId) {
    let mut ast = Ast::new();
    let s = Span::new(0, 1);
    let function = ast.add_function("main", FunctionKind::Plain, s);
    let signature = ast.add_signature(function, true, s);
    let body = ast.signature(signature).body;
    let limit = ast.create_expression(ExpressionKind::Integer(3), s);
    ast.add_variable(body, "limit", VariableKind::Parameter, Some(limit), s);
    for name in ["a", "b", "c"] {
        let print = ast.create_statement(body, StatementKind::Print, s);
        let value = ast.ident(name, s);
        ast.attach_expression(print, value);
    }
    (ast, body)
}

#[test]
fn test_program_survives_json_round_trip() {
    let (ast, body) = sample();
    let json = serde_json::to_string(&ast).unwrap();
    let back: Ast = serde_json::from_str(&json).unwrap();
    assert_eq!(back.dump_signatures(), ast.dump_signatures());
    assert_eq!(back.parameters(body).len(), 1);
    insta::assert_snapshot!(back.dump_signatures(), @r"
    sig#0 main(limit)
      print a
      print b
      print c
    ");
}

#[test]
fn test_destroyed_slots_stay_empty_after_round_trip() {
    let (mut ast, body) = sample();
    let middle = ast.block_statements(body)[1];
    ast.destroy_statement(middle);
    let json = serde_json::to_string(&ast).unwrap();
    let back: Ast = serde_json::from_str(&json).unwrap();
    assert!(!back.statement_exists(middle));
    assert_eq!(back.live_statement_count(), 2);
    assert_links_consistent(&back, body);
}

#[test]
fn test_splices_keep_links_consistent() {
    let (mut ast, body) = sample();
    let statements = ast.block_statements(body);

    let other = ast.create_block(Span::default());
    for _ in 0..2 {
        ast.create_statement(other, StatementKind::Return, Span::default());
    }
    let copied = ast.copy_block_statements_after(other, statements[0]);
    assert!(copied.is_some());
    let moved = ast.move_block_statements_after(other, statements[2]);
    assert_eq!(ast.last_statement(body), moved);
    assert_eq!(ast.first_statement(other), None);
    assert_links_consistent(&ast, body);
    assert_links_consistent(&ast, other);

    ast.destroy_statement(statements[0]);
    ast.destroy_statement(statements[2]);
    assert_links_consistent(&ast, body);
    insta::assert_snapshot!(ast.dump_block(body), @r"
    return
    return
    print b
    return
    return
    ");
}
