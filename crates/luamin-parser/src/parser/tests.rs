use crate::ast::*;
use crate::parse;
use crate::span::SourcePosition;
use indoc::indoc;

fn parse_ok(source: &str) -> Chunk {
    parse(source).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", source, e))
}

fn first_expression(source: &str) -> Expression {
    let chunk = parse_ok(source);
    match chunk.body.into_iter().next().map(|s| s.kind) {
        Some(StatementKind::Local { mut values, .. }) => values.remove(0),
        other => panic!("expected local statement, got {:?}", other),
    }
}

#[test]
fn test_parse_local_declaration() {
    let chunk = parse_ok("local a, b = 1, 'x'");
    assert_eq!(chunk.body.len(), 1);
    match &chunk.body[0].kind {
        StatementKind::Local { names, values } => {
            assert_eq!(names.len(), 2);
            assert!(names.iter().all(|n| n.is_local));
            assert_eq!(values.len(), 2);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let expr = first_expression("local a = 1 + 2 * 3");
    match expr.kind {
        ExpressionKind::Binary {
            operator: BinaryOperator::Add,
            right,
            ..
        } => assert!(matches!(
            right.kind,
            ExpressionKind::Binary {
                operator: BinaryOperator::Multiply,
                ..
            }
        )),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_power_and_concat_are_right_associative() {
    let expr = first_expression("local a = 2 ^ 3 ^ 4");
    match expr.kind {
        ExpressionKind::Binary { left, right, .. } => {
            assert!(matches!(left.kind, ExpressionKind::Literal(_)));
            assert!(matches!(right.kind, ExpressionKind::Binary { .. }));
        }
        other => panic!("unexpected {:?}", other),
    }

    let expr = first_expression("local a = 'x' .. 'y' .. 'z'");
    match expr.kind {
        ExpressionKind::Binary { left, .. } => {
            assert!(matches!(left.kind, ExpressionKind::Literal(_)))
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unary_minus_binds_looser_than_power() {
    let expr = first_expression("local a = -2 ^ 2");
    match expr.kind {
        ExpressionKind::Unary {
            operator: UnaryOperator::Negate,
            argument,
        } => assert!(matches!(
            argument.kind,
            ExpressionKind::Binary {
                operator: BinaryOperator::Power,
                ..
            }
        )),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parenthesized_expression_is_flagged() {
    let expr = first_expression("local a = (1 + 2) * 3");
    match expr.kind {
        ExpressionKind::Binary { left, .. } => assert!(left.parenthesized),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_logical_operators() {
    let expr = first_expression("local a = x and y or z");
    assert!(matches!(
        expr.kind,
        ExpressionKind::Logical {
            operator: LogicalOperator::Or,
            ..
        }
    ));
}

#[test]
fn test_globals_are_reported_in_order() {
    let chunk = parse_ok(indoc! {"
        local x = print
        foo(x, bar, print)
    "});
    assert_eq!(chunk.globals, vec!["print", "foo", "bar"]);
}

#[test]
fn test_local_is_not_visible_in_its_own_initializer() {
    let chunk = parse_ok("local print = print");
    assert_eq!(chunk.globals, vec!["print"]);
}

#[test]
fn test_local_function_is_visible_in_its_body() {
    let chunk = parse_ok("local function f(n) return f(n - 1) end");
    assert!(chunk.globals.is_empty());
}

#[test]
fn test_method_declares_implicit_self() {
    let chunk = parse_ok("function obj:m() return self end");
    assert_eq!(chunk.globals, vec!["obj"]);
}

#[test]
fn test_repeat_condition_sees_body_locals() {
    let chunk = parse_ok("repeat local done = true until done");
    assert!(chunk.globals.is_empty());
}

#[test]
fn test_block_scope_ends() {
    let chunk = parse_ok(indoc! {"
        do
          local x = 1
        end
        print(x)
    "});
    assert_eq!(chunk.globals, vec!["print", "x"]);
}

#[test]
fn test_for_loops() {
    let chunk = parse_ok("for i = 1, 10, 2 do end for k, v in pairs(t) do print(k, v) end");
    assert_eq!(chunk.body.len(), 2);
    assert!(matches!(
        chunk.body[0].kind,
        StatementKind::ForNumeric { step: Some(_), .. }
    ));
    match &chunk.body[1].kind {
        StatementKind::ForGeneric { variables, .. } => assert_eq!(variables.len(), 2),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(chunk.globals, vec!["pairs", "t", "print"]);
}

#[test]
fn test_if_clauses() {
    let chunk = parse_ok("if a then elseif b then else end");
    match &chunk.body[0].kind {
        StatementKind::If(clauses) => {
            let kinds: Vec<ClauseKind> = clauses.iter().map(|c| c.kind).collect();
            assert_eq!(
                kinds,
                vec![ClauseKind::If, ClauseKind::ElseIf, ClauseKind::Else]
            );
            assert!(clauses[2].condition.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_call_forms() {
    let chunk = parse_ok("f(1) g{} h'x' o:m(2)");
    let kinds: Vec<&ExpressionKind> = chunk
        .body
        .iter()
        .map(|s| match &s.kind {
            StatementKind::Call(e) => &e.kind,
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert!(matches!(kinds[0], ExpressionKind::Call { .. }));
    assert!(matches!(kinds[1], ExpressionKind::TableCall { .. }));
    assert!(matches!(kinds[2], ExpressionKind::StringCall { .. }));
    match kinds[3] {
        ExpressionKind::Call { base, .. } => assert!(matches!(
            base.kind,
            ExpressionKind::Member {
                indexer: Indexer::Colon,
                ..
            }
        )),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_table_fields() {
    let expr = first_expression("local t = { [1] = 'a', b = 2, 3; }");
    match expr.kind {
        ExpressionKind::Table(fields) => {
            assert_eq!(fields.len(), 3);
            assert!(matches!(fields[0], TableField::Keyed { .. }));
            assert!(matches!(fields[1], TableField::Named { .. }));
            assert!(matches!(fields[2], TableField::Positional(_)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_labels_and_goto() {
    let chunk = parse_ok("::top:: goto top");
    assert!(matches!(chunk.body[0].kind, StatementKind::Label(_)));
    assert!(matches!(chunk.body[1].kind, StatementKind::Goto(_)));
}

#[test]
fn test_statement_positions() {
    let chunk = parse_ok(indoc! {"
        local a = 1
          a = 2
    "});
    assert_eq!(chunk.body[0].position, SourcePosition::new(1, 0));
    assert_eq!(chunk.body[1].position, SourcePosition::new(2, 2));
}

#[test]
fn test_return_must_end_block() {
    let err = parse("return 1 local x").unwrap_err();
    assert!(err.message.contains("'end' expected"));
}

#[test]
fn test_expression_statement_must_be_call() {
    assert!(parse("x").is_err());
    assert!(parse("(f())").is_err());
}

#[test]
fn test_cannot_assign_to_call() {
    assert!(parse("f() = 1").is_err());
}

#[test]
fn test_comments_are_collected_with_positions() {
    let chunk = parse_ok(indoc! {"
        --#keep
        local t = {} -- trailing
        --[[ long
        comment ]]
        return t
    "});
    let values: Vec<&str> = chunk.comments.iter().map(|c| c.value.as_str()).collect();
    assert_eq!(values, vec!["#keep", " trailing", " long\ncomment "]);
    assert_eq!(chunk.comments[1].position, SourcePosition::new(2, 13));
    assert_eq!(chunk.comments[2].position, SourcePosition::new(3, 0));
}
