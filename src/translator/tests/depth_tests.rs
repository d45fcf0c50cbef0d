//! Nesting limits, and deep trees that must not exhaust the calling thread's stack.

use super::*;
use crate::query_expr::BinaryOperator;
use crate::sql_expr::select_context::UnboundValueBuffer;
use crate::sql_expr::{SqlBinaryOperator, SqlExpr};
use crate::translator::{TranslationError, INLINE_DEPTH};
use crate::type_mapping::Literal;

/// `Id + 1 + 1 ...`, left-deep, with exactly `depth` nodes on its longest path.
fn addition_chain(leaf: QueryNode, depth: usize) -> QueryNode {
    // The leaf property access is two levels: the member and its shaper
    let mut expr = leaf;
    for _ in 2..depth {
        expr = QueryNode::binary(
            BinaryOperator::Add,
            expr,
            QueryNode::constant(Literal::Integer(1), ValueType::new(TypeKind::Int32)),
            ValueType::new(TypeKind::Int32),
        );
    }
    expr
}

fn id_chain(fx: &Fixture, depth: usize) -> QueryNode {
    addition_chain(fx.customer_prop("Id", ValueType::new(TypeKind::Int32)), depth)
}

#[test]
fn test_default_depth_limit_translates() {
    let mut fx = Fixture::new();
    let limit = TranslatorConfig::default().max_expression_depth as usize;
    let expr = id_chain(&fx, limit);
    assert_eq!(expr.depth(), limit);

    let node = fx.sql(&expr);
    assert!(matches!(
        node.expr,
        SqlExpr::Binary {
            operator: SqlBinaryOperator::Add,
            ..
        }
    ));
    assert_eq!(node.type_mapping.as_ref().unwrap().store_type, "int");
    assert_eq!(fx.select.columns(), &[column("c", "id")]);
}

#[test]
fn test_one_past_limit_is_rejected_before_binding() {
    let mut fx = Fixture::new();
    let limit = fx.translator.config().max_expression_depth;
    let expr = id_chain(&fx, limit as usize + 1);

    let err = fx.translator.translate(&mut fx.select, &expr, false).unwrap_err();
    assert_eq!(err, TranslationError::ExpressionTooDeep(limit));
    assert!(fx.select.columns().is_empty());
}

#[test]
fn test_raised_limit_translates_deep_chain() {
    let mut fx = Fixture::with_config(TranslatorConfig {
        dialect: Dialect::SqlServer,
        max_expression_depth: 2048,
        ..Default::default()
    });
    let expr = id_chain(&fx, 2048);
    assert_eq!(fx.sql(&expr).type_mapping.unwrap().store_type, "int");
}

#[test]
fn test_shallow_and_deep_paths_agree() {
    let mut fx = Fixture::new();
    let shallow = id_chain(&fx, INLINE_DEPTH);
    let deep = id_chain(&fx, INLINE_DEPTH + 1);
    let inline = fx.sql(&shallow);
    let on_worker = fx.sql(&deep);

    match on_worker.expr {
        SqlExpr::Binary { left, .. } => assert_eq!(*left, inline),
        other => panic!("expected addition, got {:?}", other),
    }
}

#[test]
fn test_deep_tree_reports_context_errors() {
    let mut fx = Fixture::new();
    let unbound = QueryNode::member(
        QueryNode::shaper("Customer", ValueBufferRef(99)),
        MemberInfo::new(ValueType::object(), "Id", ValueType::new(TypeKind::Int32)),
    );
    let expr = addition_chain(unbound, 200);

    let err = fx.translator.translate(&mut fx.select, &expr, false).unwrap_err();
    assert_eq!(
        err,
        TranslationError::UnboundValueBuffer(UnboundValueBuffer(ValueBufferRef(99)))
    );
}
