use std::sync::Arc;

use relq::entity_catalog::EntityModelConfig;
use relq::query_expr::{BinaryOperator, MemberInfo, MethodInfo, QueryNode, ValueBufferRef};
use relq::sql_expr::{ColumnRef, SqlBinaryOperator, SqlExpr};
use relq::type_mapping::{Literal, TypeKind, ValueType};
use relq::{
    Dialect, EntityModel, MetadataStore, SelectExpression, SqlTranslator, Translated,
    TranslatorConfig, TypeMappingSource,
};

const MODEL_YAML: &str = r#"
entities:
  - name: Customer
    table: sales.customers
    properties:
      - name: Id
        column: customer_id
        type: int32
      - name: Name
        column: full_name
        type: string
        store_type: nvarchar(100)
      - name: Age
        column: age
        type: int32
        nullable: true
      - name: Vip
        column: is_vip
        type: boolean
"#;

struct Pipeline {
    model: Arc<EntityModel>,
    translator: SqlTranslator,
    select: SelectExpression,
    customer: ValueBufferRef,
}

fn pipeline(dialect: Dialect) -> Pipeline {
    let _ = env_logger::builder().is_test(true).try_init();

    let model = Arc::new(
        EntityModelConfig::from_yaml_str(MODEL_YAML)
            .unwrap()
            .to_entity_model()
            .unwrap(),
    );
    let config = TranslatorConfig {
        dialect,
        ..Default::default()
    };
    let translator = SqlTranslator::from_config(model.clone(), config);
    let mut select = SelectExpression::new(translator.type_mappings().clone());
    let customer = select.add_table(model.find_entity_type("Customer").unwrap());

    Pipeline {
        model,
        translator,
        select,
        customer,
    }
}

impl Pipeline {
    fn prop(&self, name: &str) -> QueryNode {
        let property = self.model.find_property("Customer", name).unwrap();
        QueryNode::member(
            QueryNode::shaper("Customer", self.customer),
            MemberInfo::new(ValueType::object(), name, property.value_type),
        )
    }
}

fn column(column: &str) -> SqlExpr {
    SqlExpr::Column(ColumnRef {
        table_alias: "c".to_string(),
        column: column.to_string(),
    })
}

#[test]
fn test_age_equals_null() {
    let mut p = pipeline(Dialect::Ansi);
    let expr = QueryNode::binary(BinaryOperator::Equal, p.prop("Age"), QueryNode::null(), ValueType::boolean());
    let node = p.translator.translate(&mut p.select, &expr, true).unwrap().into_sql().unwrap();

    match node.expr {
        SqlExpr::IsNull { operand, negated } => {
            assert!(!negated);
            assert_eq!(operand.expr, column("age"));
        }
        other => panic!("expected IS NULL, got {:?}", other),
    }
}

#[test]
fn test_name_plus_age_concat() {
    let mut p = pipeline(Dialect::SqlServer);
    let expr = QueryNode::string_concat(p.prop("Name"), p.prop("Age"));
    let node = p.translator.translate(&mut p.select, &expr, false).unwrap().into_sql().unwrap();

    assert_eq!(node.type_mapping.as_ref().unwrap().store_type, "nvarchar(100)");
    match node.expr {
        SqlExpr::Binary {
            operator: SqlBinaryOperator::Concat,
            left,
            right,
        } => {
            assert_eq!(left.expr, column("full_name"));
            assert!(matches!(right.expr, SqlExpr::Cast(_)));
            assert_eq!(left.type_mapping, right.type_mapping);
        }
        other => panic!("expected concat, got {:?}", other),
    }
}

#[test]
fn test_where_clause_over_several_columns() {
    let mut p = pipeline(Dialect::Postgres);
    let vip_or_adult = QueryNode::binary(
        BinaryOperator::OrElse,
        p.prop("Vip"),
        QueryNode::binary(
            BinaryOperator::GreaterThan,
            p.prop("Age"),
            QueryNode::constant(Literal::Integer(65), ValueType::new(TypeKind::Int32)),
            ValueType::boolean(),
        ),
        ValueType::boolean(),
    );
    let starts_with = QueryNode::call(
        p.prop("Name"),
        MethodInfo::instance(TypeKind::String, "starts_with", ValueType::boolean()),
        vec![QueryNode::constant(Literal::String("A".to_string()), ValueType::string())],
    );
    let expr = QueryNode::binary(BinaryOperator::AndAlso, vip_or_adult, starts_with, ValueType::boolean());

    let node = p.translator.translate(&mut p.select, &expr, true).unwrap().into_sql().unwrap();
    assert!(node.is_condition);
    assert!(node.is_fully_mapped());

    let columns: Vec<&str> = p.select.columns().iter().map(|c| c.column.as_str()).collect();
    assert_eq!(columns, vec!["is_vip", "age", "full_name"]);
}

#[test]
fn test_translator_is_reusable_across_contexts() {
    let mut p = pipeline(Dialect::Ansi);
    let expr = p.prop("Name");
    p.translator.translate(&mut p.select, &expr, false).unwrap();

    let mut second = SelectExpression::new(p.translator.type_mappings().clone());
    let vb = second.add_table(p.model.find_entity_type("Customer").unwrap());
    assert_eq!(vb, p.customer);

    p.translator.translate(&mut second, &expr, false).unwrap();
    assert_eq!(second.columns().len(), 1);
    assert_eq!(p.select.columns().len(), 1);
}

#[test]
fn test_untranslatable_projection_is_reported_not_raised() {
    let mut p = pipeline(Dialect::Ansi);
    let expr = QueryNode::ObjectConstruction(relq::query_expr::ObjectConstruction {
        type_name: "Row".to_string(),
        members: vec!["name".to_string(), "phonetic".to_string()],
        arguments: vec![
            p.prop("Name"),
            QueryNode::call(
                p.prop("Name"),
                MethodInfo::instance(TypeKind::String, "metaphone", ValueType::string()),
                vec![],
            ),
        ],
    });
    assert_eq!(
        p.translator.translate(&mut p.select, &expr, false).unwrap(),
        Translated::Untranslatable
    );
}

#[test]
fn test_canonical_boolean_wrap_uses_dialect_literal() {
    let mut p = pipeline(Dialect::SqlServer);
    let vip = p.prop("Vip");
    let node = p.translator.translate(&mut p.select, &vip, true).unwrap().into_sql().unwrap();
    let canonical = p.translator.type_mappings().canonical_boolean_mapping();

    assert!(node.is_condition);
    assert_eq!(node.type_mapping, Some(canonical));
    match node.expr {
        SqlExpr::Binary { right, .. } => {
            let mapping = right.type_mapping.as_ref().unwrap();
            assert_eq!(mapping.generate_sql_literal(&Literal::Boolean(true)), "1");
        }
        other => panic!("expected truth test, got {:?}", other),
    }
}
