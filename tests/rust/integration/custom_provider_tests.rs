//! Dialect-specific providers registered by a host on top of the generic ones.

use std::sync::Arc;

use relq::entity_catalog::{EntityType, PropertyDescriptor};
use relq::query_expr::{MemberInfo, MethodInfo, QueryNode};
use relq::sql_expr::{SqlExpr, SqlNode};
use relq::translator::providers::{
    MemberTranslator, MethodCallTranslator, ProviderOutcome, RewrittenCall, RewrittenMember,
};
use relq::type_mapping::{TypeKind, ValueType};
use relq::{EntityModel, SelectExpression, SqlTranslator, TranslatorConfig};

/// SQL Server spells string length `LEN`.
struct SqlServerLength;

impl MemberTranslator for SqlServerLength {
    fn translate(&self, member: &RewrittenMember) -> ProviderOutcome {
        if member.member.declaring_type.kind != TypeKind::String || member.member.name != "length" {
            return ProviderOutcome::Declined;
        }
        match member.inner_sql() {
            Some(inner) => ProviderOutcome::Matched(SqlNode::function(
                "LEN",
                vec![inner.clone()],
                ValueType::new(TypeKind::Int32),
            )),
            None => ProviderOutcome::Declined,
        }
    }
}

/// `s.reverse()` has no generic translation.
struct ReverseTranslator;

impl MethodCallTranslator for ReverseTranslator {
    fn translate(&self, call: &RewrittenCall) -> ProviderOutcome {
        match (call.method.name.as_str(), call.target_sql()) {
            ("reverse", Some(target)) => {
                ProviderOutcome::Matched(SqlNode::function("REVERSE", vec![target.clone()], ValueType::string()))
            }
            _ => ProviderOutcome::Declined,
        }
    }
}

fn setup() -> (SqlTranslator, SelectExpression, QueryNode) {
    let entity = EntityType::new("Tag", "tags").with_property(PropertyDescriptor::new(
        "Label",
        "label",
        ValueType::string(),
    ));
    let mut model = EntityModel::new();
    model.insert_entity(entity.clone()).unwrap();

    let translator = SqlTranslator::from_config(Arc::new(model), TranslatorConfig::default());
    let mut select = SelectExpression::new(translator.type_mappings().clone());
    let vb = select.add_table(&entity);
    let label = QueryNode::member(
        QueryNode::shaper("Tag", vb),
        MemberInfo::new(ValueType::object(), "Label", ValueType::string()),
    );
    (translator, select, label)
}

fn length_of(label: QueryNode) -> QueryNode {
    QueryNode::member(
        label,
        MemberInfo::new(ValueType::string(), "length", ValueType::new(TypeKind::Int32)),
    )
}

fn function_name(node: SqlNode) -> String {
    match node.expr {
        SqlExpr::Function { name, .. } => name,
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn test_dialect_provider_prepended_overrides_generic() {
    let (mut translator, mut select, label) = setup();
    translator.member_translators_mut().register_first(Box::new(SqlServerLength));

    let node = translator
        .translate(&mut select, &length_of(label), false)
        .unwrap()
        .into_sql()
        .unwrap();
    assert_eq!(function_name(node), "LEN");
}

#[test]
fn test_dialect_provider_appended_loses_to_generic() {
    let (mut translator, mut select, label) = setup();
    translator.member_translators_mut().register(Box::new(SqlServerLength));

    let node = translator
        .translate(&mut select, &length_of(label), false)
        .unwrap()
        .into_sql()
        .unwrap();
    assert_eq!(function_name(node), "LENGTH");
}

#[test]
fn test_appended_provider_fills_gap() {
    let (mut translator, mut select, label) = setup();
    let reverse = QueryNode::call(
        label,
        MethodInfo::instance(TypeKind::String, "reverse", ValueType::string()),
        vec![],
    );

    assert!(translator.translate(&mut select, &reverse, false).unwrap().is_untranslatable());

    translator.method_translators_mut().register(Box::new(ReverseTranslator));
    let node = translator.translate(&mut select, &reverse, false).unwrap().into_sql().unwrap();
    assert!(node.type_mapping.is_some());
    assert_eq!(function_name(node), "REVERSE");
}
