//! Translator scenario tests against a small two-entity model on SQL Server mappings.

use std::sync::Arc;

use super::{SqlTranslator, Translated};
use crate::config::TranslatorConfig;
use crate::entity_catalog::{EntityModel, EntityType, PropertyDescriptor};
use crate::query_expr::{MemberInfo, QueryNode, ValueBufferRef};
use crate::sql_expr::{ColumnRef, SelectExpression, SqlNode};
use crate::type_mapping::{Dialect, TypeKind, TypeMappingSource, ValueType};

mod depth_tests;

fn customer_entity() -> EntityType {
    EntityType::new("Customer", "customers")
        .with_property(PropertyDescriptor::new("Id", "id", ValueType::new(TypeKind::Int32)))
        .with_property(
            PropertyDescriptor::new("Name", "name", ValueType::string()).with_store_type("varchar(50)"),
        )
        .with_property(PropertyDescriptor::new(
            "Age",
            "age",
            ValueType::nullable(TypeKind::Int32),
        ))
        .with_property(PropertyDescriptor::new("IsActive", "is_active", ValueType::boolean()))
        .with_property(PropertyDescriptor::new(
            "Email",
            "email",
            ValueType::nullable(TypeKind::String),
        ))
}

fn order_entity() -> EntityType {
    EntityType::new("Order", "orders")
        .with_property(PropertyDescriptor::new("Id", "id", ValueType::new(TypeKind::Int32)))
        .with_property(PropertyDescriptor::new(
            "CustomerId",
            "customer_id",
            ValueType::new(TypeKind::Int32),
        ))
        .with_property(PropertyDescriptor::new("Total", "total", ValueType::new(TypeKind::Decimal)))
        .with_property(PropertyDescriptor::new(
            "PlacedAt",
            "placed_at",
            ValueType::new(TypeKind::DateTime),
        ))
        .with_property(PropertyDescriptor::new(
            "Shipped",
            "shipped",
            ValueType::nullable(TypeKind::Boolean),
        ))
}

struct Fixture {
    translator: SqlTranslator,
    select: SelectExpression,
    customer: ValueBufferRef,
    order: ValueBufferRef,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(TranslatorConfig {
            dialect: Dialect::SqlServer,
            ..Default::default()
        })
    }

    fn with_config(config: TranslatorConfig) -> Self {
        let mut model = EntityModel::new();
        model.insert_entity(customer_entity()).unwrap();
        model.insert_entity(order_entity()).unwrap();

        let type_mappings: Arc<dyn TypeMappingSource> = Arc::new(config.type_mapping_source());
        let mut select = SelectExpression::new(type_mappings.clone());
        let customer = select.add_table(&customer_entity());
        let order = select.add_table(&order_entity());

        Fixture {
            translator: SqlTranslator::with_default_providers(Arc::new(model), type_mappings, config),
            select,
            customer,
            order,
        }
    }

    fn translate(&mut self, expr: &QueryNode) -> Translated {
        self.translator.translate(&mut self.select, expr, false).unwrap()
    }

    fn predicate(&mut self, expr: &QueryNode) -> Translated {
        self.translator.translate(&mut self.select, expr, true).unwrap()
    }

    fn sql(&mut self, expr: &QueryNode) -> SqlNode {
        match self.translate(expr) {
            Translated::Sql(node) => node,
            other => panic!("expected SQL node, got {:?}", other),
        }
    }

    fn customer(&self) -> QueryNode {
        QueryNode::shaper("Customer", self.customer)
    }

    fn order(&self) -> QueryNode {
        QueryNode::shaper("Order", self.order)
    }

    fn customer_prop(&self, name: &str, value_type: ValueType) -> QueryNode {
        QueryNode::member(self.customer(), MemberInfo::new(ValueType::object(), name, value_type))
    }

    fn order_prop(&self, name: &str, value_type: ValueType) -> QueryNode {
        QueryNode::member(self.order(), MemberInfo::new(ValueType::object(), name, value_type))
    }
}

fn column(table_alias: &str, column: &str) -> ColumnRef {
    ColumnRef {
        table_alias: table_alias.to_string(),
        column: column.to_string(),
    }
}

/// A string member no provider knows.
fn unknown_member(inner: QueryNode) -> QueryNode {
    QueryNode::member(
        inner,
        MemberInfo::new(ValueType::string(), "soundex", ValueType::string()),
    )
}
