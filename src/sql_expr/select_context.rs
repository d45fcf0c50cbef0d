//! Select context: binds entity properties to column references
//!
//! The translator resolves `entity.Property` through [`SelectContext::bind_property`].
//! Binding is a side effect on the context (columns used by the query accumulate
//! there for the renderer), so one context must only serve one translation at a time.

use std::sync::Arc;

use thiserror::Error;

use super::{ColumnRef, SqlNode};
use crate::entity_catalog::{EntityType, PropertyDescriptor};
use crate::query_expr::ValueBufferRef;
use crate::type_mapping::TypeMappingSource;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Value buffer {0:?} is not bound to any table in this select")]
pub struct UnboundValueBuffer(pub ValueBufferRef);

/// The enclosing query builder, as seen by the translator.
///
/// `Send` so that deep trees can be translated on a worker thread.
pub trait SelectContext: Send {
    /// Resolve an entity property, read through `value_buffer`, to a column reference
    /// scoped to this query.
    fn bind_property(
        &mut self,
        value_buffer: ValueBufferRef,
        property: &PropertyDescriptor,
    ) -> Result<SqlNode, UnboundValueBuffer>;
}

/// A table source of the select and the value buffer its rows materialize into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableExpression {
    pub alias: String,
    pub table: String,
    pub entity_type: String,
    pub value_buffer: ValueBufferRef,
}

/// Default [`SelectContext`]: one per logical query.
pub struct SelectExpression {
    tables: Vec<TableExpression>,
    /// Columns bound so far, deduplicated, in first-bind order.
    columns: Vec<ColumnRef>,
    type_mappings: Arc<dyn TypeMappingSource>,
}

impl SelectExpression {
    pub fn new(type_mappings: Arc<dyn TypeMappingSource>) -> Self {
        SelectExpression {
            tables: Vec::new(),
            columns: Vec::new(),
            type_mappings,
        }
    }

    /// Add a table for `entity` and return the value buffer that addresses its rows.
    pub fn add_table(&mut self, entity: &EntityType) -> ValueBufferRef {
        let value_buffer = ValueBufferRef(self.tables.len() as u32);
        let alias = self.unique_alias(&entity.table);
        log::debug!(
            "SelectExpression: table '{}' AS {} for entity '{}' ({:?})",
            entity.table,
            alias,
            entity.name,
            value_buffer
        );
        self.tables.push(TableExpression {
            alias,
            table: entity.table.clone(),
            entity_type: entity.name.clone(),
            value_buffer,
        });
        value_buffer
    }

    pub fn tables(&self) -> &[TableExpression] {
        &self.tables
    }

    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    pub fn table_for(&self, value_buffer: ValueBufferRef) -> Option<&TableExpression> {
        self.tables.iter().find(|t| t.value_buffer == value_buffer)
    }

    /// First letter of the unqualified table name, suffixed with a counter on collision.
    fn unique_alias(&self, table: &str) -> String {
        let unqualified = table.rsplit('.').next().unwrap_or(table);
        let base = unqualified
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase().to_string())
            .unwrap_or_else(|| "t".to_string());

        if !self.tables.iter().any(|t| t.alias == base) {
            return base;
        }
        (0..)
            .map(|i| format!("{}{}", base, i))
            .find(|candidate| !self.tables.iter().any(|t| &t.alias == candidate))
            .unwrap_or(base)
    }
}

impl SelectContext for SelectExpression {
    fn bind_property(
        &mut self,
        value_buffer: ValueBufferRef,
        property: &PropertyDescriptor,
    ) -> Result<SqlNode, UnboundValueBuffer> {
        let table = self
            .table_for(value_buffer)
            .ok_or(UnboundValueBuffer(value_buffer))?;

        let column = ColumnRef {
            table_alias: table.alias.clone(),
            column: property.column.clone(),
        };

        let type_mapping = self
            .type_mappings
            .find_mapping(&property.value_type)
            .map(|m| match &property.store_type {
                Some(store_type) => m.with_store_type(store_type.clone()),
                None => m,
            });

        if !self.columns.contains(&column) {
            self.columns.push(column.clone());
        }

        Ok(SqlNode::column(column, property.value_type, type_mapping))
    }
}
