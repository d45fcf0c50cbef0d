//! relq - query expression tree to relational SQL expression tree translation
//!
//! This crate provides the translation core of an object-relational query pipeline:
//! - Value types and per-dialect database type mappings
//! - Entity models (tables, columns, property types), loadable from YAML
//! - The relational expression model and a select context that binds entity
//!   properties to column references
//! - Pluggable member and method-call translator chains
//! - Type-mapping inference over freshly built SQL nodes
//! - The expression translator that ties it all together
//!
//! Parsing user queries into [`query_expr::QueryNode`] trees and rendering
//! [`sql_expr::SqlNode`] trees to SQL text happen outside this crate.

pub mod config;
pub mod entity_catalog;
pub mod query_expr;
pub mod sql_expr;
pub mod translator;
pub mod type_mapping;

pub use config::{ConfigError, TranslatorConfig};
pub use entity_catalog::{EntityModel, EntityType, MetadataStore, PropertyDescriptor};
pub use query_expr::QueryNode;
pub use sql_expr::{SelectContext, SelectExpression, SqlNode};
pub use translator::{SqlTranslator, Translated, TranslationError};
pub use type_mapping::{DefaultTypeMappingSource, Dialect, TypeMapping, TypeMappingSource, ValueType};
