//! Invariant violations raised during translation.
//!
//! None of these occur for well-formed input: each one means the query tree
//! disagrees with the entity model, the type mapping source or the select
//! context. A subexpression that simply has no SQL equivalent is not an error;
//! it is reported as [`Translated::Untranslatable`](super::Translated::Untranslatable).

use thiserror::Error;

use crate::sql_expr::select_context::UnboundValueBuffer;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslationError {
    #[error("String concatenation operands have no inferable textual type mapping: {left} + {right}")]
    ConcatTypeMappingNotInferred { left: String, right: String },

    #[error("Entity type `{0}` is not defined in the entity model")]
    UnknownEntityType(String),

    #[error("Entity type `{entity}` has no mapped property `{property}`")]
    PropertyNotFound { entity: String, property: String },

    #[error(transparent)]
    UnboundValueBuffer(#[from] UnboundValueBuffer),

    #[error("Expression nesting exceeds the configured maximum depth of {0}")]
    ExpressionTooDeep(u32),

    #[error("Could not start a translation worker for a deep expression: {0}")]
    WorkerUnavailable(String),
}
