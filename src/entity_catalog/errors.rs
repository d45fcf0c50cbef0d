//! # Entity Catalog Error Types
//!
//! Errors raised while loading an entity model or resolving names against it.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EntityCatalogError {
    #[error("No entity type found for `{entity}`")]
    EntityNotFound { entity: String },
    #[error("Entity `{entity}` has no property `{property}`")]
    PropertyNotFound { entity: String, property: String },
    #[error("Entity `{entity}` is defined more than once")]
    DuplicateEntity { entity: String },
    #[error("Entity `{entity}` defines property `{property}` more than once")]
    DuplicateProperty { entity: String, property: String },
    #[error("Invalid SQL identifier '{identifier}' in {context}")]
    InvalidIdentifier { identifier: String, context: String },
    #[error("Failed to read entity model: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse entity model: {error}")]
    ConfigParseError { error: String },
}

impl EntityCatalogError {
    /// Create an InvalidIdentifier error naming where the identifier appeared
    pub fn invalid_identifier(identifier: impl Into<String>, context: impl Into<String>) -> Self {
        EntityCatalogError::InvalidIdentifier {
            identifier: identifier.into(),
            context: context.into(),
        }
    }
}
