//! Entity-mapping metadata
//!
//! Describes which table backs each entity type and which column (and value
//! type) backs each of its properties. The translator only depends on the
//! [`MetadataStore`] trait; [`EntityModel`] is the in-memory implementation,
//! built in code or loaded from YAML via [`config::EntityModelConfig`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::type_mapping::ValueType;

pub mod config;
pub mod errors;

pub use config::EntityModelConfig;
pub use errors::EntityCatalogError;

/// A mapped property of an entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub column: String,
    pub value_type: ValueType,
    /// Explicit store type overriding the dialect default (e.g. `varchar(50)`).
    pub store_type: Option<String>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, column: impl Into<String>, value_type: ValueType) -> Self {
        PropertyDescriptor {
            name: name.into(),
            column: column.into(),
            value_type,
            store_type: None,
        }
    }

    pub fn with_store_type(mut self, store_type: impl Into<String>) -> Self {
        self.store_type = Some(store_type.into());
        self
    }
}

/// A mapped entity type and the table that stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    pub table: String,
    properties: Vec<PropertyDescriptor>,
}

impl EntityType {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        EntityType {
            name: name.into(),
            table: table.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn find_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Entity metadata lookups needed during translation.
pub trait MetadataStore: Send + Sync {
    fn find_entity_type(&self, name: &str) -> Option<&EntityType>;

    fn find_property(&self, entity_type: &str, name: &str) -> Option<&PropertyDescriptor> {
        self.find_entity_type(entity_type)
            .and_then(|entity| entity.find_property(name))
    }
}

/// In-memory entity model.
#[derive(Debug, Clone, Default)]
pub struct EntityModel {
    entities: HashMap<String, EntityType>,
}

impl EntityModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type, rejecting duplicate entity or property names.
    pub fn insert_entity(&mut self, entity: EntityType) -> Result<(), EntityCatalogError> {
        if self.entities.contains_key(&entity.name) {
            return Err(EntityCatalogError::DuplicateEntity {
                entity: entity.name.clone(),
            });
        }
        for (i, property) in entity.properties.iter().enumerate() {
            if entity.properties[..i].iter().any(|p| p.name == property.name) {
                return Err(EntityCatalogError::DuplicateProperty {
                    entity: entity.name.clone(),
                    property: property.name.clone(),
                });
            }
        }
        log::debug!(
            "EntityModel: registered '{}' -> table '{}' ({} properties)",
            entity.name,
            entity.table,
            entity.properties.len()
        );
        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    pub fn get_entity_type(&self, name: &str) -> Result<&EntityType, EntityCatalogError> {
        self.entities
            .get(name)
            .ok_or_else(|| EntityCatalogError::EntityNotFound {
                entity: name.to_string(),
            })
    }

    pub fn entity_names(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.entities.keys().collect();
        names.sort();
        names
    }
}

impl MetadataStore for EntityModel {
    fn find_entity_type(&self, name: &str) -> Option<&EntityType> {
        self.entities.get(name)
    }
}
