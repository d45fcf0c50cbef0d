use super::errors::EntityCatalogError;
use super::{EntityModel, EntityType, PropertyDescriptor};
use crate::type_mapping::{TypeKind, ValueType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Entity models are defined in YAML with the following structure:
///
/// ```yaml
/// entities:
///   - name: Customer          # Entity type name used by query trees
///     table: customers        # Backing table (optionally schema-qualified)
///     properties:
///       - name: Id
///         column: id
///         type: int32
///       - name: Name
///         column: full_name
///         type: string
///         store_type: varchar(100)   # Optional dialect override
///       - name: Age
///         column: age
///         type: int32
///         nullable: true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityModelConfig {
    pub entities: Vec<EntityDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    /// Defaults to the property name.
    #[serde(default)]
    pub column: Option<String>,
    #[serde(rename = "type")]
    pub kind: TypeKind,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub store_type: Option<String>,
}

lazy_static::lazy_static! {
    // Plain or schema-qualified identifier: dbo.customers, customers, "_tmp1"
    static ref SQL_IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").unwrap();
}

fn check_identifier(identifier: &str, context: impl FnOnce() -> String) -> Result<(), EntityCatalogError> {
    if SQL_IDENTIFIER.is_match(identifier) {
        Ok(())
    } else {
        Err(EntityCatalogError::invalid_identifier(identifier, context()))
    }
}

impl EntityModelConfig {
    /// Load an entity model configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, EntityCatalogError> {
        let contents = fs::read_to_string(path).map_err(|e| EntityCatalogError::ConfigReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse an entity model configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, EntityCatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| EntityCatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Validate identifiers and build the model. Duplicate names are rejected by the model.
    pub fn to_entity_model(&self) -> Result<EntityModel, EntityCatalogError> {
        let mut model = EntityModel::new();

        for def in &self.entities {
            check_identifier(&def.table, || format!("table of entity `{}`", def.name))?;

            let mut entity = EntityType::new(def.name.clone(), def.table.clone());
            for prop in &def.properties {
                let column = prop.column.clone().unwrap_or_else(|| prop.name.clone());
                check_identifier(&column, || {
                    format!("column of property `{}.{}`", def.name, prop.name)
                })?;

                let value_type = ValueType {
                    kind: prop.kind,
                    nullable: prop.nullable,
                };
                let mut descriptor = PropertyDescriptor::new(prop.name.clone(), column, value_type);
                descriptor.store_type = prop.store_type.clone();
                entity = entity.with_property(descriptor);
            }

            model.insert_entity(entity)?;
        }

        Ok(model)
    }
}
