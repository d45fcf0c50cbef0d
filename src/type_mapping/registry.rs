/// Dialect-keyed default type mappings
///
/// Maps each [`TypeKind`] to the store type a dialect uses for it. Lookup ignores
/// nullability; the object-erasure kind has no mapping in any dialect.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{TypeKind, TypeMapping, TypeMappingSource, ValueType};

/// SQL dialects with a built-in type mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Ansi,
    SqlServer,
    Postgres,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown SQL dialect '{0}' (expected ansi, sql_server or postgres)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ansi" => Ok(Dialect::Ansi),
            "sql_server" | "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Ansi => write!(f, "ansi"),
            Dialect::SqlServer => write!(f, "sql_server"),
            Dialect::Postgres => write!(f, "postgres"),
        }
    }
}

fn build_table(entries: &[(TypeKind, &str)], bool_literals: (&str, &str)) -> HashMap<TypeKind, TypeMapping> {
    entries
        .iter()
        .map(|(kind, store_type)| {
            let mut mapping = TypeMapping::new(*store_type, *kind);
            if *kind == TypeKind::Boolean {
                mapping = mapping.with_boolean_literals(bool_literals.0, bool_literals.1);
            }
            (*kind, mapping)
        })
        .collect()
}

lazy_static::lazy_static! {
    static ref ANSI_MAPPINGS: HashMap<TypeKind, TypeMapping> = build_table(
        &[
            (TypeKind::Boolean, "boolean"),
            (TypeKind::Int16, "smallint"),
            (TypeKind::Int32, "integer"),
            (TypeKind::Int64, "bigint"),
            (TypeKind::Double, "double precision"),
            (TypeKind::Decimal, "decimal(18, 2)"),
            (TypeKind::String, "varchar(4000)"),
            (TypeKind::DateTime, "timestamp"),
            (TypeKind::Guid, "char(36)"),
            (TypeKind::Bytes, "varbinary(8000)"),
        ],
        ("TRUE", "FALSE"),
    );

    // bit has no boolean literals; comparisons use 1/0
    static ref SQL_SERVER_MAPPINGS: HashMap<TypeKind, TypeMapping> = build_table(
        &[
            (TypeKind::Boolean, "bit"),
            (TypeKind::Int16, "smallint"),
            (TypeKind::Int32, "int"),
            (TypeKind::Int64, "bigint"),
            (TypeKind::Double, "float"),
            (TypeKind::Decimal, "decimal(18, 2)"),
            (TypeKind::String, "nvarchar(max)"),
            (TypeKind::DateTime, "datetime2"),
            (TypeKind::Guid, "uniqueidentifier"),
            (TypeKind::Bytes, "varbinary(max)"),
        ],
        ("1", "0"),
    );

    static ref POSTGRES_MAPPINGS: HashMap<TypeKind, TypeMapping> = build_table(
        &[
            (TypeKind::Boolean, "boolean"),
            (TypeKind::Int16, "smallint"),
            (TypeKind::Int32, "integer"),
            (TypeKind::Int64, "bigint"),
            (TypeKind::Double, "double precision"),
            (TypeKind::Decimal, "numeric"),
            (TypeKind::String, "text"),
            (TypeKind::DateTime, "timestamp without time zone"),
            (TypeKind::Guid, "uuid"),
            (TypeKind::Bytes, "bytea"),
        ],
        ("TRUE", "FALSE"),
    );
}

/// Built-in [`TypeMappingSource`] backed by a static per-dialect table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultTypeMappingSource {
    dialect: Dialect,
}

impl DefaultTypeMappingSource {
    pub fn for_dialect(dialect: Dialect) -> Self {
        DefaultTypeMappingSource { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn table(&self) -> &'static HashMap<TypeKind, TypeMapping> {
        match self.dialect {
            Dialect::Ansi => &ANSI_MAPPINGS,
            Dialect::SqlServer => &SQL_SERVER_MAPPINGS,
            Dialect::Postgres => &POSTGRES_MAPPINGS,
        }
    }
}

impl Default for DefaultTypeMappingSource {
    fn default() -> Self {
        Self::for_dialect(Dialect::default())
    }
}

impl TypeMappingSource for DefaultTypeMappingSource {
    fn find_mapping(&self, value_type: &ValueType) -> Option<TypeMapping> {
        self.table().get(&value_type.kind).cloned()
    }

    fn canonical_boolean_mapping(&self) -> TypeMapping {
        // Every table carries a boolean entry
        self.table()
            .get(&TypeKind::Boolean)
            .cloned()
            .unwrap_or_else(|| TypeMapping::new("boolean", TypeKind::Boolean))
    }
}
