//! Value types and their database type mappings
//!
//! A [`TypeMapping`] describes how a runtime value type is stored, compared and
//! rendered as a literal in the target dialect. Mappings are only ever obtained
//! from a [`TypeMappingSource`]; the translator never constructs one itself.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod registry;

pub use registry::{DefaultTypeMappingSource, Dialect, UnknownDialect};

/// Runtime value categories understood by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Boolean,
    Int16,
    Int32,
    Int64,
    Double,
    Decimal,
    String,
    DateTime,
    Guid,
    Bytes,
    /// Type-erased value (`object`-like). Conversions to it are erasures, not casts.
    Object,
}

impl TypeKind {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeKind::Int16 | TypeKind::Int32 | TypeKind::Int64 | TypeKind::Double | TypeKind::Decimal
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Boolean => "boolean",
            TypeKind::Int16 => "int16",
            TypeKind::Int32 => "int32",
            TypeKind::Int64 => "int64",
            TypeKind::Double => "double",
            TypeKind::Decimal => "decimal",
            TypeKind::String => "string",
            TypeKind::DateTime => "datetime",
            TypeKind::Guid => "guid",
            TypeKind::Bytes => "bytes",
            TypeKind::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// Static type of an expression: a kind plus declared nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueType {
    pub kind: TypeKind,
    pub nullable: bool,
}

impl ValueType {
    pub const fn new(kind: TypeKind) -> Self {
        ValueType { kind, nullable: false }
    }

    pub const fn nullable(kind: TypeKind) -> Self {
        ValueType { kind, nullable: true }
    }

    pub const fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }

    pub const fn string() -> Self {
        Self::new(TypeKind::String)
    }

    pub const fn object() -> Self {
        Self::new(TypeKind::Object)
    }

    /// Same kind with nullability forced off.
    pub fn non_nullable(self) -> Self {
        ValueType { nullable: false, ..self }
    }

    pub fn with_nullability(self, nullable: bool) -> Self {
        ValueType { nullable, ..self }
    }

    pub fn is_textual(&self) -> bool {
        self.kind == TypeKind::String
    }

    pub fn is_object_erasure(&self) -> bool {
        self.kind == TypeKind::Object
    }

    pub fn is_boolean(&self) -> bool {
        self.kind == TypeKind::Boolean
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// Literal values carried by query constants and SQL constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(String),
    String(String),
    DateTime(NaiveDateTime),
    Guid(Uuid),
    Bytes(Vec<u8>),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

/// How values of a mapped type compare for equality in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualitySemantics {
    /// Bitwise/value equality.
    Exact,
    /// Equality follows the column or database collation.
    Collated,
}

/// Database representation of a value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeMapping {
    pub store_type: String,
    pub kind: TypeKind,
    pub equality: EqualitySemantics,
    pub true_literal: String,
    pub false_literal: String,
}

impl TypeMapping {
    pub fn new(store_type: impl Into<String>, kind: TypeKind) -> Self {
        let equality = if kind == TypeKind::String {
            EqualitySemantics::Collated
        } else {
            EqualitySemantics::Exact
        };
        TypeMapping {
            store_type: store_type.into(),
            kind,
            equality,
            true_literal: "TRUE".to_string(),
            false_literal: "FALSE".to_string(),
        }
    }

    pub fn with_boolean_literals(
        mut self,
        true_literal: impl Into<String>,
        false_literal: impl Into<String>,
    ) -> Self {
        self.true_literal = true_literal.into();
        self.false_literal = false_literal.into();
        self
    }

    /// Copy of this mapping bound to a different store type (e.g. a column override).
    pub fn with_store_type(&self, store_type: impl Into<String>) -> Self {
        TypeMapping {
            store_type: store_type.into(),
            ..self.clone()
        }
    }

    pub fn is_textual(&self) -> bool {
        self.kind == TypeKind::String
    }

    /// Default literal formatting for this mapping.
    pub fn generate_sql_literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::Null => "NULL".to_string(),
            Literal::Boolean(true) => self.true_literal.clone(),
            Literal::Boolean(false) => self.false_literal.clone(),
            Literal::Integer(i) => i.to_string(),
            Literal::Float(f) => {
                let text = f.to_string();
                if text.contains('.') || text.contains('e') || text.contains("inf") {
                    text
                } else {
                    format!("{}.0", text)
                }
            }
            Literal::Decimal(d) => d.clone(),
            Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
            Literal::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Literal::Guid(g) => format!("'{}'", g),
            Literal::Bytes(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
                format!("0x{}", hex)
            }
        }
    }
}

/// Resolves value types to database type mappings. Supplied by the host.
pub trait TypeMappingSource: Send + Sync {
    /// Mapping for the given value type, or `None` if the type has no database representation.
    fn find_mapping(&self, value_type: &ValueType) -> Option<TypeMapping>;

    /// The mapping truth-valued expressions carry.
    fn canonical_boolean_mapping(&self) -> TypeMapping;
}
