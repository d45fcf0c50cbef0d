//! Relational expression tree
//!
//! [`SqlNode`] is what the SQL renderer consumes. Every node carries its static
//! value type, an optional [`TypeMapping`] (filled in by the inference pass when
//! not known at construction) and whether it denotes a truth-valued condition.

use serde::{Deserialize, Serialize};

use crate::type_mapping::{Literal, TypeMapping, ValueType};

pub mod select_context;
pub mod type_inference;

pub use select_context::{SelectContext, SelectExpression, TableExpression};
pub use type_inference::TypeMappingInference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlBinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Concat,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    Like,
}

impl SqlBinaryOperator {
    /// Operators whose result is a truth value.
    pub fn is_condition(&self) -> bool {
        matches!(
            self,
            SqlBinaryOperator::Equal
                | SqlBinaryOperator::NotEqual
                | SqlBinaryOperator::LessThan
                | SqlBinaryOperator::LessThanOrEqual
                | SqlBinaryOperator::GreaterThan
                | SqlBinaryOperator::GreaterThanOrEqual
                | SqlBinaryOperator::And
                | SqlBinaryOperator::Or
                | SqlBinaryOperator::Like
        )
    }

    pub fn is_comparison(&self) -> bool {
        self.is_condition() && !matches!(self, SqlBinaryOperator::And | SqlBinaryOperator::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlUnaryOperator {
    Not,
    Negate,
}

/// Column of a table registered in the select context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table_alias: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlExpr {
    /// Raw SQL text, emitted verbatim.
    Fragment(String),

    Constant(Literal),

    Parameter(String),

    Column(ColumnRef),

    /// Conversion to the enclosing node's value type.
    Cast(Box<SqlNode>),

    IsNull {
        operand: Box<SqlNode>,
        negated: bool,
    },

    Binary {
        operator: SqlBinaryOperator,
        left: Box<SqlNode>,
        right: Box<SqlNode>,
    },

    Unary {
        operator: SqlUnaryOperator,
        operand: Box<SqlNode>,
    },

    Function {
        name: String,
        args: Vec<SqlNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlNode {
    pub expr: SqlExpr,
    pub value_type: ValueType,
    pub type_mapping: Option<TypeMapping>,
    pub is_condition: bool,
}

impl SqlNode {
    fn unmapped(expr: SqlExpr, value_type: ValueType, is_condition: bool) -> Self {
        SqlNode {
            expr,
            value_type,
            type_mapping: None,
            is_condition,
        }
    }

    pub fn fragment(sql: impl Into<String>, value_type: ValueType) -> Self {
        Self::unmapped(SqlExpr::Fragment(sql.into()), value_type, false)
    }

    pub fn constant(value: Literal, value_type: ValueType) -> Self {
        Self::unmapped(SqlExpr::Constant(value), value_type, false)
    }

    pub fn parameter(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::unmapped(SqlExpr::Parameter(name.into()), value_type, false)
    }

    pub fn column(column: ColumnRef, value_type: ValueType, type_mapping: Option<TypeMapping>) -> Self {
        SqlNode {
            expr: SqlExpr::Column(column),
            value_type,
            type_mapping,
            is_condition: false,
        }
    }

    /// Nullability of the target follows the operand.
    pub fn cast(operand: SqlNode, target: ValueType) -> Self {
        let value_type = target.with_nullability(target.nullable || operand.value_type.nullable);
        Self::unmapped(SqlExpr::Cast(Box::new(operand)), value_type, false)
    }

    pub fn is_null(operand: SqlNode, negated: bool) -> Self {
        Self::unmapped(
            SqlExpr::IsNull {
                operand: Box::new(operand),
                negated,
            },
            ValueType::boolean(),
            true,
        )
    }

    pub fn binary(operator: SqlBinaryOperator, left: SqlNode, right: SqlNode, value_type: ValueType) -> Self {
        Self::unmapped(
            SqlExpr::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            value_type,
            operator.is_condition(),
        )
    }

    pub fn unary(operator: SqlUnaryOperator, operand: SqlNode, value_type: ValueType) -> Self {
        let is_condition = operator == SqlUnaryOperator::Not && operand.is_condition;
        Self::unmapped(
            SqlExpr::Unary {
                operator,
                operand: Box::new(operand),
            },
            value_type,
            is_condition,
        )
    }

    pub fn function(name: impl Into<String>, args: Vec<SqlNode>, value_type: ValueType) -> Self {
        Self::unmapped(
            SqlExpr::Function {
                name: name.into(),
                args,
            },
            value_type,
            false,
        )
    }

    pub fn with_type_mapping(mut self, type_mapping: TypeMapping) -> Self {
        self.type_mapping = Some(type_mapping);
        self
    }

    /// Copy with declared nullability forced off. Changes no runtime value.
    pub fn into_non_nullable(mut self) -> Self {
        self.value_type = self.value_type.non_nullable();
        self
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(self.expr, SqlExpr::Constant(Literal::Null))
    }

    pub fn as_constant(&self) -> Option<&Literal> {
        match &self.expr {
            SqlExpr::Constant(lit) => Some(lit),
            _ => None,
        }
    }

    /// Direct child nodes, in evaluation order.
    pub fn children(&self) -> Vec<&SqlNode> {
        match &self.expr {
            SqlExpr::Fragment(_)
            | SqlExpr::Constant(_)
            | SqlExpr::Parameter(_)
            | SqlExpr::Column(_) => vec![],
            SqlExpr::Cast(operand) => vec![operand.as_ref()],
            SqlExpr::IsNull { operand, .. } | SqlExpr::Unary { operand, .. } => vec![operand.as_ref()],
            SqlExpr::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            SqlExpr::Function { args, .. } => args.iter().collect(),
        }
    }

    /// True when this node and every descendant carry a type mapping.
    pub fn is_fully_mapped(&self) -> bool {
        self.type_mapping.is_some() && self.children().iter().all(|c| c.is_fully_mapped())
    }
}
