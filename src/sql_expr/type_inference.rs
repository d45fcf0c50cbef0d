//! Type-Mapping Inference Pass
//!
//! Fills in missing [`TypeMapping`]s on freshly built relational nodes.
//!
//! Rules, applied bottom-up and only to nodes that lack a mapping:
//! - An operand of a binary node with no mapping adopts its sibling's mapping when
//!   both have the same value kind (or the operand is a NULL literal), so that
//!   `age = 5` compares the literal as the column's store type.
//! - Conditions (comparisons, logical operators, `IS NULL`, `NOT` over a condition)
//!   take the canonical boolean mapping.
//! - Concatenation takes the first textual operand mapping; arithmetic and negation
//!   propagate an operand mapping of the same kind.
//! - Everything else falls back to the source's mapping for the node's value type.
//!
//! A node that already has a mapping is finished, subtree included: the pass
//! neither changes it nor walks into it. That makes the pass idempotent, and
//! its cost is bounded by the freshly built part of the tree.

use super::{SqlBinaryOperator, SqlExpr, SqlNode, SqlUnaryOperator};
use crate::type_mapping::{TypeMapping, TypeMappingSource};

pub struct TypeMappingInference<'a> {
    source: &'a dyn TypeMappingSource,
}

impl<'a> TypeMappingInference<'a> {
    pub fn new(source: &'a dyn TypeMappingSource) -> Self {
        TypeMappingInference { source }
    }

    /// Run the pass over `node` and its unmapped descendants.
    pub fn apply(&self, mut node: SqlNode) -> SqlNode {
        if node.type_mapping.is_some() {
            return node;
        }

        node.expr = match node.expr {
            SqlExpr::Binary {
                operator,
                left,
                right,
            } => {
                let (left, right) = self.infer_operands(*left, *right);
                SqlExpr::Binary {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            SqlExpr::Cast(operand) => SqlExpr::Cast(Box::new(self.apply(*operand))),
            SqlExpr::IsNull { operand, negated } => SqlExpr::IsNull {
                operand: Box::new(self.apply(*operand)),
                negated,
            },
            SqlExpr::Unary { operator, operand } => SqlExpr::Unary {
                operator,
                operand: Box::new(self.apply(*operand)),
            },
            SqlExpr::Function { name, args } => SqlExpr::Function {
                name,
                args: args.into_iter().map(|arg| self.apply(arg)).collect(),
            },
            leaf => leaf,
        };

        node.type_mapping = self.infer_own_mapping(&node);
        log::trace!(
            "TypeMappingInference: {:?} -> {:?}",
            node.value_type,
            node.type_mapping.as_ref().map(|m| m.store_type.as_str())
        );
        node
    }

    fn infer_operands(&self, mut left: SqlNode, mut right: SqlNode) -> (SqlNode, SqlNode) {
        if left.type_mapping.is_none() {
            left.type_mapping = adopt_sibling_mapping(&left, &right);
        }
        if right.type_mapping.is_none() {
            right.type_mapping = adopt_sibling_mapping(&right, &left);
        }

        let mut left = self.apply(left);
        let mut right = self.apply(right);

        // NULL literals have no mapping of their own; take whatever the sibling resolved to
        if left.type_mapping.is_none() && left.is_null_constant() {
            left.type_mapping = right.type_mapping.clone();
        }
        if right.type_mapping.is_none() && right.is_null_constant() {
            right.type_mapping = left.type_mapping.clone();
        }
        (left, right)
    }

    fn infer_own_mapping(&self, node: &SqlNode) -> Option<TypeMapping> {
        if node.is_condition {
            return Some(self.source.canonical_boolean_mapping());
        }

        let from_operands = match &node.expr {
            SqlExpr::Binary {
                operator: SqlBinaryOperator::Concat,
                left,
                right,
            } => [left, right]
                .iter()
                .filter_map(|operand| operand.type_mapping.as_ref())
                .find(|m| m.is_textual())
                .cloned(),
            SqlExpr::Binary { left, right, .. } => [left, right]
                .iter()
                .filter_map(|operand| operand.type_mapping.as_ref())
                .find(|m| m.kind == node.value_type.kind)
                .cloned(),
            SqlExpr::Unary {
                operator: SqlUnaryOperator::Negate,
                operand,
            } => operand
                .type_mapping
                .as_ref()
                .filter(|m| m.kind == node.value_type.kind)
                .cloned(),
            _ => None,
        };

        from_operands.or_else(|| self.source.find_mapping(&node.value_type))
    }
}

fn adopt_sibling_mapping(node: &SqlNode, sibling: &SqlNode) -> Option<TypeMapping> {
    sibling
        .type_mapping
        .as_ref()
        .filter(|m| node.is_null_constant() || m.kind == node.value_type.kind)
        .cloned()
}
