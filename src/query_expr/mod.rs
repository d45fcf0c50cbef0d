//! Query expression tree
//!
//! The object-level query AST handed to the translator by the query parser.
//! Nodes are immutable inputs: translation never mutates them, it builds new
//! relational trees from them.

use serde::{Deserialize, Serialize};

use crate::type_mapping::{Literal, TypeKind, ValueType};

/// Opaque per-row materialization slot backing an entity instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueBufferRef(pub u32);

/// Terminal marker naming an entity type and the value buffer that backs it.
/// Never translated to SQL itself; member and method rules special-case it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityShaperNode {
    pub entity_type: String,
    pub value_buffer: ValueBufferRef,
}

impl EntityShaperNode {
    pub fn new(entity_type: impl Into<String>, value_buffer: ValueBufferRef) -> Self {
        EntityShaperNode {
            entity_type: entity_type.into(),
            value_buffer,
        }
    }
}

/// Member name that unwraps a nullable value to its underlying value.
pub const NULLABLE_VALUE_MEMBER: &str = "value";

/// Method name of the string-concatenation operator overload.
pub const STRING_CONCAT_METHOD: &str = "concat";

/// A field or property reference (`expr.member`, or a static member when there is no target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub declaring_type: ValueType,
    pub name: String,
    pub value_type: ValueType,
}

impl MemberInfo {
    pub fn new(declaring_type: ValueType, name: impl Into<String>, value_type: ValueType) -> Self {
        MemberInfo {
            declaring_type,
            name: name.into(),
            value_type,
        }
    }

    /// `x.value` on a nullable `x`.
    pub fn is_nullable_value(&self) -> bool {
        self.declaring_type.nullable && self.name == NULLABLE_VALUE_MEMBER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Instance,
    Static,
    /// Reserved `property(entity, "Name")` accessor for dynamically named properties.
    PropertyAccessor,
}

/// A resolved method or operator overload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub kind: MethodKind,
    pub declaring_type: TypeKind,
    pub name: String,
    pub return_type: ValueType,
}

impl MethodInfo {
    pub fn instance(declaring_type: TypeKind, name: impl Into<String>, return_type: ValueType) -> Self {
        MethodInfo {
            kind: MethodKind::Instance,
            declaring_type,
            name: name.into(),
            return_type,
        }
    }

    pub fn static_method(
        declaring_type: TypeKind,
        name: impl Into<String>,
        return_type: ValueType,
    ) -> Self {
        MethodInfo {
            kind: MethodKind::Static,
            declaring_type,
            name: name.into(),
            return_type,
        }
    }

    pub fn property_accessor(return_type: ValueType) -> Self {
        MethodInfo {
            kind: MethodKind::PropertyAccessor,
            declaring_type: TypeKind::Object,
            name: "property".to_string(),
            return_type,
        }
    }

    /// The `string + x` overload.
    pub fn string_concat() -> Self {
        Self::static_method(TypeKind::String, STRING_CONCAT_METHOD, ValueType::string())
    }

    pub fn is_string_concat(&self) -> bool {
        self.declaring_type == TypeKind::String
            && self.kind == MethodKind::Static
            && self.name.eq_ignore_ascii_case(STRING_CONCAT_METHOD)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
}

impl BinaryOperator {
    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOperator::Equal | BinaryOperator::NotEqual)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::AndAlso | BinaryOperator::OrElse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Type conversion to the node's value type.
    Convert,
    Not,
    Negate,
}

/// Object construction used by projections (`new { a, b }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectConstruction {
    pub type_name: String,
    /// Member bound by each argument, positionally.
    pub members: Vec<String>,
    pub arguments: Vec<QueryNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    MemberAccess {
        /// `None` for static members.
        inner: Option<Box<QueryNode>>,
        member: MemberInfo,
    },

    MethodCall {
        /// `None` for static methods.
        target: Option<Box<QueryNode>>,
        method: MethodInfo,
        arguments: Vec<QueryNode>,
    },

    Binary {
        operator: BinaryOperator,
        left: Box<QueryNode>,
        right: Box<QueryNode>,
        /// Resolved operator overload, if any.
        method: Option<MethodInfo>,
        value_type: ValueType,
    },

    Unary {
        operator: UnaryOperator,
        operand: Box<QueryNode>,
        value_type: ValueType,
    },

    Constant {
        value: Literal,
        value_type: ValueType,
    },

    /// Query parameter supplied at execution time.
    Parameter { name: String, value_type: ValueType },

    ObjectConstruction(ObjectConstruction),

    EntityShaper(EntityShaperNode),

    /// Extension node with no dedicated translation; its children are translated structurally.
    Opaque { name: String, children: Vec<QueryNode> },
}

impl QueryNode {
    pub fn member(inner: QueryNode, member: MemberInfo) -> Self {
        QueryNode::MemberAccess {
            inner: Some(Box::new(inner)),
            member,
        }
    }

    pub fn static_member(member: MemberInfo) -> Self {
        QueryNode::MemberAccess { inner: None, member }
    }

    pub fn call(target: QueryNode, method: MethodInfo, arguments: Vec<QueryNode>) -> Self {
        QueryNode::MethodCall {
            target: Some(Box::new(target)),
            method,
            arguments,
        }
    }

    pub fn static_call(method: MethodInfo, arguments: Vec<QueryNode>) -> Self {
        QueryNode::MethodCall {
            target: None,
            method,
            arguments,
        }
    }

    pub fn binary(operator: BinaryOperator, left: QueryNode, right: QueryNode, value_type: ValueType) -> Self {
        QueryNode::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            method: None,
            value_type,
        }
    }

    /// `left + right` resolved to the string-concatenation overload.
    pub fn string_concat(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::Binary {
            operator: BinaryOperator::Add,
            left: Box::new(left),
            right: Box::new(right),
            method: Some(MethodInfo::string_concat()),
            value_type: ValueType::string(),
        }
    }

    pub fn convert(operand: QueryNode, target: ValueType) -> Self {
        QueryNode::Unary {
            operator: UnaryOperator::Convert,
            operand: Box::new(operand),
            value_type: target,
        }
    }

    pub fn not(operand: QueryNode) -> Self {
        QueryNode::Unary {
            operator: UnaryOperator::Not,
            operand: Box::new(operand),
            value_type: ValueType::boolean(),
        }
    }

    pub fn constant(value: Literal, value_type: ValueType) -> Self {
        QueryNode::Constant { value, value_type }
    }

    /// Untyped null literal.
    pub fn null() -> Self {
        QueryNode::Constant {
            value: Literal::Null,
            value_type: ValueType::nullable(TypeKind::Object),
        }
    }

    pub fn shaper(entity_type: impl Into<String>, value_buffer: ValueBufferRef) -> Self {
        QueryNode::EntityShaper(EntityShaperNode::new(entity_type, value_buffer))
    }

    pub fn is_null_constant(&self) -> bool {
        matches!(
            self,
            QueryNode::Constant {
                value: Literal::Null,
                ..
            }
        )
    }

    /// Direct subexpressions, in translation order.
    pub fn children(&self) -> Vec<&QueryNode> {
        match self {
            QueryNode::MemberAccess { inner, .. } => inner.iter().map(|inner| inner.as_ref()).collect(),
            QueryNode::MethodCall {
                target, arguments, ..
            } => target.iter().map(|target| target.as_ref()).chain(arguments).collect(),
            QueryNode::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            QueryNode::Unary { operand, .. } => vec![operand.as_ref()],
            QueryNode::ObjectConstruction(construction) => construction.arguments.iter().collect(),
            QueryNode::Opaque { children, .. } => children.iter().collect(),
            QueryNode::Constant { .. } | QueryNode::Parameter { .. } | QueryNode::EntityShaper(_) => {
                Vec::new()
            }
        }
    }

    /// Number of nodes on the longest root-to-leaf path. Walks with an explicit
    /// stack, so it is safe on trees too deep to recurse over.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children().into_iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Static type of this node. Shapers, constructions and opaque nodes are object-typed.
    pub fn value_type(&self) -> ValueType {
        match self {
            QueryNode::MemberAccess { member, .. } => member.value_type,
            QueryNode::MethodCall { method, .. } => method.return_type,
            QueryNode::Binary { value_type, .. }
            | QueryNode::Unary { value_type, .. }
            | QueryNode::Constant { value_type, .. }
            | QueryNode::Parameter { value_type, .. } => *value_type,
            QueryNode::ObjectConstruction(_)
            | QueryNode::EntityShaper(_)
            | QueryNode::Opaque { .. } => ValueType::object(),
        }
    }
}
