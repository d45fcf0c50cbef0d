//! Expression Translator
//!
//! Rewrites a [`QueryNode`] tree into a relational [`SqlNode`] tree, bottom-up.
//!
//! Each node kind is either resolved against the [`SelectContext`] (entity
//! properties), rebuilt structurally from its translated children (operators,
//! conversions, projections), or handed to a provider chain (members and method
//! calls with no structural meaning). Subexpressions with no SQL equivalent come
//! back as [`Translated::Untranslatable`] so the caller can decide whether to
//! evaluate them on the client; only inconsistencies between the tree and its
//! collaborators are reported as [`TranslationError`].
//!
//! The select context is passed into every call and never stored, so one
//! [`SqlTranslator`] can serve any number of queries, including concurrently from
//! several threads as long as each thread uses its own context.

use std::sync::Arc;

use serde::Serialize;

use crate::config::TranslatorConfig;
use crate::entity_catalog::MetadataStore;
use crate::query_expr::{
    BinaryOperator, EntityShaperNode, MemberInfo, MethodInfo, MethodKind, ObjectConstruction,
    QueryNode, UnaryOperator,
};
use crate::sql_expr::{
    SelectContext, SqlBinaryOperator, SqlExpr, SqlNode, SqlUnaryOperator, TypeMappingInference,
};
use crate::type_mapping::{Literal, TypeKind, TypeMapping, TypeMappingSource, ValueType};

pub mod errors;
pub mod providers;

#[cfg(test)]
mod tests;

pub use errors::TranslationError;
use providers::{
    DateTimeMemberTranslator, EqualsTranslator, FunctionRegistryTranslator, MemberTranslator,
    MethodCallTranslator, NullableHasValueTranslator, ProviderChain, ProviderOutcome,
    RewrittenCall, RewrittenMember, StringLengthTranslator, StringMethodTranslator,
};

/// Deepest tree translated on the calling thread.
pub const INLINE_DEPTH: usize = 64;

const WORKER_BASE_STACK: usize = 256 * 1024;

/// Upper bound on the stack one nesting level takes, unoptimized builds included.
const WORKER_STACK_PER_LEVEL: usize = 32 * 1024;

/// One field of a translated object construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedField {
    pub member: String,
    pub value: Translated,
}

/// Result of translating a query subexpression.
///
/// `Untranslatable` is distinct from an SQL `NULL`, which is an
/// `Sql` node holding [`Literal::Null`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Translated {
    Sql(SqlNode),

    /// Entity shaper passed through for enclosing member/method rules.
    Shaper(EntityShaperNode),

    /// Conversion kept at the query level (object erasure, or an operand that is
    /// not an SQL node). No SQL cast is emitted for it.
    Convert {
        operand: Box<Translated>,
        target: ValueType,
    },

    /// Ordered field values of an object construction. A projection-shape marker
    /// for the caller, not SQL data.
    Projection(Vec<ProjectedField>),

    /// Extension node with structurally translated children.
    Opaque { name: String, children: Vec<Translated> },

    Untranslatable,
}

impl Translated {
    pub fn as_sql(&self) -> Option<&SqlNode> {
        match self {
            Translated::Sql(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_sql(self) -> Option<SqlNode> {
        match self {
            Translated::Sql(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_untranslatable(&self) -> bool {
        matches!(self, Translated::Untranslatable)
    }

    /// False if this result or anything nested in it is untranslatable.
    pub fn is_fully_translated(&self) -> bool {
        match self {
            Translated::Untranslatable => false,
            Translated::Sql(_) | Translated::Shaper(_) => true,
            Translated::Convert { operand, .. } => operand.is_fully_translated(),
            Translated::Projection(fields) => fields.iter().all(|f| f.value.is_fully_translated()),
            Translated::Opaque { children, .. } => children.iter().all(Translated::is_fully_translated),
        }
    }

    /// Drop a redundant object-erasure conversion around an SQL operand.
    fn strip_erasure(self) -> Translated {
        match self {
            Translated::Convert { operand, target }
                if target.is_object_erasure() && operand.as_sql().is_some() =>
            {
                *operand
            }
            other => other,
        }
    }
}

pub struct SqlTranslator {
    metadata: Arc<dyn MetadataStore>,
    type_mappings: Arc<dyn TypeMappingSource>,
    member_translators: ProviderChain<dyn MemberTranslator>,
    method_translators: ProviderChain<dyn MethodCallTranslator>,
    config: TranslatorConfig,
}

impl SqlTranslator {
    /// Translator with empty provider chains.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        type_mappings: Arc<dyn TypeMappingSource>,
        config: TranslatorConfig,
    ) -> Self {
        SqlTranslator {
            metadata,
            type_mappings,
            member_translators: ProviderChain::new(),
            method_translators: ProviderChain::new(),
            config,
        }
    }

    /// Translator with the generic providers registered, in this order:
    /// members: has_value, string length, date/time parts;
    /// methods: equals, LIKE patterns, function registry.
    pub fn with_default_providers(
        metadata: Arc<dyn MetadataStore>,
        type_mappings: Arc<dyn TypeMappingSource>,
        config: TranslatorConfig,
    ) -> Self {
        let mut translator = Self::new(metadata, type_mappings, config);
        translator
            .member_translators
            .register(Box::new(NullableHasValueTranslator))
            .register(Box::new(StringLengthTranslator))
            .register(Box::new(DateTimeMemberTranslator));
        translator
            .method_translators
            .register(Box::new(EqualsTranslator))
            .register(Box::new(StringMethodTranslator))
            .register(Box::new(FunctionRegistryTranslator));
        translator
    }

    /// Default providers plus the configured dialect's built-in type mappings.
    pub fn from_config(metadata: Arc<dyn MetadataStore>, config: TranslatorConfig) -> Self {
        let type_mappings: Arc<dyn TypeMappingSource> = Arc::new(config.type_mapping_source());
        Self::with_default_providers(metadata, type_mappings, config)
    }

    pub fn member_translators_mut(&mut self) -> &mut ProviderChain<dyn MemberTranslator> {
        &mut self.member_translators
    }

    pub fn method_translators_mut(&mut self) -> &mut ProviderChain<dyn MethodCallTranslator> {
        &mut self.method_translators
    }

    pub fn type_mappings(&self) -> &Arc<dyn TypeMappingSource> {
        &self.type_mappings
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate `expr` against `context`.
    ///
    /// With `require_condition`, a boolean-valued SQL result that is not already a
    /// predicate is wrapped in an explicit truth test.
    ///
    /// Trees nested deeper than `max_expression_depth` are rejected before anything
    /// is bound on `context`. Trees deeper than [`INLINE_DEPTH`] are translated on a
    /// worker thread whose stack is sized to their depth.
    pub fn translate(
        &self,
        context: &mut dyn SelectContext,
        expr: &QueryNode,
        require_condition: bool,
    ) -> Result<Translated, TranslationError> {
        let max_depth = self.config.max_expression_depth;
        let depth = expr.depth();
        if depth > max_depth as usize {
            return Err(TranslationError::ExpressionTooDeep(max_depth));
        }
        if depth <= INLINE_DEPTH {
            return self.translate_inline(context, expr, require_condition);
        }

        let stack_size = WORKER_BASE_STACK + depth * WORKER_STACK_PER_LEVEL;
        log::debug!(
            "SqlTranslator: expression depth {} exceeds {}, translating on a {} KiB stack",
            depth,
            INLINE_DEPTH,
            stack_size / 1024
        );
        std::thread::scope(|scope| -> Result<Translated, TranslationError> {
            let worker = std::thread::Builder::new()
                .name("relq-translate".to_string())
                .stack_size(stack_size)
                .spawn_scoped(scope, move || self.translate_inline(context, expr, require_condition))
                .map_err(|e| TranslationError::WorkerUnavailable(e.to_string()))?;
            worker
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        })
    }

    fn translate_inline(
        &self,
        context: &mut dyn SelectContext,
        expr: &QueryNode,
        require_condition: bool,
    ) -> Result<Translated, TranslationError> {
        log::debug!(
            "SqlTranslator: translating {} (require_condition={})",
            node_kind(expr),
            require_condition
        );

        let mut scope = TranslationScope::new(self, context);
        let result = match scope.visit(expr)? {
            Translated::Sql(node) => {
                let node = scope.inference.apply(node);
                if require_condition {
                    Translated::Sql(self.as_condition(node))
                } else {
                    Translated::Sql(node)
                }
            }
            Translated::Untranslatable => {
                if self.config.log_client_evaluation {
                    log::warn!(
                        "SqlTranslator: {} could not be translated to SQL and will be evaluated on the client",
                        node_kind(expr)
                    );
                }
                Translated::Untranslatable
            }
            other => other,
        };
        Ok(result)
    }

    /// `node = TRUE` for a bare boolean value; predicates pass through.
    fn as_condition(&self, node: SqlNode) -> SqlNode {
        if node.is_condition {
            return node;
        }
        let Some(mapping) = node.type_mapping.clone() else {
            return node;
        };
        if mapping.kind != TypeKind::Boolean {
            return node;
        }

        let truth = SqlNode::constant(Literal::Boolean(true), ValueType::boolean()).with_type_mapping(mapping);
        SqlNode::binary(SqlBinaryOperator::Equal, node, truth, ValueType::boolean())
            .with_type_mapping(self.type_mappings.canonical_boolean_mapping())
    }
}

/// State of one top-level `translate` call.
struct TranslationScope<'t, 'c> {
    translator: &'t SqlTranslator,
    context: &'c mut dyn SelectContext,
    inference: TypeMappingInference<'t>,
}

impl<'t, 'c> TranslationScope<'t, 'c> {
    fn new(translator: &'t SqlTranslator, context: &'c mut dyn SelectContext) -> Self {
        TranslationScope {
            translator,
            context,
            inference: TypeMappingInference::new(translator.type_mappings.as_ref()),
        }
    }

    fn visit(&mut self, expr: &QueryNode) -> Result<Translated, TranslationError> {
        let result = self.visit_node(expr);

        if let Ok(Translated::Untranslatable) = &result {
            log::debug!("SqlTranslator: {} is untranslatable", node_kind(expr));
        }
        result
    }

    fn visit_node(&mut self, expr: &QueryNode) -> Result<Translated, TranslationError> {
        match expr {
            QueryNode::MemberAccess { inner, member } => self.visit_member(inner.as_deref(), member),
            QueryNode::MethodCall {
                target,
                method,
                arguments,
            } => self.visit_call(target.as_deref(), method, arguments),
            QueryNode::Binary {
                operator,
                left,
                right,
                method,
                value_type,
            } => self.visit_binary(*operator, left, right, method.as_ref(), *value_type),
            QueryNode::Unary {
                operator,
                operand,
                value_type,
            } => self.visit_unary(*operator, operand, *value_type),
            QueryNode::Constant { value, value_type } => {
                Ok(Translated::Sql(SqlNode::constant(value.clone(), *value_type)))
            }
            QueryNode::Parameter { name, value_type } => {
                Ok(Translated::Sql(SqlNode::parameter(name.clone(), *value_type)))
            }
            QueryNode::ObjectConstruction(construction) => self.visit_construction(construction),
            QueryNode::EntityShaper(shaper) => Ok(Translated::Shaper(shaper.clone())),
            QueryNode::Opaque { name, children } => {
                let children = children
                    .iter()
                    .map(|child| self.visit(child))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Translated::Opaque {
                    name: name.clone(),
                    children,
                })
            }
        }
    }

    fn visit_member(
        &mut self,
        inner: Option<&QueryNode>,
        member: &MemberInfo,
    ) -> Result<Translated, TranslationError> {
        let inner = match inner {
            Some(inner) => Some(self.visit(inner)?),
            None => None,
        };

        match inner {
            Some(Translated::Shaper(shaper)) => self.bind_property(&shaper, &member.name),
            Some(Translated::Sql(node)) if member.is_nullable_value() => {
                Ok(Translated::Sql(node.into_non_nullable()))
            }
            inner => {
                let rewritten = RewrittenMember {
                    inner,
                    member: member.clone(),
                };
                Ok(match self.translator.member_translators.translate(&rewritten) {
                    ProviderOutcome::Matched(node) => Translated::Sql(self.inference.apply(node)),
                    ProviderOutcome::Declined => Translated::Untranslatable,
                })
            }
        }
    }

    fn visit_call(
        &mut self,
        target: Option<&QueryNode>,
        method: &MethodInfo,
        arguments: &[QueryNode],
    ) -> Result<Translated, TranslationError> {
        let mut translated = Vec::with_capacity(arguments.len());
        let mut remaining = arguments;
        if let Some(property_name) = dynamic_property_name(method, arguments) {
            match self.visit(&arguments[0])? {
                Translated::Shaper(shaper) => return self.bind_property(&shaper, property_name),
                source => {
                    translated.push(source);
                    remaining = &arguments[1..];
                }
            }
        }

        let target = match target {
            Some(target) => Some(self.visit(target)?),
            None => None,
        };
        // Each argument independently; an untranslatable one stays in place
        for argument in remaining {
            translated.push(self.visit(argument)?);
        }

        let rewritten = RewrittenCall {
            target,
            method: method.clone(),
            arguments: translated,
        };
        Ok(match self.translator.method_translators.translate(&rewritten) {
            ProviderOutcome::Matched(node) => Translated::Sql(self.inference.apply(node)),
            ProviderOutcome::Declined => Translated::Untranslatable,
        })
    }

    fn bind_property(
        &mut self,
        shaper: &EntityShaperNode,
        property_name: &str,
    ) -> Result<Translated, TranslationError> {
        let entity = self
            .translator
            .metadata
            .find_entity_type(&shaper.entity_type)
            .ok_or_else(|| TranslationError::UnknownEntityType(shaper.entity_type.clone()))?;
        let property = entity
            .find_property(property_name)
            .ok_or_else(|| TranslationError::PropertyNotFound {
                entity: entity.name.clone(),
                property: property_name.to_string(),
            })?;

        log::trace!(
            "SqlTranslator: binding {}.{} via {:?}",
            entity.name,
            property.name,
            shaper.value_buffer
        );
        let column = self.context.bind_property(shaper.value_buffer, property)?;
        Ok(Translated::Sql(column))
    }

    fn visit_binary(
        &mut self,
        operator: BinaryOperator,
        left: &QueryNode,
        right: &QueryNode,
        method: Option<&MethodInfo>,
        value_type: ValueType,
    ) -> Result<Translated, TranslationError> {
        let left = self.visit(left)?;
        let right = self.visit(right)?;

        if operator == BinaryOperator::Add && method.is_some_and(MethodInfo::is_string_concat) {
            return self.string_concat(left, right);
        }

        let (Some(left), Some(right)) = (
            left.strip_erasure().into_sql(),
            right.strip_erasure().into_sql(),
        ) else {
            return Ok(Translated::Untranslatable);
        };

        if operator.is_equality() && is_null_literal(&left) != is_null_literal(&right) {
            let operand = if is_null_literal(&left) { right } else { left };
            let negated = operator == BinaryOperator::NotEqual;
            return Ok(Translated::Sql(
                self.inference.apply(SqlNode::is_null(operand, negated)),
            ));
        }

        let (left, right) = if operator.is_logical() {
            (self.condition_operand(left), self.condition_operand(right))
        } else {
            (left, right)
        };

        let node = SqlNode::binary(sql_operator(operator), left, right, value_type);
        Ok(Translated::Sql(self.inference.apply(node)))
    }

    fn string_concat(&mut self, left: Translated, right: Translated) -> Result<Translated, TranslationError> {
        let (Some(left), Some(right)) = (
            left.strip_erasure().into_sql(),
            right.strip_erasure().into_sql(),
        ) else {
            return Ok(Translated::Untranslatable);
        };

        // Mappings the operands already carry (columns, explicit casts) win over
        // defaults the inference pass would pick for a bare literal
        let carried = first_textual_mapping(&left, &right);
        let left = self.inference.apply(left);
        let right = self.inference.apply(right);

        let mapping = carried
            .or_else(|| first_textual_mapping(&left, &right))
            .ok_or_else(|| TranslationError::ConcatTypeMappingNotInferred {
                left: left.value_type.to_string(),
                right: right.value_type.to_string(),
            })?;

        let as_text = |operand: SqlNode| {
            if operand.value_type.is_textual() {
                operand.with_type_mapping(mapping.clone())
            } else {
                SqlNode::cast(operand, ValueType::string()).with_type_mapping(mapping.clone())
            }
        };
        let left = as_text(left);
        let right = as_text(right);

        let value_type = ValueType::string().with_nullability(left.value_type.nullable || right.value_type.nullable);
        Ok(Translated::Sql(
            SqlNode::binary(SqlBinaryOperator::Concat, left, right, value_type).with_type_mapping(mapping),
        ))
    }

    fn visit_unary(
        &mut self,
        operator: UnaryOperator,
        operand: &QueryNode,
        value_type: ValueType,
    ) -> Result<Translated, TranslationError> {
        let operand = self.visit(operand)?;
        if !operand.is_fully_translated() {
            return Ok(Translated::Untranslatable);
        }

        match operator {
            UnaryOperator::Convert => Ok(match operand {
                Translated::Sql(node) if !value_type.is_object_erasure() => {
                    Translated::Sql(self.inference.apply(SqlNode::cast(node, value_type)))
                }
                operand => Translated::Convert {
                    operand: Box::new(operand),
                    target: value_type,
                },
            }),
            UnaryOperator::Not => Ok(match operand.strip_erasure() {
                Translated::Sql(node) => {
                    let node = self.condition_operand(node);
                    Translated::Sql(self.inference.apply(SqlNode::unary(
                        SqlUnaryOperator::Not,
                        node,
                        value_type,
                    )))
                }
                _ => Translated::Untranslatable,
            }),
            UnaryOperator::Negate => Ok(match operand.strip_erasure() {
                Translated::Sql(node) => Translated::Sql(self.inference.apply(SqlNode::unary(
                    SqlUnaryOperator::Negate,
                    node,
                    value_type,
                ))),
                _ => Translated::Untranslatable,
            }),
        }
    }

    fn visit_construction(&mut self, construction: &ObjectConstruction) -> Result<Translated, TranslationError> {
        if construction.members.is_empty()
            || construction.arguments.is_empty()
            || construction.members.len() != construction.arguments.len()
        {
            return Ok(Translated::Untranslatable);
        }

        let mut fields = Vec::with_capacity(construction.arguments.len());
        for (member, argument) in construction.members.iter().zip(&construction.arguments) {
            let value = match self.visit(argument)? {
                Translated::Sql(node) => Translated::Sql(self.inference.apply(node)),
                other if other.is_fully_translated() => other,
                _ => {
                    log::debug!(
                        "SqlTranslator: field '{}' of {} is untranslatable",
                        member,
                        construction.type_name
                    );
                    return Ok(Translated::Untranslatable);
                }
            };
            fields.push(ProjectedField {
                member: member.clone(),
                value,
            });
        }
        Ok(Translated::Projection(fields))
    }

    /// Mapped operand of a logical operator, wrapped into a predicate if needed.
    fn condition_operand(&self, node: SqlNode) -> SqlNode {
        self.translator.as_condition(self.inference.apply(node))
    }
}

/// Property name of a `property(entity, "Name")` accessor call.
fn dynamic_property_name<'a>(method: &MethodInfo, arguments: &'a [QueryNode]) -> Option<&'a str> {
    if method.kind != MethodKind::PropertyAccessor || arguments.len() != 2 {
        return None;
    }
    match &arguments[1] {
        QueryNode::Constant {
            value: Literal::String(name),
            ..
        } => Some(name.as_str()),
        _ => None,
    }
}

fn first_textual_mapping(left: &SqlNode, right: &SqlNode) -> Option<TypeMapping> {
    [left, right]
        .into_iter()
        .filter_map(|operand| operand.type_mapping.as_ref())
        .find(|mapping| mapping.is_textual())
        .cloned()
}

/// SQL `NULL`, bare or under a cast.
fn is_null_literal(node: &SqlNode) -> bool {
    match &node.expr {
        SqlExpr::Cast(operand) => is_null_literal(operand),
        _ => node.is_null_constant(),
    }
}

fn sql_operator(operator: BinaryOperator) -> SqlBinaryOperator {
    match operator {
        BinaryOperator::Add => SqlBinaryOperator::Add,
        BinaryOperator::Subtract => SqlBinaryOperator::Subtract,
        BinaryOperator::Multiply => SqlBinaryOperator::Multiply,
        BinaryOperator::Divide => SqlBinaryOperator::Divide,
        BinaryOperator::Modulo => SqlBinaryOperator::Modulo,
        BinaryOperator::Equal => SqlBinaryOperator::Equal,
        BinaryOperator::NotEqual => SqlBinaryOperator::NotEqual,
        BinaryOperator::LessThan => SqlBinaryOperator::LessThan,
        BinaryOperator::LessThanOrEqual => SqlBinaryOperator::LessThanOrEqual,
        BinaryOperator::GreaterThan => SqlBinaryOperator::GreaterThan,
        BinaryOperator::GreaterThanOrEqual => SqlBinaryOperator::GreaterThanOrEqual,
        BinaryOperator::AndAlso => SqlBinaryOperator::And,
        BinaryOperator::OrElse => SqlBinaryOperator::Or,
    }
}

fn node_kind(expr: &QueryNode) -> &'static str {
    match expr {
        QueryNode::MemberAccess { .. } => "member access",
        QueryNode::MethodCall { .. } => "method call",
        QueryNode::Binary { .. } => "binary expression",
        QueryNode::Unary { .. } => "unary expression",
        QueryNode::Constant { .. } => "constant",
        QueryNode::Parameter { .. } => "parameter",
        QueryNode::ObjectConstruction(_) => "object construction",
        QueryNode::EntityShaper(_) => "entity shaper",
        QueryNode::Opaque { .. } => "opaque node",
    }
}
