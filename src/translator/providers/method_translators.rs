//! Generic method-call translators shared by every dialect.

use super::function_registry::get_function_mapping;
use super::{MethodCallTranslator, ProviderOutcome, RewrittenCall};
use crate::query_expr::MethodKind;
use crate::sql_expr::{SqlBinaryOperator, SqlNode};
use crate::type_mapping::{Literal, TypeKind, ValueType};

/// `a.equals(b)` → `a = b`.
pub struct EqualsTranslator;

impl MethodCallTranslator for EqualsTranslator {
    fn translate(&self, call: &RewrittenCall) -> ProviderOutcome {
        if call.method.kind != MethodKind::Instance
            || call.method.name != "equals"
            || call.arguments.len() != 1
        {
            return ProviderOutcome::Declined;
        }
        match (call.target_sql(), call.argument_sql(0)) {
            (Some(left), Some(right)) => ProviderOutcome::Matched(SqlNode::binary(
                SqlBinaryOperator::Equal,
                left.clone(),
                right.clone(),
                ValueType::boolean(),
            )),
            _ => ProviderOutcome::Declined,
        }
    }
}

/// `starts_with` / `ends_with` / `contains` on strings with a constant pattern → `LIKE`.
///
/// Declines when the pattern is not a constant or contains LIKE wildcards, leaving
/// the call to client evaluation.
pub struct StringMethodTranslator;

impl MethodCallTranslator for StringMethodTranslator {
    fn translate(&self, call: &RewrittenCall) -> ProviderOutcome {
        if call.method.kind != MethodKind::Instance
            || call.method.declaring_type != TypeKind::String
            || call.arguments.len() != 1
        {
            return ProviderOutcome::Declined;
        }

        let (Some(target), Some(pattern)) = (call.target_sql(), call.argument_sql(0)) else {
            return ProviderOutcome::Declined;
        };
        let Some(Literal::String(text)) = pattern.as_constant() else {
            return ProviderOutcome::Declined;
        };
        if text.contains(['%', '_', '[']) {
            return ProviderOutcome::Declined;
        }

        let like = match call.method.name.as_str() {
            "starts_with" => format!("{}%", text),
            "ends_with" => format!("%{}", text),
            "contains" => format!("%{}%", text),
            _ => return ProviderOutcome::Declined,
        };

        ProviderOutcome::Matched(SqlNode::binary(
            SqlBinaryOperator::Like,
            target.clone(),
            SqlNode::constant(Literal::String(like), ValueType::string()),
            ValueType::boolean(),
        ))
    }
}

/// Calls with an entry in the function registry → SQL function call.
pub struct FunctionRegistryTranslator;

impl MethodCallTranslator for FunctionRegistryTranslator {
    fn translate(&self, call: &RewrittenCall) -> ProviderOutcome {
        let Some(mapping) = get_function_mapping(&call.method.name) else {
            return ProviderOutcome::Declined;
        };
        if !mapping.accepts(call.method.kind, call.method.declaring_type) {
            return ProviderOutcome::Declined;
        }
        let Some(arguments) = call.arguments_sql() else {
            return ProviderOutcome::Declined;
        };

        let mut args: Vec<SqlNode> = Vec::with_capacity(arguments.len() + 1);
        if mapping.instance_of.is_some() {
            match call.target_sql() {
                Some(target) => args.push(target.clone()),
                None => return ProviderOutcome::Declined,
            }
        }
        args.extend(arguments.into_iter().cloned());

        let nullable = args.iter().any(|a| a.value_type.nullable);
        let args = match mapping.arg_transform {
            Some(transform) => transform(args),
            None => args,
        };

        let value_type = call
            .method
            .return_type
            .with_nullability(call.method.return_type.nullable || nullable);
        ProviderOutcome::Matched(SqlNode::function(mapping.sql_name, args, value_type))
    }
}
