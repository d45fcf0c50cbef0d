//! Generic member translators shared by every dialect.

use super::{MemberTranslator, ProviderOutcome, RewrittenMember};
use crate::sql_expr::SqlNode;
use crate::type_mapping::{TypeKind, ValueType};

/// `x.has_value` on a nullable `x` → `x IS NOT NULL`.
pub struct NullableHasValueTranslator;

impl MemberTranslator for NullableHasValueTranslator {
    fn translate(&self, member: &RewrittenMember) -> ProviderOutcome {
        if !member.member.declaring_type.nullable || member.member.name != "has_value" {
            return ProviderOutcome::Declined;
        }
        match member.inner_sql() {
            Some(inner) => ProviderOutcome::Matched(SqlNode::is_null(inner.clone(), true)),
            None => ProviderOutcome::Declined,
        }
    }
}

/// `s.length` → `LENGTH(s)`.
pub struct StringLengthTranslator;

impl MemberTranslator for StringLengthTranslator {
    fn translate(&self, member: &RewrittenMember) -> ProviderOutcome {
        if member.member.declaring_type.kind != TypeKind::String || member.member.name != "length" {
            return ProviderOutcome::Declined;
        }
        match member.inner_sql() {
            Some(inner) => {
                let value_type = member
                    .member
                    .value_type
                    .with_nullability(inner.value_type.nullable);
                ProviderOutcome::Matched(SqlNode::function("LENGTH", vec![inner.clone()], value_type))
            }
            None => ProviderOutcome::Declined,
        }
    }
}

/// Date/time members.
///
/// - static `now` → `CURRENT_TIMESTAMP`
/// - `d.year` .. `d.second` → `EXTRACT` function node whose first argument is the
///   date part keyword; renderers emit it as `EXTRACT(<PART> FROM <d>)`.
pub struct DateTimeMemberTranslator;

const DATE_PARTS: &[(&str, &str)] = &[
    ("year", "YEAR"),
    ("month", "MONTH"),
    ("day", "DAY"),
    ("hour", "HOUR"),
    ("minute", "MINUTE"),
    ("second", "SECOND"),
];

impl MemberTranslator for DateTimeMemberTranslator {
    fn translate(&self, member: &RewrittenMember) -> ProviderOutcome {
        let info = &member.member;
        if info.declaring_type.kind != TypeKind::DateTime {
            return ProviderOutcome::Declined;
        }

        if member.inner.is_none() {
            return match info.name.as_str() {
                "now" => ProviderOutcome::Matched(SqlNode::fragment(
                    "CURRENT_TIMESTAMP",
                    ValueType::new(TypeKind::DateTime),
                )),
                _ => ProviderOutcome::Declined,
            };
        }

        let part = DATE_PARTS
            .iter()
            .find(|(name, _)| *name == info.name)
            .map(|(_, keyword)| *keyword);

        match (part, member.inner_sql()) {
            (Some(keyword), Some(inner)) => {
                let value_type = info.value_type.with_nullability(inner.value_type.nullable);
                ProviderOutcome::Matched(SqlNode::function(
                    "EXTRACT",
                    vec![SqlNode::fragment(keyword, ValueType::string()), inner.clone()],
                    value_type,
                ))
            }
            _ => ProviderOutcome::Declined,
        }
    }
}
