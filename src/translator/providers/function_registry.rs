/// Method to SQL Function Registry
///
/// Maps query-level method names to SQL functions with optional argument transformations.
use std::collections::HashMap;

use crate::query_expr::MethodKind;
use crate::sql_expr::{SqlBinaryOperator, SqlNode};
use crate::type_mapping::{Literal, TypeKind, ValueType};

/// Function mapping entry
#[derive(Clone)]
pub struct FunctionMapping {
    /// Method name (lowercase for lookup)
    pub method_name: &'static str,
    /// SQL function name
    pub sql_name: &'static str,
    /// Instance methods of this type take their target as the first SQL argument;
    /// `None` means a static method whose arguments map one to one
    pub instance_of: Option<TypeKind>,
    /// Optional argument transformation, applied to the SQL argument list
    pub arg_transform: Option<fn(Vec<SqlNode>) -> Vec<SqlNode>>,
}

impl FunctionMapping {
    pub fn accepts(&self, kind: MethodKind, declaring_type: TypeKind) -> bool {
        match self.instance_of {
            Some(target_type) => kind == MethodKind::Instance && declaring_type == target_type,
            None => kind == MethodKind::Static,
        }
    }
}

/// Get the function mapping for a method name
pub fn get_function_mapping(method_name: &str) -> Option<FunctionMapping> {
    let name_lower = method_name.to_lowercase();
    FUNCTION_MAPPINGS.get(name_lower.as_str()).cloned()
}

/// Check if a method has a registered SQL function
pub fn is_function_supported(method_name: &str) -> bool {
    get_function_mapping(method_name).is_some()
}

fn int_literal(value: i64) -> SqlNode {
    SqlNode::constant(Literal::Integer(value), ValueType::new(TypeKind::Int32))
}

fn plus_one(node: SqlNode) -> SqlNode {
    let value_type = node.value_type;
    SqlNode::binary(SqlBinaryOperator::Add, node, int_literal(1), value_type)
}

// Static function mapping table
lazy_static::lazy_static! {
    static ref FUNCTION_MAPPINGS: HashMap<&'static str, FunctionMapping> = {
        let mut m = HashMap::new();

        // ===== STRING FUNCTIONS =====

        m.insert("to_upper", FunctionMapping {
            method_name: "to_upper",
            sql_name: "UPPER",
            instance_of: Some(TypeKind::String),
            arg_transform: None,
        });

        m.insert("to_lower", FunctionMapping {
            method_name: "to_lower",
            sql_name: "LOWER",
            instance_of: Some(TypeKind::String),
            arg_transform: None,
        });

        m.insert("trim", FunctionMapping {
            method_name: "trim",
            sql_name: "TRIM",
            instance_of: Some(TypeKind::String),
            arg_transform: None,
        });

        m.insert("trim_start", FunctionMapping {
            method_name: "trim_start",
            sql_name: "LTRIM",
            instance_of: Some(TypeKind::String),
            arg_transform: None,
        });

        m.insert("trim_end", FunctionMapping {
            method_name: "trim_end",
            sql_name: "RTRIM",
            instance_of: Some(TypeKind::String),
            arg_transform: None,
        });

        m.insert("replace", FunctionMapping {
            method_name: "replace",
            sql_name: "REPLACE",
            instance_of: Some(TypeKind::String),
            arg_transform: None,
        });

        // s.substring(start [, length]) -> SUBSTRING(s, start + 1 [, length])
        // Note: method offsets are 0-based, SQL is 1-based
        m.insert("substring", FunctionMapping {
            method_name: "substring",
            sql_name: "SUBSTRING",
            instance_of: Some(TypeKind::String),
            arg_transform: Some(|mut args| {
                if args.len() >= 2 {
                    let start = args.remove(1);
                    args.insert(1, plus_one(start));
                }
                args
            }),
        });

        // ===== MATH FUNCTIONS =====

        m.insert("abs", FunctionMapping {
            method_name: "abs",
            sql_name: "ABS",
            instance_of: None,
            arg_transform: None,
        });

        m.insert("ceiling", FunctionMapping {
            method_name: "ceiling",
            sql_name: "CEILING",
            instance_of: None,
            arg_transform: None,
        });

        m.insert("floor", FunctionMapping {
            method_name: "floor",
            sql_name: "FLOOR",
            instance_of: None,
            arg_transform: None,
        });

        // round(x) -> ROUND(x, 0); round(x, digits) passes through
        m.insert("round", FunctionMapping {
            method_name: "round",
            sql_name: "ROUND",
            instance_of: None,
            arg_transform: Some(|mut args| {
                if args.len() == 1 {
                    args.push(int_literal(0));
                }
                args
            }),
        });

        m.insert("power", FunctionMapping {
            method_name: "power",
            sql_name: "POWER",
            instance_of: None,
            arg_transform: None,
        });

        m.insert("sqrt", FunctionMapping {
            method_name: "sqrt",
            sql_name: "SQRT",
            instance_of: None,
            arg_transform: None,
        });

        m.insert("sign", FunctionMapping {
            method_name: "sign",
            sql_name: "SIGN",
            instance_of: None,
            arg_transform: None,
        });

        m
    };
}
