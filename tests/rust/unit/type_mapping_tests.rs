use relq::type_mapping::{Literal, TypeKind, ValueType};
use relq::{DefaultTypeMappingSource, Dialect, TypeMappingSource};
use test_case::test_case;

#[test_case(Dialect::Ansi, "TRUE"; "ansi")]
#[test_case(Dialect::SqlServer, "1"; "sql server")]
#[test_case(Dialect::Postgres, "TRUE"; "postgres")]
fn test_canonical_boolean_literal(dialect: Dialect, expected: &str) {
    let source = DefaultTypeMappingSource::for_dialect(dialect);
    let mapping = source.canonical_boolean_mapping();
    assert_eq!(mapping.kind, TypeKind::Boolean);
    assert_eq!(mapping.generate_sql_literal(&Literal::Boolean(true)), expected);
}

#[test]
fn test_lookup_ignores_nullability() {
    let source = DefaultTypeMappingSource::for_dialect(Dialect::Postgres);
    assert_eq!(
        source.find_mapping(&ValueType::nullable(TypeKind::Guid)),
        source.find_mapping(&ValueType::new(TypeKind::Guid))
    );
    assert_eq!(source.find_mapping(&ValueType::new(TypeKind::Guid)).unwrap().store_type, "uuid");
}

#[test]
fn test_object_has_no_mapping() {
    for dialect in [Dialect::Ansi, Dialect::SqlServer, Dialect::Postgres] {
        let source = DefaultTypeMappingSource::for_dialect(dialect);
        assert!(source.find_mapping(&ValueType::object()).is_none());
    }
}

#[test]
fn test_dialect_names_round_trip() {
    for dialect in [Dialect::Ansi, Dialect::SqlServer, Dialect::Postgres] {
        assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
    }
    assert!("oracle".parse::<Dialect>().is_err());
}
