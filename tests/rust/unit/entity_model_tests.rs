use relq::entity_catalog::{EntityCatalogError, EntityModelConfig};
use relq::type_mapping::{TypeKind, ValueType};
use relq::MetadataStore;
use std::io::Write;

const SHOP_YAML: &str = r#"
entities:
  - name: Product
    table: catalog.products
    properties:
      - name: Sku
        column: sku
        type: string
        store_type: char(12)
      - name: Price
        column: price
        type: decimal
      - name: Discontinued
        type: boolean
        nullable: true
"#;

#[test]
fn test_model_from_yaml_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(SHOP_YAML.as_bytes())?;

    let model = EntityModelConfig::from_yaml_file(file.path())?.to_entity_model()?;
    let product = model.get_entity_type("Product")?;
    assert_eq!(product.table, "catalog.products");

    let sku = model.find_property("Product", "Sku").expect("Sku is mapped");
    assert_eq!(sku.store_type.as_deref(), Some("char(12)"));

    let discontinued = model.find_property("Product", "Discontinued").expect("Discontinued is mapped");
    assert_eq!(discontinued.column, "Discontinued");
    assert_eq!(discontinued.value_type, ValueType::nullable(TypeKind::Boolean));
    Ok(())
}

#[test]
fn test_model_rejects_bad_identifiers() {
    let yaml = r#"
entities:
  - name: Product
    table: "products; DROP TABLE users"
"#;
    let err = EntityModelConfig::from_yaml_str(yaml)
        .and_then(|config| config.to_entity_model())
        .unwrap_err();
    assert!(matches!(err, EntityCatalogError::InvalidIdentifier { .. }));
}

#[test]
fn test_unknown_entity_lookup() {
    let model = EntityModelConfig::from_yaml_str(SHOP_YAML)
        .unwrap()
        .to_entity_model()
        .unwrap();
    assert!(model.find_entity_type("Supplier").is_none());
    assert!(matches!(
        model.get_entity_type("Supplier"),
        Err(EntityCatalogError::EntityNotFound { .. })
    ));
}
