use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use tempdir::TempDir;

use crate::binary_schema::tests::*;
use crate::binary_schema::*;
use crate::core::config::CodecConfig;
use crate::types::DecodingOptions;

fn point_dictionary(namespace_uri: &str) -> TypeDictionary {
    let mut dictionary = TypeDictionary::new(namespace_uri);
    dictionary
        .add_structured(structured_type(
            "Point",
            vec![field("x", "Double"), field("y", "Double")],
        ))
        .unwrap();
    dictionary.add_enumerated(EnumeratedTypeDescriptor::new("Axis").value("X", 0).value("Y", 1));
    dictionary
}

#[test]
fn dictionary_lookup() {
    let dictionary = point_dictionary(TEST_NAMESPACE);
    assert_eq!(dictionary.namespace_uri(), TEST_NAMESPACE);
    assert_eq!(dictionary.type_names(), vec!["Axis", "Point"]);
    assert_eq!(dictionary.len(), 2);
    assert!(matches!(
        dictionary.resolve(TEST_NAMESPACE, "Point"),
        Ok(ResolvedType::Structured(_))
    ));
    match dictionary.resolve(TEST_NAMESPACE, "Axis") {
        Ok(ResolvedType::Enumerated(axis)) => assert_eq!(axis.name_of(1), Some("Y")),
        result => panic!("unexpected {:?}", result),
    }
    assert_eq!(
        dictionary.resolve(TEST_NAMESPACE, "Line").unwrap_err().code(),
        ReasonCode::TypeNotFound
    );
    assert_eq!(
        dictionary.resolve("urn:other", "Point").unwrap_err().code(),
        ReasonCode::DictionaryNotFound
    );
}

#[test]
fn dictionary_replaces_types() {
    let mut dictionary = point_dictionary(TEST_NAMESPACE);
    dictionary
        .add_structured(structured_type("Axis", vec![field("name", "String")]))
        .unwrap();
    assert!(dictionary.enumerated("Axis").is_none());
    assert!(dictionary.structured("Axis").is_some());
    assert_eq!(dictionary.len(), 2);
}

#[test]
fn dictionary_rejects_invalid_type() {
    let mut dictionary = TypeDictionary::new(TEST_NAMESPACE);
    let result = dictionary.add_structured(structured_type(
        "Broken",
        vec![field("values", "Int32").with_length_field("count")],
    ));
    assert!(matches!(result, Err(SchemaError::UnknownSibling { .. })));
    assert!(dictionary.is_empty());
}

#[test]
fn manager_register() {
    let manager = DictionaryManager::new();
    assert!(manager.register(point_dictionary("urn:b")).is_none());
    assert!(manager.register(point_dictionary("urn:a")).is_none());
    assert_eq!(manager.namespaces(), vec!["urn:a", "urn:b"]);

    let replaced = manager.register(TypeDictionary::new("urn:a")).unwrap();
    assert_eq!(replaced.len(), 2);
    assert!(manager.dictionary("urn:a").unwrap().is_empty());

    assert!(manager.unregister("urn:b").is_some());
    assert!(manager.unregister("urn:b").is_none());
    assert_eq!(
        manager.resolve("urn:b", "Point").unwrap_err(),
        Reason::DictionaryNotFound {
            namespace_uri: "urn:b".to_string()
        }
    );
}

#[test]
fn manager_resolves_across_dictionaries() {
    let manager = DictionaryManager::new();
    manager.register(point_dictionary("urn:geometry"));
    let mut shapes = TypeDictionary::new("urn:shapes");
    shapes
        .add_structured(structured_type(
            "Circle",
            vec![
                FieldDescriptor::new("centre", TypeRef::new("urn:geometry", "Point")),
                field("radius", "Double"),
            ],
        ))
        .unwrap();
    manager.register(shapes);

    let value = StructuredValue::new("Circle")
        .with(
            "centre",
            StructuredValue::new("Point").with("x", 1.0f64).with("y", 2.0f64),
        )
        .with("radius", 3.0f64);
    let mut stream = Cursor::new(Vec::new());
    let size = manager
        .encode("urn:shapes", "Circle", &mut stream, &value)
        .unwrap();
    assert_eq!(size, 24);

    stream.set_position(0);
    let decoded = manager
        .decode("urn:shapes", "Circle", &mut stream, &DecodingOptions::test())
        .unwrap();
    assert_eq!(decoded, value);

    let err = manager
        .decode("urn:shapes", "Square", &mut stream, &DecodingOptions::test())
        .unwrap_err();
    assert_eq!(err.code(), ReasonCode::TypeNotFound);
    // An enumerated type is not a top level structure
    let err = manager
        .decode("urn:geometry", "Axis", &mut stream, &DecodingOptions::test())
        .unwrap_err();
    assert_eq!(err.code(), ReasonCode::TypeNotFound);
}

#[test]
fn manager_is_shared() {
    let manager = Arc::new(DictionaryManager::new());
    manager.register(point_dictionary(TEST_NAMESPACE));
    let threads: Vec<_> = (0..4)
        .map(|i| {
            let manager = manager.clone();
            thread::spawn(move || {
                let value = StructuredValue::new("Point")
                    .with("x", i as f64)
                    .with("y", -(i as f64));
                let mut stream = Cursor::new(Vec::new());
                manager
                    .encode(TEST_NAMESPACE, "Point", &mut stream, &value)
                    .unwrap();
                stream.set_position(0);
                let decoded = manager
                    .decode(TEST_NAMESPACE, "Point", &mut stream, &DecodingOptions::test())
                    .unwrap();
                assert_eq!(decoded, value);
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }
}

const POINT_BSD: &str = r#"<opc:TypeDictionary
    xmlns:opc="http://opcfoundation.org/BinarySchema/"
    xmlns:tns="urn:opcua:test:geometry"
    TargetNamespace="urn:opcua:test:geometry">
  <opc:StructuredType Name="Point">
    <opc:Field Name="X" TypeName="opc:Double" />
    <opc:Field Name="Y" TypeName="opc:Double" />
  </opc:StructuredType>
</opc:TypeDictionary>"#;

#[test]
fn manager_from_config() {
    let tmp = TempDir::new("dictionaries").unwrap();
    let path = tmp.path().join("Geometry.bsd");
    std::fs::write(&path, POINT_BSD).unwrap();

    let config = CodecConfig::default().add_dictionary(&path);
    let manager = DictionaryManager::from_config(&config).unwrap();
    assert_eq!(manager.namespaces(), vec!["urn:opcua:test:geometry"]);
    assert!(manager
        .dictionary("urn:opcua:test:geometry")
        .unwrap()
        .structured("Point")
        .is_some());

    let config = CodecConfig::default().add_dictionary(tmp.path().join("Missing.bsd"));
    assert!(matches!(
        DictionaryManager::from_config(&config),
        Err(SchemaError::Io { .. })
    ));
}
