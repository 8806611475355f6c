mod bsd;
mod resolver;

use std::io::Cursor;

use crate::{binary_schema::*, types::DecodingOptions};

pub const TEST_NAMESPACE: &str = "urn:opcua:test:types";

/// A field of one of the built-in types
pub fn field(name: &str, type_name: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, TypeRef::opc(type_name))
}

/// A field of a type held in the test dictionary
pub fn dictionary_field(name: &str, type_name: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, TypeRef::new(TEST_NAMESPACE, type_name))
}

pub fn structured_type(name: &str, fields: Vec<FieldDescriptor>) -> StructuredTypeDescriptor {
    StructuredTypeDescriptor {
        name: name.to_string(),
        fields,
    }
}

pub fn codec(name: &str, fields: Vec<FieldDescriptor>) -> StructCodec {
    StructCodec::new(structured_type(name, fields)).unwrap()
}

/// A dictionary in the test namespace holding the types
pub fn test_dictionary(
    structured: Vec<StructuredTypeDescriptor>,
    enumerated: Vec<EnumeratedTypeDescriptor>,
) -> TypeDictionary {
    let mut dictionary = TypeDictionary::new(TEST_NAMESPACE);
    for descriptor in structured {
        dictionary.add_structured(descriptor).unwrap();
    }
    for descriptor in enumerated {
        dictionary.add_enumerated(descriptor);
    }
    dictionary
}

pub fn decoding_options_with_depth(max_depth: usize) -> DecodingOptions {
    DecodingOptions::with_max_depth(max_depth)
}

pub fn encode_value(
    codec: &StructCodec,
    value: &StructuredValue,
    resolver: &dyn TypeResolver,
) -> Vec<u8> {
    let mut stream = Cursor::new(Vec::new());
    let size = codec.encode(&mut stream, value, resolver).unwrap();
    let actual = stream.into_inner();
    println!("encoded bytes = {:?}", actual);
    assert_eq!(size, actual.len());
    actual
}

pub fn decode_value(
    codec: &StructCodec,
    bytes: &[u8],
    resolver: &dyn TypeResolver,
) -> StructuredValue {
    let mut stream = Cursor::new(bytes);
    let value = codec
        .decode(&mut stream, resolver, &DecodingOptions::test())
        .unwrap();
    println!("decoded value = {}", value);
    // Everything should be consumed
    assert_eq!(stream.position() as usize, bytes.len());
    value
}

/// Encodes the value, checks the bytes, decodes them again and checks the value that comes
/// back.
pub fn encode_and_compare(
    codec: &StructCodec,
    value: &StructuredValue,
    resolver: &dyn TypeResolver,
    expected_bytes: &[u8],
    expected_value: &StructuredValue,
) {
    let actual = encode_value(codec, value, resolver);
    assert_eq!(&actual[..], expected_bytes);
    let decoded = decode_value(codec, &actual, resolver);
    assert_eq!(&decoded, expected_value);
}

/// Encodes and decodes the value and returns the bytes, the value must survive unchanged.
pub fn round_trip(
    codec: &StructCodec,
    value: &StructuredValue,
    resolver: &dyn TypeResolver,
) -> Vec<u8> {
    let bytes = encode_value(codec, value, resolver);
    let decoded = decode_value(codec, &bytes, resolver);
    assert_eq!(&decoded, value);
    bytes
}
