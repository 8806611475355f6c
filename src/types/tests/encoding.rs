use std::io::Cursor;

use crate::types::{constants, tests::*, *};

#[test]
fn numbers_are_little_endian() {
    serialize_and_compare(true, &[0x01]);
    serialize_and_compare(-2i8, &[0xfe]);
    serialize_and_compare(-17000i16, &[0x98, 0xbd]);
    serialize_and_compare(0xdeadbeefu32, &[0xef, 0xbe, 0xad, 0xde]);
    serialize_and_compare(1.0f64, &[0, 0, 0, 0, 0, 0, 0xf0, 0x3f]);
    serialize_test(-17_442_224_000i64);
    serialize_test(u64::MAX);
    serialize_test(0.25f32);
}

#[test]
fn any_nonzero_byte_is_true() {
    let mut stream = Cursor::new(vec![0x7f]);
    assert!(bool::decode(&mut stream, &DecodingOptions::test()).unwrap());
}

#[test]
fn strings() {
    serialize_and_compare(UAString::null(), &[0xff, 0xff, 0xff, 0xff]);
    serialize_and_compare(UAString::from(""), &[0, 0, 0, 0]);
    serialize_and_compare(
        UAString::from("水Boy"),
        &[0x06, 0x00, 0x00, 0x00, 0xE6, 0xB0, 0xB4, 0x42, 0x6F, 0x79],
    );
    serialize_test(ByteString::null());
    serialize_test(ByteString::from(vec![0u8, 1, 255]));
}

#[test]
fn string_limits() {
    let mut stream = serialize_as_stream(&UAString::from("0123456789"));
    let decoding_options = DecodingOptions {
        max_string_length: 5,
        ..DecodingOptions::test()
    };
    assert_eq!(
        UAString::decode(&mut stream, &decoding_options).unwrap_err(),
        StatusCode::BadDecodingError
    );

    // Invalid UTF-8
    let mut stream = Cursor::new(vec![0x02, 0x00, 0x00, 0x00, 0xc3, 0x28]);
    assert!(UAString::decode(&mut stream, &DecodingOptions::test()).is_err());

    // Lengths below -1
    let mut stream = Cursor::new(vec![0xfe, 0xff, 0xff, 0xff]);
    assert!(ByteString::decode(&mut stream, &DecodingOptions::test()).is_err());
}

#[test]
fn date_time_and_guid() {
    serialize_test(DateTime::now());
    serialize_test(DateTime::null());
    serialize_test(Guid::new());
    let guid: Guid = "72962b91-fa75-4ae6-8d28-b404dc7daf63".parse().unwrap();
    assert_eq!(guid.to_string(), "72962b91-fa75-4ae6-8d28-b404dc7daf63");
}

#[test]
fn names() {
    serialize_test(QualifiedName::new(100, "Temperature"));
    serialize_and_compare(LocalizedText::default(), &[0x00]);
    serialize_and_compare(
        LocalizedText::from("Hi"),
        &[0x02, 0x02, 0x00, 0x00, 0x00, b'H', b'i'],
    );
    serialize_test(LocalizedText::new("en", "Pump"));
}

#[test]
fn extension_objects() {
    serialize_and_compare(ExtensionObject::null(), &[0x00, 0x00, 0x00]);
    let eo = ExtensionObject::from_bytes(NodeId::new(2, 5001u32), vec![1, 2, 3]);
    assert_eq!(eo.binary_body(), Some(&[1u8, 2, 3][..]));
    serialize_test(eo);
    serialize_test(ExtensionObject {
        node_id: NodeId::new(2, "Config"),
        body: ExtensionObjectEncoding::XmlElement(XmlElement::from("<a/>")),
    });

    // Body encoding 3 does not exist
    let mut stream = Cursor::new(vec![0x00, 0x00, 0x03]);
    assert!(ExtensionObject::decode(&mut stream, &DecodingOptions::test()).is_err());
}

#[test]
fn data_values() {
    serialize_and_compare(DataValue::default(), &[0x00]);
    serialize_and_compare(
        DataValue::from(Variant::from(5i32)),
        &[0x01, 0x06, 0x05, 0x00, 0x00, 0x00],
    );
    serialize_test(DataValue {
        value: Some(Variant::from("Hello")),
        status: Some(StatusCode::UncertainLastUsableValue),
        source_timestamp: Some(DateTime::now()),
        source_picoseconds: Some(10),
        server_timestamp: Some(DateTime::from(1i64)),
        server_picoseconds: Some(20),
    });
}

#[test]
fn diagnostic_infos() {
    serialize_test(DiagnosticInfo::default());
    serialize_test(DiagnosticInfo {
        symbolic_id: Some(1),
        locale: Some(2),
        localized_text: Some(3),
        additional_info: Some(UAString::from("Hello world")),
        inner_status_code: Some(StatusCode::BadDecodingError),
        inner_diagnostic_info: Some(Box::new(DiagnosticInfo {
            additional_info: Some(UAString::from("Inner")),
            ..Default::default()
        })),
        ..Default::default()
    });
}

#[test]
fn variants() {
    serialize_and_compare(Variant::Empty, &[0x00]);
    serialize_and_compare(Variant::from(2i32), &[0x06, 0x02, 0x00, 0x00, 0x00]);
    serialize_test(Variant::from(true));
    serialize_test(Variant::from(100u64));
    serialize_test(Variant::from("a string"));
    serialize_test(Variant::from(DateTime::now()));
    serialize_test(Variant::from(StatusCode::BadTypeMismatch));
    serialize_test(Variant::from(NodeId::new(1, "node")));
    serialize_test(Variant::from(LocalizedText::new("en", "text")));
    serialize_test(Variant::from(DataValue::from(Variant::from(1.5f64))));
    serialize_test(Variant::from(ExtensionObject::from_bytes(
        NodeId::new(1, 99u32),
        vec![0xaa],
    )));

    // Type id 24 is only allowed for array elements, 26 and up are not built-in types
    let mut stream = Cursor::new(vec![24u8]);
    assert!(Variant::decode(&mut stream, &DecodingOptions::test()).is_err());
    let mut stream = Cursor::new(vec![26u8]);
    assert!(Variant::decode(&mut stream, &DecodingOptions::test()).is_err());
}

#[test]
fn variant_arrays() {
    let ints = Variant::array(
        VariantTypeId::Int32,
        vec![Variant::from(1i32), Variant::from(2i32)],
    )
    .unwrap();
    serialize_and_compare(
        ints,
        &[
            0x86, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
        ],
    );

    let mixed = Variant::array(
        VariantTypeId::Variant,
        vec![Variant::from(1u8), Variant::from("two")],
    )
    .unwrap();
    serialize_test(mixed);

    let matrix = Variant::Array(Box::new(Array {
        value_type: VariantTypeId::Byte,
        values: (1u8..=4).map(Variant::from).collect(),
        dimensions: Some(vec![2, 2]),
    }));
    serialize_test(matrix);

    assert_eq!(
        Variant::array(
            VariantTypeId::Int32,
            vec![Variant::from(1i32), Variant::from(true)]
        )
        .unwrap_err(),
        StatusCode::BadTypeMismatch
    );
}

#[test]
fn variant_array_limits() {
    // A null array reads as an empty one
    let mut stream = Cursor::new(vec![0x86, 0xff, 0xff, 0xff, 0xff]);
    let value = Variant::decode(&mut stream, &DecodingOptions::test()).unwrap();
    assert_eq!(
        value,
        Variant::array(VariantTypeId::Int32, Vec::new()).unwrap()
    );

    let values = (0i32..10).map(Variant::from).collect();
    let array = Variant::array(VariantTypeId::Int32, values).unwrap();
    let mut stream = serialize_as_stream(&array);
    let decoding_options = DecodingOptions {
        max_array_length: 5,
        ..DecodingOptions::test()
    };
    assert_eq!(
        Variant::decode(&mut stream, &decoding_options).unwrap_err(),
        StatusCode::BadDecodingError
    );

    // Dimensions 2x3 do not match 4 elements
    let bad_matrix = Variant::Array(Box::new(Array {
        value_type: VariantTypeId::Byte,
        values: (1u8..=4).map(Variant::from).collect(),
        dimensions: Some(vec![2, 3]),
    }));
    let mut stream = serialize_as_stream(&bad_matrix);
    assert!(Variant::decode(&mut stream, &DecodingOptions::test()).is_err());
}

#[test]
fn nesting_is_limited() {
    let nested = |depth: usize| {
        (0..depth).fold(Variant::from(1i32), |inner, _| {
            Variant::array(VariantTypeId::Variant, vec![inner]).unwrap()
        })
    };

    // Each level of array plus the innermost scalar takes one level of depth
    let decoding_options = DecodingOptions::with_max_depth(3);
    let mut stream = serialize_as_stream(&nested(2));
    assert_eq!(
        Variant::decode(&mut stream, &decoding_options).unwrap(),
        nested(2)
    );
    let mut stream = serialize_as_stream(&nested(3));
    assert_eq!(
        Variant::decode(&mut stream, &decoding_options).unwrap_err(),
        StatusCode::BadDecodingError
    );
    // The failed decode gave back every level it took
    assert_eq!(
        trace_lock!(decoding_options.decoding_depth_gauge).current_depth(),
        0
    );
}

#[test]
fn depth_locks() {
    let decoding_options = DecodingOptions::test();
    let max_depth = decoding_options.max_decoding_depth();
    assert_eq!(max_depth, constants::MAX_DECODING_DEPTH);
    {
        let locks = (0..max_depth)
            .map(|_| decoding_options.depth_lock().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(locks.len(), max_depth);
        assert_eq!(
            decoding_options.depth_lock().unwrap_err(),
            StatusCode::BadDecodingError
        );

        // Isolated options do not see the held depth
        let isolated = decoding_options.isolated();
        assert!(isolated.depth_lock().is_ok());
        assert_eq!(isolated.max_decoding_depth(), max_depth);
    }
    assert_eq!(
        trace_lock!(decoding_options.decoding_depth_gauge).current_depth(),
        0
    );
}
