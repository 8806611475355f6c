use std::io::Cursor;

use crate::binary_schema::{bsd::parse_xml, tests::*, *};
use crate::types::DecodingOptions;

const DEVICE_BSD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<opc:TypeDictionary
    xmlns:opc="http://opcfoundation.org/BinarySchema/"
    xmlns:ua="http://opcfoundation.org/UA/"
    xmlns:tns="urn:opcua:test:devices"
    DefaultByteOrder="LittleEndian"
    TargetNamespace="urn:opcua:test:devices">
  <opc:Import Namespace="http://opcfoundation.org/UA/" />
  <opc:Documentation>Devices used by the tests</opc:Documentation>

  <opc:EnumeratedType Name="DeviceState" LengthInBits="32">
    <opc:Documentation>The state of a device</opc:Documentation>
    <opc:EnumeratedValue Name="Off" Value="0" />
    <opc:EnumeratedValue Name="Running" Value="1" />
    <opc:EnumeratedValue Name="Faulted" Value="2" />
  </opc:EnumeratedType>

  <opc:OpaqueType Name="SerialNumber" />

  <opc:StructuredType Name="Reading" BaseType="ua:ExtensionObject">
    <opc:Field Name="Timestamp" TypeName="opc:DateTime" />
    <opc:Field Name="Value" TypeName="opc:Double" />
  </opc:StructuredType>

  <opc:StructuredType Name="Device" BaseType="ua:ExtensionObject">
    <opc:Documentation>A device and its latest readings</opc:Documentation>
    <opc:Field Name="DescriptionSpecified" TypeName="opc:Bit" />
    <opc:Field Name="Reserved1" TypeName="opc:Bit" Length="31" />
    <opc:Field Name="Name" TypeName="opc:String" />
    <opc:Field Name="Description" TypeName="ua:LocalizedText" SwitchField="DescriptionSpecified" />
    <opc:Field Name="State" TypeName="tns:DeviceState" />
    <opc:Field Name="NoOfReadings" TypeName="opc:Int32" />
    <opc:Field Name="Readings" TypeName="tns:Reading" LengthField="NoOfReadings" />
    <opc:Field Name="Code" TypeName="opc:UInt16" SwitchField="State" SwitchValue="2" SwitchOperand="Equals" />
  </opc:StructuredType>
</opc:TypeDictionary>"#;

#[test]
fn parse_dictionary() {
    let dictionary = parse_xml(DEVICE_BSD).unwrap();
    assert_eq!(dictionary.namespace_uri(), "urn:opcua:test:devices");
    assert_eq!(
        dictionary.type_names(),
        vec!["Device", "DeviceState", "Reading"]
    );

    let state = dictionary.enumerated("DeviceState").unwrap();
    assert_eq!(state.length_in_bits, 32);
    assert_eq!(state.values.len(), 3);
    assert_eq!(state.name_of(2), Some("Faulted"));

    let device = dictionary.structured("Device").unwrap();
    let fields = &device.descriptor().fields;
    assert_eq!(fields.len(), 8);
    assert_eq!(fields[1].length, Some(31));
    assert_eq!(
        fields[3].type_ref,
        TypeRef::new(OPC_UA_NAMESPACE, "LocalizedText")
    );
    assert_eq!(fields[3].switch_field.as_deref(), Some("DescriptionSpecified"));
    assert_eq!(
        fields[4].type_ref,
        TypeRef::new("urn:opcua:test:devices", "DeviceState")
    );
    assert_eq!(fields[6].length_field.as_deref(), Some("NoOfReadings"));
    assert_eq!(fields[7].switch_value, Some(2));
    assert_eq!(fields[7].switch_operand, Some(SwitchOperand::Equals));
    assert!(!fields[7].is_length_in_bytes);
}

#[test]
fn decode_with_parsed_dictionary() {
    let manager = DictionaryManager::new();
    manager.register(parse_xml(DEVICE_BSD).unwrap());

    let bytes = [
        // DescriptionSpecified and Reserved1
        0x00, 0x00, 0x00, 0x00, //
        // Name
        0x03, 0x00, 0x00, 0x00, b'P', b'm', b'p', //
        // State = Faulted
        0x02, 0x00, 0x00, 0x00, //
        // NoOfReadings
        0x01, 0x00, 0x00, 0x00, //
        // Readings[0]
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xf0, 0x3f, //
        // Code
        0x07, 0x00,
    ];
    let mut stream = Cursor::new(&bytes[..]);
    let device = manager
        .decode(
            "urn:opcua:test:devices",
            "Device",
            &mut stream,
            &DecodingOptions::test(),
        )
        .unwrap();
    assert_eq!(stream.position() as usize, bytes.len());

    assert!(!device.contains("Description"));
    assert!(!device.contains("NoOfReadings"));
    assert_eq!(device.get("Name"), Some(&Value::from("Pmp")));
    assert_eq!(
        device.get("State"),
        Some(&Value::Enumeration(EnumValue {
            type_ref: TypeRef::new("urn:opcua:test:devices", "DeviceState"),
            value: 2,
        }))
    );
    assert_eq!(device.get("Code"), Some(&Value::UInt16(7)));
    let readings = device.get("Readings").and_then(|r| r.as_array()).unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(
        readings[0].as_structure().and_then(|r| r.get("Value")),
        Some(&Value::Double(1.0))
    );

    let mut stream = Cursor::new(Vec::new());
    manager
        .encode("urn:opcua:test:devices", "Device", &mut stream, &device)
        .unwrap();
    assert_eq!(stream.into_inner(), bytes.to_vec());
}

#[test]
fn unknown_switch_operand() {
    let xml = r#"<opc:TypeDictionary xmlns:opc="http://opcfoundation.org/BinarySchema/"
        TargetNamespace="urn:test">
      <opc:StructuredType Name="Switched">
        <opc:Field Name="Selector" TypeName="opc:Int32" />
        <opc:Field Name="Value" TypeName="opc:Int32" SwitchField="Selector" SwitchOperand="Between" />
      </opc:StructuredType>
    </opc:TypeDictionary>"#;
    let err = parse_xml(xml).unwrap_err();
    assert_eq!(err.code(), Some(ReasonCode::UnknownSwitchOperand));
    match err {
        SchemaError::UnknownSwitchOperand {
            type_name,
            field,
            operand,
        } => {
            assert_eq!(type_name, "Switched");
            assert_eq!(field, "Value");
            assert_eq!(operand, "Between");
        }
        err => panic!("unexpected error {}", err),
    }
}

#[test]
fn all_switch_operands() {
    for operand in [
        "Equals",
        "NotEqual",
        "GreaterThan",
        "GreaterThanOrEqual",
        "LessThan",
        "LessThanOrEqual",
    ] {
        let xml = format!(
            r#"<opc:TypeDictionary xmlns:opc="http://opcfoundation.org/BinarySchema/" TargetNamespace="urn:test">
              <opc:StructuredType Name="Switched">
                <opc:Field Name="Selector" TypeName="opc:Int32" />
                <opc:Field Name="Value" TypeName="opc:Int32" SwitchField="Selector" SwitchValue="3" SwitchOperand="{}" />
              </opc:StructuredType>
            </opc:TypeDictionary>"#,
            operand
        );
        let dictionary = parse_xml(&xml).unwrap();
        let codec = dictionary.structured("Switched").unwrap();
        assert_eq!(
            codec.descriptor().fields[1]
                .switch_operand
                .map(|o| o.as_str()),
            Some(operand)
        );
    }
}

#[test]
fn length_in_bytes_loads() {
    let xml = r#"<opc:TypeDictionary xmlns:opc="http://opcfoundation.org/BinarySchema/"
        TargetNamespace="urn:test">
      <opc:StructuredType Name="Blob">
        <opc:Field Name="Size" TypeName="opc:Int32" />
        <opc:Field Name="Data" TypeName="opc:Byte" LengthField="Size" IsLengthInBytes="true" />
      </opc:StructuredType>
    </opc:TypeDictionary>"#;
    let dictionary = parse_xml(xml).unwrap();
    let blob = dictionary.structured("Blob").unwrap();
    assert!(blob.descriptor().fields[1].is_length_in_bytes);

    // The failure surfaces when the type is used
    let mut stream = Cursor::new(&[0x01u8, 0x00, 0x00, 0x00, 0xff][..]);
    let err = blob
        .decode(&mut stream, &dictionary, &DecodingOptions::test())
        .unwrap_err();
    assert_eq!(err.code(), ReasonCode::UnsupportedLengthInBytes);
}

#[test]
fn invalid_documents() {
    assert!(matches!(
        parse_xml("<opc:TypeDictionary"),
        Err(SchemaError::Xml(_))
    ));
    assert!(matches!(
        parse_xml(r#"<TypeDictionary TargetNamespace="urn:test" />"#),
        Err(SchemaError::NotATypeDictionary)
    ));
    assert!(matches!(
        parse_xml(r#"<opc:TypeDictionary xmlns:opc="http://opcfoundation.org/BinarySchema/" />"#),
        Err(SchemaError::MissingAttribute { .. })
    ));

    let xml = r#"<opc:TypeDictionary xmlns:opc="http://opcfoundation.org/BinarySchema/"
        TargetNamespace="urn:test">
      <opc:StructuredType Name="Bad">
        <opc:Field Name="Values" TypeName="opc:Int32" Length="many" />
      </opc:StructuredType>
    </opc:TypeDictionary>"#;
    assert!(matches!(
        parse_xml(xml),
        Err(SchemaError::InvalidAttribute { .. })
    ));

    let xml = r#"<opc:TypeDictionary xmlns:opc="http://opcfoundation.org/BinarySchema/"
        TargetNamespace="urn:test">
      <opc:StructuredType Name="Bad">
        <opc:Field Name="Value" TypeName="xyz:Thing" />
      </opc:StructuredType>
    </opc:TypeDictionary>"#;
    assert!(matches!(
        parse_xml(xml),
        Err(SchemaError::UnknownPrefix { .. })
    ));

    let xml = r#"<opc:TypeDictionary xmlns:opc="http://opcfoundation.org/BinarySchema/"
        TargetNamespace="urn:test">
      <opc:StructuredType Name="Bad">
        <opc:Field Name="Values" TypeName="opc:Int32" LengthField="Count" />
        <opc:Field Name="Count" TypeName="opc:Int32" />
      </opc:StructuredType>
    </opc:TypeDictionary>"#;
    assert!(matches!(
        parse_xml(xml),
        Err(SchemaError::UnknownSibling { .. })
    ));
}

#[test]
fn huge_fixed_length_is_limited() {
    let xml = r#"<opc:TypeDictionary xmlns:opc="http://opcfoundation.org/BinarySchema/"
        TargetNamespace="urn:test">
      <opc:StructuredType Name="Huge">
        <opc:Field Name="Values" TypeName="opc:Int64" Length="4000000000" />
      </opc:StructuredType>
    </opc:TypeDictionary>"#;
    let dictionary = parse_xml(xml).unwrap();
    let huge = dictionary.structured("Huge").unwrap();
    let bytes = [0u8; 8];
    let mut stream = Cursor::new(&bytes[..]);
    let err = huge
        .decode(&mut stream, &dictionary, &DecodingOptions::test())
        .unwrap_err();
    assert_eq!(err.code(), ReasonCode::LimitExceeded);
}
