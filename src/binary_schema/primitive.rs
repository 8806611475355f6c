// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The primitive type registry. Maps the built-in type names of the binary schema onto the
//! fixed encoders in [`crate::types`], plus the few types that only exist in schemas.

use std::{fmt, io::Read};

use crate::types::{
    encoding::*, ByteString, DataValue, DateTime, DiagnosticInfo, ExpandedNodeId,
    ExtensionObject, Guid, LocalizedText, NodeId, QualifiedName, StatusCode, UAString, Variant,
};

use super::{
    bits::{BitReader, BitWriter},
    error::Reason,
    value::Value,
};

/// Every type that is encoded without help from a type dictionary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    DateTime,
    Guid,
    ByteString,
    XmlElement,
    NodeId,
    ExpandedNodeId,
    StatusCode,
    QualifiedName,
    LocalizedText,
    ExtensionObject,
    DataValue,
    Variant,
    DiagnosticInfo,
    /// A single bit, or as many bits as the field length says
    Bit,
    /// A Latin-1 character held in one byte
    Char,
    /// A string of 8-bit characters, encoded like a String
    CharArray,
    /// A UTF-16 code unit
    WideChar,
    /// A string of UTF-16 code units
    WideString,
}

const ALL_KINDS: [PrimitiveKind; 30] = [
    PrimitiveKind::Boolean,
    PrimitiveKind::SByte,
    PrimitiveKind::Byte,
    PrimitiveKind::Int16,
    PrimitiveKind::UInt16,
    PrimitiveKind::Int32,
    PrimitiveKind::UInt32,
    PrimitiveKind::Int64,
    PrimitiveKind::UInt64,
    PrimitiveKind::Float,
    PrimitiveKind::Double,
    PrimitiveKind::String,
    PrimitiveKind::DateTime,
    PrimitiveKind::Guid,
    PrimitiveKind::ByteString,
    PrimitiveKind::XmlElement,
    PrimitiveKind::NodeId,
    PrimitiveKind::ExpandedNodeId,
    PrimitiveKind::StatusCode,
    PrimitiveKind::QualifiedName,
    PrimitiveKind::LocalizedText,
    PrimitiveKind::ExtensionObject,
    PrimitiveKind::DataValue,
    PrimitiveKind::Variant,
    PrimitiveKind::DiagnosticInfo,
    PrimitiveKind::Bit,
    PrimitiveKind::Char,
    PrimitiveKind::CharArray,
    PrimitiveKind::WideChar,
    PrimitiveKind::WideString,
];

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl PrimitiveKind {
    /// Looks up a primitive by its schema name. Names are case sensitive.
    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        ALL_KINDS.iter().find(|kind| kind.name() == name).copied()
    }

    pub fn all() -> &'static [PrimitiveKind] {
        &ALL_KINDS
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::SByte => "SByte",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Int16 => "Int16",
            PrimitiveKind::UInt16 => "UInt16",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::UInt32 => "UInt32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::UInt64 => "UInt64",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::String => "String",
            PrimitiveKind::DateTime => "DateTime",
            PrimitiveKind::Guid => "Guid",
            PrimitiveKind::ByteString => "ByteString",
            PrimitiveKind::XmlElement => "XmlElement",
            PrimitiveKind::NodeId => "NodeId",
            PrimitiveKind::ExpandedNodeId => "ExpandedNodeId",
            PrimitiveKind::StatusCode => "StatusCode",
            PrimitiveKind::QualifiedName => "QualifiedName",
            PrimitiveKind::LocalizedText => "LocalizedText",
            PrimitiveKind::ExtensionObject => "ExtensionObject",
            PrimitiveKind::DataValue => "DataValue",
            PrimitiveKind::Variant => "Variant",
            PrimitiveKind::DiagnosticInfo => "DiagnosticInfo",
            PrimitiveKind::Bit => "Bit",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::CharArray => "CharArray",
            PrimitiveKind::WideChar => "WideChar",
            PrimitiveKind::WideString => "WideString",
        }
    }

    /// Tests if the primitive is one of the integer types, the only types a length field may
    /// have.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::SByte
                | PrimitiveKind::Byte
                | PrimitiveKind::Int16
                | PrimitiveKind::UInt16
                | PrimitiveKind::Int32
                | PrimitiveKind::UInt32
                | PrimitiveKind::Int64
                | PrimitiveKind::UInt64
        )
    }

    /// Decodes one value of this kind. A `Bit` decodes a single bit, bit fields with a length
    /// are read by the struct codec directly.
    pub fn decode(
        self,
        field: &str,
        reader: &mut BitReader,
        decoding_options: &DecodingOptions,
    ) -> Result<Value, Reason> {
        self.decode_value(reader, decoding_options)
            .map_err(|status| Reason::primitive(field, status))
    }

    fn decode_value(
        self,
        reader: &mut BitReader,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Value> {
        let value = match self {
            PrimitiveKind::Boolean => Value::Boolean(bool::decode(reader, decoding_options)?),
            PrimitiveKind::SByte => Value::SByte(i8::decode(reader, decoding_options)?),
            PrimitiveKind::Byte => Value::Byte(u8::decode(reader, decoding_options)?),
            PrimitiveKind::Int16 => Value::Int16(i16::decode(reader, decoding_options)?),
            PrimitiveKind::UInt16 => Value::UInt16(u16::decode(reader, decoding_options)?),
            PrimitiveKind::Int32 => Value::Int32(i32::decode(reader, decoding_options)?),
            PrimitiveKind::UInt32 => Value::UInt32(u32::decode(reader, decoding_options)?),
            PrimitiveKind::Int64 => Value::Int64(i64::decode(reader, decoding_options)?),
            PrimitiveKind::UInt64 => Value::UInt64(u64::decode(reader, decoding_options)?),
            PrimitiveKind::Float => Value::Float(f32::decode(reader, decoding_options)?),
            PrimitiveKind::Double => Value::Double(f64::decode(reader, decoding_options)?),
            PrimitiveKind::String | PrimitiveKind::CharArray => {
                Value::String(UAString::decode(reader, decoding_options)?)
            }
            PrimitiveKind::DateTime => {
                Value::DateTime(DateTime::decode(reader, decoding_options)?)
            }
            PrimitiveKind::Guid => Value::Guid(Guid::decode(reader, decoding_options)?),
            PrimitiveKind::ByteString => {
                Value::ByteString(ByteString::decode(reader, decoding_options)?)
            }
            PrimitiveKind::XmlElement => {
                Value::XmlElement(UAString::decode(reader, decoding_options)?)
            }
            PrimitiveKind::NodeId => NodeId::decode(reader, decoding_options)?.into(),
            PrimitiveKind::ExpandedNodeId => {
                ExpandedNodeId::decode(reader, decoding_options)?.into()
            }
            PrimitiveKind::StatusCode => {
                Value::StatusCode(StatusCode::decode(reader, decoding_options)?)
            }
            PrimitiveKind::QualifiedName => {
                QualifiedName::decode(reader, decoding_options)?.into()
            }
            PrimitiveKind::LocalizedText => {
                LocalizedText::decode(reader, decoding_options)?.into()
            }
            PrimitiveKind::ExtensionObject => {
                ExtensionObject::decode(reader, decoding_options)?.into()
            }
            PrimitiveKind::DataValue => DataValue::decode(reader, decoding_options)?.into(),
            PrimitiveKind::Variant => Variant::decode(reader, decoding_options)?.into(),
            PrimitiveKind::DiagnosticInfo => {
                DiagnosticInfo::decode(reader, decoding_options)?.into()
            }
            PrimitiveKind::Bit => Value::Bits(reader.read_bits(1)?),
            PrimitiveKind::Char => Value::Char(char::from(read_u8(reader)?)),
            PrimitiveKind::WideChar => {
                let unit = read_u16(reader)?;
                Value::Char(char::from_u32(u32::from(unit)).ok_or_else(|| {
                    error!("Wide char {:#06x} is a surrogate code unit", unit);
                    StatusCode::BadDecodingError
                })?)
            }
            PrimitiveKind::WideString => Value::String(read_wide_string(reader, decoding_options)?),
        };
        Ok(value)
    }

    /// Encodes one value of this kind, converting the value to the wire type where the
    /// conversion is lossless.
    pub fn encode(self, field: &str, writer: &mut BitWriter, value: &Value) -> Result<(), Reason> {
        let written = match self {
            PrimitiveKind::Boolean => match *value {
                Value::Boolean(v) => v.encode(writer),
                _ => {
                    let v = integer::<i64>(field, self, value)?;
                    (v != 0).encode(writer)
                }
            },
            PrimitiveKind::SByte => integer::<i8>(field, self, value)?.encode(writer),
            PrimitiveKind::Byte => integer::<u8>(field, self, value)?.encode(writer),
            PrimitiveKind::Int16 => integer::<i16>(field, self, value)?.encode(writer),
            PrimitiveKind::UInt16 => integer::<u16>(field, self, value)?.encode(writer),
            PrimitiveKind::Int32 => integer::<i32>(field, self, value)?.encode(writer),
            PrimitiveKind::UInt32 => integer::<u32>(field, self, value)?.encode(writer),
            PrimitiveKind::Int64 => integer::<i64>(field, self, value)?.encode(writer),
            PrimitiveKind::UInt64 => integer::<u64>(field, self, value)?.encode(writer),
            PrimitiveKind::Float => match *value {
                Value::Float(v) => v.encode(writer),
                Value::Double(v) => (v as f32).encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::Double => match *value {
                Value::Double(v) => v.encode(writer),
                Value::Float(v) => f64::from(v).encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::String | PrimitiveKind::XmlElement | PrimitiveKind::CharArray => {
                match value {
                    Value::String(v) | Value::XmlElement(v) => v.encode(writer),
                    _ => return Err(mismatch(field, self, value)),
                }
            }
            PrimitiveKind::WideString => match value {
                Value::String(v) | Value::XmlElement(v) => write_wide_string(writer, v),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::DateTime => match value {
                Value::DateTime(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::Guid => match value {
                Value::Guid(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::ByteString => match value {
                Value::ByteString(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::NodeId => match value {
                Value::NodeId(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::ExpandedNodeId => match value {
                Value::ExpandedNodeId(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::StatusCode => match *value {
                Value::StatusCode(v) => v.encode(writer),
                Value::UInt32(v) => StatusCode::from_bits_truncate(v).encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::QualifiedName => match value {
                Value::QualifiedName(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::LocalizedText => match value {
                Value::LocalizedText(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::ExtensionObject => match value {
                Value::ExtensionObject(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::DataValue => match value {
                Value::DataValue(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::Variant => match value {
                Value::Variant(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::DiagnosticInfo => match value {
                Value::DiagnosticInfo(v) => v.encode(writer),
                _ => return Err(mismatch(field, self, value)),
            },
            PrimitiveKind::Bit => {
                let v = integer::<u64>(field, self, value)?;
                if v > 1 {
                    return Err(Reason::invalid_value(
                        field,
                        format!("{} does not fit in a single bit", v),
                    ));
                }
                writer.write_bits(v, 1).map(|_| 0)
            }
            PrimitiveKind::Char => match *value {
                Value::Char(c) => match u8::try_from(u32::from(c)) {
                    Ok(b) => write_u8(writer, b),
                    Err(_) => {
                        return Err(Reason::invalid_value(
                            field,
                            format!("'{}' is not a Latin-1 character", c),
                        ))
                    }
                },
                _ => write_u8(writer, integer::<u8>(field, self, value)?),
            },
            PrimitiveKind::WideChar => match *value {
                Value::Char(c) => {
                    let mut units = [0u16; 2];
                    match c.encode_utf16(&mut units) {
                        [unit] => write_u16(writer, *unit),
                        _ => {
                            return Err(Reason::invalid_value(
                                field,
                                format!("'{}' does not fit in one UTF-16 code unit", c),
                            ))
                        }
                    }
                }
                _ => write_u16(writer, integer::<u16>(field, self, value)?),
            },
        };
        written
            .map(|_| ())
            .map_err(|status| Reason::primitive(field, status))
    }
}

fn mismatch(field: &str, kind: PrimitiveKind, value: &Value) -> Reason {
    Reason::invalid_value(field, format!("{} cannot be encoded as {}", value, kind))
}

/// Converts an integer value into the wire integer type, failing when it is out of range.
fn integer<T>(field: &str, kind: PrimitiveKind, value: &Value) -> Result<T, Reason>
where
    T: TryFrom<i128>,
{
    let v = value
        .as_i128()
        .ok_or_else(|| mismatch(field, kind, value))?;
    T::try_from(v).map_err(|_| {
        Reason::invalid_value(field, format!("{} is out of range for {}", v, kind))
    })
}

fn read_wide_string(
    stream: &mut dyn Read,
    decoding_options: &DecodingOptions,
) -> EncodingResult<UAString> {
    let len = read_i32(stream)?;
    if len == -1 {
        Ok(UAString::null())
    } else if len < -1 {
        error!("Wide string length is a negative number {}", len);
        Err(StatusCode::BadDecodingError)
    } else if len as usize * 2 > decoding_options.max_string_length {
        error!(
            "Wide string length {} exceeds decoding limit {}",
            len, decoding_options.max_string_length
        );
        Err(StatusCode::BadDecodingError)
    } else {
        let mut units = Vec::with_capacity(len as usize);
        for _ in 0..len {
            units.push(read_u16(stream)?);
        }
        let value = String::from_utf16(&units).map_err(|err| {
            trace!("Decoded wide string was not valid UTF-16 - {}", err);
            StatusCode::BadDecodingError
        })?;
        Ok(UAString::from(value))
    }
}

fn write_wide_string(writer: &mut BitWriter, value: &UAString) -> EncodingResult<usize> {
    match value.value() {
        None => write_i32(writer, -1),
        Some(value) => {
            let units: Vec<u16> = value.encode_utf16().collect();
            let mut size = write_i32(writer, units.len() as i32)?;
            for unit in units {
                size += write_u16(writer, unit)?;
            }
            Ok(size)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::binary_schema::error::ReasonCode;

    fn encode(kind: PrimitiveKind, value: &Value) -> Result<Vec<u8>, Reason> {
        let mut stream = Cursor::new(Vec::new());
        let mut writer = BitWriter::new(&mut stream);
        kind.encode("f", &mut writer, value)?;
        writer.finish().unwrap();
        Ok(stream.into_inner())
    }

    fn decode(kind: PrimitiveKind, bytes: &[u8]) -> Result<Value, Reason> {
        let mut stream = Cursor::new(bytes);
        let mut reader = BitReader::new(&mut stream);
        kind.decode("f", &mut reader, &DecodingOptions::test())
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(PrimitiveKind::from_name("Int32"), Some(PrimitiveKind::Int32));
        assert_eq!(PrimitiveKind::from_name("int32"), None);
        assert_eq!(PrimitiveKind::from_name("MyStruct"), None);
        for kind in PrimitiveKind::all() {
            assert_eq!(PrimitiveKind::from_name(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(
            encode(PrimitiveKind::UInt16, &Value::Int64(0x1234)).unwrap(),
            vec![0x34, 0x12]
        );
        assert_eq!(
            encode(PrimitiveKind::Int32, &Value::Boolean(true)).unwrap(),
            vec![1, 0, 0, 0]
        );
        assert_eq!(
            encode(PrimitiveKind::Boolean, &Value::Int32(5)).unwrap(),
            vec![1]
        );
        let err = encode(PrimitiveKind::Byte, &Value::Int32(256)).unwrap_err();
        assert_eq!(err.code(), ReasonCode::InvalidValue);
        let err = encode(PrimitiveKind::UInt32, &Value::Int32(-1)).unwrap_err();
        assert_eq!(err.code(), ReasonCode::InvalidValue);
    }

    #[test]
    fn float_coercion() {
        assert_eq!(
            encode(PrimitiveKind::Double, &Value::Float(1.5)).unwrap(),
            1.5f64.to_le_bytes().to_vec()
        );
        assert_eq!(
            encode(PrimitiveKind::Float, &Value::Double(1.5)).unwrap(),
            1.5f32.to_le_bytes().to_vec()
        );
        assert!(encode(PrimitiveKind::Float, &Value::Int32(1)).is_err());
    }

    #[test]
    fn chars() {
        assert_eq!(decode(PrimitiveKind::Char, &[0xe9]).unwrap(), Value::Char('é'));
        assert_eq!(encode(PrimitiveKind::Char, &Value::Char('é')).unwrap(), vec![0xe9]);
        assert!(encode(PrimitiveKind::Char, &Value::Char('€')).is_err());
        assert_eq!(
            decode(PrimitiveKind::WideChar, &[0xac, 0x20]).unwrap(),
            Value::Char('€')
        );
        assert_eq!(
            encode(PrimitiveKind::WideChar, &Value::Char('€')).unwrap(),
            vec![0xac, 0x20]
        );
        let err = decode(PrimitiveKind::WideChar, &[0x00, 0xd8]).unwrap_err();
        assert_eq!(
            err,
            Reason::primitive("f", StatusCode::BadDecodingError)
        );
    }

    #[test]
    fn wide_string() {
        let bytes = vec![0x02, 0, 0, 0, b'h', 0, 0xac, 0x20];
        assert_eq!(
            encode(PrimitiveKind::WideString, &Value::from("h€")).unwrap(),
            bytes
        );
        assert_eq!(
            decode(PrimitiveKind::WideString, &bytes).unwrap(),
            Value::from("h€")
        );
        assert_eq!(
            decode(PrimitiveKind::WideString, &[0xff, 0xff, 0xff, 0xff]).unwrap(),
            Value::String(UAString::null())
        );
    }

    #[test]
    fn char_array_is_a_string() {
        let bytes = vec![0x03, 0, 0, 0, b'a', b'b', b'c'];
        assert_eq!(
            encode(PrimitiveKind::CharArray, &Value::from("abc")).unwrap(),
            bytes
        );
        assert_eq!(
            decode(PrimitiveKind::CharArray, &bytes).unwrap(),
            Value::from("abc")
        );
    }

    #[test]
    fn built_in_errors_pass_through() {
        let mut options = DecodingOptions::test();
        options.max_string_length = 2;
        let bytes = [0x03, 0, 0, 0, b'a', b'b', b'c'];
        let mut stream = Cursor::new(&bytes[..]);
        let mut reader = BitReader::new(&mut stream);
        let err = PrimitiveKind::String
            .decode("name", &mut reader, &options)
            .unwrap_err();
        assert_eq!(err, Reason::primitive("name", StatusCode::BadDecodingError));
    }
}
