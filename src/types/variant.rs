// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! `Variant`, a value of any built-in type, or an array of them, tagged with its type id.

use std::{
    fmt,
    io::{Read, Write},
};

use crate::types::{
    encoding::*, ByteString, DataValue, DateTime, DiagnosticInfo, ExpandedNodeId,
    ExtensionObject, Guid, LocalizedText, NodeId, QualifiedName, StatusCode, UAString,
    XmlElement,
};

const TYPE_ID_MASK: u8 = 0x3f;
const HAS_DIMENSIONS: u8 = 0x40;
const IS_ARRAY: u8 = 0x80;

/// Built-in type ids as they appear in the low bits of a variant's encoding byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VariantTypeId {
    Empty = 0,
    Boolean = 1,
    SByte = 2,
    Byte = 3,
    Int16 = 4,
    UInt16 = 5,
    Int32 = 6,
    UInt32 = 7,
    Int64 = 8,
    UInt64 = 9,
    Float = 10,
    Double = 11,
    String = 12,
    DateTime = 13,
    Guid = 14,
    ByteString = 15,
    XmlElement = 16,
    NodeId = 17,
    ExpandedNodeId = 18,
    StatusCode = 19,
    QualifiedName = 20,
    LocalizedText = 21,
    ExtensionObject = 22,
    DataValue = 23,
    /// Only valid as the element type of an array, each element is a whole variant
    Variant = 24,
    DiagnosticInfo = 25,
}

const TYPE_IDS: [VariantTypeId; 26] = [
    VariantTypeId::Empty,
    VariantTypeId::Boolean,
    VariantTypeId::SByte,
    VariantTypeId::Byte,
    VariantTypeId::Int16,
    VariantTypeId::UInt16,
    VariantTypeId::Int32,
    VariantTypeId::UInt32,
    VariantTypeId::Int64,
    VariantTypeId::UInt64,
    VariantTypeId::Float,
    VariantTypeId::Double,
    VariantTypeId::String,
    VariantTypeId::DateTime,
    VariantTypeId::Guid,
    VariantTypeId::ByteString,
    VariantTypeId::XmlElement,
    VariantTypeId::NodeId,
    VariantTypeId::ExpandedNodeId,
    VariantTypeId::StatusCode,
    VariantTypeId::QualifiedName,
    VariantTypeId::LocalizedText,
    VariantTypeId::ExtensionObject,
    VariantTypeId::DataValue,
    VariantTypeId::Variant,
    VariantTypeId::DiagnosticInfo,
];

impl VariantTypeId {
    pub fn from_u8(id: u8) -> Option<VariantTypeId> {
        TYPE_IDS.get(usize::from(id)).copied()
    }
}

/// The elements of an array variant. Multi dimensional arrays are flattened, with the
/// dimensions kept alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub value_type: VariantTypeId,
    pub values: Vec<Variant>,
    pub dimensions: Option<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    #[default]
    Empty,
    Boolean(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(UAString),
    DateTime(Box<DateTime>),
    Guid(Box<Guid>),
    StatusCode(StatusCode),
    ByteString(ByteString),
    XmlElement(XmlElement),
    QualifiedName(Box<QualifiedName>),
    LocalizedText(Box<LocalizedText>),
    NodeId(Box<NodeId>),
    ExpandedNodeId(Box<ExpandedNodeId>),
    ExtensionObject(Box<ExtensionObject>),
    DataValue(Box<DataValue>),
    DiagnosticInfo(Box<DiagnosticInfo>),
    Array(Box<Array>),
}

impl Variant {
    pub fn type_id(&self) -> VariantTypeId {
        match self {
            Variant::Empty => VariantTypeId::Empty,
            Variant::Boolean(_) => VariantTypeId::Boolean,
            Variant::SByte(_) => VariantTypeId::SByte,
            Variant::Byte(_) => VariantTypeId::Byte,
            Variant::Int16(_) => VariantTypeId::Int16,
            Variant::UInt16(_) => VariantTypeId::UInt16,
            Variant::Int32(_) => VariantTypeId::Int32,
            Variant::UInt32(_) => VariantTypeId::UInt32,
            Variant::Int64(_) => VariantTypeId::Int64,
            Variant::UInt64(_) => VariantTypeId::UInt64,
            Variant::Float(_) => VariantTypeId::Float,
            Variant::Double(_) => VariantTypeId::Double,
            Variant::String(_) => VariantTypeId::String,
            Variant::DateTime(_) => VariantTypeId::DateTime,
            Variant::Guid(_) => VariantTypeId::Guid,
            Variant::StatusCode(_) => VariantTypeId::StatusCode,
            Variant::ByteString(_) => VariantTypeId::ByteString,
            Variant::XmlElement(_) => VariantTypeId::XmlElement,
            Variant::QualifiedName(_) => VariantTypeId::QualifiedName,
            Variant::LocalizedText(_) => VariantTypeId::LocalizedText,
            Variant::NodeId(_) => VariantTypeId::NodeId,
            Variant::ExpandedNodeId(_) => VariantTypeId::ExpandedNodeId,
            Variant::ExtensionObject(_) => VariantTypeId::ExtensionObject,
            Variant::DataValue(_) => VariantTypeId::DataValue,
            Variant::DiagnosticInfo(_) => VariantTypeId::DiagnosticInfo,
            Variant::Array(array) => array.value_type,
        }
    }

    /// An array of values that all have `value_type`, or are whole variants when the type is
    /// `Variant`.
    pub fn array(value_type: VariantTypeId, values: Vec<Variant>) -> EncodingResult<Variant> {
        let fits = |v: &Variant| v.type_id() == value_type && !matches!(v, Variant::Array(_));
        if value_type != VariantTypeId::Variant && !values.iter().all(fits) {
            error!("Array elements do not all have type {:?}", value_type);
            return Err(StatusCode::BadTypeMismatch);
        }
        Ok(Variant::Array(Box::new(Array {
            value_type,
            values,
            dimensions: None,
        })))
    }

    fn encoding_mask(&self) -> u8 {
        match self {
            Variant::Array(array) => {
                let mut mask = array.value_type as u8 | IS_ARRAY;
                if array.dimensions.is_some() {
                    mask |= HAS_DIMENSIONS;
                }
                mask
            }
            _ => self.type_id() as u8,
        }
    }

    fn scalar_byte_len(&self) -> usize {
        match self {
            Variant::Empty => 0,
            Variant::Boolean(v) => v.byte_len(),
            Variant::SByte(v) => v.byte_len(),
            Variant::Byte(v) => v.byte_len(),
            Variant::Int16(v) => v.byte_len(),
            Variant::UInt16(v) => v.byte_len(),
            Variant::Int32(v) => v.byte_len(),
            Variant::UInt32(v) => v.byte_len(),
            Variant::Int64(v) => v.byte_len(),
            Variant::UInt64(v) => v.byte_len(),
            Variant::Float(v) => v.byte_len(),
            Variant::Double(v) => v.byte_len(),
            Variant::String(v) | Variant::XmlElement(v) => v.byte_len(),
            Variant::DateTime(v) => v.byte_len(),
            Variant::Guid(v) => v.byte_len(),
            Variant::StatusCode(v) => v.byte_len(),
            Variant::ByteString(v) => v.byte_len(),
            Variant::QualifiedName(v) => v.byte_len(),
            Variant::LocalizedText(v) => v.byte_len(),
            Variant::NodeId(v) => v.byte_len(),
            Variant::ExpandedNodeId(v) => v.byte_len(),
            Variant::ExtensionObject(v) => v.byte_len(),
            Variant::DataValue(v) => v.byte_len(),
            Variant::DiagnosticInfo(v) => v.byte_len(),
            // A variant nested in an array carries its own encoding byte
            Variant::Array(_) => self.byte_len(),
        }
    }

    fn encode_scalar<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        match self {
            Variant::Empty => Ok(0),
            Variant::Boolean(v) => v.encode(stream),
            Variant::SByte(v) => v.encode(stream),
            Variant::Byte(v) => v.encode(stream),
            Variant::Int16(v) => v.encode(stream),
            Variant::UInt16(v) => v.encode(stream),
            Variant::Int32(v) => v.encode(stream),
            Variant::UInt32(v) => v.encode(stream),
            Variant::Int64(v) => v.encode(stream),
            Variant::UInt64(v) => v.encode(stream),
            Variant::Float(v) => v.encode(stream),
            Variant::Double(v) => v.encode(stream),
            Variant::String(v) | Variant::XmlElement(v) => v.encode(stream),
            Variant::DateTime(v) => v.encode(stream),
            Variant::Guid(v) => v.encode(stream),
            Variant::StatusCode(v) => v.encode(stream),
            Variant::ByteString(v) => v.encode(stream),
            Variant::QualifiedName(v) => v.encode(stream),
            Variant::LocalizedText(v) => v.encode(stream),
            Variant::NodeId(v) => v.encode(stream),
            Variant::ExpandedNodeId(v) => v.encode(stream),
            Variant::ExtensionObject(v) => v.encode(stream),
            Variant::DataValue(v) => v.encode(stream),
            Variant::DiagnosticInfo(v) => v.encode(stream),
            Variant::Array(_) => self.encode(stream),
        }
    }

    fn decode_scalar<S: Read>(
        stream: &mut S,
        type_id: VariantTypeId,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Variant> {
        let value = match type_id {
            VariantTypeId::Empty => Variant::Empty,
            VariantTypeId::Boolean => Variant::Boolean(bool::decode(stream, decoding_options)?),
            VariantTypeId::SByte => Variant::SByte(i8::decode(stream, decoding_options)?),
            VariantTypeId::Byte => Variant::Byte(u8::decode(stream, decoding_options)?),
            VariantTypeId::Int16 => Variant::Int16(i16::decode(stream, decoding_options)?),
            VariantTypeId::UInt16 => Variant::UInt16(u16::decode(stream, decoding_options)?),
            VariantTypeId::Int32 => Variant::Int32(i32::decode(stream, decoding_options)?),
            VariantTypeId::UInt32 => Variant::UInt32(u32::decode(stream, decoding_options)?),
            VariantTypeId::Int64 => Variant::Int64(i64::decode(stream, decoding_options)?),
            VariantTypeId::UInt64 => Variant::UInt64(u64::decode(stream, decoding_options)?),
            VariantTypeId::Float => Variant::Float(f32::decode(stream, decoding_options)?),
            VariantTypeId::Double => Variant::Double(f64::decode(stream, decoding_options)?),
            VariantTypeId::String => Variant::String(UAString::decode(stream, decoding_options)?),
            VariantTypeId::DateTime => DateTime::decode(stream, decoding_options)?.into(),
            VariantTypeId::Guid => Guid::decode(stream, decoding_options)?.into(),
            VariantTypeId::ByteString => ByteString::decode(stream, decoding_options)?.into(),
            VariantTypeId::XmlElement => {
                Variant::XmlElement(XmlElement::decode(stream, decoding_options)?)
            }
            VariantTypeId::NodeId => NodeId::decode(stream, decoding_options)?.into(),
            VariantTypeId::ExpandedNodeId => {
                ExpandedNodeId::decode(stream, decoding_options)?.into()
            }
            VariantTypeId::StatusCode => StatusCode::decode(stream, decoding_options)?.into(),
            VariantTypeId::QualifiedName => QualifiedName::decode(stream, decoding_options)?.into(),
            VariantTypeId::LocalizedText => LocalizedText::decode(stream, decoding_options)?.into(),
            VariantTypeId::ExtensionObject => {
                ExtensionObject::decode(stream, decoding_options)?.into()
            }
            VariantTypeId::DataValue => DataValue::decode(stream, decoding_options)?.into(),
            VariantTypeId::DiagnosticInfo => {
                DiagnosticInfo::decode(stream, decoding_options)?.into()
            }
            VariantTypeId::Variant => Variant::decode(stream, decoding_options)?,
        };
        Ok(value)
    }
}

impl BinaryEncoder<Variant> for Variant {
    fn byte_len(&self) -> usize {
        1 + match self {
            Variant::Array(array) => {
                4 + array
                    .values
                    .iter()
                    .map(|v| {
                        if array.value_type == VariantTypeId::Variant {
                            v.byte_len()
                        } else {
                            v.scalar_byte_len()
                        }
                    })
                    .sum::<usize>()
                    + array.dimensions.as_ref().map_or(0, |d| 4 + d.len() * 4)
            }
            _ => self.scalar_byte_len(),
        }
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut size = write_u8(stream, self.encoding_mask())?;
        match self {
            Variant::Array(array) => {
                size += write_length(stream, Some(array.values.len()))?;
                for value in &array.values {
                    size += if array.value_type == VariantTypeId::Variant {
                        value.encode(stream)?
                    } else {
                        value.encode_scalar(stream)?
                    };
                }
                if let Some(dimensions) = &array.dimensions {
                    size += write_array(stream, &Some(dimensions.clone()))?;
                }
            }
            _ => size += self.encode_scalar(stream)?,
        }
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let _depth_lock = decoding_options.depth_lock()?;
        let mask = read_u8(stream)?;
        let type_id = VariantTypeId::from_u8(mask & TYPE_ID_MASK).ok_or_else(|| {
            error!("Variant type id {} is not a built-in type", mask & TYPE_ID_MASK);
            StatusCode::BadDecodingError
        })?;

        if mask & IS_ARRAY == 0 {
            if type_id == VariantTypeId::Variant {
                error!("A variant cannot directly hold a variant");
                return Err(StatusCode::BadDecodingError);
            }
            return Variant::decode_scalar(stream, type_id, decoding_options);
        }

        // A null array is read as an empty one
        let len = read_length(stream, decoding_options.max_array_length, "Variant array")?
            .unwrap_or(0);
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(Variant::decode_scalar(stream, type_id, decoding_options)?);
        }
        let dimensions = if mask & HAS_DIMENSIONS != 0 {
            let dimensions = read_array::<S, i32>(stream, decoding_options)?;
            if let Some(dimensions) = &dimensions {
                let expected = dimensions
                    .iter()
                    .try_fold(1usize, |n, d| usize::try_from(*d).ok().and_then(|d| n.checked_mul(d)));
                if expected != Some(len) {
                    error!(
                        "Array dimensions {:?} do not match its {} elements",
                        dimensions, len
                    );
                    return Err(StatusCode::BadDecodingError);
                }
            }
            dimensions
        } else {
            None
        };
        Ok(Variant::Array(Box::new(Array {
            value_type: type_id,
            values,
            dimensions,
        })))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Variant::Empty => write!(f, "Empty"),
            Variant::Boolean(v) => write!(f, "{}", v),
            Variant::SByte(v) => write!(f, "{}", v),
            Variant::Byte(v) => write!(f, "{}", v),
            Variant::Int16(v) => write!(f, "{}", v),
            Variant::UInt16(v) => write!(f, "{}", v),
            Variant::Int32(v) => write!(f, "{}", v),
            Variant::UInt32(v) => write!(f, "{}", v),
            Variant::Int64(v) => write!(f, "{}", v),
            Variant::UInt64(v) => write!(f, "{}", v),
            Variant::Float(v) => write!(f, "{}", v),
            Variant::Double(v) => write!(f, "{}", v),
            Variant::String(v) | Variant::XmlElement(v) => write!(f, "{}", v),
            Variant::DateTime(v) => write!(f, "{}", v),
            Variant::Guid(v) => write!(f, "{}", v),
            Variant::StatusCode(v) => write!(f, "{}", v),
            Variant::ByteString(v) => write!(f, "{}", v.as_base64()),
            Variant::QualifiedName(v) => write!(f, "{}", v),
            Variant::LocalizedText(v) => write!(f, "{}", v),
            Variant::NodeId(v) => write!(f, "{}", v),
            Variant::ExpandedNodeId(v) => write!(f, "{}", v),
            Variant::ExtensionObject(v) => write!(f, "ExtensionObject({})", v.node_id),
            Variant::DataValue(v) => write!(f, "{:?}", v),
            Variant::DiagnosticInfo(v) => write!(f, "{:?}", v),
            Variant::Array(array) => {
                write!(f, "[")?;
                for (i, value) in array.values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

macro_rules! variant_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Variant {
            fn from(v: $ty) -> Self {
                Variant::$variant(v)
            }
        }
    };
    ($ty:ty, $variant:ident, boxed) => {
        impl From<$ty> for Variant {
            fn from(v: $ty) -> Self {
                Variant::$variant(Box::new(v))
            }
        }
    };
}

variant_from!(bool, Boolean);
variant_from!(i8, SByte);
variant_from!(u8, Byte);
variant_from!(i16, Int16);
variant_from!(u16, UInt16);
variant_from!(i32, Int32);
variant_from!(u32, UInt32);
variant_from!(i64, Int64);
variant_from!(u64, UInt64);
variant_from!(f32, Float);
variant_from!(f64, Double);
variant_from!(UAString, String);
variant_from!(StatusCode, StatusCode);
variant_from!(ByteString, ByteString);
variant_from!(DateTime, DateTime, boxed);
variant_from!(Guid, Guid, boxed);
variant_from!(QualifiedName, QualifiedName, boxed);
variant_from!(LocalizedText, LocalizedText, boxed);
variant_from!(NodeId, NodeId, boxed);
variant_from!(ExpandedNodeId, ExpandedNodeId, boxed);
variant_from!(ExtensionObject, ExtensionObject, boxed);
variant_from!(DataValue, DataValue, boxed);
variant_from!(DiagnosticInfo, DiagnosticInfo, boxed);

impl<'a> From<&'a str> for Variant {
    fn from(v: &'a str) -> Self {
        Variant::String(UAString::from(v))
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Variant::String(UAString::from(v))
    }
}
