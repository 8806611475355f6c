// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Values produced by the dynamic codec.

use std::fmt;

use crate::types::{
    ByteString, DataValue, DateTime, DiagnosticInfo, ExpandedNodeId, ExtensionObject, Guid,
    LocalizedText, NodeId, QualifiedName, StatusCode, UAString, Variant, XmlElement,
};

use super::model::TypeRef;

/// A decoded value of any schema type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
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
    DateTime(DateTime),
    Guid(Guid),
    ByteString(ByteString),
    XmlElement(XmlElement),
    NodeId(Box<NodeId>),
    ExpandedNodeId(Box<ExpandedNodeId>),
    StatusCode(StatusCode),
    QualifiedName(Box<QualifiedName>),
    LocalizedText(Box<LocalizedText>),
    ExtensionObject(Box<ExtensionObject>),
    DataValue(Box<DataValue>),
    Variant(Box<Variant>),
    DiagnosticInfo(Box<DiagnosticInfo>),
    /// A single character, from a `Char` or `WideChar` field
    Char(char),
    /// The bits of a bit field, least significant bit first
    Bits(u64),
    /// Elements of an array field
    Array(Vec<Value>),
    Structure(StructuredValue),
    Enumeration(EnumValue),
}

macro_rules! from_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

macro_rules! from_boxed {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(Box::new(v))
            }
        }
    };
}

from_scalar!(bool, Boolean);
from_scalar!(i8, SByte);
from_scalar!(u8, Byte);
from_scalar!(i16, Int16);
from_scalar!(u16, UInt16);
from_scalar!(i32, Int32);
from_scalar!(u32, UInt32);
from_scalar!(i64, Int64);
from_scalar!(u64, UInt64);
from_scalar!(f32, Float);
from_scalar!(f64, Double);
from_scalar!(UAString, String);
from_scalar!(DateTime, DateTime);
from_scalar!(Guid, Guid);
from_scalar!(ByteString, ByteString);
from_scalar!(StatusCode, StatusCode);
from_scalar!(char, Char);
from_scalar!(StructuredValue, Structure);
from_scalar!(EnumValue, Enumeration);
from_boxed!(NodeId, NodeId);
from_boxed!(ExpandedNodeId, ExpandedNodeId);
from_boxed!(QualifiedName, QualifiedName);
from_boxed!(LocalizedText, LocalizedText);
from_boxed!(ExtensionObject, ExtensionObject);
from_boxed!(DataValue, DataValue);
from_boxed!(Variant, Variant);
from_boxed!(DiagnosticInfo, DiagnosticInfo);

impl<'a> From<&'a str> for Value {
    fn from(v: &'a str) -> Self {
        Value::String(UAString::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(UAString::from(v))
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(|v| v.into()).collect())
    }
}

impl Value {
    /// The value as a wide integer, for integer and boolean values. Bit fields count as
    /// integers too.
    pub(crate) fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::Boolean(v) => Some(i128::from(v)),
            Value::SByte(v) => Some(i128::from(v)),
            Value::Byte(v) => Some(i128::from(v)),
            Value::Int16(v) => Some(i128::from(v)),
            Value::UInt16(v) => Some(i128::from(v)),
            Value::Int32(v) => Some(i128::from(v)),
            Value::UInt32(v) => Some(i128::from(v)),
            Value::Int64(v) => Some(i128::from(v)),
            Value::UInt64(v) => Some(i128::from(v)),
            Value::Bits(v) => Some(i128::from(v)),
            Value::Enumeration(ref v) => Some(i128::from(v.value)),
            _ => None,
        }
    }

    /// The value as a signed 64-bit integer, if it is an integer that fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// The value as a double, for numeric values.
    pub fn to_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(f64::from(v)),
            Value::Double(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Number of elements, if the value is an array
    pub fn array_len(&self) -> Option<usize> {
        self.as_array().map(|values| values.len())
    }

    pub fn as_structure(&self) -> Option<&StructuredValue> {
        match self {
            Value::Structure(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::SByte(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) | Value::XmlElement(v) => write!(f, "\"{}\"", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::Guid(v) => write!(f, "{}", v),
            Value::ByteString(v) => write!(f, "{}", v.as_base64()),
            Value::NodeId(v) => write!(f, "{}", v),
            Value::ExpandedNodeId(v) => write!(f, "{}", v),
            Value::StatusCode(v) => write!(f, "{}", v),
            Value::QualifiedName(v) => write!(f, "{}", v),
            Value::LocalizedText(v) => write!(f, "{}", v),
            Value::ExtensionObject(v) => write!(f, "ExtensionObject({})", v.node_id),
            Value::DataValue(v) => write!(f, "{:?}", v),
            Value::Variant(v) => write!(f, "{}", v),
            Value::DiagnosticInfo(v) => write!(f, "{:?}", v),
            Value::Char(v) => write!(f, "'{}'", v),
            Value::Bits(v) => write!(f, "{:#b}", v),
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Value::Structure(v) => write!(f, "{}", v),
            Value::Enumeration(v) => write!(f, "{}", v),
        }
    }
}

/// The value of an enumerated type, which is always carried as an Int32.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub type_ref: TypeRef,
    pub value: i32,
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.type_ref.name, self.value)
    }
}

/// The value of a structured type. Members keep the order they were decoded or inserted in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredValue {
    type_name: String,
    members: Vec<(String, Value)>,
}

impl fmt::Display for StructuredValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {{", self.type_name)?;
        for (i, (name, value)) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}: {}", name, value)?;
        }
        write!(f, " }}")
    }
}

impl StructuredValue {
    pub fn new<T>(type_name: T) -> StructuredValue
    where
        T: Into<String>,
    {
        StructuredValue {
            type_name: type_name.into(),
            members: Vec::new(),
        }
    }

    /// Adds or replaces a member and returns the value, for building values in one expression.
    pub fn with<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        self.insert(name, value);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Sets a member, replacing and returning any previous value with the same name.
    pub fn insert<N, V>(&mut self, name: N, value: V) -> Option<Value>
    where
        N: Into<String>,
        V: Into<Value>,
    {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.members.iter_mut().find(|(n, _)| *n == name) {
            Some(std::mem::replace(&mut existing.1, value))
        } else {
            self.members.push((name, value));
            None
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.members.iter().position(|(n, _)| n == name)?;
        Some(self.members.remove(idx).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.members.iter().map(|(n, v)| (n.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_value_members() {
        let mut value = StructuredValue::new("Point").with("x", 1i32).with("y", 2i32);
        assert_eq!(value.len(), 2);
        assert_eq!(value.get("x"), Some(&Value::Int32(1)));
        assert_eq!(value.insert("x", 5i32), Some(Value::Int32(1)));
        assert_eq!(value.names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(value.remove("y"), Some(Value::Int32(2)));
        assert!(!value.contains("y"));
        assert_eq!(value.to_string(), "Point { x: 5 }");
    }

    #[test]
    fn integer_conversions() {
        assert_eq!(Value::UInt64(u64::MAX).to_i64(), None);
        assert_eq!(Value::Byte(7).to_i64(), Some(7));
        assert_eq!(Value::Boolean(true).to_i64(), Some(1));
        assert_eq!(Value::Float(1.5).to_i64(), None);
        assert_eq!(Value::Float(1.5).to_f64(), Some(1.5));
        assert_eq!(Value::from(vec![1i32, 2, 3]).array_len(), Some(3));
    }
}
