// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The schema model. Structured types are an ordered list of fields, enumerated types are a
//! named integer domain. Both are immutable once a codec has been built from them.

use std::{fmt, str::FromStr};

use super::{error::Reason, primitive::PrimitiveKind};

/// Namespace of the OPC UA binary schema itself, where the `opc:` primitives live.
pub const BINARY_SCHEMA_NAMESPACE: &str = "http://opcfoundation.org/BinarySchema/";
/// Namespace of the standard OPC UA types, where the `ua:` types live.
pub const OPC_UA_NAMESPACE: &str = "http://opcfoundation.org/UA/";

/// A reference to a type by namespace URI and local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    pub namespace_uri: String,
    pub name: String,
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.namespace_uri, self.name)
    }
}

impl TypeRef {
    pub fn new<N, T>(namespace_uri: N, name: T) -> TypeRef
    where
        N: Into<String>,
        T: Into<String>,
    {
        TypeRef {
            namespace_uri: namespace_uri.into(),
            name: name.into(),
        }
    }

    /// A reference to a type in the binary schema namespace, e.g. `opc:Int32`
    pub fn opc<T>(name: T) -> TypeRef
    where
        T: Into<String>,
    {
        Self::new(BINARY_SCHEMA_NAMESPACE, name)
    }
}

/// What a field's type turned out to be. Built-in names resolve to a primitive, everything
/// else is delegated to the type resolver at decode / encode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Primitive(PrimitiveKind),
    Delegate(TypeRef),
}

impl FieldType {
    pub fn of(type_ref: &TypeRef) -> FieldType {
        match PrimitiveKind::from_name(&type_ref.name) {
            Some(kind) => FieldType::Primitive(kind),
            None => FieldType::Delegate(type_ref.clone()),
        }
    }
}

/// Comparison applied between a switch field's value and the switch value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum SwitchOperand {
    #[default]
    Equals,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl SwitchOperand {
    /// Evaluates `value <operand> switch_value`
    pub fn compare(self, value: i64, switch_value: i64) -> bool {
        match self {
            SwitchOperand::Equals => value == switch_value,
            SwitchOperand::NotEqual => value != switch_value,
            SwitchOperand::GreaterThan => value > switch_value,
            SwitchOperand::GreaterThanOrEqual => value >= switch_value,
            SwitchOperand::LessThan => value < switch_value,
            SwitchOperand::LessThanOrEqual => value <= switch_value,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchOperand::Equals => "Equals",
            SwitchOperand::NotEqual => "NotEqual",
            SwitchOperand::GreaterThan => "GreaterThan",
            SwitchOperand::GreaterThanOrEqual => "GreaterThanOrEqual",
            SwitchOperand::LessThan => "LessThan",
            SwitchOperand::LessThanOrEqual => "LessThanOrEqual",
        }
    }
}

impl FromStr for SwitchOperand {
    type Err = Reason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Equals" => Ok(SwitchOperand::Equals),
            "NotEqual" => Ok(SwitchOperand::NotEqual),
            "GreaterThan" => Ok(SwitchOperand::GreaterThan),
            "GreaterThanOrEqual" => Ok(SwitchOperand::GreaterThanOrEqual),
            "LessThan" => Ok(SwitchOperand::LessThan),
            "LessThanOrEqual" => Ok(SwitchOperand::LessThanOrEqual),
            _ => Err(Reason::UnknownSwitchOperand {
                operand: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SwitchOperand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field of a structured type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name, unique within the structured type
    pub name: String,
    pub type_ref: TypeRef,
    /// Fixed array length, or number of bits for a bit field
    pub length: Option<u32>,
    /// Earlier field holding the array length
    pub length_field: Option<String>,
    /// Earlier field whose value decides if this field is present
    pub switch_field: Option<String>,
    /// Defaults to 1 when there is a switch field
    pub switch_value: Option<i64>,
    /// Defaults to equals
    pub switch_operand: Option<SwitchOperand>,
    pub is_length_in_bytes: bool,
}

impl FieldDescriptor {
    pub fn new<T>(name: T, type_ref: TypeRef) -> FieldDescriptor
    where
        T: Into<String>,
    {
        FieldDescriptor {
            name: name.into(),
            type_ref,
            length: None,
            length_field: None,
            switch_field: None,
            switch_value: None,
            switch_operand: None,
            is_length_in_bytes: false,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_length_field<T>(mut self, length_field: T) -> Self
    where
        T: Into<String>,
    {
        self.length_field = Some(length_field.into());
        self
    }

    pub fn with_switch_field<T>(mut self, switch_field: T) -> Self
    where
        T: Into<String>,
    {
        self.switch_field = Some(switch_field.into());
        self
    }

    pub fn with_switch_value(mut self, switch_value: i64) -> Self {
        self.switch_value = Some(switch_value);
        self
    }

    pub fn with_switch_operand(mut self, switch_operand: SwitchOperand) -> Self {
        self.switch_operand = Some(switch_operand);
        self
    }

    pub fn with_length_in_bytes(mut self, is_length_in_bytes: bool) -> Self {
        self.is_length_in_bytes = is_length_in_bytes;
        self
    }

    /// The value the switch field is compared against
    pub fn effective_switch_value(&self) -> i64 {
        self.switch_value.unwrap_or(1)
    }

    pub fn effective_switch_operand(&self) -> SwitchOperand {
        self.switch_operand.unwrap_or_default()
    }
}

/// A structured type, its fields in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredTypeDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl StructuredTypeDescriptor {
    pub fn new<T>(name: T) -> StructuredTypeDescriptor
    where
        T: Into<String>,
    {
        StructuredTypeDescriptor {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

/// A named value of an enumerated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedValue {
    pub name: String,
    pub value: i32,
}

/// An enumerated type. On the wire it is always an Int32 whatever its declared bit length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedTypeDescriptor {
    pub name: String,
    pub length_in_bits: u32,
    pub values: Vec<EnumeratedValue>,
}

impl EnumeratedTypeDescriptor {
    pub fn new<T>(name: T) -> EnumeratedTypeDescriptor
    where
        T: Into<String>,
    {
        EnumeratedTypeDescriptor {
            name: name.into(),
            length_in_bits: 32,
            values: Vec::new(),
        }
    }

    pub fn value<T>(mut self, name: T, value: i32) -> Self
    where
        T: Into<String>,
    {
        self.values.push(EnumeratedValue {
            name: name.into(),
            value,
        });
        self
    }

    /// Name of the value, if it is one of the declared values
    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.name.as_str())
    }
}

#[test]
fn switch_operand_compare() {
    assert!(SwitchOperand::Equals.compare(5, 5));
    assert!(!SwitchOperand::NotEqual.compare(5, 5));
    assert!(SwitchOperand::GreaterThan.compare(6, 5));
    assert!(SwitchOperand::GreaterThanOrEqual.compare(5, 5));
    assert!(SwitchOperand::LessThan.compare(4, 5));
    assert!(SwitchOperand::LessThanOrEqual.compare(5, 5));
}

#[test]
fn switch_operand_from_str() {
    for operand in [
        SwitchOperand::Equals,
        SwitchOperand::NotEqual,
        SwitchOperand::GreaterThan,
        SwitchOperand::GreaterThanOrEqual,
        SwitchOperand::LessThan,
        SwitchOperand::LessThanOrEqual,
    ] {
        assert_eq!(SwitchOperand::from_str(operand.as_str()).unwrap(), operand);
    }
    assert_eq!(
        SwitchOperand::from_str("equals").unwrap_err(),
        Reason::UnknownSwitchOperand {
            operand: "equals".to_string()
        }
    );
}
