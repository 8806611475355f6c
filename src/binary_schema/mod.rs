// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Dynamic structures described by OPC UA binary schemas.
//!
//! A structured type is an ordered list of fields. A field is a primitive, which is encoded by
//! the fixed encoders of the built-in types, or a reference to another structured or
//! enumerated type that a [`TypeResolver`] finds at decode / encode time. Fields may be
//! arrays whose length is fixed or held by an earlier field, may be present only when an
//! earlier field compares to a value, or may be runs of bits packed into bytes.

pub mod bits;
pub mod bsd;
pub mod codec;
pub mod error;
pub mod model;
pub mod primitive;
pub mod resolver;
pub mod value;

#[cfg(test)]
mod tests;

pub use self::{
    codec::StructCodec,
    error::{DecodingError, EncodingError, Reason, ReasonCode, SchemaError},
    model::{
        EnumeratedTypeDescriptor, EnumeratedValue, FieldDescriptor, FieldType,
        StructuredTypeDescriptor, SwitchOperand, TypeRef, BINARY_SCHEMA_NAMESPACE,
        OPC_UA_NAMESPACE,
    },
    primitive::PrimitiveKind,
    resolver::{DictionaryManager, ResolvedType, TypeDictionary, TypeResolver},
    value::{EnumValue, StructuredValue, Value},
};

pub mod prelude {
    pub use super::{
        bsd, DecodingError, DictionaryManager, EncodingError, EnumValue, FieldDescriptor,
        Reason, ReasonCode, SchemaError, StructCodec, StructuredTypeDescriptor, StructuredValue,
        TypeDictionary, TypeRef, TypeResolver, Value,
    };
}
