// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The OPC UA built-in data types and their binary encoding.
//!
//! Every type here implements [`BinaryEncoder`], the fixed encoders that the dynamic codec in
//! [`crate::binary_schema`] delegates to when a schema field names a built-in type.

pub mod constants;
pub mod data_value;
pub mod date_time;
pub mod encoding;
pub mod extension_object;
pub mod guid;
pub mod names;
pub mod node_id;
pub mod scalar;
pub mod status_code;
pub mod string;
pub mod variant;

#[cfg(test)]
mod tests;

pub use self::{
    data_value::{DataValue, DiagnosticInfo},
    date_time::DateTime,
    encoding::*,
    extension_object::{ExtensionObject, ExtensionObjectEncoding},
    guid::Guid,
    names::{LocalizedText, QualifiedName},
    node_id::{ExpandedNodeId, Identifier, NodeId},
    status_code::StatusCode,
    string::{ByteString, UAString, XmlElement},
    variant::{Array, Variant, VariantTypeId},
};
