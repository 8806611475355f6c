// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! `ExtensionObject`, a structure carried as an encoded body behind its encoding id. Dynamic
//! structures travel this way inside variants.

use std::io::{Read, Write};

use crate::types::{encoding::*, ByteString, NodeId, StatusCode, XmlElement};

#[derive(PartialEq, Eq, Debug, Clone)]
pub enum ExtensionObjectEncoding {
    None,
    ByteString(ByteString),
    XmlElement(XmlElement),
}

#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ExtensionObject {
    /// Id of the body's encoding, e.g. the "Default Binary" node of a structured type
    pub node_id: NodeId,
    pub body: ExtensionObjectEncoding,
}

impl Default for ExtensionObjectEncoding {
    fn default() -> Self {
        ExtensionObjectEncoding::None
    }
}

impl ExtensionObject {
    pub fn null() -> ExtensionObject {
        ExtensionObject::default()
    }

    pub fn is_null(&self) -> bool {
        self.node_id.is_null()
    }

    /// An extension object whose body is already binary encoded
    pub fn from_bytes<N>(node_id: N, body: Vec<u8>) -> ExtensionObject
    where
        N: Into<NodeId>,
    {
        ExtensionObject {
            node_id: node_id.into(),
            body: ExtensionObjectEncoding::ByteString(ByteString::from(body)),
        }
    }

    /// The binary body, `None` unless the body is a byte string. A null byte string is an
    /// empty body.
    pub fn binary_body(&self) -> Option<&[u8]> {
        match &self.body {
            ExtensionObjectEncoding::ByteString(body) => Some(body.value.as_deref().unwrap_or(&[])),
            _ => None,
        }
    }
}

impl BinaryEncoder<ExtensionObject> for ExtensionObject {
    fn byte_len(&self) -> usize {
        self.node_id.byte_len()
            + 1
            + match &self.body {
                ExtensionObjectEncoding::None => 0,
                ExtensionObjectEncoding::ByteString(body) => body.byte_len(),
                ExtensionObjectEncoding::XmlElement(body) => body.byte_len(),
            }
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut size = self.node_id.encode(stream)?;
        size += match &self.body {
            ExtensionObjectEncoding::None => write_u8(stream, 0x0)?,
            ExtensionObjectEncoding::ByteString(body) => write_u8(stream, 0x1)? + body.encode(stream)?,
            ExtensionObjectEncoding::XmlElement(body) => write_u8(stream, 0x2)? + body.encode(stream)?,
        };
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let _depth_lock = decoding_options.depth_lock()?;
        let node_id = NodeId::decode(stream, decoding_options)?;
        let body = match read_u8(stream)? {
            0x0 => ExtensionObjectEncoding::None,
            0x1 => ExtensionObjectEncoding::ByteString(ByteString::decode(stream, decoding_options)?),
            0x2 => ExtensionObjectEncoding::XmlElement(XmlElement::decode(stream, decoding_options)?),
            encoding => {
                error!("Extension object {} has unknown body encoding {}", node_id, encoding);
                return Err(StatusCode::BadDecodingError);
            }
        };
        Ok(ExtensionObject { node_id, body })
    }
}
