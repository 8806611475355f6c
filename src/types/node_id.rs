// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! `NodeId` and `ExpandedNodeId`.

use std::{
    fmt,
    io::{Read, Write},
    str::FromStr,
};

use regex::Regex;

use crate::types::{encoding::*, ByteString, Guid, StatusCode, UAString};

// Encoding byte of a node id. The low nibble picks the form, the expanded node id puts its
// flags in the high bits.
const TWO_BYTE: u8 = 0x00;
const FOUR_BYTE: u8 = 0x01;
const NUMERIC: u8 = 0x02;
const STRING: u8 = 0x03;
const GUID: u8 = 0x04;
const BYTE_STRING: u8 = 0x05;
const FORM_MASK: u8 = 0x0f;
const HAS_NAMESPACE_URI: u8 = 0x80;
const HAS_SERVER_INDEX: u8 = 0x40;

#[derive(Eq, PartialEq, Clone, Debug, Hash)]
pub enum Identifier {
    Numeric(u32),
    String(UAString),
    Guid(Guid),
    ByteString(ByteString),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Identifier::Numeric(v) => write!(f, "i={}", v),
            Identifier::String(v) => write!(f, "s={}", v),
            Identifier::Guid(v) => write!(f, "g={}", v),
            Identifier::ByteString(v) => write!(f, "b={}", v.as_base64()),
        }
    }
}

impl FromStr for Identifier {
    type Err = StatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StatusCode::BadNodeIdInvalid;
        let (kind, value) = s.split_at(s.find('=').ok_or_else(invalid)?);
        let value = &value[1..];
        match kind {
            "i" => value.parse().map(Identifier::Numeric).map_err(|_| invalid()),
            "s" => Ok(Identifier::from(value)),
            "g" => Guid::from_str(value).map(Identifier::Guid).map_err(|_| invalid()),
            "b" => ByteString::from_base64(value)
                .map(Identifier::ByteString)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

impl From<u32> for Identifier {
    fn from(v: u32) -> Self {
        Identifier::Numeric(v)
    }
}

impl<'a> From<&'a str> for Identifier {
    fn from(v: &'a str) -> Self {
        Identifier::String(UAString::from(v))
    }
}

impl From<String> for Identifier {
    fn from(v: String) -> Self {
        Identifier::String(UAString::from(v))
    }
}

impl From<Guid> for Identifier {
    fn from(v: Guid) -> Self {
        Identifier::Guid(v)
    }
}

impl From<ByteString> for Identifier {
    fn from(v: ByteString) -> Self {
        Identifier::ByteString(v)
    }
}

/// Identifies a node by namespace index and identifier.
#[derive(PartialEq, Eq, Clone, Debug, Hash)]
pub struct NodeId {
    pub namespace: u16,
    pub identifier: Identifier,
}

impl NodeId {
    pub fn new<T>(namespace: u16, identifier: T) -> NodeId
    where
        T: Into<Identifier>,
    {
        NodeId {
            namespace,
            identifier: identifier.into(),
        }
    }

    pub fn null() -> NodeId {
        NodeId::new(0, 0u32)
    }

    pub fn is_null(&self) -> bool {
        *self == NodeId::null()
    }

    /// The form byte for this node id, numeric ids use the most compact form that fits.
    fn form(&self) -> u8 {
        match self.identifier {
            Identifier::Numeric(v) if self.namespace == 0 && v <= 0xff => TWO_BYTE,
            Identifier::Numeric(v) if self.namespace <= 0xff && v <= 0xffff => FOUR_BYTE,
            Identifier::Numeric(_) => NUMERIC,
            Identifier::String(_) => STRING,
            Identifier::Guid(_) => GUID,
            Identifier::ByteString(_) => BYTE_STRING,
        }
    }

    fn encode_with_flags<S: Write>(&self, stream: &mut S, flags: u8) -> EncodingResult<usize> {
        let form = self.form();
        let mut size = write_u8(stream, form | flags)?;
        size += match (form, &self.identifier) {
            (TWO_BYTE, Identifier::Numeric(v)) => write_u8(stream, *v as u8)?,
            (FOUR_BYTE, Identifier::Numeric(v)) => {
                write_u8(stream, self.namespace as u8)? + write_u16(stream, *v as u16)?
            }
            (_, identifier) => {
                let size = write_u16(stream, self.namespace)?;
                size + match identifier {
                    Identifier::Numeric(v) => write_u32(stream, *v)?,
                    Identifier::String(v) => v.encode(stream)?,
                    Identifier::Guid(v) => v.encode(stream)?,
                    Identifier::ByteString(v) => v.encode(stream)?,
                }
            }
        };
        Ok(size)
    }

    fn decode_form<S: Read>(
        stream: &mut S,
        form: u8,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<NodeId> {
        let node_id = match form {
            TWO_BYTE => NodeId::new(0, u32::from(read_u8(stream)?)),
            FOUR_BYTE => {
                let namespace = u16::from(read_u8(stream)?);
                NodeId::new(namespace, u32::from(read_u16(stream)?))
            }
            NUMERIC | STRING | GUID | BYTE_STRING => {
                let namespace = read_u16(stream)?;
                let identifier = match form {
                    NUMERIC => Identifier::Numeric(read_u32(stream)?),
                    STRING => Identifier::String(UAString::decode(stream, decoding_options)?),
                    GUID => Identifier::Guid(Guid::decode(stream, decoding_options)?),
                    _ => Identifier::ByteString(ByteString::decode(stream, decoding_options)?),
                };
                NodeId {
                    namespace,
                    identifier,
                }
            }
            _ => {
                error!("Node id form {:#x} is not recognized", form);
                return Err(StatusCode::BadDecodingError);
            }
        };
        Ok(node_id)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::null()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};", self.namespace)?;
        }
        write!(f, "{}", self.identifier)
    }
}

impl FromStr for NodeId {
    type Err = StatusCode;

    /// Parses the `ns=<index>;<kind>=<value>` form, the namespace part is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref NODE_ID: Regex =
                Regex::new(r"^(?:ns=(?P<ns>\d+);)?(?P<id>[isgb]=.+)$").expect("valid pattern");
        }
        let captures = NODE_ID.captures(s).ok_or(StatusCode::BadNodeIdInvalid)?;
        let namespace = match captures.name("ns") {
            Some(ns) => ns
                .as_str()
                .parse::<u16>()
                .map_err(|_| StatusCode::BadNodeIdInvalid)?,
            None => 0,
        };
        let identifier = captures
            .name("id")
            .ok_or(StatusCode::BadNodeIdInvalid)?
            .as_str()
            .parse::<Identifier>()?;
        Ok(NodeId {
            namespace,
            identifier,
        })
    }
}

impl BinaryEncoder<NodeId> for NodeId {
    fn byte_len(&self) -> usize {
        match (self.form(), &self.identifier) {
            (TWO_BYTE, _) => 2,
            (FOUR_BYTE, _) => 4,
            (_, Identifier::Numeric(_)) => 7,
            (_, Identifier::String(v)) => 3 + v.byte_len(),
            (_, Identifier::Guid(v)) => 3 + v.byte_len(),
            (_, Identifier::ByteString(v)) => 3 + v.byte_len(),
        }
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        self.encode_with_flags(stream, 0)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let form = read_u8(stream)?;
        if form & !FORM_MASK != 0 {
            error!("Node id encoding {:#x} carries expanded node id flags", form);
            return Err(StatusCode::BadDecodingError);
        }
        NodeId::decode_form(stream, form, decoding_options)
    }
}

/// A node id that may name its namespace by URI and live on another server.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Default)]
pub struct ExpandedNodeId {
    pub node_id: NodeId,
    pub namespace_uri: UAString,
    pub server_index: u32,
}

impl From<NodeId> for ExpandedNodeId {
    fn from(node_id: NodeId) -> Self {
        ExpandedNodeId {
            node_id,
            namespace_uri: UAString::null(),
            server_index: 0,
        }
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.server_index != 0 {
            write!(f, "svr={};", self.server_index)?;
        }
        match self.namespace_uri.value() {
            Some(uri) => write!(f, "nsu={};{}", uri, self.node_id.identifier),
            None => write!(f, "{}", self.node_id),
        }
    }
}

impl BinaryEncoder<ExpandedNodeId> for ExpandedNodeId {
    fn byte_len(&self) -> usize {
        let mut size = self.node_id.byte_len();
        if !self.namespace_uri.is_null() {
            size += self.namespace_uri.byte_len();
        }
        if self.server_index != 0 {
            size += 4;
        }
        size
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut flags = 0;
        if !self.namespace_uri.is_null() {
            flags |= HAS_NAMESPACE_URI;
        }
        if self.server_index != 0 {
            flags |= HAS_SERVER_INDEX;
        }
        let mut size = self.node_id.encode_with_flags(stream, flags)?;
        if flags & HAS_NAMESPACE_URI != 0 {
            size += self.namespace_uri.encode(stream)?;
        }
        if flags & HAS_SERVER_INDEX != 0 {
            size += write_u32(stream, self.server_index)?;
        }
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let encoding = read_u8(stream)?;
        let node_id = NodeId::decode_form(stream, encoding & FORM_MASK, decoding_options)?;
        let namespace_uri = if encoding & HAS_NAMESPACE_URI != 0 {
            UAString::decode(stream, decoding_options)?
        } else {
            UAString::null()
        };
        let server_index = if encoding & HAS_SERVER_INDEX != 0 {
            read_u32(stream)?
        } else {
            0
        };
        Ok(ExpandedNodeId {
            node_id,
            namespace_uri,
            server_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::*;

    #[test]
    fn compact_forms() {
        serialize_and_compare(NodeId::new(0, 0x72u32), &[0x00, 0x72]);
        serialize_and_compare(NodeId::new(5, 1025u32), &[0x01, 0x05, 0x01, 0x04]);
        serialize_and_compare(
            NodeId::new(1, 0x1_0000u32),
            &[0x02, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00],
        );
        serialize_and_compare(
            NodeId::new(1, "Hot"),
            &[0x03, 0x01, 0x00, 0x03, 0x00, 0x00, 0x00, b'H', b'o', b't'],
        );
        serialize_test(NodeId::new(3, Guid::new()));
        serialize_test(NodeId::new(3, ByteString::from(vec![1u8, 2, 3])));
    }

    #[test]
    fn expanded() {
        let mut value = ExpandedNodeId::from(NodeId::new(0, 0x72u32));
        value.namespace_uri = UAString::from("urn:x");
        value.server_index = 2;
        serialize_and_compare(
            value,
            &[
                0xc0, 0x72, 0x05, 0x00, 0x00, 0x00, b'u', b'r', b'n', b':', b'x', 0x02, 0x00,
                0x00, 0x00,
            ],
        );
        serialize_test(ExpandedNodeId::from(NodeId::new(2, "Device")));
    }

    #[test]
    fn parse() {
        assert_eq!("i=85".parse::<NodeId>().unwrap(), NodeId::new(0, 85u32));
        assert_eq!(
            "ns=2;s=Device".parse::<NodeId>().unwrap(),
            NodeId::new(2, "Device")
        );
        assert_eq!(NodeId::new(2, "Device").to_string(), "ns=2;s=Device");
        assert_eq!(
            "ns=2;x=1".parse::<NodeId>().unwrap_err(),
            StatusCode::BadNodeIdInvalid
        );
        assert!("ns=99999;i=1".parse::<NodeId>().is_err());
    }
}
