// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! `Guid`, a 16 byte identifier backed by `uuid`.

use std::{
    fmt,
    io::{Read, Write},
    str::FromStr,
};

use uuid::Uuid;

use crate::types::{encoding::*, StatusCode};

#[derive(Eq, PartialEq, Clone, Hash, Default)]
pub struct Guid {
    uuid: Uuid,
}

impl Guid {
    /// A random (v4) guid
    pub fn new() -> Guid {
        Guid::from(Uuid::new_v4())
    }

    pub fn null() -> Guid {
        Guid::from(Uuid::nil())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }
}

impl From<Uuid> for Guid {
    fn from(uuid: Uuid) -> Self {
        Guid { uuid }
    }
}

impl FromStr for Guid {
    type Err = StatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Guid::from).map_err(|err| {
            debug!("{} is not a guid - {}", s, err);
            StatusCode::BadDecodingError
        })
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.uuid.hyphenated())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Guid({})", self.uuid.hyphenated())
    }
}

// Data1, Data2 and Data3 are little endian on the wire and Data4 is a plain run of 8 bytes,
// which is the "le" byte order of uuid.
impl BinaryEncoder<Guid> for Guid {
    fn byte_len(&self) -> usize {
        16
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_bytes(stream, &self.uuid.to_bytes_le())
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        let mut bytes = [0u8; 16];
        read_bytes(stream, &mut bytes)?;
        Ok(Guid::from(Uuid::from_bytes_le(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_layout() {
        let guid = Guid::from_str("72962b91-fa75-4ae6-8d28-b404dc7daf63").unwrap();
        assert_eq!(
            guid.encode_to_vec(),
            vec![
                0x91, 0x2b, 0x96, 0x72, 0x75, 0xfa, 0xe6, 0x4a, 0x8d, 0x28, 0xb4, 0x04, 0xdc,
                0x7d, 0xaf, 0x63
            ]
        );
        assert!(Guid::from_str("not a guid").is_err());
        assert_ne!(Guid::new(), Guid::null());
    }
}
