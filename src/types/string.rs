// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The length prefixed built-in types. `String` and `XmlElement` are UTF-8 text and
//! `ByteString` is opaque bytes. All three distinguish a null value (length -1) from an empty
//! one.

use std::{
    fmt,
    io::{Read, Write},
};

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::types::{encoding::*, StatusCode};

fn read_prefixed<S: Read>(stream: &mut S, limit: usize, what: &str) -> EncodingResult<Option<Vec<u8>>> {
    match read_length(stream, limit, what)? {
        None => Ok(None),
        Some(len) => {
            let mut buf = vec![0u8; len];
            read_bytes(stream, &mut buf)?;
            Ok(Some(buf))
        }
    }
}

fn write_prefixed<S: Write>(stream: &mut S, bytes: Option<&[u8]>) -> EncodingResult<usize> {
    let mut size = write_length(stream, bytes.map(|b| b.len()))?;
    if let Some(bytes) = bytes {
        size += write_bytes(stream, bytes)?;
    }
    Ok(size)
}

/// A string that may be null.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct UAString {
    value: Option<String>,
}

/// XML travels exactly like a string.
pub type XmlElement = UAString;

impl UAString {
    pub fn null() -> UAString {
        UAString { value: None }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn value(&self) -> &Option<String> {
        &self.value
    }

    pub fn as_ref(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

impl fmt::Display for UAString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl<'a> From<&'a str> for UAString {
    fn from(value: &'a str) -> Self {
        UAString {
            value: Some(value.to_string()),
        }
    }
}

impl From<String> for UAString {
    fn from(value: String) -> Self {
        UAString { value: Some(value) }
    }
}

impl BinaryEncoder<UAString> for UAString {
    fn byte_len(&self) -> usize {
        4 + self.value.as_ref().map_or(0, |v| v.len())
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_prefixed(stream, self.value.as_ref().map(|v| v.as_bytes()))
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        match read_prefixed(stream, decoding_options.max_string_length, "String")? {
            None => Ok(UAString::null()),
            Some(bytes) => String::from_utf8(bytes).map(UAString::from).map_err(|err| {
                trace!("Decoded string was not valid UTF-8 - {}", err);
                StatusCode::BadDecodingError
            }),
        }
    }
}

/// Opaque bytes that may be null.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub struct ByteString {
    pub value: Option<Vec<u8>>,
}

impl ByteString {
    pub fn null() -> ByteString {
        ByteString { value: None }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn as_base64(&self) -> String {
        self.value
            .as_ref()
            .map(|v| STANDARD.encode(v))
            .unwrap_or_default()
    }

    pub fn from_base64(data: &str) -> Option<ByteString> {
        STANDARD.decode(data).ok().map(ByteString::from)
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(value: Vec<u8>) -> Self {
        ByteString { value: Some(value) }
    }
}

impl<'a> From<&'a [u8]> for ByteString {
    fn from(value: &'a [u8]) -> Self {
        ByteString::from(value.to_vec())
    }
}

impl BinaryEncoder<ByteString> for ByteString {
    fn byte_len(&self) -> usize {
        4 + self.value.as_ref().map_or(0, |v| v.len())
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_prefixed(stream, self.value.as_deref())
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        read_prefixed(stream, decoding_options.max_byte_string_length, "ByteString")
            .map(|value| ByteString { value })
    }
}
