// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! `QualifiedName` and `LocalizedText`, the two name-like built-in types.

use std::{
    fmt,
    io::{Read, Write},
};

use crate::types::{encoding::*, UAString};

/// A name qualified by a namespace index.
#[derive(PartialEq, Eq, Debug, Clone, Hash, Default)]
pub struct QualifiedName {
    pub namespace_index: u16,
    pub name: UAString,
}

impl QualifiedName {
    pub fn new<T>(namespace_index: u16, name: T) -> QualifiedName
    where
        T: Into<UAString>,
    {
        QualifiedName {
            namespace_index,
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.namespace_index != 0 {
            write!(f, "{}:", self.namespace_index)?;
        }
        write!(f, "{}", self.name)
    }
}

impl BinaryEncoder<QualifiedName> for QualifiedName {
    fn byte_len(&self) -> usize {
        2 + self.name.byte_len()
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        Ok(write_u16(stream, self.namespace_index)? + self.name.encode(stream)?)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let namespace_index = read_u16(stream)?;
        let name = UAString::decode(stream, decoding_options)?;
        Ok(QualifiedName {
            namespace_index,
            name,
        })
    }
}

const HAS_LOCALE: u8 = 0x01;
const HAS_TEXT: u8 = 0x02;

/// Human readable text in a locale. A null locale or text is left off the wire.
#[derive(PartialEq, Eq, Debug, Clone, Hash, Default)]
pub struct LocalizedText {
    pub locale: UAString,
    pub text: UAString,
}

impl LocalizedText {
    pub fn new(locale: &str, text: &str) -> LocalizedText {
        LocalizedText {
            locale: UAString::from(locale),
            text: UAString::from(text),
        }
    }

    fn mask(&self) -> u8 {
        let mut mask = 0;
        if !self.locale.is_null() {
            mask |= HAS_LOCALE;
        }
        if !self.text.is_null() {
            mask |= HAS_TEXT;
        }
        mask
    }
}

impl<'a> From<&'a str> for LocalizedText {
    fn from(text: &'a str) -> Self {
        LocalizedText {
            locale: UAString::null(),
            text: UAString::from(text),
        }
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl BinaryEncoder<LocalizedText> for LocalizedText {
    fn byte_len(&self) -> usize {
        let mask = self.mask();
        let mut size = 1;
        if mask & HAS_LOCALE != 0 {
            size += self.locale.byte_len();
        }
        if mask & HAS_TEXT != 0 {
            size += self.text.byte_len();
        }
        size
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mask = self.mask();
        let mut size = write_u8(stream, mask)?;
        if mask & HAS_LOCALE != 0 {
            size += self.locale.encode(stream)?;
        }
        if mask & HAS_TEXT != 0 {
            size += self.text.encode(stream)?;
        }
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let mask = read_u8(stream)?;
        let read = |stream: &mut S, bit: u8| {
            if mask & bit != 0 {
                UAString::decode(stream, decoding_options)
            } else {
                Ok(UAString::null())
            }
        };
        let locale = read(stream, HAS_LOCALE)?;
        let text = read(stream, HAS_TEXT)?;
        Ok(LocalizedText { locale, text })
    }
}
