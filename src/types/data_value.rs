// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! `DataValue` and `DiagnosticInfo`. Both encode a mask byte followed by the members the mask
//! says are present.

use std::io::{Read, Write};

use crate::types::{encoding::*, DateTime, StatusCode, UAString, Variant};

const HAS_VALUE: u8 = 0x01;
const HAS_STATUS: u8 = 0x02;
const HAS_SOURCE_TIMESTAMP: u8 = 0x04;
const HAS_SERVER_TIMESTAMP: u8 = 0x08;
const HAS_SOURCE_PICOSECONDS: u8 = 0x10;
const HAS_SERVER_PICOSECONDS: u8 = 0x20;

/// A value with its status and timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    pub value: Option<Variant>,
    pub status: Option<StatusCode>,
    pub source_timestamp: Option<DateTime>,
    pub source_picoseconds: Option<u16>,
    pub server_timestamp: Option<DateTime>,
    pub server_picoseconds: Option<u16>,
}

impl From<Variant> for DataValue {
    fn from(value: Variant) -> Self {
        DataValue {
            value: Some(value),
            ..Default::default()
        }
    }
}

impl DataValue {
    fn mask(&self) -> u8 {
        mask_bit(&self.value, HAS_VALUE)
            | mask_bit(&self.status, HAS_STATUS)
            | mask_bit(&self.source_timestamp, HAS_SOURCE_TIMESTAMP)
            | mask_bit(&self.server_timestamp, HAS_SERVER_TIMESTAMP)
            | mask_bit(&self.source_picoseconds, HAS_SOURCE_PICOSECONDS)
            | mask_bit(&self.server_picoseconds, HAS_SERVER_PICOSECONDS)
    }
}

impl BinaryEncoder<DataValue> for DataValue {
    fn byte_len(&self) -> usize {
        1 + byte_len_optional(&self.value)
            + byte_len_optional(&self.status)
            + byte_len_optional(&self.source_timestamp)
            + byte_len_optional(&self.source_picoseconds)
            + byte_len_optional(&self.server_timestamp)
            + byte_len_optional(&self.server_picoseconds)
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        Ok(write_u8(stream, self.mask())?
            + write_optional(stream, &self.value)?
            + write_optional(stream, &self.status)?
            + write_optional(stream, &self.source_timestamp)?
            + write_optional(stream, &self.source_picoseconds)?
            + write_optional(stream, &self.server_timestamp)?
            + write_optional(stream, &self.server_picoseconds)?)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let mask = read_u8(stream)?;
        Ok(DataValue {
            value: read_optional(stream, mask, HAS_VALUE, decoding_options)?,
            status: read_optional(stream, mask, HAS_STATUS, decoding_options)?,
            source_timestamp: read_optional(stream, mask, HAS_SOURCE_TIMESTAMP, decoding_options)?,
            source_picoseconds: read_optional(stream, mask, HAS_SOURCE_PICOSECONDS, decoding_options)?,
            server_timestamp: read_optional(stream, mask, HAS_SERVER_TIMESTAMP, decoding_options)?,
            server_picoseconds: read_optional(stream, mask, HAS_SERVER_PICOSECONDS, decoding_options)?,
        })
    }
}

const HAS_SYMBOLIC_ID: u8 = 0x01;
const HAS_NAMESPACE: u8 = 0x02;
const HAS_LOCALIZED_TEXT: u8 = 0x04;
const HAS_LOCALE: u8 = 0x08;
const HAS_ADDITIONAL_INFO: u8 = 0x10;
const HAS_INNER_STATUS_CODE: u8 = 0x20;
const HAS_INNER_DIAGNOSTIC_INFO: u8 = 0x40;

/// Diagnostics for an operation. The integer members index a string table held elsewhere.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct DiagnosticInfo {
    pub symbolic_id: Option<i32>,
    pub namespace_uri: Option<i32>,
    pub locale: Option<i32>,
    pub localized_text: Option<i32>,
    pub additional_info: Option<UAString>,
    pub inner_status_code: Option<StatusCode>,
    pub inner_diagnostic_info: Option<Box<DiagnosticInfo>>,
}

impl DiagnosticInfo {
    fn mask(&self) -> u8 {
        mask_bit(&self.symbolic_id, HAS_SYMBOLIC_ID)
            | mask_bit(&self.namespace_uri, HAS_NAMESPACE)
            | mask_bit(&self.localized_text, HAS_LOCALIZED_TEXT)
            | mask_bit(&self.locale, HAS_LOCALE)
            | mask_bit(&self.additional_info, HAS_ADDITIONAL_INFO)
            | mask_bit(&self.inner_status_code, HAS_INNER_STATUS_CODE)
            | mask_bit(&self.inner_diagnostic_info, HAS_INNER_DIAGNOSTIC_INFO)
    }
}

impl BinaryEncoder<DiagnosticInfo> for DiagnosticInfo {
    fn byte_len(&self) -> usize {
        1 + byte_len_optional(&self.symbolic_id)
            + byte_len_optional(&self.namespace_uri)
            + byte_len_optional(&self.locale)
            + byte_len_optional(&self.localized_text)
            + byte_len_optional(&self.additional_info)
            + byte_len_optional(&self.inner_status_code)
            + self.inner_diagnostic_info.as_ref().map_or(0, |v| v.byte_len())
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut size = write_u8(stream, self.mask())?
            + write_optional(stream, &self.symbolic_id)?
            + write_optional(stream, &self.namespace_uri)?
            + write_optional(stream, &self.locale)?
            + write_optional(stream, &self.localized_text)?
            + write_optional(stream, &self.additional_info)?
            + write_optional(stream, &self.inner_status_code)?;
        if let Some(inner) = &self.inner_diagnostic_info {
            size += inner.encode(stream)?;
        }
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let mask = read_u8(stream)?;
        let mut value = DiagnosticInfo {
            symbolic_id: read_optional(stream, mask, HAS_SYMBOLIC_ID, decoding_options)?,
            namespace_uri: read_optional(stream, mask, HAS_NAMESPACE, decoding_options)?,
            locale: read_optional(stream, mask, HAS_LOCALE, decoding_options)?,
            localized_text: read_optional(stream, mask, HAS_LOCALIZED_TEXT, decoding_options)?,
            additional_info: read_optional(stream, mask, HAS_ADDITIONAL_INFO, decoding_options)?,
            inner_status_code: read_optional(stream, mask, HAS_INNER_STATUS_CODE, decoding_options)?,
            inner_diagnostic_info: None,
        };
        if mask & HAS_INNER_DIAGNOSTIC_INFO != 0 {
            let _depth_lock = decoding_options.depth_lock()?;
            value.inner_diagnostic_info =
                Some(Box::new(DiagnosticInfo::decode(stream, decoding_options)?));
        }
        Ok(value)
    }
}
