// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The `BinaryEncoder` trait, the decoding limits and the little endian read / write helpers
//! that every built-in type is encoded with.

use std::{
    io::{self, Cursor, Read, Write},
    sync::Arc,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    sync::Mutex,
    types::{constants, StatusCode},
};

pub type EncodingResult<T> = std::result::Result<T, StatusCode>;

/// Counts how deeply recursive values (variants, extension objects, structures) are nested
/// while decoding.
#[derive(Debug)]
pub struct DepthGauge {
    pub(crate) max_depth: usize,
    pub(crate) current_depth: usize,
}

impl Default for DepthGauge {
    fn default() -> Self {
        Self::new(constants::MAX_DECODING_DEPTH)
    }
}

impl DepthGauge {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            current_depth: 0,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn current_depth(&self) -> usize {
        self.current_depth
    }
}

/// One level of nesting, given back to the gauge on drop.
#[derive(Debug)]
pub struct DepthLock {
    depth_gauge: Arc<Mutex<DepthGauge>>,
}

impl DepthLock {
    pub fn obtain(depth_gauge: Arc<Mutex<DepthGauge>>) -> EncodingResult<DepthLock> {
        {
            let mut gauge = trace_lock!(depth_gauge);
            if gauge.current_depth >= gauge.max_depth {
                warn!(
                    "Decoding aborted, nesting is deeper than the limit of {}",
                    gauge.max_depth
                );
                return Err(StatusCode::BadDecodingError);
            }
            gauge.current_depth += 1;
        }
        Ok(DepthLock { depth_gauge })
    }
}

impl Drop for DepthLock {
    fn drop(&mut self) {
        let mut gauge = trace_lock!(self.depth_gauge);
        gauge.current_depth = gauge.current_depth.saturating_sub(1);
    }
}

/// Limits applied while decoding. A limit of 0 means nothing of that kind is accepted.
#[derive(Clone, Debug)]
pub struct DecodingOptions {
    /// Maximum length in bytes of a string
    pub max_string_length: usize,
    /// Maximum length in bytes of a byte string
    pub max_byte_string_length: usize,
    /// Maximum number of elements in an array
    pub max_array_length: usize,
    /// Nesting depth of the decode in progress. Clones share the gauge, see
    /// [`DecodingOptions::isolated`].
    pub decoding_depth_gauge: Arc<Mutex<DepthGauge>>,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        DecodingOptions {
            max_string_length: constants::MAX_STRING_LENGTH,
            max_byte_string_length: constants::MAX_BYTE_STRING_LENGTH,
            max_array_length: constants::MAX_ARRAY_LENGTH,
            decoding_depth_gauge: Arc::new(Mutex::new(DepthGauge::default())),
        }
    }
}

impl DecodingOptions {
    /// Default limits with a different maximum nesting depth.
    pub fn with_max_depth(max_depth: usize) -> Self {
        DecodingOptions {
            decoding_depth_gauge: Arc::new(Mutex::new(DepthGauge::new(max_depth))),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn test() -> Self {
        Self::default()
    }

    pub fn max_decoding_depth(&self) -> usize {
        trace_lock!(self.decoding_depth_gauge).max_depth
    }

    /// The same limits with a depth gauge of their own. A top level decode runs on isolated
    /// options so decodes that were handed the same options do not add to each other's depth.
    pub fn isolated(&self) -> Self {
        DecodingOptions {
            decoding_depth_gauge: Arc::new(Mutex::new(DepthGauge::new(
                self.max_decoding_depth(),
            ))),
            ..self.clone()
        }
    }

    pub fn depth_lock(&self) -> EncodingResult<DepthLock> {
        DepthLock::obtain(self.decoding_depth_gauge.clone())
    }
}

/// Binary encoding of a built-in type.
pub trait BinaryEncoder<T> {
    /// Exact number of bytes `encode` writes
    fn byte_len(&self) -> usize;
    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize>;
    /// Decodes a value, failing with `BadDecodingError` as soon as a limit in the options is
    /// exceeded.
    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<T>;

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut stream = Cursor::new(Vec::with_capacity(self.byte_len()));
        let _ = self.encode(&mut stream);
        stream.into_inner()
    }
}

pub fn process_encode_io_result(result: io::Result<usize>) -> EncodingResult<usize> {
    result.map_err(|err| {
        trace!("Encoding error - {:?}", err);
        StatusCode::BadEncodingError
    })
}

pub fn process_decode_io_result<T>(result: io::Result<T>) -> EncodingResult<T> {
    result.map_err(|err| {
        trace!("Decoding error - {:?}", err);
        StatusCode::BadDecodingError
    })
}

macro_rules! le_io {
    ($read:ident, $write:ident, $ty:ty, $len:expr) => {
        pub fn $read<S: Read + ?Sized>(stream: &mut S) -> EncodingResult<$ty> {
            process_decode_io_result(stream.$read::<LittleEndian>())
        }

        pub fn $write<S, T>(stream: &mut S, value: T) -> EncodingResult<usize>
        where
            S: Write + ?Sized,
            T: Into<$ty>,
        {
            process_encode_io_result(stream.$write::<LittleEndian>(value.into()).map(|_| $len))
        }
    };
}

le_io!(read_i16, write_i16, i16, 2);
le_io!(read_u16, write_u16, u16, 2);
le_io!(read_i32, write_i32, i32, 4);
le_io!(read_u32, write_u32, u32, 4);
le_io!(read_i64, write_i64, i64, 8);
le_io!(read_u64, write_u64, u64, 8);
le_io!(read_f32, write_f32, f32, 4);
le_io!(read_f64, write_f64, f64, 8);

pub fn read_u8<S: Read + ?Sized>(stream: &mut S) -> EncodingResult<u8> {
    process_decode_io_result(stream.read_u8())
}

pub fn write_u8<S, T>(stream: &mut S, value: T) -> EncodingResult<usize>
where
    S: Write + ?Sized,
    T: Into<u8>,
{
    process_encode_io_result(stream.write_u8(value.into()).map(|_| 1))
}

pub fn read_bytes<S: Read + ?Sized>(stream: &mut S, buf: &mut [u8]) -> EncodingResult<usize> {
    process_decode_io_result(stream.read_exact(buf))?;
    Ok(buf.len())
}

pub fn write_bytes<S: Write + ?Sized>(stream: &mut S, buf: &[u8]) -> EncodingResult<usize> {
    process_encode_io_result(stream.write_all(buf).map(|_| buf.len()))
}

/// Reads the Int32 length that prefixes strings, byte strings and arrays. -1 is the null
/// value, anything else below 0 or above `limit` fails.
pub fn read_length<S: Read + ?Sized>(
    stream: &mut S,
    limit: usize,
    what: &str,
) -> EncodingResult<Option<usize>> {
    match read_i32(stream)? {
        -1 => Ok(None),
        len if len < -1 => {
            error!("{} length {} is negative", what, len);
            Err(StatusCode::BadDecodingError)
        }
        len if len as usize > limit => {
            error!("{} length {} exceeds decoding limit {}", what, len, limit);
            Err(StatusCode::BadDecodingError)
        }
        len => Ok(Some(len as usize)),
    }
}

/// Writes a length prefix, -1 for `None`.
pub fn write_length<S: Write + ?Sized>(stream: &mut S, len: Option<usize>) -> EncodingResult<usize> {
    match len {
        None => write_i32(stream, -1),
        Some(len) => {
            let len = i32::try_from(len).map_err(|_| {
                error!("Length {} does not fit in an Int32", len);
                StatusCode::BadEncodingLimitsExceeded
            })?;
            write_i32(stream, len)
        }
    }
}

pub fn write_array<S: Write, T: BinaryEncoder<T>>(
    stream: &mut S,
    values: &Option<Vec<T>>,
) -> EncodingResult<usize> {
    let mut size = write_length(stream, values.as_ref().map(|v| v.len()))?;
    for value in values.iter().flatten() {
        size += value.encode(stream)?;
    }
    Ok(size)
}

pub fn read_array<S: Read, T: BinaryEncoder<T>>(
    stream: &mut S,
    decoding_options: &DecodingOptions,
) -> EncodingResult<Option<Vec<T>>> {
    match read_length(stream, decoding_options.max_array_length, "Array")? {
        None => Ok(None),
        Some(len) => {
            let mut values = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(T::decode(stream, decoding_options)?);
            }
            Ok(Some(values))
        }
    }
}

/// Size of an optional member of a masked structure, 0 when it is left off the wire.
pub(crate) fn byte_len_optional<T: BinaryEncoder<T>>(value: &Option<T>) -> usize {
    value.as_ref().map_or(0, |v| v.byte_len())
}

/// Sets `bit` in the mask when the optional member is present.
pub(crate) fn mask_bit<T>(value: &Option<T>, bit: u8) -> u8 {
    if value.is_some() {
        bit
    } else {
        0
    }
}

pub(crate) fn write_optional<S: Write, T: BinaryEncoder<T>>(
    stream: &mut S,
    value: &Option<T>,
) -> EncodingResult<usize> {
    match value {
        Some(v) => v.encode(stream),
        None => Ok(0),
    }
}

/// Reads an optional member of a masked structure, present when `bit` is set in the mask.
pub(crate) fn read_optional<S: Read, T: BinaryEncoder<T>>(
    stream: &mut S,
    mask: u8,
    bit: u8,
    decoding_options: &DecodingOptions,
) -> EncodingResult<Option<T>> {
    if mask & bit != 0 {
        T::decode(stream, decoding_options).map(Some)
    } else {
        Ok(None)
    }
}
