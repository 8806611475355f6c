// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Encoders for the numeric built-in types and Boolean, which map straight onto Rust
//! primitives.

use std::io::{Read, Write};

use crate::types::encoding::*;

macro_rules! scalar_encoder {
    ($ty:ty, $len:expr, |$v:ident| $encode:expr, |$stream:ident| $decode:expr) => {
        impl BinaryEncoder<$ty> for $ty {
            fn byte_len(&self) -> usize {
                $len
            }

            fn encode<S: Write>(&self, $stream: &mut S) -> EncodingResult<usize> {
                let $v = *self;
                $encode
            }

            fn decode<S: Read>($stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
                $decode
            }
        }
    };
}

// A Boolean is one byte and any non-zero byte reads as true
scalar_encoder!(bool, 1, |v| write_u8(stream, u8::from(v)), |stream| Ok(
    read_u8(stream)? != 0
));
scalar_encoder!(i8, 1, |v| write_u8(stream, v as u8), |stream| Ok(
    read_u8(stream)? as i8
));
scalar_encoder!(u8, 1, |v| write_u8(stream, v), |stream| read_u8(stream));
scalar_encoder!(i16, 2, |v| write_i16(stream, v), |stream| read_i16(stream));
scalar_encoder!(u16, 2, |v| write_u16(stream, v), |stream| read_u16(stream));
scalar_encoder!(i32, 4, |v| write_i32(stream, v), |stream| read_i32(stream));
scalar_encoder!(u32, 4, |v| write_u32(stream, v), |stream| read_u32(stream));
scalar_encoder!(i64, 8, |v| write_i64(stream, v), |stream| read_i64(stream));
scalar_encoder!(u64, 8, |v| write_u64(stream, v), |stream| read_u64(stream));
scalar_encoder!(f32, 4, |v| write_f32(stream, v), |stream| read_f32(stream));
scalar_encoder!(f64, 8, |v| write_f64(stream, v), |stream| read_f64(stream));
