// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Default decoding limits.

/// Default maximum number of elements in an array
pub const MAX_ARRAY_LENGTH: usize = 1000;
/// Default maximum size of a string in bytes
pub const MAX_STRING_LENGTH: usize = 65535;
/// Default maximum size of a byte string in bytes
pub const MAX_BYTE_STRING_LENGTH: usize = 65535;
/// Default maximum decoding depth for recursive data structures, i.e. if data is nested deeper
/// than this it is an error during decoding. This is a security measure to stop deeply nested
/// junk being sent to a server / client.
pub const MAX_DECODING_DEPTH: usize = 10;
/// Default maximum number of bits accumulated from a single bit field
pub const MAX_BIT_FIELD_LENGTH: usize = 64;
