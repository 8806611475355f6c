// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The core module holds functionality shared by everything that uses the codec, currently the
//! configuration of decoding limits and dictionaries.

pub mod config;
