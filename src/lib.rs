// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Dynamic OPC UA binary codec.
//!
//! Structures that are not known at compile time are described by an OPC UA binary schema
//! (an `opc:TypeDictionary` document). This crate loads those dictionaries and interprets them
//! to decode and encode values on the wire, staying compatible with the fixed encoders of the
//! built-in types in [`types`].
//!
//! ```no_run
//! use std::{io::Cursor, sync::Arc};
//! use opcua_binary_schema::{binary_schema::*, types::DecodingOptions};
//!
//! let dictionary = bsd::load_from_file("MyTypes.bsd").unwrap();
//! let manager = Arc::new(DictionaryManager::new());
//! let namespace = dictionary.namespace_uri().to_string();
//! manager.register(dictionary);
//!
//! let bytes = vec![0u8; 16];
//! let value = manager
//!     .decode(&namespace, "MyStruct", &mut Cursor::new(bytes), &DecodingOptions::default())
//!     .unwrap();
//! println!("{}", value);
//! ```

#![allow(clippy::from_over_into)]
#![allow(clippy::result_unit_err)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[cfg(test)]
extern crate tempdir;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate serde_derive;

/// Tracing macro for obtaining a lock on a `Mutex`. Sometimes deadlocks can happen in code,
/// and if they do, this macro is useful for finding out where they happened.
#[macro_export]
macro_rules! trace_lock {
    ( $x:expr ) => {{
        let v = $x.lock();
        v
    }};
}

/// Tracing macro for obtaining a read lock on a `RwLock`.
#[macro_export]
macro_rules! trace_read_lock {
    ( $x:expr ) => {{
        let v = $x.read();
        v
    }};
}

/// Tracing macro for obtaining a write lock on a `RwLock`.
#[macro_export]
macro_rules! trace_write_lock {
    ( $x:expr ) => {{
        let v = $x.write();
        v
    }};
}

pub mod binary_schema;
#[cfg(feature = "console-logging")]
pub mod console_logging;
pub mod core;
pub mod sync;
pub mod types;

pub mod prelude {
    pub use crate::binary_schema::prelude::*;
    pub use crate::core::config::Config;
    pub use crate::types::*;
}
