// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::result::Result;
use std::sync::Arc;

use crate::{
    sync::Mutex,
    types::{constants, DecodingOptions, DepthGauge},
};

/// A trait that handles the loading / saving and validity of configuration information.
pub trait Config: serde::Serialize {
    fn save(&self, path: &Path) -> Result<(), ()> {
        if self.is_valid() {
            let s = serde_yaml::to_string(&self).map_err(|err| {
                error!("Cannot serialize configuration, error = {}", err);
            })?;
            if let Ok(mut f) = File::create(path) {
                let result = f.write_all(s.as_bytes());
                if let Err(err) = result {
                    error!("Could not save config - error = {:?}", err)
                } else {
                    return Ok(());
                }
            } else {
                error!("Cannot create the path to save the config");
            }
        } else {
            error!("Config isn't valid and won't be saved");
        }
        Err(())
    }

    fn load<A>(path: &Path) -> Result<A, ()>
    where
        for<'de> A: Config + serde::Deserialize<'de>,
    {
        if let Ok(mut f) = File::open(path) {
            let mut s = String::new();
            if f.read_to_string(&mut s).is_ok() {
                serde_yaml::from_str(&s).map_err(|err| {
                    error!(
                        "Cannot deserialize configuration from {}, error reason: {}",
                        path.to_string_lossy(),
                        err
                    );
                })
            } else {
                error!(
                    "Cannot read configuration file {} to string",
                    path.to_string_lossy()
                );
                Err(())
            }
        } else {
            error!("Cannot open configuration file {}", path.to_string_lossy());
            Err(())
        }
    }

    fn is_valid(&self) -> bool;
}

/// Configuration of the dynamic codec. The limits mirror the decoding limits of the built-in
/// encoders and the dictionaries are binary schema files that are loaded at start up.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum length in bytes of a decoded string
    #[serde(default = "defaults::max_string_length")]
    pub max_string_length: usize,
    /// Maximum length in bytes of a decoded byte string
    #[serde(default = "defaults::max_byte_string_length")]
    pub max_byte_string_length: usize,
    /// Maximum number of elements in a decoded array
    #[serde(default = "defaults::max_array_length")]
    pub max_array_length: usize,
    /// Maximum nesting of structures, variants and extension objects while decoding
    #[serde(default = "defaults::max_decoding_depth")]
    pub max_decoding_depth: usize,
    /// Binary schema (.bsd) files to load
    #[serde(default)]
    pub dictionaries: Vec<PathBuf>,
}

mod defaults {
    use crate::types::constants;

    pub fn max_string_length() -> usize {
        constants::MAX_STRING_LENGTH
    }

    pub fn max_byte_string_length() -> usize {
        constants::MAX_BYTE_STRING_LENGTH
    }

    pub fn max_array_length() -> usize {
        constants::MAX_ARRAY_LENGTH
    }

    pub fn max_decoding_depth() -> usize {
        constants::MAX_DECODING_DEPTH
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_string_length: constants::MAX_STRING_LENGTH,
            max_byte_string_length: constants::MAX_BYTE_STRING_LENGTH,
            max_array_length: constants::MAX_ARRAY_LENGTH,
            max_decoding_depth: constants::MAX_DECODING_DEPTH,
            dictionaries: Vec::new(),
        }
    }
}

impl Config for CodecConfig {
    fn is_valid(&self) -> bool {
        let mut valid = true;
        if self.max_decoding_depth == 0 {
            error!("Max decoding depth must be at least 1");
            valid = false;
        }
        for path in &self.dictionaries {
            if path.as_os_str().is_empty() {
                error!("Dictionary path is empty");
                valid = false;
            }
        }
        valid
    }
}

impl CodecConfig {
    /// Creates decoding options with this configuration's limits and a fresh depth gauge.
    pub fn decoding_options(&self) -> DecodingOptions {
        DecodingOptions {
            max_string_length: self.max_string_length,
            max_byte_string_length: self.max_byte_string_length,
            max_array_length: self.max_array_length,
            decoding_depth_gauge: Arc::new(Mutex::new(DepthGauge::new(self.max_decoding_depth))),
        }
    }

    pub fn add_dictionary<T>(mut self, path: T) -> Self
    where
        T: Into<PathBuf>,
    {
        self.dictionaries.push(path.into());
        self
    }
}
