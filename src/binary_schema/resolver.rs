// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Type resolution. A [`TypeDictionary`] holds the types of one namespace, the
//! [`DictionaryManager`] holds a dictionary per namespace and is what codecs are normally
//! given to resolve the types they refer to.

use std::{
    collections::HashMap,
    io::{Read, Write},
    sync::Arc,
};

use crate::{
    core::config::CodecConfig,
    sync::RwLock,
    types::DecodingOptions,
};

use super::{
    bsd,
    codec::StructCodec,
    error::{DecodingError, EncodingError, Reason, SchemaError},
    model::{EnumeratedTypeDescriptor, StructuredTypeDescriptor},
    value::StructuredValue,
};

/// A type that is not a primitive, as found by a resolver.
#[derive(Debug, Clone)]
pub enum ResolvedType {
    Structured(Arc<StructCodec>),
    Enumerated(Arc<EnumeratedTypeDescriptor>),
}

/// Looks up types by namespace URI and name on behalf of a codec.
pub trait TypeResolver: Send + Sync {
    /// Finds the type, failing with `DictionaryNotFound` if nothing is known about the
    /// namespace or `TypeNotFound` if the namespace does not hold the type.
    fn resolve(&self, namespace_uri: &str, type_name: &str) -> Result<ResolvedType, Reason>;
}

/// The structured and enumerated types of a single namespace.
#[derive(Debug)]
pub struct TypeDictionary {
    namespace_uri: String,
    structured: HashMap<String, Arc<StructCodec>>,
    enumerated: HashMap<String, Arc<EnumeratedTypeDescriptor>>,
}

impl TypeDictionary {
    pub fn new<T>(namespace_uri: T) -> TypeDictionary
    where
        T: Into<String>,
    {
        TypeDictionary {
            namespace_uri: namespace_uri.into(),
            structured: HashMap::new(),
            enumerated: HashMap::new(),
        }
    }

    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    /// Compiles and adds a structured type, replacing any type with the same name.
    pub fn add_structured(
        &mut self,
        descriptor: StructuredTypeDescriptor,
    ) -> Result<Arc<StructCodec>, SchemaError> {
        let codec = Arc::new(StructCodec::new(descriptor)?);
        if self.enumerated.remove(codec.name()).is_some() {
            warn!(
                "Structured type {} replaces an enumerated type in {}",
                codec.name(),
                self.namespace_uri
            );
        }
        self.structured
            .insert(codec.name().to_string(), codec.clone());
        Ok(codec)
    }

    /// Adds an enumerated type, replacing any type with the same name.
    pub fn add_enumerated(
        &mut self,
        descriptor: EnumeratedTypeDescriptor,
    ) -> Arc<EnumeratedTypeDescriptor> {
        let descriptor = Arc::new(descriptor);
        if self.structured.remove(&descriptor.name).is_some() {
            warn!(
                "Enumerated type {} replaces a structured type in {}",
                descriptor.name, self.namespace_uri
            );
        }
        self.enumerated
            .insert(descriptor.name.clone(), descriptor.clone());
        descriptor
    }

    pub fn structured(&self, type_name: &str) -> Option<Arc<StructCodec>> {
        self.structured.get(type_name).cloned()
    }

    pub fn enumerated(&self, type_name: &str) -> Option<Arc<EnumeratedTypeDescriptor>> {
        self.enumerated.get(type_name).cloned()
    }

    /// Names of all the types in the dictionary, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .structured
            .keys()
            .chain(self.enumerated.keys())
            .map(|n| n.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.structured.len() + self.enumerated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds a type by name within this dictionary.
    pub fn lookup(&self, type_name: &str) -> Option<ResolvedType> {
        if let Some(codec) = self.structured(type_name) {
            Some(ResolvedType::Structured(codec))
        } else {
            self.enumerated(type_name).map(ResolvedType::Enumerated)
        }
    }
}

impl TypeResolver for TypeDictionary {
    fn resolve(&self, namespace_uri: &str, type_name: &str) -> Result<ResolvedType, Reason> {
        if namespace_uri != self.namespace_uri {
            return Err(Reason::DictionaryNotFound {
                namespace_uri: namespace_uri.to_string(),
            });
        }
        self.lookup(type_name).ok_or_else(|| Reason::TypeNotFound {
            namespace_uri: namespace_uri.to_string(),
            type_name: type_name.to_string(),
        })
    }
}

/// Holds the type dictionaries of every known namespace. The manager is shared between
/// the threads that decode and encode and dictionaries may be registered at any time.
#[derive(Debug, Default)]
pub struct DictionaryManager {
    dictionaries: RwLock<HashMap<String, Arc<TypeDictionary>>>,
}

impl TypeResolver for DictionaryManager {
    fn resolve(&self, namespace_uri: &str, type_name: &str) -> Result<ResolvedType, Reason> {
        let dictionary =
            self.dictionary(namespace_uri)
                .ok_or_else(|| Reason::DictionaryNotFound {
                    namespace_uri: namespace_uri.to_string(),
                })?;
        dictionary.resolve(namespace_uri, type_name)
    }
}

impl DictionaryManager {
    pub fn new() -> DictionaryManager {
        DictionaryManager::default()
    }

    /// Creates a manager holding the dictionaries listed in the configuration.
    pub fn from_config(config: &CodecConfig) -> Result<DictionaryManager, SchemaError> {
        let manager = DictionaryManager::new();
        for path in &config.dictionaries {
            let dictionary = bsd::load_from_file(path)?;
            manager.register(dictionary);
        }
        Ok(manager)
    }

    /// Registers a dictionary under its namespace URI, returning the dictionary it replaces.
    pub fn register(&self, dictionary: TypeDictionary) -> Option<Arc<TypeDictionary>> {
        let namespace_uri = dictionary.namespace_uri().to_string();
        info!(
            "Registering dictionary {} with {} types",
            namespace_uri,
            dictionary.len()
        );
        let mut dictionaries = trace_write_lock!(self.dictionaries);
        let replaced = dictionaries.insert(namespace_uri, Arc::new(dictionary));
        if let Some(ref replaced) = replaced {
            debug!("Dictionary {} was replaced", replaced.namespace_uri());
        }
        replaced
    }

    pub fn unregister(&self, namespace_uri: &str) -> Option<Arc<TypeDictionary>> {
        let mut dictionaries = trace_write_lock!(self.dictionaries);
        dictionaries.remove(namespace_uri)
    }

    pub fn dictionary(&self, namespace_uri: &str) -> Option<Arc<TypeDictionary>> {
        let dictionaries = trace_read_lock!(self.dictionaries);
        dictionaries.get(namespace_uri).cloned()
    }

    /// Namespace URIs of the registered dictionaries, sorted
    pub fn namespaces(&self) -> Vec<String> {
        let dictionaries = trace_read_lock!(self.dictionaries);
        let mut namespaces: Vec<String> = dictionaries.keys().cloned().collect();
        namespaces.sort_unstable();
        namespaces
    }

    fn structured(&self, namespace_uri: &str, type_name: &str) -> Result<Arc<StructCodec>, Reason> {
        let dictionary =
            self.dictionary(namespace_uri)
                .ok_or_else(|| Reason::DictionaryNotFound {
                    namespace_uri: namespace_uri.to_string(),
                })?;
        dictionary
            .structured(type_name)
            .ok_or_else(|| Reason::TypeNotFound {
                namespace_uri: namespace_uri.to_string(),
                type_name: type_name.to_string(),
            })
    }

    /// Decodes a value of a structured type from the stream.
    pub fn decode<S: Read>(
        &self,
        namespace_uri: &str,
        type_name: &str,
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> Result<StructuredValue, DecodingError> {
        let codec = self.structured(namespace_uri, type_name)?;
        codec.decode(stream, self, decoding_options)
    }

    /// Encodes a value of a structured type to the stream and returns the number of bytes
    /// written.
    pub fn encode<S: Write>(
        &self,
        namespace_uri: &str,
        type_name: &str,
        stream: &mut S,
        value: &StructuredValue,
    ) -> Result<usize, EncodingError> {
        let codec = self.structured(namespace_uri, type_name)?;
        codec.encode(stream, value, self)
    }
}
