// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Errors raised while building codecs from a schema and while decoding or encoding with them.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::StatusCode;

/// Machine checkable classification of a [`Reason`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    UnsupportedLengthInBytes,
    TypeNotFound,
    DictionaryNotFound,
    UnknownSwitchOperand,
    Primitive,
    InvalidValue,
    DepthExceeded,
    LimitExceeded,
}

/// Why a decode or encode failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("field '{field}' declares its length in bytes, which is not supported")]
    UnsupportedLengthInBytes { field: String },
    #[error("type '{type_name}' not found in dictionary '{namespace_uri}'")]
    TypeNotFound {
        namespace_uri: String,
        type_name: String,
    },
    #[error("no dictionary registered for namespace '{namespace_uri}'")]
    DictionaryNotFound { namespace_uri: String },
    #[error("unknown switch operand '{operand}'")]
    UnknownSwitchOperand { operand: String },
    #[error("field '{field}': {status}")]
    Primitive { field: String, status: StatusCode },
    #[error("field '{field}': {message}")]
    InvalidValue { field: String, message: String },
    #[error("maximum decoding depth exceeded")]
    DepthExceeded,
    #[error("field '{field}': length {length} exceeds the limit of {limit}")]
    LimitExceeded {
        field: String,
        length: usize,
        limit: usize,
    },
}

impl Reason {
    pub fn code(&self) -> ReasonCode {
        match self {
            Reason::UnsupportedLengthInBytes { .. } => ReasonCode::UnsupportedLengthInBytes,
            Reason::TypeNotFound { .. } => ReasonCode::TypeNotFound,
            Reason::DictionaryNotFound { .. } => ReasonCode::DictionaryNotFound,
            Reason::UnknownSwitchOperand { .. } => ReasonCode::UnknownSwitchOperand,
            Reason::Primitive { .. } => ReasonCode::Primitive,
            Reason::InvalidValue { .. } => ReasonCode::InvalidValue,
            Reason::DepthExceeded => ReasonCode::DepthExceeded,
            Reason::LimitExceeded { .. } => ReasonCode::LimitExceeded,
        }
    }

    pub(crate) fn invalid_value<T>(field: &str, message: T) -> Reason
    where
        T: Into<String>,
    {
        Reason::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn primitive(field: &str, status: StatusCode) -> Reason {
        Reason::Primitive {
            field: field.to_string(),
            status,
        }
    }

    /// The status code reported for this reason, `fallback` unless a more specific code exists.
    fn status_code(&self, fallback: StatusCode) -> StatusCode {
        match self {
            Reason::Primitive { status, .. } => *status,
            Reason::UnsupportedLengthInBytes { .. } => StatusCode::BadDataEncodingUnsupported,
            Reason::TypeNotFound { .. } | Reason::DictionaryNotFound { .. } => {
                StatusCode::BadDataTypeIdUnknown
            }
            Reason::LimitExceeded { .. } => StatusCode::BadEncodingLimitsExceeded,
            _ => fallback,
        }
    }
}

/// A dynamic decode failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decoding failed, {0}")]
pub struct DecodingError(pub Reason);

impl DecodingError {
    pub fn reason(&self) -> &Reason {
        &self.0
    }

    pub fn code(&self) -> ReasonCode {
        self.0.code()
    }
}

impl From<Reason> for DecodingError {
    fn from(reason: Reason) -> Self {
        DecodingError(reason)
    }
}

impl From<DecodingError> for StatusCode {
    fn from(err: DecodingError) -> Self {
        err.0.status_code(StatusCode::BadDecodingError)
    }
}

/// A dynamic encode failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("encoding failed, {0}")]
pub struct EncodingError(pub Reason);

impl EncodingError {
    pub fn reason(&self) -> &Reason {
        &self.0
    }

    pub fn code(&self) -> ReasonCode {
        self.0.code()
    }
}

impl From<Reason> for EncodingError {
    fn from(reason: Reason) -> Self {
        EncodingError(reason)
    }
}

impl From<EncodingError> for StatusCode {
    fn from(err: EncodingError) -> Self {
        err.0.status_code(StatusCode::BadEncodingError)
    }
}

/// A schema cannot be turned into codecs.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{type_name}: field '{field}' is declared more than once")]
    DuplicateField { type_name: String, field: String },
    #[error("{type_name}: field '{field}' declares both a fixed length and a length field")]
    LengthAndLengthField { type_name: String, field: String },
    #[error("{type_name}: field '{field}' refers to '{sibling}' which is not an earlier field")]
    UnknownSibling {
        type_name: String,
        field: String,
        sibling: String,
    },
    #[error("{type_name}: length field '{length_field}' of '{field}' is not a scalar integer")]
    LengthFieldNotInteger {
        type_name: String,
        field: String,
        length_field: String,
    },
    #[error("{type_name}: bit field '{field}' cannot take its length from another field")]
    BitLengthField { type_name: String, field: String },
    #[error("{type_name}: bit field '{field}' has {length} bits, more than {max}")]
    BitFieldTooLong {
        type_name: String,
        field: String,
        length: u32,
        max: usize,
    },
    #[error("{type_name}: field '{field}' has unknown switch operand '{operand}'")]
    UnknownSwitchOperand {
        type_name: String,
        field: String,
        operand: String,
    },
    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },
    #[error("<{element}> attribute '{attribute}' has invalid value '{value}'")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("type name '{type_name}' uses an undeclared namespace prefix")]
    UnknownPrefix { type_name: String },
    #[error("document is not an opc:TypeDictionary")]
    NotATypeDictionary,
    #[error("malformed schema document, {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("cannot read {}, {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SchemaError {
    /// The reason code of the error, for errors that have one.
    pub fn code(&self) -> Option<ReasonCode> {
        match self {
            SchemaError::UnknownSwitchOperand { .. } => Some(ReasonCode::UnknownSwitchOperand),
            _ => None,
        }
    }
}

impl From<SchemaError> for StatusCode {
    fn from(err: SchemaError) -> Self {
        error!("Schema error {}", err);
        StatusCode::BadConfigurationError
    }
}
