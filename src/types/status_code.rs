// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! `StatusCode`, reduced to the codes that decoding and encoding report.
#![allow(non_upper_case_globals)]

use std::{
    error::Error,
    fmt,
    io::{Read, Write},
};

use crate::types::encoding::*;

bitflags! {
    /// A status code is a 16-bit code in the upper half and flag bits in the lower half. The
    /// masks cover every bit so that codes this table does not name survive a round trip.
    pub struct StatusCode: u32 {
        const STATUS_MASK = 0xffff_0000;
        const BIT_MASK = 0x0000_ffff;

        const IS_ERROR = 0x8000_0000;
        const IS_UNCERTAIN = 0x4000_0000;
        const OVERFLOW = 0x0000_0080;
        const HISTORICAL_CALCULATED = 0x0000_0001;

        const Good = 0;
        const UncertainLastUsableValue = 0x4090_0000;
        const BadUnexpectedError = 0x8001_0000;
        const BadInternalError = 0x8002_0000;
        const BadEncodingError = 0x8006_0000;
        const BadDecodingError = 0x8007_0000;
        const BadEncodingLimitsExceeded = 0x8008_0000;
        const BadDataTypeIdUnknown = 0x8011_0000;
        const BadNodeIdInvalid = 0x8033_0000;
        const BadNodeIdUnknown = 0x8034_0000;
        const BadDataEncodingUnsupported = 0x8039_0000;
        const BadTypeMismatch = 0x8074_0000;
        const BadConfigurationError = 0x8089_0000;
    }
}

const NAMES: &[(StatusCode, &str)] = &[
    (StatusCode::Good, "Good"),
    (StatusCode::UncertainLastUsableValue, "UncertainLastUsableValue"),
    (StatusCode::BadUnexpectedError, "BadUnexpectedError"),
    (StatusCode::BadInternalError, "BadInternalError"),
    (StatusCode::BadEncodingError, "BadEncodingError"),
    (StatusCode::BadDecodingError, "BadDecodingError"),
    (StatusCode::BadEncodingLimitsExceeded, "BadEncodingLimitsExceeded"),
    (StatusCode::BadDataTypeIdUnknown, "BadDataTypeIdUnknown"),
    (StatusCode::BadNodeIdInvalid, "BadNodeIdInvalid"),
    (StatusCode::BadNodeIdUnknown, "BadNodeIdUnknown"),
    (StatusCode::BadDataEncodingUnsupported, "BadDataEncodingUnsupported"),
    (StatusCode::BadTypeMismatch, "BadTypeMismatch"),
    (StatusCode::BadConfigurationError, "BadConfigurationError"),
];

impl StatusCode {
    /// Name of the code without its flag bits, or `None` for a code this table does not hold.
    pub fn name(&self) -> Option<&'static str> {
        let status = self.status();
        NAMES
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, name)| *name)
    }

    /// The code without its flag bits
    pub fn status(&self) -> StatusCode {
        *self & StatusCode::STATUS_MASK
    }

    /// The flag bits without the code
    pub fn bitflags(&self) -> StatusCode {
        *self & StatusCode::BIT_MASK
    }

    pub fn is_bad(&self) -> bool {
        self.contains(StatusCode::IS_ERROR)
    }

    pub fn is_uncertain(&self) -> bool {
        self.contains(StatusCode::IS_UNCERTAIN)
    }

    pub fn is_good(&self) -> bool {
        !self.intersects(StatusCode::IS_ERROR | StatusCode::IS_UNCERTAIN)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name)?,
            None => write!(f, "{:#010x}", self.status().bits())?,
        }
        let flags = self.bitflags();
        if !flags.is_empty() {
            write!(f, "+{:#06x}", flags.bits())?;
        }
        Ok(())
    }
}

impl Error for StatusCode {}

impl BinaryEncoder<StatusCode> for StatusCode {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_u32(stream, self.bits())
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        // Every bit is covered by the masks so nothing is truncated
        Ok(StatusCode::from_bits_truncate(read_u32(stream)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity() {
        assert!(StatusCode::Good.is_good());
        assert!(StatusCode::UncertainLastUsableValue.is_uncertain());
        assert!(!StatusCode::UncertainLastUsableValue.is_good());
        assert!(StatusCode::BadDecodingError.is_bad());
        assert!(!StatusCode::BadDecodingError.is_uncertain());

        let flagged = StatusCode::BadDecodingError | StatusCode::HISTORICAL_CALCULATED;
        assert_eq!(flagged.status(), StatusCode::BadDecodingError);
        assert_eq!(flagged.bitflags(), StatusCode::HISTORICAL_CALCULATED);
    }

    #[test]
    fn display() {
        assert_eq!(StatusCode::BadDecodingError.to_string(), "BadDecodingError");
        assert_eq!(
            (StatusCode::BadEncodingError | StatusCode::OVERFLOW).to_string(),
            "BadEncodingError+0x0080"
        );
        assert_eq!(
            StatusCode::from_bits_truncate(0x80ab_0000).to_string(),
            "0x80ab0000"
        );
    }
}
