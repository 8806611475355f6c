// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! `DateTime`, kept in wire form as 100 nanosecond ticks since 1601-01-01 UTC.

use std::{
    fmt,
    io::{Read, Write},
};

use chrono::{TimeZone, Utc};

use crate::types::encoding::*;

const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;
/// Seconds from 1601-01-01 to 1970-01-01
const UNIX_EPOCH_SECONDS: i64 = 11_644_473_600;

/// Ticks are kept as they were read so that every value, including ones chrono cannot
/// represent, encodes back to the same bytes.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash, Default)]
pub struct DateTime {
    ticks: i64,
}

impl DateTime {
    pub fn now() -> DateTime {
        DateTime::from(Utc::now())
    }

    /// The null date time, 1601-01-01
    pub fn null() -> DateTime {
        DateTime { ticks: 0 }
    }

    pub fn is_null(&self) -> bool {
        self.ticks == 0
    }

    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    pub fn as_chrono(&self) -> Option<chrono::DateTime<Utc>> {
        let seconds = self.ticks.div_euclid(TICKS_PER_SECOND) - UNIX_EPOCH_SECONDS;
        let nanos = self.ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
        Utc.timestamp_opt(seconds, nanos as u32).single()
    }
}

impl From<i64> for DateTime {
    fn from(ticks: i64) -> Self {
        DateTime { ticks }
    }
}

impl From<chrono::DateTime<Utc>> for DateTime {
    fn from(value: chrono::DateTime<Utc>) -> Self {
        let seconds = value.timestamp().saturating_add(UNIX_EPOCH_SECONDS);
        let ticks = seconds
            .saturating_mul(TICKS_PER_SECOND)
            .saturating_add(i64::from(value.timestamp_subsec_nanos()) / NANOS_PER_TICK);
        DateTime { ticks }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_chrono() {
            Some(value) => f.write_str(&value.to_rfc3339()),
            None => write!(f, "{} ticks", self.ticks),
        }
    }
}

impl BinaryEncoder<DateTime> for DateTime {
    fn byte_len(&self) -> usize {
        8
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_i64(stream, self.ticks)
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        read_i64(stream).map(DateTime::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_epoch() {
        let epoch = Utc.timestamp_opt(0, 0).single().unwrap();
        let value = DateTime::from(epoch);
        assert_eq!(value.ticks(), 116_444_736_000_000_000);
        assert_eq!(value.as_chrono(), Some(epoch));
        assert_eq!(value.to_string(), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn unrepresentable_ticks_survive() {
        let value = DateTime::from(i64::MAX);
        assert_eq!(value.encode_to_vec(), i64::MAX.to_le_bytes().to_vec());
        assert!(DateTime::null().is_null());
        assert!(!DateTime::now().is_null());
    }
}
