// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Bit level access to a byte stream.
//!
//! Consecutive bit fields pack least significant bit first into bytes. Both the reader and the
//! writer also implement the byte oriented `Read` / `Write` traits so that any non bit field
//! that follows a run of bit fields starts on the next byte boundary, the remainder of a
//! partially used byte being skipped when reading or zero filled when writing.

use std::io::{self, Read, Write};

use crate::types::{constants, encoding::*, StatusCode};

/// Reads bits and bytes from an underlying stream.
pub struct BitReader<'a> {
    stream: &'a mut dyn Read,
    /// The byte bits are currently taken from
    current: u8,
    /// Unread bits remaining in `current`
    remaining: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(stream: &'a mut dyn Read) -> BitReader<'a> {
        BitReader {
            stream,
            current: 0,
            remaining: 0,
        }
    }

    /// Reads `count` bits, the first bit read becoming the least significant bit of the result.
    pub fn read_bits(&mut self, count: usize) -> EncodingResult<u64> {
        if count > constants::MAX_BIT_FIELD_LENGTH {
            error!("Cannot read {} bits into a 64-bit value", count);
            return Err(StatusCode::BadDecodingError);
        }
        let mut result = 0u64;
        let mut done = 0;
        while done < count {
            if self.remaining == 0 {
                self.current = read_u8(&mut *self.stream)?;
                self.remaining = 8;
            }
            let consumed = 8 - self.remaining;
            let take = (count - done).min(self.remaining as usize);
            let bits = (self.current as u64 >> consumed) & ((1u64 << take) - 1);
            result |= bits << done;
            done += take;
            self.remaining -= take as u8;
        }
        Ok(result)
    }

    /// Drops whatever is left of a partially read byte.
    pub fn align(&mut self) {
        self.remaining = 0;
    }
}

impl<'a> Read for BitReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.align();
        self.stream.read(buf)
    }
}

/// Writes bits and bytes to an underlying stream.
pub struct BitWriter<'a> {
    stream: &'a mut dyn Write,
    /// Bits waiting to be written
    current: u8,
    /// Number of bits used in `current`
    used: u8,
    bytes_written: usize,
}

impl<'a> BitWriter<'a> {
    pub fn new(stream: &'a mut dyn Write) -> BitWriter<'a> {
        BitWriter {
            stream,
            current: 0,
            used: 0,
            bytes_written: 0,
        }
    }

    /// Writes the low `count` bits of `value`, least significant bit first.
    pub fn write_bits(&mut self, value: u64, count: usize) -> EncodingResult<()> {
        if count > constants::MAX_BIT_FIELD_LENGTH {
            error!("Cannot write {} bits from a 64-bit value", count);
            return Err(StatusCode::BadEncodingError);
        }
        let mut done = 0;
        while done < count {
            let free = (8 - self.used) as usize;
            let take = (count - done).min(free);
            let bits = ((value >> done) & ((1u64 << take) - 1)) as u8;
            self.current |= bits << self.used;
            self.used += take as u8;
            done += take;
            if self.used == 8 {
                self.flush_bits()?;
            }
        }
        Ok(())
    }

    /// Writes out a partially filled byte, zero padded.
    fn flush_bits(&mut self) -> EncodingResult<()> {
        if self.used > 0 {
            let current = self.current;
            self.current = 0;
            self.used = 0;
            self.bytes_written += write_u8(&mut *self.stream, current)?;
        }
        Ok(())
    }

    /// Flushes pending bits and returns the total number of bytes written.
    pub fn finish(mut self) -> EncodingResult<usize> {
        self.flush_bits()?;
        Ok(self.bytes_written)
    }
}

impl<'a> Write for BitWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.flush_bits()
            .map_err(|status| io::Error::new(io::ErrorKind::Other, status))?;
        let written = self.stream.write(buf)?;
        self.bytes_written += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}
