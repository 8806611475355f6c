mod encoding;

use std::{fmt::Debug, io::Cursor};

use crate::types::*;

/// Encodes the value, checking the reported size against `byte_len`.
pub fn serialize_as_stream<T>(value: &T) -> Cursor<Vec<u8>>
where
    T: BinaryEncoder<T> + Debug,
{
    let byte_len = value.byte_len();
    let mut stream = Cursor::new(Vec::with_capacity(byte_len));
    let size = value.encode(&mut stream).unwrap();
    assert_eq!(size, byte_len, "encoded size of {:?}", value);
    assert_eq!(stream.position() as usize, byte_len);
    stream.set_position(0);
    stream
}

/// Encodes then decodes the value, expecting it back unchanged.
pub fn serialize_test<T>(value: T)
where
    T: BinaryEncoder<T> + Debug + PartialEq,
{
    let mut stream = serialize_as_stream(&value);
    let decoded = T::decode(&mut stream, &DecodingOptions::test()).unwrap();
    assert_eq!(decoded, value);
}

/// Encodes the value and compares the bytes with `expected`, then decodes them back.
pub fn serialize_and_compare<T>(value: T, expected: &[u8])
where
    T: BinaryEncoder<T> + Debug + PartialEq,
{
    let stream = serialize_as_stream(&value);
    assert_eq!(stream.get_ref().as_slice(), expected);
    serialize_test(value);
}
