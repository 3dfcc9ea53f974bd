//! Script integers: little-endian sign-magnitude with minimal encoding

use crate::error::{Result, ScriptError};
use crate::types::ByteString;

/// Longest byte string an operand consumed as a number may have.
pub const MAX_NUMBER_SIZE: usize = 4;

/// Bounded signed integer used by the numeric opcodes.
///
/// The wire form stores the magnitude little-endian with the sign in the
/// high bit of the most significant byte; zero is the empty string. Decoding
/// caps the operand at four bytes, so every representable value fits an
/// `i64` with room to spare for intermediate arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScriptNum(i64);

impl ScriptNum {
    pub const ZERO: ScriptNum = ScriptNum(0);

    pub fn new(value: i64) -> Self {
        ScriptNum(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Decode a stack item consumed as a number. Items longer than four
    /// bytes are rejected outright.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_NUMBER_SIZE {
            return Err(ScriptError::NumericOverflow);
        }
        let last = match bytes.last() {
            Some(&last) => last,
            None => return Ok(ScriptNum::ZERO),
        };
        let mut magnitude: i64 = 0;
        for (index, &byte) in bytes.iter().enumerate() {
            let byte = if index == bytes.len() - 1 {
                byte & 0x7f
            } else {
                byte
            };
            magnitude |= i64::from(byte) << (8 * index);
        }
        if last & 0x80 != 0 {
            Ok(ScriptNum(-magnitude))
        } else {
            Ok(ScriptNum(magnitude))
        }
    }

    /// Minimal-length encoding; zero becomes the empty string. When the
    /// magnitude's top byte already uses the high bit, a sign byte is
    /// appended rather than widening the magnitude.
    pub fn to_bytes(self) -> ByteString {
        if self.0 == 0 {
            return ByteString::new();
        }
        let negative = self.0 < 0;
        let mut magnitude = self.0.unsigned_abs();
        let mut bytes = ByteString::with_capacity(5);
        while magnitude > 0 {
            bytes.push((magnitude & 0xff) as u8);
            magnitude >>= 8;
        }
        if bytes[bytes.len() - 1] & 0x80 != 0 {
            bytes.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            let top = bytes.len() - 1;
            bytes[top] |= 0x80;
        }
        bytes
    }
}

impl From<i64> for ScriptNum {
    fn from(value: i64) -> Self {
        ScriptNum(value)
    }
}

impl From<bool> for ScriptNum {
    fn from(value: bool) -> Self {
        ScriptNum(i64::from(value))
    }
}

/// Boolean reading of a stack item: true iff any byte is non-zero, except
/// that negative zero (a lone sign bit in the last byte) reads as false.
pub fn cast_to_bool(bytes: &[u8]) -> bool {
    for (index, &byte) in bytes.iter().enumerate() {
        if byte != 0 {
            if index == bytes.len() - 1 && byte == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}
