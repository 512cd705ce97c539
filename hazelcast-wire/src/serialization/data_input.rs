//! Big-endian primitive reader over a borrowed byte slice.

use crate::error::{HazelcastError, Result};
use bytes::Buf;

/// Reads primitive values in the member wire format.
///
/// All multi-byte values are big-endian. Every read checks the remaining
/// length first, so truncated input surfaces as a
/// [`HazelcastError::Serialization`] instead of a panic.
pub trait DataInput {
    /// Reads a single signed byte.
    fn read_byte(&mut self) -> Result<i8>;

    /// Reads a boolean stored as one byte; any non-zero value is `true`.
    fn read_bool(&mut self) -> Result<bool>;

    /// Reads a 16-bit signed integer.
    fn read_short(&mut self) -> Result<i16>;

    /// Reads a 32-bit signed integer.
    fn read_int(&mut self) -> Result<i32>;

    /// Reads a 64-bit signed integer.
    fn read_long(&mut self) -> Result<i64>;

    /// Reads a 32-bit float.
    fn read_float(&mut self) -> Result<f32>;

    /// Reads a 64-bit float.
    fn read_double(&mut self) -> Result<f64>;

    /// Reads exactly `len` raw bytes.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Advances past `len` bytes without copying them.
    fn skip_bytes(&mut self, len: usize) -> Result<()>;

    /// Reads an `i32` length prefix and rejects negative values.
    fn read_length(&mut self) -> Result<usize> {
        let len = self.read_int()?;
        usize::try_from(len)
            .map_err(|_| HazelcastError::Serialization(format!("negative length: {}", len)))
    }

    /// Reads a length-prefixed UTF-8 string.
    fn read_string(&mut self) -> Result<String> {
        let len = self.read_length()?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|e| HazelcastError::Serialization(format!("invalid UTF-8 string: {}", e)))
    }
}

/// A slice-backed [`DataInput`].
#[derive(Debug, Clone)]
pub struct ObjectDataInput<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ObjectDataInput<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns the number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(HazelcastError::Serialization(format!(
                "insufficient data: need {} bytes, have {}",
                n,
                self.remaining()
            )));
        }
        let chunk = &self.data[self.position..self.position + n];
        self.position += n;
        Ok(chunk)
    }
}

impl DataInput for ObjectDataInput<'_> {
    fn read_byte(&mut self) -> Result<i8> {
        Ok(self.take(1)?.get_i8())
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.take(1)?.get_u8() != 0)
    }

    fn read_short(&mut self) -> Result<i16> {
        Ok(self.take(2)?.get_i16())
    }

    fn read_int(&mut self) -> Result<i32> {
        Ok(self.take(4)?.get_i32())
    }

    fn read_long(&mut self) -> Result<i64> {
        Ok(self.take(8)?.get_i64())
    }

    fn read_float(&mut self) -> Result<f32> {
        Ok(self.take(4)?.get_f32())
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(self.take(8)?.get_f64())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }

    fn skip_bytes(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }
}
