//! Big-endian primitive writers.

use crate::error::{HazelcastError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Writes primitive values in the member wire format.
///
/// All multi-byte values are written big-endian.
pub trait DataOutput {
    /// Writes a single signed byte.
    fn write_byte(&mut self, v: i8) -> Result<()>;

    /// Writes a boolean as one byte (0 or 1).
    fn write_bool(&mut self, v: bool) -> Result<()>;

    /// Writes a 16-bit signed integer.
    fn write_short(&mut self, v: i16) -> Result<()>;

    /// Writes a 32-bit signed integer.
    fn write_int(&mut self, v: i32) -> Result<()>;

    /// Writes a 64-bit signed integer.
    fn write_long(&mut self, v: i64) -> Result<()>;

    /// Writes a 32-bit float.
    fn write_float(&mut self, v: f32) -> Result<()>;

    /// Writes a 64-bit float.
    fn write_double(&mut self, v: f64) -> Result<()>;

    /// Writes raw bytes without a length prefix.
    fn write_bytes(&mut self, v: &[u8]) -> Result<()>;

    /// Writes a length prefix. Lengths beyond `i32::MAX` cannot be framed.
    fn write_length(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| {
            HazelcastError::Serialization(format!("length {} exceeds i32::MAX", len))
        })?;
        self.write_int(len)
    }

    /// Writes a string as an `i32` byte length followed by its UTF-8 bytes.
    fn write_string(&mut self, v: &str) -> Result<()> {
        let bytes = v.as_bytes();
        self.write_length(bytes.len())?;
        self.write_bytes(bytes)
    }
}

/// A growable buffer implementing [`DataOutput`].
#[derive(Debug)]
pub struct ObjectDataOutput {
    buffer: BytesMut,
}

impl ObjectDataOutput {
    /// Creates an output with a small default capacity.
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Creates an output able to hold `capacity` bytes without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the output, returning the bytes as a vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    /// Consumes the output without copying.
    pub fn freeze(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the allocated capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for ObjectDataOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl DataOutput for ObjectDataOutput {
    fn write_byte(&mut self, v: i8) -> Result<()> {
        self.buffer.put_i8(v);
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.buffer.put_u8(u8::from(v));
        Ok(())
    }

    fn write_short(&mut self, v: i16) -> Result<()> {
        self.buffer.put_i16(v);
        Ok(())
    }

    fn write_int(&mut self, v: i32) -> Result<()> {
        self.buffer.put_i32(v);
        Ok(())
    }

    fn write_long(&mut self, v: i64) -> Result<()> {
        self.buffer.put_i64(v);
        Ok(())
    }

    fn write_float(&mut self, v: f32) -> Result<()> {
        self.buffer.put_f32(v);
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<()> {
        self.buffer.put_f64(v);
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.buffer.put_slice(v);
        Ok(())
    }
}

/// A [`DataOutput`] that discards values and only counts bytes.
///
/// Running an encoder against a counter yields the exact length the same
/// encoder produces against a real buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ByteCounter {
    count: usize,
}

impl ByteCounter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bytes counted so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl DataOutput for ByteCounter {
    fn write_byte(&mut self, _v: i8) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn write_bool(&mut self, _v: bool) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn write_short(&mut self, _v: i16) -> Result<()> {
        self.count += 2;
        Ok(())
    }

    fn write_int(&mut self, _v: i32) -> Result<()> {
        self.count += 4;
        Ok(())
    }

    fn write_long(&mut self, _v: i64) -> Result<()> {
        self.count += 8;
        Ok(())
    }

    fn write_float(&mut self, _v: f32) -> Result<()> {
        self.count += 4;
        Ok(())
    }

    fn write_double(&mut self, _v: f64) -> Result<()> {
        self.count += 8;
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.count += v.len();
        Ok(())
    }
}
