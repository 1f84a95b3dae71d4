//! Binary reader for pointer-resolving parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor over one contiguous buffer.
//! Every "pointer" stored in an asset file is a byte offset into that buffer, so
//! the reader offers both sequential reads and reads at an absolute offset.
//!
//! An offset read seeks first and then reads, leaving the position at
//! `offset + size`. It does not restore the previous position.

use byteorder::{ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// Convert an on-disk pointer into a buffer offset.
///
/// Negative values can never address the buffer and are rejected here, before
/// any read is attempted.
#[inline]
pub fn pointer(value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::InvalidPointer(value))
}

/// A binary reader over a byte slice.
///
/// # Example
///
/// ```
/// use revault_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32_at(0).unwrap(), 0x04030201);
/// assert_eq!(reader.position(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a new reader starting at a specific position.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// The whole underlying buffer.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Seek to `offset` and check that `count` elements of `stride` bytes
    /// follow it, without reading them.
    pub fn ensure_span(&mut self, offset: usize, stride: usize, count: usize) -> Result<()> {
        self.seek(offset);
        let needed = stride.saturating_mul(count);
        if self.remaining() < needed {
            return Err(Error::UnexpectedEof {
                offset,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Advance the position by a number of bytes.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                offset: self.position,
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    /// Read a little-endian i16.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_bytes(2).map(LittleEndian::read_i16)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_bytes(8).map(LittleEndian::read_u64)
    }

    /// Read a little-endian i64.
    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_bytes(8).map(LittleEndian::read_i64)
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4).map(LittleEndian::read_f32)
    }

    /// Read a null-terminated 8-bit string.
    pub fn read_cstring(&mut self) -> Result<&'a str> {
        let remaining = self.remaining_bytes();
        let null_pos = memchr::memchr(0, remaining).ok_or(Error::MissingNullTerminator)?;

        let string_bytes = &remaining[..null_pos];
        self.position += null_pos + 1;

        std::str::from_utf8(string_bytes).map_err(Error::Utf8)
    }

    /// Read a null-terminated string of little-endian UTF-16 code units.
    pub fn read_utf16_cstring(&mut self) -> Result<String> {
        let mut units = Vec::new();
        loop {
            if self.remaining() < 2 {
                return Err(Error::MissingNullTerminator);
            }
            match self.read_u16()? {
                0 => break,
                unit => units.push(unit),
            }
        }
        Ok(String::from_utf16(&units)?)
    }

    /// Read a struct using zerocopy.
    ///
    /// On-disk structs are `#[repr(C, packed)]` and read in host byte order,
    /// which matches the file format on little-endian targets.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let offset = self.position;
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            offset,
            needed: size,
            available: bytes.len(),
        })
    }

    /// Read `count` consecutive structs.
    pub fn read_array<T: FromBytes>(&mut self, count: usize) -> Result<Vec<T>> {
        let size = std::mem::size_of::<T>();
        let total = count.checked_mul(size).ok_or(Error::UnexpectedEof {
            offset: self.position,
            needed: usize::MAX,
            available: self.remaining(),
        })?;

        // Bounds are checked once up front so a bogus count cannot
        // trigger a huge allocation.
        self.peek_bytes(total)?;

        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            result.push(self.read_struct()?);
        }
        Ok(result)
    }

    /// Read a struct at an absolute offset.
    #[inline]
    pub fn read_struct_at<T: FromBytes>(&mut self, offset: usize) -> Result<T> {
        self.seek(offset);
        self.read_struct()
    }

    /// Read `count` consecutive structs at an absolute offset.
    #[inline]
    pub fn read_array_at<T: FromBytes>(&mut self, offset: usize, count: usize) -> Result<Vec<T>> {
        self.seek(offset);
        self.read_array(count)
    }

    /// Read a little-endian u16 at an absolute offset.
    #[inline]
    pub fn read_u16_at(&mut self, offset: usize) -> Result<u16> {
        self.seek(offset);
        self.read_u16()
    }

    /// Read a little-endian u32 at an absolute offset.
    #[inline]
    pub fn read_u32_at(&mut self, offset: usize) -> Result<u32> {
        self.seek(offset);
        self.read_u32()
    }

    /// Read a little-endian i64 at an absolute offset.
    #[inline]
    pub fn read_i64_at(&mut self, offset: usize) -> Result<i64> {
        self.seek(offset);
        self.read_i64()
    }

    /// Read a null-terminated 8-bit string at an absolute offset.
    #[inline]
    pub fn read_cstring_at(&mut self, offset: usize) -> Result<&'a str> {
        self.seek(offset);
        self.read_cstring()
    }

    /// Read a null-terminated UTF-16 string at an absolute offset.
    #[inline]
    pub fn read_utf16_cstring_at(&mut self, offset: usize) -> Result<String> {
        self.seek(offset);
        self.read_utf16_cstring()
    }
}
