// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte cursor - forward-only typed reads over a borrowed buffer
//!
//! All multi-byte scalars are little-endian, with one exception: the length
//! prefix of a UTF-8 string is a big-endian `i16`. That asymmetry is part of
//! the wire format and must be kept.

use std::borrow::Cow;

use bytemuck::Pod;

use crate::error::{Error, Result};

/// Forward-only reader over a byte slice.
///
/// The cursor never copies the buffer. A failed read returns
/// [`Error::OutOfBounds`] and leaves the position where it was, so
/// `position <= len` holds at all times.
///
/// # Example
///
/// ```
/// use bimview_core::ByteCursor;
///
/// let data = [0x2a, 0x00, 0x00, 0x00];
/// let mut cursor = ByteCursor::new(&data);
///
/// assert_eq!(cursor.read_int().unwrap(), 42);
/// assert_eq!(cursor.position(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `buffer`
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Current read offset
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total buffer length
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the underlying buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes left to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Borrow `n` bytes and advance past them.
    #[inline]
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(n)
            .filter(|&end| end <= self.buffer.len())
            .ok_or(Error::OutOfBounds {
                position: self.position,
                requested: n,
                len: self.buffer.len(),
            })?;
        let bytes = &self.buffer[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    #[inline]
    fn take4(&mut self) -> Result<[u8; 4]> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// Read a signed byte
    #[inline]
    pub fn read_byte(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    /// Read a little-endian `i32`
    #[inline]
    pub fn read_int(&mut self) -> Result<i32> {
        self.take4().map(i32::from_le_bytes)
    }

    /// Read a little-endian IEEE-754 `f32`
    #[inline]
    pub fn read_float(&mut self) -> Result<f32> {
        self.take4().map(f32::from_le_bytes)
    }

    /// Read an 8-byte "long" slot.
    ///
    /// Only the low 32 bits are returned; the high word is skipped without
    /// being decoded. The cursor always advances by exactly 8.
    #[inline]
    pub fn read_long(&mut self) -> Result<i32> {
        let b = self.take(8)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a string with a big-endian `i16` length prefix.
    pub fn read_utf8(&mut self) -> Result<String> {
        let start = self.position;
        let result = self.read_utf8_inner();
        if result.is_err() {
            self.position = start;
        }
        result
    }

    fn read_utf8_inner(&mut self) -> Result<String> {
        let start = self.position;
        let prefix = self.take(2)?;
        let length = i16::from_be_bytes([prefix[0], prefix[1]]);
        if length < 0 {
            return Err(Error::format(
                start,
                format!("negative string length {}", length),
            ));
        }
        let bytes = self.take(length as usize)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| Error::InvalidUtf8 { position: start + 2 })
    }

    /// Skip padding up to the next 4-byte boundary.
    ///
    /// An already aligned position is left untouched, so calling this twice
    /// in a row never advances the second time.
    pub fn align4(&mut self) -> Result<()> {
        let skip = 4 - (self.position % 4);
        if skip > 0 && skip != 4 {
            self.take(skip)?;
        }
        Ok(())
    }

    /// Read an `i32` element count for a following array.
    pub fn read_count(&mut self) -> Result<usize> {
        let start = self.position;
        let count = self.read_int()?;
        if count < 0 {
            self.position = start;
            return Err(Error::format(start, format!("negative element count {}", count)));
        }
        Ok(count as usize)
    }

    /// Read `length` little-endian `f32` values.
    ///
    /// Borrows straight from the buffer when the platform byte order and the
    /// slice alignment allow it, otherwise copies.
    pub fn read_float_array(&mut self, length: usize) -> Result<Cow<'a, [f32]>> {
        self.read_array(length, f32::from_le_bytes)
    }

    /// Read `length` little-endian `i32` values.
    pub fn read_int_array(&mut self, length: usize) -> Result<Cow<'a, [i32]>> {
        self.read_array(length, i32::from_le_bytes)
    }

    /// Read exactly `N` little-endian `f32` values into a fixed array.
    pub fn read_floats<const N: usize>(&mut self) -> Result<[f32; N]> {
        let bytes = self.take(N * 4)?;
        let mut out = [0.0f32; N];
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(out)
    }

    fn read_array<T: Pod>(
        &mut self,
        length: usize,
        decode: fn([u8; 4]) -> T,
    ) -> Result<Cow<'a, [T]>> {
        let byte_len = length.checked_mul(4).ok_or_else(|| {
            Error::format(self.position, format!("array length {} overflows", length))
        })?;
        let bytes = self.take(byte_len)?;

        if cfg!(target_endian = "little") {
            if let Ok(slice) = bytemuck::try_cast_slice::<u8, T>(bytes) {
                return Ok(Cow::Borrowed(slice));
            }
        }

        Ok(Cow::Owned(
            bytes
                .chunks_exact(4)
                .map(|c| decode([c[0], c[1], c[2], c[3]]))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_scalars() {
        let mut data = Vec::new();
        data.push(0xfeu8);
        data.extend_from_slice(&(-7i32).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_byte().unwrap(), -2);
        assert_eq!(cursor.read_int().unwrap(), -7);
        assert_eq!(cursor.read_float().unwrap(), 1.5);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_align4_skips() {
        let data = [0u8; 8];
        for (start, expected_skip) in [(0, 0), (1, 3), (2, 2), (3, 1), (4, 0)] {
            let mut cursor = ByteCursor::new(&data);
            cursor.take(start).unwrap();
            cursor.align4().unwrap();
            assert_eq!(cursor.position() - start, expected_skip, "start {}", start);

            let aligned = cursor.position();
            cursor.align4().unwrap();
            assert_eq!(cursor.position(), aligned);
        }
    }

    #[test]
    fn test_align4_past_end() {
        let data = [0u8; 2];
        let mut cursor = ByteCursor::new(&data);
        cursor.read_byte().unwrap();
        assert!(matches!(cursor.align4(), Err(Error::OutOfBounds { .. })));
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_read_long_discards_high_word() {
        let mut data = Vec::new();
        data.extend_from_slice(&123i32.to_le_bytes());
        data.extend_from_slice(&[0xff, 0xff, 0xff, 0x7f]);
        data.extend_from_slice(&(-9i64).to_le_bytes());

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_long().unwrap(), 123);
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.read_long().unwrap(), -9);
        assert_eq!(cursor.position(), 16);
    }

    #[test]
    fn test_utf8_length_is_big_endian() {
        let mut data = vec![0x00, 0x03];
        data.extend_from_slice(b"BGS");
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_utf8().unwrap(), "BGS");
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_utf8_multibyte() {
        let text = "Wand \u{2013} Süd";
        let mut data = (text.len() as i16).to_be_bytes().to_vec();
        data.extend_from_slice(text.as_bytes());
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_utf8().unwrap(), text);
    }

    #[test]
    fn test_utf8_truncated_keeps_position() {
        let data = [0x00, 0x05, b'a', b'b'];
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(cursor.read_utf8(), Err(Error::OutOfBounds { .. })));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_utf8_invalid_bytes() {
        let data = [0x00, 0x02, 0xc3, 0x28];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_utf8(), Err(Error::InvalidUtf8 { position: 2 }));
    }

    #[test]
    fn test_negative_utf8_length() {
        let data = [0xff, 0xff];
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_utf8(),
            Err(Error::FormatMismatch { position: 0, .. })
        ));
    }

    #[test]
    fn test_out_of_bounds() {
        let data = [1u8, 2, 3];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            cursor.read_int(),
            Err(Error::OutOfBounds {
                position: 0,
                requested: 4,
                len: 3
            })
        );
        assert_eq!(cursor.position(), 0);
        assert!(cursor.read_long().is_err());
        assert_eq!(cursor.read_byte().unwrap(), 1);
    }

    #[test]
    fn test_read_arrays() {
        let floats = [0.25f32, -3.0, f32::MAX];
        let ints = [1i32, -2, i32::MIN];
        let mut data = Vec::new();
        for f in floats {
            data.extend_from_slice(&f.to_le_bytes());
        }
        for i in ints {
            data.extend_from_slice(&i.to_le_bytes());
        }

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(&*cursor.read_float_array(3).unwrap(), &floats);
        assert_eq!(&*cursor.read_int_array(3).unwrap(), &ints);
        assert_eq!(cursor.position(), 24);
    }

    #[test]
    fn test_unaligned_array_still_decodes() {
        // One leading byte puts the array off any 4-byte memory boundary.
        let mut data = vec![0u8];
        data.extend_from_slice(&2.0f32.to_le_bytes());
        data.extend_from_slice(&4.0f32.to_le_bytes());

        let mut cursor = ByteCursor::new(&data);
        cursor.read_byte().unwrap();
        assert_eq!(&*cursor.read_float_array(2).unwrap(), &[2.0, 4.0]);
    }

    #[test]
    fn test_negative_count() {
        let data = (-1i32).to_le_bytes();
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_count(),
            Err(Error::FormatMismatch { .. })
        ));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_empty_array() {
        let data: [u8; 0] = [];
        let mut cursor = ByteCursor::new(&data);
        assert!(cursor.read_float_array(0).unwrap().is_empty());
        assert!(cursor.is_empty());
    }
}
