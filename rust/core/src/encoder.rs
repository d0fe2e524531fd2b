// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model stream encoder
//!
//! Produces streams in the layout [`ModelStreamDecoder`](crate::ModelStreamDecoder)
//! reads. Used for fixtures and tooling; the production stream comes from
//! the model server.

use crate::error::{Error, Result};
use crate::stream::{message_type, GeometryData, ObjectData, FORMAT_VERSION, STREAM_MAGIC};

/// Byte-level stream writer.
#[derive(Debug, Default, Clone)]
pub struct StreamEncoder {
    buf: Vec<u8>,
}

impl StreamEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the encoded bytes
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    // ---------------------------------------------------------------- primitives

    pub fn write_byte(&mut self, value: i8) {
        self.buf.push(value as u8);
    }

    pub fn write_int(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_float(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a full 8-byte little-endian long slot.
    pub fn write_long(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a string with a big-endian `i16` length prefix.
    ///
    /// Strings longer than `i16::MAX` bytes cannot be represented.
    pub fn write_utf8(&mut self, value: &str) -> Result<()> {
        let length = i16::try_from(value.len()).map_err(|_| {
            Error::format(
                self.buf.len(),
                format!("string of {} bytes exceeds i16 length prefix", value.len()),
            )
        })?;
        self.buf.extend_from_slice(&length.to_be_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Zero-pad to the next 4-byte boundary.
    pub fn align4(&mut self) {
        let rem = self.buf.len() % 4;
        if rem != 0 {
            self.buf.resize(self.buf.len() + 4 - rem, 0);
        }
    }

    pub fn write_float_array(&mut self, values: &[f32]) {
        for &v in values {
            self.write_float(v);
        }
    }

    pub fn write_int_array(&mut self, values: &[i32]) {
        for &v in values {
            self.write_int(v);
        }
    }

    /// Write an element count followed by the elements.
    pub fn write_counted_floats(&mut self, values: &[f32]) {
        self.write_int(values.len() as i32);
        self.write_float_array(values);
    }

    pub fn write_counted_ints(&mut self, values: &[i32]) {
        self.write_int(values.len() as i32);
        self.write_int_array(values);
    }

    // ---------------------------------------------------------------- messages

    pub fn write_start(&mut self, model_bounds: &[f32; 6]) {
        self.write_byte(message_type::START);
        self.buf.extend_from_slice(&(STREAM_MAGIC.len() as i16).to_be_bytes());
        self.buf.extend_from_slice(STREAM_MAGIC.as_bytes());
        self.write_byte(FORMAT_VERSION);
        self.align4();
        self.write_float_array(model_bounds);
    }

    pub fn write_geometry(&mut self, geometry: &GeometryData<'_>) {
        self.write_byte(message_type::GEOMETRY);
        self.align4();
        self.write_long(geometry.geometry_id as i64);
        self.write_counted_floats(&geometry.positions);
        self.write_counted_floats(&geometry.normals);
        self.write_counted_floats(&geometry.colors);
        self.write_counted_ints(&geometry.indices);
    }

    pub fn write_object(&mut self, object: &ObjectData) -> Result<()> {
        self.write_byte(message_type::OBJECT);
        self.write_utf8(&object.type_tag)?;
        self.align4();
        self.write_long(object.oid as i64);
        self.write_long(object.roid as i64);
        self.write_long(object.geometry_id as i64);
        self.write_float_array(&object.matrix);
        self.write_float_array(&object.bounds);
        Ok(())
    }

    pub fn write_end(&mut self) {
        self.write_byte(message_type::END);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_pads_with_zeros() {
        let mut enc = StreamEncoder::new();
        enc.write_byte(7);
        enc.align4();
        assert_eq!(enc.finish(), vec![7, 0, 0, 0]);
    }

    #[test]
    fn test_utf8_prefix_big_endian() {
        let mut enc = StreamEncoder::new();
        enc.write_utf8("abc").unwrap();
        assert_eq!(enc.finish(), vec![0x00, 0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn test_oversized_string_rejected() {
        let mut enc = StreamEncoder::new();
        let long = "x".repeat(i16::MAX as usize + 1);
        assert!(matches!(
            enc.write_utf8(&long),
            Err(Error::FormatMismatch { .. })
        ));
        assert!(enc.is_empty());
    }

    #[test]
    fn test_start_layout() {
        let mut enc = StreamEncoder::new();
        enc.write_start(&[0.0; 6]);
        // type + prefix + magic + version + 1 pad + 6 floats
        assert_eq!(enc.len(), 8 + 24);
    }
}
