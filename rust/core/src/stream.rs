// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model stream decoder
//!
//! Decodes the binary geometry stream message by message. The stream has no
//! self-describing field tags, so field order and alignment here must match
//! the producer exactly.
//!
//! ```text
//! Start     i8 0 | utf8 "BGS" | i8 version | align4 | f32[6] bounds
//! Geometry  i8 1 | align4 | long id | i32 n f32[n] positions | i32 n f32[n] normals
//!                                   | i32 n f32[n] colors    | i32 n i32[n] indices
//! Object    i8 5 | utf8 type | align4 | long oid | long roid | long geometry id
//!                | f32[16] matrix | f32[6] bounds
//! End       i8 6
//! ```

use std::borrow::Cow;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

/// Magic string at the start of every stream
pub const STREAM_MAGIC: &str = "BGS";

/// Stream format version this decoder reads
pub const FORMAT_VERSION: i8 = 10;

/// Message type codes
pub mod message_type {
    pub const START: i8 = 0;
    pub const GEOMETRY: i8 = 1;
    pub const OBJECT: i8 = 5;
    pub const END: i8 = 6;
}

/// Axis-aligned bounds as stored on the wire: min xyz, then max xyz
pub type WireBounds = [f32; 6];

/// Stream header
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StreamHeader {
    pub version: i8,
    pub model_bounds: WireBounds,
}

/// Geometry buffers for one geometry id
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeometryData<'a> {
    pub geometry_id: i32,
    /// Vertex positions (x, y, z)
    pub positions: Cow<'a, [f32]>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Cow<'a, [f32]>,
    /// Vertex colors (r, g, b, a)
    pub colors: Cow<'a, [f32]>,
    /// Triangle indices
    pub indices: Cow<'a, [i32]>,
}

impl GeometryData<'_> {
    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Detach from the source buffer
    pub fn into_owned(self) -> GeometryData<'static> {
        GeometryData {
            geometry_id: self.geometry_id,
            positions: Cow::Owned(self.positions.into_owned()),
            normals: Cow::Owned(self.normals.into_owned()),
            colors: Cow::Owned(self.colors.into_owned()),
            indices: Cow::Owned(self.indices.into_owned()),
        }
    }
}

/// Placement of one model object
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ObjectData {
    /// Semantic type tag (e.g. "IfcWall")
    pub type_tag: String,
    pub oid: i32,
    /// Revision the object belongs to
    pub roid: i32,
    pub geometry_id: i32,
    /// Column-major 4x4 transform
    pub matrix: [f32; 16],
    pub bounds: WireBounds,
}

impl ObjectData {
    /// Registry key for this object
    pub fn object_id(&self) -> String {
        self.oid.to_string()
    }
}

/// One decoded message
#[derive(Debug, Clone, PartialEq)]
pub enum Message<'a> {
    Start(StreamHeader),
    Geometry(GeometryData<'a>),
    Object(ObjectData),
    End,
}

/// Fully decoded stream
#[derive(Debug, Clone, Default)]
pub struct DecodedModel<'a> {
    pub header: Option<StreamHeader>,
    pub geometries: Vec<GeometryData<'a>>,
    pub objects: Vec<ObjectData>,
}

/// Where the decoder is in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectStart,
    Body,
    Finished,
}

/// Message-at-a-time decoder over a borrowed buffer.
///
/// # Example
///
/// ```rust,ignore
/// let mut decoder = ModelStreamDecoder::new(&bytes);
/// while let Some(message) = decoder.next_message()? {
///     match message {
///         Message::Geometry(g) => {
///             println!("geometry {}: {} triangles", g.geometry_id, g.triangle_count())
///         }
///         Message::Object(o) => println!("object {} ({})", o.oid, o.type_tag),
///         _ => {}
///     }
/// }
/// ```
pub struct ModelStreamDecoder<'a> {
    cursor: ByteCursor<'a>,
    state: State,
}

impl<'a> ModelStreamDecoder<'a> {
    /// Create decoder
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(buffer),
            state: State::ExpectStart,
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Whether the end message was reached or decoding failed
    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    /// Decode the next message.
    ///
    /// Returns `Ok(None)` once the end message has been consumed. Any error
    /// finishes the decoder; later calls return `Ok(None)`.
    pub fn next_message(&mut self) -> Result<Option<Message<'a>>> {
        if self.state == State::Finished {
            return Ok(None);
        }

        match self.decode_message() {
            Ok(message) => {
                match message {
                    Message::Start(_) => self.state = State::Body,
                    Message::End => self.state = State::Finished,
                    _ => {}
                }
                Ok(Some(message))
            }
            Err(e) => {
                tracing::debug!(
                    position = self.cursor.position(),
                    error = %e,
                    "Stream decode failed"
                );
                self.state = State::Finished;
                Err(e)
            }
        }
    }

    /// Decode every remaining message into a [`DecodedModel`].
    pub fn decode_all(mut self) -> Result<DecodedModel<'a>> {
        let mut model = DecodedModel::default();
        while let Some(message) = self.next_message()? {
            match message {
                Message::Start(header) => model.header = Some(header),
                Message::Geometry(geometry) => model.geometries.push(geometry),
                Message::Object(object) => model.objects.push(object),
                Message::End => {}
            }
        }
        tracing::debug!(
            geometries = model.geometries.len(),
            objects = model.objects.len(),
            "Decoded model stream"
        );
        Ok(model)
    }

    fn decode_message(&mut self) -> Result<Message<'a>> {
        let kind = self.cursor.read_byte()?;

        if self.state == State::ExpectStart {
            return match kind {
                message_type::START => self.read_start().map(Message::Start),
                message_type::GEOMETRY => Err(Error::UnexpectedMessage("geometry")),
                message_type::OBJECT => Err(Error::UnexpectedMessage("object")),
                message_type::END => Err(Error::UnexpectedMessage("end")),
                other => Err(Error::UnknownMessageType(other)),
            };
        }

        match kind {
            message_type::START => Err(Error::UnexpectedMessage("start")),
            message_type::GEOMETRY => self.read_geometry().map(Message::Geometry),
            message_type::OBJECT => self.read_object().map(Message::Object),
            message_type::END => Ok(Message::End),
            other => Err(Error::UnknownMessageType(other)),
        }
    }

    fn read_start(&mut self) -> Result<StreamHeader> {
        let magic = self.cursor.read_utf8()?;
        if magic != STREAM_MAGIC {
            return Err(Error::InvalidMagic {
                expected: STREAM_MAGIC,
                found: magic,
            });
        }

        let version = self.cursor.read_byte()?;
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion {
                expected: FORMAT_VERSION,
                found: version,
            });
        }

        self.cursor.align4()?;
        let model_bounds = self.cursor.read_floats::<6>()?;

        Ok(StreamHeader {
            version,
            model_bounds,
        })
    }

    fn read_geometry(&mut self) -> Result<GeometryData<'a>> {
        self.cursor.align4()?;
        let geometry_id = self.cursor.read_long()?;

        let count = self.cursor.read_count()?;
        let positions = self.cursor.read_float_array(count)?;

        let count = self.cursor.read_count()?;
        let normals = self.cursor.read_float_array(count)?;

        let count = self.cursor.read_count()?;
        let colors = self.cursor.read_float_array(count)?;

        let count = self.cursor.read_count()?;
        let indices = self.cursor.read_int_array(count)?;

        Ok(GeometryData {
            geometry_id,
            positions,
            normals,
            colors,
            indices,
        })
    }

    fn read_object(&mut self) -> Result<ObjectData> {
        let type_tag = self.cursor.read_utf8()?;
        self.cursor.align4()?;

        let oid = self.cursor.read_long()?;
        let roid = self.cursor.read_long()?;
        let geometry_id = self.cursor.read_long()?;
        let matrix = self.cursor.read_floats::<16>()?;
        let bounds = self.cursor.read_floats::<6>()?;

        Ok(ObjectData {
            type_tag,
            oid,
            roid,
            geometry_id,
            matrix,
            bounds,
        })
    }
}
