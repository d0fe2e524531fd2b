// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIMView Core
//!
//! Decoder for the compact binary geometry stream consumed by the BIMView
//! viewer.
//!
//! ## Overview
//!
//! - **[`ByteCursor`]**: forward-only typed reads over a borrowed buffer
//! - **[`ModelStreamDecoder`]**: message-by-message decoding of the model
//!   stream into geometry buffers and object placements
//! - **[`StreamEncoder`]**: writes the same layout, for fixtures and tooling
//!
//! Geometry arrays are returned as `Cow` slices that borrow from the input
//! buffer whenever byte order and alignment allow it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bimview_core::{Message, ModelStreamDecoder};
//!
//! let model = ModelStreamDecoder::new(&bytes).decode_all()?;
//! for object in &model.objects {
//!     println!("{} -> geometry {}", object.type_tag, object.geometry_id);
//! }
//! ```
//!
//! ## Wire format notes
//!
//! All scalars are little-endian except the `i16` length prefix of strings,
//! which is big-endian. "Long" fields occupy 8 bytes but only the low 32 bits
//! are read.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for decoded data

pub mod cursor;
pub mod encoder;
pub mod error;
pub mod stream;

pub use cursor::ByteCursor;
pub use encoder::StreamEncoder;
pub use error::{Error, Result};
pub use stream::{
    message_type, DecodedModel, GeometryData, Message, ModelStreamDecoder, ObjectData,
    StreamHeader, WireBounds, FORMAT_VERSION, STREAM_MAGIC,
};
