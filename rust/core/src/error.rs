// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for binary stream decoding.

use thiserror::Error;

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding a model stream.
///
/// Every variant is fatal to the stream being decoded: the format carries no
/// tags to resynchronize on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A read would run past the end of the buffer.
    #[error("read of {requested} bytes at position {position} exceeds buffer length {len}")]
    OutOfBounds {
        position: usize,
        requested: usize,
        len: usize,
    },

    /// A length or count field holds a value that cannot be valid.
    #[error("format mismatch at position {position}: {message}")]
    FormatMismatch { position: usize, message: String },

    /// String bytes are not valid UTF-8.
    #[error("invalid UTF-8 string at position {position}")]
    InvalidUtf8 { position: usize },

    /// The stream does not start with the expected magic string.
    #[error("invalid stream magic: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        expected: &'static str,
        found: String,
    },

    /// The stream declares a format version this decoder does not read.
    #[error("unsupported stream version {found} (expected {expected})")]
    UnsupportedVersion { expected: i8, found: i8 },

    /// A message header carries an unknown type code.
    #[error("unknown message type {0}")]
    UnknownMessageType(i8),

    /// A known message appeared where the stream does not allow it.
    #[error("unexpected {0} message")]
    UnexpectedMessage(&'static str),
}

impl Error {
    /// Create a format mismatch error
    pub fn format(position: usize, message: impl Into<String>) -> Self {
        Self::FormatMismatch {
            position,
            message: message.into(),
        }
    }
}
