// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for viewer operations.

/// Result type alias for viewer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in registry, camera and loading operations.
///
/// Ids that fail to resolve inside a batch call are not errors; they are
/// collected in a [`BatchReport`](crate::BatchReport).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field of a batch request is absent. The call changed nothing.
    #[error("parameter expected: '{0}'")]
    MissingParameter(&'static str),

    /// A field is present but unusable.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },

    /// No object is registered under this id.
    #[error("object not found: '{0}'")]
    NotFound(String),

    /// Camera projection type other than "persp" or "ortho".
    #[error("unsupported camera projection type: {0}")]
    UnsupportedProjection(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// The model stream could not be decoded.
    #[error("model stream error: {0}")]
    Decode(#[from] bimview_core::Error),
}
