// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch request parameters and results.
//!
//! Each struct deserializes from the camelCase JSON the UI layer sends, so
//! requests can be passed through unchanged. Required fields are `Option`s:
//! an absent one makes the call fail with
//! [`Error::MissingParameter`](crate::Error::MissingParameter) and change
//! nothing.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn collect_ids<I, S>(ids: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(ids.into_iter().map(Into::into).collect())
}

/// Unwrap a required field
pub(crate) fn required<'a, T>(value: &'a Option<T>, name: &'static str) -> Result<&'a T> {
    value.as_ref().ok_or(Error::MissingParameter(name))
}

/// `set_visibility` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityParams {
    /// Object ids or type tags
    pub ids: Option<Vec<String>>,
    /// Defaults to `true` when absent
    pub visible: Option<bool>,
}

impl VisibilityParams {
    pub fn new<I, S>(ids: I, visible: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: collect_ids(ids),
            visible: Some(visible),
        }
    }
}

/// `set_color` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorParams {
    pub ids: Option<Vec<String>>,
    /// `[r, g, b]` or `[r, g, b, opacity]`
    pub color: Option<Vec<f32>>,
}

impl ColorParams {
    pub fn new<I, S>(ids: I, color: &[f32]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: collect_ids(ids),
            color: Some(color.to_vec()),
        }
    }
}

/// `set_selection_state` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionParams {
    pub ids: Option<Vec<String>>,
    /// Defaults to `true` when absent
    pub selected: Option<bool>,
}

impl SelectionParams {
    pub fn new<I, S>(ids: I, selected: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: collect_ids(ids),
            selected: Some(selected),
        }
    }
}

/// `reset` request. Every flag defaults to `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetParams {
    pub visibility: bool,
    pub element_colors: bool,
    /// Always clears the whole selection, regardless of `ids`
    pub selection_state: bool,
    pub camera_position: bool,
    /// Restrict visibility and color restore to these ids (default: all)
    pub ids: Option<Vec<String>>,
}

impl ResetParams {
    /// Reset everything for every object
    pub fn all() -> Self {
        Self {
            visibility: true,
            element_colors: true,
            selection_state: true,
            camera_position: true,
            ids: None,
        }
    }

    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = collect_ids(ids);
        self
    }
}

/// `view_fit` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewFitParams {
    /// Objects to fit; absent or empty fits the whole scene
    pub ids: Option<Vec<String>>,
    /// Fly instead of jump
    pub animate: bool,
}

/// `set_camera` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraParams {
    /// "persp" or "ortho"
    #[serde(rename = "type")]
    pub projection: Option<String>,
    pub eye: Option<[f64; 3]>,
    pub target: Option<[f64; 3]>,
    pub up: Option<[f64; 3]>,
    /// Perspective field of view in degrees
    pub fovy: Option<f64>,
    /// Orthographic half-extents `[x, y]`
    pub scale: Option<[f64; 2]>,
}

/// Outcome of a batch call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Objects actually updated
    pub applied: usize,
    /// Ids that resolved to nothing, in request order
    pub not_found: Vec<String>,
    /// Whether the batch stopped before its last id
    pub aborted: bool,
}

impl BatchReport {
    /// No misses and no early stop
    pub fn is_complete(&self) -> bool {
        self.not_found.is_empty() && !self.aborted
    }

    /// Misses as [`Error::NotFound`] values
    pub fn errors(&self) -> impl Iterator<Item = Error> + '_ {
        self.not_found.iter().cloned().map(Error::NotFound)
    }

    pub(crate) fn miss(&mut self, id: &str) {
        self.not_found.push(id.to_string());
    }
}
