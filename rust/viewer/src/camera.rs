// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera state bookkeeping
//!
//! The engine owns the real camera. This module keeps the viewer-facing
//! state (projection type, view vectors, fovy / ortho scale), validates
//! updates against the active projection, and hands the result to a
//! [`CameraControl`] implementation.

use std::fmt;
use std::str::FromStr;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::error::Error;
use crate::params::CameraParams;

/// Projection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    #[serde(rename = "persp")]
    Perspective,
    #[serde(rename = "ortho")]
    Orthographic,
}

impl Projection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Projection::Perspective => "persp",
            Projection::Orthographic => "ortho",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Projection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "persp" => Ok(Projection::Perspective),
            "ortho" => Ok(Projection::Orthographic),
            other => Err(Error::UnsupportedProjection(other.to_string())),
        }
    }
}

/// What a view fit should frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitTarget {
    /// Everything in the scene
    Scene,
    Aabb(Aabb),
}

/// Engine-side camera collaborator.
pub trait CameraControl {
    /// Push the current state to the engine camera
    fn apply(&mut self, state: &CameraState);

    /// Frame `target`, flying when `animate` is set, jumping otherwise
    fn fit(&mut self, target: FitTarget, animate: bool);

    /// Return to the initial view
    fn reset_view(&mut self);
}

/// Viewer camera state
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub projection: Projection,
    pub eye: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    /// Perspective vertical field of view, degrees
    pub fovy: f64,
    /// Orthographic half-extents (x, y)
    pub ortho_scale: [f64; 2],
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective,
            eye: Point3::new(0.0, 0.0, -10.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fovy: 60.0,
            ortho_scale: [1.0, 1.0],
        }
    }
}

/// Fields of a camera update that were not applied, with the reason
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraUpdate {
    pub ignored: Vec<String>,
}

impl CameraUpdate {
    pub fn is_clean(&self) -> bool {
        self.ignored.is_empty()
    }

    fn ignore(&mut self, reason: String) {
        tracing::warn!("{}", reason);
        self.ignored.push(reason);
    }
}

/// Serializable camera state as reported to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    #[serde(rename = "type")]
    pub projection: Projection,
    pub eye: [f64; 3],
    pub target: [f64; 3],
    pub up: [f64; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fovy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[f64; 2]>,
}

impl CameraState {
    /// Apply an update.
    ///
    /// The projection switch happens first, so `fovy` and `scale` are checked
    /// against the projection in effect after the switch. An unsupported
    /// projection or a field that does not fit the projection is skipped;
    /// everything else still applies.
    pub fn apply(&mut self, params: &CameraParams) -> CameraUpdate {
        let mut update = CameraUpdate::default();

        if let Some(name) = &params.projection {
            match name.parse::<Projection>() {
                Ok(projection) => self.projection = projection,
                Err(e) => update.ignore(e.to_string()),
            }
        }

        if let Some([x, y, z]) = params.eye {
            self.eye = Point3::new(x, y, z);
        }
        if let Some([x, y, z]) = params.target {
            self.target = Point3::new(x, y, z);
        }
        if let Some([x, y, z]) = params.up {
            self.up = Vector3::new(x, y, z);
        }

        if let Some(fovy) = params.fovy {
            if self.projection == Projection::Perspective {
                self.fovy = fovy;
            } else {
                update.ignore(format!(
                    "Ignoring update to 'fovy' for current '{}' camera",
                    self.projection
                ));
            }
        }

        if let Some(scale) = params.scale {
            if self.projection == Projection::Orthographic {
                self.ortho_scale = scale;
            } else {
                update.ignore(format!(
                    "Ignoring update to 'scale' for current '{}' camera",
                    self.projection
                ));
            }
        }

        update
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            projection: self.projection,
            eye: self.eye.coords.into(),
            target: self.target.coords.into(),
            up: self.up.into(),
            fovy: (self.projection == Projection::Perspective).then_some(self.fovy),
            size: (self.projection == Projection::Orthographic).then_some(self.ortho_scale),
        }
    }

    /// Unit vector from eye to target, `None` when they coincide
    pub fn look_direction(&self) -> Option<Vector3<f64>> {
        (self.target - self.eye).try_normalize(f64::EPSILON)
    }
}
