// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIMView Viewer
//!
//! Engine-independent state for a BIM model viewer: which objects exist,
//! what type they are, how they look, what is selected and where the camera
//! points.
//!
//! ## Overview
//!
//! - **[`ObjectRegistry`]**: id and type indexes over engine handles, batch
//!   visibility / color / selection updates, reset to registration state
//! - **[`CameraState`]**: projection-aware camera bookkeeping
//! - **[`compute_union_aabb`]**: bounds aggregation for view fitting
//! - **[`Viewer`]**: loads a model stream through a [`SceneBuilder`] and
//!   combines the above
//!
//! Rendering stays with the engine, reached through the [`SceneHandle`],
//! [`SceneBuilder`] and [`CameraControl`] traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bimview_viewer::{ColorParams, Viewer, ViewerConfig, VisibilityParams};
//!
//! let mut viewer = Viewer::new(&ViewerConfig::from_env(), engine.camera());
//! viewer.load(&bytes, &mut engine)?;
//!
//! let registry = viewer.registry_mut();
//! registry.set_visibility(&VisibilityParams::new(["IfcSpace"], false))?;
//! registry.set_color(&ColorParams::new(["1042"], &[1.0, 0.0, 0.0]))?;
//! ```

pub mod aabb;
pub mod camera;
pub mod config;
pub mod error;
pub mod handle;
pub mod materials;
pub mod params;
pub mod registry;
pub mod viewer;

pub use aabb::{compute_union_aabb, Aabb};
pub use camera::{CameraControl, CameraSnapshot, CameraState, CameraUpdate, FitTarget, Projection};
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use handle::{ObjectDescriptor, SceneBuilder, SceneHandle};
pub use materials::{Color, MaterialTable, Rgba, DEFAULT_MATERIAL};
pub use params::{
    BatchReport, CameraParams, ColorParams, ResetParams, SelectionParams, ViewFitParams,
    VisibilityParams,
};
pub use registry::ObjectRegistry;
pub use viewer::{LoadSummary, Viewer};
