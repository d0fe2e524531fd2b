// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer - ties stream loading, the registry and the camera together

use std::time::Instant;

use bimview_core::{Message, ModelStreamDecoder};
use rustc_hash::FxHashSet;

use crate::aabb::Aabb;
use crate::camera::{CameraControl, CameraSnapshot, CameraState, CameraUpdate, FitTarget};
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::handle::{ObjectDescriptor, SceneBuilder, SceneHandle};
use crate::params::{BatchReport, CameraParams, ResetParams, ViewFitParams};
use crate::registry::ObjectRegistry;

/// Counts from one [`Viewer::load`] call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub geometries: usize,
    pub objects: usize,
    pub model_bounds: Option<Aabb>,
}

/// Engine-independent viewer state.
///
/// Owns the [`ObjectRegistry`], the [`CameraState`] and the engine's
/// [`CameraControl`]. Registry batch calls go through
/// [`registry_mut`](Self::registry_mut); calls that also involve the camera
/// live here.
pub struct Viewer<H, C> {
    registry: ObjectRegistry<H>,
    camera_state: CameraState,
    camera: C,
    /// Geometries uploaded through a builder and not yet released
    geometry_ids: FxHashSet<i32>,
}

impl<H: SceneHandle, C: CameraControl> Viewer<H, C> {
    pub fn new(config: &ViewerConfig, camera: C) -> Self {
        Self {
            registry: ObjectRegistry::from_config(config),
            camera_state: CameraState::default(),
            camera,
            geometry_ids: FxHashSet::default(),
        }
    }

    pub fn registry(&self) -> &ObjectRegistry<H> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObjectRegistry<H> {
        &mut self.registry
    }

    pub fn camera_control(&self) -> &C {
        &self.camera
    }

    pub fn camera_control_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    /// Decode `bytes` and build every geometry and object through `builder`.
    ///
    /// Objects are registered as they arrive. A decode error stops the load;
    /// objects registered before it stay registered.
    pub fn load<B>(&mut self, bytes: &[u8], builder: &mut B) -> Result<LoadSummary>
    where
        B: SceneBuilder<Handle = H>,
    {
        let start = Instant::now();
        let mut summary = LoadSummary::default();
        let mut decoder = ModelStreamDecoder::new(bytes);

        while let Some(message) = decoder.next_message()? {
            match message {
                Message::Start(header) => {
                    let bounds = Aabb::from_bounds(&header.model_bounds);
                    builder.set_model_bounds(bounds);
                    summary.model_bounds = Some(bounds);
                }
                Message::Geometry(geometry) => {
                    builder.create_geometry(&geometry);
                    self.geometry_ids.insert(geometry.geometry_id);
                    summary.geometries += 1;
                }
                Message::Object(object) => {
                    let descriptor = ObjectDescriptor::from(&object);
                    self.registry
                        .create_object(&descriptor, |d| builder.create_object(d));
                    summary.objects += 1;
                }
                Message::End => {}
            }
        }

        tracing::info!(
            bytes = bytes.len(),
            geometries = summary.geometries,
            objects = summary.objects,
            load_time_ms = start.elapsed().as_millis() as u64,
            "Model stream loaded"
        );

        Ok(summary)
    }

    /// Update camera state and push it to the engine
    pub fn set_camera(&mut self, params: &CameraParams) -> CameraUpdate {
        let update = self.camera_state.apply(params);
        self.camera.apply(&self.camera_state);
        update
    }

    pub fn camera(&self) -> CameraSnapshot {
        self.camera_state.snapshot()
    }

    pub fn camera_state(&self) -> &CameraState {
        &self.camera_state
    }

    /// Frame the given objects, or the whole scene when no ids are given.
    ///
    /// When none of the ids has a spatial extent the whole scene is framed.
    pub fn view_fit(&mut self, params: &ViewFitParams) -> FitTarget {
        let target = match params.ids.as_deref() {
            None | Some([]) => FitTarget::Scene,
            Some(ids) => match self.registry.aabb_of(ids) {
                Some(aabb) if !aabb.is_sentinel() => FitTarget::Aabb(aabb),
                _ => {
                    tracing::debug!(
                        count = ids.len(),
                        "No spatial extent for requested ids, fitting scene"
                    );
                    FitTarget::Scene
                }
            },
        };

        self.camera.fit(target, params.animate);
        target
    }

    /// Registry reset, plus a camera reset when `camera_position` is set
    pub fn reset(&mut self, params: &ResetParams) -> BatchReport {
        let report = self.registry.reset(params);
        if params.camera_position {
            self.camera_state = CameraState::default();
            self.camera.reset_view();
        }
        report
    }

    /// Destroy all objects and release every geometry uploaded by
    /// [`load`](Self::load). `builder` must be the one the model was
    /// loaded through.
    pub fn clear<B>(&mut self, builder: &mut B)
    where
        B: SceneBuilder<Handle = H>,
    {
        self.registry.clear();

        if !self.geometry_ids.is_empty() {
            let mut ids: Vec<i32> = self.geometry_ids.drain().collect();
            ids.sort_unstable();
            for &id in &ids {
                builder.destroy_geometry(id);
            }
            tracing::debug!(count = ids.len(), "Released geometries");
        }
    }

    /// Geometry ids uploaded and not yet released
    pub fn geometry_count(&self) -> usize {
        self.geometry_ids.len()
    }
}
