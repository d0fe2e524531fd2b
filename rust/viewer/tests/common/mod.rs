// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory stand-ins for engine objects

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use bimview_core::GeometryData;
use bimview_viewer::{
    Aabb, CameraControl, CameraState, FitTarget, ObjectDescriptor, Rgba, SceneBuilder,
    SceneHandle,
};
use nalgebra::Point3;

#[derive(Debug, Clone)]
pub struct MockHandle {
    pub visible: bool,
    pub rgba: Rgba,
    pub transparent: bool,
    pub highlighted: bool,
    pub aabb: Option<Aabb>,
    pub destroyed: Rc<Cell<usize>>,
}

impl MockHandle {
    pub fn new() -> Self {
        Self {
            visible: true,
            rgba: [1.0, 1.0, 1.0, 1.0],
            transparent: false,
            highlighted: false,
            aabb: None,
            destroyed: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_aabb(min: [f64; 3], max: [f64; 3]) -> Self {
        Self {
            aabb: Some(Aabb::new(
                Point3::new(min[0], min[1], min[2]),
                Point3::new(max[0], max[1], max[2]),
            )),
            ..Self::new()
        }
    }

    pub fn counting(destroyed: &Rc<Cell<usize>>) -> Self {
        Self {
            destroyed: Rc::clone(destroyed),
            ..Self::new()
        }
    }
}

impl SceneHandle for MockHandle {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn color(&self) -> Rgba {
        self.rgba
    }

    fn set_diffuse(&mut self, rgb: [f32; 3]) {
        self.rgba[..3].copy_from_slice(&rgb);
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.rgba[3] = opacity;
    }

    fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }

    fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    fn world_aabb(&self) -> Option<Aabb> {
        self.aabb
    }

    fn destroy(&mut self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

/// Records geometry uploads and builds unit-box handles at each
/// object's translation
#[derive(Debug, Default)]
pub struct MockBuilder {
    pub geometry_ids: Vec<i32>,
    pub released_geometries: Vec<i32>,
    pub descriptors: Vec<ObjectDescriptor>,
    pub model_bounds: Option<Aabb>,
    pub destroyed: Rc<Cell<usize>>,
}

impl SceneBuilder for MockBuilder {
    type Handle = MockHandle;

    fn create_geometry(&mut self, geometry: &GeometryData<'_>) {
        self.geometry_ids.push(geometry.geometry_id);
    }

    fn destroy_geometry(&mut self, geometry_id: i32) {
        self.released_geometries.push(geometry_id);
    }

    fn create_object(&mut self, descriptor: &ObjectDescriptor) -> MockHandle {
        self.descriptors.push(descriptor.clone());
        let m = &descriptor.matrix;
        let (x, y, z) = (m[12] as f64, m[13] as f64, m[14] as f64);
        MockHandle {
            destroyed: Rc::clone(&self.destroyed),
            ..MockHandle::with_aabb([x, y, z], [x + 1.0, y + 1.0, z + 1.0])
        }
    }

    fn set_model_bounds(&mut self, bounds: Aabb) {
        self.model_bounds = Some(bounds);
    }
}

#[derive(Debug, Default)]
pub struct MockCamera {
    pub applied: Vec<CameraState>,
    pub fits: Vec<(FitTarget, bool)>,
    pub resets: usize,
}

impl CameraControl for MockCamera {
    fn apply(&mut self, state: &CameraState) {
        self.applied.push(state.clone());
    }

    fn fit(&mut self, target: FitTarget, animate: bool) {
        self.fits.push((target, animate));
    }

    fn reset_view(&mut self) {
        self.resets += 1;
    }
}
