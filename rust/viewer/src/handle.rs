// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seams to the external rendering engine.
//!
//! The registry never renders anything itself. It stores handles created by
//! the engine and flips their visibility, color and highlight through
//! [`SceneHandle`]. Decoded streams are turned into engine objects through
//! [`SceneBuilder`].

use bimview_core::{GeometryData, ObjectData};
use nalgebra::Matrix4;
use smallvec::{smallvec, SmallVec};

use crate::aabb::Aabb;
use crate::materials::{Color, Rgba};

/// Opaque reference to an engine-owned renderable object.
pub trait SceneHandle {
    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Current diffuse RGB with opacity as the fourth component
    fn color(&self) -> Rgba;

    fn set_diffuse(&mut self, rgb: [f32; 3]);

    fn set_opacity(&mut self, opacity: f32);

    /// Whether the object takes part in transparency compositing
    fn set_transparent(&mut self, transparent: bool);

    /// Selection highlight
    fn set_highlighted(&mut self, highlighted: bool);

    /// World-space bounds, `None` while the object has no renderable extent
    fn world_aabb(&self) -> Option<Aabb>;

    /// Release engine resources
    fn destroy(&mut self);
}

/// Apply `color` to `handle`; an opacity, when given, also sets or clears
/// the transparency flag.
pub(crate) fn apply_color<H: SceneHandle + ?Sized>(handle: &mut H, color: &Color) {
    handle.set_diffuse(color.rgb);
    if let Some(opacity) = color.opacity {
        handle.set_opacity(opacity);
        handle.set_transparent(color.is_transparent());
    }
}

#[rustfmt::skip]
const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 1.0, 0.0,
    0.0, 0.0, 0.0, 1.0,
];

/// Everything the engine needs to instantiate one object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescriptor {
    /// Registry key
    pub object_id: String,
    pub type_tag: String,
    pub oid: i32,
    pub roid: i32,
    /// Geometries to instance (most objects have exactly one)
    pub geometry_ids: SmallVec<[i32; 1]>,
    /// Column-major 4x4 transform
    pub matrix: [f32; 16],
}

impl ObjectDescriptor {
    /// Descriptor with an identity transform and no geometry
    pub fn new(object_id: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            type_tag: type_tag.into(),
            oid: 0,
            roid: 0,
            geometry_ids: SmallVec::new(),
            matrix: IDENTITY,
        }
    }

    /// Transform as a matrix
    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::from_column_slice(&self.matrix)
    }
}

impl From<&ObjectData> for ObjectDescriptor {
    fn from(object: &ObjectData) -> Self {
        Self {
            object_id: object.object_id(),
            type_tag: object.type_tag.clone(),
            oid: object.oid,
            roid: object.roid,
            geometry_ids: smallvec![object.geometry_id],
            matrix: object.matrix,
        }
    }
}

/// Engine-side factory driven by [`Viewer::load`](crate::Viewer::load).
pub trait SceneBuilder {
    type Handle: SceneHandle;

    /// Upload one geometry; objects reference it by `geometry_id`
    fn create_geometry(&mut self, geometry: &GeometryData<'_>);

    /// Release a geometry uploaded by [`create_geometry`](Self::create_geometry)
    fn destroy_geometry(&mut self, geometry_id: i32);

    /// Instantiate one object
    fn create_object(&mut self, descriptor: &ObjectDescriptor) -> Self::Handle;

    /// Bounds of the whole model from the stream header
    fn set_model_bounds(&mut self, _bounds: Aabb) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_from_object() {
        let mut matrix = [0.0f32; 16];
        for i in 0..4 {
            matrix[i * 5] = 1.0;
        }
        matrix[13] = 3.0;
        let object = ObjectData {
            type_tag: "IfcDoor".to_string(),
            oid: 42,
            roid: 7,
            geometry_id: 9,
            matrix,
            bounds: [0.0; 6],
        };

        let descriptor = ObjectDescriptor::from(&object);
        assert_eq!(descriptor.object_id, "42");
        assert_eq!(descriptor.type_tag, "IfcDoor");
        assert_eq!(descriptor.geometry_ids.as_slice(), &[9]);
        assert_eq!(descriptor.transform()[(1, 3)], 3.0);
    }

    #[test]
    fn test_new_descriptor_is_identity() {
        let descriptor = ObjectDescriptor::new("a", "IfcWall");
        assert_eq!(descriptor.transform(), Matrix4::identity());
        assert!(descriptor.geometry_ids.is_empty());
    }
}
