// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Loading streams, view fitting and camera handling through the viewer

mod common;

use std::borrow::Cow;

use bimview_core::{GeometryData, ObjectData, StreamEncoder};
use bimview_viewer::{
    CameraParams, ColorParams, Error, FitTarget, MaterialTable, Projection, ResetParams,
    SelectionParams, ViewFitParams, Viewer, ViewerConfig, VisibilityParams,
};
use common::{MockBuilder, MockCamera};
use nalgebra::Point3;

fn triangle(id: i32) -> GeometryData<'static> {
    GeometryData {
        geometry_id: id,
        positions: Cow::Owned(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
        normals: Cow::Owned(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
        colors: Cow::Owned(Vec::new()),
        indices: Cow::Owned(vec![0, 1, 2]),
    }
}

fn placed(oid: i32, type_tag: &str, geometry_id: i32, offset: [f32; 3]) -> ObjectData {
    let mut matrix = [0.0f32; 16];
    for i in 0..4 {
        matrix[i * 5] = 1.0;
    }
    matrix[12..15].copy_from_slice(&offset);
    ObjectData {
        type_tag: type_tag.to_string(),
        oid,
        roid: 1,
        geometry_id,
        matrix,
        bounds: [
            offset[0],
            offset[1],
            offset[2],
            offset[0] + 1.0,
            offset[1] + 1.0,
            offset[2] + 1.0,
        ],
    }
}

fn model_stream() -> Vec<u8> {
    let mut enc = StreamEncoder::new();
    enc.write_start(&[0.0, 0.0, 0.0, 11.0, 1.0, 6.0]);
    enc.write_geometry(&triangle(1));
    enc.write_geometry(&triangle(2));
    enc.write_object(&placed(100, "IfcWall", 1, [0.0, 0.0, 0.0]))
        .unwrap();
    enc.write_object(&placed(101, "IfcWall", 1, [10.0, 0.0, 0.0]))
        .unwrap();
    enc.write_object(&placed(200, "IfcWindow", 2, [0.0, 0.0, 5.0]))
        .unwrap();
    enc.write_end();
    enc.finish()
}

fn loaded_viewer() -> (Viewer<common::MockHandle, MockCamera>, MockBuilder) {
    let mut viewer = Viewer::new(&ViewerConfig::default(), MockCamera::default());
    let mut builder = MockBuilder::default();
    viewer.load(&model_stream(), &mut builder).unwrap();
    (viewer, builder)
}

#[test]
fn test_load_registers_objects() {
    let mut viewer = Viewer::new(&ViewerConfig::default(), MockCamera::default());
    let mut builder = MockBuilder::default();
    let summary = viewer.load(&model_stream(), &mut builder).unwrap();

    assert_eq!(summary.geometries, 2);
    assert_eq!(summary.objects, 3);
    let bounds = summary.model_bounds.unwrap();
    assert_eq!(bounds.max, Point3::new(11.0, 1.0, 6.0));
    assert_eq!(builder.model_bounds, Some(bounds));

    assert_eq!(builder.geometry_ids, [1, 2]);
    assert_eq!(builder.descriptors.len(), 3);
    assert_eq!(builder.descriptors[2].geometry_ids.as_slice(), &[2]);

    let registry = viewer.registry();
    assert_eq!(registry.ids_of_type("IfcWall"), ["100", "101"]);
    assert_eq!(registry.ids_of_type("IfcWindow"), ["200"]);
}

#[test]
fn test_load_applies_configured_materials() {
    let (viewer, _) = loaded_viewer();
    let window = MaterialTable::builtin().color_for("IfcWindow");
    assert_eq!(viewer.registry().get("200").unwrap().rgba, window);
    assert!(viewer.registry().get("200").unwrap().transparent);
}

#[test]
fn test_load_without_materials() {
    let config = ViewerConfig {
        apply_default_materials: false,
        ..Default::default()
    };
    let mut viewer = Viewer::new(&config, MockCamera::default());
    viewer
        .load(&model_stream(), &mut MockBuilder::default())
        .unwrap();
    assert_eq!(
        viewer.registry().get("200").unwrap().rgba,
        [1.0, 1.0, 1.0, 1.0]
    );
}

#[test]
fn test_load_truncated_keeps_earlier_objects() {
    let bytes = model_stream();
    // Cut into the last object message
    let truncated = &bytes[..bytes.len() - 40];

    let mut viewer = Viewer::new(&ViewerConfig::default(), MockCamera::default());
    let err = viewer
        .load(truncated, &mut MockBuilder::default())
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
    assert!(viewer.registry().contains("100"));
    assert!(viewer.registry().contains("101"));
    assert!(!viewer.registry().contains("200"));
}

#[test]
fn test_load_rejects_bad_magic() {
    let mut bytes = model_stream();
    // Type byte and i16 length precede the magic
    bytes[3] = b'X';
    let mut viewer = Viewer::new(&ViewerConfig::default(), MockCamera::default());
    let err = viewer
        .load(&bytes, &mut MockBuilder::default())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Decode(bimview_core::Error::InvalidMagic { .. })
    ));
    assert!(viewer.registry().is_empty());
}

#[test]
fn test_view_fit_union() {
    let (mut viewer, _) = loaded_viewer();
    let target = viewer.view_fit(&ViewFitParams {
        ids: Some(vec!["100".to_string(), "101".to_string()]),
        animate: true,
    });

    let FitTarget::Aabb(aabb) = target else {
        panic!("expected a box, got {:?}", target);
    };
    assert_eq!(aabb.min, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(aabb.max, Point3::new(11.0, 1.0, 1.0));
    assert_eq!(viewer.camera_control().fits, [(target, true)]);
}

#[test]
fn test_view_fit_scene_fallbacks() {
    let (mut viewer, _) = loaded_viewer();

    assert_eq!(viewer.view_fit(&ViewFitParams::default()), FitTarget::Scene);
    assert_eq!(
        viewer.view_fit(&ViewFitParams {
            ids: Some(Vec::new()),
            animate: false,
        }),
        FitTarget::Scene
    );
    assert_eq!(
        viewer.view_fit(&ViewFitParams {
            ids: Some(vec!["ghost".to_string(), "phantom".to_string()]),
            animate: false,
        }),
        FitTarget::Scene
    );
    assert_eq!(viewer.camera_control().fits.len(), 3);
}

#[test]
fn test_set_camera_pushes_state() {
    let (mut viewer, _) = loaded_viewer();
    let update = viewer.set_camera(&CameraParams {
        projection: Some("ortho".to_string()),
        eye: Some([5.0, 5.0, 5.0]),
        scale: Some([20.0, 10.0]),
        fovy: Some(35.0),
        ..Default::default()
    });

    assert_eq!(update.ignored.len(), 1);
    let applied = viewer.camera_control().applied.last().unwrap();
    assert_eq!(applied.projection, Projection::Orthographic);
    assert_eq!(applied.ortho_scale, [20.0, 10.0]);

    let snapshot = viewer.camera();
    assert_eq!(snapshot.projection, Projection::Orthographic);
    assert_eq!(snapshot.eye, [5.0, 5.0, 5.0]);
    assert_eq!(snapshot.size, Some([20.0, 10.0]));
    assert_eq!(snapshot.fovy, None);
}

#[test]
fn test_reset_all() {
    let (mut viewer, _) = loaded_viewer();
    let wall = viewer.registry().get("100").unwrap().rgba;

    let registry = viewer.registry_mut();
    registry
        .set_visibility(&VisibilityParams::new(["IfcWall"], false))
        .unwrap();
    registry
        .set_color(&ColorParams::new(["100"], &[0.0, 0.0, 0.0]))
        .unwrap();
    registry
        .set_selection_state(&SelectionParams::new(["101", "200"], true))
        .unwrap();
    viewer.set_camera(&CameraParams {
        eye: Some([1.0, 1.0, 1.0]),
        ..Default::default()
    });

    let report = viewer.reset(&ResetParams::all());
    assert_eq!(report.applied, 3);

    let registry = viewer.registry();
    assert!(registry.get("100").unwrap().visible);
    assert!(registry.get("101").unwrap().visible);
    assert_eq!(registry.get("100").unwrap().rgba, wall);
    assert!(registry.selected().is_empty());
    assert_eq!(viewer.camera_control().resets, 1);
    assert_eq!(viewer.camera().eye, [0.0, 0.0, -10.0]);
}

#[test]
fn test_reset_without_camera_leaves_view() {
    let (mut viewer, _) = loaded_viewer();
    viewer.reset(&ResetParams {
        visibility: true,
        ..Default::default()
    });
    assert_eq!(viewer.camera_control().resets, 0);
}

#[test]
fn test_clear_destroys_loaded_objects() {
    let (mut viewer, mut builder) = loaded_viewer();
    assert_eq!(viewer.geometry_count(), 2);

    viewer.clear(&mut builder);
    assert!(viewer.registry().is_empty());
    assert_eq!(builder.destroyed.get(), 3);
    assert_eq!(builder.released_geometries, [1, 2]);
    assert_eq!(viewer.geometry_count(), 0);

    viewer.clear(&mut builder);
    assert_eq!(builder.destroyed.get(), 3);
    assert_eq!(builder.released_geometries, [1, 2]);
}

#[test]
fn test_reload_after_clear_releases_each_cycle() {
    let mut viewer = Viewer::new(&ViewerConfig::default(), MockCamera::default());
    let mut builder = MockBuilder::default();
    for _ in 0..2 {
        viewer.load(&model_stream(), &mut builder).unwrap();
        viewer.clear(&mut builder);
    }
    assert_eq!(
        builder.geometry_ids.len(),
        builder.released_geometries.len()
    );
    assert_eq!(builder.descriptors.len(), builder.destroyed.get());
}

#[test]
fn test_repeated_object_id_destroys_previous_handle() {
    let mut enc = StreamEncoder::new();
    enc.write_start(&[0.0; 6]);
    enc.write_geometry(&triangle(1));
    enc.write_object(&placed(7, "IfcWall", 1, [0.0, 0.0, 0.0]))
        .unwrap();
    enc.write_object(&placed(7, "IfcSlab", 1, [2.0, 0.0, 0.0]))
        .unwrap();
    enc.write_end();
    let bytes = enc.finish();

    let mut viewer = Viewer::new(&ViewerConfig::default(), MockCamera::default());
    let mut builder = MockBuilder::default();
    let summary = viewer.load(&bytes, &mut builder).unwrap();

    assert_eq!(summary.objects, 2);
    assert_eq!(viewer.registry().len(), 1);
    assert_eq!(viewer.registry().type_of("7"), Some("IfcSlab"));
    assert!(viewer.registry().ids_of_type("IfcWall").is_empty());
    // The first handle went away when the second replaced it
    assert_eq!(builder.destroyed.get(), 1);

    viewer.clear(&mut builder);
    assert_eq!(builder.destroyed.get(), builder.descriptors.len());
}
