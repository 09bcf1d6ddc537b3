// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ldraw_geometry::geometry::{EdgeClassifier, EdgeThresholds, PartContext};
use ldraw_geometry::io::{ExportScene, SceneObject};
use ldraw_geometry::ldraw::{ColorTable, FaceData, GeometryData, PipelineCaches};
use ldraw_geometry::{import_part, ExportOptions, ImportOptions, LineSerializer, MeshBuilder};
use nalgebra::Point3;
use std::collections::BTreeSet;

/// `n` x `n` quads on a wavy sheet, each with its own corners like parsed faces
fn sheet(n: usize) -> GeometryData {
    let height = |i: usize, j: usize| ((i as f64) * 0.7).sin() * ((j as f64) * 0.4).cos() * 4.0;
    let point = |i: usize, j: usize| Point3::new(i as f64 * 10.0, height(i, j), j as f64 * 10.0);

    let mut geometry = GeometryData::new("sheet.dat");
    for i in 0..n {
        for j in 0..n {
            geometry.add_face(FaceData::quad(
                point(i, j),
                point(i + 1, j),
                point(i + 1, j + 1),
                point(i, j + 1),
                "16",
            ));
        }
    }
    geometry
}

fn bench_mesh_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_build");
    let options = ImportOptions::default();

    for n in [16, 64] {
        let geometry = sheet(n);
        group.bench_with_input(BenchmarkId::new("weld", n * n), &geometry, |b, geometry| {
            let mut caches = PipelineCaches::new();
            b.iter(|| {
                let mut context = PartContext {
                    filename: &geometry.name,
                    bfc_certified: false,
                    parts: &mut caches.parts,
                };
                MeshBuilder::new(&options).build(black_box(&geometry.face_data), "4", &mut context)
            });
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let options = ImportOptions::default();
    let classifier = EdgeClassifier::new(EdgeThresholds::default());

    for n in [16, 64] {
        let geometry = sheet(n);
        let mut caches = PipelineCaches::new();
        let mut context = PartContext {
            filename: &geometry.name,
            bfc_certified: false,
            parts: &mut caches.parts,
        };
        let mesh = MeshBuilder::new(&options).build(&geometry.face_data, "4", &mut context);
        let adjacency = mesh.adjacency();
        let explicit = BTreeSet::new();

        group.bench_with_input(BenchmarkId::new("edges", n * n), &mesh, |b, mesh| {
            b.iter(|| classifier.classify(black_box(mesh), &adjacency, &explicit));
        });
    }

    group.finish();
}

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import");
    let options = ImportOptions::default();
    let geometry = sheet(32);

    group.bench_function("sheet_1024", |b| {
        let mut caches = PipelineCaches::new();
        b.iter(|| import_part(black_box(&geometry), "4", &options, &mut caches).unwrap());
    });

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    let import_options = ImportOptions {
        import_scale: 1.0,
        ..ImportOptions::default()
    };
    let part = import_part(&sheet(32), "4", &import_options, &mut PipelineCaches::new()).unwrap();

    let mut object = SceneObject::with_mesh("sheet", part.mesh);
    object.props.name = "sheet.dat".to_string();
    object.props.color_code = "4".to_string();
    object.props.export_shade_smooth = true;
    let mut scene = ExportScene::new();
    scene.active = Some(scene.add_object(object));

    let options = ExportOptions {
        selection_only: false,
        ..ExportOptions::default()
    };
    let colors = ColorTable::with_defaults();

    group.bench_function("sheet_1024", |b| {
        b.iter(|| LineSerializer::new(&options, &colors).serialize(black_box(&scene)).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_mesh_build,
    bench_classify,
    bench_import,
    bench_serialize
);
criterion_main!(benches);
