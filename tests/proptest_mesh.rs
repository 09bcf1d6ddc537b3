// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Property-based tests for welding, edge classification and number output.
//!
//! Run with: cargo test --test proptest_mesh

use ldraw_geometry::geometry::{EdgeClassifier, EdgeThresholds, Polygon};
use ldraw_geometry::io::format_decimal;
use ldraw_geometry::Mesh;
use nalgebra::Point3;
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// Strategies
// =============================================================================

/// Positions on a coarse lattice so that welds and shared edges happen often
fn arb_position() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-4i32..4).prop_map(|[x, y, z]| {
        Point3::new(x as f64 * 0.5, y as f64 * 0.5, z as f64 * 0.5)
    })
}

/// Positions jittered off the lattice
fn arb_jittered_position() -> impl Strategy<Value = Point3<f64>> {
    (arb_position(), prop::array::uniform3(-0.02..0.02f64))
        .prop_map(|(p, [dx, dy, dz])| Point3::new(p.x + dx, p.y + dy, p.z + dz))
}

/// Mesh of triangles and quads; every index is valid
fn arb_mesh(max_vertices: usize, max_polygons: usize) -> impl Strategy<Value = Mesh> {
    prop::collection::vec(arb_jittered_position(), 4..=max_vertices).prop_flat_map(move |vertices| {
        let n = vertices.len();
        let polygon = prop::collection::vec(0..n, 3..=4);
        prop::collection::vec(polygon, 1..=max_polygons).prop_map(move |polygons| {
            let mut mesh = Mesh::new();
            for v in &vertices {
                mesh.add_vertex(*v);
            }
            for indices in polygons {
                mesh.add_polygon(Polygon::new(indices, 0));
            }
            mesh
        })
    })
}

fn classifier() -> EdgeClassifier {
    EdgeClassifier::new(EdgeThresholds::default())
}

// =============================================================================
// Welding
// =============================================================================

proptest! {
    /// A second weld at the same distance finds nothing to merge.
    #[test]
    fn proptest_weld_is_idempotent(mesh in arb_mesh(40, 30), distance in 0.0..0.6f64) {
        let mut once = mesh.clone();
        once.weld_vertices(distance);

        let mut twice = once.clone();
        let removed = twice.weld_vertices(distance);

        prop_assert_eq!(removed, 0);
        prop_assert_eq!(&once.vertices, &twice.vertices);
        prop_assert_eq!(once.polygon_count(), twice.polygon_count());
        for (a, b) in once.polygons.iter().zip(&twice.polygons) {
            prop_assert_eq!(&a.indices, &b.indices);
        }
    }

    /// Survivors are pairwise farther apart than the weld distance.
    #[test]
    fn proptest_weld_leaves_no_close_pairs(mesh in arb_mesh(40, 30), distance in 0.0..0.6f64) {
        let mut m = mesh.clone();
        m.weld_vertices(distance);

        for i in 0..m.vertices.len() {
            for j in (i + 1)..m.vertices.len() {
                let d = (m.vertices[i] - m.vertices[j]).norm();
                prop_assert!(d > distance, "vertices {} and {} are {} apart", i, j, d);
            }
        }
    }

    /// Welding never adds vertices and leaves only valid, non-degenerate polygons.
    #[test]
    fn proptest_weld_keeps_polygons_valid(mesh in arb_mesh(40, 30), distance in 0.0..0.6f64) {
        let original_count = mesh.vertex_count();
        let mut m = mesh.clone();
        m.weld_vertices(distance);

        prop_assert!(m.vertex_count() <= original_count);
        for polygon in &m.polygons {
            let distinct: BTreeSet<usize> = polygon.indices.iter().copied().collect();
            prop_assert!(distinct.len() >= 3, "degenerate polygon {:?}", polygon.indices);
            prop_assert!(polygon.indices.iter().all(|&i| i < m.vertex_count()));
        }
    }
}

// =============================================================================
// Edge classification
// =============================================================================

proptest! {
    /// Same mesh, same classification.
    #[test]
    fn proptest_classification_is_deterministic(mesh in arb_mesh(30, 24)) {
        let mut m = mesh.clone();
        m.weld_vertices(0.05);

        let first = classifier().classify(&m, &m.adjacency(), &BTreeSet::new());
        let second = classifier().classify(&m, &m.adjacency(), &BTreeSet::new());
        prop_assert_eq!(first, second);
    }

    /// Every classified edge lands in exactly one bucket.
    #[test]
    fn proptest_classification_buckets_are_disjoint(mesh in arb_mesh(30, 24)) {
        let mut m = mesh.clone();
        m.weld_vertices(0.05);

        let result = classifier().classify(&m, &m.adjacency(), &BTreeSet::new());
        let sharp: BTreeSet<_> = result.sharp.iter().copied().collect();
        let flat: BTreeSet<_> = result.flat.iter().copied().collect();
        let conditional: BTreeSet<_> = result.conditional.iter().map(|line| line.key()).collect();

        prop_assert!(sharp.is_disjoint(&flat));
        prop_assert!(sharp.is_disjoint(&conditional));
        prop_assert!(flat.is_disjoint(&conditional));
        prop_assert!(sharp.len() + flat.len() + conditional.len() <= result.angles.len());

        for angle in result.angles.values() {
            prop_assert!((0.0..=180.0).contains(angle), "angle out of range: {}", angle);
        }
    }
}

// =============================================================================
// Number formatting
// =============================================================================

proptest! {
    /// Output parses back to within half a unit in the last place.
    #[test]
    fn proptest_format_decimal_rounds_to_nearest(value in -1.0e6..1.0e6f64, places in 0u32..7) {
        let text = format_decimal(value, places);
        let parsed: f64 = text.parse().map_err(|e| TestCaseError::fail(format!("{}: {:?}", text, e)))?;

        let tolerance = 0.5 * 10f64.powi(-(places as i32)) + 1e-9;
        prop_assert!((parsed - value).abs() <= tolerance, "{} -> {}", value, text);
    }

    /// No negative zero, no trailing zeros, no dangling point.
    #[test]
    fn proptest_format_decimal_is_minimal(value in -1.0e3..1.0e3f64, places in 0u32..7) {
        let text = format_decimal(value, places);
        prop_assert_ne!(text.as_str(), "-0");
        prop_assert!(!text.ends_with('.'));
        if text.contains('.') {
            prop_assert!(!text.ends_with('0'), "trailing zero in {}", text);
        }
    }
}
