// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Part import pipeline: faces to mesh, edge classification, edge mesh,
//! smoothing marks and scene transforms

use crate::config::{GapTarget, ImportOptions, ScaleStrategy, SmoothType};
use crate::geometry::transforms::{gap_scale_matrix, import_scale_matrix, rotation_matrix};
use crate::geometry::{
    edge_match_distance, EdgeClassifier, EdgeKey, EdgeMesh, EdgeMeshBuilder, EdgeThresholds, Mesh,
    MeshBuilder, PartContext, SpatialIndex,
};
use crate::ldraw::{EdgeData, GeometryData, PipelineCaches};
use anyhow::{ensure, Result};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Result of importing one part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedPart {
    pub name: String,
    pub mesh: Mesh,
    pub edge_mesh: Option<EdgeMesh>,
    /// Transform the host should put on the object; carries the scales that
    /// were not baked into the mesh
    pub object_matrix: Matrix4<f64>,
    pub sharp_edges: usize,
    pub conditional_lines: usize,
}

/// Build the mesh (and edge mesh) of one part colored `base_color`
pub fn import_part(
    geometry: &GeometryData,
    base_color: &str,
    options: &ImportOptions,
    caches: &mut PipelineCaches,
) -> Result<ImportedPart> {
    ensure!(
        options.merge_distance.is_finite() && options.merge_distance >= 0.0,
        "merge_distance must be a non-negative number, got {}",
        options.merge_distance
    );
    ensure!(
        options.import_scale.is_finite() && options.import_scale > 0.0,
        "import_scale must be positive, got {}",
        options.import_scale
    );
    ensure!(
        options.gap_scale.is_finite() && options.gap_scale > 0.0,
        "gap_scale must be positive, got {}",
        options.gap_scale
    );

    let mut context = PartContext {
        filename: &geometry.name,
        bfc_certified: geometry.bfc_certified,
        parts: &mut caches.parts,
    };
    let mut mesh = MeshBuilder::new(options).build(&geometry.face_data, base_color, &mut context);

    let explicit_sharp = match_edges(&mesh, &geometry.edge_data, options.merge_distance);
    let thresholds = EdgeThresholds {
        flat_angle: options.flat_angle,
        sharp_angle: options.sharp_angle,
    };
    let classification = EdgeClassifier::new(thresholds).classify(&mesh, &mesh.adjacency(), &explicit_sharp);

    let mut edge_mesh = options.import_edges.then(|| {
        let mut lines = geometry.edge_data.clone();
        lines.extend(EdgeMeshBuilder::classified_lines(
            &mesh,
            &classification,
            options.shade_smooth,
        ));
        EdgeMeshBuilder::new(options.merge_distance).build(&mesh, &lines)
    });

    let sharp = classification.sharp_set();
    mark_edges(&mut mesh, &sharp, options);
    match options.smooth_type {
        SmoothType::EdgeSplit => {}
        SmoothType::AutoSmooth => {
            mesh.auto_smooth_angle = options.shade_smooth.then_some(options.auto_smooth_angle);
        }
        SmoothType::BmeshSplit => {
            let added = mesh.split_edges(&sharp);
            debug!(added, "split mesh along sharp edges");
            mesh.auto_smooth_angle = options.shade_smooth.then_some(options.auto_smooth_angle);
        }
    }

    let (mesh_matrix, object_matrix) = part_matrices(options);
    mesh.transform(&mesh_matrix);
    if let Some(edge_mesh) = &mut edge_mesh {
        edge_mesh.transform(&mesh_matrix);
    }

    info!(
        part = %geometry.name,
        vertices = mesh.vertex_count(),
        polygons = mesh.polygon_count(),
        sharp = classification.sharp.len(),
        conditional = classification.conditional.len(),
        "imported part"
    );

    Ok(ImportedPart {
        name: geometry.name.clone(),
        mesh,
        edge_mesh,
        object_matrix,
        sharp_edges: classification.sharp.len(),
        conditional_lines: classification.conditional.len(),
    })
}

/// Mesh edges drawn by an explicit hard edge line.
///
/// Both endpoints of a line are looked up at the edge match distance; every
/// mesh edge joining a candidate of the first point to a candidate of the
/// second is matched.
pub fn match_edges(mesh: &Mesh, lines: &[EdgeData], merge_distance: f64) -> BTreeSet<EdgeKey> {
    let mesh_edges = mesh.edge_keys();
    let index = SpatialIndex::build(&mesh.vertices);
    let distance = edge_match_distance(merge_distance);

    let mut matched = BTreeSet::new();
    for line in lines.iter().filter(|line| line.sharp) {
        let Some((a, b)) = line.endpoints() else {
            continue;
        };
        let near_a = index.query_range(&a, distance);
        let near_b = index.query_range(&b, distance);
        for &i in &near_a {
            for &j in &near_b {
                let key = EdgeKey::new(i, j);
                if i != j && mesh_edges.contains(&key) {
                    matched.insert(key);
                }
            }
        }
    }

    debug!(matched = matched.len(), lines = lines.len(), "matched explicit edges");
    matched
}

/// Sharp, freestyle and bevel marks on the given edges
fn mark_edges(mesh: &mut Mesh, edges: &BTreeSet<EdgeKey>, options: &ImportOptions) {
    for key in edges {
        let flags = mesh.edge_flags_mut(*key);
        if options.smooth_type == SmoothType::EdgeSplit {
            flags.sharp = true;
        }
        if options.use_freestyle_edges {
            flags.freestyle = true;
        }
        if options.bevel_edges {
            flags.bevel_weight = Some(options.bevel_weight);
        }
    }
}

/// (baked into the mesh, left on the object)
fn part_matrices(options: &ImportOptions) -> (Matrix4<f64>, Matrix4<f64>) {
    let mut mesh_matrix = rotation_matrix();
    let mut object_matrix = Matrix4::identity();

    match options.scale_strategy {
        ScaleStrategy::Mesh => mesh_matrix *= import_scale_matrix(options.import_scale),
        ScaleStrategy::Object => object_matrix *= import_scale_matrix(options.import_scale),
    }

    if options.make_gaps {
        match options.gap_target {
            GapTarget::Mesh => mesh_matrix *= gap_scale_matrix(options.gap_scale),
            GapTarget::Object => object_matrix *= gap_scale_matrix(options.gap_scale),
        }
    }

    (mesh_matrix, object_matrix)
}
