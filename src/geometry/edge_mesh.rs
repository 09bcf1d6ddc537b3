// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Companion line mesh holding hard edges and conditional lines
//!
//! Line points are snapped onto the welded polygon mesh so both meshes
//! address the same logical vertices. A point with no mesh vertex within
//! the edge match distance keeps its own position as an independent vertex.

use super::classify::EdgeClassification;
use super::mesh::Mesh;
use super::spatial_index::{edge_match_distance, SpatialIndex};
use crate::ldraw::EdgeData;
use ahash::{AHashMap, AHashSet};
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLineKind {
    /// Line type 2
    Hard,
    /// Line type 5: two endpoints then two control points
    Conditional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLine {
    pub indices: Vec<usize>,
    pub kind: EdgeLineKind,
}

/// Line segments sharing vertices with a polygon mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeMesh {
    pub vertices: Vec<Point3<f64>>,
    pub lines: Vec<EdgeLine>,
    /// Mesh vertex each edge vertex was resolved to, `None` if independent
    pub mesh_vertex: Vec<Option<usize>>,
}

impl EdgeMesh {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn hard_lines(&self) -> impl Iterator<Item = &EdgeLine> {
        self.lines.iter().filter(|l| l.kind == EdgeLineKind::Hard)
    }

    pub fn conditional_lines(&self) -> impl Iterator<Item = &EdgeLine> {
        self.lines.iter().filter(|l| l.kind == EdgeLineKind::Conditional)
    }

    /// Number of vertices that did not resolve to the polygon mesh
    pub fn independent_vertex_count(&self) -> usize {
        self.mesh_vertex.iter().filter(|m| m.is_none()).count()
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            *vertex = matrix.transform_point(vertex);
        }
    }
}

/// Resolves line records against a welded mesh
#[derive(Debug, Clone, Copy)]
pub struct EdgeMeshBuilder {
    merge_distance: f64,
}

impl EdgeMeshBuilder {
    pub fn new(merge_distance: f64) -> Self {
        Self { merge_distance }
    }

    pub fn match_distance(&self) -> f64 {
        edge_match_distance(self.merge_distance)
    }

    pub fn build(&self, mesh: &Mesh, lines: &[EdgeData]) -> EdgeMesh {
        let index = SpatialIndex::build(&mesh.vertices);
        let distance = self.match_distance();

        let mut edge_mesh = EdgeMesh::default();
        let mut shared: AHashMap<usize, usize> = AHashMap::new();
        let mut emitted: AHashSet<(EdgeLineKind, Vec<usize>)> = AHashSet::new();
        let mut duplicates = 0;

        for record in lines {
            if record.vertices.len() < 2 {
                continue;
            }
            let kind = if record.is_conditional() {
                EdgeLineKind::Conditional
            } else {
                EdgeLineKind::Hard
            };

            let resolved: Vec<Option<usize>> = record
                .vertices
                .iter()
                .map(|p| index.nearest_within(p, distance))
                .collect();

            if let Some(key) = line_identity(kind, &resolved) {
                if !emitted.insert((kind, key)) {
                    duplicates += 1;
                    continue;
                }
            }

            let indices = record
                .vertices
                .iter()
                .zip(&resolved)
                .map(|(point, target)| match target {
                    Some(m) => *shared.entry(*m).or_insert_with(|| {
                        edge_mesh.vertices.push(mesh.vertices[*m]);
                        edge_mesh.mesh_vertex.push(Some(*m));
                        edge_mesh.vertices.len() - 1
                    }),
                    None => {
                        edge_mesh.vertices.push(*point);
                        edge_mesh.mesh_vertex.push(None);
                        edge_mesh.vertices.len() - 1
                    }
                })
                .collect();

            edge_mesh.lines.push(EdgeLine { indices, kind });
        }

        debug!(
            lines = edge_mesh.lines.len(),
            vertices = edge_mesh.vertices.len(),
            independent = edge_mesh.independent_vertex_count(),
            duplicates,
            "built edge mesh"
        );

        edge_mesh
    }

    /// Line records for classified edges: every sharp edge and, when
    /// `include_conditional` is set, every conditional line
    pub fn classified_lines(
        mesh: &Mesh,
        classification: &EdgeClassification,
        include_conditional: bool,
    ) -> Vec<EdgeData> {
        let mut lines: Vec<EdgeData> = classification
            .sharp
            .iter()
            .map(|key| EdgeData::line(mesh.vertices[key.0], mesh.vertices[key.1]))
            .collect();

        if include_conditional {
            lines.extend(classification.conditional.iter().map(|line| {
                let [a, b] = line.endpoints;
                let [c1, c2] = line.controls;
                EdgeData::conditional(
                    mesh.vertices[a],
                    mesh.vertices[b],
                    mesh.vertices[c1],
                    mesh.vertices[c2],
                )
            }));
        }
        lines
    }
}

/// Order-independent identity of a fully resolved line, `None` otherwise
fn line_identity(kind: EdgeLineKind, resolved: &[Option<usize>]) -> Option<Vec<usize>> {
    let mut indices: Vec<usize> = resolved.iter().copied().collect::<Option<_>>()?;
    match kind {
        EdgeLineKind::Hard => indices.sort_unstable(),
        EdgeLineKind::Conditional => {
            if indices.len() >= 4 {
                indices[..2].sort_unstable();
                indices[2..4].sort_unstable();
            }
        }
    }
    Some(indices)
}
