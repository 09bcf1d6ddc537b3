// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge keys and edge → face adjacency

use super::Polygon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Undirected edge, smaller vertex index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey(pub usize, pub usize);

impl EdgeKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn contains(&self, vertex: usize) -> bool {
        self.0 == vertex || self.1 == vertex
    }

    /// The endpoint that is not `vertex`
    pub fn other(&self, vertex: usize) -> Option<usize> {
        if self.0 == vertex {
            Some(self.1)
        } else if self.1 == vertex {
            Some(self.0)
        } else {
            None
        }
    }
}

/// Edge keys of a polygon loop, in loop order
pub fn polygon_edge_keys(indices: &[usize]) -> Vec<EdgeKey> {
    let n = indices.len();
    (0..n)
        .map(|i| EdgeKey::new(indices[i], indices[(i + 1) % n]))
        .filter(|key| key.0 != key.1)
        .collect()
}

/// Whether the loop walks `a -> b` (Some(true)), `b -> a` (Some(false)) or
/// does not contain the edge
pub fn edge_direction(indices: &[usize], a: usize, b: usize) -> Option<bool> {
    let n = indices.len();
    for i in 0..n {
        let v0 = indices[i];
        let v1 = indices[(i + 1) % n];
        if v0 == a && v1 == b {
            return Some(true);
        }
        if v0 == b && v1 == a {
            return Some(false);
        }
    }
    None
}

/// Map from edge to the polygons sharing it.
///
/// Face lists are ascending and free of repeats, so iteration order is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct FaceAdjacency {
    edges: BTreeMap<EdgeKey, Vec<usize>>,
}

impl FaceAdjacency {
    pub fn build(polygons: &[Polygon]) -> Self {
        let mut edges: BTreeMap<EdgeKey, Vec<usize>> = BTreeMap::new();
        for (face, polygon) in polygons.iter().enumerate() {
            for key in polygon_edge_keys(&polygon.indices) {
                let faces = edges.entry(key).or_default();
                if faces.last() != Some(&face) {
                    faces.push(face);
                }
            }
        }
        Self { edges }
    }

    /// Build from explicit entries, e.g. to control face order in tests
    pub fn from_entries(entries: impl IntoIterator<Item = (EdgeKey, Vec<usize>)>) -> Self {
        Self {
            edges: entries.into_iter().collect(),
        }
    }

    pub fn faces(&self, key: &EdgeKey) -> &[usize] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Exactly two adjacent faces
    pub fn is_manifold(&self, key: &EdgeKey) -> bool {
        self.faces(key).len() == 2
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EdgeKey, &Vec<usize>)> {
        self.edges.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges used by exactly one face
    pub fn boundary_edges(&self) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(key, _)| *key)
            .collect()
    }
}
