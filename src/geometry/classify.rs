// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Dihedral-angle edge classification
//!
//! Every edge shared by exactly two polygons is bucketed by the angle between
//! the polygon normals:
//!
//! | angle                        | class        | emitted as          |
//! |------------------------------|--------------|---------------------|
//! | `< flat_angle`               | flat         | nothing             |
//! | `[flat_angle, sharp_angle)`  | conditional  | type 5 (if enabled) |
//! | `>= sharp_angle`             | sharp        | type 2              |
//!
//! Explicitly sharp edges are sharp whatever their angle or face count; other
//! boundary and non-manifold edges are never classified.

use super::adjacency::{EdgeKey, FaceAdjacency};
use super::mesh::{Mesh, Polygon};
use crate::utils::math::angle_between_degrees;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Angle bucket boundaries in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeThresholds {
    pub flat_angle: f64,
    pub sharp_angle: f64,
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            flat_angle: 1.0,
            sharp_angle: 60.0,
        }
    }
}

/// Angle bucket of a manifold edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeClass {
    Flat,
    Conditional,
    Sharp,
}

/// Type 5 line: the shared edge plus one control vertex from each adjacent face
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConditionalLine {
    /// `[pin, other]`; the pin is the smaller vertex index
    pub endpoints: [usize; 2],
    pub controls: [usize; 2],
}

impl ConditionalLine {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.endpoints[0], self.endpoints[1])
    }
}

/// Result of [`EdgeClassifier::classify`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeClassification {
    /// Ascending
    pub sharp: Vec<EdgeKey>,
    /// Ascending by edge
    pub conditional: Vec<ConditionalLine>,
    /// Ascending
    pub flat: Vec<EdgeKey>,
    /// Dihedral angle of every manifold edge with usable normals
    pub angles: BTreeMap<EdgeKey, f64>,
}

impl EdgeClassification {
    pub fn is_sharp(&self, key: &EdgeKey) -> bool {
        self.sharp.binary_search(key).is_ok()
    }

    pub fn conditional_for(&self, key: &EdgeKey) -> Option<&ConditionalLine> {
        self.conditional
            .binary_search_by(|line| line.key().cmp(key))
            .ok()
            .map(|i| &self.conditional[i])
    }

    pub fn sharp_set(&self) -> BTreeSet<EdgeKey> {
        self.sharp.iter().copied().collect()
    }
}

/// Classifies mesh edges by dihedral angle
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeClassifier {
    thresholds: EdgeThresholds,
}

impl EdgeClassifier {
    pub fn new(thresholds: EdgeThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> EdgeThresholds {
        self.thresholds
    }

    /// Bucket an angle in degrees
    pub fn bucket(&self, angle: f64) -> EdgeClass {
        if angle < self.thresholds.flat_angle {
            EdgeClass::Flat
        } else if angle < self.thresholds.sharp_angle {
            EdgeClass::Conditional
        } else {
            EdgeClass::Sharp
        }
    }

    /// Classify every edge of `adjacency`.
    ///
    /// Polygon normals are read from the mesh as stored; run
    /// [`Mesh::recompute_face_normals`] first if the positions changed.
    pub fn classify(
        &self,
        mesh: &Mesh,
        adjacency: &FaceAdjacency,
        explicit_sharp: &BTreeSet<EdgeKey>,
    ) -> EdgeClassification {
        let mut sharp: BTreeSet<EdgeKey> = explicit_sharp.clone();
        let mut conditional = Vec::new();
        let mut flat = Vec::new();
        let mut angles = BTreeMap::new();

        for (key, faces) in adjacency.iter() {
            let &[f1, f2] = faces.as_slice() else {
                continue;
            };
            let n1 = &mesh.polygons[f1].normal;
            let n2 = &mesh.polygons[f2].normal;
            if n1.norm_squared() == 0.0 || n2.norm_squared() == 0.0 {
                continue;
            }

            let angle = angle_between_degrees(n1, n2);
            angles.insert(*key, angle);
            if explicit_sharp.contains(key) {
                continue;
            }

            match self.bucket(angle) {
                EdgeClass::Flat => flat.push(*key),
                EdgeClass::Sharp => {
                    sharp.insert(*key);
                }
                EdgeClass::Conditional => {
                    match conditional_line(&mesh.polygons[f1], &mesh.polygons[f2], key) {
                        Some(line) => conditional.push(line),
                        None => debug!(?key, "no control points for conditional edge"),
                    }
                }
            }
        }

        debug!(
            sharp = sharp.len(),
            conditional = conditional.len(),
            flat = flat.len(),
            "classified edges"
        );

        EdgeClassification {
            sharp: sharp.into_iter().collect(),
            conditional,
            flat,
            angles,
        }
    }
}

/// Build the type 5 primitive for `key` shared by `first` and `second`.
///
/// The pin is `key.0`. From each face, the first of its other edges touching
/// the pin contributes its far endpoint as control point.
pub fn conditional_line(first: &Polygon, second: &Polygon, key: &EdgeKey) -> Option<ConditionalLine> {
    let pin = key.0;
    let c1 = control_point(first, key, pin)?;
    let c2 = control_point(second, key, pin)?;
    Some(ConditionalLine {
        endpoints: [key.0, key.1],
        controls: [c1, c2],
    })
}

fn control_point(polygon: &Polygon, key: &EdgeKey, pin: usize) -> Option<usize> {
    polygon
        .edge_keys()
        .into_iter()
        .filter(|edge| edge != key)
        .find(|edge| edge.contains(pin))
        .and_then(|edge| edge.other(pin))
}
