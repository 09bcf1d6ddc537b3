// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Texture mapping references attached to faces
//!
//! Both kinds resolve to per-corner UVs or to `None`, in which case the face is
//! built untextured.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Projection used by a `!TEXMAP` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TexMapMethod {
    Planar,
    Cylindrical,
    Spherical,
}

/// `!TEXMAP` projection reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TexMap {
    pub method: TexMapMethod,
    pub texture: String,
    /// P1, P2, P3 of the projection
    pub points: [Point3<f64>; 3],
}

impl TexMap {
    pub fn planar(texture: impl Into<String>, points: [Point3<f64>; 3]) -> Self {
        Self {
            method: TexMapMethod::Planar,
            texture: texture.into(),
            points,
        }
    }

    /// UVs for the face corners.
    ///
    /// Planar projections map P1→P2 to U and P1→P3 to V. Cylindrical and spherical
    /// projections are not derived.
    pub fn uvs_for(&self, corners: &[Point3<f64>]) -> Option<Vec<Point2<f64>>> {
        match self.method {
            TexMapMethod::Planar => {
                let [p1, p2, p3] = self.points;
                let u_axis = p2 - p1;
                let v_axis = p3 - p1;
                let u_len2 = u_axis.norm_squared();
                let v_len2 = v_axis.norm_squared();
                if u_len2 <= f64::EPSILON || v_len2 <= f64::EPSILON {
                    return None;
                }
                Some(
                    corners
                        .iter()
                        .map(|c| {
                            let d = c - p1;
                            Point2::new(d.dot(&u_axis) / u_len2, d.dot(&v_axis) / v_len2)
                        })
                        .collect(),
                )
            }
            TexMapMethod::Cylindrical | TexMapMethod::Spherical => None,
        }
    }
}

/// `!PE_TEX_INFO` texture with UVs stored after the vertex coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeTexMap {
    pub texture: String,
    pub uvs: Vec<Point2<f64>>,
}

impl PeTexMap {
    pub fn uvs_for(&self, vertex_count: usize) -> Option<Vec<Point2<f64>>> {
        (self.uvs.len() == vertex_count).then(|| self.uvs.clone())
    }
}
