// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Unnormalized polygon normal using Newell's method.
///
/// Works for triangles, quads and non-planar n-gons; the length is twice the
/// projected polygon area.
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Unit polygon normal, or the zero vector for degenerate polygons
pub fn polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let normal = newell_normal(points);
    let length = normal.norm();
    if length > f64::EPSILON {
        normal / length
    } else {
        Vector3::zeros()
    }
}

/// Centroid of a set of points
pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Angle in degrees between two unit normals.
///
/// The dot product is clamped to [-1, 1] before `acos` so floating-point
/// drift never produces NaN.
pub fn angle_between_degrees(n1: &Vector3<f64>, n2: &Vector3<f64>) -> f64 {
    n1.dot(n2).clamp(-1.0, 1.0).acos().to_degrees()
}
