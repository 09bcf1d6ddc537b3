// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fixed transforms between LDraw units/axes and the host scene

use nalgebra::{Matrix4, Vector3};
use std::f64::consts::FRAC_PI_2;

/// LDraw is -Y up; the host is +Z up. Rotates -90 degrees about X.
pub fn rotation_matrix() -> Matrix4<f64> {
    Matrix4::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2)
}

/// LDU to scene units
pub fn import_scale_matrix(scale: f64) -> Matrix4<f64> {
    Matrix4::new_scaling(scale)
}

/// Shrinks parts slightly so neighbouring bricks do not touch
pub fn gap_scale_matrix(scale: f64) -> Matrix4<f64> {
    Matrix4::new_scaling(scale)
}

/// Matrix that takes an object back to LDraw space for a type 1 line.
///
/// Computes `R⁻¹ · [S⁻¹] · world · [G⁻¹]`, where the import scale `S` and the
/// gap scale `G` are undone only when given.
pub fn export_matrix(
    world: &Matrix4<f64>,
    import_scale: Option<f64>,
    gap_scale: Option<f64>,
) -> Matrix4<f64> {
    let mut matrix = *world;
    if let Some(scale) = import_scale {
        matrix = import_scale_matrix(1.0 / scale) * matrix;
    }
    if let Some(scale) = gap_scale {
        matrix *= gap_scale_matrix(1.0 / scale);
    }
    rotation_matrix().transpose() * matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_rotation_maps_ldraw_up_to_z() {
        // One LDU "up" in LDraw is -Y
        let up = rotation_matrix().transform_point(&Point3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(up, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-12);

        let forward = rotation_matrix().transform_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(forward, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_export_matrix_undoes_import() {
        let placement = Matrix4::new_translation(&Vector3::new(20.0, -24.0, 40.0));
        let world = rotation_matrix() * import_scale_matrix(0.02) * placement * gap_scale_matrix(0.997);

        let recovered = export_matrix(&world, Some(0.02), Some(0.997));
        assert_relative_eq!(recovered, placement, epsilon = 1e-9);
    }

    #[test]
    fn test_export_matrix_without_inversions_only_rotates() {
        let world = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0));
        let matrix = export_matrix(&world, None, None);
        let origin = matrix.transform_point(&Point3::origin());
        // Host (x, y, z) goes back to LDraw (x, -z, y)
        assert_relative_eq!(origin, Point3::new(1.0, -3.0, 2.0), epsilon = 1e-12);
    }
}
