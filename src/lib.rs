// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! LDraw geometry core
//!
//! Turns parsed LDraw parts into welded, material-partitioned meshes with
//! classified hard and conditional edges, and serializes scene meshes back
//! into LDraw primitive lines.

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod ldraw;
pub mod utils;

pub use config::{ExportOptions, ImportOptions};
pub use error::ExportError;
pub use geometry::{
    EdgeClassification, EdgeClassifier, EdgeMesh, EdgeMeshBuilder, Mesh, MeshBuilder, SpatialIndex,
};
pub use io::{export_ldraw, import_part, ExportScene, ImportedPart, LineSerializer};
pub use ldraw::{ColorTable, GeometryData, PipelineCaches};

use anyhow::Result;

/// Import one part with fresh caches
pub fn import(geometry: &GeometryData, base_color: &str, options: &ImportOptions) -> Result<ImportedPart> {
    let mut caches = PipelineCaches::new();
    import_part(geometry, base_color, options, &mut caches)
}

/// Serialize a scene to LDraw lines with the default color table
pub fn serialize(scene: &ExportScene, options: &ExportOptions) -> Result<Vec<String>> {
    let colors = ColorTable::with_defaults();
    Ok(LineSerializer::new(options, &colors).serialize(scene)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldraw::FaceData;
    use nalgebra::Point3;

    #[test]
    fn test_basic_triangle() {
        let mut geometry = GeometryData::new("tri.dat");
        geometry.add_face(FaceData::triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            "16",
        ));
        let part = import(&geometry, "4", &ImportOptions::default());
        assert!(part.is_ok());
        assert_eq!(part.unwrap().mesh.polygon_count(), 1);
    }
}
