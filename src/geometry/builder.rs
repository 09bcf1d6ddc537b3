// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Builds a welded, material-partitioned mesh from parsed LDraw faces

use super::mesh::{Material, Mesh, Polygon};
use crate::config::ImportOptions;
use crate::ldraw::{FaceData, PartCache, INHERIT_COLOR_CODE};
use crate::utils::math::{angle_between_degrees, polygon_normal};
use nalgebra::{Point2, Vector3};
use tracing::debug;

/// Per-part facts the builder needs besides the faces themselves
pub struct PartContext<'a> {
    /// File name of the part, used for the slope and cloth lookups
    pub filename: &'a str,
    pub bfc_certified: bool,
    pub parts: &'a mut PartCache,
}

/// Turns face primitives into a [`Mesh`]
pub struct MeshBuilder<'a> {
    options: &'a ImportOptions,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(options: &'a ImportOptions) -> Self {
        Self { options }
    }

    /// Build the mesh of one part.
    ///
    /// Faces get fresh vertices; coincident corners are merged afterwards by
    /// the weld pass when `remove_doubles` is set. Faces coloured `16` take
    /// `base_color`.
    pub fn build(&self, faces: &[FaceData], base_color: &str, context: &mut PartContext<'_>) -> Mesh {
        let vertex_total = faces.iter().map(|f| f.vertices.len()).sum();
        let mut mesh = Mesh::with_capacity(vertex_total, faces.len());

        let slopes = context.parts.part_slopes(context.filename);
        let cloth = context.parts.is_cloth(context.filename);
        let mut skipped = 0;

        for face in faces {
            if face.vertices.len() < 3 {
                skipped += 1;
                continue;
            }

            let color = if face.color_code == INHERIT_COLOR_CODE {
                base_color
            } else {
                face.color_code.as_str()
            };

            let normal = polygon_normal(&face.vertices);
            let slope = slopes.as_ref().is_some_and(|ranges| {
                normal.norm_squared() > 0.0 && {
                    let inclination = angle_between_degrees(&normal, &stud_axis());
                    ranges.iter().any(|range| range.contains(inclination))
                }
            });

            let (texture, uvs) = face_texture(face);
            let material = Material::new(color, texture, context.bfc_certified, slope, cloth);
            let material_index = mesh.ensure_material(material);

            let indices = face.vertices.iter().map(|v| mesh.add_vertex(*v)).collect();
            let mut polygon = Polygon::new(indices, material_index);
            polygon.smooth = self.options.shade_smooth;
            polygon.uvs = uvs;
            mesh.add_polygon(polygon);
        }

        if skipped > 0 {
            debug!(skipped, part = context.filename, "skipped faces with fewer than three corners");
        }

        if self.options.remove_doubles {
            mesh.weld_vertices(self.options.merge_distance);
        } else {
            mesh.remove_degenerate_polygons();
            mesh.compact_vertices();
        }

        if self.options.recalculate_normals {
            mesh.recalculate_normals();
        }

        debug!(
            part = context.filename,
            vertices = mesh.vertex_count(),
            polygons = mesh.polygon_count(),
            materials = mesh.materials.len(),
            "built mesh"
        );

        mesh
    }
}

/// LDraw's up direction is -Y
fn stud_axis() -> Vector3<f64> {
    Vector3::new(0.0, -1.0, 0.0)
}

/// Texture name and per-corner UVs; `!PE_TEX_INFO` data wins over `!TEXMAP`
fn face_texture(face: &FaceData) -> (Option<&str>, Option<Vec<Point2<f64>>>) {
    if let Some(pe_texmap) = &face.pe_texmap {
        if let Some(uvs) = pe_texmap.uvs_for(face.vertices.len()) {
            return (Some(pe_texmap.texture.as_str()), Some(uvs));
        }
    }
    if let Some(texmap) = &face.texmap {
        if let Some(uvs) = texmap.uvs_for(&face.vertices) {
            return (Some(texmap.texture.as_str()), Some(uvs));
        }
    }
    (None, None)
}
