// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene description handed to the exporter by the host

use crate::geometry::transforms::export_matrix;
use crate::geometry::Mesh;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// LDraw metadata stored on a scene object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LDrawProps {
    pub description: String,
    pub name: String,
    pub author: String,
    pub part_type: Option<String>,
    pub optional_qualifier: Option<String>,
    pub update_date: Option<String>,
    pub license: Option<String>,
    /// Referenced file for type 1 lines
    pub filename: String,
    pub color_code: String,
    /// Write the mesh as type 2/3/4/5 lines instead of a type 1 reference
    pub export_polygons: bool,
    /// Emit conditional lines for the object's soft edges
    pub export_shade_smooth: bool,
    /// Decimal places; `None` uses the exporter's setting
    pub export_precision: Option<u32>,
    pub invert_import_scale_matrix: bool,
    pub invert_gap_scale_matrix: bool,
}

impl Default for LDrawProps {
    fn default() -> Self {
        Self {
            description: String::new(),
            name: String::new(),
            author: String::new(),
            part_type: None,
            optional_qualifier: None,
            update_date: None,
            license: None,
            filename: String::new(),
            color_code: "16".to_string(),
            export_polygons: false,
            export_shade_smooth: false,
            export_precision: None,
            invert_import_scale_matrix: false,
            invert_gap_scale_matrix: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default)]
    pub props: LDrawProps,
    /// World transform with parent transforms already applied.
    /// Serialized as 16 column-major values.
    #[serde(default = "identity")]
    pub matrix_world: Matrix4<f64>,
    #[serde(default)]
    pub parent: Option<usize>,
    /// `None` for empties
    #[serde(default)]
    pub mesh: Option<Mesh>,
    #[serde(default)]
    pub selected: bool,
    /// Objects left over from a failed run are not linked to the scene
    #[serde(default = "linked_default")]
    pub linked: bool,
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: LDrawProps::default(),
            matrix_world: Matrix4::identity(),
            parent: None,
            mesh: None,
            selected: false,
            linked: true,
        }
    }

    pub fn with_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        let mut object = Self::new(name);
        object.mesh = Some(mesh);
        object.props.export_polygons = true;
        object
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportScene {
    pub objects: Vec<SceneObject>,
    /// Index of the active object, whose props provide the file header
    #[serde(default)]
    pub active: Option<usize>,
}

impl ExportScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn active_object(&self) -> Option<&SceneObject> {
        self.active.and_then(|i| self.objects.get(i))
    }

    /// Transform that takes an object's geometry back into LDraw space
    pub fn export_matrix(&self, index: usize, import_scale: f64, gap_scale: f64) -> Matrix4<f64> {
        let object = &self.objects[index];
        let parent_inverts = object
            .parent
            .and_then(|p| self.objects.get(p))
            .is_some_and(|parent| parent.props.invert_import_scale_matrix);
        let invert_import = parent_inverts || object.props.invert_import_scale_matrix;

        export_matrix(
            &object.matrix_world,
            invert_import.then_some(import_scale),
            object.props.invert_gap_scale_matrix.then_some(gap_scale),
        )
    }
}

fn linked_default() -> bool {
    true
}

fn identity() -> Matrix4<f64> {
    Matrix4::identity()
}
