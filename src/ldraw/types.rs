// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parsed LDraw geometry handed over by the file parser

use super::{PeTexMap, TexMap, INHERIT_COLOR_CODE};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A line type 3 or 4 primitive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceData {
    pub vertices: Vec<Point3<f64>>,
    #[serde(default = "inherit_color")]
    pub color_code: String,
    #[serde(default)]
    pub texmap: Option<TexMap>,
    #[serde(default)]
    pub pe_texmap: Option<PeTexMap>,
}

impl FaceData {
    pub fn new(vertices: Vec<Point3<f64>>, color_code: impl Into<String>) -> Self {
        Self {
            vertices,
            color_code: color_code.into(),
            texmap: None,
            pe_texmap: None,
        }
    }

    pub fn triangle(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>, color_code: &str) -> Self {
        Self::new(vec![a, b, c], color_code)
    }

    pub fn quad(
        a: Point3<f64>,
        b: Point3<f64>,
        c: Point3<f64>,
        d: Point3<f64>,
        color_code: &str,
    ) -> Self {
        Self::new(vec![a, b, c, d], color_code)
    }
}

/// A line type 2 (two points) or type 5 (two points plus two control points) primitive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData {
    pub vertices: Vec<Point3<f64>>,
    /// Set for author-drawn hard edges (line type 2)
    #[serde(default)]
    pub sharp: bool,
}

impl EdgeData {
    pub fn line(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            vertices: vec![a, b],
            sharp: true,
        }
    }

    pub fn conditional(a: Point3<f64>, b: Point3<f64>, c1: Point3<f64>, c2: Point3<f64>) -> Self {
        Self {
            vertices: vec![a, b, c1, c2],
            sharp: false,
        }
    }

    pub fn is_conditional(&self) -> bool {
        self.vertices.len() == 4 && !self.sharp
    }

    /// First two points, the segment the record draws
    pub fn endpoints(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        match self.vertices.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }
}

/// Geometry of one LDraw file, flattened by the parser
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometryData {
    /// File name the geometry was read from, e.g. `3001.dat`
    pub name: String,
    #[serde(default)]
    pub face_data: Vec<FaceData>,
    #[serde(default)]
    pub edge_data: Vec<EdgeData>,
    #[serde(default)]
    pub bfc_certified: bool,
}

impl GeometryData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_face(&mut self, face: FaceData) {
        self.face_data.push(face);
    }

    pub fn add_edge(&mut self, edge: EdgeData) {
        self.edge_data.push(edge);
    }
}

fn inherit_color() -> String {
    INHERIT_COLOR_CODE.to_string()
}
