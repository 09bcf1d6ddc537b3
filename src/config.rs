// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Import and export options

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How smooth shading is separated from hard edges on import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothType {
    /// Mark matched mesh edges sharp
    EdgeSplit,
    /// Record an auto-smooth angle on the mesh
    AutoSmooth,
    /// Split the geometry along sharp edges
    BmeshSplit,
}

/// What the exporter does with faces of more than four corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NgonHandling {
    Triangulate,
    Skip,
}

/// Where the LDU → scene scale is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleStrategy {
    Mesh,
    Object,
}

/// Where the inter-brick gap scale is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapTarget {
    Mesh,
    Object,
}

/// Options for building a part mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub remove_doubles: bool,
    /// Overwrites any BFC winding when enabled
    pub recalculate_normals: bool,
    pub merge_distance: f64,
    pub smooth_type: SmoothType,
    pub shade_smooth: bool,
    pub auto_smooth_angle: f64,
    pub import_edges: bool,
    pub make_gaps: bool,
    pub gap_target: GapTarget,
    pub gap_scale: f64,
    pub bevel_edges: bool,
    pub bevel_weight: f64,
    pub use_freestyle_edges: bool,
    pub scale_strategy: ScaleStrategy,
    pub import_scale: f64,
    /// Below this dihedral angle an edge is flat
    pub flat_angle: f64,
    /// At or above this dihedral angle an edge is sharp
    pub sharp_angle: f64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            remove_doubles: true,
            recalculate_normals: true,
            merge_distance: 0.05,
            smooth_type: SmoothType::EdgeSplit,
            shade_smooth: true,
            auto_smooth_angle: 89.9,
            import_edges: true,
            make_gaps: false,
            gap_target: GapTarget::Mesh,
            gap_scale: 0.997,
            bevel_edges: false,
            bevel_weight: 0.3,
            use_freestyle_edges: false,
            scale_strategy: ScaleStrategy::Mesh,
            import_scale: 0.02,
            flat_angle: 1.0,
            sharp_angle: 60.0,
        }
    }
}

/// Options for writing LDraw lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub remove_doubles: bool,
    pub recalculate_normals: bool,
    pub merge_distance: f64,
    pub triangulate: bool,
    pub ngon_handling: NgonHandling,
    pub selection_only: bool,
    /// Fallback precision for objects that do not set their own
    pub export_precision: u32,
    pub flat_angle: f64,
    pub sharp_angle: f64,
    /// Scales undone for objects flagged `invert_import_scale_matrix`
    pub import_scale: f64,
    pub gap_scale: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            remove_doubles: true,
            recalculate_normals: true,
            merge_distance: 0.05,
            triangulate: false,
            ngon_handling: NgonHandling::Triangulate,
            selection_only: true,
            export_precision: 2,
            flat_angle: 1.0,
            sharp_angle: 60.0,
            import_scale: 0.02,
            gap_scale: 0.997,
        }
    }
}

macro_rules! impl_toml_io {
    ($ty:ty) => {
        impl $ty {
            /// Load options from a TOML file; missing keys keep their defaults
            pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
                let content = std::fs::read_to_string(path.as_ref())
                    .with_context(|| format!("Failed to read options file: {:?}", path.as_ref()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse options file: {:?}", path.as_ref()))
            }

            /// Save options to a TOML file
            pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
                let content = toml::to_string_pretty(self).context("Failed to serialize options")?;
                std::fs::write(path.as_ref(), content)
                    .with_context(|| format!("Failed to write options file: {:?}", path.as_ref()))?;
                Ok(())
            }
        }
    };
}

impl_toml_io!(ImportOptions);
impl_toml_io!(ExportOptions);
