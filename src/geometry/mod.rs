// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, welding and edge analysis

mod adjacency;
mod builder;
mod classify;
mod edge_mesh;
mod mesh;
mod spatial_index;
pub mod transforms;

pub use adjacency::{polygon_edge_keys, EdgeKey, FaceAdjacency};
pub use builder::{MeshBuilder, PartContext};
pub use classify::{
    conditional_line, ConditionalLine, EdgeClass, EdgeClassification, EdgeClassifier, EdgeThresholds,
};
pub use edge_mesh::{EdgeLine, EdgeLineKind, EdgeMesh, EdgeMeshBuilder};
pub use mesh::{EdgeFlags, Material, Mesh, Polygon};
pub use spatial_index::{edge_match_distance, SpatialIndex, EDGE_MATCH_FACTOR};
