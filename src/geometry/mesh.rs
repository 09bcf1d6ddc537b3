// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon mesh arena: vertices, polygons, material slots and edge flags

use super::adjacency::{edge_direction, polygon_edge_keys, EdgeKey, FaceAdjacency};
use super::spatial_index::SpatialIndex;
use crate::utils::math::{centroid, polygon_normal};
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, info};

/// Polygon referencing mesh vertices by index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    pub indices: Vec<usize>,
    #[serde(default)]
    pub material_index: usize,
    #[serde(default)]
    pub smooth: bool,
    /// Unit normal following the winding, zero for degenerate polygons
    #[serde(default = "zero_normal")]
    pub normal: Vector3<f64>,
    /// One UV per corner when the face is textured
    #[serde(default)]
    pub uvs: Option<Vec<Point2<f64>>>,
}

impl Polygon {
    pub fn new(indices: Vec<usize>, material_index: usize) -> Self {
        Self {
            indices,
            material_index,
            smooth: false,
            normal: Vector3::zeros(),
            uvs: None,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        polygon_edge_keys(&self.indices)
    }

    /// Reverse the winding
    pub fn flip(&mut self) {
        self.indices.reverse();
        if let Some(uvs) = &mut self.uvs {
            uvs.reverse();
        }
        self.normal = -self.normal;
    }

    fn distinct_vertex_count(&self) -> usize {
        let mut sorted = self.indices.clone();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.len()
    }

    /// Drop corners that repeat their predecessor, wrapping around
    fn collapse_repeats(&mut self) {
        let mut indices = Vec::with_capacity(self.indices.len());
        let mut uvs = self.uvs.as_ref().map(|_| Vec::with_capacity(self.indices.len()));

        for (corner, &index) in self.indices.iter().enumerate() {
            if indices.last() == Some(&index) {
                continue;
            }
            indices.push(index);
            if let (Some(kept), Some(source)) = (&mut uvs, &self.uvs) {
                kept.push(source[corner]);
            }
        }
        while indices.len() > 1 && indices.first() == indices.last() {
            indices.pop();
            if let Some(kept) = &mut uvs {
                kept.pop();
            }
        }

        self.indices = indices;
        self.uvs = uvs;
    }
}

/// Material slot of a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub color_code: String,
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub bfc_certified: bool,
    #[serde(default)]
    pub slope: bool,
    #[serde(default)]
    pub cloth: bool,
}

impl Material {
    pub fn new(
        color_code: &str,
        texture: Option<&str>,
        bfc_certified: bool,
        slope: bool,
        cloth: bool,
    ) -> Self {
        let mut name = format!("Material_{}", color_code);
        if let Some(texture) = texture {
            name.push('_');
            name.push_str(texture);
        }
        if bfc_certified {
            name.push_str("_bfc");
        }
        if slope {
            name.push_str("_slope");
        }
        if cloth {
            name.push_str("_cloth");
        }

        Self {
            name,
            color_code: color_code.to_string(),
            texture: texture.map(str::to_string),
            bfc_certified,
            slope,
            cloth,
        }
    }

    /// Plain colored material
    pub fn from_color(color_code: &str) -> Self {
        Self::new(color_code, None, false, false, false)
    }
}

/// Per-edge marks consumed by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeFlags {
    pub sharp: bool,
    pub freestyle: bool,
    pub bevel_weight: Option<f64>,
}

impl EdgeFlags {
    fn merge(&mut self, other: &EdgeFlags) {
        self.sharp |= other.sharp;
        self.freestyle |= other.freestyle;
        self.bevel_weight = match (self.bevel_weight, other.bevel_weight) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

/// Polygon mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub polygons: Vec<Polygon>,
    pub materials: Vec<Material>,
    #[serde(with = "edge_flag_list")]
    pub edge_flags: BTreeMap<EdgeKey, EdgeFlags>,
    /// Degrees, set when the host should auto-smooth
    pub auto_smooth_angle: Option<f64>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, polygon_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            polygons: Vec::with_capacity(polygon_count),
            ..Self::default()
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    /// Add a polygon, computing its normal, and return its index
    pub fn add_polygon(&mut self, mut polygon: Polygon) -> usize {
        polygon.normal = polygon_normal(&self.points_of(&polygon.indices));
        self.polygons.push(polygon);
        self.polygons.len() - 1
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn points_of(&self, indices: &[usize]) -> Vec<Point3<f64>> {
        indices.iter().map(|&i| self.vertices[i]).collect()
    }

    pub fn polygon_points(&self, polygon: usize) -> Vec<Point3<f64>> {
        self.points_of(&self.polygons[polygon].indices)
    }

    /// Every edge used by a polygon
    pub fn edge_keys(&self) -> BTreeSet<EdgeKey> {
        self.polygons
            .iter()
            .flat_map(|polygon| polygon.edge_keys())
            .collect()
    }

    pub fn adjacency(&self) -> FaceAdjacency {
        FaceAdjacency::build(&self.polygons)
    }

    pub fn find_material(&self, name: &str) -> Option<usize> {
        self.materials.iter().position(|m| m.name == name)
    }

    /// Slot index of the material, appending it if no slot has its name
    pub fn ensure_material(&mut self, material: Material) -> usize {
        match self.find_material(&material.name) {
            Some(index) => index,
            None => {
                self.materials.push(material);
                self.materials.len() - 1
            }
        }
    }

    pub fn edge_flags(&self, key: &EdgeKey) -> EdgeFlags {
        self.edge_flags.get(key).copied().unwrap_or_default()
    }

    pub fn edge_flags_mut(&mut self, key: EdgeKey) -> &mut EdgeFlags {
        self.edge_flags.entry(key).or_default()
    }

    pub fn mark_sharp(&mut self, key: EdgeKey) {
        self.edge_flags_mut(key).sharp = true;
    }

    pub fn is_sharp(&self, key: &EdgeKey) -> bool {
        self.edge_flags(key).sharp
    }

    pub fn sharp_edges(&self) -> BTreeSet<EdgeKey> {
        self.edge_flags
            .iter()
            .filter(|(_, flags)| flags.sharp)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Recompute every polygon normal from its current winding
    pub fn recompute_face_normals(&mut self) {
        for i in 0..self.polygons.len() {
            let normal = polygon_normal(&self.polygon_points(i));
            self.polygons[i].normal = normal;
        }
    }

    /// Merge vertices closer than `distance` (inclusive) into one.
    ///
    /// Single pass in vertex order: the first unmerged vertex of a cluster keeps
    /// its position and absorbs every unmerged vertex in range. No two
    /// surviving vertices are within `distance` of each other afterwards, so a
    /// second pass changes nothing. Polygons left with fewer than three
    /// distinct corners are dropped and unreferenced vertices removed.
    /// Returns the number of vertices removed.
    pub fn weld_vertices(&mut self, distance: f64) -> usize {
        if self.vertices.is_empty() {
            return 0;
        }

        let original_count = self.vertices.len();
        let index = SpatialIndex::build(&self.vertices);
        let mut remap = vec![usize::MAX; original_count];
        let mut welded: Vec<Point3<f64>> = Vec::with_capacity(original_count);

        for i in 0..original_count {
            if remap[i] != usize::MAX {
                continue;
            }
            let target = welded.len();
            welded.push(self.vertices[i]);
            remap[i] = target;

            for j in index.query_range(&self.vertices[i], distance) {
                if remap[j] == usize::MAX {
                    remap[j] = target;
                }
            }
        }

        self.vertices = welded;
        self.remap_indices(&remap);
        self.remove_degenerate_polygons();
        self.compact_vertices();

        let removed = original_count - self.vertices.len();
        debug!(removed, remaining = self.vertices.len(), distance, "welded vertices");
        removed
    }

    /// Rewrite polygon corners and edge flags through `remap` (old → new)
    fn remap_indices(&mut self, remap: &[usize]) {
        for polygon in &mut self.polygons {
            for index in &mut polygon.indices {
                *index = remap[*index];
            }
        }

        let mut flags: BTreeMap<EdgeKey, EdgeFlags> = BTreeMap::new();
        for (key, edge_flags) in std::mem::take(&mut self.edge_flags) {
            let (a, b) = (remap[key.0], remap[key.1]);
            if a == b || a == usize::MAX || b == usize::MAX {
                continue;
            }
            flags.entry(EdgeKey::new(a, b)).or_default().merge(&edge_flags);
        }
        self.edge_flags = flags;
    }

    /// Drop polygons with fewer than three distinct corners.
    /// Returns the number of polygons removed.
    pub fn remove_degenerate_polygons(&mut self) -> usize {
        let original_count = self.polygons.len();
        self.polygons.retain_mut(|polygon| {
            polygon.collapse_repeats();
            polygon.distinct_vertex_count() >= 3
        });

        let removed = original_count - self.polygons.len();
        if removed > 0 {
            debug!(removed, "dropped degenerate polygons");
        }
        removed
    }

    /// Remove vertices no polygon references.
    /// Returns the number of vertices removed.
    pub fn compact_vertices(&mut self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for polygon in &self.polygons {
            for &index in &polygon.indices {
                used[index] = true;
            }
        }

        let mut remap = vec![usize::MAX; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len());
        for (i, vertex) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = kept.len();
                kept.push(*vertex);
            }
        }

        let removed = self.vertices.len() - kept.len();
        if removed > 0 {
            self.vertices = kept;
            self.remap_indices(&remap);
        }
        removed
    }

    /// Make winding consistent and outward facing, then recompute normals.
    ///
    /// Each connected component (through manifold edges) is flood-filled so
    /// shared edges are walked in opposite directions; a component enclosing
    /// negative volume is then flipped as a whole. Any winding the source data
    /// encoded (BFC) is overwritten.
    pub fn recalculate_normals(&mut self) {
        let face_count = self.polygons.len();
        if face_count == 0 {
            return;
        }

        let adjacency = self.adjacency();
        let mut visited = vec![false; face_count];
        let mut flip = vec![false; face_count];
        let mut components: Vec<Vec<usize>> = Vec::new();

        for start in 0..face_count {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);

            while let Some(face) = queue.pop_front() {
                component.push(face);
                let indices = &self.polygons[face].indices;
                let n = indices.len();

                for i in 0..n {
                    let (a, b) = (indices[i], indices[(i + 1) % n]);
                    let key = EdgeKey::new(a, b);
                    if a == b || !adjacency.is_manifold(&key) {
                        continue;
                    }

                    for &neighbor in adjacency.faces(&key) {
                        if neighbor == face || visited[neighbor] {
                            continue;
                        }
                        visited[neighbor] = true;

                        // Stored `face` walks a -> b; the neighbour must end up walking b -> a
                        let same_direction =
                            edge_direction(&self.polygons[neighbor].indices, a, b).unwrap_or(false);
                        flip[neighbor] = same_direction != flip[face];
                        queue.push_back(neighbor);
                    }
                }
            }
            components.push(component);
        }

        let mut flipped = 0;
        for (polygon, &should_flip) in self.polygons.iter_mut().zip(&flip) {
            if should_flip {
                polygon.flip();
                flipped += 1;
            }
        }

        for component in &components {
            if self.signed_volume(component) < -self.volume_tolerance(component) {
                for &face in component {
                    self.polygons[face].flip();
                }
                flipped += component.len();
            }
        }

        self.recompute_face_normals();

        if flipped > 0 {
            info!(
                flipped,
                components = components.len(),
                "recalculated normals"
            );
        }
    }

    /// Signed volume enclosed by the given polygons (fan-triangulated)
    fn signed_volume(&self, faces: &[usize]) -> f64 {
        let points: Vec<Point3<f64>> = faces
            .iter()
            .flat_map(|&f| self.polygon_points(f))
            .collect();
        let center = centroid(&points);

        let mut volume = 0.0;
        for &face in faces {
            let corners = self.polygon_points(face);
            for i in 1..corners.len().saturating_sub(1) {
                let a = corners[0] - center;
                let b = corners[i] - center;
                let c = corners[i + 1] - center;
                volume += a.dot(&b.cross(&c));
            }
        }
        volume / 6.0
    }

    fn volume_tolerance(&self, faces: &[usize]) -> f64 {
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &face in faces {
            for p in self.polygon_points(face) {
                min = min.inf(&p);
                max = max.sup(&p);
            }
        }
        let diagonal = (max - min).norm();
        1e-9 * diagonal.powi(3)
    }

    /// Apply an affine transform to every vertex
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            *vertex = matrix.transform_point(vertex);
        }
        self.recompute_face_normals();
    }

    /// Replace selected polygons by triangles.
    ///
    /// Quads are split along the shorter diagonal, larger polygons are ear
    /// clipped in their own plane. Returns the number of polygons replaced.
    pub fn triangulate<F>(&mut self, select: F) -> usize
    where
        F: Fn(&Polygon) -> bool,
    {
        let mut replaced = 0;
        let mut polygons = Vec::with_capacity(self.polygons.len());

        for polygon in std::mem::take(&mut self.polygons) {
            if polygon.len() <= 3 || !select(&polygon) {
                polygons.push(polygon);
                continue;
            }

            let points = self.points_of(&polygon.indices);
            let corners = if polygon.len() == 4 {
                split_quad(&points)
            } else {
                ear_clip(&points, &polygon_normal(&points))
            };

            for [a, b, c] in corners {
                let mut triangle = Polygon::new(
                    vec![polygon.indices[a], polygon.indices[b], polygon.indices[c]],
                    polygon.material_index,
                );
                triangle.smooth = polygon.smooth;
                triangle.uvs = polygon.uvs.as_ref().map(|uvs| vec![uvs[a], uvs[b], uvs[c]]);
                triangle.normal = polygon_normal(&[points[a], points[b], points[c]]);
                polygons.push(triangle);
            }
            replaced += 1;
        }

        self.polygons = polygons;
        replaced
    }

    /// Disconnect the polygons on either side of the given edges.
    ///
    /// Around every vertex of a split edge, polygons stay connected only
    /// through edges that are not split; each extra fan gets its own copy of
    /// the vertex. Edge flags follow the split edges. Returns the number of
    /// vertices added.
    pub fn split_edges(&mut self, split: &BTreeSet<EdgeKey>) -> usize {
        if split.is_empty() {
            return 0;
        }

        let touched: BTreeSet<usize> = split.iter().flat_map(|k| [k.0, k.1]).collect();
        let mut incident: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (face, polygon) in self.polygons.iter().enumerate() {
            for &v in &polygon.indices {
                if touched.contains(&v) {
                    let faces = incident.entry(v).or_default();
                    if faces.last() != Some(&face) {
                        faces.push(face);
                    }
                }
            }
        }

        let old_edges: Vec<Vec<EdgeKey>> = self.polygons.iter().map(Polygon::edge_keys).collect();
        let mut added = 0;

        for (vertex, faces) in incident {
            let mut parent: Vec<usize> = (0..faces.len()).collect();
            let mut first_by_edge: BTreeMap<EdgeKey, usize> = BTreeMap::new();

            for (local, &face) in faces.iter().enumerate() {
                for key in &old_edges[face] {
                    if !key.contains(vertex) || split.contains(key) {
                        continue;
                    }
                    match first_by_edge.get(key) {
                        Some(&other) => union(&mut parent, local, other),
                        None => {
                            first_by_edge.insert(*key, local);
                        }
                    }
                }
            }

            let mut copies: BTreeMap<usize, usize> = BTreeMap::new();
            for (local, &face) in faces.iter().enumerate() {
                let root = find(&mut parent, local);
                if root == find(&mut parent, 0) {
                    continue;
                }
                let copy = match copies.get(&root) {
                    Some(&copy) => copy,
                    None => {
                        let copy = self.add_vertex(self.vertices[vertex]);
                        copies.insert(root, copy);
                        added += 1;
                        copy
                    }
                };
                for index in &mut self.polygons[face].indices {
                    if *index == vertex {
                        *index = copy;
                    }
                }
            }
        }

        for (face, old) in old_edges.iter().enumerate() {
            let new = self.polygons[face].edge_keys();
            for (old_key, new_key) in old.iter().zip(new) {
                if *old_key == new_key {
                    continue;
                }
                if let Some(flags) = self.edge_flags.get(old_key).copied() {
                    self.edge_flags.entry(new_key).or_default().merge(&flags);
                }
            }
        }
        let live = self.edge_keys();
        self.edge_flags.retain(|key, _| live.contains(key));

        debug!(edges = split.len(), added, "split edges");
        added
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[high] = low;
    }
}

/// Split along the shorter diagonal; ties use 0-2
fn split_quad(points: &[Point3<f64>]) -> Vec<[usize; 3]> {
    let d02 = (points[2] - points[0]).norm_squared();
    let d13 = (points[3] - points[1]).norm_squared();
    if d13 < d02 {
        vec![[0, 1, 3], [1, 2, 3]]
    } else {
        vec![[0, 1, 2], [0, 2, 3]]
    }
}

/// Ear clipping in the plane of `normal`; falls back to a fan for whatever
/// cannot be clipped (self-intersecting or degenerate input)
fn ear_clip(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<[usize; 3]> {
    let axis = normal.iamax();
    let flip = normal[axis] < 0.0;
    let projected: Vec<Point2<f64>> = points
        .iter()
        .map(|p| {
            let (u, v) = match axis {
                0 => (p.y, p.z),
                1 => (p.z, p.x),
                _ => (p.x, p.y),
            };
            if flip {
                Point2::new(v, u)
            } else {
                Point2::new(u, v)
            }
        })
        .collect();

    let cross = |a: usize, b: usize, c: usize| {
        let (pa, pb, pc) = (projected[a], projected[b], projected[c]);
        (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x)
    };

    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len().saturating_sub(2));

    while remaining.len() > 3 {
        let m = remaining.len();
        let mut clipped = false;

        for i in 0..m {
            let prev = remaining[(i + m - 1) % m];
            let cur = remaining[i];
            let next = remaining[(i + 1) % m];
            if cross(prev, cur, next) <= f64::EPSILON {
                continue;
            }
            let contains_other = remaining.iter().any(|&other| {
                other != prev
                    && other != cur
                    && other != next
                    && cross(prev, cur, other) >= 0.0
                    && cross(cur, next, other) >= 0.0
                    && cross(next, prev, other) >= 0.0
            });
            if contains_other {
                continue;
            }

            triangles.push([prev, cur, next]);
            remaining.remove(i);
            clipped = true;
            break;
        }

        if !clipped {
            break;
        }
    }

    for i in 1..remaining.len().saturating_sub(1) {
        triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
    }
    triangles
}

fn zero_normal() -> Vector3<f64> {
    Vector3::zeros()
}

/// JSON maps need string keys, so edge flags travel as a list of pairs
mod edge_flag_list {
    use super::{EdgeFlags, EdgeKey};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(map: &BTreeMap<EdgeKey, EdgeFlags>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<EdgeKey, EdgeFlags>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<(EdgeKey, EdgeFlags)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
