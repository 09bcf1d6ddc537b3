// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Uniform hash grid for radius queries over a point set
//! Rebuilt for every mesh; never mutated after construction

use ahash::AHashMap;
use nalgebra::{Point3, Vector3};

/// Edge lines are matched against mesh vertices at this multiple of the merge
/// distance. Real part files have gaps (e.g. the rounded seat of 4079.dat) that
/// twice the merge distance does not bridge.
pub const EDGE_MATCH_FACTOR: f64 = 2.1;

/// Tolerance used when resolving edge line points against welded vertices
pub fn edge_match_distance(merge_distance: f64) -> f64 {
    merge_distance * EDGE_MATCH_FACTOR
}

/// Smallest cell edge length, keeps the grid bounded for tightly packed points
const MIN_CELL_SIZE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i64,
    y: i64,
    z: i64,
}

impl CellCoord {
    fn from_position(pos: &Point3<f64>, cell_size: f64) -> Self {
        Self {
            x: (pos.x / cell_size).floor() as i64,
            y: (pos.y / cell_size).floor() as i64,
            z: (pos.z / cell_size).floor() as i64,
        }
    }
}

/// Nearest-neighbour index over a fixed point set
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    points: Vec<Point3<f64>>,
    grid: AHashMap<CellCoord, Vec<usize>>,
    cell_size: f64,
}

impl SpatialIndex {
    /// Build with a cell size derived from the extent and count of the points
    pub fn build(points: &[Point3<f64>]) -> Self {
        Self::with_cell_size(points, Self::auto_cell_size(points))
    }

    pub fn with_cell_size(points: &[Point3<f64>], cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() {
            cell_size.max(MIN_CELL_SIZE)
        } else {
            1.0
        };

        let mut grid: AHashMap<CellCoord, Vec<usize>> = AHashMap::new();
        for (id, point) in points.iter().enumerate() {
            grid.entry(CellCoord::from_position(point, cell_size))
                .or_default()
                .push(id);
        }

        Self {
            points: points.to_vec(),
            grid,
            cell_size,
        }
    }

    /// Roughly one point per cell for evenly spread data
    fn auto_cell_size(points: &[Point3<f64>]) -> f64 {
        if points.len() < 2 {
            return 1.0;
        }
        let mut min = points[0];
        let mut max = points[0];
        for p in points.iter().skip(1) {
            min = min.inf(p);
            max = max.sup(p);
        }
        let extent = (max - min).max();
        extent / (points.len() as f64).cbrt()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Ids of all points within `radius` (inclusive) of `point`, ascending
    pub fn query_range(&self, point: &Point3<f64>, radius: f64) -> Vec<usize> {
        if !(radius >= 0.0) || self.points.is_empty() {
            return Vec::new();
        }

        let offset = Vector3::repeat(radius);
        let lo = CellCoord::from_position(&(point - offset), self.cell_size);
        let hi = CellCoord::from_position(&(point + offset), self.cell_size);
        let radius_sq = radius * radius;

        let span = |a: i64, b: i64| (b.saturating_sub(a)).saturating_add(1).max(0) as u128;
        let cells_in_range = span(lo.x, hi.x) * span(lo.y, hi.y) * span(lo.z, hi.z);

        let mut found = Vec::new();
        let mut collect = |ids: &Vec<usize>| {
            for &id in ids {
                if (self.points[id] - point).norm_squared() <= radius_sq {
                    found.push(id);
                }
            }
        };

        if cells_in_range > self.grid.len() as u128 {
            // Radius dwarfs the grid, scanning occupied cells is cheaper
            self.grid.values().for_each(&mut collect);
        } else {
            for x in lo.x..=hi.x {
                for y in lo.y..=hi.y {
                    for z in lo.z..=hi.z {
                        if let Some(ids) = self.grid.get(&CellCoord { x, y, z }) {
                            collect(ids);
                        }
                    }
                }
            }
        }

        found.sort_unstable();
        found
    }

    /// Closest point within `radius`; the lowest id wins ties
    pub fn nearest_within(&self, point: &Point3<f64>, radius: f64) -> Option<usize> {
        self.query_range(point, radius)
            .into_iter()
            .map(|id| ((self.points[id] - point).norm_squared(), id))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }
}
