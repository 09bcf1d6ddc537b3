// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Memoized lookups for parts that need special materials (slopes, cloth)

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

/// Range of face inclinations, in degrees from the stud axis, that get the
/// grainy slope finish
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeRange {
    pub min_degrees: f64,
    pub max_degrees: f64,
}

impl SlopeRange {
    pub fn new(min_degrees: f64, max_degrees: f64) -> Self {
        Self {
            min_degrees,
            max_degrees,
        }
    }

    pub fn contains(&self, degrees: f64) -> bool {
        degrees >= self.min_degrees && degrees <= self.max_degrees
    }
}

/// Registered slope and cloth parts plus per-run memoization of lookups
#[derive(Debug, Clone, Default)]
pub struct PartCache {
    slopes: AHashMap<String, Vec<SlopeRange>>,
    cloth: AHashSet<String>,
    slope_memo: AHashMap<String, Option<Vec<SlopeRange>>>,
    cloth_memo: AHashMap<String, bool>,
}

impl PartCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_slope(&mut self, filename: &str, ranges: Vec<SlopeRange>) {
        self.slopes.insert(normalize_part_name(filename), ranges);
        self.slope_memo.clear();
    }

    pub fn register_cloth(&mut self, filename: &str) {
        self.cloth.insert(normalize_part_name(filename));
        self.cloth_memo.clear();
    }

    /// Slope ranges of a part, if it is a slope brick
    pub fn part_slopes(&mut self, filename: &str) -> Option<Vec<SlopeRange>> {
        let key = normalize_part_name(filename);
        if let Some(hit) = self.slope_memo.get(&key) {
            return hit.clone();
        }
        let found = self.slopes.get(&key).cloned();
        self.slope_memo.insert(key, found.clone());
        found
    }

    pub fn has_slope(&mut self, filename: &str) -> bool {
        self.part_slopes(filename).is_some()
    }

    pub fn is_cloth(&mut self, filename: &str) -> bool {
        let key = normalize_part_name(filename);
        if let Some(hit) = self.cloth_memo.get(&key) {
            return *hit;
        }
        let found = self.cloth.contains(&key);
        self.cloth_memo.insert(key, found);
        found
    }

    pub fn memoized_lookups(&self) -> usize {
        self.slope_memo.len() + self.cloth_memo.len()
    }

    /// Forget memoized answers; registrations are kept
    pub fn reset(&mut self) {
        self.slope_memo.clear();
        self.cloth_memo.clear();
    }
}

/// `parts\s\3001s01.DAT` and `3001s01.dat` name the same part
fn normalize_part_name(filename: &str) -> String {
    let lower = filename.trim().replace('\\', "/").to_lowercase();
    let base = lower.rsplit('/').next().unwrap_or(&lower);
    base.strip_suffix(".dat").unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_lookup() {
        let mut cache = PartCache::new();
        cache.register_slope("3040.dat", vec![SlopeRange::new(30.0, 60.0)]);
        cache.register_cloth("50231.dat");

        assert!(cache.has_slope("parts\\3040.DAT"));
        assert!(cache.has_slope("3040"));
        assert!(!cache.has_slope("3001.dat"));
        assert!(cache.is_cloth("50231.dat"));
        assert!(!cache.is_cloth("3040.dat"));
    }

    #[test]
    fn test_reset_clears_memo_but_keeps_registry() {
        let mut cache = PartCache::new();
        cache.register_slope("3040.dat", vec![SlopeRange::new(30.0, 60.0)]);
        cache.has_slope("3040.dat");
        cache.is_cloth("3040.dat");
        assert_eq!(cache.memoized_lookups(), 2);

        cache.reset();
        assert_eq!(cache.memoized_lookups(), 0);
        assert!(cache.has_slope("3040.dat"));
    }

    #[test]
    fn test_slope_range_bounds() {
        let range = SlopeRange::new(30.0, 60.0);
        assert!(range.contains(30.0));
        assert!(range.contains(45.0));
        assert!(!range.contains(61.0));
    }
}
