// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Color codes and the resolved color table

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Color code meaning "use the color of the referencing object"
pub const INHERIT_COLOR_CODE: &str = "16";

/// Color code used for edge lines (types 2 and 5)
pub const EDGE_COLOR_CODE: &str = "24";

/// A resolved LDraw color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub code: String,
    pub name: String,
}

impl Color {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Lookup table from color code to color.
///
/// Loading `LDConfig.ldr` is the caller's job; this only holds the result.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: AHashMap<String, Color>,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the two codes the exporter always needs
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.insert(Color::new(INHERIT_COLOR_CODE, "Main_Colour"));
        table.insert(Color::new(EDGE_COLOR_CODE, "Edge_Colour"));
        table
    }

    pub fn insert(&mut self, color: Color) {
        self.colors.insert(color.code.clone(), color);
    }

    pub fn contains(&self, code: &str) -> bool {
        self.colors.contains_key(code.trim())
    }

    /// Resolve a code; unknown codes resolve to a color named after the code
    pub fn get(&self, code: &str) -> Color {
        let code = code.trim();
        self.colors
            .get(code)
            .cloned()
            .unwrap_or_else(|| Color::new(code, code))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn reset(&mut self) {
        self.colors.clear();
    }
}

/// Numeric sort key of a color code.
///
/// Direct colors (`0x2RRGGBB`) sort by their hexadecimal value; codes that are
/// not numbers at all sort last.
pub fn color_sort_key(code: &str) -> i64 {
    let code = code.trim();
    let parsed = match code
        .strip_prefix("0x")
        .or_else(|| code.strip_prefix("0X"))
        .or_else(|| code.strip_prefix('#'))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => code.parse::<i64>().ok(),
    };
    parsed.unwrap_or(i64::MAX)
}
